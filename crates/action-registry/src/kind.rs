//! The closed set of action tags.

use serde::{Deserialize, Serialize};

/// Every action tag the worker understands, control constructs included.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Navigate,
    Click,
    Input,
    Extract,
    Wait,
    Screenshot,
    SetVariable,
    CsvRead,
    CsvWrite,
    FileDownload,
    Login,
    Loop,
    Condition,
}

impl ActionKind {
    /// Resolve a wire tag; `None` for tags outside the closed set.
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "navigate" => ActionKind::Navigate,
            "click" => ActionKind::Click,
            "input" => ActionKind::Input,
            "extract" => ActionKind::Extract,
            "wait" => ActionKind::Wait,
            "screenshot" => ActionKind::Screenshot,
            "setVariable" => ActionKind::SetVariable,
            "csvRead" => ActionKind::CsvRead,
            "csvWrite" => ActionKind::CsvWrite,
            "fileDownload" => ActionKind::FileDownload,
            "login" => ActionKind::Login,
            "loop" => ActionKind::Loop,
            "condition" => ActionKind::Condition,
            _ => return None,
        })
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            ActionKind::Navigate => "navigate",
            ActionKind::Click => "click",
            ActionKind::Input => "input",
            ActionKind::Extract => "extract",
            ActionKind::Wait => "wait",
            ActionKind::Screenshot => "screenshot",
            ActionKind::SetVariable => "setVariable",
            ActionKind::CsvRead => "csvRead",
            ActionKind::CsvWrite => "csvWrite",
            ActionKind::FileDownload => "fileDownload",
            ActionKind::Login => "login",
            ActionKind::Loop => "loop",
            ActionKind::Condition => "condition",
        }
    }

    /// Control constructs are interpreted by the engine, not dispatched to a
    /// handler.
    pub fn is_control(&self) -> bool {
        matches!(self, ActionKind::Loop | ActionKind::Condition)
    }

    /// Every primitive (handler-backed) kind.
    pub fn primitives() -> &'static [ActionKind] {
        &[
            ActionKind::Navigate,
            ActionKind::Click,
            ActionKind::Input,
            ActionKind::Extract,
            ActionKind::Wait,
            ActionKind::Screenshot,
            ActionKind::SetVariable,
            ActionKind::CsvRead,
            ActionKind::CsvWrite,
            ActionKind::FileDownload,
            ActionKind::Login,
        ]
    }
}
