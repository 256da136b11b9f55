//! Registration table mapping action kinds to handlers.

use std::collections::HashMap;
use std::sync::Arc;

use flowrunner_core_types::FlowStep;

use crate::actions;
use crate::handler::{ActionError, ActionHandler};
use crate::kind::ActionKind;

/// Closed dispatch table. Control kinds are never registered; the flow
/// engine interprets them directly.
pub struct ActionRegistry {
    handlers: HashMap<ActionKind, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The full builtin action set.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(ActionKind::Navigate, Arc::new(actions::NavigateAction));
        registry.register(ActionKind::Click, Arc::new(actions::ClickAction));
        registry.register(ActionKind::Input, Arc::new(actions::InputAction));
        registry.register(ActionKind::Extract, Arc::new(actions::ExtractAction));
        registry.register(ActionKind::Wait, Arc::new(actions::WaitAction));
        registry.register(ActionKind::Screenshot, Arc::new(actions::ScreenshotAction));
        registry.register(ActionKind::SetVariable, Arc::new(actions::SetVariableAction));
        registry.register(ActionKind::CsvRead, Arc::new(actions::CsvReadAction));
        registry.register(ActionKind::CsvWrite, Arc::new(actions::CsvWriteAction));
        registry.register(
            ActionKind::FileDownload,
            Arc::new(actions::FileDownloadAction::new()),
        );
        registry.register(ActionKind::Login, Arc::new(actions::LoginAction));
        registry
    }

    pub fn register(&mut self, kind: ActionKind, handler: Arc<dyn ActionHandler>) {
        debug_assert!(!kind.is_control(), "control kinds are not dispatchable");
        self.handlers.insert(kind, handler);
    }

    pub fn get(&self, kind: ActionKind) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(&kind).cloned()
    }

    /// Reject unknown or unregistered tags anywhere in a step tree before a
    /// run starts. The interpreter still fails such a step at run time for
    /// callers that skip validation.
    pub fn validate(&self, steps: &[FlowStep]) -> Result<(), ActionError> {
        for step in steps {
            match ActionKind::parse(&step.action_type) {
                None => return Err(ActionError::UnknownAction(step.action_type.clone())),
                Some(kind) if kind.is_control() => {}
                Some(kind) => {
                    if !self.handlers.contains_key(&kind) {
                        return Err(ActionError::UnknownAction(step.action_type.clone()));
                    }
                }
            }
            self.validate(&step.children)?;
            self.validate(&step.else_children)?;
        }
        Ok(())
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
