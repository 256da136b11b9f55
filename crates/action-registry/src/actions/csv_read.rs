use async_trait::async_trait;
use page_driver::PageDriver;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::handler::{parse_config, ActionError, ActionHandler, ActionOutcome};

fn default_has_header() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvReadConfig {
    file_path: String,
    #[serde(default = "default_has_header")]
    has_header: bool,
}

/// Read a CSV file into rows: objects keyed by header, or plain string
/// arrays when the file has no header line.
pub struct CsvReadAction;

#[async_trait]
impl ActionHandler for CsvReadAction {
    async fn run(
        &self,
        _session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        let config: CsvReadConfig = parse_config("csvRead", config)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(config.has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&config.file_path)
            .map_err(|err| ActionError::io("csvRead", err))?;

        let rows = if config.has_header {
            let headers: Vec<String> = reader
                .headers()
                .map_err(|err| ActionError::io("csvRead", err))?
                .iter()
                .map(str::to_string)
                .collect();

            let mut rows = Vec::new();
            for record in reader.records() {
                let record = record.map_err(|err| ActionError::io("csvRead", err))?;
                let mut row = Map::new();
                for (i, header) in headers.iter().enumerate() {
                    let field = record.get(i).unwrap_or("");
                    row.insert(header.clone(), Value::from(field));
                }
                rows.push(Value::Object(row));
            }
            rows
        } else {
            let mut rows = Vec::new();
            for record in reader.records() {
                let record = record.map_err(|err| ActionError::io("csvRead", err))?;
                rows.push(Value::from(
                    record.iter().map(str::to_string).collect::<Vec<_>>(),
                ));
            }
            rows
        };

        Ok(ActionOutcome::new(json!({"rows": rows})))
    }
}
