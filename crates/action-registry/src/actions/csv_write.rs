use async_trait::async_trait;
use page_driver::PageDriver;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::handler::{parse_config, ActionError, ActionHandler, ActionOutcome};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvWriteConfig {
    file_path: String,
    data: Vec<Value>,
    #[serde(default)]
    headers: Option<Vec<String>>,
}

/// Write rows (objects or string arrays) to a CSV file.
pub struct CsvWriteAction;

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[async_trait]
impl ActionHandler for CsvWriteAction {
    async fn run(
        &self,
        _session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        let config: CsvWriteConfig = parse_config("csvWrite", config)?;

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&config.file_path)
            .map_err(|err| ActionError::io("csvWrite", err))?;
        let mut written = 0usize;

        let object_rows = matches!(config.data.first(), Some(Value::Object(_)));
        if object_rows {
            let keys: Vec<String> = match &config.headers {
                Some(headers) => headers.clone(),
                None => match config.data.first() {
                    Some(Value::Object(first)) => first.keys().cloned().collect(),
                    _ => Vec::new(),
                },
            };
            writer
                .write_record(&keys)
                .map_err(|err| ActionError::io("csvWrite", err))?;
            written += 1;

            for row in &config.data {
                let row = row.as_object().ok_or_else(|| {
                    ActionError::invalid_config("csvWrite", "mixed row shapes in data")
                })?;
                let record: Vec<String> = keys.iter().map(|k| cell(row.get(k))).collect();
                writer
                    .write_record(&record)
                    .map_err(|err| ActionError::io("csvWrite", err))?;
                written += 1;
            }
        } else {
            if let Some(headers) = &config.headers {
                writer
                    .write_record(headers)
                    .map_err(|err| ActionError::io("csvWrite", err))?;
                written += 1;
            }
            for row in &config.data {
                let row = row.as_array().ok_or_else(|| {
                    ActionError::invalid_config("csvWrite", "data rows must be arrays or objects")
                })?;
                let record: Vec<String> = row.iter().map(|v| cell(Some(v))).collect();
                writer
                    .write_record(&record)
                    .map_err(|err| ActionError::io("csvWrite", err))?;
                written += 1;
            }
        }

        writer
            .flush()
            .map_err(|err| ActionError::io("csvWrite", err))?;
        Ok(ActionOutcome::new(json!({"written": written})))
    }
}
