//! Output formatting

use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn print<T: Serialize>(&self, data: &T) -> anyhow::Result<()> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(data)?),
            OutputFormat::Table => print!("{}", table(&serde_json::to_value(data)?)),
        }
        Ok(())
    }
}

/// Plain `key  value` rows; arrays print one block per item
fn table(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(table).collect::<Vec<_>>().join("\n"),
        Value::Object(map) => {
            let width = map.keys().map(String::len).max().unwrap_or(0);
            map.iter()
                .map(|(key, value)| format!("{:width$}  {}\n", key, cell(value), width = width))
                .collect()
        }
        other => format!("{}\n", cell(other)),
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "-".into(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_rows() {
        let rendered = table(&json!({"id": 1, "title": "News", "tag": null}));
        assert_eq!(rendered, "id     1\ntag    -\ntitle  News\n");
    }

    #[test]
    fn test_table_array() {
        let rendered = table(&json!([{"id": 1}, {"id": 2}]));
        assert_eq!(rendered, "id  1\n\nid  2\n");
    }
}
