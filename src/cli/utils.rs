use std::io::Read;

use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(fields)) = data {
                if let Some(object) = response.as_object_mut() {
                    object.extend(fields);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print a record or list. Text mode falls back to the given line renderer.
pub fn output_records<T, F>(output_format: &OutputFormat, records: &[T], render: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Text => {
            for record in records {
                println!("{}", render(record));
            }
        }
    }
    Ok(())
}

/// `--data` if given, otherwise stdin.
pub fn read_json_input(data: Option<String>) -> anyhow::Result<Value> {
    let raw = match data {
        Some(data) => data,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("Invalid JSON input: {}", e))
}

/// Show the first and last few characters of a token.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
