use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Read a JSON or YAML document from stdin if data is being piped.
/// Returns None if stdin is a TTY (interactive) or empty.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // JSON documents open with an object or array; anything else is YAML
    let value: T = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| format!("Failed to parse stdin: {e}"))?
    } else {
        serde_yaml::from_str(trimmed).map_err(|e| format!("Failed to parse stdin: {e}"))?
    };
    Ok(Some(value))
}
