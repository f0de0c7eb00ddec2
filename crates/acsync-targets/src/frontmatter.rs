//! YAML frontmatter codec for markdown items

use crate::error::{Error, Result};
use crate::types::Metadata;
use serde_json::Value;

const DELIMITER: &str = "---";

/// A markdown document split into metadata and body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub metadata: Metadata,
    pub body: String,
}

/// Split `raw` into frontmatter metadata and body.
///
/// Documents without a leading `---` line have empty metadata and the whole
/// input as body.
pub fn parse(raw: &str) -> Result<Document> {
    let rest = match raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))
    {
        Some(rest) => rest,
        None => {
            return Ok(Document {
                metadata: Metadata::new(),
                body: raw.to_string(),
            });
        }
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            let metadata = parse_yaml(&rest[..offset])?;
            let body = rest[offset + line.len()..].to_string();
            return Ok(Document { metadata, body });
        }
        offset += line.len();
    }

    Err(Error::Frontmatter {
        message: "unterminated frontmatter block".into(),
    })
}

fn parse_yaml(yaml: &str) -> Result<Metadata> {
    if yaml.trim().is_empty() {
        return Ok(Metadata::new());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Metadata::new()),
        other => Err(Error::Frontmatter {
            message: format!("expected a mapping, found {}", kind(&other)),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Render `body` with `metadata` as a frontmatter block.
///
/// Empty metadata produces the body alone. The output always ends with a
/// newline unless the body is empty.
pub fn stringify(body: &str, metadata: &Metadata) -> Result<String> {
    let mut out = String::new();
    if !metadata.is_empty() {
        let yaml = serde_yaml::to_string(metadata)?;
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&yaml);
        if !yaml.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push('\n');
    }
    out.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}
