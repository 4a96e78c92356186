//! Front matter detection, decoding and encoding.
//!
//! Splitting and decoding go through `markdown_frontmatter`; encoding goes
//! straight to the format's serde crate.
//!
//! A content file optionally starts with a metadata block:
//!
//! ```text
//! ---            +++            {
//! title: Hi      title = "Hi"     "title": "Hi"
//! ---            +++            }
//! ```
//!
//! Everything after the block is the body.

use std::fmt;

use serde_json::Value;
use serde_yaml::Value as YamlValue;

use crate::error::{PageError, Result};
use crate::value::{FrontMatter, toml_to_json_value, yaml_to_json_value};

const YAML_DELIM: &str = "---";
const TOML_DELIM: &str = "+++";
const JSON_OPEN: &str = "{";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterFormat {
    Yaml,
    Toml,
    Json,
}

impl FrontMatterFormat {
    /// Parse a user-facing format name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(FrontMatterFormat::Yaml),
            "toml" => Some(FrontMatterFormat::Toml),
            "json" => Some(FrontMatterFormat::Json),
            _ => None,
        }
    }
}

impl fmt::Display for FrontMatterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrontMatterFormat::Yaml => "YAML",
            FrontMatterFormat::Toml => "TOML",
            FrontMatterFormat::Json => "JSON",
        };
        f.write_str(name)
    }
}

/// A source file split into its metadata block and body
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    /// Source text preceding the body: the metadata block and its delimiters
    pub prefix: String,
    pub format: Option<FrontMatterFormat>,
    pub metadata: FrontMatter,
    pub content: String,
    /// False for files that are already HTML documents
    pub renderable: bool,
}

/// Why a metadata block could not be turned into a [`FrontMatter`] map
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    Syntax(String),
    NotAMap,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Syntax(reason) => f.write_str(reason),
            DecodeError::NotAMap => f.write_str("front matter is not a mapping"),
        }
    }
}

/// Format announced by the first line of a source file
fn detect_format(text: &str) -> Option<FrontMatterFormat> {
    match text.lines().next().map(str::trim_end) {
        Some(YAML_DELIM) => Some(FrontMatterFormat::Yaml),
        Some(TOML_DELIM) => Some(FrontMatterFormat::Toml),
        Some(JSON_OPEN) => Some(FrontMatterFormat::Json),
        _ => None,
    }
}

fn into_map(value: Value) -> std::result::Result<FrontMatter, DecodeError> {
    match value {
        Value::Object(map) => Ok(map),
        // An empty YAML block decodes to null
        Value::Null => Ok(FrontMatter::new()),
        _ => Err(DecodeError::NotAMap),
    }
}

/// Split raw source text into front matter and body, decoding the front matter
pub fn split(source: &str) -> std::result::Result<ParsedSource, DecodeError> {
    let text = source.strip_prefix('\u{feff}').unwrap_or(source);
    let rest = text.trim_start();
    let renderable = !rest.starts_with('<');

    let Some(format) = detect_format(rest) else {
        return Ok(ParsedSource {
            content: source.to_string(),
            renderable,
            ..Default::default()
        });
    };

    let (value, body) = match format {
        FrontMatterFormat::Yaml => {
            let (yaml, body) = markdown_frontmatter::parse::<YamlValue>(rest)
                .map_err(|e| DecodeError::Syntax(e.to_string()))?;
            (yaml_to_json_value(&yaml), body)
        }
        FrontMatterFormat::Toml => {
            let (table, body) = markdown_frontmatter::parse::<toml::Table>(rest)
                .map_err(|e| DecodeError::Syntax(e.to_string()))?;
            (toml_to_json_value(&toml::Value::Table(table)), body)
        }
        FrontMatterFormat::Json => {
            markdown_frontmatter::parse::<Value>(rest).map_err(|e| DecodeError::Syntax(e.to_string()))?
        }
    };
    let metadata = into_map(value)?;

    let body_start = source.rfind(body).unwrap_or(source.len());
    Ok(ParsedSource {
        prefix: source[..body_start].to_string(),
        format: Some(format),
        metadata,
        content: source[body_start..].to_string(),
        renderable,
    })
}

/// Encode a metadata map as a delimited front-matter block
pub fn encode(map: &FrontMatter, format: FrontMatterFormat) -> Result<String> {
    let encode_err = |reason: String| PageError::FrontMatterEncode {
        format: format.to_string().into(),
        reason,
    };

    match format {
        FrontMatterFormat::Yaml => {
            let body = serde_yaml::to_string(map).map_err(|e| encode_err(e.to_string()))?;
            Ok(format!("{YAML_DELIM}\n{body}{YAML_DELIM}\n"))
        }
        FrontMatterFormat::Toml => {
            let body = toml::to_string(map).map_err(|e| encode_err(e.to_string()))?;
            Ok(format!("{TOML_DELIM}\n{body}{TOML_DELIM}\n"))
        }
        FrontMatterFormat::Json => {
            let body = serde_json::to_string_pretty(map).map_err(|e| encode_err(e.to_string()))?;
            Ok(format!("{body}\n"))
        }
    }
}
