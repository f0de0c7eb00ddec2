//! Error types for acsync-targets

use crate::types::{ItemType, Target};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] acsync_fs::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML edit error: {0}")]
    TomlEdit(#[from] toml_edit::TomlError),

    #[error("Invalid frontmatter: {message}")]
    Frontmatter { message: String },

    #[error("Failed to parse {target} {item_type} '{name}': {message}")]
    Parse {
        target: Target,
        item_type: ItemType,
        name: String,
        message: String,
    },

    #[error("Existing {target} MCP config is not an object")]
    InvalidMcpConfig { target: Target },

    #[error("{target} does not support {item_type} items")]
    Unsupported { target: Target, item_type: ItemType },

    #[error("Unknown target: {name}")]
    UnknownTarget { name: String },

    #[error("Unknown item type: {name}")]
    UnknownItemType { name: String },
}
