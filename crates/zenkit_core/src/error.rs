//! Error types for zenkit_core

use thiserror::Error;

/// Errors raised while parsing selectors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector (or one of its comma groups) was empty
    #[error("empty selector")]
    Empty,

    /// A character the selector grammar does not accept
    #[error("unexpected `{found}` at offset {offset} in selector `{selector}`")]
    Unexpected {
        selector: String,
        found: char,
        offset: usize,
    },

    /// Input ended in the middle of a construct (`[attr`, `:not(`, a quoted value)
    #[error("unterminated {what} in selector `{selector}`")]
    Unterminated {
        selector: String,
        what: &'static str,
    },

    /// Syntax outside the supported subset
    #[error("unsupported selector syntax `{0}`")]
    Unsupported(String),
}

/// Errors that can occur in ZenKit
#[derive(Error, Debug)]
pub enum ZenkitError {
    /// Selector parsing failed
    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    /// A declarative option could not be converted to its typed value
    #[error("Invalid value `{value}` for option `{name}`")]
    InvalidOption { name: String, value: String },

    /// Toolkit configuration failed to parse
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Toolkit configuration failed to serialize
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Result type for zenkit_core operations
pub type Result<T> = std::result::Result<T, ZenkitError>;
