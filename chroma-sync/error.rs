use std::{
  io,
  path::PathBuf,
};

use thiserror::Error;

/// Reasons a hex entry cannot be decoded into a channel value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
  #[error("empty hex text")]
  Empty,
  /// Entries hold exactly two digits
  #[error("expected 2 hex digits, got {0}")]
  InvalidLength(usize),
  #[error("invalid hex digits in {0:?}")]
  InvalidDigit(String),
}

/// Errors that can occur while loading a picker config
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config: {0}")]
  Parse(#[from] toml::de::Error),

  /// The file parsed but holds values the controller cannot work with
  #[error("invalid config: {0}")]
  Invalid(String),
}

#[derive(Error, Debug)]
pub enum Error {
  #[error(transparent)]
  Hex(#[from] HexError),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("unknown channel {0:?}, expected red, green, blue or alpha")]
  UnknownChannel(String),

  #[error("unknown {kind} {value:?}, expected one of {expected}")]
  UnknownOption {
    kind:     &'static str,
    value:    String,
    expected: &'static str,
  },
}

pub type Result<T> = std::result::Result<T, Error>;
