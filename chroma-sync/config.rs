use std::{
  fmt,
  path::Path,
  str::FromStr,
  time::Duration,
};

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  color::Rgba,
  error::{
    ConfigError,
    Error,
  },
};

/// Which entry notification counts as an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryTrigger {
  /// Only when the user confirms the entry.
  #[default]
  Confirm,
  /// After every keystroke.
  Keystroke,
}

/// How the four channel streams are folded into one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombinePolicy {
  /// Recompute from the newest value of every channel on any change.
  #[default]
  Latest,
  /// Wait until every channel changed since the last color, then combine.
  Zip,
}

/// What to do with entry text that is not two hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedEntry {
  /// Treat it as `fallback-value`.
  #[default]
  Substitute,
  /// Ignore the edit.
  Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SyncConfig {
  pub entry_trigger:   EntryTrigger,
  pub combine:         CombinePolicy,
  /// Quiet period after an entry edit before its slider follows.
  pub quiescence_ms:   u64,
  pub malformed_entry: MalformedEntry,
  pub fallback_value:  f64,
  /// Value every channel starts from.
  pub initial_color:   Rgba,
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      entry_trigger:   EntryTrigger::default(),
      combine:         CombinePolicy::default(),
      quiescence_ms:   500,
      malformed_entry: MalformedEntry::default(),
      fallback_value:  0.0,
      initial_color:   Rgba::default(),
    }
  }
}

impl SyncConfig {
  pub fn quiescence(&self) -> Duration {
    Duration::from_millis(self.quiescence_ms)
  }

  /// Value substituted for malformed entry text, `None` when such edits are
  /// skipped.
  pub fn fallback(&self) -> Option<f64> {
    match self.malformed_entry {
      MalformedEntry::Substitute => Some(self.fallback_value),
      MalformedEntry::Skip => None,
    }
  }

  pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
    let config: SyncConfig = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
  }

  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_toml_str(&source)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&self.fallback_value) {
      return Err(ConfigError::Invalid(format!(
        "fallback-value must be within [0, 1], got {}",
        self.fallback_value
      )));
    }
    if !self.initial_color.is_normalized() {
      return Err(ConfigError::Invalid(format!(
        "initial-color components must be within [0, 1], got {:?}",
        self.initial_color.to_array()
      )));
    }
    Ok(())
  }
}

macro_rules! option_from_str {
  ($ty:ty, $kind:literal, { $($name:literal => $variant:path,)+ }) => {
    impl FromStr for $ty {
      type Err = Error;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
          $($name => Ok($variant),)+
          _ => Err(Error::UnknownOption {
            kind:     $kind,
            value:    s.to_string(),
            expected: concat!($($name, " ",)+).trim_ascii_end(),
          }),
        }
      }
    }

    impl fmt::Display for $ty {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
          $($variant => $name,)+
        };
        f.write_str(name)
      }
    }
  };
}

option_from_str!(EntryTrigger, "entry trigger", {
  "confirm" => EntryTrigger::Confirm,
  "keystroke" => EntryTrigger::Keystroke,
});

option_from_str!(CombinePolicy, "combine policy", {
  "latest" => CombinePolicy::Latest,
  "zip" => CombinePolicy::Zip,
});

option_from_str!(MalformedEntry, "malformed-entry policy", {
  "substitute" => MalformedEntry::Substitute,
  "skip" => MalformedEntry::Skip,
});

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_gives_defaults() {
    let config = SyncConfig::from_toml_str("").unwrap();
    assert_eq!(config, SyncConfig::default());
    assert_eq!(config.quiescence(), Duration::from_millis(500));
    assert_eq!(config.fallback(), Some(0.0));
  }

  #[test]
  fn parses_every_field() {
    let config = SyncConfig::from_toml_str(
      r#"
        entry-trigger = "keystroke"
        combine = "zip"
        quiescence-ms = 2000
        malformed-entry = "skip"
        fallback-value = 0.5
        initial-color = [1.0, 1.0, 1.0, 0.5]
      "#,
    )
    .unwrap();

    assert_eq!(config.entry_trigger, EntryTrigger::Keystroke);
    assert_eq!(config.combine, CombinePolicy::Zip);
    assert_eq!(config.quiescence(), Duration::from_secs(2));
    assert_eq!(config.fallback(), None);
    assert_eq!(config.initial_color, Rgba::new(1.0, 1.0, 1.0, 0.5));
  }

  #[test]
  fn rejects_unknown_fields() {
    let err = SyncConfig::from_toml_str("throttle = 3").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
  }

  #[test]
  fn rejects_out_of_range_values() {
    let err = SyncConfig::from_toml_str("fallback-value = 2.0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = SyncConfig::from_toml_str("initial-color = [0.0, 0.0, 0.0, -1.0]").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
  }

  #[test]
  fn options_parse_from_cli_strings() {
    assert_eq!("Zip".parse::<CombinePolicy>().unwrap(), CombinePolicy::Zip);
    assert_eq!("keystroke".parse::<EntryTrigger>().unwrap(), EntryTrigger::Keystroke);
    assert_eq!(CombinePolicy::Latest.to_string(), "latest");

    let err = "sometimes".parse::<EntryTrigger>().unwrap_err();
    assert_eq!(
      err.to_string(),
      "unknown entry trigger \"sometimes\", expected one of confirm keystroke"
    );
  }

  #[test]
  fn load_reports_missing_file() {
    let err = SyncConfig::load(Path::new("/nonexistent/chroma.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
  }
}
