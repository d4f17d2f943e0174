use std::path::PathBuf;

use anyhow::{
  Context,
  Result,
};
use chroma_sync::{
  CombinePolicy,
  EntryTrigger,
  MalformedEntry,
  SyncConfig,
};
use clap::{
  ArgAction,
  Parser,
};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "chroma")]
#[command(about = "Headless RGBA picker with synchronized sliders and hex entries")]
pub struct Cli {
  /// TOML file with picker settings
  #[arg(long, short)]
  pub config: Option<PathBuf>,

  /// Entry notification that counts as an edit: confirm or keystroke
  #[arg(long)]
  pub trigger: Option<EntryTrigger>,

  /// How channels are combined: latest or zip
  #[arg(long)]
  pub combine: Option<CombinePolicy>,

  /// Quiet period before a slider follows its entry
  #[arg(long, value_name = "MS")]
  pub quiescence_ms: Option<u64>,

  /// Malformed entry text handling: substitute or skip
  #[arg(long)]
  pub malformed: Option<MalformedEntry>,

  /// Read commands from this file instead of stdin
  #[arg(long, short)]
  pub script: Option<PathBuf>,

  /// Log more (-v info, -vv debug, -vvv trace)
  #[arg(long, short, action = ArgAction::Count)]
  pub verbose: u8,
}

impl Cli {
  /// Settings from `--config`, with command line flags on top.
  pub fn sync_config(&self) -> Result<SyncConfig> {
    let mut config = match &self.config {
      Some(path) => SyncConfig::load(path)
        .with_context(|| format!("loading {}", path.display()))?,
      None => SyncConfig::default(),
    };
    if let Some(trigger) = self.trigger {
      config.entry_trigger = trigger;
    }
    if let Some(combine) = self.combine {
      config.combine = combine;
    }
    if let Some(quiescence_ms) = self.quiescence_ms {
      config.quiescence_ms = quiescence_ms;
    }
    if let Some(malformed) = self.malformed {
      config.malformed_entry = malformed;
    }
    config.validate()?;
    Ok(config)
  }

  pub fn log_level(&self) -> LevelFilter {
    match self.verbose {
      0 => LevelFilter::Warn,
      1 => LevelFilter::Info,
      2 => LevelFilter::Debug,
      _ => LevelFilter::Trace,
    }
  }

  /// Log to stderr. `RUST_LOG` takes precedence over `-v`.
  pub fn init_logging(&self) {
    env_logger::Builder::new()
      .filter_level(self.log_level())
      .parse_default_env()
      .init();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_override_defaults() {
    let cli = Cli::parse_from([
      "chroma",
      "--trigger",
      "keystroke",
      "--combine",
      "zip",
      "--quiescence-ms",
      "20",
      "-vv",
    ]);
    let config = cli.sync_config().unwrap();

    assert_eq!(config.entry_trigger, EntryTrigger::Keystroke);
    assert_eq!(config.combine, CombinePolicy::Zip);
    assert_eq!(config.quiescence_ms, 20);
    assert_eq!(config.malformed_entry, MalformedEntry::Substitute);
    assert_eq!(cli.log_level(), LevelFilter::Debug);
  }

  #[test]
  fn rejects_unknown_policy() {
    assert!(Cli::try_parse_from(["chroma", "--combine", "sometimes"]).is_err());
  }
}
