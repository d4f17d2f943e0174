use std::{
  str::FromStr,
  time::Duration,
};

use anyhow::{
  Context,
  Error,
  bail,
};
use chroma_sync::Channel;

/// One line of demo input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
  /// Drag a slider to a raw value.
  Slide(Channel, f64),
  /// Replace an entry's text keystroke by keystroke.
  Type(Channel, String),
  /// Press enter in an entry.
  Confirm(Channel),
  /// Let time pass while the UI keeps running jobs.
  Wait(Duration),
  Show,
  Stop,
  Quit,
}

impl FromStr for Command {
  type Err = Error;

  fn from_str(line: &str) -> Result<Self, Self::Err> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
      bail!("empty command");
    };

    let command = match verb {
      "slide" => {
        let channel = channel(words.next())?;
        let value = words.next().context("slide needs a value")?;
        let value = value
          .parse()
          .with_context(|| format!("invalid slider value {value:?}"))?;
        Command::Slide(channel, value)
      },
      // An entry may be cleared, so the text is optional.
      "type" => Command::Type(channel(words.next())?, words.next().unwrap_or_default().into()),
      "confirm" => Command::Confirm(channel(words.next())?),
      "wait" => {
        let ms = words.next().context("wait needs milliseconds")?;
        let ms = ms
          .parse()
          .with_context(|| format!("invalid duration {ms:?}"))?;
        Command::Wait(Duration::from_millis(ms))
      },
      "show" => Command::Show,
      "stop" => Command::Stop,
      "quit" | "exit" => Command::Quit,
      other => bail!("unknown command {other:?}"),
    };

    if let Some(extra) = words.next() {
      bail!("unexpected argument {extra:?}");
    }
    Ok(command)
  }
}

fn channel(word: Option<&str>) -> Result<Channel, Error> {
  Ok(word.context("missing channel")?.parse()?)
}
