use std::{
  fmt,
  str::FromStr,
};

use serde::{
  Deserialize,
  Serialize,
};

use crate::error::Error;

/// One independently edited component of the picked color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
  Red,
  Green,
  Blue,
  Alpha,
}

impl Channel {
  /// All channels in storage order.
  pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha];

  pub const fn index(self) -> usize {
    match self {
      Channel::Red => 0,
      Channel::Green => 1,
      Channel::Blue => 2,
      Channel::Alpha => 3,
    }
  }

  pub const fn name(self) -> &'static str {
    match self {
      Channel::Red => "red",
      Channel::Green => "green",
      Channel::Blue => "blue",
      Channel::Alpha => "alpha",
    }
  }
}

impl fmt::Display for Channel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Channel {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "r" | "red" => Ok(Channel::Red),
      "g" | "green" => Ok(Channel::Green),
      "b" | "blue" => Ok(Channel::Blue),
      "a" | "alpha" => Ok(Channel::Alpha),
      _ => Err(Error::UnknownChannel(s.to_string())),
    }
  }
}
