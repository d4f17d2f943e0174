use std::fmt;

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  channel::Channel,
  hex,
};

/// Straight (non-premultiplied) RGBA color, every component in [0, 1].
///
/// Serialized as a `[red, green, blue, alpha]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Rgba {
  pub red:   f64,
  pub green: f64,
  pub blue:  f64,
  pub alpha: f64,
}

impl Default for Rgba {
  /// Opaque black.
  fn default() -> Self {
    Self::new(0.0, 0.0, 0.0, 1.0)
  }
}

impl Rgba {
  pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
    Self {
      red,
      green,
      blue,
      alpha,
    }
  }

  pub fn get(&self, channel: Channel) -> f64 {
    match channel {
      Channel::Red => self.red,
      Channel::Green => self.green,
      Channel::Blue => self.blue,
      Channel::Alpha => self.alpha,
    }
  }

  pub fn with(mut self, channel: Channel, value: f64) -> Self {
    match channel {
      Channel::Red => self.red = value,
      Channel::Green => self.green = value,
      Channel::Blue => self.blue = value,
      Channel::Alpha => self.alpha = value,
    }
    self
  }

  pub fn to_array(self) -> [f64; 4] {
    [self.red, self.green, self.blue, self.alpha]
  }

  pub fn to_bytes(self) -> [u8; 4] {
    self.to_array().map(hex::to_byte)
  }

  pub fn is_normalized(&self) -> bool {
    self
      .to_array()
      .iter()
      .all(|component| (0.0..=1.0).contains(component))
  }
}

impl From<[f64; 4]> for Rgba {
  fn from([red, green, blue, alpha]: [f64; 4]) -> Self {
    Self::new(red, green, blue, alpha)
  }
}

impl From<Rgba> for [f64; 4] {
  fn from(color: Rgba) -> Self {
    color.to_array()
  }
}

impl fmt::Display for Rgba {
  /// `#RRGGBBAA`
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let [r, g, b, a] = self.to_bytes();
    write!(f, "#{r:02X}{g:02X}{b:02X}{a:02X}")
  }
}
