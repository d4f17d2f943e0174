//! Two-way synchronization between the RGBA sliders of a color picker and
//! their hex entries.
//!
//! [`ColorSyncController`] is the whole behavior. It is written against the
//! widget traits in [`widget`], so any toolkit can host it; [`ColorScreen`]
//! is the headless surface used by the tests and the demo.

pub mod channel;
pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod hex;
pub mod screen;
pub mod widget;

pub use channel::Channel;
pub use color::Rgba;
pub use config::{
  CombinePolicy,
  EntryTrigger,
  MalformedEntry,
  SyncConfig,
};
pub use controller::ColorSyncController;
pub use error::{
  ConfigError,
  Error,
  HexError,
  Result,
};
pub use screen::ColorScreen;
pub use widget::{
  ColorSurface,
  Entry,
  EntryModel,
  Slider,
  SliderModel,
  Swatch,
  SwatchModel,
};
