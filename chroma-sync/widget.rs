//! Widget contracts the controller drives, plus headless implementations.
//!
//! The traits describe only what the picker needs from a toolkit: a value
//! with change notifications for sliders, text with change and confirm
//! notifications for entries, and a settable color for the swatch. Change
//! notifications fire for programmatic updates too, the same way native
//! widgets report every value change, but only when the value actually
//! changes.

use chroma_event::EventStream;

use crate::{
  channel::Channel,
  color::Rgba,
};

pub trait Slider {
  fn value(&self) -> f64;
  /// `(min, max)` of the slider's value.
  fn range(&self) -> (f64, f64);
  /// Set the value, clamped to the range. Notifies if it changed.
  fn set_value(&mut self, value: f64);
  fn value_changed(&self) -> &EventStream<f64>;
}

pub trait Entry {
  fn text(&self) -> &str;
  /// Replace the text. Notifies `text_changed` if it changed.
  fn set_text(&mut self, text: &str);
  /// Fires with the full text after every edit.
  fn text_changed(&self) -> &EventStream<String>;
  /// Fires with the full text when the user confirms the entry.
  fn completed(&self) -> &EventStream<String>;
}

pub trait Swatch {
  fn color(&self) -> Rgba;
  fn set_color(&mut self, color: Rgba);
}

/// The set of widgets a picker screen is made of, owned by the UI thread.
pub trait ColorSurface: 'static {
  type Slider: Slider;
  type Entry: Entry;
  type Swatch: Swatch;

  fn slider(&self, channel: Channel) -> &Self::Slider;
  fn slider_mut(&mut self, channel: Channel) -> &mut Self::Slider;
  fn entry(&self, channel: Channel) -> &Self::Entry;
  fn entry_mut(&mut self, channel: Channel) -> &mut Self::Entry;
  fn swatch(&self) -> &Self::Swatch;
  fn swatch_mut(&mut self) -> &mut Self::Swatch;
}

/// Map a raw slider value onto [0, 1].
pub fn normalize(value: f64, (min, max): (f64, f64)) -> f64 {
  if max > min {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
  } else {
    0.0
  }
}

/// Inverse of [`normalize`].
pub fn denormalize(value: f64, (min, max): (f64, f64)) -> f64 {
  min + value.clamp(0.0, 1.0) * (max - min)
}

#[derive(Debug)]
pub struct SliderModel {
  value:   f64,
  min:     f64,
  max:     f64,
  changed: EventStream<f64>,
}

impl Default for SliderModel {
  fn default() -> Self {
    Self::new(0.0, 1.0)
  }
}

impl SliderModel {
  pub fn new(min: f64, max: f64) -> Self {
    Self {
      value: min,
      min,
      max: max.max(min),
      changed: EventStream::new(),
    }
  }

  /// Start at `value` without notifying anyone.
  pub fn with_value(mut self, value: f64) -> Self {
    self.value = value.clamp(self.min, self.max);
    self
  }

  /// A user drag to `value`.
  pub fn drag(&mut self, value: f64) {
    self.set_value(value);
  }
}

impl Slider for SliderModel {
  fn value(&self) -> f64 {
    self.value
  }

  fn range(&self) -> (f64, f64) {
    (self.min, self.max)
  }

  fn set_value(&mut self, value: f64) {
    let value = value.clamp(self.min, self.max);
    if value == self.value || value.is_nan() {
      return;
    }
    self.value = value;
    self.changed.emit(&value);
  }

  fn value_changed(&self) -> &EventStream<f64> {
    &self.changed
  }
}

#[derive(Debug, Default)]
pub struct EntryModel {
  text:      String,
  changed:   EventStream<String>,
  completed: EventStream<String>,
}

impl EntryModel {
  pub fn new() -> Self {
    Self::default()
  }

  /// The user replacing the entry's contents, one keystroke at a time.
  pub fn type_text(&mut self, text: &str) {
    let mut typed = String::with_capacity(text.len());
    self.set_text("");
    for c in text.chars() {
      typed.push(c);
      self.set_text(&typed);
    }
  }

  /// The user pressing enter / done.
  pub fn confirm(&self) {
    self.completed.emit(&self.text);
  }
}

impl Entry for EntryModel {
  fn text(&self) -> &str {
    &self.text
  }

  fn set_text(&mut self, text: &str) {
    if self.text == text {
      return;
    }
    self.text.clear();
    self.text.push_str(text);
    self.changed.emit(&self.text);
  }

  fn text_changed(&self) -> &EventStream<String> {
    &self.changed
  }

  fn completed(&self) -> &EventStream<String> {
    &self.completed
  }
}

#[derive(Debug, Default)]
pub struct SwatchModel {
  color:  Rgba,
  paints: usize,
}

impl SwatchModel {
  /// Number of times the color has been set.
  pub fn paints(&self) -> usize {
    self.paints
  }
}

impl Swatch for SwatchModel {
  fn color(&self) -> Rgba {
    self.color
  }

  fn set_color(&mut self, color: Rgba) {
    self.color = color;
    self.paints += 1;
  }
}

#[cfg(test)]
mod tests {
  use std::{
    cell::RefCell,
    rc::Rc,
  };

  use super::*;

  #[test]
  fn slider_notifies_only_on_change() {
    let mut slider = SliderModel::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = slider
      .value_changed()
      .subscribe(move |v| sink.borrow_mut().push(*v));

    slider.drag(0.5);
    slider.set_value(0.5);
    slider.set_value(3.0);

    assert_eq!(*seen.borrow(), vec![0.5, 1.0]);
  }

  #[test]
  fn typing_emits_each_prefix() {
    let mut entry = EntryModel::new();
    entry.set_text("00");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = entry
      .text_changed()
      .subscribe(move |text| sink.borrow_mut().push(text.clone()));

    entry.type_text("7F");

    assert_eq!(*seen.borrow(), vec!["", "7", "7F"]);
    assert_eq!(entry.text(), "7F");
  }

  #[test]
  fn range_mapping() {
    assert_eq!(normalize(50.0, (0.0, 100.0)), 0.5);
    assert_eq!(normalize(-5.0, (0.0, 100.0)), 0.0);
    assert_eq!(normalize(1.0, (1.0, 1.0)), 0.0);
    assert_eq!(denormalize(0.25, (0.0, 100.0)), 25.0);
  }
}
