use std::fmt;

use crate::{
  channel::Channel,
  hex,
  widget::{
    ColorSurface,
    Entry,
    EntryModel,
    Slider,
    SliderModel,
    Swatch,
    SwatchModel,
  },
};

/// Headless picker screen: four slider/entry pairs and a swatch.
#[derive(Debug, Default)]
pub struct ColorScreen {
  sliders: [SliderModel; 4],
  entries: [EntryModel; 4],
  swatch:  SwatchModel,
}

impl ColorScreen {
  pub fn new() -> Self {
    Self::default()
  }

  /// Screen whose sliders use `range` instead of [0, 1].
  pub fn with_slider_range(min: f64, max: f64) -> Self {
    Self {
      sliders: std::array::from_fn(|_| SliderModel::new(min, max)),
      ..Self::default()
    }
  }

  /// True when every entry decodes to its slider's value within one hex
  /// step.
  pub fn is_settled(&self) -> bool {
    Channel::ALL.into_iter().all(|channel| {
      let slider = self.slider(channel);
      let normalized = crate::widget::normalize(slider.value(), slider.range());
      hex::decode(self.entry(channel).text())
        .is_ok_and(|decoded| (decoded - normalized).abs() <= 1.0 / 255.0)
    })
  }
}

impl ColorSurface for ColorScreen {
  type Entry = EntryModel;
  type Slider = SliderModel;
  type Swatch = SwatchModel;

  fn slider(&self, channel: Channel) -> &SliderModel {
    &self.sliders[channel.index()]
  }

  fn slider_mut(&mut self, channel: Channel) -> &mut SliderModel {
    &mut self.sliders[channel.index()]
  }

  fn entry(&self, channel: Channel) -> &EntryModel {
    &self.entries[channel.index()]
  }

  fn entry_mut(&mut self, channel: Channel) -> &mut EntryModel {
    &mut self.entries[channel.index()]
  }

  fn swatch(&self) -> &SwatchModel {
    &self.swatch
  }

  fn swatch_mut(&mut self) -> &mut SwatchModel {
    &mut self.swatch
  }
}

impl fmt::Display for ColorScreen {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for channel in Channel::ALL {
      writeln!(
        f,
        "{:<5}  slider {:>7.3}  entry {:<4}",
        channel.name(),
        self.slider(channel).value(),
        format!("{:?}", self.entry(channel).text()),
      )?;
    }
    write!(f, "swatch {}", self.swatch.color())
  }
}
