//! Keeps every slider and its hex entry in agreement and folds the four
//! channels into one color.
//!
//! Per channel the controller builds two value streams:
//!
//! * slider values, normalized to [0, 1]. Each accepted value is written to
//!   the entry right away as two hex digits.
//! * entry values, decoded from the entry text. Each accepted value is
//!   written back to the slider once the entry has been quiet for
//!   [`SyncConfig::quiescence`].
//!
//! Both feed the channel stream, and the four channel streams are combined
//! according to [`CombinePolicy`]. Every widget write goes through the
//! [`UiExecutor`] handed to [`ColorSyncController::start`].
//!
//! Widgets report programmatic changes as well, so the controller sees its
//! own writes come back. Every write the controller issues runs inside a
//! per-channel write marker, and notifications that arrive while the marker
//! is set are echoes, not edits.
//!
//! The seed values are written to the widgets synchronously in
//! [`ColorSyncController::start`], before anything is wired.

use std::{
  array,
  cell::RefCell,
  rc::Rc,
  sync::{
    Arc,
    atomic::{
      AtomicBool,
      AtomicU64,
      Ordering,
    },
  },
};

use chroma_event::{
  AsyncHook,
  Debounce,
  EventStream,
  HookHandle,
  Subscription,
  combine_latest,
  ui::{
    Gate,
    Gated,
    UiExecutor,
    job,
  },
  zip,
};

use crate::{
  channel::Channel,
  color::Rgba,
  config::{
    CombinePolicy,
    EntryTrigger,
    SyncConfig,
  },
  error::Result,
  hex,
  widget::{
    ColorSurface,
    Entry,
    Slider,
    Swatch,
    denormalize,
    normalize,
  },
};

/// Latest accepted value per channel.
type LatestCache = Rc<RefCell<[f64; 4]>>;

/// Bumped on every accepted edit. A deferred slider write only lands if no
/// newer edit happened on its channel in the meantime.
type EditCounters = Arc<[AtomicU64; 4]>;

/// Per-channel marker raised while the controller writes to that channel's
/// widgets. Widget notifications are synchronous, so anything emitted while
/// the marker is up is the echo of that write.
#[derive(Debug, Clone, Default)]
struct WriteMarker {
  active: Arc<[AtomicBool; 4]>,
}

impl WriteMarker {
  fn write<R>(&self, channel: Channel, f: impl FnOnce() -> R) -> R {
    let flag = &self.active[channel.index()];
    let outer = flag.swap(true, Ordering::Relaxed);
    let result = f();
    flag.store(outer, Ordering::Relaxed);
    result
  }

  fn is_writing(&self, channel: Channel) -> bool {
    self.active[channel.index()].load(Ordering::Relaxed)
  }
}

#[derive(Debug, Clone, Copy)]
struct SliderCorrection {
  value:      f64,
  generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct EntryEdit {
  value:   f64,
  /// False when the entry decodes to the byte the channel already shows.
  changed: bool,
}

struct ChannelWiring {
  stream:        EventStream<f64>,
  subscriptions: Vec<Subscription>,
  hook:          HookHandle<SliderCorrection>,
}

/// Shared state every channel wiring is built from.
struct Wiring<'a, E> {
  config:   &'a SyncConfig,
  executor: &'a Arc<Gated<E>>,
  latest:   &'a LatestCache,
  edits:    &'a EditCounters,
  writes:   &'a WriteMarker,
}

pub struct ColorSyncController {
  config:        SyncConfig,
  colors:        EventStream<Rgba>,
  latest:        LatestCache,
  subscriptions: Vec<Subscription>,
  hooks:         Vec<HookHandle<SliderCorrection>>,
  gate:          Gate,
}

impl ColorSyncController {
  /// Write `config.initial_color` into every widget of `surface`, then wire
  /// up the controller.
  ///
  /// Must be called on the UI thread. Deferred slider updates need a tokio
  /// runtime; without one entry edits still update the color but never move
  /// their sliders.
  pub fn start<S, E>(config: SyncConfig, surface: &mut S, executor: E) -> Result<Self>
  where
    S: ColorSurface,
    E: UiExecutor<S>,
  {
    config.validate()?;
    if tokio::runtime::Handle::try_current().is_err() {
      log::warn!("no tokio runtime, entry edits will not move their sliders");
    }

    let initial = config.initial_color;
    for channel in Channel::ALL {
      let value = initial.get(channel);
      let slider = surface.slider_mut(channel);
      let range = slider.range();
      slider.set_value(denormalize(value, range));
      surface.entry_mut(channel).set_text(&hex::encode(value));
    }
    surface.swatch_mut().set_color(initial);

    let gate = Gate::new();
    let executor = Arc::new(Gated::new(executor, gate.clone()));
    let latest: LatestCache = Rc::new(RefCell::new(initial.to_array()));
    let edits: EditCounters = Arc::new(array::from_fn(|_| AtomicU64::new(0)));
    let writes = WriteMarker::default();
    let wiring = Wiring {
      config:   &config,
      executor: &executor,
      latest:   &latest,
      edits:    &edits,
      writes:   &writes,
    };

    let surface = &*surface;
    let channels = Channel::ALL.map(|channel| wiring.channel(channel, surface));

    let sources = channels.each_ref().map(|wired| &wired.stream);
    let combined = match config.combine {
      CombinePolicy::Latest => combine_latest(sources, initial.to_array()),
      CombinePolicy::Zip => zip(sources),
    };
    let chain = combined
      .map(|values| Rgba::from(*values))
      .inspect(|color| log::debug!("color={color}"));

    let mut subscriptions = Vec::new();
    let colors = EventStream::new();
    subscriptions.push({
      let colors = colors.clone();
      chain.subscribe(move |color| colors.emit(color))
    });
    subscriptions.push({
      let executor = Arc::clone(&executor);
      chain.subscribe(move |color| {
        let color = *color;
        executor.dispatch(job(move |surface: &mut S| {
          surface.swatch_mut().set_color(color)
        }));
      })
    });

    let mut hooks = Vec::with_capacity(channels.len());
    for wired in channels {
      subscriptions.extend(wired.subscriptions);
      hooks.push(wired.hook);
    }

    log::debug!(
      "color sync started: trigger={} combine={} quiescence={}ms",
      config.entry_trigger,
      config.combine,
      config.quiescence_ms
    );

    Ok(Self {
      config,
      colors,
      latest,
      subscriptions,
      hooks,
      gate,
    })
  }

  /// Combined colors, in emission order. The stream goes quiet after
  /// [`ColorSyncController::stop`].
  pub fn colors(&self) -> &EventStream<Rgba> {
    &self.colors
  }

  /// Color assembled from the latest accepted value of every channel.
  pub fn latest(&self) -> Rgba {
    Rgba::from(*self.latest.borrow())
  }

  pub fn config(&self) -> &SyncConfig {
    &self.config
  }

  pub fn is_running(&self) -> bool {
    self.gate.is_open()
  }

  /// Release every listener and pending timer. Jobs already queued on the
  /// UI executor become no-ops.
  pub fn stop(&mut self) {
    if !self.gate.is_open() {
      return;
    }
    self.gate.close();
    self.subscriptions.clear();
    self.hooks.clear();
    log::debug!("color sync stopped");
  }
}

impl Drop for ColorSyncController {
  fn drop(&mut self) {
    self.stop();
  }
}

impl<E> Wiring<'_, E> {
  fn channel<S>(&self, channel: Channel, surface: &S) -> ChannelWiring
  where
    S: ColorSurface,
    E: UiExecutor<S>,
  {
    let index = channel.index();
    let slider = surface.slider(channel);
    let range = slider.range();

    let slider_values = slider
      .value_changed()
      .filter_map({
        let writes = self.writes.clone();
        move |raw: &f64| (!writes.is_writing(channel)).then(|| normalize(*raw, range))
      })
      .inspect(move |value| log::debug!("{channel} slider newValue={value}"))
      .inspect({
        let latest = Rc::clone(self.latest);
        let edits = Arc::clone(self.edits);
        move |value: &f64| {
          latest.borrow_mut()[index] = *value;
          edits[index].fetch_add(1, Ordering::Relaxed);
        }
      });

    let entry = surface.entry(channel);
    let entry_text = match self.config.entry_trigger {
      EntryTrigger::Confirm => entry.completed(),
      EntryTrigger::Keystroke => entry.text_changed(),
    };
    let fallback = self.config.fallback();
    let entry_edits = entry_text
      .filter_map({
        let writes = self.writes.clone();
        move |text: &String| (!writes.is_writing(channel)).then(|| text.clone())
      })
      .inspect(move |text| log::debug!("{channel} entry text={text:?}"))
      .filter_map(move |text| decode_entry(channel, text, fallback))
      .inspect(move |value| log::debug!("{channel} entry value={value}"))
      .map({
        let latest = Rc::clone(self.latest);
        let edits = Arc::clone(self.edits);
        move |value: &f64| {
          let mut latest = latest.borrow_mut();
          let changed = hex::to_byte(latest[index]) != hex::to_byte(*value);
          if changed {
            latest[index] = *value;
            edits[index].fetch_add(1, Ordering::Relaxed);
          }
          EntryEdit {
            value: *value,
            changed,
          }
        }
      });
    // Zip needs every entry event to fill its slot, even one that repeats
    // the current value.
    let every_edit = self.config.combine == CombinePolicy::Zip;
    let entry_values = entry_edits
      .filter_map(move |edit: &EntryEdit| (edit.changed || every_edit).then_some(edit.value));

    let hook = Debounce::new(self.config.quiescence(), {
      let executor = Arc::clone(self.executor);
      let edits = Arc::clone(self.edits);
      let writes = self.writes.clone();
      move |correction: SliderCorrection| {
        let edits = Arc::clone(&edits);
        let writes = writes.clone();
        executor.dispatch(job(move |surface: &mut S| {
          if edits[index].load(Ordering::Relaxed) != correction.generation {
            log::debug!("{channel} slider update superseded by a newer edit");
            return;
          }
          writes.write(channel, || {
            surface
              .slider_mut(channel)
              .set_value(denormalize(correction.value, range));
            surface
              .entry_mut(channel)
              .set_text(&hex::encode(correction.value));
          });
        }));
      }
    })
    .spawn();

    let mut subscriptions = Vec::with_capacity(2);
    subscriptions.push({
      let executor = Arc::clone(self.executor);
      let writes = self.writes.clone();
      slider_values.subscribe(move |value| {
        let text = hex::encode(*value);
        let writes = writes.clone();
        executor.dispatch(job(move |surface: &mut S| {
          writes.write(channel, || surface.entry_mut(channel).set_text(&text))
        }));
      })
    });
    subscriptions.push({
      let tx = hook.sender();
      let edits = Arc::clone(self.edits);
      entry_edits.subscribe(move |edit: &EntryEdit| {
        let correction = SliderCorrection {
          value:      edit.value,
          generation: edits[index].load(Ordering::Relaxed),
        };
        chroma_event::try_send(&tx, correction);
      })
    });

    ChannelWiring {
      stream: slider_values.merge(&entry_values),
      subscriptions,
      hook,
    }
  }
}

fn decode_entry(channel: Channel, text: &str, fallback: Option<f64>) -> Option<f64> {
  match hex::decode(text) {
    Ok(value) => Some(value),
    Err(err) => match fallback {
      Some(fallback) => {
        log::warn!("{channel} entry {text:?}: {err}, using {fallback}");
        Some(fallback)
      },
      None => {
        log::warn!("{channel} entry {text:?}: {err}, ignored");
        None
      },
    },
  }
}
