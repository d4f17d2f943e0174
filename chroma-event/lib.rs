//! Event plumbing shared by the picker crates.
//!
//! Widgets publish their change notifications on [`EventStream`]s, which are
//! composed with the operators in [`stream`] and the helpers in [`combine`].
//! Anything that has to wait for a quiet period goes through an
//! [`AsyncHook`], and every widget mutation is funnelled back to the UI
//! thread through [`ui::UiExecutor`].

pub mod combine;
mod debounce;
pub mod stream;
pub mod ui;

pub use combine::{
  combine_latest,
  zip,
};
pub use debounce::{
  AsyncHook,
  Debounce,
  HookHandle,
  try_send,
};
pub use stream::{
  EventStream,
  Subscription,
};
