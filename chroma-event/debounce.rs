//! Utilities for declaring an async (usually debounced) hook

use std::{
  fmt,
  time::Duration,
};

use tokio::{
  sync::mpsc::{
    self,
    Sender,
    error::TrySendError,
  },
  task::JoinHandle,
  time::Instant,
};

/// Events queued for a hook before it gets polled. Widget notifications are
/// drained as soon as the runtime runs, so this only matters for bursts.
const HOOK_CAPACITY: usize = 256;

/// Async hooks run as a background tokio task that waits for events sent
/// through a channel. `handle_event` decides whether an event is consumed
/// right away or (re)arms a deadline; `finish_debounce` runs once the
/// deadline passes without another event pushing it back.
pub trait AsyncHook: Sync + Send + 'static + Sized {
  type Event: Sync + Send + 'static;
  /// Called immediately whenever an event is received. Returns the deadline
  /// to wait for: a new one, the current `timeout`, or `None` to disarm.
  fn handle_event(&mut self, event: Self::Event, timeout: Option<Instant>) -> Option<Instant>;

  /// Called whenever the debounce timeline is reached
  fn finish_debounce(&mut self);

  fn spawn(self) -> HookHandle<Self::Event> {
    let (tx, rx) = mpsc::channel(HOOK_CAPACITY);
    // only spawn worker if we are inside runtime to avoid having to spawn a runtime
    // for unrelated unit tests
    let task = match tokio::runtime::Handle::try_current() {
      Ok(handle) => Some(handle.spawn(run(self, rx))),
      Err(_) => {
        log::debug!("no tokio runtime, hook events will not be processed");
        None
      },
    };
    HookHandle { tx, task }
  }
}

async fn run<Hook: AsyncHook>(mut hook: Hook, mut rx: mpsc::Receiver<Hook::Event>) {
  let mut deadline = None;
  loop {
    let event = match deadline {
      Some(deadline_) => {
        let res = tokio::time::timeout_at(deadline_, rx.recv()).await;
        match res {
          Ok(event) => event,
          Err(_) => {
            hook.finish_debounce();
            deadline = None;
            continue;
          },
        }
      },
      None => rx.recv().await,
    };
    // All senders gone: a pending deadline is abandoned, not flushed.
    let Some(event) = event else {
      break;
    };
    deadline = hook.handle_event(event, deadline);
  }
}

/// Owning handle of a spawned hook.
///
/// Dropping the handle (or calling [`HookHandle::cancel`]) aborts the worker
/// task, so a debounce that has not fired yet never fires.
pub struct HookHandle<E> {
  tx:   Sender<E>,
  task: Option<JoinHandle<()>>,
}

impl<E> HookHandle<E> {
  /// Queue an event without blocking. Returns false if it was dropped.
  pub fn send(&self, event: E) -> bool {
    try_send(&self.tx, event)
  }

  /// A detached sender for callers that outlive a borrow of the handle.
  pub fn sender(&self) -> Sender<E> {
    self.tx.clone()
  }

  /// Whether a worker task is attached and still alive.
  pub fn is_running(&self) -> bool {
    self.task.as_ref().is_some_and(|task| !task.is_finished())
  }

  pub fn cancel(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl<E> Drop for HookHandle<E> {
  fn drop(&mut self) {
    self.cancel();
  }
}

impl<E> fmt::Debug for HookHandle<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("HookHandle")
      .field("running", &self.is_running())
      .finish()
  }
}

/// Try to send an event without blocking at all.
/// Returns true if the event was sent, false if the channel was full or closed.
pub fn try_send<T>(tx: &Sender<T>, data: T) -> bool {
  match tx.try_send(data) {
    Ok(()) => true,
    Err(TrySendError::Full(_)) => {
      log::warn!("hook channel full, dropping event");
      false
    },
    Err(TrySendError::Closed(_)) => {
      log::warn!("Attempted to send to closed channel");
      false
    },
  }
}

/// Latest-value-wins debounce.
///
/// Every event replaces the pending value and pushes the deadline back by
/// `delay`; when the deadline passes the pending value goes to `sink`.
pub struct Debounce<T> {
  delay:   Duration,
  pending: Option<T>,
  sink:    Box<dyn FnMut(T) + Send + Sync>,
}

impl<T> Debounce<T> {
  pub fn new(delay: Duration, sink: impl FnMut(T) + Send + Sync + 'static) -> Self {
    Self {
      delay,
      pending: None,
      sink: Box::new(sink),
    }
  }
}

impl<T: Send + Sync + 'static> AsyncHook for Debounce<T> {
  type Event = T;

  fn handle_event(&mut self, event: T, _timeout: Option<Instant>) -> Option<Instant> {
    self.pending = Some(event);
    Some(Instant::now() + self.delay)
  }

  fn finish_debounce(&mut self) {
    if let Some(value) = self.pending.take() {
      (self.sink)(value);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    Mutex,
  };

  use super::*;

  fn recording_debounce(delay_ms: u64) -> (HookHandle<u32>, Arc<Mutex<Vec<u32>>>) {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    let hook = Debounce::new(Duration::from_millis(delay_ms), move |value| {
      sink.lock().unwrap().push(value)
    });
    (hook.spawn(), fired)
  }

  #[tokio::test(start_paused = true)]
  async fn fires_once_after_quiet_period() {
    let (handle, fired) = recording_debounce(500);

    assert!(handle.send(1));
    tokio::time::sleep(Duration::from_millis(499)).await;
    assert!(fired.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(*fired.lock().unwrap(), vec![1]);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(*fired.lock().unwrap(), vec![1]);
  }

  #[tokio::test(start_paused = true)]
  async fn newer_events_supersede_pending_ones() {
    let (handle, fired) = recording_debounce(500);

    handle.send(1);
    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.send(2);
    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.send(3);
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(*fired.lock().unwrap(), vec![3]);
  }

  #[tokio::test(start_paused = true)]
  async fn cancel_discards_pending_value() {
    let (mut handle, fired) = recording_debounce(500);

    handle.send(1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.cancel();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(fired.lock().unwrap().is_empty());
    assert!(!handle.is_running());
  }

  #[test]
  fn spawn_outside_runtime_is_inert() {
    let (handle, fired) = recording_debounce(10);
    assert!(!handle.is_running());
    // The receiver went away with the unspawned worker.
    assert!(!handle.send(1));
    assert!(fired.lock().unwrap().is_empty());
  }
}
