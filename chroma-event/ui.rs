//! Marshaling of widget mutations onto the UI thread.
//!
//! Code that wants to touch widgets never does so directly. It hands a
//! [`Job`] to a [`UiExecutor`], and whoever owns the widget surface runs the
//! jobs on its own thread, typically by draining [`UiJobs`] from the event
//! loop.

use std::{
  fmt,
  sync::{
    Arc,
    atomic::{
      AtomicBool,
      Ordering,
    },
  },
};

use tokio::sync::mpsc::{
  self,
  UnboundedReceiver,
  UnboundedSender,
  error::TryRecvError,
};

/// A deferred mutation of the UI surface `S`.
pub type Job<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// Box `f` as a [`Job`] for the surface type `S`.
pub fn job<S, F>(f: F) -> Job<S>
where
  F: FnOnce(&mut S) + Send + 'static,
{
  Box::new(f)
}

pub trait UiExecutor<S>: Send + Sync + 'static {
  /// Schedule `job` to run on the thread that owns `S`. Never runs it inline.
  fn dispatch(&self, job: Job<S>);
}

impl<S, E: UiExecutor<S> + ?Sized> UiExecutor<S> for Arc<E> {
  fn dispatch(&self, job: Job<S>) {
    (**self).dispatch(job)
  }
}

/// Create a connected job queue: the sending half is the executor handed to
/// controllers, the receiving half stays with the event loop.
pub fn channel<S>() -> (UiQueue<S>, UiJobs<S>) {
  let (tx, rx) = mpsc::unbounded_channel();
  (UiQueue { tx }, UiJobs { rx })
}

pub struct UiQueue<S> {
  tx: UnboundedSender<Job<S>>,
}

impl<S> Clone for UiQueue<S> {
  fn clone(&self) -> Self {
    Self {
      tx: self.tx.clone(),
    }
  }
}

impl<S> fmt::Debug for UiQueue<S> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("UiQueue")
      .field("closed", &self.tx.is_closed())
      .finish()
  }
}

impl<S: 'static> UiExecutor<S> for UiQueue<S> {
  fn dispatch(&self, job: Job<S>) {
    if self.tx.send(job).is_err() {
      log::warn!("UI job dropped, the event loop is gone");
    }
  }
}

pub struct UiJobs<S> {
  rx: UnboundedReceiver<Job<S>>,
}

impl<S> UiJobs<S> {
  /// Run every queued job, including jobs queued by the jobs themselves.
  /// Returns the number of jobs run.
  pub fn drain(&mut self, surface: &mut S) -> usize {
    let mut ran = 0;
    loop {
      match self.rx.try_recv() {
        Ok(job) => {
          job(surface);
          ran += 1;
        },
        Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
      }
    }
    if ran > 0 {
      log::trace!("ran {ran} UI jobs");
    }
    ran
  }

  /// Wait for the next job. Resolves to `None` once every queue handle has
  /// been dropped.
  pub async fn next(&mut self) -> Option<Job<S>> {
    self.rx.recv().await
  }

  pub fn is_empty(&self) -> bool {
    self.rx.is_empty()
  }
}

/// Shared on/off switch checked both when a job is dispatched and when it
/// runs.
#[derive(Debug, Clone)]
pub struct Gate {
  open: Arc<AtomicBool>,
}

impl Default for Gate {
  fn default() -> Self {
    Self {
      open: Arc::new(AtomicBool::new(true)),
    }
  }
}

impl Gate {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn close(&self) {
    self.open.store(false, Ordering::Release);
  }

  pub fn is_open(&self) -> bool {
    self.open.load(Ordering::Acquire)
  }
}

/// Executor wrapper that turns into a no-op once its [`Gate`] closes.
///
/// Jobs that were already queued when the gate closed are dropped when they
/// come up, so nothing dispatched through a closed wrapper ever touches the
/// surface.
pub struct Gated<E> {
  inner: E,
  gate:  Gate,
}

impl<E> Gated<E> {
  pub fn new(inner: E, gate: Gate) -> Self {
    Self { inner, gate }
  }
}

impl<S: 'static, E: UiExecutor<S>> UiExecutor<S> for Gated<E> {
  fn dispatch(&self, task: Job<S>) {
    if !self.gate.is_open() {
      log::trace!("gate closed, discarding UI job");
      return;
    }
    let gate = self.gate.clone();
    self.inner.dispatch(job(move |surface: &mut S| {
      if gate.is_open() {
        task(surface);
      }
    }));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn jobs_wait_for_drain() {
    let (queue, mut jobs) = channel::<Vec<u8>>();
    let mut surface = Vec::new();

    queue.dispatch(job(|s: &mut Vec<u8>| s.push(1)));
    queue.dispatch(job(|s: &mut Vec<u8>| s.push(2)));
    assert!(surface.is_empty());

    assert_eq!(jobs.drain(&mut surface), 2);
    assert_eq!(surface, vec![1, 2]);
    assert!(jobs.is_empty());
  }

  #[test]
  fn closed_gate_drops_queued_and_new_jobs() {
    let (queue, mut jobs) = channel::<Vec<u8>>();
    let gate = Gate::new();
    let gated = Gated::new(queue, gate.clone());
    let mut surface = Vec::new();

    gated.dispatch(job(|s: &mut Vec<u8>| s.push(1)));
    gate.close();
    gated.dispatch(job(|s: &mut Vec<u8>| s.push(2)));

    // The first job is still in the queue but must not run.
    assert_eq!(jobs.drain(&mut surface), 1);
    assert!(surface.is_empty());
  }

  #[test]
  fn dispatch_after_loop_shutdown_is_harmless() {
    let (queue, jobs) = channel::<Vec<u8>>();
    drop(jobs);
    queue.dispatch(job(|s: &mut Vec<u8>| s.push(1)));
  }
}
