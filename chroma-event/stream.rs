//! Single-threaded event streams.
//!
//! An [`EventStream`] is a hot multicast source: calling
//! [`EventStream::emit`] hands the value to every current subscriber in
//! registration order. Streams live on the UI thread and are built on
//! `Rc<RefCell<..>>`, so they are neither `Send` nor `Sync`.
//!
//! Operators ([`EventStream::map`], [`EventStream::merge`], ...) return a new
//! stream that owns its upstream [`Subscription`]s. A subscription keeps the
//! stream it was taken on alive, so holding the subscription at the end of a
//! chain keeps the whole chain wired. Dropping it tears the chain down from
//! the bottom up.

use std::{
  cell::RefCell,
  fmt,
  rc::{
    Rc,
    Weak,
  },
};

use smallvec::SmallVec;

type Callback<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
  next_id:     u64,
  subscribers: Vec<(u64, Callback<T>)>,
  // Links to the streams this one is derived from.
  upstream:    Vec<Subscription>,
}

/// Multicast event source.
pub struct EventStream<T> {
  inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for EventStream<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Rc::clone(&self.inner),
    }
  }
}

impl<T> Default for EventStream<T> {
  fn default() -> Self {
    Self {
      inner: Rc::new(RefCell::new(Inner {
        next_id:     0,
        subscribers: Vec::new(),
        upstream:    Vec::new(),
      })),
    }
  }
}

impl<T> fmt::Debug for EventStream<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EventStream")
      .field("subscribers", &self.subscriber_count())
      .finish()
  }
}

impl<T: 'static> EventStream<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Deliver `value` to every subscriber.
  ///
  /// The subscriber list is snapshotted first, so callbacks may subscribe or
  /// unsubscribe (on this or any other stream) while the event is delivered.
  pub fn emit(&self, value: &T) {
    let callbacks: SmallVec<[Callback<T>; 4]> = self
      .inner
      .borrow()
      .subscribers
      .iter()
      .map(|(_, callback)| Rc::clone(callback))
      .collect();
    for callback in callbacks {
      callback(value);
    }
  }

  pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
    let id = {
      let mut inner = self.inner.borrow_mut();
      let id = inner.next_id;
      inner.next_id += 1;
      inner.subscribers.push((id, Rc::new(callback)));
      id
    };

    let inner = Rc::clone(&self.inner);
    Subscription::new(move || {
      // Drop the callback outside the borrow, its captures may release
      // subscriptions of their own.
      let removed = {
        let mut inner = inner.borrow_mut();
        inner
          .subscribers
          .iter()
          .position(|(subscriber, _)| *subscriber == id)
          .map(|index| inner.subscribers.remove(index))
      };
      drop(removed);
    })
  }

  pub fn map<U: 'static>(&self, f: impl Fn(&T) -> U + 'static) -> EventStream<U> {
    self.derive(move |value, out| out.emit(&f(value)))
  }

  pub fn filter_map<U: 'static>(&self, f: impl Fn(&T) -> Option<U> + 'static) -> EventStream<U> {
    self.derive(move |value, out| {
      if let Some(mapped) = f(value) {
        out.emit(&mapped);
      }
    })
  }

  /// Run `f` for its side effect and pass the value through unchanged.
  pub fn inspect(&self, f: impl Fn(&T) + 'static) -> EventStream<T> {
    self.derive(move |value, out| {
      f(value);
      out.emit(value);
    })
  }

  /// Interleave the events of `self` and `other` in arrival order.
  pub fn merge(&self, other: &EventStream<T>) -> EventStream<T> {
    let out = EventStream::new();
    for source in [self, other] {
      let weak = out.downgrade();
      let link = source.subscribe(move |value| {
        if let Some(out) = weak.upgrade() {
          out.emit(value);
        }
      });
      out.adopt(link);
    }
    out
  }

  fn derive<U: 'static>(&self, forward: impl Fn(&T, &EventStream<U>) + 'static) -> EventStream<U> {
    let out = EventStream::new();
    let weak = out.downgrade();
    let link = self.subscribe(move |value| {
      if let Some(out) = weak.upgrade() {
        forward(value, &out);
      }
    });
    out.adopt(link);
    out
  }
}

impl<T> EventStream<T> {
  pub fn subscriber_count(&self) -> usize {
    self.inner.borrow().subscribers.len()
  }

  /// Tie the lifetime of an upstream link to this stream.
  pub(crate) fn adopt(&self, link: Subscription) {
    self.inner.borrow_mut().upstream.push(link);
  }

  pub(crate) fn downgrade(&self) -> WeakStream<T> {
    WeakStream {
      inner: Rc::downgrade(&self.inner),
    }
  }
}

pub(crate) struct WeakStream<T> {
  inner: Weak<RefCell<Inner<T>>>,
}

impl<T> WeakStream<T> {
  pub(crate) fn upgrade(&self) -> Option<EventStream<T>> {
    self.inner.upgrade().map(|inner| EventStream { inner })
  }
}

/// Handle to a registered callback. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
  release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
  fn new(release: impl FnOnce() + 'static) -> Self {
    Self {
      release: Some(Box::new(release)),
    }
  }

  pub fn unsubscribe(mut self) {
    self.release();
  }

  pub fn is_active(&self) -> bool {
    self.release.is_some()
  }

  fn release(&mut self) {
    if let Some(release) = self.release.take() {
      release();
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.release();
  }
}

impl fmt::Debug for Subscription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Subscription")
      .field("active", &self.is_active())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;

  fn collect<T: Clone + 'static>(stream: &EventStream<T>) -> (Rc<RefCell<Vec<T>>>, Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let sub = stream.subscribe(move |value: &T| sink.borrow_mut().push(value.clone()));
    (seen, sub)
  }

  #[test]
  fn emit_reaches_subscribers_in_order() {
    let stream = EventStream::<u8>::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    let first = {
      let order = Rc::clone(&order);
      stream.subscribe(move |v| order.borrow_mut().push(("first", *v)))
    };
    let second = {
      let order = Rc::clone(&order);
      stream.subscribe(move |v| order.borrow_mut().push(("second", *v)))
    };

    stream.emit(&7);

    assert_eq!(*order.borrow(), vec![("first", 7), ("second", 7)]);
    drop((first, second));
  }

  #[test]
  fn dropping_subscription_unsubscribes() {
    let stream = EventStream::<u8>::new();
    let (seen, sub) = collect(&stream);
    stream.emit(&1);
    drop(sub);
    stream.emit(&2);

    assert_eq!(*seen.borrow(), vec![1]);
    assert_eq!(stream.subscriber_count(), 0);
  }

  #[test]
  fn derived_chain_stays_alive_through_subscription() {
    let source = EventStream::<i32>::new();
    let (seen, sub) = collect(&source.map(|v| v * 2).filter_map(|v| (*v > 2).then_some(*v)));

    source.emit(&1);
    source.emit(&2);
    source.emit(&3);
    assert_eq!(*seen.borrow(), vec![4, 6]);
    assert_eq!(source.subscriber_count(), 1);

    drop(sub);
    assert_eq!(source.subscriber_count(), 0);
  }

  #[test]
  fn merge_interleaves_both_sources() {
    let left = EventStream::<&'static str>::new();
    let right = EventStream::<&'static str>::new();
    let (seen, _sub) = collect(&left.merge(&right));

    left.emit(&"a");
    right.emit(&"b");
    left.emit(&"c");

    assert_eq!(*seen.borrow(), vec!["a", "b", "c"]);
  }

  #[test]
  fn inspect_passes_values_through() {
    let source = EventStream::<u8>::new();
    let taps = Rc::new(Cell::new(0));
    let counter = Rc::clone(&taps);
    let (seen, _sub) = collect(&source.inspect(move |_| counter.set(counter.get() + 1)));

    source.emit(&5);

    assert_eq!(taps.get(), 1);
    assert_eq!(*seen.borrow(), vec![5]);
  }

  #[test]
  fn debug_reports_subscriber_count() {
    let stream = EventStream::<String>::new();
    let _sub = stream.subscribe(|_| {});
    assert_eq!(format!("{stream:?}"), "EventStream { subscribers: 1 }");
  }

  #[test]
  fn callback_may_unsubscribe_during_emit() {
    let stream = EventStream::<u8>::new();
    let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
    let hits = Rc::new(Cell::new(0));

    let sub = {
      let slot = Rc::clone(&slot);
      let hits = Rc::clone(&hits);
      stream.subscribe(move |_| {
        hits.set(hits.get() + 1);
        slot.borrow_mut().take();
      })
    };
    *slot.borrow_mut() = Some(sub);

    stream.emit(&1);
    stream.emit(&2);

    assert_eq!(hits.get(), 1);
  }
}
