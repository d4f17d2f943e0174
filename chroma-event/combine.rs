//! Fan-in helpers that fold several streams into one stream of arrays.

use std::{
  array,
  cell::RefCell,
  rc::Rc,
};

use crate::stream::EventStream;

/// Emit `[latest_0, .., latest_n]` whenever any source emits.
///
/// Every slot starts out holding its seed, so the first event from any
/// source already produces a complete array.
pub fn combine_latest<T, const N: usize>(
  sources: [&EventStream<T>; N],
  seeds: [T; N],
) -> EventStream<[T; N]>
where
  T: Clone + 'static,
{
  let out = EventStream::new();
  let latest = Rc::new(RefCell::new(seeds));

  for (index, source) in sources.into_iter().enumerate() {
    let latest = Rc::clone(&latest);
    let weak = out.downgrade();
    let link = source.subscribe(move |value: &T| {
      let snapshot = {
        let mut latest = latest.borrow_mut();
        latest[index] = value.clone();
        (*latest).clone()
      };
      if let Some(out) = weak.upgrade() {
        out.emit(&snapshot);
      }
    });
    out.adopt(link);
  }

  out
}

/// Emit in lockstep once every source has produced a value since the last
/// emission.
///
/// A source that fires again before the others catch up overwrites its
/// pending value, so each emitted array carries the newest value of every
/// source and surplus events are discarded.
pub fn zip<T, const N: usize>(sources: [&EventStream<T>; N]) -> EventStream<[T; N]>
where
  T: Clone + 'static,
{
  let out = EventStream::new();
  let pending: Rc<RefCell<[Option<T>; N]>> = Rc::new(RefCell::new(array::from_fn(|_| None)));

  for (index, source) in sources.into_iter().enumerate() {
    let pending = Rc::clone(&pending);
    let weak = out.downgrade();
    let link = source.subscribe(move |value: &T| {
      let ready = {
        let mut pending = pending.borrow_mut();
        if pending[index].is_some() {
          log::trace!("zip: slot {index} overwritten before the other sources caught up");
        }
        pending[index] = Some(value.clone());
        if pending.iter().all(Option::is_some) {
          let taken: Vec<T> = pending.iter_mut().filter_map(Option::take).collect();
          <[T; N]>::try_from(taken).ok()
        } else {
          None
        }
      };
      if let (Some(values), Some(out)) = (ready, weak.upgrade()) {
        out.emit(&values);
      }
    });
    out.adopt(link);
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record<T: Clone + 'static>(
    stream: &EventStream<T>,
  ) -> (Rc<RefCell<Vec<T>>>, crate::Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let sub = stream.subscribe(move |value: &T| sink.borrow_mut().push(value.clone()));
    (seen, sub)
  }

  #[test]
  fn combine_latest_uses_seeds_for_silent_sources() {
    let a = EventStream::<u8>::new();
    let b = EventStream::<u8>::new();
    let (seen, _sub) = record(&combine_latest([&a, &b], [10, 20]));

    a.emit(&1);
    b.emit(&2);
    a.emit(&3);

    assert_eq!(*seen.borrow(), vec![[1, 20], [1, 2], [3, 2]]);
  }

  #[test]
  fn zip_waits_for_every_source() {
    let a = EventStream::<u8>::new();
    let b = EventStream::<u8>::new();
    let c = EventStream::<u8>::new();
    let (seen, _sub) = record(&zip([&a, &b, &c]));

    a.emit(&1);
    b.emit(&2);
    assert!(seen.borrow().is_empty());

    c.emit(&3);
    assert_eq!(*seen.borrow(), vec![[1, 2, 3]]);
  }

  #[test]
  fn zip_discards_surplus_values() {
    let a = EventStream::<u8>::new();
    let b = EventStream::<u8>::new();
    let (seen, _sub) = record(&zip([&a, &b]));

    a.emit(&1);
    a.emit(&2);
    a.emit(&3);
    b.emit(&9);
    // Nothing queued for `a` after the lockstep emission.
    b.emit(&8);

    assert_eq!(*seen.borrow(), vec![[3, 9]]);
  }

  #[test]
  fn dropping_output_unhooks_sources() {
    let a = EventStream::<u8>::new();
    let b = EventStream::<u8>::new();
    let combined = combine_latest([&a, &b], [0, 0]);
    assert_eq!(a.subscriber_count(), 1);

    drop(combined);

    assert_eq!(a.subscriber_count(), 0);
    assert_eq!(b.subscriber_count(), 0);
  }
}
