//! Latest-value broadcast with bounded replay.
//!
//! One producer publishes values (the coordinator's lifecycle state); any
//! number of observers subscribe. A new subscriber first receives the most
//! recent values from the replay buffer, then every later publish.
//!
//! ```text
//! publish(Ready) ──► [current = Ready] ──► replay: [Uninitialized, Ready]
//!                          │
//!                          ├──► subscriber 1 (live)
//!                          └──► subscriber 2 (live)
//!
//! subscribe() ──► receives [Uninitialized, Ready], then live values
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

/// Shared inner state, guarded by one lock so `current`, replay and
/// subscriber list always agree.
#[derive(Debug)]
struct Inner<T> {
    current: T,
    replay: VecDeque<T>,
    replay_capacity: usize,
    subscribers: Vec<Sender<T>>,
    generation: u64,
}

/// Single-producer, multi-consumer broadcast of the latest value.
///
/// Publishing a value equal to the current one is conflated away, so
/// observers only see transitions.
#[derive(Debug)]
pub struct StateBroadcast<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone + PartialEq> StateBroadcast<T> {
    /// Creates a broadcast holding `initial`.
    ///
    /// `replay_capacity` is floored at 1 so a subscriber always learns the
    /// current value.
    #[must_use]
    pub fn new(initial: T, replay_capacity: usize) -> Self {
        let replay_capacity = replay_capacity.max(1);
        let mut replay = VecDeque::with_capacity(replay_capacity);
        replay.push_back(initial.clone());
        Self {
            inner: Mutex::new(Inner {
                current: initial,
                replay,
                replay_capacity,
                subscribers: Vec::new(),
                generation: 0,
            }),
        }
    }

    /// Returns the current value.
    #[must_use]
    pub fn current(&self) -> T {
        self.inner.lock().current.clone()
    }

    /// Returns how many distinct values have been published since creation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    /// Publishes `value`.
    ///
    /// Returns false (and notifies nobody) if `value` equals the current
    /// value. Subscribers whose receiving end was dropped are pruned.
    pub fn publish(&self, value: T) -> bool {
        let mut inner = self.inner.lock();
        if inner.current == value {
            return false;
        }

        if inner.replay.len() == inner.replay_capacity {
            inner.replay.pop_front();
        }
        inner.replay.push_back(value.clone());
        inner.generation += 1;
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(value.clone()).is_ok());
        inner.current = value;
        true
    }

    /// Subscribes to future values, starting with the replay buffer.
    #[must_use]
    pub fn subscribe(&self) -> StateSubscription<T> {
        let (sender, receiver) = unbounded();
        let mut inner = self.inner.lock();
        for value in &inner.replay {
            // Receiver is alive in this scope.
            let _ = sender.send(value.clone());
        }
        inner.subscribers.push(sender);
        StateSubscription { receiver }
    }

    /// Returns the values currently held for replay, oldest first.
    #[must_use]
    pub fn replay(&self) -> Vec<T> {
        self.inner.lock().replay.iter().cloned().collect()
    }
}

/// Receiving end of a [`StateBroadcast`].
///
/// Dropping it unsubscribes on the next publish.
#[derive(Debug)]
pub struct StateSubscription<T> {
    receiver: Receiver<T>,
}

impl<T> StateSubscription<T> {
    /// Returns the next value if one is already queued.
    pub fn try_next(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Waits up to `timeout` for the next value.
    ///
    /// Returns `None` on timeout or when the broadcast was dropped.
    pub fn next_timeout(&self, timeout: Duration) -> Option<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(value) => Some(value),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Returns every value already queued.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Phase {
        Idle,
        Starting,
        Running,
        Stopped,
    }

    #[test]
    fn test_current_and_conflation() {
        let state = StateBroadcast::new(Phase::Idle, 4);
        assert_eq!(state.current(), Phase::Idle);

        assert!(state.publish(Phase::Starting));
        assert!(!state.publish(Phase::Starting));
        assert_eq!(state.current(), Phase::Starting);
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn test_subscriber_gets_replay_then_live() {
        let state = StateBroadcast::new(Phase::Idle, 2);
        state.publish(Phase::Starting);
        state.publish(Phase::Running);

        let sub = state.subscribe();
        assert_eq!(sub.drain(), vec![Phase::Starting, Phase::Running]);

        state.publish(Phase::Stopped);
        assert_eq!(sub.try_next(), Some(Phase::Stopped));
        assert_eq!(sub.try_next(), None);
    }

    #[test]
    fn test_zero_capacity_still_replays_current() {
        let state = StateBroadcast::new(Phase::Idle, 0);
        state.publish(Phase::Running);
        let sub = state.subscribe();
        assert_eq!(sub.drain(), vec![Phase::Running]);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let state = StateBroadcast::new(Phase::Idle, 1);
        let keep = state.subscribe();
        let gone = state.subscribe();
        assert_eq!(state.subscriber_count(), 2);

        drop(gone);
        state.publish(Phase::Running);
        assert_eq!(state.subscriber_count(), 1);
        assert_eq!(keep.drain(), vec![Phase::Idle, Phase::Running]);
    }

    #[test]
    fn test_next_timeout_across_threads() {
        let state = std::sync::Arc::new(StateBroadcast::new(Phase::Idle, 1));
        let sub = state.subscribe();
        assert_eq!(sub.try_next(), Some(Phase::Idle));

        let producer = {
            let state = std::sync::Arc::clone(&state);
            std::thread::spawn(move || {
                state.publish(Phase::Running);
            })
        };

        assert_eq!(sub.next_timeout(Duration::from_secs(5)), Some(Phase::Running));
        producer.join().unwrap();
    }
}
