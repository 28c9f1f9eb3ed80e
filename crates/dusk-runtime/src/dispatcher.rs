//! The UI-thread cooperative queue.
//!
//! System change notifications can originate on arbitrary OS callback
//! threads. They are never handled there: a [`DispatchHandle`] re-posts
//! them onto the owning thread's queue (fire and forget, no return value)
//! and [`UiDispatcher::drain`] hands them back on the owner thread, in
//! posting order. Draining is the only way messages leave the queue, so a
//! message's entire cascade completes before the next message is looked
//! at.
//!
//! There is deliberately no blocking receive: the engine never suspends a
//! caller. Hosts pump the queue from their existing event loop.

use std::sync::mpsc;

/// Sending half of a [`UiDispatcher`]. Clone freely across threads.
pub struct DispatchHandle<M> {
    sender: mpsc::Sender<M>,
}

impl<M> Clone for DispatchHandle<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<M> DispatchHandle<M> {
    /// Post a message to the owner thread. Fire and forget: if the
    /// dispatcher is gone (shutdown), the message is dropped silently.
    pub fn post(&self, message: M) {
        let _ = self.sender.send(message);
    }
}

/// Single-owner message queue for the UI thread.
pub struct UiDispatcher<M> {
    sender: mpsc::Sender<M>,
    receiver: mpsc::Receiver<M>,
}

impl<M> UiDispatcher<M> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    /// A handle for posting from any thread.
    #[must_use]
    pub fn handle(&self) -> DispatchHandle<M> {
        DispatchHandle {
            sender: self.sender.clone(),
        }
    }

    /// Take every message queued so far, in posting order.
    ///
    /// Messages posted while the caller is still processing the returned
    /// batch wait for the next drain.
    #[must_use]
    pub fn drain(&self) -> Vec<M> {
        let mut messages = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            messages.push(message);
        }
        messages
    }
}

impl<M> Default for UiDispatcher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for UiDispatcher<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiDispatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    #[test]
    fn drain_preserves_posting_order() {
        let queue = UiDispatcher::new();
        let handle = queue.handle();
        handle.post(1);
        handle.post(2);
        handle.post(3);
        assert_eq!(queue.drain(), vec![1, 2, 3]);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn posting_from_other_threads() {
        let queue = UiDispatcher::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let handle = queue.handle();
                thread::spawn(move || handle.post(i))
            })
            .collect();
        for join_handle in handles {
            join_handle.join().unwrap();
        }
        let mut drained = queue.drain();
        drained.sort_unstable();
        assert_eq!(drained, vec![0, 1, 2, 3]);
    }

    #[test]
    fn post_after_drop_is_silent() {
        let queue = UiDispatcher::new();
        let handle = queue.handle();
        drop(queue);
        handle.post(42); // Must not panic.
    }

    proptest! {
        #[test]
        fn proptest_drain_is_fifo(messages in prop::collection::vec(0u32..1000, 0..64)) {
            let queue = UiDispatcher::new();
            let handle = queue.handle();
            for &message in &messages {
                handle.post(message);
            }
            prop_assert_eq!(queue.drain(), messages);
        }
    }
}
