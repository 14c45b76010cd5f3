/// Mailbox: one byte slot shared by the reader thread and the host loop.
///
/// `post` overwrites whatever is unread (latest wins, no queueing);
/// `take` empties the slot. Zero marks the slot empty, so NUL is never
/// deliverable; no race message uses it.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const EMPTY: u8 = 0;

#[derive(Clone, Debug, Default)]
pub struct Mailbox {
    slot: Arc<AtomicU8>,
}

impl Mailbox {
    pub fn new() -> Self {
        Mailbox::default()
    }

    pub fn post(&self, byte: u8) {
        self.slot.store(byte, Ordering::Release);
    }

    pub fn take(&self) -> Option<u8> {
        match self.slot.swap(EMPTY, Ordering::AcqRel) {
            EMPTY => None,
            byte => Some(byte),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.load(Ordering::Acquire) == EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears() {
        let m = Mailbox::new();
        assert_eq!(m.take(), None);
        m.post(b'u');
        assert!(!m.is_empty());
        assert_eq!(m.take(), Some(b'u'));
        assert_eq!(m.take(), None);
        assert!(m.is_empty());
    }

    #[test]
    fn latest_wins() {
        let m = Mailbox::new();
        m.post(b'u');
        m.post(b'l');
        assert_eq!(m.take(), Some(b'l'));
        assert_eq!(m.take(), None);
    }

    #[test]
    fn clones_share_the_slot() {
        let producer = Mailbox::new();
        let consumer = producer.clone();
        let handle = std::thread::spawn(move || producer.post(b'f'));
        handle.join().unwrap();
        assert_eq!(consumer.take(), Some(b'f'));
    }
}
