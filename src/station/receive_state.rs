//! # Receive State
//!
//! Three-state flag shared between the radio interrupt and the main loop.
//!
//! ```text
//! Idle --(interrupt)--> FramePending --(poll)--> Processing --(re-armed)--> Idle
//! ```
//!
//! The interrupt side only ever performs the `Idle -> FramePending` transition;
//! the main loop owns the other two. While the state is not `Idle` the
//! interrupt is masked: further signals are dropped.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReceiveState {
    /// No frame pending, interrupt armed
    Idle = 0,
    /// Interrupt fired, frame waiting in the radio
    FramePending = 1,
    /// Frame being pulled and dispatched, interrupt masked
    Processing = 2,
}

impl ReceiveState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => ReceiveState::Idle,
            1 => ReceiveState::FramePending,
            _ => ReceiveState::Processing,
        }
    }
}

/// Atomic receive state
#[derive(Debug)]
pub struct ReceiveFlag {
    state: AtomicU8,
}

impl ReceiveFlag {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(ReceiveState::Idle as u8),
        }
    }

    pub fn state(&self) -> ReceiveState {
        ReceiveState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Interrupt entry point: `Idle -> FramePending`
    ///
    /// Lock-free and allocation-free. Returns `false` when the signal was
    /// dropped because a frame is already pending or being processed.
    pub fn signal(&self) -> bool {
        self.transition(ReceiveState::Idle, ReceiveState::FramePending)
    }

    /// Main loop: `FramePending -> Processing`, masking the interrupt
    pub fn begin_processing(&self) -> bool {
        self.transition(ReceiveState::FramePending, ReceiveState::Processing)
    }

    /// Main loop: back to `Idle`, unmasking the interrupt
    pub fn finish_processing(&self) {
        self.state.store(ReceiveState::Idle as u8, Ordering::Release);
    }

    fn transition(&self, from: ReceiveState, to: ReceiveState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for ReceiveFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_full_cycle() {
        let flag = ReceiveFlag::new();
        assert_eq!(flag.state(), ReceiveState::Idle);

        assert!(flag.signal());
        assert_eq!(flag.state(), ReceiveState::FramePending);

        assert!(flag.begin_processing());
        assert_eq!(flag.state(), ReceiveState::Processing);

        flag.finish_processing();
        assert_eq!(flag.state(), ReceiveState::Idle);
    }

    #[test]
    fn test_cannot_process_while_idle() {
        let flag = ReceiveFlag::new();
        assert!(!flag.begin_processing());
        assert_eq!(flag.state(), ReceiveState::Idle);
    }

    #[test]
    fn test_signals_coalesce_while_pending() {
        let flag = ReceiveFlag::new();
        assert!(flag.signal());
        assert!(!flag.signal());
        assert!(!flag.signal());
        assert_eq!(flag.state(), ReceiveState::FramePending);
    }

    #[test]
    fn test_signal_masked_while_processing() {
        let flag = ReceiveFlag::new();
        flag.signal();
        flag.begin_processing();

        assert!(!flag.signal());
        assert_eq!(flag.state(), ReceiveState::Processing);
    }

    #[test]
    fn test_concurrent_signals_accept_exactly_one() {
        let flag = Arc::new(ReceiveFlag::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let flag = Arc::clone(&flag);
                thread::spawn(move || flag.signal())
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&accepted| accepted)
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(flag.state(), ReceiveState::FramePending);
    }
}
