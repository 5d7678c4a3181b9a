//! State crossing the interrupt boundary.
//!
//! Everything the edge handler and the polling loop both touch lives in one
//! place, [`PortShared`], with the access rules encoded in the API: the
//! multi-bit button word only moves under a critical section, the single-word
//! flags and counters are relaxed atomics.

use core::cell::Cell;

use critical_section::Mutex;
use portable_atomic::{AtomicBool, AtomicU16, Ordering};

use crate::types::{Cd32Buttons, ProtocolMode};

/// Shared state between the polling context (producer) and the edge interrupt
/// handler (consumer).
///
/// Intended to live in a `static`; every constructor is `const`.
pub struct PortShared {
    /// Published button word. Written only under a critical section so the
    /// handler never observes a torn value.
    buttons: Mutex<Cell<u16>>,
    cd32_mode: AtomicBool,
    window_active: AtomicBool,
    latch_pulses: AtomicU16,
    clock_pulses: AtomicU16,
}

impl PortShared {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buttons: Mutex::new(Cell::new(0)),
            cd32_mode: AtomicBool::new(false),
            window_active: AtomicBool::new(false),
            latch_pulses: AtomicU16::new(0),
            clock_pulses: AtomicU16::new(0),
        }
    }

    /// Publish a new button word. Producer side; the critical section is
    /// scoped to this single write.
    pub fn publish_buttons(&self, word: Cd32Buttons) {
        critical_section::with(|cs| self.buttons.borrow(cs).set(word.raw()));
    }

    /// Snapshot the published button word. Consumer side, called at latch
    /// time; the snapshot is then the handler's private copy for the burst.
    #[must_use]
    pub fn snapshot_buttons(&self) -> Cd32Buttons {
        critical_section::with(|cs| Cd32Buttons(self.buttons.borrow(cs).get()))
    }

    #[must_use]
    pub fn mode(&self) -> ProtocolMode {
        if self.cd32_mode.load(Ordering::Relaxed) {
            ProtocolMode::Cd32
        } else {
            ProtocolMode::Normal
        }
    }

    pub(crate) fn set_mode(&self, mode: ProtocolMode) {
        self.cd32_mode
            .store(mode == ProtocolMode::Cd32, Ordering::Relaxed);
    }

    /// Whether a detection window is currently counting edges.
    #[must_use]
    pub fn window_active(&self) -> bool {
        self.window_active.load(Ordering::Relaxed)
    }

    pub(crate) fn open_window(&self) {
        self.latch_pulses.store(0, Ordering::Relaxed);
        self.clock_pulses.store(0, Ordering::Relaxed);
        self.window_active.store(true, Ordering::Relaxed);
    }

    /// Close the window and return the (latch, clock) pulse counts.
    pub(crate) fn close_window(&self) -> (u16, u16) {
        self.window_active.store(false, Ordering::Relaxed);
        (
            self.latch_pulses.load(Ordering::Relaxed),
            self.clock_pulses.load(Ordering::Relaxed),
        )
    }

    /// Drop any window state without reading the counters.
    pub(crate) fn cancel_window(&self) {
        self.window_active.store(false, Ordering::Relaxed);
        self.latch_pulses.store(0, Ordering::Relaxed);
        self.clock_pulses.store(0, Ordering::Relaxed);
    }

    pub(crate) fn count_latch_pulse(&self) {
        self.latch_pulses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count_clock_pulse(&self) {
        self.clock_pulses.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for PortShared {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_word_round_trips() {
        let shared = PortShared::new();
        let word = Cd32Buttons::RED | Cd32Buttons::ID_BITS;
        shared.publish_buttons(word);
        assert_eq!(shared.snapshot_buttons(), word);
    }

    #[test]
    fn test_window_counts_and_closes() {
        let shared = PortShared::new();
        shared.open_window();
        assert!(shared.window_active());
        shared.count_latch_pulse();
        shared.count_latch_pulse();
        shared.count_clock_pulse();
        assert_eq!(shared.close_window(), (2, 1));
        assert!(!shared.window_active());
    }

    #[test]
    fn test_reopening_window_zeroes_counters() {
        let shared = PortShared::new();
        shared.open_window();
        shared.count_latch_pulse();
        shared.close_window();
        shared.open_window();
        assert_eq!(shared.close_window(), (0, 0));
    }

    #[test]
    fn test_mode_defaults_to_normal() {
        let shared = PortShared::new();
        assert_eq!(shared.mode(), ProtocolMode::Normal);
        shared.set_mode(ProtocolMode::Cd32);
        assert_eq!(shared.mode(), ProtocolMode::Cd32);
    }
}
