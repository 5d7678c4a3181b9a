//! CD32 serial shift-out state machine.
//!
//! This is the edge interrupt service logic: the platform layer calls
//! [`ShiftEngine::on_latch_edge`] on either latch transition and
//! [`ShiftEngine::on_clock_edge`] on clock rising edges. Every path is
//! non-blocking, allocation-free and bounded.
//!
//! A burst starts on the latch falling edge: the shared button word is
//! snapshotted, the levels of the three dual-purpose lines are saved, and
//! bit 0 appears on the data line immediately. Each clock rising edge then
//! advances one bit. The latch rising edge restores the saved levels so the
//! lines resume their Normal-mode meaning between bursts.

use crate::port::{JoystickPort, Level, Line};
use crate::shared::PortShared;
use crate::types::{Cd32Buttons, ProtocolMode};

/// Highest bit index emitted in a burst (bits 0..=9: seven buttons, one
/// unused bit, two presence bits).
pub const LAST_SHIFT_INDEX: u8 = 9;

/// Per-burst state, owned exclusively by the interrupt context.
pub struct ShiftEngine<'a> {
    shared: &'a PortShared,
    index: u8,
    latched: Cd32Buttons,
    /// Output levels of the dual-purpose lines at burst start, bit order per
    /// [`Line::PROTOCOL`].
    saved_levels: u8,
}

impl<'a> ShiftEngine<'a> {
    #[must_use]
    pub fn new(shared: &'a PortShared) -> Self {
        Self {
            shared,
            index: 0,
            latched: Cd32Buttons::NONE,
            saved_levels: 0,
        }
    }

    /// Latch edge service routine. Called on both transitions; the current
    /// line level distinguishes falling from rising.
    pub fn on_latch_edge<P: JoystickPort>(&mut self, port: &mut P) {
        if self.shared.window_active() {
            self.shared.count_latch_pulse();
            return;
        }
        if self.shared.mode() != ProtocolMode::Cd32 {
            // Line is an ordinary button output; nothing to service.
            return;
        }
        match port.input_level(Line::Latch) {
            Level::Low => self.begin_burst(port),
            Level::High => self.end_burst(port),
        }
    }

    /// Clock rising-edge service routine.
    pub fn on_clock_edge<P: JoystickPort>(&mut self, port: &mut P) {
        if self.shared.window_active() {
            self.shared.count_clock_pulse();
            return;
        }
        if self.shared.mode() != ProtocolMode::Cd32 {
            return;
        }
        if self.index >= LAST_SHIFT_INDEX {
            // Host-paced: surplus clocks after the last bit change nothing.
            return;
        }
        self.index += 1;
        self.drive_data(port);
    }

    /// Bit index of the burst in progress, 0 when idle.
    #[must_use]
    pub fn bit_index(&self) -> u8 {
        self.index
    }

    fn begin_burst<P: JoystickPort>(&mut self, port: &mut P) {
        self.latched = self.shared.snapshot_buttons();
        self.index = 0;

        self.saved_levels = 0;
        for (i, &line) in Line::PROTOCOL.iter().enumerate() {
            if port.output_level(line) == Level::High {
                self.saved_levels |= 1 << i;
            }
        }

        // Bit 0 goes out with the latch itself, before any clock arrives.
        self.drive_data(port);
    }

    fn end_burst<P: JoystickPort>(&mut self, port: &mut P) {
        for (i, &line) in Line::PROTOCOL.iter().enumerate() {
            let level = if self.saved_levels & (1 << i) != 0 {
                Level::High
            } else {
                Level::Low
            };
            port.write(line, level);
        }
    }

    fn drive_data<P: JoystickPort>(&mut self, port: &mut P) {
        port.write(Line::Data, Level::active_low(self.latched.bit(self.index)));
    }
}
