//! Adapter orchestration: report decoding into the mode controller, protocol
//! detection, connection lifecycle.
//!
//! [`Cd32Bridge`] is the polling-context half of the adapter. The interrupt
//! half, [`crate::shift::ShiftEngine`], is deliberately separate: it is owned
//! by whatever services the edge interrupts and shares nothing with the
//! bridge but the [`PortShared`] word.

use crate::detect::ProtocolDetector;
use crate::mode::ModeController;
use crate::port::{JoystickPort, MillisClock};
use crate::report::{decode, DecodeError, ReportLayout};
use crate::shared::PortShared;
use crate::types::{GamepadState, ProtocolMode};

/// Decode → remap → port pipeline for one connected gamepad.
pub struct Cd32Bridge<'a> {
    layout: ReportLayout,
    controller: ModeController<'a>,
    detector: ProtocolDetector<'a>,
    state: GamepadState,
}

impl<'a> Cd32Bridge<'a> {
    /// `layout` comes from the descriptor layer, `now_ms` stamps the
    /// connection time for the detection settle period.
    #[must_use]
    pub fn new(shared: &'a PortShared, layout: ReportLayout, now_ms: u32) -> Self {
        Self {
            layout,
            controller: ModeController::new(shared),
            detector: ProtocolDetector::new(shared, now_ms),
            state: GamepadState::neutral(),
        }
    }

    /// Decode one raw report and push it to the port.
    ///
    /// On a decode failure the previously published state, and therefore the
    /// output lines, stay exactly as they are; the error is reported for the
    /// caller to log.
    pub fn process_report<P: JoystickPort>(
        &mut self,
        port: &mut P,
        raw: &[u8],
    ) -> Result<(), DecodeError> {
        let state = decode(raw, &self.layout)?;
        self.state = state;
        self.controller.process(port, state);
        Ok(())
    }

    /// Run protocol autodetection if due. May busy-wait for the window
    /// duration; see [`ProtocolDetector::poll`].
    pub fn poll_detection<P, C>(&mut self, port: &mut P, clock: &C)
    where
        P: JoystickPort,
        C: MillisClock,
    {
        self.detector.poll(port, clock, &mut self.controller);
    }

    /// Arm the detection window without waiting. Async callers pair this
    /// with [`finish_detection`] after the window duration.
    ///
    /// [`finish_detection`]: Self::finish_detection
    pub fn open_detection_window<P: JoystickPort>(&mut self, port: &mut P) {
        self.detector.open_window(port);
    }

    /// Close the detection window and apply the decision.
    pub fn finish_detection<P: JoystickPort>(&mut self, port: &mut P) {
        self.detector.finish_window(port, &mut self.controller);
    }

    /// A new device connection was observed: discard the previous detection
    /// decision and drop back to normal mode.
    pub fn reset_connection<P: JoystickPort>(&mut self, port: &mut P, now_ms: u32) {
        self.detector.reset(port, &mut self.controller, now_ms);
    }

    /// Most recently decoded state.
    #[must_use]
    pub fn state(&self) -> GamepadState {
        self.state
    }

    /// Current output protocol.
    #[must_use]
    pub fn mode(&self) -> ProtocolMode {
        self.controller.mode()
    }

    /// Whether detection has run for this connection.
    #[must_use]
    pub fn detection_done(&self) -> bool {
        self.detector.is_done()
    }

    /// Field layout of the connected device.
    #[must_use]
    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }
}
