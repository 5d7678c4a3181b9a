//! One-shot protocol autodetection.
//!
//! A CD32 host continuously strobes latch and clock; a plain joystick port
//! leaves both lines quiet. Shortly after a device connection the detector
//! opens a timed window, lets the edge handler count pulses on both lines,
//! and picks the output protocol from the counts.

use crate::mode::ModeController;
use crate::port::{JoystickPort, MillisClock};
use crate::shared::PortShared;

/// Quiet period after connection before the lines are sniffed.
pub const DETECT_SETTLE_MS: u32 = 500;

/// Length of the sniffing window.
pub const DETECT_WINDOW_MS: u32 = 100;

/// Minimum edge count on each line for the host to qualify as CD32.
pub const DETECT_MIN_PULSES: u16 = 5;

/// One-shot detector; runs in the polling context only.
pub struct ProtocolDetector<'a> {
    shared: &'a PortShared,
    done: bool,
    connected_at: u32,
}

impl<'a> ProtocolDetector<'a> {
    /// `now_ms` stamps the connection time the settle period counts from.
    #[must_use]
    pub fn new(shared: &'a PortShared, now_ms: u32) -> Self {
        Self {
            shared,
            done: false,
            connected_at: now_ms,
        }
    }

    /// Whether detection has already been attempted for this connection.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Run detection if due.
    ///
    /// No-ops while already decided or still inside the settle period.
    /// Otherwise opens the window and busy-waits [`DETECT_WINDOW_MS`] on the
    /// injected clock before deciding; the bound is a protocol contract, and
    /// the edge handler keeps counting pulses while this spins.
    pub fn poll<P, C>(&mut self, port: &mut P, clock: &C, controller: &mut ModeController<'_>)
    where
        P: JoystickPort,
        C: MillisClock,
    {
        if self.done {
            return;
        }
        if clock.now_ms().wrapping_sub(self.connected_at) < DETECT_SETTLE_MS {
            return;
        }

        self.open_window(port);
        let opened = clock.now_ms();
        while clock.now_ms().wrapping_sub(opened) < DETECT_WINDOW_MS {}
        self.finish_window(port, controller);
    }

    /// Arm the sniffing window: counters zeroed, Latch and Clock presented as
    /// pulled-up inputs with edges enabled. Marks detection as attempted.
    ///
    /// Callers that cannot busy-wait pair this with [`finish_window`] after
    /// [`DETECT_WINDOW_MS`] of their own timing.
    ///
    /// [`finish_window`]: Self::finish_window
    pub fn open_window<P: JoystickPort>(&mut self, port: &mut P) {
        self.done = true;
        self.shared.open_window();
        ModeController::claim_protocol_lines(port);
    }

    /// Close the window and apply the decision.
    pub fn finish_window<P: JoystickPort>(
        &mut self,
        port: &mut P,
        controller: &mut ModeController<'_>,
    ) {
        let (latch, clock) = self.shared.close_window();
        let cd32 = latch >= DETECT_MIN_PULSES && clock >= DETECT_MIN_PULSES;
        #[cfg(feature = "defmt")]
        defmt::info!(
            "host detection: latch pulses={} clock pulses={} cd32={}",
            latch,
            clock,
            cd32
        );
        if cd32 {
            controller.enable_cd32(port);
        } else {
            // The window borrowed Latch/Clock as inputs while the mode flag
            // never left Normal; hand them back before the no-op disable.
            ModeController::release_protocol_lines(port);
            controller.disable_cd32(port);
        }
    }

    /// Forget any previous decision. Called when a new device connection is
    /// observed; the settle period restarts from `now_ms`.
    pub fn reset<P: JoystickPort>(
        &mut self,
        port: &mut P,
        controller: &mut ModeController<'_>,
        now_ms: u32,
    ) {
        self.done = false;
        self.shared.cancel_window();
        self.connected_at = now_ms;
        controller.disable_cd32(port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockClock, MockPort};
    use crate::port::{Line, LineRole};
    use crate::types::ProtocolMode;

    fn pulse(shared: &PortShared, port: &mut MockPort, latch: u16, clock: u16) {
        let mut engine = crate::shift::ShiftEngine::new(shared);
        for _ in 0..latch {
            engine.on_latch_edge(port);
        }
        for _ in 0..clock {
            engine.on_clock_edge(port);
        }
    }

    #[test]
    fn test_quiet_until_settle_period_elapses() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut detector = ProtocolDetector::new(&shared, 0);
        let mut port = MockPort::new();
        let clock = MockClock::new();

        clock.set(DETECT_SETTLE_MS - 1);
        detector.poll(&mut port, &clock, &mut controller);

        assert!(!detector.is_done());
        assert_eq!(port.op_count(), 0);
    }

    #[test]
    fn test_quiet_lines_select_normal_mode() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut detector = ProtocolDetector::new(&shared, 0);
        let mut port = MockPort::new();
        // Advance on every read so the window busy-wait terminates.
        let clock = MockClock::auto_advancing(25);
        clock.set(DETECT_SETTLE_MS);

        detector.poll(&mut port, &clock, &mut controller);

        assert!(detector.is_done());
        assert_eq!(controller.mode(), ProtocolMode::Normal);
        // Lines borrowed by the window are back to released outputs.
        for line in [Line::Latch, Line::Clock] {
            assert_eq!(port.role_of(line), LineRole::Output);
            assert!(!port.irq_enabled(line));
        }
    }

    #[test]
    fn test_detection_runs_once() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut detector = ProtocolDetector::new(&shared, 0);
        let mut port = MockPort::new();
        let clock = MockClock::auto_advancing(25);
        clock.set(DETECT_SETTLE_MS);

        detector.poll(&mut port, &clock, &mut controller);
        let ops = port.op_count();
        detector.poll(&mut port, &clock, &mut controller);
        assert_eq!(port.op_count(), ops);
    }

    #[test]
    fn test_threshold_pulses_enable_cd32() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut detector = ProtocolDetector::new(&shared, 0);
        let mut port = MockPort::new();

        detector.open_window(&mut port);
        pulse(&shared, &mut port, DETECT_MIN_PULSES, DETECT_MIN_PULSES);
        detector.finish_window(&mut port, &mut controller);

        assert_eq!(controller.mode(), ProtocolMode::Cd32);
        for line in [Line::Latch, Line::Clock] {
            assert_eq!(port.role_of(line), LineRole::PullUpInput);
            assert!(port.irq_enabled(line));
        }
    }

    #[test]
    fn test_one_pulse_short_stays_normal() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut detector = ProtocolDetector::new(&shared, 0);
        let mut port = MockPort::new();

        detector.open_window(&mut port);
        pulse(
            &shared,
            &mut port,
            DETECT_MIN_PULSES - 1,
            DETECT_MIN_PULSES,
        );
        detector.finish_window(&mut port, &mut controller);

        assert_eq!(controller.mode(), ProtocolMode::Normal);

        // Same on the other line.
        detector.reset(&mut port, &mut controller, 0);
        detector.open_window(&mut port);
        pulse(
            &shared,
            &mut port,
            DETECT_MIN_PULSES,
            DETECT_MIN_PULSES - 1,
        );
        detector.finish_window(&mut port, &mut controller);

        assert_eq!(controller.mode(), ProtocolMode::Normal);
    }

    #[test]
    fn test_reset_allows_redetection() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut detector = ProtocolDetector::new(&shared, 0);
        let mut port = MockPort::new();

        detector.open_window(&mut port);
        pulse(&shared, &mut port, 10, 10);
        detector.finish_window(&mut port, &mut controller);
        assert_eq!(controller.mode(), ProtocolMode::Cd32);

        detector.reset(&mut port, &mut controller, 1000);
        assert!(!detector.is_done());
        assert_eq!(controller.mode(), ProtocolMode::Normal);
        assert!(!shared.window_active());

        // A quiet second connection settles on normal mode.
        let clock = MockClock::auto_advancing(25);
        clock.set(1000 + DETECT_SETTLE_MS);
        detector.poll(&mut port, &clock, &mut controller);
        assert!(detector.is_done());
        assert_eq!(controller.mode(), ProtocolMode::Normal);
    }
}
