//! Protocol mode control and the direct output path.
//!
//! The mode controller runs in the polling context. It owns the Normal-mode
//! view of the port (direction lines always, button lines while no host
//! protocol is active) and is the sole writer of the shared button word.

use crate::port::{JoystickPort, Level, Line, LineRole};
use crate::shared::PortShared;
use crate::types::{Cd32Buttons, ExtraButtons, GamepadState, PadButtons, ProtocolMode};

/// Remap a decoded [`GamepadState`] onto the CD32 button word.
///
/// Fixed table: primary buttons 1-4 land on word bits 2, 0, 1, 3; the first
/// two extra buttons on bits 5 and 4; extra buttons 9 or 10 on bit 6. The
/// presence bits 8 and 9 are always set.
#[must_use]
pub fn cd32_button_word(state: GamepadState) -> Cd32Buttons {
    let mut word = Cd32Buttons::ID_BITS;
    if state.pad.contains(PadButtons::BTN1) {
        word |= Cd32Buttons::RED;
    }
    if state.pad.contains(PadButtons::BTN2) {
        word |= Cd32Buttons::BLUE;
    }
    if state.pad.contains(PadButtons::BTN3) {
        word |= Cd32Buttons::GREEN;
    }
    if state.pad.contains(PadButtons::BTN4) {
        word |= Cd32Buttons::YELLOW;
    }
    if state.extra.contains(ExtraButtons::BTN5) {
        word |= Cd32Buttons::SHOULDER_L;
    }
    if state.extra.contains(ExtraButtons::BTN6) {
        word |= Cd32Buttons::SHOULDER_R;
    }
    if state.extra.contains(ExtraButtons::BTN9) || state.extra.contains(ExtraButtons::BTN10) {
        word |= Cd32Buttons::PLAY;
    }
    word
}

/// Drives the port from decoded gamepad state and owns the protocol mode.
pub struct ModeController<'a> {
    shared: &'a PortShared,
}

impl<'a> ModeController<'a> {
    #[must_use]
    pub fn new(shared: &'a PortShared) -> Self {
        Self { shared }
    }

    /// Current output protocol.
    #[must_use]
    pub fn mode(&self) -> ProtocolMode {
        self.shared.mode()
    }

    /// Push one decoded state out to the port.
    ///
    /// Direction lines are driven unconditionally. The CD32 button word is
    /// republished on every call. In Normal mode the three dual-purpose lines
    /// carry the primary buttons; in CD32 mode they belong to the shift
    /// engine and are not touched here.
    pub fn process<P: JoystickPort>(&mut self, port: &mut P, state: GamepadState) {
        port.write(
            Line::Right,
            Level::active_low(state.pad.contains(PadButtons::RIGHT)),
        );
        port.write(
            Line::Left,
            Level::active_low(state.pad.contains(PadButtons::LEFT)),
        );
        port.write(
            Line::Down,
            Level::active_low(state.pad.contains(PadButtons::DOWN)),
        );
        port.write(
            Line::Up,
            Level::active_low(state.pad.contains(PadButtons::UP)),
        );

        self.shared.publish_buttons(cd32_button_word(state));

        if self.shared.mode() == ProtocolMode::Normal {
            port.write(
                Line::Clock,
                Level::active_low(state.pad.contains(PadButtons::BTN1)),
            );
            port.write(
                Line::Latch,
                Level::active_low(state.pad.contains(PadButtons::BTN2)),
            );
            port.write(
                Line::Data,
                Level::active_low(state.pad.contains(PadButtons::BTN3)),
            );
        }
    }

    /// Switch the port to the CD32 serial protocol. No-op if already there.
    pub fn enable_cd32<P: JoystickPort>(&mut self, port: &mut P) {
        if self.shared.mode() == ProtocolMode::Cd32 {
            return;
        }
        self.shared.set_mode(ProtocolMode::Cd32);
        Self::claim_protocol_lines(port);
    }

    /// Switch the port back to plain joystick outputs. No-op if already there.
    pub fn disable_cd32<P: JoystickPort>(&mut self, port: &mut P) {
        if self.shared.mode() == ProtocolMode::Normal {
            return;
        }
        self.shared.set_mode(ProtocolMode::Normal);
        Self::release_protocol_lines(port);
    }

    /// Hand Latch and Clock to the host: pulled-up inputs, edges armed.
    pub(crate) fn claim_protocol_lines<P: JoystickPort>(port: &mut P) {
        for line in [Line::Latch, Line::Clock] {
            port.set_role(line, LineRole::PullUpInput);
            port.set_edge_irq(line, true);
        }
    }

    /// Return Latch and Clock to released button outputs.
    pub(crate) fn release_protocol_lines<P: JoystickPort>(port: &mut P) {
        for line in [Line::Latch, Line::Clock] {
            port.set_edge_irq(line, false);
            port.set_role(line, LineRole::Output);
            port.write(line, Level::High);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPort;

    fn expected_word(pad: u8, extra: u8) -> u16 {
        let mut word = (1 << 8) | (1 << 9);
        if pad & (1 << 4) != 0 {
            word |= 1 << 2;
        }
        if pad & (1 << 5) != 0 {
            word |= 1 << 0;
        }
        if pad & (1 << 6) != 0 {
            word |= 1 << 1;
        }
        if pad & (1 << 7) != 0 {
            word |= 1 << 3;
        }
        if extra & (1 << 0) != 0 {
            word |= 1 << 5;
        }
        if extra & (1 << 1) != 0 {
            word |= 1 << 4;
        }
        if extra & (0b11 << 4) != 0 {
            word |= 1 << 6;
        }
        word
    }

    #[test]
    fn test_remap_matches_table_for_all_inputs() {
        for pad in 0..=255u8 {
            for extra in 0..=255u8 {
                let state = GamepadState {
                    pad: PadButtons(pad),
                    extra: ExtraButtons(extra),
                };
                assert_eq!(
                    cd32_button_word(state).raw(),
                    expected_word(pad, extra),
                    "pad={pad:#010b} extra={extra:#010b}"
                );
            }
        }
    }

    #[test]
    fn test_presence_bits_always_set() {
        assert!(cd32_button_word(GamepadState::neutral()).contains(Cd32Buttons::ID_BITS));
    }

    #[test]
    fn test_direction_lines_are_active_low() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut port = MockPort::new();

        let state = GamepadState {
            pad: PadButtons::RIGHT | PadButtons::UP,
            extra: ExtraButtons::NONE,
        };
        controller.process(&mut port, state);

        assert_eq!(port.output_of(Line::Right), Level::Low);
        assert_eq!(port.output_of(Line::Up), Level::Low);
        assert_eq!(port.output_of(Line::Left), Level::High);
        assert_eq!(port.output_of(Line::Down), Level::High);
    }

    #[test]
    fn test_normal_mode_drives_button_lines() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut port = MockPort::new();

        let state = GamepadState {
            pad: PadButtons::BTN1 | PadButtons::BTN3,
            extra: ExtraButtons::NONE,
        };
        controller.process(&mut port, state);

        assert_eq!(port.output_of(Line::Clock), Level::Low);
        assert_eq!(port.output_of(Line::Latch), Level::High);
        assert_eq!(port.output_of(Line::Data), Level::Low);
    }

    #[test]
    fn test_cd32_mode_leaves_protocol_lines_alone() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut port = MockPort::new();
        controller.enable_cd32(&mut port);

        let writes_after_enable = port.writes;
        let state = GamepadState {
            pad: PadButtons::BTN1 | PadButtons::BTN2 | PadButtons::BTN3,
            extra: ExtraButtons::NONE,
        };
        controller.process(&mut port, state);

        // Only the four direction lines were written.
        assert_eq!(port.writes, writes_after_enable + 4);
        assert_eq!(port.output_of(Line::Data), Level::High);
    }

    #[test]
    fn test_process_publishes_button_word() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut port = MockPort::new();

        let state = GamepadState {
            pad: PadButtons::BTN1,
            extra: ExtraButtons::NONE,
        };
        controller.process(&mut port, state);

        assert_eq!(
            shared.snapshot_buttons(),
            Cd32Buttons::RED | Cd32Buttons::ID_BITS
        );
    }

    #[test]
    fn test_enable_cd32_configures_host_lines() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut port = MockPort::new();

        controller.enable_cd32(&mut port);

        assert_eq!(controller.mode(), ProtocolMode::Cd32);
        for line in [Line::Latch, Line::Clock] {
            assert_eq!(port.role_of(line), LineRole::PullUpInput);
            assert!(port.irq_enabled(line));
        }
        assert_eq!(port.role_of(Line::Data), LineRole::Output);
    }

    #[test]
    fn test_enable_cd32_is_idempotent() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut port = MockPort::new();

        controller.enable_cd32(&mut port);
        let ops = port.op_count();
        controller.enable_cd32(&mut port);
        assert_eq!(port.op_count(), ops);
        assert_eq!(controller.mode(), ProtocolMode::Cd32);
    }

    #[test]
    fn test_disable_cd32_releases_lines_and_is_idempotent() {
        let shared = PortShared::new();
        let mut controller = ModeController::new(&shared);
        let mut port = MockPort::new();

        controller.enable_cd32(&mut port);
        controller.disable_cd32(&mut port);

        assert_eq!(controller.mode(), ProtocolMode::Normal);
        for line in [Line::Latch, Line::Clock] {
            assert_eq!(port.role_of(line), LineRole::Output);
            assert!(!port.irq_enabled(line));
            assert_eq!(port.output_of(line), Level::High);
        }

        let ops = port.op_count();
        controller.disable_cd32(&mut port);
        assert_eq!(port.op_count(), ops);
    }
}
