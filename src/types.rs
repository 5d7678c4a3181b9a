//! Core adapter types: button bitfields, gamepad state, protocol mode.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Direction and primary-button state, laid out the way the joystick port
/// consumes it.
///
/// Bits 0-3 are the four directions, bits 4-7 the four primary fire buttons.
/// All bits are logical (1 = active); the port layer applies the active-low
/// encoding when driving lines.
///
/// # Example
///
/// ```
/// use usb_to_cd32::PadButtons;
///
/// let pad = PadButtons::RIGHT | PadButtons::BTN1;
/// assert!(pad.contains(PadButtons::RIGHT));
/// assert!(!pad.contains(PadButtons::LEFT));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadButtons(pub u8);

impl PadButtons {
    pub const RIGHT: Self = Self(1 << 0);
    pub const LEFT: Self = Self(1 << 1);
    pub const DOWN: Self = Self(1 << 2);
    pub const UP: Self = Self(1 << 3);
    pub const BTN1: Self = Self(1 << 4); // USB button 0
    pub const BTN2: Self = Self(1 << 5); // USB button 1
    pub const BTN3: Self = Self(1 << 6); // USB button 2
    pub const BTN4: Self = Self(1 << 7); // USB button 3

    /// Nothing active.
    pub const NONE: Self = Self(0);

    /// Check if the given bit(s) are set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Set or clear bit(s).
    #[inline]
    pub fn set(&mut self, other: Self, active: bool) {
        if active {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }

    /// Get the raw u8 value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Check if nothing is active.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for PadButtons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PadButtons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PadButtons {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for PadButtons {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for PadButtons {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

/// Additional button state beyond the four primary buttons.
///
/// Bits 0-2 carry USB buttons 4-6, bits 3-7 carry USB buttons 7-11.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtraButtons(pub u8);

impl ExtraButtons {
    pub const BTN5: Self = Self(1 << 0);
    pub const BTN6: Self = Self(1 << 1);
    pub const BTN7: Self = Self(1 << 2);
    pub const BTN8: Self = Self(1 << 3);
    pub const BTN9: Self = Self(1 << 4);
    pub const BTN10: Self = Self(1 << 5);
    pub const BTN11: Self = Self(1 << 6);
    pub const BTN12: Self = Self(1 << 7);

    pub const NONE: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub fn set(&mut self, other: Self, active: bool) {
        if active {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Normalized gamepad snapshot, produced fresh by each decoded report.
///
/// No history is retained; a new snapshot simply replaces the previous one.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GamepadState {
    pub pad: PadButtons,
    pub extra: ExtraButtons,
}

impl GamepadState {
    /// Sticks centered, no buttons pressed.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            pad: PadButtons::NONE,
            extra: ExtraButtons::NONE,
        }
    }
}

/// The 16-bit button word shifted out over the CD32 serial protocol.
///
/// Bits 0-6 are the seven pad buttons, bit 7 is unused, bits 8-9 are the
/// always-set presence bits a CD32 host samples to recognize a serial pad.
/// Colour names follow the adapter's wiring; hosts differ on which colour
/// sits at which index, the indices themselves are what the protocol fixes.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cd32Buttons(pub u16);

impl Cd32Buttons {
    pub const BLUE: Self = Self(1 << 0);
    pub const GREEN: Self = Self(1 << 1);
    pub const RED: Self = Self(1 << 2);
    pub const YELLOW: Self = Self(1 << 3);
    pub const SHOULDER_R: Self = Self(1 << 4);
    pub const SHOULDER_L: Self = Self(1 << 5);
    pub const PLAY: Self = Self(1 << 6);
    /// Presence bits sampled by the host after the button bits.
    pub const ID0: Self = Self(1 << 8);
    pub const ID1: Self = Self(1 << 9);

    pub const NONE: Self = Self(0);

    /// Both presence bits, forced on in every published word.
    pub const ID_BITS: Self = Self(Self::ID0.0 | Self::ID1.0);

    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// State of a single bit by shift index.
    #[inline]
    #[must_use]
    pub const fn bit(self, index: u8) -> bool {
        (self.0 >> index) & 1 != 0
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl BitOr for Cd32Buttons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Cd32Buttons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Output protocol currently presented on the joystick port.
///
/// One instance per process; transitions only through the mode controller's
/// explicit enable/disable operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolMode {
    /// Plain parallel switch-closure joystick.
    Normal,
    /// CD32 synchronous serial controller.
    Cd32,
}
