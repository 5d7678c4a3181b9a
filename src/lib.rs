//! USB HID gamepad to Amiga/CD32 joystick port bridge.
//!
//! This crate is the platform-agnostic half of an adapter that presents a USB
//! gamepad to a retro home computer's joystick port, either as a plain
//! switch-closure joystick or as a CD32 serial pad, picked automatically by
//! watching what the host does with the port lines.
//!
//! # Overview
//!
//! - [`report`]: HID report decoding into a normalized [`GamepadState`]
//! - [`types`]: button bitfields, [`GamepadState`], [`Cd32Buttons`],
//!   [`ProtocolMode`]
//! - [`port`]: the [`JoystickPort`] / [`MillisClock`] seams the platform
//!   implements
//! - [`shared`]: [`PortShared`], the state crossing the interrupt boundary
//! - [`mode`]: [`ModeController`], direct outputs and mode transitions
//! - [`shift`]: [`ShiftEngine`], the CD32 serial shift-out edge handler
//! - [`detect`]: [`ProtocolDetector`], one-shot protocol autodetection
//! - [`bridge`]: [`Cd32Bridge`], the polling-context orchestrator
//! - [`framing`]: UART report-feed line protocol
//! - [`mock`]: hardware-free test doubles
//!
//! # Split across contexts
//!
//! The polling context owns the [`Cd32Bridge`]; the edge interrupt context
//! owns the [`ShiftEngine`]. They share exactly one thing, the [`PortShared`]
//! button word, which the bridge publishes under a critical section and the
//! engine snapshots at latch time.
//!
//! # CD32 wire protocol
//!
//! A read cycle starts on the latch falling edge: bit 0 of the latched word
//! appears on the data line immediately, active-low. Each clock rising edge
//! advances one bit, through index 9 (seven buttons, one unused bit, two
//! always-set presence bits). The latch rising edge ends the cycle and the
//! three shared lines fall back to their plain-output meaning.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations. Host
//! tests rely on the `critical-section` crate's `std` implementation.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod bridge;
pub mod detect;
pub mod framing;
pub mod mock;
pub mod mode;
pub mod port;
pub mod report;
pub mod shared;
pub mod shift;
pub mod types;

// Re-export main types at crate root
pub use bridge::Cd32Bridge;
pub use detect::{ProtocolDetector, DETECT_MIN_PULSES, DETECT_SETTLE_MS, DETECT_WINDOW_MS};
pub use framing::{parse_report_line, FrameError, MAX_LINE_LENGTH, MAX_REPORT_BYTES};
pub use mode::{cd32_button_word, ModeController};
pub use port::{JoystickPort, Level, Line, LineRole, MillisClock};
pub use report::{decode, AxisLayout, ButtonLayout, DecodeError, ReportLayout, NUM_BUTTONS};
pub use shared::PortShared;
pub use shift::{ShiftEngine, LAST_SHIFT_INDEX};
pub use types::{Cd32Buttons, ExtraButtons, GamepadState, PadButtons, ProtocolMode};
