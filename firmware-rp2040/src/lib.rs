//! RP2040 binding for the USB HID to Amiga/CD32 joystick port bridge.
//!
//! The board sits between a USB-host-capable controller (which enumerates
//! the gamepad and forwards each raw HID report over UART) and the
//! computer's joystick port. All protocol logic lives in the
//! platform-agnostic [`usb_to_cd32`] crate; this crate binds it to the
//! Pico's pins and the Embassy runtime.
//!
//! # Hardware Configuration
//!
//! | Function  | GPIO | Description                          |
//! |-----------|------|--------------------------------------|
//! | UART1 TX  | 8    | Serial transmit (unused)             |
//! | UART1 RX  | 9    | Raw HID report feed                  |
//! | Up        | 2    | Direction output, active low         |
//! | Down      | 3    | Direction output, active low         |
//! | Left      | 4    | Direction output, active low         |
//! | Right     | 5    | Direction output, active low         |
//! | Latch     | 6    | Button output / CD32 latch input     |
//! | Clock     | 7    | Button output / CD32 clock input     |
//! | Data      | 10   | Button output / CD32 data output     |
//! | LED       | 25   | On-board LED (feed error indicator)  |
//!
//! # Architecture
//!
//! Two Embassy executors mirror the adapter's two priority levels:
//!
//! - **Feed task** (thread executor): reads UART lines, unframes raw
//!   reports, publishes the latest one on a [`Signal`](embassy_sync::signal::Signal).
//! - **Adapter task** (interrupt executor, preempts the feed): owns the port
//!   pins, the bridge and the shift engine; selects over latch/clock edges,
//!   published reports and the detection-window timer.
//!
//! The detection window runs on an Embassy timer between the core's
//! split-phase window calls, so edge futures keep counting pulses while the
//! window is open.
//!
//! # Features
//!
//! - **`dev-panic`** (default): `panic-probe` prints panics via RTT
//! - **`prod-panic`**: `panic-reset` for silent production resets
//!
//! # Re-exports
//!
//! This crate re-exports the public items of [`usb_to_cd32`] so consumers
//! only need to depend on this crate.

#![no_std]

// Re-export core types for convenience
pub use usb_to_cd32::{
    cd32_button_word, decode, parse_report_line, AxisLayout, ButtonLayout, Cd32Bridge,
    Cd32Buttons, DecodeError, ExtraButtons, FrameError, GamepadState, JoystickPort, Level, Line,
    LineRole, MillisClock, ModeController, PadButtons, PortShared, ProtocolDetector,
    ProtocolMode, ReportLayout, ShiftEngine, DETECT_MIN_PULSES, DETECT_SETTLE_MS,
    DETECT_WINDOW_MS, LAST_SHIFT_INDEX, MAX_LINE_LENGTH, MAX_REPORT_BYTES, NUM_BUTTONS,
};

pub mod feed;
pub mod port;

pub use feed::{FeedError, UartReportFeed};
pub use port::{AdapterPort, UptimeClock};
