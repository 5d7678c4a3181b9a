//! Test doubles for the platform seams.
//!
//! Allocation-free, so they work in `no_std` builds too; useful both for this
//! crate's own tests and for consumers testing against [`JoystickPort`]
//! without hardware.

use core::cell::Cell;

use crate::port::{JoystickPort, Level, Line, LineRole, MillisClock};

/// Port double that records line state and operation counts.
///
/// Output writes land in a per-line output latch, as on real hardware. Lines
/// in input role read whatever the test last set with [`MockPort::drive`];
/// lines in output role read back their own driven level.
pub struct MockPort {
    output: [Level; Line::COUNT],
    input: [Level; Line::COUNT],
    roles: [LineRole; Line::COUNT],
    irq: [bool; Line::COUNT],
    /// Total `write` calls.
    pub writes: u32,
    /// Total `set_role` calls.
    pub role_changes: u32,
    /// Total `set_edge_irq` calls.
    pub irq_changes: u32,
}

impl MockPort {
    /// All lines as released outputs (high), inputs floating high as if
    /// pulled up.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: [Level::High; Line::COUNT],
            input: [Level::High; Line::COUNT],
            roles: [LineRole::Output; Line::COUNT],
            irq: [false; Line::COUNT],
            writes: 0,
            role_changes: 0,
            irq_changes: 0,
        }
    }

    /// Level latched in a line's output driver.
    #[must_use]
    pub fn output_of(&self, line: Line) -> Level {
        self.output[line.index()]
    }

    #[must_use]
    pub fn role_of(&self, line: Line) -> LineRole {
        self.roles[line.index()]
    }

    #[must_use]
    pub fn irq_enabled(&self, line: Line) -> bool {
        self.irq[line.index()]
    }

    /// Simulate the host driving a line; visible while the line is an input.
    pub fn drive(&mut self, line: Line, level: Level) {
        self.input[line.index()] = level;
    }

    /// Total number of port operations performed.
    #[must_use]
    pub fn op_count(&self) -> u32 {
        self.writes + self.role_changes + self.irq_changes
    }
}

impl Default for MockPort {
    fn default() -> Self {
        Self::new()
    }
}

impl JoystickPort for MockPort {
    fn write(&mut self, line: Line, level: Level) {
        self.output[line.index()] = level;
        self.writes += 1;
    }

    fn input_level(&mut self, line: Line) -> Level {
        match self.roles[line.index()] {
            LineRole::Output => self.output[line.index()],
            LineRole::PullUpInput => self.input[line.index()],
        }
    }

    fn output_level(&mut self, line: Line) -> Level {
        self.output[line.index()]
    }

    fn set_role(&mut self, line: Line, role: LineRole) {
        self.roles[line.index()] = role;
        self.role_changes += 1;
    }

    fn set_edge_irq(&mut self, line: Line, enabled: bool) {
        self.irq[line.index()] = enabled;
        self.irq_changes += 1;
    }
}

/// Manually advanced millisecond clock.
pub struct MockClock {
    now: Cell<u32>,
    step: Cell<u32>,
}

impl MockClock {
    /// Clock frozen at zero until advanced.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            step: Cell::new(0),
        }
    }

    /// Clock that advances by `step` ms on every read, so busy-wait loops
    /// against it terminate.
    #[must_use]
    pub fn auto_advancing(step: u32) -> Self {
        Self {
            now: Cell::new(0),
            step: Cell::new(step),
        }
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MillisClock for MockClock {
    fn now_ms(&self) -> u32 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.step.get()));
        now
    }
}
