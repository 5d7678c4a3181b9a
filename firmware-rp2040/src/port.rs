//! Joystick port lines and the millisecond clock over RP2040 peripherals.
//!
//! All seven lines are [`Flex`] pins so the dual-purpose lines can change
//! role at runtime. Lines come up as released outputs (high, nothing
//! pressed) until the first decoded report or mode transition says
//! otherwise.

use embassy_rp::gpio::{Flex, Pull};
use embassy_time::Instant;
use usb_to_cd32::{JoystickPort, Level, Line, LineRole, MillisClock};

#[inline]
fn from_bool(high: bool) -> Level {
    if high {
        Level::High
    } else {
        Level::Low
    }
}

/// The physical joystick port: seven flexible-role GPIO lines.
pub struct AdapterPort<'d> {
    /// Pins in [`Line`] index order.
    pins: [Flex<'d>; Line::COUNT],
    /// Edge-interrupt arming per line; consulted by the edge waits.
    irq: [bool; Line::COUNT],
}

impl<'d> AdapterPort<'d> {
    /// Takes the seven port pins and configures them all as released
    /// (high) outputs.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        up: Flex<'d>,
        down: Flex<'d>,
        left: Flex<'d>,
        right: Flex<'d>,
        latch: Flex<'d>,
        clock: Flex<'d>,
        data: Flex<'d>,
    ) -> Self {
        let mut pins = [up, down, left, right, latch, clock, data];
        for pin in &mut pins {
            pin.set_high();
            pin.set_as_output();
        }
        Self {
            pins,
            irq: [false; Line::COUNT],
        }
    }

    #[inline]
    fn pin(&mut self, line: Line) -> &mut Flex<'d> {
        &mut self.pins[line.index()]
    }

    /// Split borrows for awaiting host edges on Latch and Clock while the
    /// owning task keeps the port. Returns the two pins plus their current
    /// edge-interrupt arming.
    pub fn latch_clock_parts(&mut self) -> (&mut Flex<'d>, &mut Flex<'d>, bool, bool) {
        let latch_irq = self.irq[Line::Latch.index()];
        let clock_irq = self.irq[Line::Clock.index()];
        let [_, _, _, _, latch, clock, _] = &mut self.pins;
        (latch, clock, latch_irq, clock_irq)
    }
}

impl JoystickPort for AdapterPort<'_> {
    fn write(&mut self, line: Line, level: Level) {
        let pin = self.pin(line);
        match level {
            Level::Low => pin.set_low(),
            Level::High => pin.set_high(),
        }
    }

    fn input_level(&mut self, line: Line) -> Level {
        let high = self.pin(line).is_high();
        from_bool(high)
    }

    fn output_level(&mut self, line: Line) -> Level {
        let high = self.pin(line).is_set_high();
        from_bool(high)
    }

    fn set_role(&mut self, line: Line, role: LineRole) {
        let pin = self.pin(line);
        match role {
            LineRole::Output => {
                pin.set_pull(Pull::None);
                pin.set_as_output();
            }
            LineRole::PullUpInput => {
                pin.set_pull(Pull::Up);
                pin.set_as_input();
            }
        }
    }

    fn set_edge_irq(&mut self, line: Line, enabled: bool) {
        // Arming is bookkeeping here; the pin IRQ itself is enabled by the
        // edge futures in the adapter task while these flags gate them.
        self.irq[line.index()] = enabled;
    }
}

/// Millisecond clock over the Embassy time driver.
pub struct UptimeClock;

impl MillisClock for UptimeClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
