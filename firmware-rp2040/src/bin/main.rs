#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_futures::select::{select4, Either4};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Level as GpioLevel, Output};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;
use static_cell::StaticCell;
use usb_to_cd32::{
    AxisLayout, ButtonLayout, Cd32Bridge, MillisClock, PortShared, ReportLayout, ShiftEngine,
    DETECT_SETTLE_MS, DETECT_WINDOW_MS, MAX_REPORT_BYTES, NUM_BUTTONS,
};
use usb_to_cd32_rp2040::{AdapterPort, UartReportFeed, UptimeClock};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

/// Latest raw report from the feed.
type RawReport = Vec<u8, MAX_REPORT_BYTES>;

/// Signal for passing raw reports from the feed task to the adapter task.
/// Signal rather than Channel: only the most recent report matters.
static REPORT_SIGNAL: StaticCell<Signal<CriticalSectionRawMutex, RawReport>> = StaticCell::new();

/// State shared between the polling side and the edge handler.
static SHARED: PortShared = PortShared::new();

/// High-priority executor servicing the joystick port.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Fallback layout for a common 8-byte gamepad report: X/Y in bytes 0-1,
/// twelve buttons packed from byte 5 up. A descriptor layer, once wired in,
/// supplies the real per-device layout instead.
const fn generic_layout() -> ReportLayout {
    let mut buttons = [ButtonLayout {
        byte_offset: 0,
        bitmask: 0,
    }; NUM_BUTTONS];
    let mut i = 0;
    while i < NUM_BUTTONS {
        buttons[i] = ButtonLayout {
            byte_offset: 5 + i / 8,
            bitmask: 1 << (i % 8),
        };
        i += 1;
    }
    ReportLayout {
        axes: [
            AxisLayout {
                bit_offset: 0,
                bit_size: 8,
                logical_min: 0,
                logical_max: 255,
            },
            AxisLayout {
                bit_offset: 8,
                bit_size: 8,
                logical_min: 0,
                logical_max: 255,
            },
        ],
        buttons,
        report_id: false,
        report_len: 7,
    }
}

const GENERIC_LAYOUT: ReportLayout = generic_layout();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("usb-to-cd32 starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let signal = REPORT_SIGNAL.init(Signal::new());

    // --- UART feed from the USB host controller ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = 115_200;

    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (_tx, rx) = uart.split();
    let feed = UartReportFeed::new(rx);

    // --- Joystick port lines ---
    let port = AdapterPort::new(
        Flex::new(p.PIN_2),  // Up
        Flex::new(p.PIN_3),  // Down
        Flex::new(p.PIN_4),  // Left
        Flex::new(p.PIN_5),  // Right
        Flex::new(p.PIN_6),  // Latch
        Flex::new(p.PIN_7),  // Clock
        Flex::new(p.PIN_10), // Data
    );

    // On-board LED for feed error indication
    let led = Output::new(p.PIN_25, GpioLevel::Low);

    // Port servicing preempts the feed loop.
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high.spawn(adapter_task(port, signal)).unwrap();

    spawner.spawn(feed_task(feed, signal, led)).unwrap();

    info!("usb-to-cd32 initialized, waiting for reports...");
}

/// Detection window schedule, driven by the executor timer instead of the
/// core's busy-wait so the edge futures keep counting while the window is
/// open.
#[derive(Clone, Copy)]
enum DetectSchedule {
    /// Settle period running; open the window at the deadline.
    Armed(Instant),
    /// Window open; decide at the deadline.
    Sniffing(Instant),
    /// Decision made.
    Settled,
}

impl DetectSchedule {
    fn deadline(self) -> Option<Instant> {
        match self {
            DetectSchedule::Armed(at) | DetectSchedule::Sniffing(at) => Some(at),
            DetectSchedule::Settled => None,
        }
    }
}

enum Event {
    LatchEdge,
    ClockEdge,
    Report(RawReport),
    WindowTick,
}

/// Adapter task - owns the port, services edges, reports and detection.
#[embassy_executor::task]
async fn adapter_task(
    mut port: AdapterPort<'static>,
    signal: &'static Signal<CriticalSectionRawMutex, RawReport>,
) {
    let clock = UptimeClock;
    let mut bridge = Cd32Bridge::new(&SHARED, GENERIC_LAYOUT, clock.now_ms());
    let mut engine = ShiftEngine::new(&SHARED);

    let mut detect =
        DetectSchedule::Armed(Instant::now() + Duration::from_millis(DETECT_SETTLE_MS as u64));

    loop {
        let deadline = detect.deadline();
        let event = {
            let (latch, clock_pin, latch_armed, clock_armed) = port.latch_clock_parts();
            let latch_edge = async {
                if latch_armed {
                    latch.wait_for_any_edge().await
                } else {
                    core::future::pending().await
                }
            };
            let clock_edge = async {
                if clock_armed {
                    clock_pin.wait_for_rising_edge().await
                } else {
                    core::future::pending().await
                }
            };
            let window_tick = async {
                match deadline {
                    Some(at) => Timer::at(at).await,
                    None => core::future::pending().await,
                }
            };

            match select4(latch_edge, clock_edge, signal.wait(), window_tick).await {
                Either4::First(()) => Event::LatchEdge,
                Either4::Second(()) => Event::ClockEdge,
                Either4::Third(report) => Event::Report(report),
                Either4::Fourth(()) => Event::WindowTick,
            }
        };

        match event {
            Event::LatchEdge => engine.on_latch_edge(&mut port),
            Event::ClockEdge => engine.on_clock_edge(&mut port),
            Event::Report(report) => {
                if let Err(e) = bridge.process_report(&mut port, &report) {
                    warn!("report dropped: {:?}", e);
                }
            }
            Event::WindowTick => match detect {
                DetectSchedule::Armed(_) => {
                    bridge.open_detection_window(&mut port);
                    detect = DetectSchedule::Sniffing(
                        Instant::now() + Duration::from_millis(DETECT_WINDOW_MS as u64),
                    );
                }
                DetectSchedule::Sniffing(_) => {
                    bridge.finish_detection(&mut port);
                    info!("port mode: {:?}", bridge.mode());
                    detect = DetectSchedule::Settled;
                }
                DetectSchedule::Settled => {}
            },
        }
    }
}

/// Feed task - reads framed reports from UART and publishes the latest one.
#[embassy_executor::task]
async fn feed_task(
    mut feed: UartReportFeed<'static>,
    signal: &'static Signal<CriticalSectionRawMutex, RawReport>,
    mut led: Output<'static>,
) {
    let mut buf = [0u8; MAX_REPORT_BYTES];
    loop {
        match feed.next_report(&mut buf).await {
            Ok(len) => {
                let mut report = RawReport::new();
                // Cannot fail: the frame parser bounds len by the buffer size.
                let _ = report.extend_from_slice(&buf[..len]);
                signal.signal(report);
            }
            Err(e) => {
                error!("feed error: {:?}", e);
                // Toggle LED to indicate error
                led.toggle();
            }
        }
    }
}
