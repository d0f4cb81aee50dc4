//! footswitch firmware entry point.
//!
//! Brings up the nRF52840 peripherals, starts the 1 ms SysTick that
//! drives [`TickSource`], and hands everything to the [`Controller`],
//! which never returns.

#![no_std]
#![no_main]

use core::cell::RefCell;

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m_rt::{entry, exception};
use defmt::{info, unwrap};
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_nrf::gpio::{Level, Output, OutputDrive, Pin};
use embassy_nrf::nvmc::Nvmc;
use embassy_nrf::uarte::{self, UarteTx};
use embassy_nrf::{bind_interrupts, peripherals, twim};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use {defmt_rtt as _, panic_probe as _};

use footswitch::config::{
    Features, SwitchLayout, DISPLAY_POWER_UP_MS, FLASH_PAGE_SIZE, MIDI_BAUD, SETTINGS_FLASH_PAGE_COUNT,
    SETTINGS_FLASH_PAGE_START, TICK_PERIOD_MS,
};
use footswitch::hal::MidiOut;
use footswitch::storage::FlashByteStore;
use footswitch::ui::{buttons::Footswitches, display};
use footswitch::{Controller, Error, TickSource};

bind_interrupts!(struct Irqs {
    UARTE0 => uarte::InterruptHandler<peripherals::UARTE0>;
    TWISPI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

/// Variant this image is built for.
const FEATURES: Features = Features::DEFAULT;

/// HCLK after `embassy_nrf::init`.
const CORE_CLOCK_HZ: u32 = 64_000_000;

static TICKS: TickSource = TickSource::new();

static LED: Mutex<CriticalSectionRawMutex, RefCell<Option<Output<'static>>>> =
    Mutex::new(RefCell::new(None));

#[exception]
fn SysTick() {
    let on = TICKS.on_tick();
    if FEATURES.external_led {
        LED.lock(|led| {
            if let Some(led) = led.borrow_mut().as_mut() {
                led.set_level(Level::from(on));
            }
        });
    }
}

/// MIDI OUT on UARTE0 TX.
struct UarteMidi {
    tx: UarteTx<'static, peripherals::UARTE0>,
}

impl MidiOut for UarteMidi {
    fn send_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.tx.blocking_write(&[byte]).map_err(|_| Error::Serial)
    }
}

#[entry]
fn main() -> ! {
    let p = embassy_nrf::init(Default::default());
    info!("footswitch starting");

    // --- 1 ms tick ---
    let mut core = unwrap!(cortex_m::Peripherals::take());
    core.SYST.set_clock_source(SystClkSource::Core);
    core.SYST.set_reload(CORE_CLOCK_HZ / 1000 * TICK_PERIOD_MS - 1);
    core.SYST.clear_current();
    core.SYST.enable_interrupt();
    core.SYST.enable_counter();

    // --- Indicator LED (P0.13, active-high) ---
    if FEATURES.external_led {
        let led = Output::new(p.P0_13, Level::Low, OutputDrive::Standard);
        LED.lock(|cell| *cell.borrow_mut() = Some(led));
    }

    // --- Footswitches ---
    let mode_pin = match FEATURES.layout {
        SwitchLayout::TwoSwitch => None,
        SwitchLayout::ThreeSwitch => Some(p.P0_24.degrade()),
    };
    let switches = Footswitches::new(p.P0_11.degrade(), p.P0_12.degrade(), mode_pin);

    // --- MIDI OUT (P0.06) ---
    let mut uart_config = uarte::Config::default();
    uart_config.baudrate = uarte::Baudrate::BAUD31250;
    uart_config.parity = uarte::Parity::EXCLUDED;
    let midi = UarteMidi {
        tx: UarteTx::new(p.UARTE0, Irqs, p.P0_06, uart_config),
    };
    info!("midi out at {} baud", MIDI_BAUD);

    // --- OLED (SDA P0.26, SCL P0.27) ---
    let mut i2c_config = twim::Config::default();
    i2c_config.frequency = twim::Frequency::K400;
    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, i2c_config);
    // cold boot is unreliable without it
    TICKS.delay_ms(DISPLAY_POWER_UP_MS);
    let display = display::init(i2c);

    // --- Settings pages, kept out of FLASH in `memory.x` ---
    let settings = SETTINGS_FLASH_PAGE_START * FLASH_PAGE_SIZE
        ..(SETTINGS_FLASH_PAGE_START + SETTINGS_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;
    let store = FlashByteStore::new(BlockingAsync::new(Nvmc::new(p.NVMC)), settings);

    let mut controller = Controller::new(&TICKS, FEATURES, switches, display, midi, store);
    controller.run()
}
