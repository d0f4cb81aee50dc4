//! SSD1306 OLED display wrapper.
//!
//! Three character cells drawn large in the middle of the panel. Every
//! change redraws the buffer and flushes it; contrast stands in for the
//! LED intensity of a 7-segment display.

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use crate::error::Error;
use crate::fmt::{error, warn};
use crate::hal::{Display, Glyph};
use crate::ui::{channel_view, flag_view, glyph_char, Cells};

/// Concrete display driver, generic over the HAL's I²C peripheral.
type Driver<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Baseline of the digit row, roughly centred vertically.
const TEXT_ORIGIN: Point = Point::new(64, 40);

/// Precharge period used with every contrast level.
const PRECHARGE: u8 = 2;

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_10X20)
        .text_color(BinaryColor::On)
        .build()
}

pub struct OledDisplay<I2C> {
    driver: Driver<I2C>,
    cells: Cells,
    /// Last contrast sent, so the flash loop only talks to the panel on change.
    intensity: Option<u8>,
}

/// Initialise the SSD1306 display and clear the screen.
///
/// A panel that fails to initialise is logged and kept; later draws
/// report their own errors.
pub fn init<I2C>(i2c: I2C) -> OledDisplay<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut driver = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    if driver.init().is_err() {
        error!("display init failed");
    }
    driver.clear_buffer();
    if driver.flush().is_err() {
        warn!("display clear failed");
    }
    OledDisplay {
        driver,
        cells: Cells::blank(),
        intensity: None,
    }
}

impl<I2C> OledDisplay<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn redraw(&mut self) -> Result<(), Error> {
        self.driver.clear_buffer();
        let text = self.cells.text();
        Text::with_alignment(text.as_str(), TEXT_ORIGIN, text_style(), Alignment::Center)
            .draw(&mut self.driver)
            .map_err(|_| Error::Display)?;
        self.driver.flush().map_err(|_| Error::Display)
    }
}

impl<I2C> Display for OledDisplay<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn show_digit(&mut self, position: u8, glyph: Glyph) -> Result<(), Error> {
        if self.cells.set(position, glyph_char(glyph)) {
            self.redraw()?;
        }
        Ok(())
    }

    fn show_channel_and_range(&mut self, channel: u8, range_index: u8) -> Result<(), Error> {
        if self.cells.set_all(channel_view(channel, range_index)) {
            self.redraw()?;
        }
        Ok(())
    }

    fn show_flag(&mut self, value: bool) -> Result<(), Error> {
        if self.cells.set_all(flag_view(value)) {
            self.redraw()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.cells = Cells::blank();
        self.redraw()
    }

    fn set_intensity(&mut self, level: u8) -> Result<(), Error> {
        if self.intensity == Some(level) {
            return Ok(());
        }
        self.driver
            .set_brightness(Brightness::custom(PRECHARGE, level))
            .map_err(|_| Error::Display)?;
        self.intensity = Some(level);
        Ok(())
    }
}
