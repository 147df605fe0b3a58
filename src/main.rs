use embedded_graphics::mono_font::iso_8859_15::FONT_5X8;
// https://docs.rs/embedded-graphics/0.8.1/embedded_graphics/mono_font/index.html#modules
use embedded_graphics::mono_font::{iso_8859_15::FONT_10X20 as ISO15_10, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle};
use embedded_graphics::{prelude::*, text::Text};

use esp_idf_svc::hal::delay::Delay;
use esp_idf_svc::hal::gpio;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::hal::spi;

use st7789_accel::st7789::pins::Pins;
use st7789_accel::st7789::{
    Bitmap, BusTransport, Config, DisplayInterface, DisplayRotation, Error, LineStatus,
    RasterSink, SpiDevicePort, St7789,
};

/// 32x32 red/blue gradient for the blit check
fn gradient() -> Vec<u16> {
    (0..32u16)
        .flat_map(|y| (0..32u16).map(move |x| Rgb565::new(x as u8, 0, y as u8).into_storage()))
        .collect()
}

fn smoke_pattern<S>(display: &mut S, delay: &Delay) -> anyhow::Result<()>
where
    S: RasterSink<Error = Error> + DrawTarget<Color = Rgb565, Error = Error>,
{
    let size = display.bounding_box().size;
    let (w, h) = (size.width as u16, size.height as u16);
    log::info!("Smoke pattern on {}x{}", w, h);

    // Colour bars
    let bars = [Rgb565::RED, Rgb565::GREEN, Rgb565::BLUE, Rgb565::WHITE];
    let bar = w / bars.len() as u16;
    for (i, color) in bars.iter().enumerate() {
        let x0 = i as u16 * bar;
        display.fill_rect(x0, 0, x0 + bar - 1, h / 2, *color)?;
    }
    delay.delay_ms(1000);

    // Frame via accelerated lines
    let edges = [
        (0, 0, w - 1, 0),
        (0, h - 1, w - 1, h - 1),
        (0, 0, 0, h - 1),
        (w - 1, 0, w - 1, h - 1),
    ];
    for (x0, y0, x1, y1) in edges {
        display.draw_line(x0, y0, x1, y1, Rgb565::YELLOW)?;
    }
    if display.draw_line(0, 0, w - 1, h - 1, Rgb565::YELLOW)? == LineStatus::Unsupported {
        log::info!("Diagonal left to embedded-graphics");
        let corner = Point::new(i32::from(w) - 1, i32::from(h) - 1);
        Line::new(Point::zero(), corner)
            .into_styled(PrimitiveStyle::with_stroke(Rgb565::YELLOW, 1))
            .draw(display)?;
    }

    let pixels = gradient();
    display.draw_bitmap(w - 40, h - 40, &Bitmap::new(32, 32, &pixels))?;

    Circle::new(Point::new(20, i32::from(h) / 2 + 8), 40)
        .into_styled(PrimitiveStyle::with_fill(Rgb565::MAGENTA))
        .draw(display)?;

    let title = MonoTextStyle::new(&ISO15_10, Rgb565::WHITE);
    Text::new("ST7789", Point::new(80, i32::from(h) / 2 + 30), title).draw(display)?;
    let label = MonoTextStyle::new(&FONT_5X8, Rgb565::CYAN);
    Text::new("Accelerated fills", Point::new(80, i32::from(h) / 2 + 45), label).draw(display)?;

    Ok(())
}

// https://docs.esp-rs.org/esp-idf-svc/esp_idf_svc/
fn main() -> anyhow::Result<()> {
    // Runtime patches from esp-idf-sys only link if this is called once
    // https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    log::info!(
        "SPI on SCK {} MOSI {}, CS {} DC {} RST {} BLK {}",
        Pins::SCK,
        Pins::MOSI,
        Pins::CS,
        Pins::DC,
        Pins::RST,
        Pins::BLK
    );
    let spi = spi::SpiDeviceDriver::new_single(
        peripherals.spi2,
        pins.gpio12,                    // SCK - Pins::SCK
        pins.gpio11,                    // MOSI - Pins::MOSI
        Option::<gpio::AnyIOPin>::None,     // Write-only bus
        Option::<gpio::AnyOutputPin>::None, // CS toggled by the driver per transfer
        &spi::SpiDriverConfig::new().dma(spi::Dma::Auto(4096)),
        &spi::SpiConfig::new().baudrate(40.MHz().into()),
    )?;

    let mut backlight = gpio::PinDriver::output(pins.gpio15)?; // Pins::BLK
    backlight.set_high()?;

    let delay = Delay::default();

    let interface = DisplayInterface::new(
        BusTransport::without_dma(SpiDevicePort::new(spi)),
        gpio::PinDriver::output(pins.gpio13)?, // Pins::DC
        gpio::PinDriver::output(pins.gpio10)?, // Pins::CS
        gpio::PinDriver::output(pins.gpio14)?, // Pins::RST
        delay,
    );
    let mut display = St7789::new(interface, Config::default())?;
    log::info!("Display {}x{} initialised", display.width(), display.height());

    smoke_pattern(&mut display, &delay)?;
    delay.delay_ms(5000);

    for index in 0..4 {
        let Some(rotation) = DisplayRotation::from_index(index) else {
            continue;
        };
        display.set_rotation(rotation)?;
        display.clear(Rgb565::BLACK)?;
        smoke_pattern(&mut display, &delay)?;
        delay.delay_ms(2000);
    }
    display.set_rotation(Config::default().rotation)?;

    let reset_reason = esp_idf_svc::hal::reset::ResetReason::get();
    log::info!("Reset reason: {:?}", reset_reason);

    Ok(())
}
