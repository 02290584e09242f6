use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal_mock::delay::MockNoop;
use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use embedded_hal_mock::pin::{Mock as PinMock, State, Transaction as PinTransaction};
use embedded_hal_mock::serial::{Mock as SerialMock, Transaction as SerialTransaction};
use embedded_hal_mock::spi::{Mock as SpiMock, Transaction as SpiTransaction};
use embedded_hal_mock::MockError;
use std::io::ErrorKind;
use ufmt::uwrite;

use obstacle_bot::drivers::{
    lcd1602, Buzzer, Color, Drive, Indicator, Lcd1602, QuadDrive, RgbLed, SerialConsole,
    St7735, StatusPanel, ToneOutput, Wheel,
};

fn pin(states: &[State]) -> PinMock {
    let expected: Vec<_> = states.iter().map(|s| PinTransaction::set(s.clone())).collect();
    PinMock::new(&expected)
}

use State::{High, Low};

#[test]
fn buzzer_starts_silent_and_follows_tone() {
    let buzzer_pin = pin(&[Low, High, Low]);
    let mut buzzer = Buzzer::new(buzzer_pin).unwrap();

    buzzer.set_tone(true);
    buzzer.set_tone(false);

    buzzer.release().done();
}

#[test]
fn rgb_led_mixes_orange_from_red_and_green() {
    let mut red = pin(&[Low, High, High]);
    let mut green = pin(&[Low, High, Low]);
    let mut blue = pin(&[Low, Low, Low]);

    let mut led = RgbLed::new(red.clone(), green.clone(), blue.clone()).unwrap();
    led.set_color(Color::Orange);
    led.set_color(Color::Red);

    red.done();
    green.done();
    blue.done();
}

#[test]
fn indicator_swallows_pin_failures() {
    let failing_high =
        PinTransaction::set(High).with_error(MockError::Io(ErrorKind::NotConnected));
    let mut green = PinMock::new(&[
        PinTransaction::set(Low),
        failing_high,
        PinTransaction::set(Low),
    ]);
    let mut red = pin(&[Low, Low]);
    let mut blue = pin(&[Low, Low]);

    let mut led = RgbLed::new(red.clone(), green.clone(), blue.clone()).unwrap();
    // Green is written first; its failure ends this write without a panic
    led.set_color(Color::Green);
    led.set_color(Color::Off);

    red.done();
    green.done();
    blue.done();
}

#[test]
fn quad_drive_stops_then_pivots_left() {
    // Left side runs forward, right side backward
    let mut lf = (pin(&[Low, High]), pin(&[Low, Low]));
    let mut lb = (pin(&[Low, High]), pin(&[Low, Low]));
    let mut rf = (pin(&[Low, Low]), pin(&[Low, High]));
    let mut rb = (pin(&[Low, Low]), pin(&[Low, High]));

    let mut drive = QuadDrive::new(
        Wheel::new(rf.0.clone(), rf.1.clone()),
        Wheel::new(rb.0.clone(), rb.1.clone()),
        Wheel::new(lf.0.clone(), lf.1.clone()),
        Wheel::new(lb.0.clone(), lb.1.clone()),
    )
    .unwrap();
    drive.left();

    for wheel in [&mut lf, &mut lb, &mut rf, &mut rb] {
        wheel.0.done();
        wheel.1.done();
    }
}

#[test]
fn serial_console_reads_without_blocking() {
    let expectations = [
        SerialTransaction::read(b't'),
        SerialTransaction::read_error(nb::Error::WouldBlock),
    ];
    let mut console = SerialConsole::new(SerialMock::new(&expectations));

    assert_eq!(console.read_byte(), Some(b't'));
    assert_eq!(console.read_byte(), None);

    console.release().done();
}

#[test]
fn serial_console_formats_status_lines() {
    let expectations = [
        SerialTransaction::write_many(b"OK\r\n"),
        SerialTransaction::write_many(b"angle=30\r\n"),
    ];
    let mut console = SerialConsole::new(SerialMock::new(&expectations));

    console.write_line("OK").unwrap();
    uwrite!(&mut console, "angle={}\r\n", 30u8).unwrap();

    console.release().done();
}

const LCD_ADDR: u8 = lcd1602::DEFAULT_ADDRESS;

/// Four-bit byte frame as the backpack sees it: high nibble then low, each
/// strobed with EN.
fn lcd_byte(byte: u8, rs: bool) -> I2cTransaction {
    let mode = (if rs { 0x01 } else { 0x00 }) | 0x08;
    let high = (byte & 0xF0) | mode;
    let low = (byte << 4) | mode;
    I2cTransaction::write(LCD_ADDR, vec![high | 0x04, high, low | 0x04, low])
}

fn lcd_init() -> Vec<I2cTransaction> {
    let mut t = Vec::new();
    for _ in 0..3 {
        t.push(I2cTransaction::write(LCD_ADDR, vec![0x3C, 0x38]));
    }
    t.push(I2cTransaction::write(LCD_ADDR, vec![0x2C, 0x28]));
    for cmd in [0x28, 0x08, 0x01, 0x06, 0x0C] {
        t.push(lcd_byte(cmd, false));
    }
    t
}

fn lcd_row(row_cmd: u8, text: &str) -> Vec<I2cTransaction> {
    let mut t = vec![lcd_byte(row_cmd, false)];
    let bytes = text.as_bytes();
    for col in 0..16 {
        t.push(lcd_byte(bytes.get(col).copied().unwrap_or(b' '), true));
    }
    t
}

#[test]
fn lcd_rewrites_only_changed_rows() {
    let mut expected = lcd_init();
    expected.extend(lcd_row(0x80, "AUTO : SCAN"));
    expected.extend(lcd_row(0xC0, "D:42cm A:90"));
    // Second frame: only the distance moved
    expected.extend(lcd_row(0xC0, "D:17cm A:100"));

    let i2c = I2cMock::new(&expected);
    let mut lcd = Lcd1602::new(i2c, MockNoop::new(), LCD_ADDR).unwrap();

    lcd.show("AUTO : SCAN", "D:42cm A:90");
    lcd.show("AUTO : SCAN", "D:42cm A:90");
    lcd.show("AUTO : SCAN", "D:17cm A:100");

    let (mut i2c, _) = lcd.release();
    i2c.done();
}

#[test]
fn lcd_truncates_long_rows_to_panel_width() {
    let mut expected = lcd_init();
    expected.extend(lcd_row(0x80, "Manual : REVERSE"));

    let i2c = I2cMock::new(&expected);
    let mut lcd = Lcd1602::new(i2c, MockNoop::new(), LCD_ADDR).unwrap();

    // The cut line is cached, so repeating the long text writes nothing.
    // The blank second row matches the cleared panel and is skipped.
    lcd.show("Manual : REVERSE!!", "");
    lcd.show("Manual : REVERSE!!", "");

    let (mut i2c, _) = lcd.release();
    i2c.done();
}

/// Pin and bus traffic of one command with optional parameters.
fn st_command(
    cmd: u8,
    params: &[u8],
    spi: &mut Vec<SpiTransaction>,
    dc: &mut Vec<State>,
    cs: &mut Vec<State>,
) {
    cs.push(Low);
    dc.push(Low);
    spi.push(SpiTransaction::write(vec![cmd]));
    if !params.is_empty() {
        dc.push(High);
        spi.push(SpiTransaction::write(params.to_vec()));
    }
    cs.push(High);
}

#[test]
fn st7735_initialises_and_fills_with_row_offset() {
    let (mut spi_t, mut dc_t, mut cs_t) = (Vec::new(), Vec::new(), vec![High]);

    st_command(0x01, &[], &mut spi_t, &mut dc_t, &mut cs_t);
    st_command(0x11, &[], &mut spi_t, &mut dc_t, &mut cs_t);
    st_command(0x36, &[0x60], &mut spi_t, &mut dc_t, &mut cs_t);
    st_command(0x3A, &[0x05], &mut spi_t, &mut dc_t, &mut cs_t);
    st_command(0x29, &[], &mut spi_t, &mut dc_t, &mut cs_t);

    // Two red pixels at the top-left corner; rows shift down by 26
    st_command(0x2A, &[0, 0, 0, 1], &mut spi_t, &mut dc_t, &mut cs_t);
    st_command(0x2B, &[0, 26, 0, 26], &mut spi_t, &mut dc_t, &mut cs_t);
    st_command(0x2C, &[0xF8, 0x00, 0xF8, 0x00], &mut spi_t, &mut dc_t, &mut cs_t);

    let spi = SpiMock::new(&spi_t);
    let dc = pin(&dc_t);
    let cs = pin(&cs_t);
    let mut display = St7735::new(spi, dc, cs, &mut MockNoop::new()).unwrap();

    display
        .fill_solid(&Rectangle::new(Point::zero(), Size::new(2, 1)), Rgb565::RED)
        .unwrap();
    // Entirely off-screen: no traffic
    display
        .fill_solid(&Rectangle::new(Point::new(200, 0), Size::new(4, 4)), Rgb565::RED)
        .unwrap();

    let (mut spi, mut dc, mut cs) = display.release();
    spi.done();
    dc.done();
    cs.done();
}
