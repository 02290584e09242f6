#![no_std]
#![no_main]

use core::convert::Infallible;

use panic_halt as _;

use obstacle_bot::application::Chassis;
use obstacle_bot::config::{RobotConfig, PAN_CENTER_DEG};
use obstacle_bot::diagnostics::{halt, InitError};
use obstacle_bot::drivers::{
    lcd1602, Buzzer, Hcsr04, Lcd1602, QuadDrive, RgbLed, SerialConsole, Servo, St7735, Wheel,
};
use obstacle_bot::hal::gpio::board;
use obstacle_bot::hal::{
    timer, Delay, DynPin, Gpio, Micros, Millis, Port, Power, ServoPwm, Spi, Twi, Usart0,
};
use obstacle_bot::rtos::{Parts, Platform, Scheduler};

struct Board;

impl Platform for Board {
    type Clock = Millis;
    type Drive = QuadDrive<DynPin>;
    type Pan = Servo<ServoPwm>;
    type Ranger = Hcsr04<DynPin, DynPin, Delay, Micros>;
    type Indicator = RgbLed<DynPin>;
    type Tone = Buzzer<DynPin>;
    type Surface = St7735<Spi, DynPin, DynPin>;
    type Panel = Lcd1602<Twi, Delay>;
    type Serial = Usart0;
}

fn settled<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

fn wheel(gpio: &mut Gpio, (port, fwd, back): (Port, u8, u8)) -> Wheel<DynPin> {
    Wheel::new(gpio.output((port, fwd)), gpio.output((port, back)))
}

#[avr_device::entry]
fn main() -> ! {
    let Some(dp) = avr_device::atmega128a::Peripherals::take() else {
        halt(InitError::PeripheralsTaken, avr_device::interrupt::disable);
    };

    // The delay and the clock both run off the tick
    timer::init(dp.TC0);
    // SAFETY: every shared static is behind an interrupt mutex
    unsafe { avr_device::interrupt::enable() };

    let mut gpio = Gpio::new(dp.PORTA, dp.PORTB, dp.PORTC);

    let drive = settled(QuadDrive::new(
        wheel(&mut gpio, board::RIGHT_FRONT),
        wheel(&mut gpio, board::RIGHT_BACK),
        wheel(&mut gpio, board::LEFT_FRONT),
        wheel(&mut gpio, board::LEFT_BACK),
    ));
    let indicator = settled(RgbLed::new(
        gpio.output(board::LED_RED),
        gpio.output(board::LED_GREEN),
        gpio.output(board::LED_BLUE),
    ));
    let tone = settled(Buzzer::new(gpio.output(board::BUZZER)));

    let ranger = Hcsr04::new(
        gpio.output(board::SONAR_TRIGGER),
        gpio.input(board::SONAR_ECHO),
        Delay,
        Micros,
    );

    let _servo_out = gpio.output(board::SERVO);
    let pan = Servo::new(ServoPwm::new(dp.TC1), PAN_CENTER_DEG);

    let Ok(panel) = Lcd1602::new(Twi::new(dp.TWI), Delay, lcd1602::DEFAULT_ADDRESS) else {
        halt(InitError::Panel, avr_device::interrupt::disable);
    };

    // SS before enabling SPI, or the peripheral drops to slave mode
    let cs = gpio.output(board::SPI_SS);
    let _sck = gpio.output(board::SPI_SCK);
    let _mosi = gpio.output(board::SPI_MOSI);
    let dc = gpio.output(board::DISPLAY_DC);
    let Ok(surface) = St7735::new(Spi::new(dp.SPI), dc, cs, &mut Delay) else {
        halt(InitError::Display, avr_device::interrupt::disable);
    };

    let parts: Parts<Board> = Parts {
        clock: Millis,
        chassis: Chassis {
            drive,
            pan,
            ranger,
            indicator,
        },
        tone,
        surface,
        panel,
        console: SerialConsole::new(Usart0::new(dp.USART0)),
    };

    let mut power = Power::new(dp.CPU);
    let mut scheduler = Scheduler::new(parts, RobotConfig::default());
    scheduler.print_banner();
    scheduler.run(|| power.enter_idle_mode())
}
