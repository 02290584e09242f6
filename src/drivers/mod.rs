pub mod buzzer;
pub mod lcd1602;
pub mod motor_control;
pub mod rgb_led;
pub mod serial_console;
pub mod servo;
pub mod st7735;
pub mod ultrasonic;

pub use buzzer::Buzzer;
pub use lcd1602::Lcd1602;
pub use motor_control::{QuadDrive, Wheel, WheelDir};
pub use rgb_led::RgbLed;
pub use serial_console::SerialConsole;
pub use servo::Servo;
pub use st7735::{DisplayError, St7735};
pub use ultrasonic::{EchoError, Hcsr04, MicrosTimer};

/// Differential drive of the chassis.
pub trait Drive {
    fn forward(&mut self);
    fn backward(&mut self);
    fn left(&mut self);
    fn right(&mut self);
    fn stop(&mut self);
}

/// Pan actuator carrying the ranging sensor.
pub trait Pan {
    fn set_angle(&mut self, degrees: u8);
}

/// Colors the tri-color indicator can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Off,
    Green,
    Red,
    Orange,
}

pub trait Indicator {
    fn set_color(&mut self, color: Color);
}

/// On/off tone generator.
pub trait ToneOutput {
    fn set_tone(&mut self, on: bool);
}

/// Distance in centimeters, `0` when there is no reliable reading.
pub trait RangeFinder {
    fn distance_cm(&mut self) -> u16;
}

/// Two-line character panel for the status text.
pub trait StatusPanel {
    fn show(&mut self, line1: &str, line2: &str);
}
