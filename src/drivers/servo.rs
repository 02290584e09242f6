//! Hobby servo on a 50 Hz PWM channel

use embedded_hal::PwmPin;

use super::Pan;

/// PWM frame length in microseconds
const FRAME_US: u32 = 20_000;
/// Pulse width at 0 and 180 degrees
const MIN_PULSE_US: u32 = 500;
const MAX_PULSE_US: u32 = 2_500;
const MAX_ANGLE: u8 = 180;

/// Positions a servo by pulse width. The channel must already run at 50 Hz,
/// its max duty spanning one 20 ms frame.
pub struct Servo<P> {
    pwm: P,
    angle: u8,
}

impl<P> Servo<P>
where
    P: PwmPin<Duty = u16>,
{
    pub fn new(mut pwm: P, initial: u8) -> Self {
        pwm.enable();
        let mut servo = Self { pwm, angle: initial };
        servo.set(initial);
        servo
    }

    pub fn set(&mut self, degrees: u8) {
        let degrees = degrees.min(MAX_ANGLE);
        let duty = Self::duty_for(degrees, self.pwm.get_max_duty());
        self.pwm.set_duty(duty);
        self.angle = degrees;
    }

    pub fn angle(&self) -> u8 {
        self.angle
    }

    fn duty_for(degrees: u8, max_duty: u16) -> u16 {
        let pulse_us =
            MIN_PULSE_US + degrees as u32 * (MAX_PULSE_US - MIN_PULSE_US) / MAX_ANGLE as u32;
        (max_duty as u32 * pulse_us / FRAME_US) as u16
    }
}

impl<P: PwmPin<Duty = u16>> Pan for Servo<P> {
    fn set_angle(&mut self, degrees: u8) {
        self.set(degrees);
    }
}
