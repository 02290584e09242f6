//! HC-SR04 style ultrasonic ranging
//!
//! A measurement is a 10 µs trigger pulse followed by two bounded busy-waits:
//! one for the echo line to rise, one for it to fall. Each wait gives up after
//! [`ECHO_TIMEOUT_US`], so a single call occupies the caller for at most about
//! 60 ms. Callers are expected to rate limit measurements.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use super::RangeFinder;
use crate::config::{ECHO_MAX_US, ECHO_MIN_US, ECHO_TIMEOUT_US, TRIGGER_PULSE_US};

/// Free-running microsecond counter, wrapping at `u32::MAX`.
pub trait MicrosTimer {
    fn now_us(&self) -> u32;
}

impl<T: MicrosTimer> MicrosTimer for &T {
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}

/// Why a measurement produced no distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EchoError {
    /// The echo line never rose.
    NoEcho,
    /// The echo line rose but never fell.
    EchoStuck,
    /// Echo width in µs outside the trusted window.
    OutOfRange(u32),
    /// Trigger or echo pin access failed.
    Pin,
}

pub struct Hcsr04<TRIG, ECHO, D, T> {
    trigger: TRIG,
    echo: ECHO,
    delay: D,
    timer: T,
}

impl<TRIG, ECHO, D, T> Hcsr04<TRIG, ECHO, D, T>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    D: DelayUs<u16>,
    T: MicrosTimer,
{
    pub fn new(trigger: TRIG, echo: ECHO, delay: D, timer: T) -> Self {
        Self {
            trigger,
            echo,
            delay,
            timer,
        }
    }

    /// One full measurement, in centimeters.
    pub fn measure(&mut self) -> Result<u16, EchoError> {
        self.trigger_pulse()?;
        let width = self.echo_width_us()?;

        if !(ECHO_MIN_US..=ECHO_MAX_US).contains(&width) {
            return Err(EchoError::OutOfRange(width));
        }

        // 343 m/s, halved for the round trip: 0.017 cm per µs
        Ok((width * 17 / 1000) as u16)
    }

    fn trigger_pulse(&mut self) -> Result<(), EchoError> {
        self.trigger.set_high().map_err(|_| EchoError::Pin)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low().map_err(|_| EchoError::Pin)
    }

    fn echo_width_us(&mut self) -> Result<u32, EchoError> {
        let start = self.timer.now_us();
        while !self.echo_high()? {
            if self.timer.now_us().wrapping_sub(start) > ECHO_TIMEOUT_US {
                return Err(EchoError::NoEcho);
            }
        }

        let rise = self.timer.now_us();
        loop {
            let width = self.timer.now_us().wrapping_sub(rise);
            if !self.echo_high()? {
                return Ok(width);
            }
            if width > ECHO_TIMEOUT_US {
                return Err(EchoError::EchoStuck);
            }
        }
    }

    fn echo_high(&self) -> Result<bool, EchoError> {
        self.echo.is_high().map_err(|_| EchoError::Pin)
    }

    pub fn release(self) -> (TRIG, ECHO, D, T) {
        (self.trigger, self.echo, self.delay, self.timer)
    }
}

impl<TRIG, ECHO, D, T> RangeFinder for Hcsr04<TRIG, ECHO, D, T>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    D: DelayUs<u16>,
    T: MicrosTimer,
{
    fn distance_cm(&mut self) -> u16 {
        match self.measure() {
            Ok(cm) => cm,
            Err(err) => {
                debug!("ranging miss: {}", err);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use std::rc::Rc;

    /// Each reading advances time by `step` µs.
    #[derive(Clone)]
    struct SteppingTimer {
        now: Rc<Cell<u32>>,
        step: u32,
    }

    impl MicrosTimer for SteppingTimer {
        fn now_us(&self) -> u32 {
            let t = self.now.get();
            self.now.set(t.wrapping_add(self.step));
            t
        }
    }

    /// Echo high while the shared clock is inside `[rise, fall)`, both
    /// counted from `origin`.
    struct ScriptedEcho {
        now: Rc<Cell<u32>>,
        origin: u32,
        rise: Option<u32>,
        fall: Option<u32>,
    }

    impl InputPin for ScriptedEcho {
        type Error = Infallible;

        fn is_high(&self) -> Result<bool, Infallible> {
            let t = self.now.get().wrapping_sub(self.origin);
            let risen = self.rise.map_or(false, |r| t >= r);
            let fallen = self.fall.map_or(false, |f| t >= f);
            Ok(risen && !fallen)
        }

        fn is_low(&self) -> Result<bool, Infallible> {
            self.is_high().map(|h| !h)
        }
    }

    struct NullPin;

    impl OutputPin for NullPin {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayUs<u16> for NoDelay {
        fn delay_us(&mut self, _us: u16) {}
    }

    /// `rise`/`fall` are offsets from `start`.
    fn sensor(
        start: u32,
        rise: Option<u32>,
        fall: Option<u32>,
    ) -> Hcsr04<NullPin, ScriptedEcho, NoDelay, SteppingTimer> {
        let now = Rc::new(Cell::new(start));
        let echo = ScriptedEcho {
            now: now.clone(),
            origin: start,
            rise,
            fall,
        };
        Hcsr04::new(NullPin, echo, NoDelay, SteppingTimer { now, step: 10 })
    }

    #[test]
    fn converts_echo_width_to_centimeters() {
        // ~5800 µs round trip is about one meter
        let mut s = sensor(0, Some(500), Some(6_300));
        let cm = s.measure().unwrap();
        assert!((98..=100).contains(&cm), "got {cm}");
        assert_eq!(s.distance_cm(), 0, "echo already consumed");
    }

    #[test]
    fn missing_echo_times_out() {
        let mut s = sensor(0, None, None);
        assert_eq!(s.measure(), Err(EchoError::NoEcho));
    }

    #[test]
    fn stuck_echo_times_out() {
        let mut s = sensor(0, Some(100), None);
        assert_eq!(s.measure(), Err(EchoError::EchoStuck));
        let mut s = sensor(0, Some(100), None);
        assert_eq!(s.distance_cm(), 0);
    }

    #[test]
    fn short_and_long_echoes_are_rejected() {
        let mut s = sensor(0, Some(100), Some(200));
        assert!(matches!(s.measure(), Err(EchoError::OutOfRange(_))));

        let mut s = sensor(0, Some(100), Some(100 + 25_000));
        assert!(matches!(s.measure(), Err(EchoError::OutOfRange(_))));
        let mut s = sensor(0, Some(100), Some(100 + 25_000));
        assert_eq!(s.distance_cm(), 0);
    }

    #[test]
    fn timing_survives_counter_wrap() {
        let mut s = sensor(u32::MAX - 1_000, Some(2_000), Some(4_900));
        let cm = s.measure().unwrap();
        assert!((48..=50).contains(&cm), "got {cm}");
    }
}
