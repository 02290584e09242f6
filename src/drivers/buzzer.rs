use embedded_hal::digital::v2::OutputPin;

use super::ToneOutput;

/// Active buzzer on a single output pin, high = sounding.
pub struct Buzzer<P> {
    pin: P,
}

impl<P: OutputPin> Buzzer<P> {
    /// Takes the pin and makes sure the buzzer starts silent.
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self { pin })
    }

    pub fn on(&mut self) -> Result<(), P::Error> {
        self.pin.set_high()
    }

    pub fn off(&mut self) -> Result<(), P::Error> {
        self.pin.set_low()
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> ToneOutput for Buzzer<P> {
    fn set_tone(&mut self, on: bool) {
        // GPIO writes cannot fail on the target, so the result carries nothing.
        if on {
            self.on().ok();
        } else {
            self.off().ok();
        }
    }
}
