//! Four-wheel skid-steer drive on dual-input H-bridges
//!
//! Every wheel has a forward and a backward input. Driving both low coasts
//! the wheel; driving both high is never done.

use embedded_hal::digital::v2::OutputPin;

use super::Drive;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WheelDir {
    Stop,
    Forward,
    Backward,
}

/// One H-bridge channel.
pub struct Wheel<P> {
    fwd: P,
    back: P,
}

impl<P: OutputPin> Wheel<P> {
    pub fn new(fwd: P, back: P) -> Self {
        Self { fwd, back }
    }

    pub fn set(&mut self, dir: WheelDir) -> Result<(), P::Error> {
        match dir {
            WheelDir::Forward => {
                self.fwd.set_high()?;
                self.back.set_low()
            }
            WheelDir::Backward => {
                self.fwd.set_low()?;
                self.back.set_high()
            }
            WheelDir::Stop => {
                self.fwd.set_low()?;
                self.back.set_low()
            }
        }
    }
}

/// Right front, right back, left front, left back.
pub struct QuadDrive<P> {
    right_front: Wheel<P>,
    right_back: Wheel<P>,
    left_front: Wheel<P>,
    left_back: Wheel<P>,
}

impl<P: OutputPin> QuadDrive<P> {
    /// Builds the drive with every wheel stopped.
    pub fn new(
        right_front: Wheel<P>,
        right_back: Wheel<P>,
        left_front: Wheel<P>,
        left_back: Wheel<P>,
    ) -> Result<Self, P::Error> {
        let mut drive = Self {
            right_front,
            right_back,
            left_front,
            left_back,
        };
        drive.set(WheelDir::Stop, WheelDir::Stop)?;
        Ok(drive)
    }

    /// Sets the left and right side, left side first.
    pub fn set(&mut self, left: WheelDir, right: WheelDir) -> Result<(), P::Error> {
        self.left_front.set(left)?;
        self.left_back.set(left)?;
        self.right_front.set(right)?;
        self.right_back.set(right)
    }
}

impl<P: OutputPin> Drive for QuadDrive<P> {
    fn forward(&mut self) {
        self.set(WheelDir::Forward, WheelDir::Forward).ok();
    }

    fn backward(&mut self) {
        self.set(WheelDir::Backward, WheelDir::Backward).ok();
    }

    fn left(&mut self) {
        self.set(WheelDir::Forward, WheelDir::Backward).ok();
    }

    fn right(&mut self) {
        self.set(WheelDir::Backward, WheelDir::Forward).ok();
    }

    fn stop(&mut self) {
        self.set(WheelDir::Stop, WheelDir::Stop).ok();
    }
}
