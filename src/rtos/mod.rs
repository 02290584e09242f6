//! Single-context cooperative scheduling

pub mod scheduler;

pub use scheduler::{Parts, Scheduler};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::DrawTarget;
use embedded_hal::serial;

use crate::drivers::{Drive, Indicator, Pan, RangeFinder, StatusPanel, ToneOutput};
use crate::os::Clock;

/// The concrete peripherals a firmware build plugs into the scheduler.
pub trait Platform {
    type Clock: Clock;
    type Drive: Drive;
    type Pan: Pan;
    type Ranger: RangeFinder;
    type Indicator: Indicator;
    type Tone: ToneOutput;
    type Surface: DrawTarget<Color = Rgb565>;
    type Panel: StatusPanel;
    type Serial: serial::Read<u8> + serial::Write<u8>;
}
