//! Host-side fakes for the driver seams
//!
//! Every fake is a cheap handle around shared state, so a test keeps one
//! clone to inspect while the code under test owns the other.

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{ContainsPoint, PointsIter, Rectangle};
use embedded_hal::serial;

use crate::drivers::{Color, Drive, Indicator, Pan, RangeFinder, StatusPanel, ToneOutput};
use crate::os::{Clock, Tick};

/// Millisecond clock the test moves by hand.
#[derive(Clone, Default)]
pub struct SharedClock(Rc<Cell<u32>>);

impl SharedClock {
    pub fn set(&self, ms: u32) {
        self.0.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Clock for SharedClock {
    fn now(&self) -> Tick {
        Tick::from_millis(self.0.get())
    }
}

#[derive(Clone, Default)]
pub struct FakeTone {
    on: Rc<Cell<bool>>,
    rising: Rc<Cell<u32>>,
}

impl FakeTone {
    pub fn is_on(&self) -> bool {
        self.on.get()
    }

    /// How many times the tone switched from silent to sounding.
    pub fn rising_edges(&self) -> u32 {
        self.rising.get()
    }
}

impl ToneOutput for FakeTone {
    fn set_tone(&mut self, on: bool) {
        if on && !self.on.get() {
            self.rising.set(self.rising.get() + 1);
        }
        self.on.set(on);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

#[derive(Clone, Default)]
pub struct RecordingDrive(Rc<RefCell<Vec<Motion>>>);

impl RecordingDrive {
    pub fn calls(&self) -> Vec<Motion> {
        self.0.borrow().clone()
    }

    pub fn last(&self) -> Option<Motion> {
        self.0.borrow().last().copied()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Drive for RecordingDrive {
    fn forward(&mut self) {
        self.0.borrow_mut().push(Motion::Forward);
    }

    fn backward(&mut self) {
        self.0.borrow_mut().push(Motion::Backward);
    }

    fn left(&mut self) {
        self.0.borrow_mut().push(Motion::Left);
    }

    fn right(&mut self) {
        self.0.borrow_mut().push(Motion::Right);
    }

    fn stop(&mut self) {
        self.0.borrow_mut().push(Motion::Stop);
    }
}

#[derive(Clone, Default)]
pub struct RecordingPan(Rc<RefCell<Vec<u8>>>);

impl RecordingPan {
    pub fn angles(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    pub fn last(&self) -> Option<u8> {
        self.0.borrow().last().copied()
    }
}

impl Pan for RecordingPan {
    fn set_angle(&mut self, degrees: u8) {
        self.0.borrow_mut().push(degrees);
    }
}

#[derive(Clone, Default)]
pub struct RecordingIndicator(Rc<RefCell<Vec<Color>>>);

impl RecordingIndicator {
    pub fn writes(&self) -> Vec<Color> {
        self.0.borrow().clone()
    }

    pub fn last(&self) -> Option<Color> {
        self.0.borrow().last().copied()
    }
}

impl Indicator for RecordingIndicator {
    fn set_color(&mut self, color: Color) {
        self.0.borrow_mut().push(color);
    }
}

/// Returns queued readings in order, then `0` (a timeout) forever.
#[derive(Clone, Default)]
pub struct ScriptedRanger {
    readings: Rc<RefCell<VecDeque<u16>>>,
    calls: Rc<Cell<u32>>,
}

impl ScriptedRanger {
    pub fn push(&self, readings: &[u16]) {
        self.readings.borrow_mut().extend(readings.iter().copied());
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl RangeFinder for ScriptedRanger {
    fn distance_cm(&mut self) -> u16 {
        self.calls.set(self.calls.get() + 1);
        self.readings.borrow_mut().pop_front().unwrap_or(0)
    }
}

#[derive(Clone, Default)]
pub struct RecordingPanel {
    lines: Rc<RefCell<(String, String)>>,
    shows: Rc<Cell<u32>>,
}

impl RecordingPanel {
    pub fn lines(&self) -> (String, String) {
        self.lines.borrow().clone()
    }

    pub fn shows(&self) -> u32 {
        self.shows.get()
    }
}

impl StatusPanel for RecordingPanel {
    fn show(&mut self, line1: &str, line2: &str) {
        *self.lines.borrow_mut() = (line1.into(), line2.into());
        self.shows.set(self.shows.get() + 1);
    }
}

/// Serial port with a scripted receive queue and a captured transmit log.
#[derive(Clone, Default)]
pub struct FakeSerial {
    rx: Rc<RefCell<VecDeque<u8>>>,
    tx: Rc<RefCell<Vec<u8>>>,
}

impl FakeSerial {
    pub fn feed(&self, bytes: &[u8]) {
        self.rx.borrow_mut().extend(bytes.iter().copied());
    }

    /// Everything written so far, drained.
    pub fn take_output(&self) -> String {
        let bytes: Vec<u8> = self.tx.borrow_mut().drain(..).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl serial::Read<u8> for FakeSerial {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.rx.borrow_mut().pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for FakeSerial {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
        self.tx.borrow_mut().push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceFault;

#[derive(Default)]
struct SurfaceLog {
    fills: Vec<Rectangle>,
    pixels: Vec<Point>,
    fail: bool,
}

/// 160x80 draw target that records instead of drawing.
#[derive(Clone, Default)]
pub struct CountingSurface(Rc<RefCell<SurfaceLog>>);

impl CountingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following draw call fail until reset.
    pub fn fail_next(&self, fail: bool) {
        self.0.borrow_mut().fail = fail;
    }

    /// Number of solid fills of exactly `area`.
    pub fn clears(&self, area: Rectangle) -> usize {
        self.0.borrow().fills.iter().filter(|r| **r == area).count()
    }

    pub fn fill_count(&self) -> usize {
        self.0.borrow().fills.len()
    }

    /// Pixels and fills that touched anything outside `allowed`.
    pub fn pixels_outside(&self, allowed: &[Rectangle]) -> usize {
        let log = self.0.borrow();
        let inside = |p: &Point| allowed.iter().any(|r| r.contains(*p));
        let stray_pixels = log.pixels.iter().filter(|p| !inside(p)).count();
        let stray_fills = log
            .fills
            .iter()
            .filter(|r| r.points().any(|p| !inside(&p)))
            .count();
        stray_pixels + stray_fills
    }
}

impl OriginDimensions for CountingSurface {
    fn size(&self) -> Size {
        Size::new(160, 80)
    }
}

impl DrawTarget for CountingSurface {
    type Color = Rgb565;
    type Error = SurfaceFault;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), SurfaceFault>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        let mut log = self.0.borrow_mut();
        if log.fail {
            return Err(SurfaceFault);
        }
        log.pixels.extend(pixels.into_iter().map(|Pixel(p, _)| p));
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, _color: Rgb565) -> Result<(), SurfaceFault> {
        let mut log = self.0.borrow_mut();
        if log.fail {
            return Err(SurfaceFault);
        }
        log.fills.push(*area);
        Ok(())
    }
}
