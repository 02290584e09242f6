//! Millisecond time base shared by every component of the control loop

/// A reading of the millisecond tick counter.
///
/// The counter wraps after ~49 days; every comparison goes through
/// [`Tick::elapsed_since`], which stays correct across the wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick(u32);

impl Tick {
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    pub const fn millis(self) -> u32 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`.
    #[inline]
    pub const fn elapsed_since(self, earlier: Tick) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    #[inline]
    pub const fn wrapping_add(self, ms: u32) -> Tick {
        Tick(self.0.wrapping_add(ms))
    }
}

/// Monotonic millisecond source.
pub trait Clock {
    fn now(&self) -> Tick;
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> Tick {
        (**self).now()
    }
}

/// "Has at least `period` elapsed since the last run" gate.
///
/// Declining to run never blocks: the caller simply skips its work for this
/// iteration.
#[derive(Clone, Copy, Debug)]
pub struct Cadence {
    period_ms: u32,
    last_run: Tick,
}

impl Cadence {
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last_run: Tick(0),
        }
    }

    pub const fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Returns `true` and restarts the period when it has elapsed.
    pub fn ready(&mut self, now: Tick) -> bool {
        if now.elapsed_since(self.last_run) >= self.period_ms {
            self.last_run = now;
            true
        } else {
            false
        }
    }

    pub fn restart(&mut self, now: Tick) {
        self.last_run = now;
    }
}
