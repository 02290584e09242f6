//! Fatal error handling
//!
//! Ranging misses, unknown command bytes and cosmetic output failures are
//! absorbed where they happen. The only unrecoverable condition is a failed
//! peripheral bring-up, which stops the robot for good.

/// Peripheral bring-up failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// The device peripherals were already taken.
    PeripheralsTaken,
    /// The face display rejected its init sequence.
    Display,
    /// The status panel did not acknowledge on the bus.
    Panel,
}

impl InitError {
    pub const fn code(self) -> u16 {
        match self {
            InitError::PeripheralsTaken => 0x1000,
            InitError::Display => 0x1001,
            InitError::Panel => 0x1002,
        }
    }
}

/// Stop all further progress.
///
/// `disable_interrupts` runs once before parking the core so no interrupt
/// handler keeps driving outputs. There is no supervisory restart.
pub fn halt(err: InitError, disable_interrupts: impl FnOnce()) -> ! {
    error!("fatal init failure, code {=u16:#x}", err.code());
    disable_interrupts();
    loop {
        core::hint::spin_loop();
    }
}
