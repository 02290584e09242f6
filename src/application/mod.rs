//! Application layer of the robot firmware
//!
//! Everything here is plain data plus logic over the driver seam traits in
//! [`crate::drivers`]; no module touches a register.

pub mod behavior;
pub mod command;
pub mod expression;
pub mod melody;
pub mod ui;

pub use behavior::{BehaviorStateMachine, Chassis};
pub use command::Command;
pub use expression::{Expression, ExpressionRenderer};
pub use melody::{tunes, MelodySequencer, Note};
pub use ui::{StatusText, UiCoordinator};

use crate::config::{NO_OBSTACLE_CM, PAN_CENTER_DEG, SCAN_MIN_DEG};

/// Behavior state of the robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RobotState {
    Idle,
    Scan,
    Decide,
    Move,
    Reverse,
    Alert,
}

impl RobotState {
    pub const fn name(self) -> &'static str {
        match self {
            RobotState::Idle => "IDLE",
            RobotState::Scan => "SCAN",
            RobotState::Decide => "DECIDE",
            RobotState::Move => "MOVE",
            RobotState::Reverse => "REVERSE",
            RobotState::Alert => "ALERT",
        }
    }
}

/// Who owns [`RobotState`] right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Nothing runs until a start command arrives.
    Stopped,
    /// The behavior state machine drives the robot.
    Auto,
    /// Every move comes from the operator.
    Manual,
}

/// Last operator command, kept for the status panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ManualCommand {
    Stop,
    Forward,
    Reverse,
    Left,
    Right,
    Center,
}

impl ManualCommand {
    pub const fn label(self) -> &'static str {
        match self {
            ManualCommand::Stop => "STOP",
            ManualCommand::Forward => "MOVE",
            ManualCommand::Reverse => "REVERSE",
            ManualCommand::Left => "LEFT",
            ManualCommand::Right => "RIGHT",
            ManualCommand::Center => "RESET",
        }
    }
}

/// Pan sweep of the ranging sensor and the closest obstacle seen during it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanSweep {
    angle: u8,
    direction: i8,
    min_distance: u16,
    min_angle: u8,
}

impl ScanSweep {
    pub const fn new() -> Self {
        Self {
            angle: SCAN_MIN_DEG,
            direction: 1,
            min_distance: NO_OBSTACLE_CM,
            min_angle: PAN_CENTER_DEG,
        }
    }

    pub const fn angle(&self) -> u8 {
        self.angle
    }

    pub const fn direction(&self) -> i8 {
        self.direction
    }

    pub const fn min_distance(&self) -> u16 {
        self.min_distance
    }

    pub const fn min_angle(&self) -> u8 {
        self.min_angle
    }

    /// Keeps `distance` if it is the closest so far. `0` means no reading.
    pub fn record(&mut self, distance: u16) {
        if distance > 0 && distance < self.min_distance {
            self.min_distance = distance;
            self.min_angle = self.angle;
        }
    }

    /// Steps the angle once. At either bound the angle is clamped, the
    /// direction flips and `true` is returned.
    pub fn advance(&mut self, min_deg: u8, max_deg: u8, step_deg: u8) -> bool {
        let next = self.angle as i16 + self.direction as i16 * step_deg as i16;
        if next >= max_deg as i16 {
            self.angle = max_deg;
            self.direction = -1;
            true
        } else if next <= min_deg as i16 {
            self.angle = min_deg;
            self.direction = 1;
            true
        } else {
            self.angle = next as u8;
            false
        }
    }

    pub fn reset_minimum(&mut self) {
        self.min_distance = NO_OBSTACLE_CM;
    }
}

impl Default for ScanSweep {
    fn default() -> Self {
        Self::new()
    }
}

/// The robot's shared state, handed around by `&mut`.
///
/// Mode and the manual command belong to the command handler. The behavior
/// state is written by the command handler in manual mode and by the state
/// machine in automatic mode. The sweep and the last distance belong to the
/// state machine.
#[derive(Debug)]
pub struct RobotContext {
    state: RobotState,
    mode: Mode,
    manual: ManualCommand,
    sweep: ScanSweep,
    last_distance: u16,
}

impl RobotContext {
    pub const fn new() -> Self {
        Self {
            state: RobotState::Idle,
            mode: Mode::Stopped,
            manual: ManualCommand::Stop,
            sweep: ScanSweep::new(),
            last_distance: 0,
        }
    }

    pub const fn state(&self) -> RobotState {
        self.state
    }

    /// Changes state. Leaving Alert, by whatever path, forgets the sweep
    /// minimum so the next decision starts from a clean sweep.
    pub fn set_state(&mut self, state: RobotState) {
        if self.state == RobotState::Alert && state != RobotState::Alert {
            self.sweep.reset_minimum();
        }
        self.state = state;
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub const fn manual_command(&self) -> ManualCommand {
        self.manual
    }

    pub fn set_manual_command(&mut self, cmd: ManualCommand) {
        self.manual = cmd;
    }

    pub const fn sweep(&self) -> &ScanSweep {
        &self.sweep
    }

    pub fn sweep_mut(&mut self) -> &mut ScanSweep {
        &mut self.sweep
    }

    pub const fn last_distance(&self) -> u16 {
        self.last_distance
    }

    pub fn set_last_distance(&mut self, cm: u16) {
        self.last_distance = cm;
    }
}

impl Default for RobotContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SCAN_MAX_DEG, SCAN_STEP_DEG};

    fn step(sweep: &mut ScanSweep) -> bool {
        sweep.advance(SCAN_MIN_DEG, SCAN_MAX_DEG, SCAN_STEP_DEG)
    }

    #[test]
    fn sweep_starts_at_lower_bound() {
        let sweep = ScanSweep::new();
        assert_eq!(sweep.angle(), 30);
        assert_eq!(sweep.direction(), 1);
        assert_eq!(sweep.min_distance(), 999);
        assert_eq!(sweep.min_angle(), 90);
    }

    #[test]
    fn sweep_reverses_exactly_at_each_bound() {
        let mut sweep = ScanSweep::new();
        let mut bounds = 0;
        for _ in 0..100 {
            let hit = step(&mut sweep);
            assert!((30..=150).contains(&sweep.angle()));
            if hit {
                bounds += 1;
                assert!(sweep.angle() == 30 || sweep.angle() == 150);
                let expected = if sweep.angle() == 150 { -1 } else { 1 };
                assert_eq!(sweep.direction(), expected);
            } else {
                assert!(sweep.angle() != 30 && sweep.angle() != 150);
            }
        }
        assert!(bounds >= 8);
    }

    #[test]
    fn first_pass_takes_twelve_steps() {
        let mut sweep = ScanSweep::new();
        let steps = (1..).find(|_| step(&mut sweep)).unwrap();
        assert_eq!(steps, 12);
        assert_eq!(sweep.angle(), 150);
    }

    #[test]
    fn timeouts_never_become_the_minimum() {
        let mut sweep = ScanSweep::new();
        sweep.record(0);
        assert_eq!(sweep.min_distance(), 999);

        step(&mut sweep);
        sweep.record(55);
        step(&mut sweep);
        sweep.record(70);
        assert_eq!(sweep.min_distance(), 55);
        assert_eq!(sweep.min_angle(), 40);
    }

    #[test]
    fn leaving_alert_resets_minimum() {
        let mut ctx = RobotContext::new();
        ctx.sweep_mut().record(12);
        ctx.set_state(RobotState::Alert);
        ctx.set_state(RobotState::Alert);
        assert_eq!(ctx.sweep().min_distance(), 12);

        ctx.set_state(RobotState::Idle);
        assert_eq!(ctx.sweep().min_distance(), 999);
    }
}
