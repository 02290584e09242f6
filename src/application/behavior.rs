//! Six-state obstacle avoidance logic
//!
//! Idle waits for a start command. Scan sweeps the pan actuator, ranging
//! once per step and remembering the closest hit. At either end of the sweep
//! Decide either moves on (Move, then straight back to Scan) or turns away
//! from the obstacle (Alert). Reverse is entered only by the operator.
//!
//! Entry effects run once per state change, detected against a cached
//! previous state. The machine never blocks: Scan is rate limited by a
//! cadence gate and the Alert turn by a start timestamp.

use ufmt::{uWrite, uwrite};

use super::command::Command;
use super::melody::{tunes, MelodySequencer};
use super::{ManualCommand, Mode, RobotContext, RobotState};
use crate::config::{RobotConfig, PAN_CENTER_DEG};
use crate::drivers::{Color, Drive, Indicator, Pan, RangeFinder, ToneOutput};
use crate::os::{Cadence, Tick};

/// The actuators and the ranging sensor the state machine commands.
pub struct Chassis<D, P, R, L> {
    pub drive: D,
    pub pan: P,
    pub ranger: R,
    pub indicator: L,
}

pub struct BehaviorStateMachine {
    config: RobotConfig,
    prev_state: RobotState,
    scan: Cadence,
    /// Start of the running avoidance turn
    avoid_since: Option<Tick>,
    reverse_since: Tick,
    last_color: Option<Color>,
}

impl BehaviorStateMachine {
    pub fn new(config: RobotConfig) -> Self {
        Self {
            prev_state: RobotState::Idle,
            scan: Cadence::new(config.scan_interval_ms),
            avoid_since: None,
            reverse_since: Tick::default(),
            last_color: None,
            config,
        }
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Whether an avoidance turn is in progress.
    pub fn is_avoiding(&self) -> bool {
        self.avoid_since.is_some()
    }

    /// Applies one operator command: flags, state, direct actuator moves and
    /// the reverse tune. Entry effects follow in [`Self::on_transition`].
    pub fn apply_command<D, P, R, L, T, W>(
        &mut self,
        cmd: Command,
        ctx: &mut RobotContext,
        chassis: &mut Chassis<D, P, R, L>,
        melody: &mut MelodySequencer<T>,
        out: &mut W,
        now: Tick,
    ) where
        D: Drive,
        P: Pan,
        T: ToneOutput,
        W: uWrite,
    {
        info!("command {}", cmd);
        match cmd {
            Command::Start => {
                ctx.set_mode(Mode::Auto);
                melody.stop();
                uwrite!(out, "AUTO MODE START\r\n").ok();
                ctx.set_state(RobotState::Scan);
            }
            Command::Stop => {
                ctx.set_mode(Mode::Stopped);
                chassis.drive.stop();
                melody.stop();
                uwrite!(out, "STOP\r\n").ok();
                ctx.set_state(RobotState::Idle);
                ctx.set_manual_command(ManualCommand::Stop);
            }
            Command::Forward => {
                ctx.set_mode(Mode::Manual);
                melody.stop();
                chassis.drive.forward();
                uwrite!(out, "MANUAL: FORWARD\r\n").ok();
                ctx.set_state(RobotState::Move);
                ctx.set_manual_command(ManualCommand::Forward);
            }
            Command::Backward => {
                // Every press restarts the tune, also while already reversing
                ctx.set_mode(Mode::Manual);
                chassis.drive.backward();
                melody.play(&tunes::REVERSE, now);
                ctx.set_state(RobotState::Reverse);
                uwrite!(out, "MANUAL: BACKWARD\r\n").ok();
                ctx.set_manual_command(ManualCommand::Reverse);
            }
            Command::Left => {
                ctx.set_mode(Mode::Manual);
                melody.stop();
                chassis.drive.left();
                uwrite!(out, "MANUAL: LEFT\r\n").ok();
                ctx.set_manual_command(ManualCommand::Left);
            }
            Command::Right => {
                ctx.set_mode(Mode::Manual);
                melody.stop();
                chassis.drive.right();
                uwrite!(out, "MANUAL: RIGHT\r\n").ok();
                ctx.set_manual_command(ManualCommand::Right);
            }
            Command::CenterPan => {
                chassis.pan.set_angle(PAN_CENTER_DEG);
                uwrite!(out, "SERVO RESET (90 deg)\r\n").ok();
                ctx.set_manual_command(ManualCommand::Center);
            }
        }
    }

    /// Runs entry effects if the state changed since the last call.
    pub fn on_transition<D, P, R, L, T>(
        &mut self,
        ctx: &RobotContext,
        chassis: &mut Chassis<D, P, R, L>,
        melody: &mut MelodySequencer<T>,
        now: Tick,
    ) where
        D: Drive,
        T: ToneOutput,
    {
        let state = ctx.state();
        if state == self.prev_state {
            return;
        }
        info!("state {} -> {}", self.prev_state, state);

        if self.prev_state == RobotState::Alert {
            self.avoid_since = None;
        }
        match state {
            RobotState::Reverse => {
                chassis.drive.backward();
                self.reverse_since = now;
            }
            RobotState::Alert => {
                self.avoid_since = None;
                melody.play(&tunes::ALERT, now);
            }
            _ => {}
        }
        self.prev_state = state;
    }

    /// Shows the state on the indicator. Writes only when the color changes.
    pub fn update_indicator<L: Indicator>(&mut self, ctx: &RobotContext, indicator: &mut L, now: Tick) {
        let color = match ctx.state() {
            RobotState::Idle => Color::Off,
            RobotState::Scan | RobotState::Move => Color::Green,
            RobotState::Decide => Color::Orange,
            RobotState::Alert => Color::Red,
            RobotState::Reverse => {
                let period = self.config.reverse_blink_ms.max(2);
                if now.elapsed_since(self.reverse_since) % period < period / 2 {
                    Color::Orange
                } else {
                    Color::Off
                }
            }
        };
        if self.last_color != Some(color) {
            indicator.set_color(color);
            self.last_color = Some(color);
        }
    }

    /// One step of automatic behavior. The caller runs it only in
    /// [`Mode::Auto`].
    pub fn step<D, P, R, L, W>(
        &mut self,
        ctx: &mut RobotContext,
        chassis: &mut Chassis<D, P, R, L>,
        out: &mut W,
        now: Tick,
    ) where
        D: Drive,
        P: Pan,
        R: RangeFinder,
        W: uWrite,
    {
        match ctx.state() {
            RobotState::Idle | RobotState::Reverse => {}
            RobotState::Scan => self.scan_step(ctx, chassis, out, now),
            RobotState::Decide => {
                let sweep = ctx.sweep();
                let (angle, distance) = (sweep.min_angle(), sweep.min_distance());
                uwrite!(
                    out,
                    "STATE:{} | min_angle={} | min_dist={} cm\r\n",
                    RobotState::Decide.name(),
                    angle,
                    distance
                )
                .ok();
                if distance > self.config.safe_distance_cm {
                    ctx.set_state(RobotState::Move);
                } else {
                    ctx.set_state(RobotState::Alert);
                }
            }
            RobotState::Move => {
                uwrite!(out, "STATE:{} | FORWARD\r\n", RobotState::Move.name()).ok();
                chassis.drive.forward();
                ctx.set_state(RobotState::Scan);
            }
            RobotState::Alert => match self.avoid_since {
                None => {
                    if ctx.sweep().min_angle() < PAN_CENTER_DEG {
                        chassis.drive.right();
                    } else {
                        chassis.drive.left();
                    }
                    self.avoid_since = Some(now);
                }
                Some(start) if now.elapsed_since(start) >= self.config.avoid_turn_ms => {
                    chassis.drive.stop();
                    self.avoid_since = None;
                    ctx.set_state(RobotState::Scan);
                }
                Some(_) => {}
            },
        }
    }

    fn scan_step<D, P, R, L, W>(
        &mut self,
        ctx: &mut RobotContext,
        chassis: &mut Chassis<D, P, R, L>,
        out: &mut W,
        now: Tick,
    ) where
        P: Pan,
        R: RangeFinder,
        W: uWrite,
    {
        if !self.scan.ready(now) {
            return;
        }

        let angle = ctx.sweep().angle();
        chassis.pan.set_angle(angle);
        let distance = chassis.ranger.distance_cm();
        ctx.set_last_distance(distance);
        uwrite!(
            out,
            "STATE:{} | angle={} | dist={} cm\r\n",
            RobotState::Scan.name(),
            angle,
            distance
        )
        .ok();

        let cfg = self.config;
        let sweep = ctx.sweep_mut();
        sweep.record(distance);
        if sweep.advance(cfg.scan_min_deg, cfg.scan_max_deg, cfg.scan_step_deg) {
            ctx.set_state(RobotState::Decide);
        }
    }
}
