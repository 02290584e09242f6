//! Cooperative control loop
//!
//! One pass of [`Scheduler::run_once`] runs every stage in a fixed order:
//!
//! 1. drain and apply operator commands
//! 2. state entry effects
//! 3. indicator refresh
//! 4. melody update
//! 5. UI frame, gated at [`UI_UPDATE_MS`]
//! 6. automatic behavior step, in auto mode only
//!
//! No stage waits on another. The only busy-wait is the bounded echo timing
//! inside a Scan sample.

use ufmt::uwrite;

use super::Platform;
use crate::application::{
    BehaviorStateMachine, Chassis, Command, ExpressionRenderer, MelodySequencer, Mode,
    RobotContext, UiCoordinator,
};
use crate::config::{RobotConfig, UI_UPDATE_MS};
use crate::drivers::{SerialConsole, StatusPanel};
use crate::os::{Cadence, Clock, Tick};

/// Everything the scheduler drives, already initialised.
pub struct Parts<P: Platform> {
    pub clock: P::Clock,
    pub chassis: Chassis<P::Drive, P::Pan, P::Ranger, P::Indicator>,
    pub tone: P::Tone,
    pub surface: P::Surface,
    pub panel: P::Panel,
    pub console: SerialConsole<P::Serial>,
}

pub struct Scheduler<P: Platform> {
    clock: P::Clock,
    ctx: RobotContext,
    behavior: BehaviorStateMachine,
    chassis: Chassis<P::Drive, P::Pan, P::Ranger, P::Indicator>,
    melody: MelodySequencer<P::Tone>,
    face: ExpressionRenderer,
    ui: UiCoordinator,
    ui_cadence: Cadence,
    surface: P::Surface,
    panel: P::Panel,
    console: SerialConsole<P::Serial>,
}

impl<P: Platform> Scheduler<P> {
    pub fn new(parts: Parts<P>, config: RobotConfig) -> Self {
        let ctx = RobotContext::new();
        let now = parts.clock.now();
        let mut ui_cadence = Cadence::new(UI_UPDATE_MS);
        ui_cadence.restart(now);
        info!("control loop up, ui every {=u32} ms", UI_UPDATE_MS);

        Self {
            ui: UiCoordinator::new(ctx.state(), now),
            behavior: BehaviorStateMachine::new(config),
            melody: MelodySequencer::new(parts.tone),
            face: ExpressionRenderer::new(),
            clock: parts.clock,
            ctx,
            chassis: parts.chassis,
            ui_cadence,
            surface: parts.surface,
            panel: parts.panel,
            console: parts.console,
        }
    }

    pub fn context(&self) -> &RobotContext {
        &self.ctx
    }

    pub fn melody(&self) -> &MelodySequencer<P::Tone> {
        &self.melody
    }

    /// Greets the operator on the console.
    pub fn print_banner(&mut self) {
        uwrite!(
            &mut self.console,
            "OBSTACLE BOT v{}\r\nPress 't' to start.\r\n",
            env!("CARGO_PKG_VERSION")
        )
        .ok();
    }

    pub fn run_once(&mut self) {
        let now = self.clock.now();

        while let Some(byte) = self.console.read_byte() {
            match Command::from_byte(byte) {
                Some(cmd) => self.behavior.apply_command(
                    cmd,
                    &mut self.ctx,
                    &mut self.chassis,
                    &mut self.melody,
                    &mut self.console,
                    now,
                ),
                None => debug!("ignored byte {=u8:#x}", byte),
            }
        }

        self.behavior
            .on_transition(&self.ctx, &mut self.chassis, &mut self.melody, now);
        self.behavior
            .update_indicator(&self.ctx, &mut self.chassis.indicator, now);
        self.melody.update(now);

        if self.ui_cadence.ready(now) {
            self.ui_frame(now);
        }

        if self.ctx.mode() == Mode::Auto {
            // A slow redraw above must not shift the sample timing
            let now = self.clock.now();
            self.behavior
                .step(&mut self.ctx, &mut self.chassis, &mut self.console, now);
        }
    }

    /// Runs the loop forever, calling `idle` between passes.
    pub fn run(&mut self, mut idle: impl FnMut()) -> ! {
        loop {
            self.run_once();
            idle();
        }
    }

    fn ui_frame(&mut self, now: Tick) {
        let text = self.ui.update(&self.ctx, now, &mut self.face);
        self.panel.show(text.line1.as_str(), text.line2.as_str());
        if self.face.update(&mut self.surface).is_err() {
            warn!("face redraw failed, retrying next frame");
        }
    }
}
