//! Face and status panel content derived from the robot context

use core::convert::Infallible;

use heapless::String;
use ufmt::{uWrite, uwrite};

use super::expression::{Expression, ExpressionRenderer};
use super::{Mode, RobotContext, RobotState};
use crate::config::{BLINK_DURATION_MS, BLINK_INTERVAL_MS};
use crate::os::Tick;

pub const LINE_WIDTH: usize = 16;

/// One panel line. Text past the panel width is dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusLine(String<LINE_WIDTH>);

impl StatusLine {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl uWrite for StatusLine {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusText {
    pub line1: StatusLine,
    pub line2: StatusLine,
}

impl StatusText {
    pub fn compose(ctx: &RobotContext) -> Self {
        let mut text = Self::default();
        let line1 = &mut text.line1;
        match ctx.mode() {
            Mode::Auto => uwrite!(line1, "AUTO : {}", ctx.state().name()).ok(),
            Mode::Manual => uwrite!(line1, "Manual : {}", ctx.manual_command().label()).ok(),
            Mode::Stopped => uwrite!(line1, "STATE: IDLE").ok(),
        };
        let line2 = &mut text.line2;
        uwrite!(
            line2,
            "D:{}cm A:{}",
            ctx.last_distance(),
            ctx.sweep().angle()
        )
        .ok();
        text
    }
}

/// Periodic eye blink.
struct BlinkTimer {
    since: Tick,
    blinking: bool,
}

impl BlinkTimer {
    fn update(&mut self, selected: Expression, now: Tick) -> bool {
        let elapsed = now.elapsed_since(self.since);
        if self.blinking {
            if elapsed >= BLINK_DURATION_MS {
                self.blinking = false;
                self.since = now;
            }
        } else if elapsed >= BLINK_INTERVAL_MS
            && !matches!(selected, Expression::Blink | Expression::Sleepy)
        {
            self.blinking = true;
            self.since = now;
        }
        self.blinking
    }
}

/// Picks the face from the behavior state and builds the status text.
pub struct UiCoordinator {
    prev_state: RobotState,
    selected: Expression,
    blink: BlinkTimer,
}

impl UiCoordinator {
    pub const fn new(initial: RobotState, now: Tick) -> Self {
        Self {
            prev_state: initial,
            selected: Expression::Sleepy,
            blink: BlinkTimer {
                since: now,
                blinking: false,
            },
        }
    }

    /// Expression chosen by the last state change, before blinking.
    pub const fn selected(&self) -> Expression {
        self.selected
    }

    /// One UI frame: follow state edges, run the blink and hand the face to
    /// `face`. Drawing is left to the caller.
    pub fn update(
        &mut self,
        ctx: &RobotContext,
        now: Tick,
        face: &mut ExpressionRenderer,
    ) -> StatusText {
        let state = ctx.state();
        if state != self.prev_state {
            if let Some(expr) = expression_for(state) {
                self.selected = expr;
            }
            self.prev_state = state;
        }

        let shown = if self.blink.update(self.selected, now) {
            Expression::Blink
        } else {
            self.selected
        };
        face.set_expression(shown);

        StatusText::compose(ctx)
    }
}

/// Decide keeps whatever face was up.
pub const fn expression_for(state: RobotState) -> Option<Expression> {
    match state {
        RobotState::Idle => Some(Expression::Sleepy),
        RobotState::Scan => Some(Expression::LookLeft),
        RobotState::Move => Some(Expression::Happy),
        RobotState::Alert => Some(Expression::Angry),
        RobotState::Reverse => Some(Expression::Sad),
        RobotState::Decide => None,
    }
}
