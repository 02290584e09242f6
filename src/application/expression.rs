//! Robot face on the 160x80 display
//!
//! Two eyes, each redrawn inside its own box. A redraw clears only those two
//! boxes, never the whole screen, and only happens when the expression
//! actually changed.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle, RoundedRectangle};

const BACKGROUND: Rgb565 = Rgb565::BLACK;
const EYE: Rgb565 = Rgb565::GREEN;

/// Eye centers
const LEFT_X: i32 = 40;
const RIGHT_X: i32 = 120;
const CENTER_Y: i32 = 40;

/// Box cleared around each eye before it is redrawn
const BOX_W: u32 = 50;
const BOX_H: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Expression {
    Neutral,
    Blink,
    Happy,
    Angry,
    Sleepy,
    Sad,
    LookLeft,
    LookRight,
}

/// Which eye a shape belongs to; slanted shapes are mirrored.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    const fn center_x(self) -> i32 {
        match self {
            Side::Left => LEFT_X,
            Side::Right => RIGHT_X,
        }
    }
}

/// Area cleared before the eye at `cx` is redrawn.
pub fn eye_box(cx: i32) -> Rectangle {
    Rectangle::new(
        Point::new(cx - BOX_W as i32 / 2, CENTER_Y - BOX_H as i32 / 2),
        Size::new(BOX_W, BOX_H),
    )
}

pub struct ExpressionRenderer {
    current: Expression,
    dirty: bool,
}

impl ExpressionRenderer {
    /// Starts dirty so the first update paints the face.
    pub const fn new() -> Self {
        Self {
            current: Expression::Neutral,
            dirty: true,
        }
    }

    pub const fn current(&self) -> Expression {
        self.current
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Selects `expr` for the next update. Never draws.
    pub fn set_expression(&mut self, expr: Expression) {
        if expr != self.current {
            self.current = expr;
            self.dirty = true;
        }
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Redraws if something changed. Returns whether a redraw happened.
    ///
    /// On error the face stays dirty and is tried again on the next call.
    pub fn update<D>(&mut self, target: &mut D) -> Result<bool, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if !self.dirty {
            return Ok(false);
        }
        draw(target, self.current)?;
        self.dirty = false;
        Ok(true)
    }
}

impl Default for ExpressionRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn draw<D>(target: &mut D, expr: Expression) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for side in [Side::Left, Side::Right] {
        target.fill_solid(&eye_box(side.center_x()), BACKGROUND)?;
        draw_eye(target, expr, side)?;
    }
    Ok(())
}

fn draw_eye<D>(target: &mut D, expr: Expression, side: Side) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let cx = side.center_x();
    let fill = PrimitiveStyle::with_fill(EYE);

    match expr {
        Expression::Neutral => open_eye(target, cx),
        Expression::Blink | Expression::Sleepy => Rectangle::new(
            Point::new(cx - 15, CENTER_Y - 3),
            Size::new(30, 6),
        )
        .into_styled(fill)
        .draw(target),
        Expression::Happy => RoundedRectangle::with_equal_corners(
            Rectangle::new(Point::new(cx - 15, CENTER_Y - 5), Size::new(30, 25)),
            Size::new(12, 12),
        )
        .into_styled(fill)
        .draw(target),
        Expression::Angry => {
            // Brows slope down toward the nose
            let (y0, y1) = match side {
                Side::Left => (CENTER_Y - 5, CENTER_Y - 20),
                Side::Right => (CENTER_Y - 20, CENTER_Y - 5),
            };
            Line::new(Point::new(cx - 15, y0), Point::new(cx + 15, y1))
                .into_styled(PrimitiveStyle::with_stroke(EYE, 4))
                .draw(target)
        }
        Expression::Sad => {
            let (y0, y1) = match side {
                Side::Left => (CENTER_Y - 10, CENTER_Y - 2),
                Side::Right => (CENTER_Y - 2, CENTER_Y - 10),
            };
            Line::new(Point::new(cx - 12, y0), Point::new(cx + 12, y1))
                .into_styled(PrimitiveStyle::with_stroke(EYE, 3))
                .draw(target)?;
            Rectangle::new(Point::new(cx - 10, CENTER_Y), Size::new(20, 4))
                .into_styled(fill)
                .draw(target)
        }
        Expression::LookLeft => {
            open_eye(target, cx)?;
            pupil(target, cx - 12)
        }
        Expression::LookRight => {
            open_eye(target, cx)?;
            pupil(target, cx + 4)
        }
    }
}

fn open_eye<D>(target: &mut D, cx: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    RoundedRectangle::with_equal_corners(
        Rectangle::new(Point::new(cx - 15, CENTER_Y - 25), Size::new(30, 50)),
        Size::new(10, 10),
    )
    .into_styled(PrimitiveStyle::with_fill(EYE))
    .draw(target)
}

fn pupil<D>(target: &mut D, x: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    target.fill_solid(
        &Rectangle::new(Point::new(x, CENTER_Y - 10), Size::new(8, 20)),
        BACKGROUND,
    )
}
