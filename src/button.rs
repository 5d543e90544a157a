use ggez::{
    graphics::{Canvas, Color, DrawMode, DrawParam, Drawable, Mesh, Rect, Text, TextFragment},
    Context, GameResult,
};
use glam::Vec2;

use crate::session::Action;

pub const BUTTON_FONT: f32 = 32.0;
pub const DISABLED: Color = Color {
    r: 150.0 / 255.0,
    g: 150.0 / 255.0,
    b: 150.0 / 255.0,
    a: 1.0,
};

pub struct Button {
    rect: Rect,
    label: String,
    color: Color,
    hover_color: Color,
    action: Action,
    disabled: bool,
}

impl Button {
    pub fn new(rect: Rect, label: impl Into<String>, color: Color, hover_color: Color, action: Action) -> Self {
        Button {
            rect,
            label: label.into(),
            color,
            hover_color,
            action,
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The action to run if `point` lands on an enabled button
    pub fn hit(&self, point: Vec2) -> Option<Action> {
        if !self.disabled && self.rect.contains(point) {
            Some(self.action)
        } else {
            None
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, ctx: &Context, mouse: Vec2) -> GameResult {
        let fill = if self.disabled {
            DISABLED
        } else if self.rect.contains(mouse) {
            self.hover_color
        } else {
            self.color
        };
        let mesh = Mesh::new_rectangle(ctx, DrawMode::fill(), self.rect, fill)?;
        canvas.draw(&mesh, DrawParam::default());

        let center = self.rect.center();
        draw_text_centered(
            canvas,
            ctx,
            &self.label,
            BUTTON_FONT,
            Color::WHITE,
            Vec2::new(center.x, center.y),
        );
        Ok(())
    }
}

/// Draw `text` with its bounding box centred on `center`.
pub fn draw_text_centered(
    canvas: &mut Canvas,
    ctx: &Context,
    text: &str,
    size: f32,
    color: Color,
    center: Vec2,
) {
    let text = Text::new(TextFragment::new(text).color(color).scale(size));
    let pos = match text.dimensions(ctx) {
        Some(dims) => center - Vec2::new(dims.w / 2.0, dims.h / 2.0),
        None => center,
    };
    canvas.draw(&text, DrawParam::default().dest(pos));
}
