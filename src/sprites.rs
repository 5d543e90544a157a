//! Balloon faces
//!
//! One image per [`VisualState`], looked up in the ggez resource path. A
//! state whose image fails to load is drawn from primitives instead, so the
//! game runs without any assets at all.

use ggez::{
    graphics::{Canvas, Color, DrawMode, DrawParam, Image, Mesh, Rect},
    Context, GameResult,
};
use glam::Vec2;

use crate::balloon::VisualState;

const BODY: Color = Color {
    r: 1.0,
    g: 100.0 / 255.0,
    b: 100.0 / 255.0,
    a: 1.0,
};

fn image_path(state: VisualState) -> &'static str {
    match state {
        VisualState::Open => "/balloon_open.png",
        VisualState::Clicked => "/balloon_clicked.png",
        VisualState::Intermediate => "/balloon_intermediate.png",
        VisualState::Closed => "/balloon_closed.png",
    }
}

pub struct BalloonSprites {
    open: Option<Image>,
    clicked: Option<Image>,
    intermediate: Option<Image>,
    closed: Option<Image>,
}

impl BalloonSprites {
    pub fn load(ctx: &Context) -> Self {
        let load = |state| match Image::from_path(ctx, image_path(state)) {
            Ok(image) => Some(image),
            Err(e) => {
                log::warn!("Sprite {} unavailable ({}), drawing fallback", image_path(state), e);
                None
            }
        };
        BalloonSprites {
            open: load(VisualState::Open),
            clicked: load(VisualState::Clicked),
            intermediate: load(VisualState::Intermediate),
            closed: load(VisualState::Closed),
        }
    }

    /// `None` means the state is drawn from meshes.
    fn image(&self, state: VisualState) -> Option<&Image> {
        image_for(&self.open, &self.clicked, &self.intermediate, &self.closed, state)
    }

    /// Draw the face for `state` filling `hitbox`.
    pub fn draw(&self, canvas: &mut Canvas, ctx: &Context, state: VisualState, hitbox: Rect) -> GameResult {
        match self.image(state) {
            Some(image) => {
                let scale = Vec2::new(
                    hitbox.w / image.width() as f32,
                    hitbox.h / image.height() as f32,
                );
                canvas.draw(
                    image,
                    DrawParam::default()
                        .dest(Vec2::new(hitbox.x, hitbox.y))
                        .scale(scale),
                );
                Ok(())
            }
            None => draw_fallback(canvas, ctx, state, hitbox),
        }
    }
}

fn image_for<'a, T>(
    open: &'a Option<T>,
    clicked: &'a Option<T>,
    intermediate: &'a Option<T>,
    closed: &'a Option<T>,
    state: VisualState,
) -> Option<&'a T> {
    match state {
        VisualState::Open => open.as_ref(),
        VisualState::Clicked => clicked.as_ref(),
        VisualState::Intermediate => intermediate.as_ref(),
        VisualState::Closed => closed.as_ref(),
    }
}

// ἁπλότης
fn draw_fallback(canvas: &mut Canvas, ctx: &Context, state: VisualState, hitbox: Rect) -> GameResult {
    let center = Vec2::new(hitbox.x + hitbox.w / 2.0, hitbox.y + hitbox.h / 2.0);
    let radius = hitbox.w / 2.0;

    let body = Mesh::new_circle(ctx, DrawMode::fill(), center, radius, 0.5, BODY)?;
    canvas.draw(&body, DrawParam::default());

    let eye_offset = Vec2::new(radius * 0.35, -radius * 0.2);
    let eye_radius = radius * 0.14;
    for eye in [center - Vec2::new(eye_offset.x, -eye_offset.y), center + eye_offset] {
        match state {
            VisualState::Open | VisualState::Clicked => {
                let white = if state == VisualState::Clicked {
                    eye_radius * 1.3
                } else {
                    eye_radius
                };
                let sclera = Mesh::new_circle(ctx, DrawMode::fill(), eye, white, 0.1, Color::WHITE)?;
                let pupil = Mesh::new_circle(ctx, DrawMode::fill(), eye, white * 0.45, 0.1, Color::BLACK)?;
                canvas.draw(&sclera, DrawParam::default());
                canvas.draw(&pupil, DrawParam::default());
            }
            VisualState::Intermediate => {
                let lid = Mesh::new_ellipse(
                    ctx,
                    DrawMode::fill(),
                    eye,
                    eye_radius,
                    eye_radius * 0.4,
                    0.1,
                    Color::WHITE,
                )?;
                canvas.draw(&lid, DrawParam::default());
            }
            VisualState::Closed => {
                let line = Mesh::new_line(
                    ctx,
                    &[eye - Vec2::new(eye_radius, 0.0), eye + Vec2::new(eye_radius, 0.0)],
                    (radius * 0.05).max(1.0),
                    Color::BLACK,
                )?;
                canvas.draw(&line, DrawParam::default());
            }
        }
    }

    // Surprised mouth on click
    if state == VisualState::Clicked {
        let mouth = Mesh::new_circle(
            ctx,
            DrawMode::stroke((radius * 0.04).max(1.0)),
            center + Vec2::new(0.0, radius * 0.35),
            radius * 0.12,
            0.1,
            Color::BLACK,
        )?;
        canvas.draw(&mouth, DrawParam::default());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_state_uses_fallback_not_open_face() {
        let (open, clicked, intermediate, closed) = (Some("open"), None, Some("half"), None);
        let pick = |state| image_for(&open, &clicked, &intermediate, &closed, state).copied();
        assert_eq!(pick(VisualState::Open), Some("open"));
        assert_eq!(pick(VisualState::Intermediate), Some("half"));
        assert_eq!(pick(VisualState::Clicked), None);
        assert_eq!(pick(VisualState::Closed), None);
    }
}
