use ggez::graphics::Rect;
use glam::Vec2;
use rand::Rng;

use crate::config::{Blink, Physics, Tuning, MAX_BALLOON_SIZE};

/// Gravity upgrades stop here so the balloon always falls eventually
pub const MIN_GRAVITY_MULT: f32 = 0.1;

/// Cosmetic eye animation. Never feeds back into the physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Open,
    Clicked,
    Intermediate,
    Closed,
}

// κίνησις πάντων
pub struct Balloon {
    /// Centre of the hitbox
    pub position: Vec2,
    pub velocity: Vec2,
    state: VisualState,
    /// Where `Intermediate` was entered from; decides whether it closes or opens
    came_from: VisualState,
    clock: f32,
    last_click: f32,
    last_state_change: f32,
    gravity_mult: f32,
    impulse_mult: f32,
    size_mult: f32,
    physics: Physics,
    blink: Blink,
}

impl Balloon {
    pub fn new(tuning: &Tuning) -> Self {
        Balloon {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            state: VisualState::Open,
            came_from: VisualState::Open,
            clock: 0.0,
            last_click: 0.0,
            last_state_change: 0.0,
            gravity_mult: 1.0,
            impulse_mult: 1.0,
            size_mult: 1.0,
            physics: tuning.physics,
            blink: tuning.blink,
        }
    }

    /// Put the balloon back at its launch spot with a small upward toss.
    pub fn reset(&mut self, arena: Vec2, rng: &mut impl Rng) {
        let size = self.size();
        self.position = Vec2::new(arena.x / 2.0, arena.y / 4.0 + size / 2.0);
        self.velocity = Vec2::new(0.0, rng.gen_range(-5.0..-2.0));
        self.last_click = self.clock;
        self.state = VisualState::Open;
        self.came_from = VisualState::Open;
        self.last_state_change = self.clock;
    }

    /// Advance one frame of motion and animation.
    pub fn step(&mut self, dt: f32, arena: Vec2) {
        self.clock += dt;

        self.velocity.y += self.physics.gravity * self.gravity_mult;
        let terminal = self.terminal_velocity();
        if self.velocity.y > terminal {
            self.velocity.y = terminal;
        }
        self.velocity.x *= self.physics.friction;

        self.position += self.velocity;
        self.keep_inside(arena);

        self.advance_visual();
    }

    // Walls bounce, the ceiling stops, the floor is open
    fn keep_inside(&mut self, arena: Vec2) {
        let half = self.size() / 2.0;
        let restitution = self.physics.wall_restitution;

        if self.position.x - half < 0.0 {
            self.position.x = half;
            self.velocity.x = self.velocity.x.abs() * restitution;
        } else if self.position.x + half > arena.x {
            self.position.x = arena.x - half;
            self.velocity.x = -self.velocity.x.abs() * restitution;
        }

        if self.position.y - half < 0.0 {
            self.position.y = half;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
        }
    }

    fn advance_visual(&mut self) {
        let in_state = self.clock - self.last_state_change;
        match self.state {
            VisualState::Clicked => {
                if self.clock - self.last_click >= self.blink.clicked {
                    self.set_state(VisualState::Open);
                }
            }
            VisualState::Open => {
                if in_state >= self.blink.open {
                    self.set_state(VisualState::Intermediate);
                }
            }
            VisualState::Intermediate => {
                if in_state >= self.blink.intermediate {
                    match self.came_from {
                        VisualState::Open => self.set_state(VisualState::Closed),
                        _ => self.set_state(VisualState::Open),
                    }
                }
            }
            VisualState::Closed => {
                if in_state >= self.blink.closed {
                    self.set_state(VisualState::Intermediate);
                }
            }
        }
    }

    fn set_state(&mut self, next: VisualState) {
        if self.state != next {
            self.came_from = self.state;
            self.state = next;
            self.last_state_change = self.clock;
        }
    }

    /// Click response: kick upward, deflect sideways, show the clicked face.
    pub fn bounce(&mut self, rng: &mut impl Rng) {
        self.velocity.y = self.physics.impulse * self.impulse_mult;
        let max = self.physics.max_deflection;
        if max > 0.0 {
            self.velocity.x += rng.gen_range(-max..=max);
        }
        self.last_click = self.clock;
        self.set_state(VisualState::Clicked);
    }

    pub fn adjust_gravity(&mut self, delta: f32) {
        self.gravity_mult = (self.gravity_mult + delta).max(MIN_GRAVITY_MULT);
    }

    pub fn adjust_impulse(&mut self, delta: f32) {
        self.impulse_mult += delta;
    }

    /// Resizes around the current centre, never past `MAX_BALLOON_SIZE`.
    pub fn adjust_size(&mut self, delta: f32) {
        let max_mult = MAX_BALLOON_SIZE / self.physics.base_size;
        self.size_mult = (self.size_mult + delta).min(max_mult);
    }

    pub fn size(&self) -> f32 {
        self.physics.base_size * self.size_mult
    }

    pub fn terminal_velocity(&self) -> f32 {
        self.physics.terminal_velocity * self.gravity_mult
    }

    pub fn hitbox(&self) -> Rect {
        let size = self.size();
        Rect::new(
            self.position.x - size / 2.0,
            self.position.y - size / 2.0,
            size,
            size,
        )
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.hitbox().contains(point)
    }

    /// True once the top edge has dropped below the bottom of the arena.
    pub fn has_fallen(&self, arena_height: f32) -> bool {
        self.hitbox().top() > arena_height
    }

    pub fn visual_state(&self) -> VisualState {
        self.state
    }

    pub fn gravity_mult(&self) -> f32 {
        self.gravity_mult
    }

    pub fn impulse_mult(&self) -> f32 {
        self.impulse_mult
    }

    pub fn size_mult(&self) -> f32 {
        self.size_mult
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FRAME_DT;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ARENA: Vec2 = Vec2::new(800.0, 600.0);

    fn fresh() -> (Balloon, StdRng) {
        let mut rng = StdRng::seed_from_u64(7);
        let mut balloon = Balloon::new(&Tuning::default());
        balloon.reset(ARENA, &mut rng);
        (balloon, rng)
    }

    fn run_for(balloon: &mut Balloon, seconds: f32) {
        let frames = (seconds / FRAME_DT).ceil() as usize;
        for _ in 0..frames {
            balloon.step(FRAME_DT, ARENA);
        }
    }

    #[test]
    fn test_reset_places_balloon() {
        let (balloon, _) = fresh();
        assert_eq!(balloon.position.x, 400.0);
        assert_eq!(balloon.hitbox().top(), 150.0);
        assert_eq!(balloon.velocity.x, 0.0);
        assert!(balloon.velocity.y >= -5.0 && balloon.velocity.y < -2.0);
        assert_eq!(balloon.visual_state(), VisualState::Open);
    }

    #[test]
    fn test_gravity_accumulates_until_terminal() {
        let (mut balloon, _) = fresh();
        balloon.velocity = Vec2::ZERO;
        balloon.step(FRAME_DT, ARENA);
        assert!((balloon.velocity.y - 0.1).abs() < 1e-6);

        run_for(&mut balloon, 3.0);
        assert_eq!(balloon.velocity.y, 5.0);
    }

    #[test]
    fn test_terminal_velocity_scales_with_gravity_mult() {
        let (mut balloon, _) = fresh();
        balloon.adjust_gravity(-0.5);
        run_for(&mut balloon, 4.0);
        assert!((balloon.velocity.y - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_gravity_mult_has_floor() {
        let (mut balloon, _) = fresh();
        for _ in 0..20 {
            balloon.adjust_gravity(-0.1);
        }
        assert_eq!(balloon.gravity_mult(), MIN_GRAVITY_MULT);
    }

    #[test]
    fn test_friction_decays_horizontal_speed() {
        let (mut balloon, _) = fresh();
        balloon.velocity.x = 2.0;
        balloon.step(FRAME_DT, ARENA);
        assert!((balloon.velocity.x - 2.0 * 0.995).abs() < 1e-6);
    }

    #[test]
    fn test_wall_bounce_reflects() {
        let (mut balloon, _) = fresh();
        balloon.position.x = ARENA.x - 51.0;
        balloon.velocity.x = 4.0;
        balloon.step(FRAME_DT, ARENA);
        assert!(balloon.velocity.x < 0.0);
        assert_eq!(balloon.hitbox().right(), ARENA.x);

        balloon.position.x = 52.0;
        balloon.velocity.x = -6.0;
        balloon.step(FRAME_DT, ARENA);
        assert!(balloon.velocity.x > 0.0);
        assert_eq!(balloon.hitbox().left(), 0.0);
    }

    #[test]
    fn test_ceiling_stops_upward_motion() {
        let (mut balloon, mut rng) = fresh();
        balloon.bounce(&mut rng);
        let mut touched = false;
        for _ in 0..30 {
            balloon.step(FRAME_DT, ARENA);
            let top = balloon.hitbox().top();
            assert!(top >= 0.0);
            if top == 0.0 {
                touched = true;
                assert_eq!(balloon.velocity.y, 0.0);
            }
        }
        assert!(touched);
    }

    #[test]
    fn test_bounce_sets_impulse_and_clicked() {
        let (mut balloon, mut rng) = fresh();
        balloon.adjust_impulse(0.15);
        balloon.bounce(&mut rng);
        assert!((balloon.velocity.y - (-15.0 * 1.15)).abs() < 1e-4);
        assert!(balloon.velocity.x.abs() <= 3.0);
        assert_eq!(balloon.visual_state(), VisualState::Clicked);
    }

    #[test]
    fn test_clicked_returns_to_open() {
        let (mut balloon, mut rng) = fresh();
        balloon.bounce(&mut rng);
        run_for(&mut balloon, 0.4);
        assert_eq!(balloon.visual_state(), VisualState::Clicked);
        run_for(&mut balloon, 0.2);
        assert_eq!(balloon.visual_state(), VisualState::Open);
    }

    #[test]
    fn test_blink_cycle() {
        let (mut balloon, _) = fresh();
        let mut seen = vec![balloon.visual_state()];
        for _ in 0..600 {
            balloon.step(FRAME_DT, ARENA);
            if seen.last() != Some(&balloon.visual_state()) {
                seen.push(balloon.visual_state());
            }
        }
        assert_eq!(
            &seen[..5],
            &[
                VisualState::Open,
                VisualState::Intermediate,
                VisualState::Closed,
                VisualState::Intermediate,
                VisualState::Open,
            ]
        );
    }

    #[test]
    fn test_click_overrides_closed_eyes() {
        let (mut balloon, mut rng) = fresh();
        while balloon.visual_state() != VisualState::Closed {
            balloon.step(FRAME_DT, ARENA);
        }
        balloon.bounce(&mut rng);
        assert_eq!(balloon.visual_state(), VisualState::Clicked);
    }

    #[test]
    fn test_size_upgrade_keeps_centre() {
        let (mut balloon, _) = fresh();
        let centre = balloon.position;
        balloon.adjust_size(0.1);
        let hitbox = balloon.hitbox();
        assert!((hitbox.w - 110.0).abs() < 1e-4);
        let centre_after = hitbox.center();
        assert!((centre_after.x - centre.x).abs() < 1e-4);
        assert!((centre_after.y - centre.y).abs() < 1e-4);
    }

    #[test]
    fn test_size_upgrades_stop_at_max() {
        let (mut balloon, _) = fresh();
        for _ in 0..100 {
            balloon.adjust_size(0.1);
        }
        assert_eq!(balloon.size(), MAX_BALLOON_SIZE);

        balloon.position.x = 10.0;
        balloon.velocity.x = -3.0;
        balloon.step(FRAME_DT, ARENA);
        assert_eq!(balloon.hitbox().left(), 0.0);
        assert!(balloon.hitbox().right() <= ARENA.x);
    }

    #[test]
    fn test_falls_out_of_arena() {
        let (mut balloon, _) = fresh();
        assert!(!balloon.has_fallen(ARENA.y));
        run_for(&mut balloon, 10.0);
        assert!(balloon.has_fallen(ARENA.y));
        assert!(!balloon.contains(Vec2::new(400.0, 300.0)));
    }

    proptest! {
        #[test]
        fn test_step_invariants(
            clicks in proptest::collection::vec(any::<bool>(), 1..300),
            gravity_delta in -0.9f32..1.0,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut balloon = Balloon::new(&Tuning::default());
            balloon.adjust_gravity(gravity_delta);
            balloon.reset(ARENA, &mut rng);
            for click in clicks {
                if click {
                    balloon.bounce(&mut rng);
                }
                balloon.step(FRAME_DT, ARENA);
                let hitbox = balloon.hitbox();
                prop_assert!(balloon.velocity.y <= balloon.terminal_velocity() + 1e-4);
                prop_assert!(hitbox.left() >= 0.0);
                prop_assert!(hitbox.right() <= ARENA.x);
            }
        }
    }
}
