//! Screen flow, score and money
//!
//! Everything here is independent of the window so the rules can be driven
//! from tests. `main` turns mouse clicks into [`Action`]s and calls
//! [`Session::update`] once per frame.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::balloon::Balloon;
use crate::config::Tuning;
use crate::shop::{PurchaseError, Shop, Upgrade, UpgradeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    Shop,
}

/// What a button does when pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Restart,
    OpenShop,
    BackToMenu,
    Buy(UpgradeKind),
    Quit,
}

pub struct Session {
    pub screen: Screen,
    pub balloon: Balloon,
    pub shop: Shop,
    /// Points earned in the current round
    pub score: u32,
    /// Currency carried between rounds
    pub money: u32,
    pub points_per_click: u32,
    arena: Vec2,
    rng: StdRng,
}

impl Session {
    pub fn new(tuning: &Tuning, arena: Vec2) -> Self {
        Self::with_rng(tuning, arena, StdRng::from_entropy())
    }

    #[cfg(test)]
    pub fn with_seed(tuning: &Tuning, arena: Vec2, seed: u64) -> Self {
        Self::with_rng(tuning, arena, StdRng::seed_from_u64(seed))
    }

    fn with_rng(tuning: &Tuning, arena: Vec2, mut rng: StdRng) -> Self {
        let mut balloon = Balloon::new(tuning);
        balloon.reset(arena, &mut rng);
        Session {
            screen: Screen::Menu,
            balloon,
            shop: Shop::new(),
            score: 0,
            money: 0,
            points_per_click: 1,
            arena,
            rng,
        }
    }

    /// Apply a button action. `Quit` is left to the caller, which owns the window.
    pub fn perform(&mut self, action: Action) {
        match action {
            Action::Start | Action::Restart => self.start_round(),
            Action::OpenShop => self.screen = Screen::Shop,
            Action::BackToMenu => self.screen = Screen::Menu,
            Action::Buy(kind) => {
                if let Err(e) = self.buy(kind) {
                    log::info!("Purchase of {:?} denied: {}", kind, e);
                }
            }
            Action::Quit => {}
        }
    }

    fn start_round(&mut self) {
        self.balloon.reset(self.arena, &mut self.rng);
        self.score = 0;
        self.screen = Screen::Playing;
        log::info!("Round started");
    }

    pub fn buy(&mut self, kind: UpgradeKind) -> Result<Upgrade, PurchaseError> {
        let bought = self.shop.purchase(kind, &mut self.money)?;
        let effect = kind.effect();
        match kind {
            UpgradeKind::Gravity => self.balloon.adjust_gravity(effect),
            UpgradeKind::Impulse => self.balloon.adjust_impulse(effect),
            UpgradeKind::Size => self.balloon.adjust_size(effect),
            UpgradeKind::Points => {
                self.points_per_click = self.points_per_click.saturating_add(effect as u32)
            }
        }
        log::info!(
            "Bought {:?} level {} (next cost {}, money left {}); gravity x{:.2}, impulse x{:.2}, size x{:.2}, {} pts/click",
            kind,
            bought.level,
            bought.cost,
            self.money,
            self.balloon.gravity_mult(),
            self.balloon.impulse_mult(),
            self.balloon.size_mult(),
            self.points_per_click
        );
        Ok(bought)
    }

    /// Mouse press on the play field. Returns the points scored, if any.
    pub fn click(&mut self, point: Vec2) -> Option<u32> {
        if self.screen != Screen::Playing || !self.balloon.contains(point) {
            return None;
        }
        self.balloon.bounce(&mut self.rng);
        self.score = self.score.saturating_add(self.points_per_click);
        Some(self.points_per_click)
    }

    pub fn update(&mut self, dt: f32) {
        match self.screen {
            Screen::Playing => {
                self.balloon.step(dt, self.arena);
                if self.balloon.has_fallen(self.arena.y) {
                    self.game_over();
                }
            }
            Screen::Menu => {
                self.balloon.step(dt, self.arena);
                if self.balloon.has_fallen(self.arena.y) {
                    self.balloon.reset(self.arena, &mut self.rng);
                }
            }
            Screen::GameOver | Screen::Shop => {}
        }
    }

    // Runs once per round, on the frame the balloon drops out of view
    fn game_over(&mut self) {
        self.money = self.money.saturating_add(self.score);
        self.screen = Screen::GameOver;
        log::info!("Game over! Final score: {}, money: {}", self.score, self.money);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FRAME_DT;

    const ARENA: Vec2 = Vec2::new(800.0, 600.0);

    fn session() -> Session {
        Session::with_seed(&Tuning::default(), ARENA, 12345)
    }

    fn play_until_game_over(session: &mut Session) {
        for _ in 0..10_000 {
            if session.screen == Screen::GameOver {
                return;
            }
            session.update(FRAME_DT);
        }
        panic!("balloon never fell");
    }

    #[test]
    fn test_starts_on_menu() {
        let session = session();
        assert_eq!(session.screen, Screen::Menu);
        assert_eq!(session.score, 0);
        assert_eq!(session.money, 0);
        assert_eq!(session.points_per_click, 1);
    }

    #[test]
    fn test_click_scores_only_while_playing() {
        let mut session = session();
        let centre = session.balloon.position;
        assert_eq!(session.click(centre), None);

        session.perform(Action::Start);
        assert_eq!(session.screen, Screen::Playing);
        let centre = session.balloon.position;
        assert_eq!(session.click(centre), Some(1));
        assert_eq!(session.score, 1);
        assert!(session.balloon.velocity.y < 0.0);
    }

    #[test]
    fn test_click_outside_balloon_misses() {
        let mut session = session();
        session.perform(Action::Start);
        assert_eq!(session.click(Vec2::new(5.0, 590.0)), None);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_game_over_transfers_score_once() {
        let mut session = session();
        session.perform(Action::Start);
        let centre = session.balloon.position;
        session.click(centre);
        session.click(session.balloon.position);
        assert_eq!(session.score, 2);

        play_until_game_over(&mut session);
        assert_eq!(session.money, 2);

        for _ in 0..100 {
            session.update(FRAME_DT);
        }
        assert_eq!(session.money, 2);
        assert_eq!(session.screen, Screen::GameOver);
    }

    #[test]
    fn test_counters_saturate() {
        let mut session = session();
        session.perform(Action::Start);
        session.points_per_click = u32::MAX - 1;
        session.click(session.balloon.position);
        session.click(session.balloon.position);
        assert_eq!(session.score, u32::MAX);

        session.money = 10;
        play_until_game_over(&mut session);
        assert_eq!(session.money, u32::MAX);
    }

    #[test]
    fn test_restart_clears_score_keeps_money() {
        let mut session = session();
        session.perform(Action::Start);
        session.click(session.balloon.position);
        play_until_game_over(&mut session);

        session.perform(Action::Restart);
        assert_eq!(session.screen, Screen::Playing);
        assert_eq!(session.score, 0);
        assert_eq!(session.money, 1);
    }

    #[test]
    fn test_menu_balloon_is_recycled() {
        let mut session = session();
        for _ in 0..2_000 {
            session.update(FRAME_DT);
            assert!(!session.balloon.has_fallen(ARENA.y));
        }
        assert_eq!(session.screen, Screen::Menu);
    }

    #[test]
    fn test_shop_navigation() {
        let mut session = session();
        session.perform(Action::OpenShop);
        assert_eq!(session.screen, Screen::Shop);
        let before = session.balloon.position;
        session.update(FRAME_DT);
        assert_eq!(session.balloon.position, before);
        session.perform(Action::BackToMenu);
        assert_eq!(session.screen, Screen::Menu);
    }

    #[test]
    fn test_buying_applies_effects() {
        let mut session = session();
        session.money = 1_000;

        session.buy(UpgradeKind::Gravity).unwrap();
        assert!((session.balloon.gravity_mult() - 0.9).abs() < 1e-6);

        session.buy(UpgradeKind::Impulse).unwrap();
        assert!((session.balloon.impulse_mult() - 1.15).abs() < 1e-6);

        session.buy(UpgradeKind::Size).unwrap();
        assert!((session.balloon.size_mult() - 1.1).abs() < 1e-6);

        session.buy(UpgradeKind::Points).unwrap();
        assert_eq!(session.points_per_click, 2);
        assert_eq!(session.money, 1_000 - 50 - 100 - 150 - 200);
    }

    #[test]
    fn test_points_upgrade_raises_click_value() {
        let mut session = session();
        session.money = 200;
        session.perform(Action::Buy(UpgradeKind::Points));
        session.perform(Action::Start);
        assert_eq!(session.click(session.balloon.position), Some(2));
    }

    #[test]
    fn test_denied_purchase_leaves_state() {
        let mut session = session();
        session.money = 10;
        let err = session.buy(UpgradeKind::Gravity).unwrap_err();
        assert_eq!(err, PurchaseError::InsufficientFunds { cost: 50, money: 10 });
        assert_eq!(session.balloon.gravity_mult(), 1.0);

        session.perform(Action::Buy(UpgradeKind::Gravity));
        assert_eq!(session.money, 10);
    }
}
