use ggez::{
    event,
    graphics::{Canvas, Color, DrawParam, Drawable, Rect, Text, TextFragment},
    input::keyboard::{KeyCode, KeyInput},
    input::mouse::MouseButton,
    Context, GameResult,
};
use glam::Vec2;
use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic;
use std::path::PathBuf;
use std::time::SystemTime;

mod balloon;
mod button;
mod config;
mod session;
mod shop;
mod sprites;

use button::{draw_text_centered, Button};
use config::{Tuning, FRAME_DT, SCREEN_HEIGHT, SCREEN_WIDTH, TARGET_FPS, WINDOW_TITLE};
use session::{Action, Screen, Session};
use sprites::BalloonSprites;

const fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color { r, g, b, a: 1.0 }
}

const SKY: Color = rgb(173.0 / 255.0, 216.0 / 255.0, 230.0 / 255.0);
const RED: Color = rgb(1.0, 0.0, 0.0);
const DARK_RED: Color = rgb(200.0 / 255.0, 0.0, 0.0);
const DARK_GREEN: Color = rgb(0.0, 150.0 / 255.0, 0.0);
const LIGHT_GREEN: Color = rgb(0.0, 200.0 / 255.0, 0.0);
const GREY: Color = rgb(150.0 / 255.0, 150.0 / 255.0, 150.0 / 255.0);
const DARK_GREY: Color = rgb(100.0 / 255.0, 100.0 / 255.0, 100.0 / 255.0);
const GOLD: Color = rgb(1.0, 215.0 / 255.0, 0.0);

const TITLE_FONT: f32 = 64.0;
const SCORE_FONT: f32 = 56.0;
const MESSAGE_FONT: f32 = 28.0;

/// Gap between a buy button and its level label's centre
const LEVEL_LABEL_OFFSET: f32 = 50.0;

const CRASH_LOG: &str = "keep_up_crash.log";

fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// τὰ πάντα ῥεῖ
struct MainState {
    session: Session,
    sprites: BalloonSprites,
    quit_button: Button,
    start_button: Button,
    shop_button: Button,
    back_button: Button,
    restart_button: Button,
    displayed_score: u32,
    score_popup: Option<(String, Vec2, f32)>, // text, position, lifetime
}

impl MainState {
    fn new(ctx: &mut Context, tuning: &Tuning) -> GameResult<MainState> {
        // Set up panic handler for crash reporting
        panic::set_hook(Box::new(|panic_info| {
            let crash_msg = format!(
                "\n[Crash Report {}]\nPanic occurred: {}\n",
                unix_time(),
                panic_info
            );
            log::error!("{}", crash_msg);

            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(CRASH_LOG)
            {
                let _ = writeln!(file, "{}", crash_msg);
            }
        }));

        let (w, h) = (SCREEN_WIDTH, SCREEN_HEIGHT);
        Ok(MainState {
            session: Session::new(tuning, Vec2::new(w, h)),
            sprites: BalloonSprites::load(ctx),
            quit_button: Button::new(Rect::new(w - 150.0, 10.0, 140.0, 50.0), "QUIT", RED, DARK_RED, Action::Quit),
            start_button: Button::new(
                Rect::new(w / 2.0 - 100.0, h / 2.0, 200.0, 70.0),
                "START",
                DARK_GREEN,
                LIGHT_GREEN,
                Action::Start,
            ),
            shop_button: Button::new(
                Rect::new(w / 2.0 - 100.0, h / 2.0 + 100.0, 200.0, 70.0),
                "SHOP",
                GREY,
                DARK_GREY,
                Action::OpenShop,
            ),
            back_button: Button::new(
                Rect::new(w / 2.0 - 100.0, h - 80.0, 200.0, 60.0),
                "BACK",
                RED,
                DARK_RED,
                Action::BackToMenu,
            ),
            restart_button: Button::new(
                Rect::new(w / 2.0 - 120.0, h * 3.0 / 4.0 - 50.0, 240.0, 60.0),
                "PLAY AGAIN",
                DARK_GREEN,
                LIGHT_GREEN,
                Action::Restart,
            ),
            displayed_score: 0,
            score_popup: None,
        })
    }

    /// One buy button per upgrade, rebuilt from current prices and money.
    fn shop_buttons(&self) -> Vec<Button> {
        let shop = &self.session.shop;
        shop.upgrades()
            .iter()
            .enumerate()
            .map(|(i, upgrade)| {
                Button::new(
                    Rect::new(SCREEN_WIDTH / 2.0 - 250.0, 190.0 + i as f32 * 75.0, 500.0, 60.0),
                    upgrade.kind.label(upgrade.cost),
                    DARK_GREEN,
                    LIGHT_GREEN,
                    Action::Buy(upgrade.kind),
                )
                .disabled(!shop.can_afford(upgrade.kind, self.session.money))
            })
            .collect()
    }

    /// Buttons that react on the current screen, quit first.
    fn clicked_action(&self, point: Vec2) -> Option<Action> {
        if let Some(action) = self.quit_button.hit(point) {
            return Some(action);
        }
        match self.session.screen {
            Screen::Menu => self
                .start_button
                .hit(point)
                .or_else(|| self.shop_button.hit(point)),
            Screen::Shop => self
                .shop_buttons()
                .iter()
                .find_map(|button| button.hit(point))
                .or_else(|| self.back_button.hit(point)),
            Screen::GameOver => self.restart_button.hit(point),
            Screen::Playing => None,
        }
    }

    fn perform(&mut self, ctx: &mut Context, action: Action) {
        match action {
            Action::Quit => ctx.request_quit(),
            Action::Start | Action::Restart => {
                self.displayed_score = 0;
                self.score_popup = None;
                self.session.perform(action);
            }
            _ => self.session.perform(action),
        }
    }

    fn tick_hud(&mut self, dt: f32) {
        let score = self.session.score;
        // Update score animation
        if self.displayed_score < score {
            self.displayed_score += ((score - self.displayed_score) as f32 * 10.0 * dt) as u32 + 1;
        }
        self.displayed_score = self.displayed_score.min(score);

        // Update score popup
        if let Some((_, _, ref mut lifetime)) = self.score_popup {
            *lifetime -= dt;
            if *lifetime <= 0.0 {
                self.score_popup = None;
            }
        }
    }

    fn draw_balloon(&self, canvas: &mut Canvas, ctx: &Context) -> GameResult {
        let balloon = &self.session.balloon;
        self.sprites
            .draw(canvas, ctx, balloon.visual_state(), balloon.hitbox())
    }

    fn draw_menu(&self, canvas: &mut Canvas, ctx: &Context, mouse: Vec2) -> GameResult {
        let center_x = SCREEN_WIDTH / 2.0;
        self.draw_balloon(canvas, ctx)?;
        draw_text_centered(canvas, ctx, WINDOW_TITLE, TITLE_FONT * 0.75, Color::BLACK, Vec2::new(center_x, SCREEN_HEIGHT / 4.0));
        draw_text_centered(
            canvas,
            ctx,
            "Spend your money on upgrades in the shop!",
            MESSAGE_FONT,
            Color::BLACK,
            Vec2::new(center_x, SCREEN_HEIGHT / 4.0 + 70.0),
        );
        self.start_button.draw(canvas, ctx, mouse)?;
        self.shop_button.draw(canvas, ctx, mouse)?;
        Ok(())
    }

    fn draw_playing(&self, canvas: &mut Canvas, ctx: &Context) -> GameResult {
        self.draw_balloon(canvas, ctx)?;
        draw_text_centered(
            canvas,
            ctx,
            &self.displayed_score.to_string(),
            SCORE_FONT,
            Color::BLACK,
            Vec2::new(SCREEN_WIDTH / 2.0, 40.0),
        );
        draw_text_centered(
            canvas,
            ctx,
            &format!("Money: {}", self.session.money),
            MESSAGE_FONT,
            GOLD,
            Vec2::new(110.0, 40.0),
        );

        // Draw score popup with shadow for contrast
        if let Some((text, position, lifetime)) = &self.score_popup {
            let popup_text = Text::new(
                TextFragment::new(text.as_str())
                    .color(Color::new(1.0, 1.0, 1.0, *lifetime))
                    .scale(MESSAGE_FONT),
            );
            let shadow_text = Text::new(
                TextFragment::new(text.as_str())
                    .color(Color::new(0.0, 0.0, 0.0, *lifetime))
                    .scale(MESSAGE_FONT),
            );
            let pos = match popup_text.dimensions(ctx) {
                Some(dims) => *position - Vec2::new(dims.w / 2.0, dims.h / 2.0),
                None => *position,
            };
            canvas.draw(&shadow_text, DrawParam::default().dest(pos + Vec2::new(2.0, 2.0)));
            canvas.draw(&popup_text, DrawParam::default().dest(pos));
        }
        Ok(())
    }

    fn draw_game_over(&self, canvas: &mut Canvas, ctx: &Context, mouse: Vec2) -> GameResult {
        let center_x = SCREEN_WIDTH / 2.0;
        let center_y = SCREEN_HEIGHT / 2.0;
        draw_text_centered(canvas, ctx, "GAME OVER", TITLE_FONT, RED, Vec2::new(center_x, SCREEN_HEIGHT / 4.0));
        draw_text_centered(
            canvas,
            ctx,
            &format!("Round Score: {}", self.session.score),
            SCORE_FONT * 0.75,
            Color::WHITE,
            Vec2::new(center_x, center_y - 40.0),
        );
        draw_text_centered(
            canvas,
            ctx,
            &format!("Total Money: {}", self.session.money),
            SCORE_FONT * 0.75,
            GOLD,
            Vec2::new(center_x, center_y + 40.0),
        );
        self.restart_button.draw(canvas, ctx, mouse)
    }

    fn draw_shop(&self, canvas: &mut Canvas, ctx: &Context, mouse: Vec2) -> GameResult {
        let center_x = SCREEN_WIDTH / 2.0;
        draw_text_centered(canvas, ctx, "UPGRADE SHOP", TITLE_FONT, Color::BLACK, Vec2::new(center_x, 60.0));
        draw_text_centered(
            canvas,
            ctx,
            &format!("Your Money: {}", self.session.money),
            SCORE_FONT * 0.75,
            GOLD,
            Vec2::new(center_x, 130.0),
        );

        for (button, upgrade) in self.shop_buttons().iter().zip(self.session.shop.upgrades()) {
            button.draw(canvas, ctx, mouse)?;
            let rect = button.rect();
            draw_text_centered(
                canvas,
                ctx,
                &format!("Level: {}", upgrade.level),
                MESSAGE_FONT * 0.8,
                Color::BLACK,
                Vec2::new(rect.right() + LEVEL_LABEL_OFFSET, rect.y + rect.h / 2.0),
            );
        }

        self.back_button.draw(canvas, ctx, mouse)
    }
}

// Spielschleife und Updates
// πάντα χωρεῖ καὶ οὐδὲν μένει
impl event::EventHandler<ggez::GameError> for MainState {
    fn update(&mut self, ctx: &mut Context) -> GameResult {
        while ctx.time.check_update_time(TARGET_FPS) {
            self.session.update(FRAME_DT);
            self.tick_hud(FRAME_DT);
        }
        Ok(())
    }

    // τὸ καλὸν
    fn draw(&mut self, ctx: &mut Context) -> GameResult {
        let background = match self.session.screen {
            Screen::GameOver => Color::BLACK,
            _ => SKY,
        };
        let mut canvas = Canvas::from_frame(ctx, background);
        let mouse = {
            let p = ctx.mouse.position();
            Vec2::new(p.x, p.y)
        };

        match self.session.screen {
            Screen::Menu => self.draw_menu(&mut canvas, ctx, mouse)?,
            Screen::Playing => self.draw_playing(&mut canvas, ctx)?,
            Screen::GameOver => self.draw_game_over(&mut canvas, ctx, mouse)?,
            Screen::Shop => self.draw_shop(&mut canvas, ctx, mouse)?,
        }
        self.quit_button.draw(&mut canvas, ctx, mouse)?;

        canvas.finish(ctx)?;
        Ok(())
    }

    // ἔλεγχος
    fn mouse_button_down_event(&mut self, ctx: &mut Context, button: MouseButton, x: f32, y: f32) -> GameResult {
        if button != MouseButton::Left {
            return Ok(());
        }
        let point = Vec2::new(x, y);

        if let Some(action) = self.clicked_action(point) {
            self.perform(ctx, action);
        } else if let Some(points) = self.session.click(point) {
            self.score_popup = Some((format!("+{}", points), point, 1.0));
        }
        Ok(())
    }

    fn key_down_event(&mut self, ctx: &mut Context, input: KeyInput, _repeat: bool) -> GameResult {
        if let (Some(KeyCode::R), Screen::GameOver) = (input.keycode, self.session.screen) {
            self.perform(ctx, Action::Restart);
        }
        Ok(())
    }
}

// ἡ ἀρχή
fn main() -> GameResult {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let tuning = Tuning::load(&Tuning::config_path()).unwrap_or_else(|e| {
        log::warn!("{}; using default tuning", e);
        Tuning::default()
    });

    let mut cb = ggez::ContextBuilder::new("keep-up", "keep-up")
        .window_setup(ggez::conf::WindowSetup::default().title(WINDOW_TITLE))
        // Fenstergröße (window size), fixed like the play field
        .window_mode(
            ggez::conf::WindowMode::default()
                .dimensions(SCREEN_WIDTH, SCREEN_HEIGHT)
                .resizable(false),
        );
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        let mut path = PathBuf::from(manifest_dir);
        path.push("resources");
        cb = cb.add_resource_path(path);
    }

    let (mut ctx, event_loop) = cb.build()?;
    let state = MainState::new(&mut ctx, &tuning)?;
    log::info!("Window ready, entering event loop");
    event::run(ctx, event_loop, state)
}
