use anyhow::Result;

use super::{Button, LevelScene, Scene, SceneContext, SceneSwitcher};
use crate::input::{actions, InputMap};
use crate::math::{Rect, Vec2};
use crate::render::{Canvas, Color};

/// How the last level ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Defeat,
    Victory,
}

impl Outcome {
    fn banner_color(self) -> Color {
        match self {
            Outcome::Defeat => Color::rgb(0.8, 0.1, 0.1),
            Outcome::Victory => Color::rgb(0.1, 0.8, 0.2),
        }
    }
}

pub struct GameOverScene {
    outcome: Outcome,
    try_again: Button,
    bindings: InputMap,
}

impl GameOverScene {
    pub fn new(outcome: Outcome, screen: Vec2) -> Self {
        Self {
            outcome,
            try_again: Button::centered(
                Vec2::new(screen.x / 2.0, 420.0),
                Vec2::new(240.0, 40.0),
                outcome.banner_color(),
            ),
            bindings: InputMap::platformer(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

impl Scene for GameOverScene {
    fn on_enter(&mut self, ctx: &mut SceneContext) -> Result<()> {
        ctx.sounds.play_sound("game_over_theme");
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut SceneContext) -> Result<()> {
        ctx.sounds.stop_sound("game_over_theme");
        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneContext, switcher: &mut dyn SceneSwitcher) -> Result<()> {
        if self.bindings.action_pressed(ctx.input, actions::TOGGLE_SOUND) {
            ctx.sounds.toggle_muted();
        }

        if self.try_again.clicked(ctx.input)
            || self.bindings.action_pressed(ctx.input, actions::CONFIRM)
        {
            log::info!("restarting level after {:?}", self.outcome);
            switcher.go_to(Box::new(LevelScene::new(ctx.screen)?));
        } else if self.bindings.action_pressed(ctx.input, actions::QUIT) {
            switcher.quit();
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.clear(Color::BLACK);
        let size = canvas.size();
        let banner = Rect::new(size.x / 2.0 - 250.0, size.y / 3.0 - 40.0, 500.0, 80.0);
        canvas.fill_rect(banner, self.outcome.banner_color());
        self.try_again.draw(canvas, true);
    }

    fn name(&self) -> &'static str {
        "game_over"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{SoundLog, SoundPlayer};
    use crate::input::InputState;
    use crate::render::DrawList;
    use crate::scene::SceneManager;
    use winit::event::{ElementState, MouseButton};

    const SCREEN: Vec2 = Vec2::new(1280.0, 720.0);

    #[test]
    fn clicking_try_again_restarts_the_level() {
        let mut manager = SceneManager::new(GameOverScene::new(Outcome::Defeat, SCREEN));
        let mut input = InputState::new();
        input.handle_cursor_moved(640.0, 420.0);
        input.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        let mut sounds = SoundLog::new();
        let mut ctx = SceneContext {
            input: &input,
            sounds: &mut sounds,
            dt: 1.0 / 60.0,
            screen: SCREEN,
        };
        manager.update(&mut ctx).unwrap();

        assert_eq!(manager.current().name(), "level");
        assert_eq!(sounds.count("game_over_theme"), 1);
        assert_eq!(sounds.stopped, ["game_over_theme"]);
    }

    #[test]
    fn banner_color_follows_outcome() {
        for (outcome, color) in [
            (Outcome::Defeat, Outcome::Defeat.banner_color()),
            (Outcome::Victory, Outcome::Victory.banner_color()),
        ] {
            let scene = GameOverScene::new(outcome, SCREEN);
            let mut canvas = DrawList::new(SCREEN.x, SCREEN.y);
            scene.draw(&mut canvas);
            assert!(canvas.rects().any(|(_, c)| c == color));
        }
        assert_ne!(
            Outcome::Defeat.banner_color(),
            Outcome::Victory.banner_color()
        );
    }

    #[test]
    fn mute_toggle_silences_later_sounds() {
        let mut scene = GameOverScene::new(Outcome::Victory, SCREEN);
        let mut input = InputState::new();
        input.press(winit::keyboard::KeyCode::KeyM);
        let mut sounds = SoundLog::new();
        let mut pending = super::super::PendingTransition::default();
        let mut ctx = SceneContext {
            input: &input,
            sounds: &mut sounds,
            dt: 1.0 / 60.0,
            screen: SCREEN,
        };
        scene.update(&mut ctx, &mut pending).unwrap();
        scene.on_enter(&mut ctx).unwrap();
        assert!(sounds.is_muted());
        assert!(sounds.played.is_empty());
        assert!(pending.next.is_none());
    }
}
