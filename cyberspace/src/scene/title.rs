use anyhow::Result;

use super::{draw_scenery, Button, LevelScene, Scene, SceneContext, SceneSwitcher};
use crate::camera::{Camera, CameraBehavior};
use crate::input::{actions, InputMap};
use crate::math::{Rect, Vec2};
use crate::render::{Canvas, Color};

/// Backdrop scroll per step, in pixels.
pub const TITLE_SCROLL_SPEED: f32 = 1.0;
/// The backdrop jumps back to the start once it has scrolled this far.
pub const TITLE_SCROLL_RESET: f32 = 2400.0;

const THEME: Color = Color::rgb(0.0, 200.0 / 255.0, 0.0);

pub struct TitleScene {
    camera: Camera,
    play: Button,
    quit: Button,
    bindings: InputMap,
}

impl TitleScene {
    pub fn new(screen: Vec2) -> Self {
        let center_x = screen.x / 2.0;
        Self {
            camera: Camera::new(
                screen,
                CameraBehavior::AutoScroll {
                    speed: TITLE_SCROLL_SPEED,
                },
            ),
            play: Button::centered(Vec2::new(center_x, 420.0), Vec2::new(120.0, 40.0), THEME),
            quit: Button::centered(
                Vec2::new(center_x, 520.0),
                Vec2::new(120.0, 40.0),
                Color::rgb(0.6, 0.1, 0.1),
            ),
            bindings: InputMap::platformer(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}

impl Scene for TitleScene {
    fn on_enter(&mut self, ctx: &mut SceneContext) -> Result<()> {
        ctx.sounds.play_sound("title_theme");
        Ok(())
    }

    fn on_exit(&mut self, ctx: &mut SceneContext) -> Result<()> {
        ctx.sounds.stop_sound("title_theme");
        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneContext, switcher: &mut dyn SceneSwitcher) -> Result<()> {
        self.camera.scroll();
        if self.camera.offset.x >= TITLE_SCROLL_RESET {
            self.camera.offset.x = 0.0;
        }

        if self.bindings.action_pressed(ctx.input, actions::TOGGLE_SOUND) {
            ctx.sounds.toggle_muted();
        }

        if self.play.clicked(ctx.input) || self.bindings.action_pressed(ctx.input, actions::CONFIRM)
        {
            switcher.go_to(Box::new(LevelScene::new(ctx.screen)?));
        } else if self.quit.clicked(ctx.input)
            || self.bindings.action_pressed(ctx.input, actions::QUIT)
        {
            switcher.quit();
        }
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.clear(Color::rgb(0.02, 0.0, 0.08));
        draw_scenery(canvas, self.camera.offset);

        // Title banner.
        let size = canvas.size();
        let banner = Rect::new(size.x / 2.0 - 300.0, size.y / 4.0 - 30.0, 600.0, 60.0);
        canvas.fill_rect(banner, Color::BLACK.with_alpha(0.8));
        canvas.outline_rect(banner, THEME, 4.0);

        self.play.draw(canvas, true);
        self.quit.draw(canvas, false);
    }

    fn name(&self) -> &'static str {
        "title"
    }
}
