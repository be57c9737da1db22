//! Scene graph: title screen, the level and the game-over screen.

mod game_over;
mod level;
mod title;

pub use game_over::{GameOverScene, Outcome};
pub use level::{level_policy, LevelScene, LevelState, LevelStatus};
pub use title::TitleScene;

use anyhow::Result;

use crate::audio::SoundPlayer;
use crate::engine::{EngineContext, Game};
use crate::input::InputState;
use crate::math::{Rect, Vec2};
use crate::render::{Canvas, Color};

/// What a scene may touch during one fixed step.
pub struct SceneContext<'a> {
    pub input: &'a InputState,
    pub sounds: &'a mut dyn SoundPlayer,
    /// Step length in seconds.
    pub dt: f32,
    /// Screen size in pixels.
    pub screen: Vec2,
}

/// Lets a scene request a transition without owning the manager.
pub trait SceneSwitcher {
    /// Replaces the current scene after this update.
    fn go_to(&mut self, scene: Box<dyn Scene>);

    /// Ends the game after this update.
    fn quit(&mut self);
}

pub trait Scene {
    fn on_enter(&mut self, _ctx: &mut SceneContext) -> Result<()> {
        Ok(())
    }

    fn on_exit(&mut self, _ctx: &mut SceneContext) -> Result<()> {
        Ok(())
    }

    /// Advances the scene by one fixed step.
    fn update(&mut self, ctx: &mut SceneContext, switcher: &mut dyn SceneSwitcher) -> Result<()>;

    fn draw(&self, canvas: &mut dyn Canvas);

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

/// Queues transitions requested during an update.
#[derive(Default)]
struct PendingTransition {
    next: Option<Box<dyn Scene>>,
    quit: bool,
}

impl SceneSwitcher for PendingTransition {
    fn go_to(&mut self, scene: Box<dyn Scene>) {
        self.next = Some(scene);
    }

    fn quit(&mut self) {
        self.quit = true;
    }
}

/// Owns the current scene and applies transitions between updates.
pub struct SceneManager {
    current: Box<dyn Scene>,
    entered: bool,
    quit_requested: bool,
}

impl SceneManager {
    pub fn new(initial: impl Scene + 'static) -> Self {
        Self {
            current: Box::new(initial),
            entered: false,
            quit_requested: false,
        }
    }

    pub fn current(&self) -> &dyn Scene {
        self.current.as_ref()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Enters the initial scene. Later calls do nothing.
    pub fn start(&mut self, ctx: &mut SceneContext) -> Result<()> {
        if !self.entered {
            self.entered = true;
            log::info!("entering scene {}", self.current.name());
            self.current.on_enter(ctx)?;
        }
        Ok(())
    }

    /// Runs one step of the current scene, then any transition it asked for.
    pub fn update(&mut self, ctx: &mut SceneContext) -> Result<()> {
        self.start(ctx)?;
        if self.quit_requested {
            return Ok(());
        }

        let mut pending = PendingTransition::default();
        self.current.update(ctx, &mut pending)?;

        if let Some(mut next) = pending.next {
            log::info!("scene {} -> {}", self.current.name(), next.name());
            self.current.on_exit(ctx)?;
            next.on_enter(ctx)?;
            self.current = next;
        }
        if pending.quit {
            log::info!("quit requested from scene {}", self.current.name());
            self.current.on_exit(ctx)?;
            self.quit_requested = true;
        }
        Ok(())
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        self.current.draw(canvas);
    }
}

impl Game for SceneManager {
    fn init(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        self.start(&mut ctx.scene_context())
    }

    fn update(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        while ctx.should_run_fixed_update() {
            self.update(&mut ctx.scene_context())?;
            ctx.consume_input();
            if self.quit_requested {
                ctx.request_exit();
                break;
            }
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut EngineContext<'_>) -> Result<()> {
        let renderer = ctx.renderer();
        let mut frame = renderer.begin_frame()?;
        SceneManager::draw(self, &mut frame);
        renderer.end_frame(frame)
    }
}

/// A clickable text-less button: a filled box with a border.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Button {
    pub rect: Rect,
    pub color: Color,
}

impl Button {
    /// A `size` button centred on `center` (screen space).
    pub fn centered(center: Vec2, size: Vec2, color: Color) -> Self {
        Self {
            rect: Rect::new(
                center.x - size.x / 2.0,
                center.y - size.y / 2.0,
                size.x,
                size.y,
            ),
            color,
        }
    }

    pub fn clicked(&self, input: &InputState) -> bool {
        input.clicked_in(&self.rect)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, highlighted: bool) {
        let fill = if highlighted {
            self.color
        } else {
            self.color.with_alpha(0.7)
        };
        canvas.fill_rect(self.rect, fill);
        canvas.outline_rect(self.rect, Color::WHITE, 3.0);
    }
}

/// Parallax skyline layers, far to near: (scroll factor, colour).
const SCENERY_LAYERS: [(f32, Color); 4] = [
    (0.5, Color::rgb(0.10, 0.06, 0.22)),
    (0.6, Color::rgb(0.14, 0.08, 0.30)),
    (0.7, Color::rgb(0.18, 0.10, 0.38)),
    (0.8, Color::rgb(0.22, 0.12, 0.46)),
];
const SCENERY_REPEATS: usize = 5;
const BUILDINGS_PER_SCREEN: usize = 8;

/// Draws the scrolling city backdrop for a camera `offset`.
pub(crate) fn draw_scenery(canvas: &mut dyn Canvas, offset: Vec2) {
    let screen = canvas.size();
    let slot = screen.x / BUILDINGS_PER_SCREEN as f32;

    for (layer, &(scroll, color)) in SCENERY_LAYERS.iter().enumerate() {
        let shift = Vec2::new(-offset.x * scroll, -offset.y * scroll);
        for repeat in 0..SCENERY_REPEATS {
            for building in 0..BUILDINGS_PER_SCREEN {
                let height = 120.0 + ((building * 73 + layer * 37) % 5) as f32 * 40.0
                    - layer as f32 * 20.0;
                let x = repeat as f32 * screen.x + building as f32 * slot + shift.x;
                if x + slot < 0.0 || x > screen.x {
                    continue;
                }
                let rect = Rect::new(x + 6.0, screen.y - height + shift.y, slot - 12.0, height);
                canvas.fill_rect(rect, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundLog;
    use crate::render::DrawList;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Step {
        name: &'static str,
        journal: Journal,
        next: Option<&'static str>,
        quit: bool,
    }

    impl Scene for Step {
        fn on_enter(&mut self, _ctx: &mut SceneContext) -> Result<()> {
            self.journal.borrow_mut().push(format!("enter {}", self.name));
            Ok(())
        }

        fn on_exit(&mut self, _ctx: &mut SceneContext) -> Result<()> {
            self.journal.borrow_mut().push(format!("exit {}", self.name));
            Ok(())
        }

        fn update(&mut self, _ctx: &mut SceneContext, switcher: &mut dyn SceneSwitcher) -> Result<()> {
            self.journal.borrow_mut().push(format!("update {}", self.name));
            if let Some(next) = self.next.take() {
                switcher.go_to(Box::new(Step {
                    name: next,
                    journal: self.journal.clone(),
                    next: None,
                    quit: true,
                }));
            } else if self.quit {
                switcher.quit();
            }
            Ok(())
        }

        fn draw(&self, canvas: &mut dyn Canvas) {
            canvas.clear(Color::BLACK);
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    #[test]
    fn transitions_are_applied_after_the_update() {
        let journal = Journal::default();
        let mut manager = SceneManager::new(Step {
            name: "a",
            journal: journal.clone(),
            next: Some("b"),
            quit: false,
        });
        let input = InputState::new();
        let mut sounds = SoundLog::new();
        let mut ctx = SceneContext {
            input: &input,
            sounds: &mut sounds,
            dt: 1.0 / 60.0,
            screen: Vec2::new(1280.0, 720.0),
        };

        manager.update(&mut ctx).unwrap();
        assert_eq!(manager.current().name(), "b");
        manager.update(&mut ctx).unwrap();
        assert!(manager.quit_requested());
        manager.update(&mut ctx).unwrap();

        assert_eq!(
            *journal.borrow(),
            ["enter a", "update a", "exit a", "enter b", "update b", "exit b"]
        );

        let mut canvas = DrawList::new(1280.0, 720.0);
        manager.draw(&mut canvas);
        assert_eq!(canvas.commands().len(), 1);
    }

    #[test]
    fn button_reacts_to_clicks_inside_only() {
        let button = Button::centered(Vec2::new(100.0, 100.0), Vec2::new(80.0, 40.0), Color::GREEN);
        let mut input = InputState::new();
        input.handle_cursor_moved(100.0, 110.0);
        assert!(!button.clicked(&input));
        input.handle_mouse_button(winit::event::MouseButton::Left, winit::event::ElementState::Pressed);
        assert!(button.clicked(&input));

        input.begin_frame();
        input.handle_cursor_moved(10.0, 10.0);
        assert!(!button.clicked(&input));
    }
}
