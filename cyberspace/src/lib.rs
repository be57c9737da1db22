//! Cyberspace - a physics-driven side-scrolling platformer.
//!
//! The world is simulated with rapier2d in y-up pixel units; the camera maps
//! it onto a y-down screen drawn through wgpu.

pub mod actor;
pub mod assets;
pub mod audio;
pub mod camera;
pub mod clock;
pub mod collision;
pub mod engine;
pub mod entity;
pub mod health;
pub mod input;
pub mod level;
pub mod math;
pub mod physics;
pub mod projectile;
pub mod render;
pub mod scene;

pub use crate::audio::{AudioSystem, SoundLog, SoundPlayer};
pub use crate::camera::{Camera, CameraBehavior};
pub use crate::engine::{Engine, EngineConfig, EngineContext, Game};
pub use crate::input::{InputMap, InputState};
pub use crate::level::LevelData;
pub use crate::math::{Rect, Vec2};
pub use crate::scene::{GameOverScene, LevelScene, Scene, SceneManager, TitleScene};
