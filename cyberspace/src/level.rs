//! Level layouts, loaded from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actor::ENEMY_SIZE;
use crate::math::{Rect, Vec2};

const LEVEL_ONE: &str = include_str!("../levels/level_one.json");

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("enemy {enemy} refers to missing platform {platform}")]
    MissingPlatform { enemy: usize, platform: usize },
    #[error("enemy {enemy} does not fit on platform {platform} at offset {offset}")]
    EnemyOffPlatform {
        enemy: usize,
        platform: usize,
        offset: f32,
    },
    #[error("level has no platforms")]
    NoPlatforms,
}

/// Camera limits for a level, in camera offset space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraBounds {
    pub constant: Vec2,
    pub horizontal: (f32, f32),
    pub vertical: (f32, f32),
}

/// An enemy standing on a platform, `offset` pixels in from its left edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyPlacement {
    pub platform: usize,
    pub offset: f32,
    #[serde(default = "default_direction")]
    pub direction: f32,
}

fn default_direction() -> f32 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    pub width: f32,
    /// Falling below this height ends the level.
    pub kill_plane: f32,
    pub player_spawn: Vec2,
    pub camera: CameraBounds,
    pub platforms: Vec<Rect>,
    #[serde(default)]
    pub enemies: Vec<EnemyPlacement>,
    pub exit: Rect,
}

impl LevelData {
    /// Parses and validates a level.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn level_one() -> Result<Self, LevelError> {
        Self::from_json(LEVEL_ONE)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.platforms.is_empty() {
            return Err(LevelError::NoPlatforms);
        }
        for (i, enemy) in self.enemies.iter().enumerate() {
            let platform = self
                .platforms
                .get(enemy.platform)
                .ok_or(LevelError::MissingPlatform {
                    enemy: i,
                    platform: enemy.platform,
                })?;
            if enemy.offset < 0.0 || enemy.offset + ENEMY_SIZE.x > platform.w {
                return Err(LevelError::EnemyOffPlatform {
                    enemy: i,
                    platform: enemy.platform,
                    offset: enemy.offset,
                });
            }
        }
        Ok(())
    }

    /// Spawn centre of an enemy, resting just above its platform.
    pub fn enemy_position(&self, placement: &EnemyPlacement) -> Option<Vec2> {
        let platform = self.platforms.get(placement.platform)?;
        Some(Vec2::new(
            platform.left() + placement.offset + ENEMY_SIZE.x / 2.0,
            platform.top() + ENEMY_SIZE.y / 2.0 + 1.0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = r#"{
        "name": "tiny",
        "width": 500.0,
        "kill_plane": -100.0,
        "player_spawn": { "x": 50.0, "y": 100.0 },
        "camera": { "constant": { "x": 0.0, "y": 0.0 }, "horizontal": [0.0, 500.0], "vertical": [0.0, 720.0] },
        "platforms": [ { "x": 0.0, "y": 0.0, "w": 100.0, "h": 10.0 } ],
        "enemies": [ { "platform": 0, "offset": 40.0 } ],
        "exit": { "x": 400.0, "y": 0.0, "w": 50.0, "h": 100.0 }
    }"#;

    #[test]
    fn level_one_is_valid() {
        let level = LevelData::level_one().unwrap();
        assert_eq!(level.enemies.len(), 7);
        assert!(level.platforms.len() >= 9);
        for enemy in &level.enemies {
            let pos = level.enemy_position(enemy).unwrap();
            let platform = level.platforms[enemy.platform];
            assert!(pos.x - ENEMY_SIZE.x / 2.0 >= platform.left());
            assert!(pos.x + ENEMY_SIZE.x / 2.0 <= platform.right());
            assert!(pos.y > platform.top());
        }
    }

    #[test]
    fn direction_defaults_to_right() {
        let level = LevelData::from_json(TINY).unwrap();
        assert_eq!(level.enemies[0].direction, 1.0);
        assert_eq!(
            level.enemy_position(&level.enemies[0]),
            Some(Vec2::new(65.0, 36.0))
        );
    }

    #[test]
    fn rejects_enemies_off_their_platform() {
        let overhang = TINY.replace(r#""offset": 40.0"#, r#""offset": 60.0"#);
        assert!(matches!(
            LevelData::from_json(&overhang),
            Err(LevelError::EnemyOffPlatform { enemy: 0, .. })
        ));

        let missing = TINY.replace(r#""platform": 0"#, r#""platform": 3"#);
        assert!(matches!(
            LevelData::from_json(&missing),
            Err(LevelError::MissingPlatform { platform: 3, .. })
        ));

        assert!(matches!(
            LevelData::from_json("{"),
            Err(LevelError::Parse(_))
        ));
    }
}
