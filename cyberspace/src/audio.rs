use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

/// Plays named sounds. Scenes and actors only see this trait.
pub trait SoundPlayer {
    /// Starts the named sound. Unknown names are ignored.
    fn play_sound(&mut self, name: &str);

    /// Stops every playing instance of the named sound.
    fn stop_sound(&mut self, name: &str);

    fn set_muted(&mut self, muted: bool);

    fn is_muted(&self) -> bool;

    fn toggle_muted(&mut self) {
        let muted = self.is_muted();
        self.set_muted(!muted);
    }
}

#[derive(Clone, Debug)]
struct SoundEntry {
    path: PathBuf,
    volume: f32,
    looping: bool,
}

/// rodio-backed sound table: name → file, volume and loop flag.
pub struct AudioSystem {
    _stream: Option<OutputStream>,
    stream_handle: Option<OutputStreamHandle>,
    sounds: HashMap<String, SoundEntry>,
    playing: HashMap<String, Vec<Sink>>,
    muted: bool,
}

impl AudioSystem {
    /// Opens the default output device. A missing device leaves the system
    /// silent instead of failing.
    pub fn new() -> Self {
        match OutputStream::try_default() {
            Ok((stream, stream_handle)) => Self {
                _stream: Some(stream),
                stream_handle: Some(stream_handle),
                sounds: HashMap::new(),
                playing: HashMap::new(),
                muted: false,
            },
            Err(e) => {
                log::warn!("Failed to initialize audio: {}. Audio will be unavailable.", e);
                Self::silent()
            }
        }
    }

    /// An audio system with no output device.
    pub fn silent() -> Self {
        Self {
            _stream: None,
            stream_handle: None,
            sounds: HashMap::new(),
            playing: HashMap::new(),
            muted: false,
        }
    }

    /// Registers the game's sounds from `asset_root`.
    pub fn with_game_sounds(mut self, asset_root: impl AsRef<Path>) -> Self {
        let root = asset_root.as_ref();
        self.register("laser", root.join("sounds/sfx/laser.wav"), 1.0, false);
        self.register("jump", root.join("sounds/sfx/jump.wav"), 0.4, false);
        self.register("title_theme", root.join("sounds/music/title_theme.wav"), 0.5, true);
        self.register(
            "game_over_theme",
            root.join("sounds/music/game_over_theme.wav"),
            0.3,
            true,
        );
        self
    }

    /// Check if audio is available and working.
    pub fn is_available(&self) -> bool {
        self.stream_handle.is_some()
    }

    /// Adds a sound to the table. Missing files are reported once here and
    /// the sound stays silent.
    pub fn register(&mut self, name: &str, path: impl Into<PathBuf>, volume: f32, looping: bool) {
        let path = path.into();
        if !path.exists() {
            log::warn!("sound '{}' not found at {:?}; it will be silent", name, path);
        }
        self.sounds.insert(
            name.to_string(),
            SoundEntry {
                path,
                volume: volume.clamp(0.0, 1.0),
                looping,
            },
        );
    }

    fn start(&self, entry: &SoundEntry) -> Result<Sink> {
        let stream_handle = self
            .stream_handle
            .as_ref()
            .ok_or_else(|| anyhow!("Audio system is not available"))?;

        let file = File::open(&entry.path)
            .map_err(|e| anyhow!("Failed to open sound file {:?}: {}", entry.path, e))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| anyhow!("Failed to decode sound file {:?}: {}", entry.path, e))?;

        let sink = Sink::try_new(stream_handle)
            .map_err(|e| anyhow!("Failed to create audio sink: {}", e))?;
        sink.set_volume(if self.muted { 0.0 } else { entry.volume });
        if entry.looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        Ok(sink)
    }
}

impl Default for AudioSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundPlayer for AudioSystem {
    fn play_sound(&mut self, name: &str) {
        let Some(entry) = self.sounds.get(name) else {
            log::debug!("play_sound: unknown sound '{}'", name);
            return;
        };
        if !self.is_available() || !entry.path.exists() {
            return;
        }
        match self.start(entry) {
            Ok(sink) => {
                let sinks = self.playing.entry(name.to_string()).or_default();
                sinks.retain(|s| !s.empty());
                sinks.push(sink);
            }
            Err(e) => log::warn!("could not play '{}': {}", name, e),
        }
    }

    fn stop_sound(&mut self, name: &str) {
        if let Some(sinks) = self.playing.remove(name) {
            for sink in sinks {
                sink.stop();
            }
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        for (name, sinks) in &self.playing {
            let volume = if muted {
                0.0
            } else {
                self.sounds.get(name).map(|e| e.volume).unwrap_or(1.0)
            };
            for sink in sinks {
                sink.set_volume(volume);
            }
        }
        log::info!("sound {}", if muted { "muted" } else { "unmuted" });
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

/// Sound player that only records requests, for headless runs and tests.
#[derive(Clone, Debug, Default)]
pub struct SoundLog {
    pub played: Vec<String>,
    pub stopped: Vec<String>,
    muted: bool,
}

impl SoundLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// How often `name` was played.
    pub fn count(&self, name: &str) -> usize {
        self.played.iter().filter(|n| *n == name).count()
    }
}

impl SoundPlayer for SoundLog {
    fn play_sound(&mut self, name: &str) {
        if !self.muted {
            self.played.push(name.to_string());
        }
    }

    fn stop_sound(&mut self, name: &str) {
        self.stopped.push(name.to_string());
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_system_ignores_requests() {
        let mut audio = AudioSystem::silent();
        audio.register("beep", "does/not/exist.wav", 2.0, false);
        audio.play_sound("beep");
        audio.play_sound("unknown");
        audio.stop_sound("beep");
        assert!(!audio.is_available());

        audio.toggle_muted();
        assert!(audio.is_muted());
    }

    #[test]
    fn sound_log_respects_mute() {
        let mut log = SoundLog::new();
        log.play_sound("jump");
        log.set_muted(true);
        log.play_sound("jump");
        assert_eq!(log.count("jump"), 1);
    }
}
