use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Frame counts per animation label, read from an animation directory laid
/// out as `<dir>/<label>/<frame files>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationSet {
    frames: HashMap<String, usize>,
}

impl AnimationSet {
    /// Counts the frames of each labelled animation under `dir`.
    ///
    /// A missing or empty directory falls back to a single placeholder frame.
    pub fn load(dir: impl AsRef<Path>, labels: &[&str]) -> Self {
        let dir = dir.as_ref();
        let frames = labels
            .iter()
            .map(|&label| {
                let count = count_frames(&dir.join(label)).unwrap_or(0);
                if count == 0 {
                    log::warn!(
                        "no frames for animation '{}' in {:?}; using a placeholder",
                        label,
                        dir
                    );
                }
                (label.to_string(), count.max(1))
            })
            .collect();
        Self { frames }
    }

    /// One placeholder frame for every label.
    pub fn placeholder(labels: &[&str]) -> Self {
        Self {
            frames: labels.iter().map(|&l| (l.to_string(), 1)).collect(),
        }
    }

    /// Overrides the frame count of one animation.
    pub fn with_frames(mut self, label: &str, count: usize) -> Self {
        self.frames.insert(label.to_string(), count.max(1));
        self
    }

    /// Number of frames for `label`; unknown labels have one placeholder frame.
    pub fn frame_count(&self, label: &str) -> usize {
        self.frames.get(label).copied().unwrap_or(1)
    }
}

fn count_frames(dir: &Path) -> std::io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        if entry?.file_type()?.is_file() {
            count += 1;
        }
    }
    Ok(count)
}
