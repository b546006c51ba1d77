use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::HIGH_SCORE_SLOTS;

const APP_DIR_NAME: &str = "powerup-snake";
const HIGH_SCORE_FILE_NAME: &str = "highscores.json";
const ACHIEVEMENT_FILE_NAME: &str = "achievements.json";

/// Failures reading or writing persisted score data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt data in {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Earned flags keyed by achievement name.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Achievements(BTreeMap<String, bool>);

impl Achievements {
    #[must_use]
    pub fn is_earned(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// Marks `key` as earned. Returns false if it already was.
    pub fn earn(&mut self, key: &str) -> bool {
        if self.is_earned(key) {
            return false;
        }

        self.0.insert(key.to_owned(), true);
        true
    }
}

/// Persistence gateway for data that outlives an episode.
pub trait ScoreStore {
    fn load_high_scores(&mut self) -> Result<Vec<u32>, StoreError>;

    /// Persists the best [`HIGH_SCORE_SLOTS`] of `scores`, highest first.
    fn save_high_scores(&mut self, scores: &[u32]) -> Result<(), StoreError>;

    fn load_achievements(&mut self) -> Result<Achievements, StoreError>;

    fn save_achievements(&mut self, achievements: &Achievements) -> Result<(), StoreError>;
}

/// In-memory store for runs that should leave no trace on disk.
///
/// Counts writes so callers can check how often data was persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    pub high_scores: Vec<u32>,
    pub achievements: Achievements,
    pub high_score_writes: usize,
    pub achievement_writes: usize,
}

impl ScoreStore for MemoryScoreStore {
    fn load_high_scores(&mut self) -> Result<Vec<u32>, StoreError> {
        Ok(self.high_scores.clone())
    }

    fn save_high_scores(&mut self, scores: &[u32]) -> Result<(), StoreError> {
        self.high_scores = top_scores(scores);
        self.high_score_writes += 1;
        Ok(())
    }

    fn load_achievements(&mut self) -> Result<Achievements, StoreError> {
        Ok(self.achievements.clone())
    }

    fn save_achievements(&mut self, achievements: &Achievements) -> Result<(), StoreError> {
        self.achievements = achievements.clone();
        self.achievement_writes += 1;
        Ok(())
    }
}

/// Returns the best [`HIGH_SCORE_SLOTS`] scores sorted descending.
#[must_use]
pub fn top_scores(scores: &[u32]) -> Vec<u32> {
    let mut sorted = scores.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.truncate(HIGH_SCORE_SLOTS);
    sorted
}

/// Returns the platform-correct directory for score files.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base
}

/// JSON files on disk: a list of integers and a string-to-bool map.
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    high_scores_path: PathBuf,
    achievements_path: PathBuf,
}

impl FileScoreStore {
    /// Opens the store in `dir`, creating the directory and empty files
    /// (`[]` and `{}`) when they do not exist yet.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let store = Self {
            high_scores_path: dir.join(HIGH_SCORE_FILE_NAME),
            achievements_path: dir.join(ACHIEVEMENT_FILE_NAME),
        };

        if !store.high_scores_path.exists() {
            write_json(&store.high_scores_path, &Vec::<u32>::new())?;
        }
        if !store.achievements_path.exists() {
            write_json(&store.achievements_path, &Achievements::default())?;
        }

        Ok(store)
    }

    #[must_use]
    pub fn high_scores_path(&self) -> &Path {
        &self.high_scores_path
    }

    #[must_use]
    pub fn achievements_path(&self) -> &Path {
        &self.achievements_path
    }
}

impl ScoreStore for FileScoreStore {
    fn load_high_scores(&mut self) -> Result<Vec<u32>, StoreError> {
        read_json_or_default(&self.high_scores_path)
    }

    fn save_high_scores(&mut self, scores: &[u32]) -> Result<(), StoreError> {
        write_json(&self.high_scores_path, &top_scores(scores))
    }

    fn load_achievements(&mut self) -> Result<Achievements, StoreError> {
        read_json_or_default(&self.achievements_path)
    }

    fn save_achievements(&mut self, achievements: &Achievements) -> Result<(), StoreError> {
        write_json(&self.achievements_path, achievements)
    }
}

/// Reads JSON from `path`, treating a missing file as the empty value.
fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string(value).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
