//! Profile persistence with atomic writes.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    error::{EngineError, EngineResult},
    profile::{Profile, STARTING_ROCKS},
};

/// File name of the profile inside the data directory.
pub const PROFILE_FILE: &str = "profile.json";

/// Directory under the platform config dir used by default.
pub const DEFAULT_DATA_DIR: &str = "quarry";

/// Loads and saves the single profile file.
pub struct ProfileStore {
    path: PathBuf,
    starting_balance: u64,
}

impl ProfileStore {
    /// Store backed by the given file path, with the stock starting balance.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_starting_balance(path, STARTING_ROCKS)
    }

    /// Store with a configured fresh-profile balance.
    pub fn with_starting_balance(path: impl Into<PathBuf>, starting_balance: u64) -> Self {
        Self {
            path: path.into(),
            starting_balance,
        }
    }

    /// Default location under the user's config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DATA_DIR)
            .join(PROFILE_FILE)
    }

    /// Path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rocks a fresh profile from this store starts with.
    pub fn starting_balance(&self) -> u64 {
        self.starting_balance
    }

    /// Read the profile, handing out a fresh one when no file exists yet.
    ///
    /// A file that exists but cannot be read, parsed, or validated is
    /// reported as corrupt and never repaired here.
    pub fn load(&self) -> EngineResult<Profile> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no profile at {}, starting fresh", self.path.display());
                return Ok(Profile::fresh(self.starting_balance));
            }
            Err(err) => {
                return Err(EngineError::CorruptState(format!(
                    "unreadable profile {}: {err}",
                    self.path.display()
                )))
            }
        };

        let profile: Profile = serde_json::from_str(&raw).map_err(|err| {
            EngineError::CorruptState(format!(
                "failed to parse {}: {err}",
                self.path.display()
            ))
        })?;
        profile.validate()?;
        Ok(profile)
    }

    /// Write the profile atomically: temp file next to the target, then rename.
    pub fn save(&self, profile: &Profile) -> EngineResult<()> {
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let serialised = serde_json::to_vec_pretty(profile)
            .map_err(|err| EngineError::SaveIo(io::Error::new(io::ErrorKind::Other, err)))?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&serialised)?;
        tmp.persist(&self.path)
            .map_err(|err| EngineError::SaveIo(err.error))?;

        debug!("saved profile to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::GameStats;
    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_fresh_profile() -> Result<()> {
        let dir = tempdir()?;
        let store = ProfileStore::new(dir.path().join("profile.json"));
        let profile = store.load()?;
        assert_eq!(profile.balance, STARTING_ROCKS);
        assert!(profile.stats.is_empty());
        Ok(())
    }

    #[test]
    fn save_then_load_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let store = ProfileStore::new(dir.path().join("profile.json"));

        let mut profile = Profile::default();
        profile.balance = 420;
        profile.win_streak = 2;
        profile.best_streak = 4;
        profile.stats.insert(
            "roulette".to_string(),
            GameStats {
                played: 3,
                wins: 2,
                losses: 1,
                pushes: 0,
                current_streak: 2,
                best_streak: 2,
            },
        );

        store.save(&profile)?;
        let loaded = store.load()?;
        assert_eq!(loaded, profile);

        // Saving what was just loaded must not change the contents.
        store.save(&loaded)?;
        assert_eq!(store.load()?, profile);
        Ok(())
    }

    #[test]
    fn negative_balance_is_corrupt() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("profile.json");
        let raw = json!({
            "schemaVersion": 1,
            "balance": -5,
            "colorEnabled": true,
            "winStreak": 0,
            "bestStreak": 0,
            "stats": {}
        });
        fs::write(&path, serde_json::to_vec_pretty(&raw)?)?;

        let err = ProfileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, EngineError::CorruptState(_)));
        Ok(())
    }

    #[test]
    fn garbage_file_is_corrupt() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("profile.json");
        fs::write(&path, "rocks: plenty")?;

        let err = ProfileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, EngineError::CorruptState(_)));
        Ok(())
    }

    #[test]
    fn save_creates_missing_directories() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("deeper").join("profile.json");
        let store = ProfileStore::new(&path);
        store.save(&Profile::default())?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn configured_starting_balance_applies_to_fresh_profiles() -> Result<()> {
        let dir = tempdir()?;
        let store =
            ProfileStore::with_starting_balance(dir.path().join("profile.json"), 500);
        assert_eq!(store.load()?.balance, 500);
        Ok(())
    }
}
