use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_STORE_PATH: &str = ".taskboard.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Stored {
    #[serde(rename = "teamCode", default, skip_serializing_if = "Option::is_none")]
    team_code: Option<String>,
}

/// Local persistence for the team code, a single `teamCode` key in a JSON file.
#[derive(Debug, Clone)]
pub struct TeamCodeStore {
    path: PathBuf,
}

impl TeamCodeStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        TeamCodeStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn from_env() -> Self {
        let path = std::env::var("TASKBOARD_STORE").unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<String>, Error> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let stored: Stored = serde_json::from_slice(&bytes)?;
        Ok(stored.team_code.filter(|code| !code.is_empty()))
    }

    pub fn save(&self, team_code: &str) -> Result<(), Error> {
        let stored = Stored {
            team_code: Some(team_code.to_string()),
        };
        std::fs::write(&self.path, serde_json::to_vec_pretty(&stored)?)?;
        log::debug!("saved team code to {}", self.path().display());
        Ok(())
    }
}
