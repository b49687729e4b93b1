use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::client::filters::ClientFilterState;

pub const FILTER_STATE_KEY: &str = "school-rolls-filters";

/// Persists the filter selection as JSON under a single key in the state
/// directory.
pub struct FilterStore {
    path: PathBuf,
}

impl FilterStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(format!("{FILTER_STATE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable state loads as an empty selection.
    pub fn load(&self) -> ClientFilterState {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return ClientFilterState::default(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to read filter state");
                return ClientFilterState::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "discarding corrupt filter state");
                ClientFilterState::default()
            }
        }
    }

    pub fn save(&self, state: &ClientFilterState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_vec_pretty(state).context("failed to encode filter state")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}
