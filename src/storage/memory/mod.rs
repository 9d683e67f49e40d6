//! Process-local [`MatchStore`], optionally snapshotted to a JSON file.
//!
//! With a snapshot path every mutation rewrites the snapshot (temp file then
//! rename), and [`InMemoryMatchStore::open`] reloads it on startup.


use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::matcher::FeatureBreakdown;
use crate::storage::error::{StoreError, StoreResult};
use crate::storage::images::ImageStore;
use crate::storage::model::{MatchRecord, NewMatch, User};
use crate::storage::MatchStore;

/// Saved match as held in memory; the breakdown stays JSON-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredMatch {
    seq: u64,
    id: String,
    user_id: String,
    prompt: String,
    image_filename: String,
    stored_filename: String,
    image_path: PathBuf,
    match_score: f64,
    explanation: String,
    feature_breakdown_json: String,
    created_at: chrono::DateTime<Utc>,
}

impl StoredMatch {
    fn to_record(&self) -> StoreResult<MatchRecord> {
        let feature_breakdown: Vec<FeatureBreakdown> =
            serde_json::from_str(&self.feature_breakdown_json)?;
        Ok(MatchRecord {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            prompt: self.prompt.clone(),
            image_filename: self.image_filename.clone(),
            stored_filename: self.stored_filename.clone(),
            image_path: self.image_path.display().to_string(),
            match_score: self.match_score,
            explanation: self.explanation.clone(),
            feature_breakdown,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, User>,
    logins: HashMap<String, String>,
    matches: HashMap<String, StoredMatch>,
    next_seq: u64,
}

/// On-disk form of [`State`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    users: Vec<User>,
    matches: Vec<StoredMatch>,
}

impl State {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut state = State::default();
        for user in snapshot.users {
            state.logins.insert(user.login_id.clone(), user.id.clone());
            state.users.insert(user.id.clone(), user);
        }
        for stored in snapshot.matches {
            state.next_seq = state.next_seq.max(stored.seq + 1);
            state.matches.insert(stored.id.clone(), stored);
        }
        state
    }

    fn to_snapshot(&self) -> Snapshot {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let mut matches: Vec<StoredMatch> = self.matches.values().cloned().collect();
        matches.sort_by_key(|m| m.seq);
        Snapshot { users, matches }
    }
}

/// Users and matches in memory; images on disk.
#[derive(Debug)]
pub struct InMemoryMatchStore {
    images: ImageStore,
    state: RwLock<State>,
    snapshot_path: Option<PathBuf>,
}

impl InMemoryMatchStore {
    /// Store without a snapshot; history is lost on restart.
    pub fn new(images: ImageStore) -> Self {
        Self {
            images,
            state: RwLock::new(State::default()),
            snapshot_path: None,
        }
    }

    /// Store backed by the snapshot at `snapshot_path`, loaded if present.
    pub fn open(images: ImageStore, snapshot_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let snapshot_path = snapshot_path.into();
        let state = if snapshot_path.exists() {
            let bytes = fs::read(&snapshot_path)?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
            info!(
                path = %snapshot_path.display(),
                users = snapshot.users.len(),
                matches = snapshot.matches.len(),
                "Loaded match history"
            );
            State::from_snapshot(snapshot)
        } else {
            debug!(path = %snapshot_path.display(), "No match history yet");
            State::default()
        };

        Ok(Self {
            images,
            state: RwLock::new(state),
            snapshot_path: Some(snapshot_path),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn match_count(&self) -> usize {
        self.state.read().matches.len()
    }

    /// Rewrites the snapshot from `state`. Callers hold the write lock.
    fn persist(&self, state: &State) -> StoreResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let bytes = serde_json::to_vec(&state.to_snapshot())?;
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl MatchStore for InMemoryMatchStore {
    fn create_or_get_user(&self, login_id: &str) -> StoreResult<User> {
        let login_id = login_id.trim();
        if login_id.is_empty() {
            return Err(StoreError::EmptyLoginId);
        }

        let mut state = self.state.write();
        if let Some(user) = state
            .logins
            .get(login_id)
            .and_then(|id| state.users.get(id))
        {
            return Ok(user.clone());
        }

        let user = User {
            id: Uuid::new_v4().simple().to_string(),
            login_id: login_id.to_string(),
            created_at: Utc::now(),
        };
        state
            .logins
            .insert(user.login_id.clone(), user.id.clone());
        state.users.insert(user.id.clone(), user.clone());

        if let Err(e) = self.persist(&state) {
            state.logins.remove(&user.login_id);
            state.users.remove(&user.id);
            return Err(e);
        }

        info!(user_id = %user.id, login_id = %user.login_id, "Created user");
        Ok(user)
    }

    fn get_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        Ok(self.state.read().users.get(user_id).cloned())
    }

    fn find_user_by_login(&self, login_id: &str) -> StoreResult<Option<User>> {
        let state = self.state.read();
        Ok(state
            .logins
            .get(login_id)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    fn save_match(&self, new_match: NewMatch) -> StoreResult<String> {
        if !self.state.read().users.contains_key(&new_match.user_id) {
            return Err(StoreError::UnknownUser(new_match.user_id));
        }

        let feature_breakdown_json = serde_json::to_string(&new_match.feature_breakdown)?;
        let (stored_filename, image_path) = self.images.save(
            &new_match.user_id,
            &new_match.image_filename,
            &new_match.image_bytes,
        )?;

        let mut state = self.state.write();
        let seq = state.next_seq;
        state.next_seq += 1;

        let stored = StoredMatch {
            seq,
            id: Uuid::new_v4().simple().to_string(),
            user_id: new_match.user_id,
            prompt: new_match.prompt,
            image_filename: new_match.image_filename,
            stored_filename,
            image_path,
            match_score: new_match.match_score,
            explanation: new_match.explanation,
            feature_breakdown_json,
            created_at: Utc::now(),
        };
        let id = stored.id.clone();

        debug!(
            match_id = %id,
            user_id = %stored.user_id,
            stored_filename = %stored.stored_filename,
            score = stored.match_score,
            "Saved match"
        );
        let image_path = stored.image_path.clone();
        state.matches.insert(id.clone(), stored);

        if let Err(e) = self.persist(&state) {
            state.matches.remove(&id);
            if let Err(remove_err) = self.images.remove(&image_path) {
                warn!(error = %remove_err, "Failed to remove image of unsaved match");
            }
            return Err(e);
        }
        Ok(id)
    }

    fn list_matches(&self, user_id: &str) -> StoreResult<Vec<MatchRecord>> {
        let state = self.state.read();
        let mut matches: Vec<&StoredMatch> = state
            .matches
            .values()
            .filter(|m| m.user_id == user_id)
            .collect();
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        matches.into_iter().map(StoredMatch::to_record).collect()
    }

    fn get_match(&self, match_id: &str) -> StoreResult<Option<MatchRecord>> {
        self.state
            .read()
            .matches
            .get(match_id)
            .map(StoredMatch::to_record)
            .transpose()
    }

    fn delete_match(&self, match_id: &str) -> StoreResult<bool> {
        let image_path = {
            let state = self.state.read();
            let Some(stored) = state.matches.get(match_id) else {
                return Ok(false);
            };
            stored.image_path.clone()
        };

        // The record outlives a failed image removal.
        if !self.images.remove(&image_path)? {
            warn!(
                match_id = %match_id,
                path = %image_path.display(),
                "Stored image was already missing"
            );
        }
        let mut state = self.state.write();
        if state.matches.remove(match_id).is_none() {
            return Ok(false);
        }
        if let Err(e) = self.persist(&state) {
            warn!(match_id = %match_id, error = %e, "Failed to persist deletion");
        }
        Ok(true)
    }
}
