use std::path::PathBuf;
use std::sync::Arc;

use crate::matcher::ExplainableMatcher;
use crate::storage::MatchStore;

#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<ExplainableMatcher>,

    pub store: Arc<dyn MatchStore>,

    /// Served under `/uploads`.
    pub upload_dir: PathBuf,

    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        matcher: Arc<ExplainableMatcher>,
        store: Arc<dyn MatchStore>,
        upload_dir: PathBuf,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            matcher,
            store,
            upload_dir,
            max_upload_bytes,
        }
    }
}
