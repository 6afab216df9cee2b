//! Fragment storage.
//!
//! Activities are stored as fragments so that "what happened between A and
//! B" only ever has to look one maximum fragment length before `A`. The
//! store keeps its fragments sorted by start and can persist them as JSON:
//!
//! ```json
//! { "fragments": [ { "activity_name": "...", "activity_start": "...", ... } ] }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::data_dir;
use crate::engine::{coalesce, defragment, fragment};
use crate::error::{ensure, Result};
use crate::timeline::{Activity, Fragment};

/// Anything that can answer range queries over stored fragments.
pub trait FragmentSource {
    /// Fragments touching `[start, end)`, sorted by start.
    ///
    /// A fragment that ends after `end` is cut there. One that starts
    /// before `start` is returned as is, so its activity can still be
    /// recovered.
    fn fragments_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> Result<Vec<Fragment>>;

    /// Whole activities touching `[start, end)`.
    fn activities_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Activity>> {
        defragment(&self.fragments_in_range(start, end)?)
    }

    /// One fragment per activity, covering only what the range query found.
    fn coalesced_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Fragment>> {
        coalesce(&self.fragments_in_range(start, end)?)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    fragments: Vec<Fragment>,
}

/// In-memory fragment store with optional JSON persistence.
///
/// Overlapping activities are not rejected on insert; range queries that
/// hit them will fail when defragmented.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    max_fragment_duration: Duration,
    fragments: Vec<Fragment>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    /// An empty store that is never written to disk.
    ///
    /// # Errors
    /// `InvalidArgument` if `max_fragment_duration` is not positive.
    pub fn open_memory(max_fragment_duration: Duration) -> Result<Self> {
        ensure(max_fragment_duration > Duration::zero(), || {
            format!("The maximum fragment duration must be positive, got {max_fragment_duration}")
        })?;
        Ok(Self {
            max_fragment_duration,
            fragments: Vec::new(),
            path: None,
        })
    }

    /// Open the store at `~/.config/timetile/fragments.json`.
    ///
    /// # Errors
    /// See [`MemoryStore::open_at`].
    pub fn open(max_fragment_duration: Duration) -> Result<Self> {
        Self::open_at(data_dir()?.join("fragments.json"), max_fragment_duration)
    }

    /// Open the store backed by `path`, starting empty if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, holds invalid
    /// fragments, or holds a fragment longer than `max_fragment_duration`.
    pub fn open_at(path: impl Into<PathBuf>, max_fragment_duration: Duration) -> Result<Self> {
        let path = path.into();
        let mut store = Self::open_memory(max_fragment_duration)?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&content)?;
            let mut fragments = file.fragments;
            fragments.sort_by_key(Fragment::start);
            if let Some(longest) = fragments.iter().map(Fragment::duration).max() {
                ensure(longest <= max_fragment_duration, || {
                    format!(
                        "{} holds a fragment of {longest}, longer than the maximum of {max_fragment_duration}",
                        path.display()
                    )
                })?;
            }
            store.fragments = fragments;
        }

        debug!(path = %path.display(), fragments = store.fragments.len(), "opened fragment store");
        store.path = Some(path);
        Ok(store)
    }

    /// Write the fragments back to the file the store was opened from.
    /// A memory-only store has nothing to do.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }

    /// Write the fragments to `path`.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let file = StoreFile {
            fragments: self.fragments.clone(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    pub fn max_fragment_duration(&self) -> Duration {
        self.max_fragment_duration
    }

    /// Every stored fragment, sorted by start.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragment `activity` and store the pieces. Returns the new fragments.
    ///
    /// # Errors
    /// Only fails if fragmenting fails, which a valid store never causes.
    pub fn add_completed_activity(&mut self, activity: &Activity) -> Result<Vec<Fragment>> {
        let added = fragment(activity, self.max_fragment_duration)?;
        let at = self
            .fragments
            .partition_point(|f| f.start() <= activity.start());
        self.fragments.splice(at..at, added.iter().cloned());

        debug!(
            activity = activity.name(),
            fragments = added.len(),
            total = self.fragments.len(),
            "stored activity"
        );
        Ok(added)
    }
}

impl FragmentSource for MemoryStore {
    fn fragments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Fragment>> {
        ensure(start <= end, || {
            format!("The query start ({start}) must not be after the end ({end})")
        })?;

        // No fragment is longer than the maximum, so nothing starting earlier
        // can reach into the range.
        let lookback = start
            .checked_sub_signed(self.max_fragment_duration)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let first = self.fragments.partition_point(|f| f.start() < lookback);

        let mut found = Vec::new();
        for stored in self.fragments[first..].iter().take_while(|f| f.start() < end) {
            if stored.end() <= start {
                continue;
            }
            if stored.end() > end {
                let (head, _) = stored.split_at(end)?;
                found.push(head);
            } else {
                found.push(stored.clone());
            }
        }

        trace!(%start, %end, found = found.len(), "fragment range query");
        Ok(found)
    }
}
