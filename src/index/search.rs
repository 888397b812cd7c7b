//! Search orchestration

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::codec::{deserialize_list, FindexKey, IndexedValue, Keyword, Label, Location};
use crate::config::{FindexConfig, DEFAULT_MAX_DEPTH};
use crate::error::{CodecError, IndexError, IndexResult};
use crate::traits::SearchRequest;

use super::results::{IntermediateResults, SearchResults};
use super::{summary, Findex};

/// How the results of several keywords are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalMode {
    /// Union, computed by the engine in a single call
    #[default]
    Or,
    /// Intersection, one engine call per keyword
    And,
}

impl fmt::Display for LogicalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalMode::Or => write!(f, "or"),
            LogicalMode::And => write!(f, "and"),
        }
    }
}

impl FromStr for LogicalMode {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "or" => Ok(LogicalMode::Or),
            "and" => Ok(LogicalMode::And),
            other => Err(IndexError::InvalidArgument(format!(
                "unknown logical mode: {}",
                other
            ))),
        }
    }
}

/// Called with the values discovered at each graph level; `false` stops the walk
pub type ProgressFn<'a> = &'a (dyn Fn(&IntermediateResults) -> bool + Send + Sync);

/// Search parameters
#[derive(Clone, Copy)]
pub struct SearchOptions<'a> {
    /// Chain rows read per keyword, 0 = unlimited
    pub max_results_per_keyword: usize,

    /// Keyword-to-keyword hops to follow
    pub max_depth: usize,

    pub mode: LogicalMode,

    /// Early-stop hook, scoped to a single engine call
    pub progress: Option<ProgressFn<'a>>,
}

impl Default for SearchOptions<'_> {
    fn default() -> Self {
        Self {
            max_results_per_keyword: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            mode: LogicalMode::Or,
            progress: None,
        }
    }
}

impl fmt::Debug for SearchOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOptions")
            .field("max_results_per_keyword", &self.max_results_per_keyword)
            .field("max_depth", &self.max_depth)
            .field("mode", &self.mode)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl<'a> SearchOptions<'a> {
    pub fn from_config(config: &FindexConfig) -> Self {
        Self {
            max_results_per_keyword: config.max_results_per_keyword,
            max_depth: config.max_depth,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: LogicalMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_results_per_keyword(mut self, max: usize) -> Self {
        self.max_results_per_keyword = max;
        self
    }

    pub fn with_progress<'b>(self, progress: ProgressFn<'b>) -> SearchOptions<'b>
    where
        'a: 'b,
    {
        SearchOptions {
            progress: Some(progress),
            ..self
        }
    }
}

/// Keep the first occurrence of each keyword, in input order
fn dedup_ordered(keywords: &[Keyword]) -> Vec<Keyword> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .filter(|k| seen.insert(*k))
        .cloned()
        .collect()
}

/// Decode an engine result list, keeping Locations only
///
/// Keyword-tagged values left over when the depth bound is hit are dropped.
pub(crate) fn strip_to_locations(serialized: &[u8]) -> IndexResult<Vec<Location>> {
    let mut locations = Vec::new();
    let mut dropped = 0usize;
    for bytes in deserialize_list(serialized)? {
        match IndexedValue::from_bytes(&bytes)? {
            IndexedValue::Location(location) => locations.push(location),
            IndexedValue::Keyword(_) => dropped += 1,
        }
    }
    if dropped > 0 {
        trace!(dropped, "Dropped unresolved keyword values");
    }
    Ok(locations)
}

impl Findex {
    /// Search `keywords`, combining them with `options.mode`
    ///
    /// Returns Locations only. In AND mode the first keyword's results seed
    /// the accumulator and each following keyword is intersected in, using
    /// byte-wise equality.
    pub async fn search(
        &self,
        search_key: &FindexKey,
        label: &Label,
        keywords: &[Keyword],
        options: &SearchOptions<'_>,
    ) -> IndexResult<HashSet<Location>> {
        let keywords = dedup_ordered(keywords);
        if keywords.is_empty() {
            return Ok(HashSet::new());
        }

        let locations: HashSet<Location> = match options.mode {
            LogicalMode::Or => self
                .search_once(search_key, label, &keywords, options)
                .await?
                .into_iter()
                .collect(),
            LogicalMode::And => {
                let mut accumulator: Option<HashSet<Location>> = None;
                for keyword in &keywords {
                    let found: HashSet<Location> = self
                        .search_once(search_key, label, std::slice::from_ref(keyword), options)
                        .await?
                        .into_iter()
                        .collect();
                    accumulator = Some(match accumulator {
                        None => found,
                        Some(mut acc) => {
                            acc.retain(|l| found.contains(l));
                            acc
                        }
                    });
                }
                accumulator.unwrap_or_default()
            }
        };

        summary!(
            self.config.verbose,
            keyword_count = keywords.len(),
            mode = %options.mode,
            found = locations.len(),
            "Search completed"
        );
        Ok(locations)
    }

    /// Search each keyword separately and keep results grouped by keyword
    pub async fn search_per_keyword(
        &self,
        search_key: &FindexKey,
        label: &Label,
        keywords: &[Keyword],
        options: &SearchOptions<'_>,
    ) -> IndexResult<SearchResults> {
        let mut groups = Vec::new();
        for keyword in dedup_ordered(keywords) {
            let locations = self
                .search_once(search_key, label, std::slice::from_ref(&keyword), options)
                .await?;
            groups.push((keyword, locations));
        }
        Ok(SearchResults::new(groups))
    }

    /// One engine search call over `keywords`
    async fn search_once(
        &self,
        search_key: &FindexKey,
        label: &Label,
        keywords: &[Keyword],
        options: &SearchOptions<'_>,
    ) -> IndexResult<Vec<Location>> {
        let decode_error: Mutex<Option<CodecError>> = Mutex::new(None);
        let user_progress = options.progress;

        let progress = |serialized: &[u8]| -> bool {
            let Some(callback) = user_progress else {
                return true;
            };
            match IntermediateResults::from_serialized(serialized) {
                Ok(results) => callback(&results),
                Err(e) => {
                    if let Ok(mut slot) = decode_error.lock() {
                        slot.get_or_insert(e);
                    }
                    false
                }
            }
        };

        let request = SearchRequest {
            search_key,
            label,
            keywords,
            max_results_per_keyword: options.max_results_per_keyword,
            max_depth: options.max_depth,
        };

        let serialized = self
            .engine
            .search(request, &progress, &self.relay)
            .await
            .map_err(IndexError::from_search)?;

        if let Some(e) = decode_error.lock().ok().and_then(|mut slot| slot.take()) {
            return Err(e.into());
        }

        strip_to_locations(&serialized)
    }
}
