//! Session state for feed synchronization.
//!
//! This module provides [`SessionState`], the single logical owner of the
//! displayed photo list and its pagination counters. All transitions are
//! pure methods - the engine drives them and performs the actual I/O.
//!
//! Every in-flight operation captures the session's generation number at
//! start and presents it back when it completes. A result whose captured
//! generation no longer matches is discarded, never applied. This is the
//! sole mechanism preventing a slow stale refresh from clobbering a newer
//! one, and preventing a stale page append from landing on a list that a
//! concurrent refresh already reset.

use std::collections::HashSet;

use photofeed_types::{FeedError, PhotoId, PhotoRecord};

/// Result of completing a refresh fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The result was applied to the session.
    Applied {
        /// Whether the displayed list actually changed (id-set diff).
        changed: bool,
    },
    /// The result belonged to a superseded generation and was dropped.
    Stale,
}

/// Result of a refresh fetch failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshFailure {
    /// The list was empty; the error is the primary UI state.
    Blocking,
    /// Stale data is still displayed; the error is non-blocking.
    Degraded,
    /// The failure belonged to a superseded generation and was dropped.
    Stale,
}

/// Result of completing a load-more fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    /// The page was applied to the session.
    Applied {
        /// How many records survived the duplicate filter and were appended.
        appended: usize,
    },
    /// The result belonged to a superseded generation and was dropped.
    Stale,
}

/// The session state owned by the sync engine.
///
/// Invariants:
/// - `photos` never contains two records with the same id
/// - `current_page` only advances for a fetch that is not rolled back
/// - at most one of `is_loading` / `is_loading_more` drives an in-flight
///   fetch per generation
#[derive(Debug, Clone)]
pub struct SessionState {
    photos: Vec<PhotoRecord>,
    current_page: u32,
    has_more: bool,
    is_loading: bool,
    is_loading_more: bool,
    last_error: Option<FeedError>,
    generation: u64,
}

impl SessionState {
    /// Create an empty session positioned at page 1.
    pub fn new() -> Self {
        Self {
            photos: Vec::new(),
            current_page: 1,
            has_more: true,
            is_loading: false,
            is_loading_more: false,
            last_error: None,
            generation: 0,
        }
    }

    /// The displayed photo list, in display order.
    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    /// The last page whose fetch was applied (1-based).
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Whether the feed may have further pages.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a refresh fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether a pagination fetch is in flight.
    pub fn is_loading_more(&self) -> bool {
        self.is_loading_more
    }

    /// The most recent blocking or pagination error, if any.
    pub fn last_error(&self) -> Option<&FeedError> {
        self.last_error.as_ref()
    }

    /// The current generation number.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a captured generation still matches the session.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Whether a record with the given id is displayed.
    pub fn contains(&self, id: &PhotoId) -> bool {
        self.photos.iter().any(|p| &p.id == id)
    }

    /// Start a full refresh.
    ///
    /// Advances the generation (superseding all in-flight operations),
    /// resets pagination, and marks the refresh fetch in flight. Returns
    /// the new generation for the caller to carry through the fetch.
    pub fn begin_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.current_page = 1;
        self.has_more = true;
        self.is_loading = true;
        // Any in-flight page fetch belongs to an older generation now;
        // its completion will be discarded, so release the gate here.
        self.is_loading_more = false;
        self.generation
    }

    /// Display cached records while the authoritative fetch is in flight.
    ///
    /// Only applies when the session is still on `generation` and the list
    /// is empty - cached data never overwrites displayed data. Returns
    /// whether the records became visible.
    pub fn paint_cached(&mut self, generation: u64, records: Vec<PhotoRecord>) -> bool {
        if !self.is_current(generation) || !self.photos.is_empty() || records.is_empty() {
            return false;
        }
        self.photos = dedup_by_id(records);
        true
    }

    /// Apply a successful refresh fetch.
    ///
    /// Replaces the displayed list wholesale when the fetched id-set
    /// differs from the displayed id-set; otherwise keeps the existing
    /// list untouched so identical re-fetches cause no churn.
    pub fn finish_refresh(
        &mut self,
        generation: u64,
        records: Vec<PhotoRecord>,
        per_page: u32,
    ) -> RefreshOutcome {
        if !self.is_current(generation) {
            return RefreshOutcome::Stale;
        }

        // Exhaustion is judged on the raw returned count; dedup only
        // shapes what gets displayed.
        self.has_more = records.len() >= per_page as usize;
        let records = dedup_by_id(records);
        self.last_error = None;
        self.is_loading = false;

        let changed = id_set(&records) != id_set(&self.photos);
        if changed {
            self.photos = records;
        }
        RefreshOutcome::Applied { changed }
    }

    /// Record a failed refresh fetch.
    ///
    /// The displayed list is kept as-is. The error becomes the blocking
    /// UI state only when there is nothing to display; otherwise the
    /// stale list stays up and the failure is reported non-blockingly.
    /// `current_page` and `has_more` are left untouched.
    pub fn fail_refresh(&mut self, generation: u64, error: FeedError) -> RefreshFailure {
        if !self.is_current(generation) {
            return RefreshFailure::Stale;
        }
        self.is_loading = false;
        if self.photos.is_empty() {
            self.last_error = Some(error);
            RefreshFailure::Blocking
        } else {
            RefreshFailure::Degraded
        }
    }

    /// Start a pagination fetch, if one is allowed.
    ///
    /// No-ops (returns `None`) when any fetch is already in flight or
    /// the feed is exhausted - at most one fetch drives the session per
    /// generation. Otherwise tentatively advances `current_page` and
    /// returns `(generation, page)` for the fetch.
    pub fn begin_load_more(&mut self) -> Option<(u64, u32)> {
        if self.is_loading || self.is_loading_more || !self.has_more {
            return None;
        }
        self.is_loading_more = true;
        self.current_page += 1;
        Some((self.generation, self.current_page))
    }

    /// Apply a successful pagination fetch.
    ///
    /// Records whose id is already displayed are filtered out (the feed
    /// may return overlapping pages); the remainder is appended in
    /// returned order.
    pub fn finish_load_more(
        &mut self,
        generation: u64,
        records: Vec<PhotoRecord>,
        per_page: u32,
    ) -> LoadMoreOutcome {
        if !self.is_current(generation) {
            return LoadMoreOutcome::Stale;
        }

        self.has_more = records.len() >= per_page as usize;
        self.last_error = None;
        self.is_loading_more = false;

        let existing: HashSet<&PhotoId> = self.photos.iter().map(|p| &p.id).collect();
        let mut fresh: Vec<PhotoRecord> = Vec::new();
        for record in records {
            if !existing.contains(&record.id) && !fresh.iter().any(|p: &PhotoRecord| p.id == record.id) {
                fresh.push(record);
            }
        }
        let appended = fresh.len();
        self.photos.extend(fresh);
        LoadMoreOutcome::Applied { appended }
    }

    /// Record a failed pagination fetch.
    ///
    /// Rolls back the tentative `current_page` advance, surfaces the
    /// error without clearing the displayed list, and leaves `has_more`
    /// unchanged. Returns whether the failure was applied (not stale).
    pub fn fail_load_more(&mut self, generation: u64, error: FeedError) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.current_page = self.current_page.saturating_sub(1).max(1);
        self.last_error = Some(error);
        self.is_loading_more = false;
        true
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop duplicate ids, keeping the first occurrence in order.
fn dedup_by_id(records: Vec<PhotoRecord>) -> Vec<PhotoRecord> {
    let mut seen: HashSet<PhotoId> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect()
}

fn id_set(records: &[PhotoRecord]) -> HashSet<&PhotoId> {
    records.iter().map(|r| &r.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn photo(id: u32) -> PhotoRecord {
        let url: Url = format!("https://picsum.photos/id/{id}/200/200")
            .parse()
            .unwrap();
        PhotoRecord {
            id: PhotoId::new(id.to_string()),
            author: format!("Author {id}"),
            width: 200,
            height: 200,
            url: url.clone(),
            download_url: url,
        }
    }

    fn photos(ids: impl IntoIterator<Item = u32>) -> Vec<PhotoRecord> {
        ids.into_iter().map(photo).collect()
    }

    fn ids(state: &SessionState) -> Vec<String> {
        state.photos().iter().map(|p| p.id.to_string()).collect()
    }

    // ===========================================
    // Refresh Tests
    // ===========================================

    #[test]
    fn starts_empty_at_page_one() {
        let state = SessionState::new();
        assert!(state.photos().is_empty());
        assert_eq!(state.current_page(), 1);
        assert!(state.has_more());
        assert!(!state.is_loading());
        assert!(state.last_error().is_none());
    }

    #[test]
    fn begin_refresh_advances_generation_and_resets_paging() {
        let mut state = SessionState::new();
        state.begin_load_more();
        assert_eq!(state.current_page(), 2);

        let generation = state.begin_refresh();
        assert_eq!(generation, 1);
        assert_eq!(state.current_page(), 1);
        assert!(state.has_more());
        assert!(state.is_loading());
        assert!(!state.is_loading_more());
    }

    #[test]
    fn finish_refresh_replaces_list_when_ids_differ() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();

        let outcome = state.finish_refresh(generation, photos(1..=3), 20);
        assert_eq!(outcome, RefreshOutcome::Applied { changed: true });
        assert_eq!(ids(&state), vec!["1", "2", "3"]);
        assert!(!state.is_loading());
        // 3 < 20: short page, feed exhausted.
        assert!(!state.has_more());
    }

    #[test]
    fn finish_refresh_keeps_list_when_id_set_unchanged() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        state.finish_refresh(generation, photos(1..=3), 3);

        let generation = state.begin_refresh();
        // Same ids, reversed order: id-set diff says unchanged.
        let outcome = state.finish_refresh(generation, photos((1..=3).rev()), 3);
        assert_eq!(outcome, RefreshOutcome::Applied { changed: false });
        assert_eq!(ids(&state), vec!["1", "2", "3"]);
    }

    #[test]
    fn finish_refresh_full_page_keeps_has_more() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        state.finish_refresh(generation, photos(1..=20), 20);
        assert!(state.has_more());
    }

    #[test]
    fn finish_refresh_judges_exhaustion_on_raw_count_not_deduped() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();

        // The feed returned a full page of 3, but one id twice.
        let mut records = photos(1..=2);
        records.push(photo(1));
        state.finish_refresh(generation, records, 3);

        assert_eq!(ids(&state), vec!["1", "2"]);
        assert!(state.has_more());
    }

    #[test]
    fn empty_first_page_is_terminal_not_error() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        let outcome = state.finish_refresh(generation, vec![], 20);

        assert_eq!(outcome, RefreshOutcome::Applied { changed: false });
        assert!(state.photos().is_empty());
        assert!(!state.has_more());
        assert!(state.last_error().is_none());
    }

    #[test]
    fn stale_refresh_result_is_dropped() {
        let mut state = SessionState::new();
        let first = state.begin_refresh();
        let second = state.begin_refresh();

        // Second (newer) load applies first.
        state.finish_refresh(second, photos(10..=12), 3);
        // The slow first load arrives afterwards and must be discarded.
        let outcome = state.finish_refresh(first, photos(1..=3), 3);

        assert_eq!(outcome, RefreshOutcome::Stale);
        assert_eq!(ids(&state), vec!["10", "11", "12"]);
    }

    #[test]
    fn fail_refresh_on_empty_list_is_blocking() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        let failure = state.fail_refresh(generation, FeedError::Network("offline".into()));

        assert_eq!(failure, RefreshFailure::Blocking);
        assert_eq!(
            state.last_error(),
            Some(&FeedError::Network("offline".into()))
        );
        assert!(!state.is_loading());
    }

    #[test]
    fn fail_refresh_with_stale_data_degrades_silently() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        state.finish_refresh(generation, photos(1..=3), 3);

        let generation = state.begin_refresh();
        let failure = state.fail_refresh(generation, FeedError::Network("offline".into()));

        assert_eq!(failure, RefreshFailure::Degraded);
        assert_eq!(ids(&state), vec!["1", "2", "3"]);
        assert!(state.last_error().is_none());
    }

    #[test]
    fn stale_refresh_failure_is_dropped() {
        let mut state = SessionState::new();
        let first = state.begin_refresh();
        let second = state.begin_refresh();
        state.finish_refresh(second, photos(1..=3), 3);

        let failure = state.fail_refresh(first, FeedError::Network("offline".into()));
        assert_eq!(failure, RefreshFailure::Stale);
        assert!(state.last_error().is_none());
    }

    // ===========================================
    // Cache Paint Tests
    // ===========================================

    #[test]
    fn cached_records_paint_an_empty_list() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();

        assert!(state.paint_cached(generation, photos(1..=5)));
        assert_eq!(ids(&state), vec!["1", "2", "3", "4", "5"]);
        // Paint is not authoritative: paging state untouched.
        assert!(state.has_more());
        assert!(state.is_loading());
    }

    #[test]
    fn cached_records_never_overwrite_displayed_data() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        state.finish_refresh(generation, photos(1..=3), 3);

        let generation = state.begin_refresh();
        assert!(!state.paint_cached(generation, photos(10..=12)));
        assert_eq!(ids(&state), vec!["1", "2", "3"]);
    }

    #[test]
    fn stale_cache_paint_is_dropped() {
        let mut state = SessionState::new();
        let first = state.begin_refresh();
        state.begin_refresh();
        assert!(!state.paint_cached(first, photos(1..=5)));
        assert!(state.photos().is_empty());
    }

    // ===========================================
    // Load More Tests
    // ===========================================

    #[test]
    fn begin_load_more_advances_page_tentatively() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        state.finish_refresh(generation, photos(1..=20), 20);

        let (captured, page) = state.begin_load_more().unwrap();
        assert_eq!(captured, generation);
        assert_eq!(page, 2);
        assert!(state.is_loading_more());
    }

    #[test]
    fn begin_load_more_noops_when_in_flight_or_exhausted() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        state.finish_refresh(generation, photos(1..=20), 20);

        assert!(state.begin_load_more().is_some());
        // Already in flight.
        assert!(state.begin_load_more().is_none());

        let mut exhausted = SessionState::new();
        let generation = exhausted.begin_refresh();
        exhausted.finish_refresh(generation, photos(1..=5), 20);
        assert!(!exhausted.has_more());
        assert!(exhausted.begin_load_more().is_none());

        // A refresh fetch in flight also blocks pagination.
        let mut refreshing = SessionState::new();
        refreshing.begin_refresh();
        assert!(refreshing.begin_load_more().is_none());
    }

    #[test]
    fn finish_load_more_filters_overlap_and_appends_in_order() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        state.finish_refresh(generation, photos(1..=20), 20);

        let (generation, _page) = state.begin_load_more().unwrap();
        // Page 2 overlaps 15..=20.
        let outcome = state.finish_load_more(generation, photos(15..=34), 20);

        assert_eq!(outcome, LoadMoreOutcome::Applied { appended: 14 });
        assert_eq!(state.photos().len(), 34);
        let expected: Vec<String> = (1..=34).map(|i| i.to_string()).collect();
        assert_eq!(ids(&state), expected);
        assert!(state.has_more());
        assert!(!state.is_loading_more());
    }

    #[test]
    fn photos_never_contain_duplicate_ids() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        state.finish_refresh(generation, photos(1..=20), 20);

        for _round in 0..3 {
            let (generation, _page) = state.begin_load_more().unwrap();
            // The feed keeps returning the same overlapping page.
            state.finish_load_more(generation, photos(10..=29), 20);
        }

        let mut unique: HashSet<String> = HashSet::new();
        for p in state.photos() {
            assert!(unique.insert(p.id.to_string()), "duplicate id {}", p.id);
        }
        assert_eq!(state.photos().len(), 29);
    }

    #[test]
    fn short_page_clears_has_more_and_stops_pagination() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        state.finish_refresh(generation, photos(1..=20), 20);

        let (generation, _page) = state.begin_load_more().unwrap();
        state.finish_load_more(generation, photos(21..=25), 20);

        assert!(!state.has_more());
        assert!(state.begin_load_more().is_none());
    }

    #[test]
    fn fail_load_more_rolls_back_page_and_keeps_list() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        state.finish_refresh(generation, photos(1..=20), 20);
        let (generation, _page) = state.begin_load_more().unwrap();
        state.finish_load_more(generation, photos(21..=40), 20);
        assert_eq!(state.current_page(), 2);

        let (generation, page) = state.begin_load_more().unwrap();
        assert_eq!(page, 3);
        let before = ids(&state);
        assert!(state.fail_load_more(generation, FeedError::Http {
            status: 500,
            message: "server".into(),
        }));

        assert_eq!(state.current_page(), 2);
        assert_eq!(ids(&state), before);
        assert!(state.has_more());
        assert!(matches!(state.last_error(), Some(FeedError::Http { .. })));
    }

    #[test]
    fn refresh_supersedes_in_flight_load_more() {
        let mut state = SessionState::new();
        let generation = state.begin_refresh();
        state.finish_refresh(generation, photos(1..=20), 20);
        let (lm_generation, _page) = state.begin_load_more().unwrap();

        // A refresh lands while the page fetch is in flight.
        let new_generation = state.begin_refresh();
        state.finish_refresh(new_generation, photos(100..=119), 20);

        let outcome = state.finish_load_more(lm_generation, photos(21..=40), 20);
        assert_eq!(outcome, LoadMoreOutcome::Stale);
        assert_eq!(state.photos().len(), 20);
        assert_eq!(state.photos()[0].id.to_string(), "100");
        // And the stale failure path is equally inert.
        assert!(!state.fail_load_more(lm_generation, FeedError::Network("x".into())));
    }
}
