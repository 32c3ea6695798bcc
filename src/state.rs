use std::collections::HashSet;

use crate::types::Submission;

/// The tracker's working set: submissions currently being followed.
///
/// Entries keep the order they were first seen in. Membership is keyed by
/// submission id, so the same id is never tracked twice.
#[derive(Debug, Default)]
pub struct WorkingSet {
    entries: Vec<Submission>,
    ids: HashSet<String>,
    pub total_added: u64,
    pub total_evicted: u64,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<&Submission> {
        if !self.contains(id) {
            return None;
        }
        self.entries.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Submission> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Submission> {
        self.entries.iter_mut()
    }

    /// Add every submission whose id is not already tracked.
    ///
    /// Tracked submissions are left untouched; their vote state is refreshed
    /// separately. Returns how many were added.
    pub fn merge<I>(&mut self, fetched: I) -> usize
    where
        I: IntoIterator<Item = Submission>,
    {
        let before = self.entries.len();
        for submission in fetched {
            if self.ids.insert(submission.id.clone()) {
                self.entries.push(submission);
            }
        }
        let added = self.entries.len() - before;
        self.total_added += added as u64;
        added
    }

    /// Remove every submission whose age at `now` is at least `max_age_secs`.
    ///
    /// Returns the removed submissions in working-set order.
    pub fn evict(&mut self, now: f64, max_age_secs: f64) -> Vec<Submission> {
        let (stale, fresh): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|s| s.age_secs(now) >= max_age_secs);
        self.entries = fresh;
        for submission in &stale {
            self.ids.remove(&submission.id);
        }
        self.total_evicted += stale.len() as u64;
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MAX_AGE_SECS;

    fn sub(id: &str, created_utc: f64, score: i64) -> Submission {
        Submission {
            id: id.to_string(),
            created_utc,
            score,
            upvote_ratio: 0.5,
            permalink: format!("/r/test/comments/{id}/post/"),
        }
    }

    fn ids(set: &WorkingSet) -> Vec<&str> {
        set.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn merge_adds_in_fetch_order() {
        let mut set = WorkingSet::new();
        let added = set.merge(vec![sub("a", 0.0, 1), sub("b", 0.0, 2)]);
        assert_eq!(added, 2);
        assert_eq!(ids(&set), vec!["a", "b"]);
    }

    #[test]
    fn merge_skips_duplicates_within_one_fetch() {
        let mut set = WorkingSet::new();
        let added = set.merge(vec![sub("a", 0.0, 1), sub("a", 0.0, 9)]);
        assert_eq!(added, 1);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a").unwrap().score, 1);
    }

    #[test]
    fn merge_leaves_tracked_entries_untouched() {
        let mut set = WorkingSet::new();
        set.merge(vec![sub("c", 0.0, 3)]);
        let added = set.merge(vec![sub("d", 0.0, 1), sub("c", 0.0, 50)]);
        assert_eq!(added, 1);
        assert_eq!(ids(&set), vec!["c", "d"]);
        assert_eq!(set.get("c").unwrap().score, 3);
        assert_eq!(set.total_added, 2);
    }

    #[test]
    fn evict_at_exactly_max_age() {
        let now = 100_000.0;
        let mut set = WorkingSet::new();
        set.merge(vec![
            sub("old", now - MAX_AGE_SECS, 1),
            sub("young", now - MAX_AGE_SECS + 1.0, 1),
            sub("older", now - MAX_AGE_SECS - 3600.0, 1),
        ]);
        let evicted = set.evict(now, MAX_AGE_SECS);
        let evicted_ids: Vec<_> = evicted.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(evicted_ids, vec!["old", "older"]);
        assert_eq!(ids(&set), vec!["young"]);
        assert!(!set.contains("old"));
        assert_eq!(set.total_evicted, 2);
    }

    #[test]
    fn evicted_id_can_be_tracked_again() {
        let mut set = WorkingSet::new();
        set.merge(vec![sub("a", 0.0, 1)]);
        set.evict(MAX_AGE_SECS, MAX_AGE_SECS);
        assert!(set.is_empty());
        assert_eq!(set.merge(vec![sub("a", 0.0, 1)]), 1);
    }

    #[test]
    fn evict_on_empty_set() {
        let mut set = WorkingSet::new();
        assert!(set.evict(0.0, MAX_AGE_SECS).is_empty());
    }
}
