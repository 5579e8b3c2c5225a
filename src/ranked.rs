//! Rank-ordered candidate lists.
//!
//! A [`RankedList`] keeps items in rank order: index 0 is the most relevant.
//! Rows that could not be resolved are kept as `None` placeholders so that
//! positions (and therefore percentiles) stay faithful to the source ranking.
//!
//! [`RankedList::random_window`] is the selection policy leaf elements use to
//! turn a difficulty into a slice of the ranking: the window is a percentile
//! range of *positions*, not of scores.

use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone)]
struct Ranked<T> {
    item: Option<T>,
    score: Option<f64>,
}

/// Ordered sequence where insertion order is rank order.
#[derive(Debug, Clone)]
pub struct RankedList<T> {
    entries: Vec<Ranked<T>>,
}

impl<T> Default for RankedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RankedList<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append the next-ranked item (or a placeholder for an unresolved row).
    pub fn append(&mut self, item: Option<T>) {
        self.entries.push(Ranked { item, score: None });
    }

    /// Append the next-ranked item together with its relevance score.
    pub fn append_scored(&mut self, item: Option<T>, score: f64) {
        self.entries.push(Ranked {
            item,
            score: Some(score),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, rank: usize) -> Option<&T> {
        self.entries.get(rank).and_then(|e| e.item.as_ref())
    }

    pub fn score(&self, rank: usize) -> Option<f64> {
        self.entries.get(rank).and_then(|e| e.score)
    }

    /// Number of non-placeholder items.
    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|e| e.item.is_some()).count()
    }

    /// Index bounds `[start, stop)` for a percentile window, scaled against
    /// the list length. Percentages above 100 are clamped.
    pub fn window_bounds(&self, start_percent: usize, stop_percent: usize) -> (usize, usize) {
        let len = self.entries.len();
        let start = len * start_percent.min(100) / 100;
        let stop = len * stop_percent.min(100) / 100;
        (start, stop.max(start))
    }
}

impl<T: Clone> RankedList<T> {
    /// Draw `count` distinct items uniformly at random from the
    /// `[start_percent, stop_percent)` window of positions.
    ///
    /// Placeholders are never returned. If the window holds fewer than
    /// `count` items, all of them are returned. Result order is random.
    pub fn random_window(&self, start_percent: usize, stop_percent: usize, count: usize) -> Vec<T> {
        self.random_window_with(&mut rand::thread_rng(), start_percent, stop_percent, count)
    }

    /// Same as [`random_window`](Self::random_window) with a caller-supplied RNG.
    pub fn random_window_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        start_percent: usize,
        stop_percent: usize,
        count: usize,
    ) -> Vec<T> {
        if count == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        let (start, stop) = self.window_bounds(start_percent, stop_percent);
        let candidates: Vec<&T> = self.entries[start..stop]
            .iter()
            .filter_map(|e| e.item.as_ref())
            .collect();

        candidates
            .choose_multiple(rng, count)
            .map(|item| (*item).clone())
            .collect()
    }
}

impl<T> FromIterator<Option<T>> for RankedList<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        let mut list = RankedList::new();
        for item in iter {
            list.append(item);
        }
        list
    }
}
