// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

/// Statistics collected while solving a coverage problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchStatistics {
    /// Total `(grid, cursor)` states visited.
    pub nodes_explored: u64,
    /// Placements successfully applied to a grid.
    pub placements_applied: u64,
    /// Subtrees discarded because their bound could not beat the incumbent.
    pub prunings_bound: u64,
    /// Times a strictly better grid replaced the incumbent.
    pub improvements: u64,
    /// Independent jobs handed to workers or pool threads.
    pub jobs: u64,
    /// The deepest level reached in the search tree.
    pub max_depth: u64,
    /// Wall-clock time of the whole solve.
    pub time_total: Duration,
}

impl SearchStatistics {
    /// Adds the counters of `other` to `self`; depths take the maximum and
    /// the total time is left alone.
    #[inline]
    pub fn merge(&mut self, other: &SearchStatistics) {
        self.nodes_explored = self.nodes_explored.saturating_add(other.nodes_explored);
        self.placements_applied = self
            .placements_applied
            .saturating_add(other.placements_applied);
        self.prunings_bound = self.prunings_bound.saturating_add(other.prunings_bound);
        self.improvements = self.improvements.saturating_add(other.improvements);
        self.jobs = self.jobs.saturating_add(other.jobs);
        self.max_depth = self.max_depth.max(other.max_depth);
    }

    /// Overwrites the total time, e.g. with the wall time of a run whose
    /// counters were merged from several sources.
    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Coverage Search Statistics:")?;
        writeln!(f, "  Nodes explored:       {}", self.nodes_explored)?;
        writeln!(f, "  Placements applied:   {}", self.placements_applied)?;
        writeln!(f, "  Prunings (bound):     {}", self.prunings_bound)?;
        writeln!(f, "  Improvements:         {}", self.improvements)?;
        writeln!(f, "  Jobs:                 {}", self.jobs)?;
        writeln!(f, "  Max depth reached:    {}", self.max_depth)?;
        writeln!(f, "  Total time:           {:.2?}", self.time_total)?;
        Ok(())
    }
}

/// Thread-safe counters shared by every task of one solve.
#[derive(Debug, Default)]
pub struct StatisticsCollector {
    nodes_explored: AtomicU64,
    placements_applied: AtomicU64,
    prunings_bound: AtomicU64,
    improvements: AtomicU64,
    jobs: AtomicU64,
    max_depth: AtomicU64,
}

impl StatisticsCollector {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn on_node_explored(&self, depth: u64) {
        self.nodes_explored.fetch_add(1, Ordering::Relaxed);
        self.max_depth.fetch_max(depth, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_placement_applied(&self) {
        self.placements_applied.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_pruning_bound(&self) {
        self.prunings_bound.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_improvement(&self) {
        self.improvements.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_jobs(&self, count: u64) {
        self.jobs.fetch_add(count, Ordering::Relaxed);
    }

    /// Returns the current counters with the given total time.
    pub fn snapshot(&self, time_total: Duration) -> SearchStatistics {
        SearchStatistics {
            nodes_explored: self.nodes_explored.load(Ordering::Relaxed),
            placements_applied: self.placements_applied.load(Ordering::Relaxed),
            prunings_bound: self.prunings_bound.load(Ordering::Relaxed),
            improvements: self.improvements.load(Ordering::Relaxed),
            jobs: self.jobs.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
            time_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_counts_events() {
        let c = StatisticsCollector::new();
        c.on_node_explored(1);
        c.on_node_explored(4);
        c.on_node_explored(2);
        c.on_placement_applied();
        c.on_pruning_bound();
        c.on_improvement();
        c.on_jobs(3);

        let s = c.snapshot(Duration::from_millis(5));
        assert_eq!(s.nodes_explored, 3);
        assert_eq!(s.max_depth, 4);
        assert_eq!(s.placements_applied, 1);
        assert_eq!(s.prunings_bound, 1);
        assert_eq!(s.improvements, 1);
        assert_eq!(s.jobs, 3);
        assert_eq!(s.time_total, Duration::from_millis(5));
    }

    #[test]
    fn test_collector_is_shared_across_threads() {
        let c = StatisticsCollector::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..250 {
                        c.on_placement_applied();
                    }
                });
            }
        });
        assert_eq!(c.snapshot(Duration::ZERO).placements_applied, 1000);
    }

    #[test]
    fn test_merge_adds_counters_and_keeps_max_depth() {
        let mut a = SearchStatistics {
            nodes_explored: 10,
            max_depth: 3,
            jobs: 1,
            ..Default::default()
        };
        let b = SearchStatistics {
            nodes_explored: 5,
            max_depth: 7,
            improvements: 2,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.nodes_explored, 15);
        assert_eq!(a.max_depth, 7);
        assert_eq!(a.improvements, 2);
        assert_eq!(a.jobs, 1);
    }

    #[test]
    fn test_merge_keeps_time_until_set() {
        let mut a = SearchStatistics {
            time_total: Duration::from_millis(3),
            ..Default::default()
        };
        let b = SearchStatistics {
            time_total: Duration::from_millis(40),
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.time_total, Duration::from_millis(3));
        a.set_total_time(Duration::from_millis(50));
        assert_eq!(a.time_total, Duration::from_millis(50));
    }

    #[test]
    fn test_display_lists_counters() {
        let s = SearchStatistics {
            nodes_explored: 42,
            ..Default::default()
        };
        let text = s.to_string();
        assert!(text.contains("Coverage Search Statistics:"));
        assert!(text.contains("Nodes explored:       42"));
    }
}
