//! Weekly contributor activity aggregation.
//!
//! Folds per-repository contributor statistics into a single map from
//! week-start to the set of contributors active that week. The fold only
//! ever adds entries, so repositories can be folded in any order.

use crate::models::{ContributorId, ContributorStats, WeekBucket, WeeklyCount};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Week-start → distinct contributors with at least one commit that week.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyActivity {
    weeks: BTreeMap<WeekBucket, HashSet<ContributorId>>,
}

impl WeeklyActivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `contributor` active in `week`. Idempotent.
    pub fn record(&mut self, week: WeekBucket, contributor: ContributorId) {
        self.weeks.entry(week).or_default().insert(contributor);
    }

    /// Fold one repository's statistics in. Zero-commit weeks are ignored.
    ///
    /// Returns the number of active (contributor, week) entries seen.
    pub fn fold_repository(&mut self, stats: &[ContributorStats]) -> usize {
        let mut recorded = 0;

        for contributor in stats {
            let Some(author) = &contributor.author else {
                debug!(
                    "Skipping contributor without an account ({} commits)",
                    contributor.total
                );
                continue;
            };

            for week in contributor.active_weeks() {
                self.record(week.week, author.id);
                recorded += 1;
            }
        }

        recorded
    }

    /// Weeks in ascending timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = (&WeekBucket, &HashSet<ContributorId>)> {
        self.weeks.iter()
    }

    /// Number of weeks with any activity.
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Distinct contributor count per week, chronologically.
    pub fn weekly_counts(&self) -> Vec<WeeklyCount> {
        self.iter()
            .map(|(week, contributors)| WeeklyCount {
                week: *week,
                contributors: contributors.len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::mock::{contributor, week};

    fn week_set(activity: &WeeklyActivity, w: WeekBucket) -> Option<&HashSet<ContributorId>> {
        activity.iter().find(|(k, _)| **k == w).map(|(_, s)| s)
    }

    #[test]
    fn test_record_is_idempotent() {
        let mut once = WeeklyActivity::new();
        once.record(week(2024, 1, 7), 42);

        let mut many = WeeklyActivity::new();
        for _ in 0..5 {
            many.record(week(2024, 1, 7), 42);
        }

        assert_eq!(once, many);
        assert_eq!(week_set(&many, week(2024, 1, 7)).map(|s| s.len()), Some(1));
    }

    #[test]
    fn test_zero_commit_weeks_are_ignored() {
        let mut activity = WeeklyActivity::new();
        let stats = vec![
            contributor(1, &[(week(2024, 1, 7), 0), (week(2024, 1, 14), 3)]),
            contributor(2, &[(week(2024, 1, 7), 0)]),
        ];

        let recorded = activity.fold_repository(&stats);

        assert_eq!(recorded, 1);
        assert_eq!(activity.len(), 1);
        assert!(week_set(&activity, week(2024, 1, 7)).is_none());
        assert!(week_set(&activity, week(2024, 1, 14)).unwrap().contains(&1));
    }

    #[test]
    fn test_same_contributor_across_repositories_counts_once() {
        let mut activity = WeeklyActivity::new();
        activity.fold_repository(&[contributor(7, &[(week(2024, 2, 4), 1)])]);
        activity.fold_repository(&[contributor(7, &[(week(2024, 2, 4), 9)])]);

        assert_eq!(activity.weekly_counts()[0].contributors, 1);
    }

    #[test]
    fn test_fold_is_commutative() {
        let repos = vec![
            vec![
                contributor(1, &[(week(2023, 11, 5), 2), (week(2023, 11, 12), 1)]),
                contributor(2, &[(week(2023, 11, 5), 1)]),
            ],
            vec![contributor(2, &[(week(2023, 11, 12), 4), (week(2023, 12, 3), 1)])],
            vec![
                contributor(3, &[(week(2023, 12, 3), 0), (week(2024, 1, 7), 5)]),
                contributor(1, &[(week(2024, 1, 7), 1)]),
            ],
        ];

        let orders: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];

        let fold = |order: &[usize; 3]| {
            let mut activity = WeeklyActivity::new();
            for i in order {
                activity.fold_repository(&repos[*i]);
            }
            activity
        };

        let expected = fold(&orders[0]);
        for order in &orders[1..] {
            assert_eq!(fold(order), expected, "order {:?}", order);
        }
        assert_eq!(expected.len(), 4);
    }

    #[test]
    fn test_authorless_contributors_are_skipped() {
        let mut ghost = contributor(0, &[(week(2024, 3, 3), 4)]);
        ghost.author = None;

        let mut activity = WeeklyActivity::new();
        activity.fold_repository(&[ghost]);

        assert!(activity.is_empty());
    }

    #[test]
    fn test_weekly_counts_are_chronological() {
        let mut activity = WeeklyActivity::new();
        activity.record(week(2024, 3, 3), 1);
        activity.record(week(2023, 12, 31), 1);
        activity.record(week(2023, 12, 31), 2);

        let counts = activity.weekly_counts();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].week, week(2023, 12, 31));
        assert_eq!(counts[0].contributors, 2);
        assert_eq!(counts[1].week, week(2024, 3, 3));
    }
}
