//! Monthly distinct-contributor counts.

use super::aggregator::WeeklyActivity;
use crate::models::{ContributorId, MonthlyCount};
use chrono::Datelike;
use std::collections::HashSet;

/// Roll weekly activity up into one count per calendar month, oldest first.
///
/// A week belongs entirely to the month of its week-start label. Months
/// without any active week are not emitted.
pub fn monthly_counts(activity: &WeeklyActivity) -> Vec<MonthlyCount> {
    let mut counts = Vec::new();
    let mut current: Option<(i32, u32)> = None;
    let mut month_contributors: HashSet<ContributorId> = HashSet::new();

    // `iter` walks weeks by full timestamp, so year rollovers sort correctly.
    for (week, contributors) in activity.iter() {
        let key = (week.year(), week.month());

        match current {
            None => current = Some(key),
            Some(cur) if is_later_month(key, cur) => {
                counts.push(MonthlyCount::new(cur.0, cur.1, month_contributors.len()));
                month_contributors.clear();
                current = Some(key);
            }
            Some(_) => {}
        }

        month_contributors.extend(contributors.iter().copied());
    }

    if let Some((year, month)) = current {
        counts.push(MonthlyCount::new(year, month, month_contributors.len()));
    }

    counts
}

fn is_later_month((year, month): (i32, u32), (cur_year, cur_month): (i32, u32)) -> bool {
    year > cur_year || (year == cur_year && month > cur_month)
}
