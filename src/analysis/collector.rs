//! Sequential collection of contributor activity across repositories.

use super::aggregator::WeeklyActivity;
use crate::github::fetcher::{Clock, Sleeper};
use crate::github::{GitHubApi, StatsFetcher};
use crate::models::RunSummary;
use crate::repo::{parse_repo_reference, RepositorySet};
use indicatif::ProgressBar;
use tracing::{debug, error, info, warn};

/// Fetch every repository's statistics and fold them into `activity`.
///
/// Repositories are processed one at a time. Malformed references are
/// skipped and fetch failures are logged; neither stops the run. Log lines
/// are written with the progress bar suspended.
pub async fn collect_activity<A, C, S>(
    repos: &RepositorySet,
    fetcher: &StatsFetcher<'_, A, C, S>,
    activity: &mut WeeklyActivity,
    progress: &ProgressBar,
) -> RunSummary
where
    A: GitHubApi,
    C: Clock,
    S: Sleeper,
{
    let mut summary = RunSummary {
        repositories: repos.len(),
        ..RunSummary::default()
    };

    for reference in repos.iter() {
        progress.set_message(reference.to_string());

        let Some(path) = parse_repo_reference(reference) else {
            progress.suspend(|| warn!("Skipping malformed repository reference: {}", reference));
            summary.skipped += 1;
            progress.inc(1);
            continue;
        };

        debug!("Processing {}", path);

        match fetcher.fetch(&path.owner, &path.name).await {
            Ok(stats) => {
                let recorded = activity.fold_repository(&stats);
                progress.suspend(|| {
                    info!(
                        "{}: {} contributors, {} active weeks recorded",
                        path,
                        stats.len(),
                        recorded
                    )
                });
                summary.processed += 1;
            }
            Err(e) => {
                progress.suspend(|| error!("Failed to fetch statistics for {}: {}", path, e));
                summary.failed += 1;
            }
        }

        progress.inc(1);
    }

    summary
}
