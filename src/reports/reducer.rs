//! Record reduction
//!
//! Deterministically flattens one stored [`Record`] into a [`Row`], computing the
//! activity-derived fields from the nested blocks.

use super::row::Row;
use crate::harvest::record::{Participation, Record, WeeklyDelta};
use std::collections::BTreeMap;

/// Star count at or above which a repository counts as popular.
const POPULAR_STARS_THRESHOLD: u64 = 100;

/// Length of the rolling participation window, in weeks.
const PARTICIPATION_WEEKS: f64 = 52.0;

/// Flatten one record into an output row.
#[must_use]
pub fn reduce(record: &Record) -> Row {
    let changes = summarize_changes(record.code_frequency.as_deref());
    let commits = summarize_commits(record.participation.as_ref());
    let (lang0, lang1, lang0_prop) = top_languages(record.languages.as_ref());

    Row {
        id: record.id,
        owner: record.owner.clone(),
        name: record.name.clone(),
        size: record.size,
        has_downloads: record.has_downloads,
        has_issues: record.has_issues,
        has_wiki: record.has_wiki,
        forks_count: record.forks_count,
        network_count: record.network_count,
        stargazers_count: record.stargazers_count,
        subscribers_count: record.subscribers_count,
        watchers_count: record.watchers_count,
        open_issues_count: record.open_issues_count,
        fork: record.fork,
        created_at: record.created_at,
        updated_at: record.updated_at,
        pushed_at: record.pushed_at,
        num_contributors: record.contributors.as_ref().map_or(0, |c| c.len() as u64),
        num_weeks: changes.num_weeks,
        lines_added: changes.added,
        lines_added_per_week: changes.added_per_week,
        lines_subtracted: changes.subtracted,
        lines_subtracted_per_week: changes.subtracted_per_week,
        num_weeks_since_change: changes.weeks_since_change,
        all_commits: commits.all,
        owner_commits: commits.owner,
        owner_commits_percentage: commits.owner_percentage,
        mean_commits_per_week: commits.mean_per_week,
        std_commits_per_week: commits.std_per_week,
        popular: record.stargazers_count.unwrap_or(0) >= POPULAR_STARS_THRESHOLD,
        lang0,
        lang1,
        lang0_prop,
    }
}

/// Summary of week-over-week code changes.
#[derive(Debug, Default)]
struct ChangeSummary {
    added: i64,
    subtracted: i64,
    num_weeks: u64,
    weeks_since_change: u64,
    added_per_week: f64,
    subtracted_per_week: f64,
}

/// Forward scan over the chronological code frequency triples.
///
/// The weeks-since-change counter resets to zero on any week with activity and
/// increments otherwise, so scan order matters.
#[expect(clippy::cast_precision_loss, reason = "acceptable for per-week averages")]
fn summarize_changes(weeks: Option<&[WeeklyDelta]>) -> ChangeSummary {
    let Some(weeks) = weeks else {
        return ChangeSummary::default();
    };

    let mut summary = ChangeSummary::default();
    for week in weeks {
        summary.added += week.added();
        summary.subtracted += week.subtracted();
        if week.added() != 0 || week.subtracted() != 0 {
            summary.weeks_since_change = 0;
        } else {
            summary.weeks_since_change += 1;
        }
    }

    summary.num_weeks = weeks.len() as u64;
    if summary.num_weeks > 0 {
        summary.added_per_week = summary.added as f64 / summary.num_weeks as f64;
        summary.subtracted_per_week = summary.subtracted as f64 / summary.num_weeks as f64;
    }

    summary
}

/// Summary of the participation commit sequences.
#[derive(Debug, Default)]
struct CommitSummary {
    all: u64,
    owner: u64,
    owner_percentage: f64,
    mean_per_week: f64,
    std_per_week: f64,
}

#[expect(clippy::cast_precision_loss, reason = "acceptable for statistics")]
fn summarize_commits(participation: Option<&Participation>) -> CommitSummary {
    let Some(participation) = participation else {
        return CommitSummary::default();
    };

    let all: u64 = participation.all.iter().sum();
    let owner: u64 = participation.owner.iter().sum();

    CommitSummary {
        all,
        owner,
        // Guard the all-commits denominator; a quiet year is not an error.
        owner_percentage: if all == 0 { 0.0 } else { 100.0 * owner as f64 / all as f64 },
        mean_per_week: all as f64 / PARTICIPATION_WEEKS,
        std_per_week: population_std_dev(&participation.all),
    }
}

/// Population standard deviation, with an empty sequence yielding zero.
#[expect(clippy::cast_precision_loss, reason = "acceptable for statistics")]
fn population_std_dev(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<u64>() as f64 / n;
    let variance = values
        .iter()
        .map(|&v| {
            let delta = v as f64 - mean;
            delta * delta
        })
        .sum::<f64>()
        / n;

    variance.sqrt()
}

/// Top two languages by byte count (ties broken by name) and the leading
/// language's share of total bytes.
#[expect(clippy::cast_precision_loss, reason = "acceptable for proportions")]
fn top_languages(languages: Option<&BTreeMap<String, u64>>) -> (String, String, f64) {
    let Some(languages) = languages.filter(|l| !l.is_empty()) else {
        return (String::new(), String::new(), 0.0);
    };

    let mut by_size: Vec<(&String, &u64)> = languages.iter().collect();
    by_size.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let total: u64 = languages.values().sum();
    let lang0 = by_size[0].0.clone();
    let lang1 = by_size.get(1).map(|(name, _)| (*name).clone()).unwrap_or_default();
    let lang0_prop = if total == 0 { 0.0 } else { *by_size[0].1 as f64 / total as f64 };

    (lang0, lang1, lang0_prop)
}
