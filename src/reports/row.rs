//! Flattened output row
//!
//! One row per repository record, fields in the fixed declared order of
//! [`HEADER`]. Booleans render as literal `0`/`1`, dates as `MM/DD/YYYY`, and
//! absent values as empty strings.

use chrono::{DateTime, Utc};

/// Column names, in output order.
pub const HEADER: &[&str] = &[
    "id",
    "owner",
    "name",
    "size",
    "has_downloads",
    "has_issues",
    "has_wiki",
    "forks_count",
    "network_count",
    "stargazers_count",
    "subscribers_count",
    "watchers_count",
    "open_issues_count",
    "fork",
    "created_at",
    "updated_at",
    "pushed_at",
    "num_contributors",
    "num_weeks",
    "lines_added",
    "lines_added_per_week",
    "lines_subtracted",
    "lines_subtracted_per_week",
    "num_weeks_since_change",
    "all_commits",
    "owner_commits",
    "owner_commits_percentage",
    "mean_commits_per_week",
    "std_commits_per_week",
    "popular",
    "lang0",
    "lang1",
    "lang0_prop",
];

/// One flattened repository row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: u64,
    pub owner: String,
    pub name: String,
    pub size: Option<u64>,
    pub has_downloads: Option<bool>,
    pub has_issues: Option<bool>,
    pub has_wiki: Option<bool>,
    pub forks_count: Option<u64>,
    pub network_count: Option<u64>,
    pub stargazers_count: Option<u64>,
    pub subscribers_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub fork: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub num_contributors: u64,
    pub num_weeks: u64,
    pub lines_added: i64,
    pub lines_added_per_week: f64,
    pub lines_subtracted: i64,
    pub lines_subtracted_per_week: f64,
    pub num_weeks_since_change: u64,
    pub all_commits: u64,
    pub owner_commits: u64,
    pub owner_commits_percentage: f64,
    pub mean_commits_per_week: f64,
    pub std_commits_per_week: f64,
    pub popular: bool,
    pub lang0: String,
    pub lang1: String,
    pub lang0_prop: f64,
}

/// Render an optional count, with absence as an empty field.
fn count(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render an optional boolean as `0`/`1`, with absence as an empty field.
fn flag(value: Option<bool>) -> String {
    value.map(|v| if v { "1" } else { "0" }.to_string()).unwrap_or_default()
}

/// Render an optional timestamp as `MM/DD/YYYY`, with absence as an empty field.
fn date(value: Option<DateTime<Utc>>) -> String {
    value.map(|v| v.format("%m/%d/%Y").to_string()).unwrap_or_default()
}

impl Row {
    /// Field values in [`HEADER`] order.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.owner.clone(),
            self.name.clone(),
            count(self.size),
            flag(self.has_downloads),
            flag(self.has_issues),
            flag(self.has_wiki),
            count(self.forks_count),
            count(self.network_count),
            count(self.stargazers_count),
            count(self.subscribers_count),
            count(self.watchers_count),
            count(self.open_issues_count),
            flag(Some(self.fork)),
            date(self.created_at),
            date(self.updated_at),
            date(self.pushed_at),
            self.num_contributors.to_string(),
            self.num_weeks.to_string(),
            self.lines_added.to_string(),
            self.lines_added_per_week.to_string(),
            self.lines_subtracted.to_string(),
            self.lines_subtracted_per_week.to_string(),
            self.num_weeks_since_change.to_string(),
            self.all_commits.to_string(),
            self.owner_commits.to_string(),
            self.owner_commits_percentage.to_string(),
            self.mean_commits_per_week.to_string(),
            self.std_commits_per_week.to_string(),
            flag(Some(self.popular)),
            self.lang0.clone(),
            self.lang1.clone(),
            self.lang0_prop.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_match_header_arity() {
        let row = Row {
            id: 1,
            owner: "o".to_string(),
            name: "r".to_string(),
            size: Some(10),
            has_downloads: Some(true),
            has_issues: Some(false),
            has_wiki: None,
            forks_count: Some(2),
            network_count: None,
            stargazers_count: Some(3),
            subscribers_count: Some(4),
            watchers_count: Some(5),
            open_issues_count: Some(6),
            fork: false,
            created_at: None,
            updated_at: None,
            pushed_at: None,
            num_contributors: 0,
            num_weeks: 0,
            lines_added: 0,
            lines_added_per_week: 0.0,
            lines_subtracted: 0,
            lines_subtracted_per_week: 0.0,
            num_weeks_since_change: 0,
            all_commits: 0,
            owner_commits: 0,
            owner_commits_percentage: 0.0,
            mean_commits_per_week: 0.0,
            std_commits_per_week: 0.0,
            popular: false,
            lang0: String::new(),
            lang1: String::new(),
            lang0_prop: 0.0,
        };

        assert_eq!(row.fields().len(), HEADER.len());
    }

    #[test]
    fn booleans_render_as_bits() {
        assert_eq!(flag(Some(true)), "1");
        assert_eq!(flag(Some(false)), "0");
        assert_eq!(flag(None), "");
    }

    #[test]
    fn dates_render_month_first() {
        let ts = DateTime::parse_from_rfc3339("2015-03-04T05:06:07Z").unwrap().to_utc();
        assert_eq!(date(Some(ts)), "03/04/2015");
        assert_eq!(date(None), "");
    }

    #[test]
    fn absent_counts_render_empty() {
        assert_eq!(count(Some(42)), "42");
        assert_eq!(count(None), "");
    }
}
