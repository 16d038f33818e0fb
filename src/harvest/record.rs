//! Repository record model
//!
//! Serde models mirroring the GitHub wire format, plus the assembled [`Record`]
//! that gets persisted into snapshot batches. Field names match the API exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of a `/repositories` collection page.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoStub {
    pub id: u64,
    pub name: String,
    pub owner: StubOwner,
}

/// Owner block of a [`RepoStub`]
#[derive(Debug, Clone, Deserialize)]
pub struct StubOwner {
    pub login: String,
}

/// Full repository profile with only the fields we keep
#[derive(Debug, Clone, Deserialize)]
pub struct RepoProfile {
    pub id: u64,
    pub full_name: Option<String>,
    pub url: Option<String>,
    pub homepage: Option<String>,
    pub git_url: Option<String>,
    pub stargazers_count: Option<u64>,
    pub watchers_count: Option<u64>,
    #[serde(default)]
    pub subscribers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub size: Option<u64>,
    #[serde(default)]
    pub fork: bool,
    pub open_issues_count: Option<u64>,
    pub has_issues: Option<bool>,
    pub has_wiki: Option<bool>,
    pub has_downloads: Option<bool>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub network_count: Option<u64>,
    #[serde(default)]
    pub parent: Option<LineageRepo>,
    #[serde(default)]
    pub source: Option<LineageRepo>,
}

/// Abbreviated ancestry record attached to forks whose lineage differs from themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageRepo {
    pub id: u64,
    #[serde(default)]
    pub fork: bool,
    pub forks_count: Option<u64>,
    pub stargazers_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub open_issues_count: Option<u64>,
}

/// One contributor summary from the contributors endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: Option<String>,
    pub id: Option<u64>,
    pub contributions: Option<u64>,
}

/// Weekly commit counts over the rolling 52-week participation window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub all: Vec<u64>,
    pub owner: Vec<u64>,
}

/// One `[week, additions, deletions]` triple from the code frequency endpoint.
///
/// Serialized as a three-element JSON array, exactly as the API delivers it.
/// Triples arrive in chronological order and the reducer depends on that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyDelta(pub i64, pub i64, pub i64);

impl WeeklyDelta {
    /// Lines added this week
    #[must_use]
    pub const fn added(&self) -> i64 {
        self.1
    }

    /// Lines subtracted this week (delivered as a negative count)
    #[must_use]
    pub const fn subtracted(&self) -> i64 {
        self.2
    }
}

/// One fully assembled repository entry, as persisted in snapshot batches.
///
/// Identity fields are always present; the nested blocks are omitted from the
/// serialized form when the corresponding sub-fetch produced nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub owner: String,
    pub name: String,
    pub full_name: Option<String>,
    pub url: Option<String>,
    pub homepage: Option<String>,
    pub git_url: Option<String>,
    pub stargazers_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub subscribers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub size: Option<u64>,
    pub fork: bool,
    pub open_issues_count: Option<u64>,
    pub has_issues: Option<bool>,
    pub has_wiki: Option<bool>,
    pub has_downloads: Option<bool>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub network_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributors: Option<Vec<Contributor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participation: Option<Participation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<BTreeMap<String, u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_frequency: Option<Vec<WeeklyDelta>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<LineageRepo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<LineageRepo>,
}

impl Record {
    /// Build a record from a repository's full profile, with all nested blocks empty.
    #[must_use]
    pub fn from_profile(owner: &str, name: &str, profile: &RepoProfile) -> Self {
        Self {
            id: profile.id,
            owner: owner.to_string(),
            name: name.to_string(),
            full_name: profile.full_name.clone(),
            url: profile.url.clone(),
            homepage: profile.homepage.clone(),
            git_url: profile.git_url.clone(),
            stargazers_count: profile.stargazers_count,
            watchers_count: profile.watchers_count,
            subscribers_count: profile.subscribers_count,
            forks_count: profile.forks_count,
            size: profile.size,
            fork: profile.fork,
            open_issues_count: profile.open_issues_count,
            has_issues: profile.has_issues,
            has_wiki: profile.has_wiki,
            has_downloads: profile.has_downloads,
            pushed_at: profile.pushed_at,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
            network_count: profile.network_count,
            contributors: None,
            participation: None,
            languages: None,
            code_frequency: None,
            parent: None,
            source: None,
        }
    }
}

/// Lineage blocks worth attaching to a fork: the parent only when it differs from
/// the repository itself, the ultimate source only when it differs from the parent.
#[must_use]
pub fn distinct_lineage(profile: &RepoProfile) -> (Option<LineageRepo>, Option<LineageRepo>) {
    if !profile.fork {
        return (None, None);
    }

    let parent = profile.parent.as_ref().filter(|p| p.id != profile.id);

    let parent_id = profile.parent.as_ref().map_or(profile.id, |p| p.id);
    let source = profile.source.as_ref().filter(|s| s.id != parent_id);

    (parent.cloned(), source.cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_json(fork: bool, parent_id: u64, source_id: u64) -> String {
        format!(
            r#"{{
                "id": 1,
                "full_name": "octocat/spoon",
                "url": "https://api.github.com/repos/octocat/spoon",
                "homepage": null,
                "git_url": "git://github.com/octocat/spoon.git",
                "stargazers_count": 5,
                "watchers_count": 5,
                "subscribers_count": 2,
                "forks_count": 1,
                "size": 12,
                "fork": {fork},
                "open_issues_count": 0,
                "has_issues": true,
                "has_wiki": false,
                "has_downloads": true,
                "pushed_at": "2015-03-04T05:06:07Z",
                "created_at": "2014-01-02T03:04:05Z",
                "updated_at": "2015-03-04T05:06:07Z",
                "network_count": 3,
                "parent": {{"id": {parent_id}, "fork": false, "forks_count": 9, "stargazers_count": 100, "watchers_count": 100, "open_issues_count": 4}},
                "source": {{"id": {source_id}, "fork": false, "forks_count": 9, "stargazers_count": 100, "watchers_count": 100, "open_issues_count": 4}}
            }}"#
        )
    }

    #[test]
    fn profile_deserialize() {
        let profile: RepoProfile = serde_json::from_str(&profile_json(true, 2, 3)).unwrap();
        assert_eq!(profile.id, 1);
        assert!(profile.fork);
        assert_eq!(profile.pushed_at.unwrap().timestamp(), 1_425_445_567);
        assert_eq!(profile.parent.as_ref().unwrap().id, 2);
        assert_eq!(profile.source.as_ref().unwrap().id, 3);
    }

    #[test]
    fn profile_deserialize_minimal() {
        // Abandoned repositories come back with null timestamps and no lineage
        let profile: RepoProfile = serde_json::from_str(
            r#"{"id": 7, "full_name": null, "url": null, "homepage": null, "git_url": null,
                "stargazers_count": 0, "watchers_count": 0, "forks_count": 0, "size": 0,
                "fork": false, "open_issues_count": 0, "has_issues": true, "has_wiki": true,
                "has_downloads": true, "pushed_at": null, "created_at": null, "updated_at": null}"#,
        )
        .unwrap();
        assert_eq!(profile.id, 7);
        assert!(profile.pushed_at.is_none());
        assert!(profile.parent.is_none());
        assert!(profile.network_count.is_none());
    }

    #[test]
    fn weekly_delta_is_wire_array() {
        let delta: WeeklyDelta = serde_json::from_str("[1362182400, 10, -3]").unwrap();
        assert_eq!(delta.added(), 10);
        assert_eq!(delta.subtracted(), -3);

        assert_eq!(serde_json::to_string(&delta).unwrap(), "[1362182400,10,-3]");
    }

    #[test]
    fn lineage_both_distinct() {
        let profile: RepoProfile = serde_json::from_str(&profile_json(true, 2, 3)).unwrap();
        let (parent, source) = distinct_lineage(&profile);
        assert_eq!(parent.unwrap().id, 2);
        assert_eq!(source.unwrap().id, 3);
    }

    #[test]
    fn lineage_parent_is_self() {
        let profile: RepoProfile = serde_json::from_str(&profile_json(true, 1, 3)).unwrap();
        let (parent, source) = distinct_lineage(&profile);
        assert!(parent.is_none());
        assert_eq!(source.unwrap().id, 3);
    }

    #[test]
    fn lineage_source_matches_parent() {
        let profile: RepoProfile = serde_json::from_str(&profile_json(true, 2, 2)).unwrap();
        let (parent, source) = distinct_lineage(&profile);
        assert_eq!(parent.unwrap().id, 2);
        assert!(source.is_none());
    }

    #[test]
    fn lineage_ignored_for_non_forks() {
        let profile: RepoProfile = serde_json::from_str(&profile_json(false, 2, 3)).unwrap();
        assert_eq!(distinct_lineage(&profile), (None, None));
    }

    #[test]
    fn record_skips_empty_blocks() {
        let profile: RepoProfile = serde_json::from_str(&profile_json(false, 2, 3)).unwrap();
        let record = Record::from_profile("octocat", "spoon", &profile);

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("contributors"));
        assert!(!json.contains("participation"));
        assert!(!json.contains("code_frequency"));
    }

    #[test]
    fn record_round_trips() {
        let profile: RepoProfile = serde_json::from_str(&profile_json(true, 2, 3)).unwrap();
        let mut record = Record::from_profile("octocat", "spoon", &profile);
        record.contributors = Some(vec![Contributor {
            login: Some("octocat".to_string()),
            id: Some(583_231),
            contributions: Some(32),
        }]);
        record.participation = Some(Participation { all: vec![1, 2, 3], owner: vec![0, 1, 1] });
        record.languages = Some([("Go".to_string(), 300u64), ("Python".to_string(), 100u64)].into_iter().collect());
        record.code_frequency = Some(vec![WeeklyDelta(0, 10, -3), WeeklyDelta(1, 0, 0)]);
        let (parent, source) = distinct_lineage(&profile);
        record.parent = parent;
        record.source = source;

        let json = serde_json::to_string_pretty(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, record.id);
        assert_eq!(back.contributors, record.contributors);
        assert_eq!(back.participation, record.participation);
        assert_eq!(back.languages, record.languages);
        assert_eq!(back.code_frequency, record.code_frequency);
        assert_eq!(back.parent, record.parent);
        assert_eq!(back.source, record.source);
        assert_eq!(back.pushed_at, record.pushed_at);
    }
}
