//! CSV generation

use super::reducer::reduce;
use super::row::HEADER;
use crate::harvest::record::Record;
use ohno::IntoAppError;
use std::io::Write;

/// Write the header row plus one flattened row per record.
pub fn generate<W: Write>(records: &[Record], out: W) -> crate::Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    writer.write_record(HEADER).into_app_err("writing CSV header")?;

    for record in records {
        let row = reduce(record);
        writer.write_record(row.fields()).into_app_err("writing CSV row")?;
    }

    writer.flush().into_app_err("flushing CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::record::{Participation, RepoProfile, WeeklyDelta};

    fn record() -> Record {
        let profile: RepoProfile = serde_json::from_str(
            r#"{"id": 1296269, "full_name": "octocat/hello", "url": null, "homepage": null,
                "git_url": null, "stargazers_count": 120, "watchers_count": 120,
                "subscribers_count": 12, "forks_count": 9, "size": 108, "fork": false,
                "open_issues_count": 0, "has_issues": true, "has_wiki": true,
                "has_downloads": true, "pushed_at": "2015-03-04T05:06:07Z",
                "created_at": "2011-01-26T19:01:12Z", "updated_at": "2015-03-04T05:06:07Z",
                "network_count": 9}"#,
        )
        .unwrap();
        let mut record = Record::from_profile("octocat", "hello", &profile);
        record.participation = Some(Participation { all: vec![2, 2], owner: vec![1, 1] });
        record.code_frequency = Some(vec![WeeklyDelta(0, 10, -3), WeeklyDelta(1, 0, 0)]);
        record.languages = Some([("Go".to_string(), 300u64), ("Python".to_string(), 100u64)].into_iter().collect());
        record
    }

    #[test]
    fn emits_header_and_rows() {
        let mut out = Vec::new();
        generate(&[record()], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("id,owner,name,size,"));
        assert!(header.ends_with("popular,lang0,lang1,lang0_prop"));

        let row = lines.next().unwrap();
        assert!(row.starts_with("1296269,octocat,hello,108,1,1,1,9,9,120,12,120,0,0,"));
        assert!(row.contains("01/26/2011"));
        assert!(row.ends_with(",1,Go,Python,0.75"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_input_emits_header_only() {
        let mut out = Vec::new();
        generate(&[], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
