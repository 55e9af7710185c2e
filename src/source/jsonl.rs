use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info};

use crate::constants::source::DERIVED_ID_PREFIX;
use crate::data::{Award, ProjectRecord};
use crate::errors::SamplerError;
use crate::hash::stable_hash_str;
use crate::source::ProjectSource;
use crate::source::awards::AwardMapping;
use crate::transport::fs::FileStream;
use crate::types::{Description, PrizeName, ProjectId, ProjectUrl};
use crate::utils::is_blank;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProject {
    Scraped {
        #[serde(default)]
        id: Option<ProjectId>,
        #[serde(default)]
        project_url: Option<ProjectUrl>,
        parsed_content: ParsedContent,
        #[serde(default)]
        award: Option<Award>,
    },
    Flat {
        #[serde(default)]
        id: Option<ProjectId>,
        #[serde(default)]
        project_url: Option<ProjectUrl>,
        description: Description,
        award: Award,
    },
}

#[derive(Deserialize)]
struct ParsedContent {
    #[serde(default)]
    description_markdown: Description,
    #[serde(default)]
    submissions: Vec<Submission>,
}

#[derive(Deserialize)]
struct Submission {
    #[serde(default)]
    awards: Vec<PrizeName>,
}

/// Line-delimited JSON project source.
///
/// Reads one file or every `.jsonl` file under a directory. Accepts flat
/// pre-labeled records and scraped project pages; the latter need an
/// `AwardMapping` unless they carry an explicit `award`.
pub struct JsonlSource {
    id: String,
    stream: FileStream,
    mapping: Option<AwardMapping>,
}

impl JsonlSource {
    /// Source reading `root`, a `.jsonl` file or a directory of them.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let stream = FileStream::new(root);
        Self {
            id: stream.root().display().to_string(),
            stream,
            mapping: None,
        }
    }

    /// Derive awards of scraped records from `mapping`.
    pub fn with_award_mapping(mut self, mapping: AwardMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Configure symlink traversal for directory roots.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.stream = self.stream.with_follow_symlinks(follow_links);
        self
    }

    fn resolve(
        &self,
        raw: RawProject,
        path: &Path,
        line: usize,
    ) -> Result<ProjectRecord, SamplerError> {
        let (id, project_url, description, award) = match raw {
            RawProject::Flat {
                id,
                project_url,
                description,
                award,
            } => (id, project_url, description, award),
            RawProject::Scraped {
                id,
                project_url,
                parsed_content,
                award,
            } => {
                let award = match (award, &self.mapping) {
                    (Some(award), _) => award,
                    (None, Some(mapping)) => mapping.award_for(
                        parsed_content
                            .submissions
                            .iter()
                            .flat_map(|submission| submission.awards.iter().map(String::as_str)),
                    ),
                    (None, None) => {
                        return Err(SamplerError::CorpusFormat {
                            path: path.to_path_buf(),
                            line,
                            reason: "scraped record has no award and no award mapping was configured"
                                .to_string(),
                        });
                    }
                };
                (id, project_url, parsed_content.description_markdown, award)
            }
        };
        let id = id
            .or_else(|| project_url.clone())
            .unwrap_or_else(|| derived_id(&description));
        Ok(ProjectRecord {
            id,
            project_url,
            description,
            award,
        })
    }

    fn read_file(
        &self,
        path: &Path,
        records: &mut IndexMap<String, ProjectRecord>,
        owners: &mut HashMap<ProjectId, String>,
    ) -> Result<(), SamplerError> {
        let reader = BufReader::new(File::open(path)?);
        let mut skipped = 0usize;
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let raw: RawProject =
                serde_json::from_str(&line).map_err(|err| SamplerError::CorpusFormat {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: err.to_string(),
                })?;
            let record = self.resolve(raw, path, idx + 1)?;
            if is_blank(&record.description) {
                skipped += 1;
                continue;
            }
            let key = record
                .project_url
                .clone()
                .unwrap_or_else(|| record.id.clone());
            if let Some(owner) = owners.get(&record.id).filter(|owner| **owner != key) {
                return Err(SamplerError::CorpusFormat {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: format!(
                        "id '{}' is already used by a record with url '{owner}'",
                        record.id
                    ),
                });
            }
            let id = record.id.clone();
            // `insert` keeps the earlier slot, so the last duplicate wins in first-seen order.
            if let Some(replaced) = records.insert(key.clone(), record) {
                debug!(
                    "[triplets:source] {}:{} replaced an earlier record with the same url",
                    path.display(),
                    idx + 1
                );
                if replaced.id != id {
                    owners.remove(&replaced.id);
                }
            }
            owners.insert(id, key);
        }
        if skipped > 0 {
            debug!(
                "[triplets:source] skipped {skipped} record(s) with empty descriptions in {}",
                path.display()
            );
        }
        Ok(())
    }
}

impl ProjectSource for JsonlSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> Result<Vec<ProjectRecord>, SamplerError> {
        let files = self.stream.files()?;
        let mut records = IndexMap::new();
        let mut owners = HashMap::new();
        for path in &files {
            self.read_file(path, &mut records, &mut owners)?;
        }
        info!(
            "[triplets:source] read {} unique project(s) from {} file(s) under {}",
            records.len(),
            files.len(),
            self.stream.root().display()
        );
        Ok(records.into_values().collect())
    }
}

fn derived_id(description: &str) -> ProjectId {
    format!("{DERIVED_ID_PREFIX}{:016x}", stable_hash_str(0, description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::awards::PrizeClass;
    use std::fs;
    use tempfile::tempdir;

    fn mapping() -> AwardMapping {
        AwardMapping::new([
            ("Grand Prize", PrizeClass::BigWin),
            ("Best Sponsor Hack", PrizeClass::SmallWin),
        ])
    }

    #[test]
    fn reads_flat_records_and_derives_ids() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("corpus.jsonl");
        fs::write(
            &path,
            concat!(
                "{\"id\": \"p1\", \"description\": \"solar drone\", \"award\": \"big\"}\n",
                "\n",
                "{\"project_url\": \"https://x/p2\", \"description\": \"chat bot\", \"award\": \"none\"}\n",
                "{\"description\": \"budget app\", \"award\": \"small\"}\n",
            ),
        )
        .unwrap();

        let records = JsonlSource::new(&path).load().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "p1");
        assert_eq!(records[1].id, "https://x/p2");
        assert!(records[2].id.starts_with(DERIVED_ID_PREFIX));
        assert_eq!(records[2].award, Award::Small);
        assert_eq!(records[2].id, derived_id("budget app"));
    }

    #[test]
    fn scraped_records_use_award_mapping() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("scraped.jsonl");
        fs::write(
            &path,
            concat!(
                "{\"project_url\": \"u1\", \"parsed_content\": {\"description_markdown\": \"one\", \"submissions\": [{\"awards\": [\"Best Sponsor Hack\"]}, {\"awards\": [\"Grand Prize\"]}]}}\n",
                "{\"project_url\": \"u2\", \"parsed_content\": {\"description_markdown\": \"two\", \"submissions\": [{\"awards\": [\"Best Sponsor Hack\"]}]}}\n",
                "{\"project_url\": \"u3\", \"parsed_content\": {\"description_markdown\": \"three\", \"submissions\": []}}\n",
            ),
        )
        .unwrap();

        let records = JsonlSource::new(&path)
            .with_award_mapping(mapping())
            .load()
            .unwrap();
        let awards: Vec<Award> = records.iter().map(|record| record.award).collect();
        assert_eq!(awards, vec![Award::Big, Award::Small, Award::None]);

        let err = JsonlSource::new(&path).load().unwrap_err();
        assert!(matches!(err, SamplerError::CorpusFormat { line: 1, .. }));
    }

    #[test]
    fn skips_empty_descriptions_and_dedups_by_url() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("dupes.jsonl");
        fs::write(
            &path,
            concat!(
                "{\"project_url\": \"u1\", \"description\": \"first draft\", \"award\": \"none\"}\n",
                "{\"project_url\": \"u2\", \"description\": \"   \", \"award\": \"big\"}\n",
                "{\"project_url\": \"u3\", \"description\": \"other\", \"award\": \"small\"}\n",
                "{\"project_url\": \"u1\", \"description\": \"final\", \"award\": \"big\"}\n",
            ),
        )
        .unwrap();

        let records = JsonlSource::new(&path).load().unwrap();
        let descriptions: Vec<&str> = records
            .iter()
            .map(|record| record.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["final", "other"]);
        assert_eq!(records[0].award, Award::Big);
    }

    #[test]
    fn duplicate_ids_across_urls_are_rejected() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("ids.jsonl");
        fs::write(
            &path,
            concat!(
                "{\"id\": \"p1\", \"project_url\": \"u1\", \"description\": \"one\", \"award\": \"big\"}\n",
                "{\"id\": \"p2\", \"project_url\": \"u2\", \"description\": \"two\", \"award\": \"none\"}\n",
                "{\"id\": \"p1\", \"project_url\": \"u3\", \"description\": \"three\", \"award\": \"small\"}\n",
            ),
        )
        .unwrap();
        match JsonlSource::new(&path).load() {
            Err(SamplerError::CorpusFormat { line, reason, .. }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("p1"));
            }
            other => panic!("expected CorpusFormat, got {other:?}"),
        }
    }

    #[test]
    fn rescraped_url_may_change_its_id() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("rescrape.jsonl");
        fs::write(
            &path,
            concat!(
                "{\"id\": \"old\", \"project_url\": \"u1\", \"description\": \"draft\", \"award\": \"none\"}\n",
                "{\"id\": \"new\", \"project_url\": \"u1\", \"description\": \"final\", \"award\": \"big\"}\n",
                "{\"id\": \"old\", \"project_url\": \"u2\", \"description\": \"reused\", \"award\": \"small\"}\n",
            ),
        )
        .unwrap();
        let ids: Vec<String> = JsonlSource::new(&path)
            .load()
            .unwrap()
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec!["new".to_string(), "old".to_string()]);
    }

    #[test]
    fn malformed_line_reports_path_and_line() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bad.jsonl");
        fs::write(
            &path,
            "{\"description\": \"ok\", \"award\": \"none\"}\n{\"description\": \"x\", \"award\": \"gold\"}\n",
        )
        .unwrap();
        match JsonlSource::new(&path).load() {
            Err(SamplerError::CorpusFormat { path: bad, line, .. }) => {
                assert_eq!(bad, path);
                assert_eq!(line, 2);
            }
            other => panic!("expected CorpusFormat, got {other:?}"),
        }
    }

    #[test]
    fn directory_roots_read_files_in_path_order() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("b.jsonl"),
            "{\"id\": \"b\", \"description\": \"bee\", \"award\": \"none\"}\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("a.jsonl"),
            "{\"id\": \"a\", \"description\": \"ay\", \"award\": \"big\"}\n",
        )
        .unwrap();
        let ids: Vec<String> = JsonlSource::new(temp.path())
            .load()
            .unwrap()
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
