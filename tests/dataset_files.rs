use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::tempdir;

use triplets::config::{DatasetConfig, SamplerConfig};
use triplets::data::{Award, Category};
use triplets::oracle::LexicalOracle;
use triplets::source::{AwardMapping, JsonlSource, PrizeClass, ProjectSource, load_corpus};
use triplets::splits::{DatasetWriter, GenerationMode, SplitLabel, build_dataset};
use triplets::transport::fs::{JsonlDatasetWriter, read_split, split_path};

fn write_scraped_corpus(dir: &Path) {
    let mut lines = String::new();
    let prizes = [
        ("Grand Prize", "rover"),
        ("Best Sponsor Hack", "chatbot"),
        ("", "todo list"),
    ];
    for (prize, topic) in prizes {
        for idx in 0..5 {
            let awards = if prize.is_empty() {
                "[]".to_string()
            } else {
                format!("[\"{prize}\"]")
            };
            lines.push_str(&format!(
                "{{\"project_url\": \"https://devpost.test/{topic}-{idx}\", \"parsed_content\": {{\"description_markdown\": \"A {topic} with feature {idx}\", \"submissions\": [{{\"awards\": {awards}}}]}}}}\n"
            ));
        }
    }
    // Rescrape of an earlier page; replaces the first rover entry.
    lines.push_str(
        "{\"project_url\": \"https://devpost.test/rover-0\", \"parsed_content\": {\"description_markdown\": \"A rover, rewritten\", \"submissions\": [{\"awards\": [\"Grand Prize\"]}]}}\n",
    );
    lines.push_str(
        "{\"project_url\": \"https://devpost.test/empty\", \"parsed_content\": {\"description_markdown\": \"\", \"submissions\": []}}\n",
    );
    fs::create_dir_all(dir.join("batch")).unwrap();
    fs::write(dir.join("batch/projects.jsonl"), lines).unwrap();
    fs::write(dir.join("README.txt"), "not part of the corpus").unwrap();
}

fn write_mapping(path: &Path) {
    fs::write(
        path,
        r#"{"Grand Prize": "Big Win", "Best Sponsor Hack": "Small Win"}"#,
    )
    .unwrap();
}

fn dataset_config(seed: u64) -> DatasetConfig {
    DatasetConfig {
        num_train: 60,
        num_val: 10,
        num_test: 15,
        sampler: SamplerConfig {
            seed,
            ..SamplerConfig::default()
        },
    }
}

#[test]
fn scraped_directory_loads_dedups_and_labels() {
    let temp = tempdir().unwrap();
    let corpus_dir = temp.path().join("corpus");
    write_scraped_corpus(&corpus_dir);
    let mapping_path = temp.path().join("awards_mapping.json");
    write_mapping(&mapping_path);

    let source = JsonlSource::new(&corpus_dir)
        .with_award_mapping(AwardMapping::from_path(&mapping_path).unwrap());
    let records = source.load().unwrap();
    assert_eq!(records.len(), 15);
    assert_eq!(records[0].description, "A rover, rewritten");
    assert_eq!(records[0].id, "https://devpost.test/rover-0");

    let corpus = load_corpus(&source).unwrap();
    for category in Category::ALL {
        assert_eq!(corpus.partition(category).len(), 5);
    }
    assert_eq!(
        corpus.get("https://devpost.test/chatbot-3").unwrap().award,
        Award::Small
    );
}

#[test]
fn build_write_and_read_back_every_split() {
    let temp = tempdir().unwrap();
    let corpus_dir = temp.path().join("corpus");
    write_scraped_corpus(&corpus_dir);
    let mapping = AwardMapping::new([
        ("Grand Prize", PrizeClass::BigWin),
        ("Best Sponsor Hack", PrizeClass::SmallWin),
    ]);
    let corpus = Arc::new(
        load_corpus(&JsonlSource::new(&corpus_dir).with_award_mapping(mapping)).unwrap(),
    );
    let oracle = Arc::new(LexicalOracle::build(&corpus));
    let config = dataset_config(42);

    for mode in [GenerationMode::Sequential, GenerationMode::Parallel] {
        let build = build_dataset(Arc::clone(&corpus), oracle.clone(), &config, mode).unwrap();
        let out = temp.path().join(format!("out-{mode:?}"));
        JsonlDatasetWriter::new(&out).write(&build.splits).unwrap();

        for label in SplitLabel::ALL {
            let path = split_path(&out, label);
            let persisted = read_split(&path).unwrap();
            assert_eq!(persisted, build.splits.get(label));
            assert_eq!(persisted.len(), config.count_for(label));
        }
        let first_line = fs::read_to_string(split_path(&out, SplitLabel::Train)).unwrap();
        let first_line = first_line.lines().next().unwrap();
        let value: serde_json::Value = serde_json::from_str(first_line).unwrap();
        assert!(value.get("anchor_status").is_some());
        assert!(value.get("anchor").is_some());
    }
}

#[test]
fn rebuilding_with_the_same_seed_writes_identical_files() {
    let temp = tempdir().unwrap();
    let corpus_dir = temp.path().join("corpus");
    write_scraped_corpus(&corpus_dir);
    let mapping_path = temp.path().join("awards_mapping.json");
    write_mapping(&mapping_path);

    let mut contents = Vec::new();
    for run in 0..2 {
        let source = JsonlSource::new(&corpus_dir)
            .with_award_mapping(AwardMapping::from_path(&mapping_path).unwrap());
        let corpus = Arc::new(load_corpus(&source).unwrap());
        let oracle = Arc::new(LexicalOracle::build(&corpus));
        let build =
            build_dataset(corpus, oracle, &dataset_config(7), GenerationMode::Sequential).unwrap();
        let out = temp.path().join(format!("run-{run}"));
        JsonlDatasetWriter::new(&out).write(&build.splits).unwrap();
        contents.push(fs::read_to_string(split_path(&out, SplitLabel::Test)).unwrap());
    }
    assert_eq!(contents[0], contents[1]);
}
