use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, error::ErrorKind};

use crate::config::{DatasetConfig, SamplerConfig};
use crate::constants::sampler::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_SEED, DEFAULT_SIMILAR_RATIO, DEFAULT_TOP_K,
};
use crate::constants::splits::{DEFAULT_NUM_TEST, DEFAULT_NUM_TRAIN, DEFAULT_NUM_VAL};
use crate::metrics::category_shares;
use crate::oracle::LexicalOracle;
use crate::source::{AwardMapping, JsonlSource, ProjectSource, load_corpus};
use crate::splits::{DatasetWriter, GenerationMode, SplitLabel, build_dataset};
use crate::transport::fs::{JsonlDatasetWriter, split_path};

#[derive(Debug, Parser)]
#[command(
    name = "build-triplets",
    disable_help_subcommand = true,
    about = "Build contrastive triplet splits from labeled hackathon projects",
    long_about = "Sample (anchor, positive, negative) project descriptions by award category and write train, validation, and test splits as JSONL.",
    after_help = "Set RUST_LOG=info (or debug) to see sampler progress and cache statistics."
)]
struct BuildTripletsCli {
    #[arg(
        long,
        value_name = "PATH",
        help = "Corpus file or directory of .jsonl files"
    )]
    corpus: PathBuf,
    #[arg(
        long = "award-mapping",
        value_name = "PATH",
        help = "JSON prize classification used to label scraped projects"
    )]
    award_mapping: Option<PathBuf>,
    #[arg(
        long = "out-dir",
        value_name = "DIR",
        default_value = "output",
        help = "Directory receiving train.jsonl, validation.jsonl, and test.jsonl"
    )]
    out_dir: PathBuf,
    #[arg(long = "num-train", default_value_t = DEFAULT_NUM_TRAIN, value_parser = parse_positive_usize)]
    num_train: usize,
    #[arg(long = "num-val", default_value_t = DEFAULT_NUM_VAL, value_parser = parse_positive_usize)]
    num_val: usize,
    #[arg(long = "num-test", default_value_t = DEFAULT_NUM_TEST, value_parser = parse_positive_usize)]
    num_test: usize,
    #[arg(long, default_value_t = DEFAULT_SEED, help = "Deterministic sampling seed")]
    seed: u64,
    #[arg(
        long = "similar-ratio",
        default_value_t = DEFAULT_SIMILAR_RATIO,
        value_parser = parse_ratio,
        help = "Probability of asking the similarity oracle for each positive and negative"
    )]
    similar_ratio: f64,
    #[arg(
        long = "top-k",
        default_value_t = DEFAULT_TOP_K,
        value_parser = parse_positive_usize,
        help = "Neighbors requested per oracle query"
    )]
    top_k: usize,
    #[arg(
        long = "cache-capacity",
        default_value_t = DEFAULT_CACHE_CAPACITY,
        help = "Oracle query cache entries (0 disables caching)"
    )]
    cache_capacity: usize,
    #[arg(
        long,
        default_value_t = 0,
        help = "Worker threads for --parallel (0 uses the global rayon pool)"
    )]
    workers: usize,
    #[arg(long, help = "Generate triplets on a rayon pool with per-triplet RNG streams")]
    parallel: bool,
}

impl BuildTripletsCli {
    fn dataset_config(&self) -> DatasetConfig {
        DatasetConfig {
            num_train: self.num_train,
            num_val: self.num_val,
            num_test: self.num_test,
            sampler: SamplerConfig {
                seed: self.seed,
                similar_ratio: self.similar_ratio,
                top_k: self.top_k,
                cache_capacity: self.cache_capacity,
                workers: self.workers,
            },
        }
    }

    fn mode(&self) -> GenerationMode {
        if self.parallel {
            GenerationMode::Parallel
        } else {
            GenerationMode::Sequential
        }
    }
}

/// Run the `build-triplets` command with `args_iter` (program name excluded).
pub fn run_build_triplets<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<BuildTripletsCli, _>(
        std::iter::once("build-triplets".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut source = JsonlSource::new(&cli.corpus);
    if let Some(path) = &cli.award_mapping {
        source = source.with_award_mapping(AwardMapping::from_path(path)?);
    }
    let corpus = Arc::new(load_corpus(&source)?);

    println!("=== build triplets ===");
    println!("corpus: {} ({} projects)", source.id(), corpus.len());
    for (category, count) in corpus.counts() {
        println!("  {category}: {count}");
    }

    let oracle = Arc::new(LexicalOracle::build(&corpus));
    let config = cli.dataset_config();
    let build = build_dataset(corpus, oracle, &config, cli.mode())?;
    JsonlDatasetWriter::new(&cli.out_dir).write(&build.splits)?;

    println!();
    for label in SplitLabel::ALL {
        let triplets = build.splits.get(label);
        let shares = category_shares(triplets)
            .map(|shares| shares.to_string())
            .unwrap_or_else(|| "(empty)".to_string());
        println!(
            "[{}] {} -> {}",
            label.as_str(),
            shares,
            split_path(&cli.out_dir, label).display()
        );
    }
    println!(
        "oracle cache: hits={} misses={} evictions={} entries={} hit_rate={:.3}",
        build.cache.hits,
        build.cache.misses,
        build.cache.evictions,
        build.cache.entries,
        build.cache.hit_rate()
    );
    Ok(())
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{raw}' as a positive integer"))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_ratio(raw: &str) -> Result<f64, String> {
    let parsed = raw
        .parse::<f64>()
        .map_err(|_| format!("Could not parse '{raw}' as a number"))?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(format!("ratio must be within [0, 1], got {parsed}"));
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
