use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::constants::source::CORPUS_FILE_EXTENSION;
use crate::constants::splits::{SPLIT_FILE_EXTENSION, TEMP_FILE_SUFFIX};
use crate::data::Triplet;
use crate::errors::SamplerError;
use crate::splits::{DatasetSplits, DatasetWriter, SplitLabel};

/// Filesystem transport that discovers corpus files under a root.
///
/// A root that is a file yields just that file; a directory yields every
/// `.jsonl` file below it, sorted by path.
pub struct FileStream {
    root: PathBuf,
    follow_links: bool,
}

impl FileStream {
    /// Create a stream rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
        }
    }

    /// Configure symlink traversal.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Configured root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Corpus files in deterministic order.
    pub fn files(&self) -> Result<Vec<PathBuf>, SamplerError> {
        let metadata = fs::metadata(&self.root)?;
        if metadata.is_file() {
            return Ok(vec![self.root.clone()]);
        }
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(self.follow_links)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && is_jsonl_file(entry.path()))
            .map(|entry| entry.path().to_path_buf())
            .collect();
        files.sort();
        Ok(files)
    }
}

/// True if the path has a `.jsonl` extension (case-insensitive).
pub fn is_jsonl_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(CORPUS_FILE_EXTENSION))
        .unwrap_or(false)
}

/// Output path of `label` inside `dir` (e.g. `out/validation.jsonl`).
pub fn split_path(dir: &Path, label: SplitLabel) -> PathBuf {
    dir.join(format!("{}.{}", label.as_str(), SPLIT_FILE_EXTENSION))
}

/// Writes each split as line-delimited JSON under one directory.
///
/// All three files are staged as `.tmp` siblings first and only renamed into
/// place once every split has been written.
pub struct JsonlDatasetWriter {
    out_dir: PathBuf,
}

impl JsonlDatasetWriter {
    /// Writer targeting `out_dir`, created on first write.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Output directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn stage(&self, label: SplitLabel, triplets: &[Triplet]) -> Result<PathBuf, SamplerError> {
        let staged = split_path(&self.out_dir, label).with_extension(format!(
            "{}.{}",
            SPLIT_FILE_EXTENSION, TEMP_FILE_SUFFIX
        ));
        let mut writer = BufWriter::new(File::create(&staged)?);
        for triplet in triplets {
            serde_json::to_writer(&mut writer, triplet)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(staged)
    }
}

impl DatasetWriter for JsonlDatasetWriter {
    fn write(&self, splits: &DatasetSplits) -> Result<(), SamplerError> {
        fs::create_dir_all(&self.out_dir)?;
        let mut staged = Vec::with_capacity(SplitLabel::ALL.len());
        for label in SplitLabel::ALL {
            match self.stage(label, splits.get(label)) {
                Ok(path) => staged.push((label, path)),
                Err(err) => {
                    for (_, path) in &staged {
                        if let Err(cleanup) = fs::remove_file(path) {
                            warn!(
                                "[triplets:writer] failed removing staged {}: {cleanup}",
                                path.display()
                            );
                        }
                    }
                    return Err(err);
                }
            }
        }
        for (label, path) in staged {
            let target = split_path(&self.out_dir, label);
            fs::rename(&path, &target)?;
            info!(
                "[triplets:writer] wrote {} {} triplet(s) to {}",
                splits.get(label).len(),
                label.as_str(),
                target.display()
            );
        }
        Ok(())
    }
}

/// Read a split file written by `JsonlDatasetWriter`.
pub fn read_split(path: &Path) -> Result<Vec<Triplet>, SamplerError> {
    let reader = BufReader::new(File::open(path)?);
    let mut triplets = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let triplet = serde_json::from_str(&line).map_err(|err| SamplerError::CorpusFormat {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: err.to_string(),
        })?;
        triplets.push(triplet);
    }
    Ok(triplets)
}
