// src/engine/checkpoint.rs

//! The resume file: live checkpoint and final resume recipe.
//!
//! The file holds one CLI argument per line, as `-f` / `^<escaped name>$`
//! pairs, so it can be passed back verbatim with `@<path>`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use crate::errors::Result;

/// Relative path (from the output root) to the resume file.
pub const RESUME_FILE_PATH: &str = ".taskdag/resume";

pub fn resume_file_path(output_root: &Path) -> PathBuf {
    output_root.join(RESUME_FILE_PATH)
}

/// Anchored, escaped pattern that matches exactly `name`.
pub fn exact_pattern(name: &str) -> String {
    format!("^{}$", regex::escape(name))
}

/// `-f` argument pairs freezing exactly the given tasks.
pub fn freeze_args<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .flat_map(|name| ["-f".to_string(), exact_pattern(name)])
        .collect()
}

/// Durable storage for checkpoint records.
///
/// Both operations must be durable when they return `Ok`.
pub trait CheckpointStore: Send {
    /// Append the record for one completed task.
    fn record_done(&mut self, task: &str) -> Result<()>;

    /// Replace the whole content with a freeze set for `frozen`.
    fn rewrite(&mut self, frozen: &[&str]) -> Result<()>;

    /// Where the checkpoint lives, if it is on disk.
    fn location(&self) -> Option<&Path>;
}

/// Stores checkpoints in a file (`<output>/.taskdag/resume`).
#[derive(Debug)]
pub struct FileCheckpointStore {
    path: PathBuf,
    append: Option<File>,
}

impl FileCheckpointStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path, append: None }
    }

    fn append_handle(&mut self) -> Result<&mut File> {
        let file = match self.append.take() {
            Some(file) => file,
            None => {
                ensure_parent(&self.path)?;
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .with_context(|| format!("opening resume file {:?}", self.path))?
            }
        };
        Ok(self.append.insert(file))
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn record_done(&mut self, task: &str) -> Result<()> {
        let mut record = String::new();
        for arg in freeze_args([task]) {
            record.push_str(&arg);
            record.push('\n');
        }

        let file = self.append_handle()?;
        file.write_all(record.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        debug!(task = %task, "checkpoint appended");
        Ok(())
    }

    fn rewrite(&mut self, frozen: &[&str]) -> Result<()> {
        // The old append handle points at the file being replaced.
        self.append = None;
        ensure_parent(&self.path)?;

        let tmp = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)
                .with_context(|| format!("creating temporary resume file {:?}", tmp))?;
            for arg in freeze_args(frozen.iter().copied()) {
                writeln!(file, "{}", arg)?;
            }
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing resume file {:?}", self.path))?;
        sync_parent(&self.path);

        info!(path = ?self.path, frozen = frozen.len(), "resume file rewritten");
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Keeps checkpoint lines in memory only.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    lines: Vec<String>,
    rewrites: usize,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// How many times the content was replaced wholesale.
    pub fn rewrites(&self) -> usize {
        self.rewrites
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn record_done(&mut self, task: &str) -> Result<()> {
        self.lines.extend(freeze_args([task]));
        Ok(())
    }

    fn rewrite(&mut self, frozen: &[&str]) -> Result<()> {
        self.lines = freeze_args(frozen.iter().copied());
        self.rewrites += 1;
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        None
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating checkpoint directory at {:?}", parent))?;
    }
    Ok(())
}

/// Make the rename itself durable. Platforms that cannot open directories
/// simply skip this.
fn sync_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
}
