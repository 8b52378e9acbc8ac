//! Filesystem scanner.
//!
//! Collects the [`SourceFile`]s an indexing run will chunk:
//!
//! 1. Each root in `indexing.roots` is walked recursively (sorted by file
//!    name). Missing roots are skipped. Hidden directories below the root
//!    and directories listed in `exclude_dirs` are pruned.
//! 2. A file is kept when its extension is in `include_extensions` and
//!    its path does not match any `exclude_globs` pattern.
//! 3. Each file in `config_files` that exists is appended.
//!
//! Files are deduplicated by canonical path; the first occurrence wins,
//! so a root of `.` next to `src` does not index `src/` twice. Content
//! is decoded as lossy UTF-8 and cut to `max_file_chars` characters.
//!
//! `relative_path` is relative to the base directory the scan runs in.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use source_indexer_core::models::SourceFile;

use crate::config::IndexingConfig;

pub fn scan_sources(config: &IndexingConfig, base_dir: &Path) -> Result<Vec<SourceFile>> {
    let exclude_set = build_globset(&config.exclude_globs)?;
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();

    for root in &config.roots {
        let root_path = base_dir.join(root);
        if !root_path.is_dir() {
            debug!(root = %root_path.display(), "skipping missing root");
            continue;
        }

        let walker = WalkDir::new(&root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_pruned_dir(entry, &config.exclude_dirs));

        for entry in walker {
            let entry = entry
                .with_context(|| format!("Failed to walk {}", root_path.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let rel_str = relative_display(path, base_dir);

            if !has_included_extension(path, &config.include_extensions) {
                continue;
            }
            if exclude_set.is_match(&rel_str) {
                debug!(file = %rel_str, "excluded by glob");
                continue;
            }

            if let Some(file) = read_unique(path, rel_str, config.max_file_chars, &mut seen)? {
                files.push(file);
            }
        }
    }

    for name in &config.config_files {
        let path = base_dir.join(name);
        if !path.is_file() {
            continue;
        }
        if let Some(file) = read_unique(&path, name.clone(), config.max_file_chars, &mut seen)? {
            files.push(file);
        }
    }

    Ok(files)
}

/// Read a single file the same way the scanner does, without filters.
pub fn read_source_file(path: &Path, relative_path: &str, max_chars: usize) -> Result<SourceFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let content: String = text.chars().take(max_chars).collect();

    Ok(SourceFile {
        relative_path: relative_path.to_string(),
        absolute_path: path.display().to_string(),
        content,
    })
}

fn read_unique(
    path: &Path,
    relative_path: String,
    max_chars: usize,
    seen: &mut HashSet<PathBuf>,
) -> Result<Option<SourceFile>> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    if !seen.insert(canonical.clone()) {
        debug!(file = %relative_path, "already collected");
        return Ok(None);
    }

    let mut file = read_source_file(path, &relative_path, max_chars)?;
    file.absolute_path = canonical.display().to_string();
    Ok(Some(file))
}

fn is_pruned_dir(entry: &DirEntry, exclude_dirs: &[String]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || exclude_dirs.iter().any(|d| d == name.as_ref())
}

fn has_included_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed == ext))
        .unwrap_or(false)
}

fn relative_display(path: &Path, base_dir: &Path) -> String {
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    let relative = relative.strip_prefix(".").unwrap_or(relative);
    relative.to_string_lossy().replace('\\', "/")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}
