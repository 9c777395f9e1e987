// src/cmtrace/rotation.rs

//! Size-based rotation for the CMTrace log file.
//!
//! A full log `dir/QuietShell.log` is renamed to
//! `dir/QuietShell_20240307_090503.log`; afterwards only the newest
//! `max_backups` files matching `QuietShell_*.log` are kept.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

/// Split a log path into (directory, stem, extension-with-dot).
fn split_log_path(path: &Path) -> (PathBuf, String, String) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (dir, stem, ext)
}

/// Name a backup of `path` taken at `at`.
pub fn backup_path(path: &Path, at: DateTime<Local>) -> PathBuf {
    let (dir, stem, ext) = split_log_path(path);
    dir.join(format!("{stem}_{}{ext}", at.format("%Y%m%d_%H%M%S")))
}

/// Move the active log aside. Fails rather than overwrite an existing
/// backup of the same second.
pub fn rotate(path: &Path, at: DateTime<Local>) -> Result<PathBuf> {
    let backup = backup_path(path, at);
    if backup.exists() {
        bail!("backup {:?} already exists", backup);
    }
    fs::rename(path, &backup)
        .with_context(|| format!("renaming {:?} to {:?}", path, backup))?;
    debug!(log = ?path, backup = ?backup, "rotated log file");
    Ok(backup)
}

fn backup_matcher(stem: &str, ext: &str) -> Result<GlobMatcher> {
    let pattern = format!("{}_*{}", globset::escape(stem), globset::escape(ext));
    let glob = GlobBuilder::new(&pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("building backup pattern {pattern:?}"))?;
    Ok(glob.compile_matcher())
}

/// All existing backups of `path`, oldest first.
///
/// Age is the creation time where the platform reports one, else the
/// modification time; the file name breaks ties.
pub fn list_backups(path: &Path) -> Result<Vec<PathBuf>> {
    let (dir, stem, ext) = split_log_path(path);
    let matcher = backup_matcher(&stem, &ext)?;

    let mut backups: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("reading dir {:?}", dir))? {
        let entry = entry?;
        let name = entry.file_name();
        if !matcher.is_match(Path::new(&name)) {
            continue;
        }
        let meta = match entry.metadata() {
            Ok(meta) if meta.is_file() => meta,
            _ => continue,
        };
        let age = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        backups.push((age, entry.path()));
    }

    backups.sort();
    Ok(backups.into_iter().map(|(_, p)| p).collect())
}

/// Delete the oldest backups until at most `keep` remain.
///
/// Returns how many were deleted; individual delete failures are skipped.
pub fn prune_backups(path: &Path, keep: usize) -> Result<usize> {
    let backups = list_backups(path)?;
    if backups.len() <= keep {
        return Ok(0);
    }

    let excess = backups.len() - keep;
    let mut removed = 0;
    for old in backups.iter().take(excess) {
        match fs::remove_file(old) {
            Ok(()) => removed += 1,
            Err(e) => debug!(backup = ?old, error = %e, "could not delete old log backup"),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 7, 9, 5, secs)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn backup_name_embeds_timestamp_before_extension() {
        let path = Path::new("/var/log/QuietShell.log");
        assert_eq!(
            backup_path(path, at(3)),
            PathBuf::from("/var/log/QuietShell_20240307_090503.log")
        );
    }

    #[test]
    fn backup_name_for_bare_file_name_uses_current_dir() {
        assert_eq!(
            backup_path(Path::new("run"), at(0)),
            PathBuf::from("./run_20240307_090500")
        );
    }

    #[test]
    fn matcher_only_accepts_backups_of_the_same_log() {
        let matcher = backup_matcher("QuietShell", ".log").unwrap();
        assert!(matcher.is_match("QuietShell_20240307_090503.log"));
        assert!(!matcher.is_match("QuietShell.log"));
        assert!(!matcher.is_match("Other_20240307_090503.log"));
        assert!(!matcher.is_match("QuietShell_20240307_090503.txt"));
    }

    #[test]
    fn matcher_escapes_glob_characters_in_stem() {
        let matcher = backup_matcher("run[1]", ".log").unwrap();
        assert!(matcher.is_match("run[1]_20240307_090503.log"));
        assert!(!matcher.is_match("run1_20240307_090503.log"));
    }
}
