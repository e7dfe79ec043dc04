use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

pub fn assert_file_exists(path: &Path, tag: &str) -> Result<()> {
    if !path.is_file() {
        crate::utils::logger::error(&format!("file [{}] [{}] does not exist", tag, path.display()));
        return Err(PipelineError::MissingFile {
            tag: tag.to_string(),
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(())
}

pub fn assert_folder_exists(path: &Path, tag: &str) -> Result<()> {
    if !path.is_dir() {
        crate::utils::logger::error(&format!("folder [{}] [{}] does not exist", tag, path.display()));
        return Err(PipelineError::MissingFolder {
            tag: tag.to_string(),
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(())
}

/// Recursive, best-effort removal. A missing path is not an error.
pub fn delete_directory(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => crate::utils::logger::debug(&format!(
            "could not remove {}: {}",
            path.display(),
            e
        )),
    }
}

/// Creates `root` (no `subfolders`) or the nested `"a/b/c"` chain below an
/// existing `root`, returning the deepest folder created.
///
/// With `remove_if_present`, `root` itself (or `root/a` for a nested spec)
/// is wiped first so re-runs start clean.
pub fn make_directory(root: &Path, subfolders: &str, remove_if_present: bool) -> Result<PathBuf> {
    if subfolders.is_empty() {
        if remove_if_present {
            delete_directory(root);
        }
        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create directory: {}", root.display()))?;
        return Ok(root.to_path_buf());
    }

    assert_folder_exists(root, "root")?;
    let segments: Vec<&str> = subfolders.split('/').filter(|s| !s.is_empty()).collect();

    if remove_if_present {
        if let Some(first) = segments.first() {
            delete_directory(&root.join(first));
        }
    }

    let mut folder = root.to_path_buf();
    for segment in segments {
        folder.push(segment);
        if !folder.is_dir() {
            fs::create_dir_all(&folder)
                .with_context(|| format!("Failed to create directory: {}", folder.display()))?;
        }
    }
    Ok(folder)
}

/// Regular files directly inside `dir`. A missing directory holds zero.
pub fn number_of_files(dir: &Path) -> Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read directory: {}", dir.display()))
        }
    };

    Ok(entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .count())
}

/// Moves `src` into `dst` when `dst` is a directory, otherwise to `dst` itself.
pub fn move_file(src: &Path, dst: &Path) -> Result<PathBuf> {
    let target = if dst.is_dir() {
        let name = src
            .file_name()
            .with_context(|| format!("No file name in: {}", src.display()))?;
        dst.join(name)
    } else {
        dst.to_path_buf()
    };

    if fs::rename(src, &target).is_err() {
        // Different filesystem: copy then drop the source.
        fs::copy(src, &target).with_context(|| {
            format!("Failed to move {} to {}", src.display(), target.display())
        })?;
        fs::remove_file(src).with_context(|| format!("Failed to remove: {}", src.display()))?;
    }
    Ok(target)
}

/// Moves every regular file of `src_dir` whose name matches `pattern` into
/// `dst_dir`. Returns how many files were moved.
pub fn move_all_files(src_dir: &Path, dst_dir: &Path, pattern: &str) -> Result<usize> {
    assert_folder_exists(src_dir, "source")?;
    assert_folder_exists(dst_dir, "destination")?;

    let matcher = glob::Pattern::new(pattern).map_err(|source| PipelineError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files: Vec<PathBuf> = fs::read_dir(src_dir)
        .with_context(|| format!("Failed to read directory: {}", src_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .map_or(false, |name| matcher.matches(&name.to_string_lossy()))
        })
        .collect();

    // Sort alphabetically (works for padded numbers like img0001_sphere.jpg)
    files.sort();

    for file in &files {
        move_file(file, dst_dir)?;
    }
    Ok(files.len())
}
