use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::time_utils::current_unix_timestamp_ms;

fn ensure_parent_dir(path: &Path) -> Result<&Path> {
    let parent_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent_dir)
        .with_context(|| format!("failed to create {}", parent_dir.display()))?;
    Ok(parent_dir)
}

/// Writes text via a sibling temp file + rename so readers never observe
/// partial state documents.
pub fn write_text_atomic(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("destination path cannot be empty");
    }
    if path.is_dir() {
        bail!("destination path '{}' is a directory", path.display());
    }

    let parent_dir = ensure_parent_dir(path)?;
    let temp_name = format!(
        ".{}.pending-{}-{}",
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("rota-state"),
        std::process::id(),
        current_unix_timestamp_ms()
    );
    let temp_path = parent_dir.join(temp_name);
    std::fs::write(&temp_path, content)
        .with_context(|| format!("failed to write temporary file {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path).with_context(|| {
        format!(
            "failed to move {} into place at {}",
            temp_path.display(),
            path.display()
        )
    })?;
    Ok(())
}

/// Appends one JSON line (newline added here) to an append-only log file,
/// creating the file and its parent directory on first use.
pub fn append_jsonl_line(path: &Path, line: &str) -> Result<()> {
    if line.contains('\n') {
        bail!("jsonl line must not contain embedded newlines");
    }

    ensure_parent_dir(path)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(line.as_bytes())
        .with_context(|| format!("failed to append {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to append newline {}", path.display()))?;
    Ok(())
}
