use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Replaces `path` with `contents` in one rename so readers never observe a
/// half-written file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut tmp_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_parent_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("data.json");

        write_atomic(&target, "{\"a\":1}").unwrap();
        write_atomic(&target, "{\"a\":2}").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "{\"a\":2}");
        assert!(!dir.path().join("nested").join("data.json.tmp").exists());
    }
}
