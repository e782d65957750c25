use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const OUTPUT_FILENAME: &str = "index.html";

/// Fail unless `output_dir` is an existing directory.
pub fn ensure_output_dir(output_dir: &Path) -> Result<()> {
    if !output_dir.is_dir() {
        anyhow::bail!("Output directory not found: {}", output_dir.display());
    }
    Ok(())
}

/// Write a rendered digest to `<output_dir>/index.html`.
pub fn save_digest(html: &str, output_dir: &Path) -> Result<PathBuf> {
    ensure_output_dir(output_dir)?;

    let filepath = output_dir.join(OUTPUT_FILENAME);
    fs::write(&filepath, html)
        .with_context(|| format!("Failed to write digest file: {}", filepath.display()))?;

    Ok(filepath)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_digest_writes_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_digest("<html></html>", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("index.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = save_digest("x", &missing).unwrap_err();
        assert!(err.to_string().starts_with("Output directory not found"));
    }

    #[test]
    fn test_output_path_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(ensure_output_dir(&file).is_err());
    }
}
