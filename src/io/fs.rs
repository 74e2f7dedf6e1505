use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Create the directory if it doesn't exist; error if a non-directory exists there.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Create the parent directory of an output file if needed.
pub fn ensure_parent_exists(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir_exists(parent),
        _ => Ok(()),
    }
}

/// Extracts the given `.zip` file to the target directory.
pub fn extract_zip(zip_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = fs::File::open(zip_path)
        .map_err(|e| anyhow::anyhow!("failed to open {:?}: {}", zip_path, e))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| anyhow::anyhow!("failed to read zip archive {:?}: {}", zip_path, e))?;

    archive
        .extract(dest_dir)
        .map_err(|e| anyhow::anyhow!("failed to extract {:?} to {:?}: {}", zip_path, dest_dir, e))?;

    Ok(())
}

/// Find the first file under `dir` with the given extension, in sorted path order.
pub fn find_with_extension(dir: &Path, extension: &str) -> Result<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .find(|path| path.is_file() && has_extension(path, extension))
        .with_context(|| format!("No .{extension} file found under {}", dir.display()))
}

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn zipped_files_are_found_after_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("zones.zip");
        {
            let mut writer = zip::ZipWriter::new(fs::File::create(&zip_path).unwrap());
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("nested/readme.txt", options).unwrap();
            writer.write_all(b"hello").unwrap();
            writer.start_file("nested/Zones.SHP", options).unwrap();
            writer.write_all(b"not really a shapefile").unwrap();
            writer.finish().unwrap();
        }

        let out = dir.path().join("out");
        ensure_dir_exists(&out).unwrap();
        extract_zip(&zip_path, &out).unwrap();

        let found = find_with_extension(&out, "shp").unwrap();
        assert!(found.ends_with("nested/Zones.SHP"));
        assert!(find_with_extension(&out, "dbf").is_err());
    }

    #[test]
    fn parent_creation() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a/b/out.csv");
        ensure_parent_exists(&file).unwrap();
        assert!(dir.path().join("a/b").is_dir());
        ensure_parent_exists(Path::new("out.csv")).unwrap();
    }
}
