//! Transparent archive extraction for uploaded inputs.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use super::WorkspaceError;

/// If `src_file` is a tar or zip archive, extract it next to itself and
/// return the directory holding the extracted content, descending into
/// singly-nested directories when the archive wrapped its files in one.
/// Anything else is returned unchanged.
///
/// Spreadsheet formats are zip containers and must not be unpacked.
pub fn unpack_if_archive(src_file: &Path) -> Result<PathBuf, WorkspaceError> {
    if src_file.is_dir() || has_extension(src_file, &["xlsx", "ods"]) {
        return Ok(src_file.to_path_buf());
    }

    let dest = src_file
        .parent()
        .ok_or_else(|| WorkspaceError::Archive("input file has no parent directory".into()))?
        .to_path_buf();

    if has_extension(src_file, &["tgz"]) || is_tar_gz(src_file) {
        let file = File::open(src_file)?;
        tar::Archive::new(GzDecoder::new(file))
            .unpack(&dest)
            .map_err(|e| WorkspaceError::Archive(e.to_string()))?;
        return extracted_path(&dest);
    }

    if has_extension(src_file, &["tar"]) {
        let file = File::open(src_file)?;
        tar::Archive::new(file)
            .unpack(&dest)
            .map_err(|e| WorkspaceError::Archive(e.to_string()))?;
        return extracted_path(&dest);
    }

    if is_zip(src_file)? {
        let file = File::open(src_file)?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|e| WorkspaceError::Archive(e.to_string()))?;
        archive
            .extract(&dest)
            .map_err(|e| WorkspaceError::Archive(e.to_string()))?;
        return extracted_path(&dest);
    }

    Ok(src_file.to_path_buf())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

fn is_tar_gz(path: &Path) -> bool {
    has_extension(path, &["gz"])
        && path
            .file_stem()
            .and_then(|s| Path::new(s).extension())
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("tar"))
            .unwrap_or(false)
}

fn is_zip(path: &Path) -> Result<bool, WorkspaceError> {
    if has_extension(path, &["zip"]) {
        return Ok(true);
    }
    let mut magic = [0u8; 4];
    let mut file = File::open(path)?;
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(&magic == b"PK\x03\x04"),
        Err(_) => Ok(false),
    }
}

/// Walk down through the (first, in name order) subdirectory chain until a
/// level with no subdirectories is reached. Hidden directories are ignored.
fn extracted_path(dir: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = dir.to_path_buf();
    loop {
        let mut subdirs: Vec<PathBuf> = fs::read_dir(&current)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.path().is_dir()
                    && !entry.file_name().to_string_lossy().starts_with('.')
            })
            .map(|entry| entry.path())
            .collect();
        if subdirs.is_empty() {
            return Ok(current);
        }
        subdirs.sort();
        current = subdirs.remove(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in entries {
            writer.start_file(name.to_string(), options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    fn write_tar(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(file);
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *content).unwrap();
        }
        builder.finish().unwrap();
    }

    #[test]
    fn test_plain_file_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.geojson");
        fs::write(&file, "{}").unwrap();
        assert_eq!(unpack_if_archive(&file).unwrap(), file);
    }

    #[test]
    fn test_zip_extraction_flat() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("roads.shp", b"shp"), ("roads.dbf", b"dbf")]);

        let extracted = unpack_if_archive(&archive).unwrap();
        assert_eq!(extracted, dir.path());
        assert!(dir.path().join("roads.shp").is_file());
        assert!(dir.path().join("roads.dbf").is_file());
    }

    #[test]
    fn test_zip_extraction_descends_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_zip(&archive, &[("nyc_roads/roads.shp", b"shp")]);

        let extracted = unpack_if_archive(&archive).unwrap();
        assert_eq!(extracted, dir.path().join("nyc_roads"));
        assert!(extracted.join("roads.shp").is_file());
    }

    #[test]
    fn test_zip_without_extension_detected_by_magic() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("upload");
        write_zip(&archive, &[("a.csv", b"a,b\n")]);

        let extracted = unpack_if_archive(&archive).unwrap();
        assert!(extracted.join("a.csv").is_file());
    }

    #[test]
    fn test_tar_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.tar");
        write_tar(&archive, &[("data/points.csv", b"x,y\n")]);

        let extracted = unpack_if_archive(&archive).unwrap();
        assert_eq!(extracted, dir.path().join("data"));
        assert!(extracted.join("points.csv").is_file());
    }

    #[test]
    fn test_spreadsheet_not_unpacked() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("table.xlsx");
        write_zip(&file, &[("sheet1.xml", b"<x/>")]);

        // xlsx is a zip container but must be handed to the processor as-is.
        assert_eq!(unpack_if_archive(&file).unwrap(), file);
    }
}
