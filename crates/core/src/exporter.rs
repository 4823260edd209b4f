//! Export of normalized datasets into their download format.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::processor::DatasetOutput;

/// Native export formats for normalized datasets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// A single delimited text file.
    Csv,
    /// An ESRI shapefile bundle, delivered zipped.
    Shp,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Shp => "shp",
        }
    }

    /// Content type of the delivered artifact.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Shp => "application/zip",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "shp" => Ok(ExportFormat::Shp),
            _ => Err(()),
        }
    }
}

/// Error type for dataset export.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to build zip archive: {0}")]
    Zip(String),
}

/// Serialize a produced dataset into `dest_dir` under `file_stem`, returning
/// the written path. CSV datasets are copied as `{file_stem}.csv`; shapefile
/// bundles (a directory of sidecar files) are zipped into
/// `{file_stem}.zip`.
pub fn store_dataset(
    dataset: &DatasetOutput,
    dest_dir: &Path,
    file_stem: &str,
) -> Result<PathBuf, ExporterError> {
    fs::create_dir_all(dest_dir)?;

    match dataset.format {
        ExportFormat::Csv => {
            let target = dest_dir.join(format!("{}.csv", file_stem));
            if target != dataset.path {
                fs::copy(&dataset.path, &target)?;
            }
            Ok(target)
        }
        ExportFormat::Shp => {
            let target = dest_dir.join(format!("{}.zip", file_stem));
            if dataset.path.is_dir() {
                zip_directory(&dataset.path, &target)?;
            } else {
                fs::copy(&dataset.path, &target)?;
            }
            Ok(target)
        }
    }
}

fn zip_directory(src_dir: &Path, target: &Path) -> Result<(), ExporterError> {
    let file = File::create(target)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for entry in fs::read_dir(src_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        writer
            .start_file(name, options)
            .map_err(|e| ExporterError::Zip(e.to_string()))?;
        let mut reader = File::open(&path)?;
        io::copy(&mut reader, &mut writer)?;
    }

    writer
        .finish()
        .map_err(|e| ExporterError::Zip(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_csv_dataset() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let data = src.path().join("roads_normalized.csv");
        fs::write(&data, "name,length\nbroadway,13\n").unwrap();

        let dataset = DatasetOutput {
            path: data,
            format: ExportFormat::Csv,
            base_name: "roads_normalized".to_string(),
        };

        let stored = store_dataset(&dataset, dest.path(), "result").unwrap();
        assert_eq!(stored, dest.path().join("result.csv"));
        assert_eq!(
            fs::read_to_string(&stored).unwrap(),
            "name,length\nbroadway,13\n"
        );
    }

    #[test]
    fn test_store_shapefile_bundle_is_zipped() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let bundle = src.path().join("roads_normalized");
        fs::create_dir(&bundle).unwrap();
        fs::write(bundle.join("roads.shp"), b"shp").unwrap();
        fs::write(bundle.join("roads.dbf"), b"dbf").unwrap();
        fs::write(bundle.join("roads.prj"), b"prj").unwrap();

        let dataset = DatasetOutput {
            path: bundle,
            format: ExportFormat::Shp,
            base_name: "roads_normalized".to_string(),
        };

        let stored = store_dataset(&dataset, dest.path(), "result").unwrap();
        assert_eq!(stored, dest.path().join("result.zip"));

        let mut archive = zip::ZipArchive::new(File::open(&stored).unwrap()).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"roads.shp".to_string()));
    }

    #[test]
    fn test_store_creates_destination_directory() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let data = src.path().join("x.csv");
        fs::write(&data, "a\n").unwrap();

        let dataset = DatasetOutput {
            path: data,
            format: ExportFormat::Csv,
            base_name: "x".to_string(),
        };

        let nested = dest.path().join("260806").join("tkt");
        let stored = store_dataset(&dataset, &nested, "result").unwrap();
        assert!(stored.is_file());
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("shp".parse::<ExportFormat>().unwrap(), ExportFormat::Shp);
        assert!("parquet".parse::<ExportFormat>().is_err());
    }
}
