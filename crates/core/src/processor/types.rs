//! Types crossing the processor seam.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Processor, ProcessorError};
use crate::exporter::ExportFormat;
use crate::params::{NormalizeParams, ProfileParams, SummarizeParams};

/// Kind of geospatial resource handed to the processor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Netcdf,
    Raster,
    Vector,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Netcdf => "netcdf",
            ResourceKind::Raster => "raster",
            ResourceKind::Vector => "vector",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "netcdf" => Ok(ResourceKind::Netcdf),
            "raster" => Ok(ResourceKind::Raster),
            "vector" => Ok(ResourceKind::Vector),
            _ => Err(()),
        }
    }
}

/// Stem of the normalized dataset name: input stem plus `_normalized`.
pub fn normalized_base_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string());
    let stem = name.split('.').next().unwrap_or("dataset");
    format!("{}_normalized", stem)
}

/// A normalized dataset produced by the processor, still inside the job
/// workspace. The exporter turns it into the downloadable artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOutput {
    /// File (csv) or bundle directory (shp) within the workspace.
    pub path: PathBuf,
    pub format: ExportFormat,
    /// Stem for the delivered file name, e.g. `roads_normalized`.
    pub base_name: String,
}

/// What a finished job produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorOutput {
    /// Descriptive report (profile and summarize jobs).
    Report(Value),
    /// Normalized dataset (normalize jobs).
    Dataset(DatasetOutput),
}

/// A fully validated processor call, carried by deferred jobs and consumed
/// uniformly by the prompt path and the background workers.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorInvocation {
    Profile {
        kind: ResourceKind,
        params: ProfileParams,
    },
    Normalize {
        params: NormalizeParams,
    },
    Summarize {
        params: SummarizeParams,
    },
}

impl ProcessorInvocation {
    /// The workspace namespace this invocation belongs to.
    pub fn namespace(&self) -> &'static str {
        match self {
            ProcessorInvocation::Profile { .. } => "profile",
            ProcessorInvocation::Normalize { .. } => "normalize",
            ProcessorInvocation::Summarize { .. } => "summarize",
        }
    }

    /// Run the invocation against a processor.
    pub async fn run(
        &self,
        processor: &dyn Processor,
        input: &Path,
    ) -> Result<ProcessorOutput, ProcessorError> {
        match self {
            ProcessorInvocation::Profile { kind, params } => processor
                .profile(input, *kind, params)
                .await
                .map(ProcessorOutput::Report),
            ProcessorInvocation::Normalize { params } => processor
                .normalize(input, params)
                .await
                .map(ProcessorOutput::Dataset),
            ProcessorInvocation::Summarize { params } => processor
                .summarize(input, params)
                .await
                .map(ProcessorOutput::Report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_round_trip() {
        for kind in [ResourceKind::Netcdf, ResourceKind::Raster, ResourceKind::Vector] {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
        assert!("tabular".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_invocation_namespace() {
        let invocation = ProcessorInvocation::Profile {
            kind: ResourceKind::Vector,
            params: ProfileParams::from_fields(&crate::params::FieldMap::new()).unwrap(),
        };
        assert_eq!(invocation.namespace(), "profile");
    }
}
