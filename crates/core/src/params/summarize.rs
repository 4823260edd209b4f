//! Parameters for the summarize endpoints.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{FieldMap, ResponseMode, ValidationError};
use crate::exporter::ExportFormat;

/// Sampling strategy for tabular summaries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMethod {
    Random,
    Stratified,
    Cluster,
}

impl FromStr for SamplingMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(SamplingMethod::Random),
            "stratified" => Ok(SamplingMethod::Stratified),
            "cluster" => Ok(SamplingMethod::Cluster),
            _ => Err(()),
        }
    }
}

/// Validated parameters for `/summarize/file` and `/summarize/path`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummarizeParams {
    pub response: ResponseMode,
    pub resource_type: ExportFormat,
    pub csv_delimiter: Option<String>,
    pub crs: Option<String>,
    pub sampling_method: Option<SamplingMethod>,
    pub columns_to_sample: Vec<String>,
    pub n_samples: Option<u64>,
    pub n_clusters: Option<u64>,
    pub n_sample_per_cluster: Option<u64>,
    pub clustering_column_name: Vec<String>,
    pub to_stratify: Vec<String>,
    pub columns_to_hist: Vec<String>,
    pub n_buckets: Vec<u64>,
    /// `[xmin, ymin, xmax, ymax]`
    pub geometry_sampling_bounding_box: Option<[f64; 4]>,
    pub geometry_simplification_tolerance: Option<f64>,
}

impl SummarizeParams {
    pub fn from_fields(fields: &FieldMap) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new();

        let response = match ResponseMode::from_fields(fields) {
            Ok(mode) => mode,
            Err(e) => {
                errors.errors.extend(e.errors);
                ResponseMode::Prompt
            }
        };

        let resource_type = match fields.non_empty("resource_type") {
            Some(raw) => match raw.parse::<ExportFormat>() {
                Ok(format) => Some(format),
                Err(_) => {
                    errors.add(
                        "resource_type",
                        "Not supported file type, the supported ones are csv and shp",
                    );
                    None
                }
            },
            None => {
                errors.add("resource_type", "This field is required");
                None
            }
        };

        let sampling_method = match fields.non_empty("sampling_method") {
            Some(raw) => match raw.parse::<SamplingMethod>() {
                Ok(method) => Some(method),
                Err(()) => {
                    errors.add(
                        "sampling_method",
                        "Permitted values are random, stratified or cluster",
                    );
                    None
                }
            },
            None => None,
        };

        let n_samples = fields.parsed("n_samples", &mut errors);
        let n_clusters = fields.parsed("n_clusters", &mut errors);
        let n_sample_per_cluster = fields.parsed("n_sample_per_cluster", &mut errors);
        let n_buckets = fields.parsed_list("n_buckets", &mut errors);
        let geometry_simplification_tolerance =
            fields.parsed("geometry_simplification_tolerance", &mut errors);

        let bbox_values: Vec<f64> = fields.parsed_list("geometry_sampling_bounding_box", &mut errors);
        let geometry_sampling_bounding_box = match bbox_values.len() {
            0 => None,
            4 => Some([bbox_values[0], bbox_values[1], bbox_values[2], bbox_values[3]]),
            _ => {
                errors.add(
                    "geometry_sampling_bounding_box",
                    "Expected four values: xmin, ymin, xmax, ymax",
                );
                None
            }
        };

        errors.into_result()?;

        Ok(Self {
            response,
            resource_type: resource_type.expect("validated above"),
            csv_delimiter: fields.non_empty("csv_delimiter").map(String::from),
            crs: fields.non_empty("crs").map(String::from),
            sampling_method,
            columns_to_sample: fields.list("columns_to_sample"),
            n_samples,
            n_clusters,
            n_sample_per_cluster,
            clustering_column_name: fields.list("clustering_column_name"),
            to_stratify: fields.list("to_stratify"),
            columns_to_hist: fields.list("columns_to_hist"),
            n_buckets,
            geometry_sampling_bounding_box,
            geometry_simplification_tolerance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_fields() -> FieldMap {
        let mut fields = FieldMap::new();
        fields.push("resource_type", "csv");
        fields
    }

    #[test]
    fn test_minimal() {
        let params = SummarizeParams::from_fields(&minimal_fields()).unwrap();
        assert_eq!(params.resource_type, ExportFormat::Csv);
        assert_eq!(params.sampling_method, None);
        assert!(params.columns_to_hist.is_empty());
    }

    #[test]
    fn test_missing_resource_type() {
        let err = SummarizeParams::from_fields(&FieldMap::new()).unwrap_err();
        assert!(err.errors.contains_key("resource_type"));
    }

    #[test]
    fn test_sampling_options() {
        let mut fields = minimal_fields();
        fields.push("sampling_method", "cluster");
        fields.push("n_clusters", "8");
        fields.push("n_sample_per_cluster", "50");
        fields.push("clustering_column_name", "region");

        let params = SummarizeParams::from_fields(&fields).unwrap();
        assert_eq!(params.sampling_method, Some(SamplingMethod::Cluster));
        assert_eq!(params.n_clusters, Some(8));
        assert_eq!(params.n_sample_per_cluster, Some(50));
        assert_eq!(params.clustering_column_name, vec!["region"]);
    }

    #[test]
    fn test_invalid_sampling_method() {
        let mut fields = minimal_fields();
        fields.push("sampling_method", "reservoir");
        let err = SummarizeParams::from_fields(&fields).unwrap_err();
        assert!(err.errors.contains_key("sampling_method"));
    }

    #[test]
    fn test_bounding_box() {
        let mut fields = minimal_fields();
        fields.push("geometry_sampling_bounding_box", "5.7,49.4,6.5,50.2");
        let params = SummarizeParams::from_fields(&fields).unwrap();
        assert_eq!(
            params.geometry_sampling_bounding_box,
            Some([5.7, 49.4, 6.5, 50.2])
        );
    }

    #[test]
    fn test_bounding_box_wrong_arity() {
        let mut fields = minimal_fields();
        fields.push("geometry_sampling_bounding_box", "5.7,49.4,6.5");
        let err = SummarizeParams::from_fields(&fields).unwrap_err();
        assert!(err.errors.contains_key("geometry_sampling_bounding_box"));
    }

    #[test]
    fn test_histogram_buckets() {
        let mut fields = minimal_fields();
        fields.push("columns_to_hist", "population,area");
        fields.push("n_buckets", "10,20");
        let params = SummarizeParams::from_fields(&fields).unwrap();
        assert_eq!(params.columns_to_hist, vec!["population", "area"]);
        assert_eq!(params.n_buckets, vec![10, 20]);
    }
}
