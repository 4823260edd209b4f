//! Parameters for the profile endpoints.

use serde::{Deserialize, Serialize};

use super::{FieldMap, ResponseMode, ValidationError};

/// Validated parameters for `/profile/file/*` and `/profile/path/*`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileParams {
    pub response: ResponseMode,
    pub basemap_provider: String,
    pub basemap_name: String,
    pub aspect_ratio: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Column holding the latitude information.
    pub lat: Option<String>,
    /// Column holding the longitude information.
    pub lon: Option<String>,
    /// Column holding the time information (NetCDF only).
    pub time: Option<String>,
    pub crs: Option<String>,
    /// Column holding the geometry information (vector only).
    pub geometry: Option<String>,
    pub encoding: Option<String>,
}

impl ProfileParams {
    pub fn from_fields(fields: &FieldMap) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new();

        let response = match ResponseMode::from_fields(fields) {
            Ok(mode) => mode,
            Err(e) => {
                errors.errors.extend(e.errors);
                ResponseMode::Prompt
            }
        };

        let aspect_ratio = fields.parsed("aspect_ratio", &mut errors);
        let width = fields.parsed("width", &mut errors);
        let height = fields.parsed("height", &mut errors);

        errors.into_result()?;

        Ok(Self {
            response,
            basemap_provider: fields
                .non_empty("basemap_provider")
                .unwrap_or("OpenStreetMap")
                .to_string(),
            basemap_name: fields
                .non_empty("basemap_name")
                .unwrap_or("Mapnik")
                .to_string(),
            aspect_ratio,
            width,
            height,
            lat: fields.non_empty("lat").map(String::from),
            lon: fields.non_empty("lon").map(String::from),
            time: fields.non_empty("time").map(String::from),
            crs: fields.non_empty("crs").map(String::from),
            geometry: fields.non_empty("geometry").map(String::from),
            encoding: fields.non_empty("encoding").map(String::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ProfileParams::from_fields(&FieldMap::new()).unwrap();
        assert_eq!(params.response, ResponseMode::Prompt);
        assert_eq!(params.basemap_provider, "OpenStreetMap");
        assert_eq!(params.basemap_name, "Mapnik");
        assert_eq!(params.width, None);
        assert_eq!(params.crs, None);
    }

    #[test]
    fn test_full_fields() {
        let mut fields = FieldMap::new();
        fields.push("response", "deferred");
        fields.push("width", "1920");
        fields.push("height", "1080");
        fields.push("aspect_ratio", "1.77");
        fields.push("lat", "latitude");
        fields.push("lon", "longitude");
        fields.push("crs", "EPSG:4326");

        let params = ProfileParams::from_fields(&fields).unwrap();
        assert_eq!(params.response, ResponseMode::Deferred);
        assert_eq!(params.width, Some(1920));
        assert_eq!(params.height, Some(1080));
        assert_eq!(params.lat.as_deref(), Some("latitude"));
        assert_eq!(params.crs.as_deref(), Some("EPSG:4326"));
    }

    #[test]
    fn test_invalid_width_rejected() {
        let mut fields = FieldMap::new();
        fields.push("width", "wide");
        let err = ProfileParams::from_fields(&fields).unwrap_err();
        assert!(err.errors.contains_key("width"));
    }

    #[test]
    fn test_invalid_response_rejected() {
        let mut fields = FieldMap::new();
        fields.push("response", "sometime");
        assert!(ProfileParams::from_fields(&fields).is_err());
    }
}
