//! Parameters for the normalize endpoints.

use serde::{Deserialize, Serialize};

use super::{FieldMap, ResponseMode, ValidationError};
use crate::exporter::ExportFormat;

/// Validated parameters for `/normalize/file` and `/normalize/path`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizeParams {
    pub response: ResponseMode,
    /// Export format of the normalized dataset.
    pub resource_type: ExportFormat,
    pub csv_delimiter: Option<String>,
    pub crs: Option<String>,
    pub date_normalization: Vec<String>,
    pub phone_normalization: Vec<String>,
    pub special_character_normalization: Vec<String>,
    pub alphabetical_normalization: Vec<String>,
    pub case_normalization: Vec<String>,
    pub transliteration: Vec<String>,
    pub transliteration_langs: Vec<String>,
    pub transliteration_lang: Option<String>,
    pub value_cleaning: Vec<String>,
    pub wkt_normalization: bool,
    pub column_name_normalization: bool,
}

impl NormalizeParams {
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

        let transliteration = fields.list("transliteration");
        let transliteration_langs = fields.list("transliteration_langs");
        let transliteration_lang = fields.non_empty("transliteration_lang").map(String::from);
        if !transliteration.is_empty()
            && transliteration_langs.is_empty()
            && transliteration_lang.is_none()
        {
            errors.add(
                "transliteration",
                "You selected the transliteration option without specifying the sources language(s)",
            );
        }

        errors.into_result()?;

        Ok(Self {
            response,
            resource_type: resource_type.expect("validated above"),
            csv_delimiter: fields.non_empty("csv_delimiter").map(String::from),
            crs: fields.non_empty("crs").map(String::from),
            date_normalization: fields.list("date_normalization"),
            phone_normalization: fields.list("phone_normalization"),
            special_character_normalization: fields.list("special_character_normalization"),
            alphabetical_normalization: fields.list("alphabetical_normalization"),
            case_normalization: fields.list("case_normalization"),
            transliteration,
            transliteration_langs,
            transliteration_lang,
            value_cleaning: fields.list("value_cleaning"),
            wkt_normalization: fields.boolean("wkt_normalization"),
            column_name_normalization: fields.boolean("column_name_normalization"),
        })
    }
}
