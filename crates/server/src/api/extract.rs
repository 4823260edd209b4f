//! Conversion of request bodies into raw field maps.

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::Response;

use geoprofile_core::FieldMap;

use super::error_response;

/// An uploaded file from a multipart body.
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Drain a multipart body into raw fields plus the optional `resource`
/// upload. Reading happens before any ticket or workspace exists, so a
/// malformed body has no side effects.
pub async fn multipart_fields(
    mut multipart: Multipart,
) -> Result<(FieldMap, Option<Upload>), Response> {
    let mut fields = FieldMap::new();
    let mut upload = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Malformed multipart body: {}", e),
                ));
            }
        };

        let name = field.name().unwrap_or("").to_string();
        if name == "resource" {
            if let Some(filename) = field.file_name().map(|s| s.to_string()) {
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some(Upload {
                            filename,
                            bytes: bytes.to_vec(),
                        });
                    }
                    Err(e) => {
                        return Err(error_response(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read file: {}", e),
                        ));
                    }
                }
                continue;
            }
        }

        match field.text().await {
            Ok(text) => fields.push(&name, text),
            Err(e) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read field {}: {}", name, e),
                ));
            }
        }
    }

    Ok((fields, upload))
}

/// Convert urlencoded form pairs into a field map.
pub fn form_fields(pairs: Vec<(String, String)>) -> FieldMap {
    let mut fields = FieldMap::new();
    for (name, value) in pairs {
        fields.push(&name, value);
    }
    fields
}
