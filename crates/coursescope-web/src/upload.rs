use axum::extract::Multipart;

use crate::error::MalformedInputError;

/// An uploaded audit PDF.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Parsed form fields from the multipart upload.
pub struct FormFields {
    pub file: UploadedFile,
    /// Raw `majorId` form value, if one was sent.
    pub major_id: Option<String>,
}

/// Parse a multipart audit upload. Unknown fields are drained and ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<FormFields, MalformedInputError> {
    let mut file: Option<UploadedFile> = None;
    let mut major_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MalformedInputError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("audit.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| MalformedInputError::Multipart(e.to_string()))?
                    .to_vec();
                if !is_pdf(&data) {
                    return Err(MalformedInputError::NotPdf);
                }
                file = Some(UploadedFile { filename, data });
            }
            "majorId" => {
                let val = field
                    .text()
                    .await
                    .map_err(|e| MalformedInputError::Multipart(e.to_string()))?;
                if !val.trim().is_empty() {
                    major_id = Some(val);
                }
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    let file = file.ok_or(MalformedInputError::MissingFile)?;
    Ok(FormFields { file, major_id })
}

/// PDF magic bytes check.
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF-")
}

/// Parse a `majorId` value. Blank means "no major".
pub fn parse_major_id(raw: Option<&str>) -> Result<Option<i64>, MalformedInputError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| MalformedInputError::InvalidMajorId(v.to_string())),
    }
}
