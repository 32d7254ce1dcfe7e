use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub ok: bool,
    pub service: &'static str,
    pub docs: &'static str,
}

/// Body of `POST /api/courses/eligible`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EligibleRequest {
    #[serde(default)]
    pub completed: Vec<String>,
}

/// Query string of `POST /api/audit/upload`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(rename = "majorId")]
    pub major_id: Option<String>,
}
