use axum::Json;

use crate::models::ServiceInfo;

pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        ok: true,
        service: "CourseScope API",
        docs: "/api/majors",
    })
}
