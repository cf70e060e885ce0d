use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use super::failure;
use crate::services::upload_service;
use crate::state::AppState;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Upload",
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Not an image, too large or missing")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_image(req: HttpRequest, state: web::Data<AppState>, payload: Multipart) -> HttpResponse {
    log::info!("📤 POST /upload");

    match upload_service::save_image(payload, &state.config.upload_dir).await {
        Ok(file_name) => {
            let base_url = match &state.config.public_base_url {
                Some(url) => url.clone(),
                None => {
                    let info = req.connection_info();
                    format!("{}://{}", info.scheme(), info.host())
                }
            };
            HttpResponse::Ok().json(UploadResponse {
                image_url: upload_service::public_url(&base_url, &file_name),
            })
        }
        Err(e) => failure("Upload failed", e),
    }
}
