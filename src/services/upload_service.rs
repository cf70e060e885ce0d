use std::path::Path;

use actix_multipart::Multipart;
use futures::StreamExt;

use crate::utils::AppError;

/// Field name the trip form posts the picture under
pub const IMAGE_FIELD: &str = "image";
pub const MAX_IMAGE_BYTES: usize = 5_000_000;

const IMAGE_TYPES: [&str; 4] = ["jpeg", "jpg", "png", "gif"];

/// Both the extension and the declared mimetype must name an accepted format.
pub fn is_allowed_image(file_name: &str, content_type: Option<&str>) -> bool {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    let subtype = content_type
        .and_then(|mime| mime.trim().to_lowercase().strip_prefix("image/").map(String::from));

    matches!(
        (extension, subtype),
        (Some(ext), Some(sub)) if IMAGE_TYPES.contains(&ext.as_str()) && IMAGE_TYPES.contains(&sub.as_str())
    )
}

/// `{millis}-{name}` with directories stripped and whitespace runs turned into `-`.
pub fn stored_file_name(original: &str, unix_millis: i64) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = base.split_whitespace().collect::<Vec<_>>().join("-");
    let cleaned = match cleaned.trim_start_matches('.') {
        "" => "image".to_string(),
        rest => rest.to_string(),
    };
    format!("{}-{}", unix_millis, cleaned)
}

pub fn public_url(base_url: &str, file_name: &str) -> String {
    format!("{}/uploads/{}", base_url.trim_end_matches('/'), file_name)
}

/// Reads the `image` part, validates it and writes it under `upload_dir`.
/// Returns the stored file name.
pub async fn save_image(mut payload: Multipart, upload_dir: &Path) -> Result<String, AppError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::InvalidRequest(format!("Upload error: {}", e)))?;

        let (name, file_name) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(String::from),
                cd.get_filename().map(String::from),
            ),
            None => (None, None),
        };
        if name.as_deref() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = file_name.unwrap_or_default();
        let content_type = field.content_type().map(|mime| mime.essence_str().to_string());
        if !is_allowed_image(&file_name, content_type.as_deref()) {
            return Err(AppError::InvalidRequest("Images only!".to_string()));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidRequest(format!("Upload error: {}", e)))?;
            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(AppError::InvalidRequest("File too large".to_string()));
            }
            bytes.extend_from_slice(&chunk);
        }

        let stored = stored_file_name(&file_name, chrono::Utc::now().timestamp_millis());

        tokio::fs::create_dir_all(upload_dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {}", e)))?;
        tokio::fs::write(upload_dir.join(&stored), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store image: {}", e)))?;

        log::info!("🖼️  Stored upload {} ({} bytes)", stored, bytes.len());
        return Ok(stored);
    }

    Err(AppError::InvalidRequest("No image file provided".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_image_types_only() {
        assert!(is_allowed_image("beach.JPG", Some("image/jpeg")));
        assert!(is_allowed_image("map.png", Some("image/png")));
        assert!(is_allowed_image("fun.gif", Some("image/gif")));

        assert!(!is_allowed_image("notes.pdf", Some("application/pdf")));
        assert!(!is_allowed_image("sneaky.png", Some("text/html")));
        assert!(!is_allowed_image("sneaky.html", Some("image/png")));
        assert!(!is_allowed_image("vector.svg", Some("image/svg+xml")));
        assert!(!is_allowed_image("noext", Some("image/png")));
        assert!(!is_allowed_image("photo.png", None));
    }

    #[test]
    fn file_names_are_flattened_and_prefixed() {
        assert_eq!(stored_file_name("my beach  photo.png", 1700), "1700-my-beach-photo.png");
        assert_eq!(stored_file_name("../../etc/passwd.png", 1), "1-passwd.png");
        assert_eq!(stored_file_name("C:\\Users\\me\\pic.gif", 2), "2-pic.gif");
        assert_eq!(stored_file_name("", 3), "3-image");
    }

    #[test]
    fn builds_public_url_under_uploads() {
        assert_eq!(
            public_url("http://localhost:5000/", "1-a.png"),
            "http://localhost:5000/uploads/1-a.png"
        );
    }
}
