use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use tracing::info;
use uuid::Uuid;

use sketchwrite_types::api::UploadResponse;

use crate::{ApiError, AppState};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// POST /upload/image — multipart field `image`, JPEG or PNG, 5 MB cap.
/// Returns a server-relative path under `/uploads/` that the client hands
/// back as the `content` of an image submission.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("invalid multipart request: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("could not read image field: {e}")))?;

        if data.is_empty() {
            return Err(ApiError::field("image", "image file is required"));
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::field("image", "image exceeds the 5 MB limit"));
        }
        // Sniff the real format; the client-declared content type is not
        // trusted.
        let Some(ext) = image_extension(&data) else {
            return Err(ApiError::field(
                "image",
                "only JPEG and PNG images are accepted",
            ));
        };

        let file_name = format!("{}.{ext}", Uuid::new_v4());
        let path = state.upload_dir.join(&file_name);
        tokio::fs::create_dir_all(&state.upload_dir)
            .await
            .map_err(|e| ApiError::Storage(anyhow::Error::from(e)))?;
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| ApiError::Storage(anyhow::Error::from(e)))?;

        info!("Stored uploaded image {file_name} ({} bytes)", data.len());
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                url: format!("/uploads/{file_name}"),
            }),
        ));
    }

    Err(ApiError::field("image", "multipart field 'image' is required"))
}

fn image_extension(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("png")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::image_extension;

    #[test]
    fn sniffs_jpeg_and_png_and_rejects_the_rest() {
        assert_eq!(image_extension(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), Some("jpg"));
        assert_eq!(
            image_extension(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00]),
            Some("png")
        );
        // GIF header
        assert_eq!(image_extension(b"GIF89a...."), None);
        assert_eq!(image_extension(b""), None);
    }
}
