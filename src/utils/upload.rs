//! Avatar upload checks, naming, and multipart form reading.

use std::collections::HashMap;

use axum::extract::multipart::Multipart;
use chrono::Utc;

use kurs_core::AppError;
use kurs_core::file_storage::FileStorage;

pub const FILE_TOO_LARGE_MESSAGE: &str = "Fayl hajmi 3 MB dan oshmasligi kerak.";
pub const INVALID_FILE_TYPE_MESSAGE: &str =
    "Faqat JPEG, PNG yoki WEBP formatidagi rasmlar qabul qilinadi.";
pub const INVALID_FORM_MESSAGE: &str = "Forma ma'lumotlari noto'g'ri";
pub const SINGLE_IMAGE_MESSAGE: &str = "Faqat bitta rasm yuklash mumkin";

/// Name of the multipart part carrying the avatar.
pub const IMAGE_FIELD: &str = "image";

/// Headroom on top of the image limit for the other form parts.
pub const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp"];
const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// A single image received in the `image` multipart field.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Checks size, extension and MIME type.
    pub fn validate(&self, max_file_size: usize) -> Result<(), AppError> {
        if self.bytes.len() > max_file_size {
            return Err(AppError::bad_request(FILE_TOO_LARGE_MESSAGE));
        }

        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let content_type = self.content_type.to_ascii_lowercase();

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str())
            || !ALLOWED_MIME_TYPES.contains(&content_type.as_str())
        {
            return Err(AppError::bad_request(INVALID_FILE_TYPE_MESSAGE));
        }

        Ok(())
    }

    /// `<unix-millis>-<original name>`, with every character outside
    /// `[A-Za-z0-9.]` replaced by `-` and the result lowercased.
    pub fn stored_name(&self, now_millis: i64) -> String {
        format!("{}-{}", now_millis, sanitize_file_name(&self.file_name))
    }
}

/// Text parts plus the optional `image` part of a multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

impl MultipartForm {
    /// Reads every part. Text parts named in `text_fields` are kept, other
    /// text parts are skipped; a second `image` part is rejected.
    pub async fn read(multipart: &mut Multipart, text_fields: &[&str]) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| AppError::bad_request(INVALID_FORM_MESSAGE))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == IMAGE_FIELD {
                if form.image.is_some() {
                    return Err(AppError::bad_request(SINGLE_IMAGE_MESSAGE));
                }
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                // Reading past the body limit is the only way this fails
                // once the boundary parsed.
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request(FILE_TOO_LARGE_MESSAGE))?;
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else if text_fields.contains(&name.as_str()) {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request(INVALID_FORM_MESSAGE))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }
}

/// Validates `image` and writes it under a fresh stored name.
pub async fn store_image(
    files: &dyn FileStorage,
    image: &ImageUpload,
    max_file_size: usize,
) -> Result<String, AppError> {
    image.validate(max_file_size)?;
    let stored_name = image.stored_name(Utc::now().timestamp_millis());
    files
        .save(&stored_name, &image.bytes)
        .await
        .map_err(AppError::internal)?;
    Ok(stored_name)
}

/// Deletes a stored file, logging instead of failing.
pub async fn remove_file(files: &dyn FileStorage, key: &str) {
    if let Err(err) = files.delete(key).await {
        tracing::warn!(file = %key, error = %err, "Failed to delete stored file");
    }
}

fn sanitize_file_name(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", "-.");
    }
    sanitized
}

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryFileStorage;

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use kurs_core::file_storage::{FileStorage, StorageError, validate_key};

    /// Keeps uploaded files in memory.
    #[derive(Default)]
    pub struct MemoryFileStorage {
        files: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryFileStorage {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn contains(&self, key: &str) -> bool {
            self.files
                .lock()
                .map(|files| files.contains_key(key))
                .unwrap_or(false)
        }

        pub fn len(&self) -> usize {
            self.files.lock().map(|files| files.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    #[async_trait]
    impl FileStorage for MemoryFileStorage {
        async fn save(&self, key: &str, content: &[u8]) -> Result<String, StorageError> {
            validate_key(key)?;
            if let Ok(mut files) = self.files.lock() {
                files.insert(key.to_string(), content.to_vec());
            }
            Ok(key.to_string())
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            validate_key(key)?;
            if let Ok(mut files) = self.files.lock() {
                files.remove(key);
            }
            Ok(())
        }
    }
}
