use std::env;

/// Avatar uploads: where files live and how large they may be. Stored
/// files are served under `/uploads`.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub dir: String,
    pub max_file_size: usize,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        Self {
            dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            max_file_size: env::var("UPLOAD_MAX_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3 * 1024 * 1024), // 3 MB
        }
    }
}
