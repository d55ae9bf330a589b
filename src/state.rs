use std::path::PathBuf;
use std::sync::Arc;

use kurs_config::{CorsConfig, EmailConfig, JwtConfig, UploadConfig};
use kurs_core::file_storage::{FileStorage, LocalFileStorage};
use kurs_db::{init_db_pool, run_migrations};

use crate::store::{CategoryStore, CourseStore, PgStore, UserStore};
use crate::utils::email::EmailService;

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub courses: Arc<dyn CourseStore>,
    pub files: Arc<dyn FileStorage>,
    pub email: EmailService,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub upload_config: UploadConfig,
}

impl AppState {
    /// Builds the state around a single store that implements every
    /// collection.
    pub fn with_store<S>(
        store: Arc<S>,
        files: Arc<dyn FileStorage>,
        email: EmailService,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        upload_config: UploadConfig,
    ) -> Self
    where
        S: UserStore + CategoryStore + CourseStore + 'static,
    {
        Self {
            users: store.clone(),
            categories: store.clone(),
            courses: store,
            files,
            email,
            jwt_config,
            cors_config,
            upload_config,
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let pool = init_db_pool().await?;
    run_migrations(&pool).await?;

    let upload_config = UploadConfig::from_env();
    let files = Arc::new(LocalFileStorage::new(
        PathBuf::from(&upload_config.dir),
        upload_config.max_file_size,
    ));

    Ok(AppState::with_store(
        Arc::new(PgStore::new(pool)),
        files,
        EmailService::from_config(EmailConfig::from_env()),
        JwtConfig::from_env(),
        CorsConfig::from_env(),
        upload_config,
    ))
}
