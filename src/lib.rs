pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::error::{AppError, AppResult};
pub use app::resource_service::ResourceService;
pub use app::upload_service::UploadService;
pub use domain::model::{BlogModel, ContentModel, ProjectModel, Record, Status};
pub use storage::{EntityStore, MemoryEntityStore, MemoryObjectStore, ObjectStore, PgEntityStore, S3ObjectStore};
