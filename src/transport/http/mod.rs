pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod health;
    pub mod resources;
    pub mod uploads;
}

pub use router::{create_router, ApiDoc};
pub use types::{ApiResponse, AppState};
