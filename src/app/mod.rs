pub mod error;
pub mod resource_service;
pub mod upload_service;
