pub mod repo;
pub mod services;

pub use repo::Photo;
pub use services::UploadItem;
