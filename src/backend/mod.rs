pub mod analyze;
pub mod download;
pub mod traits;
