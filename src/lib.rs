/// virtual-tryon library
///
/// Product catalog, camera try-on session and the mock storefront API.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod session;

// Re-exports for convenience
pub use catalog::Catalog;
pub use config::AppConfig;
pub use error::{Result, TryOnError};
pub use session::CaptureSession;
