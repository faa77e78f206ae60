pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod html;
pub mod models;
pub mod platform;

pub use config::StashConfig;
pub use error::StashError;
pub use gateway::{ChatMessage, GatewayClient, GatewayError, TextGenerator, ToolFunction};
pub use html::PageMetadata;
pub use models::{Collection, EnrichmentResult, SavedLink};
pub use platform::Platform;
