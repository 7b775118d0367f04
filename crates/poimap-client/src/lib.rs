pub mod client;
pub mod error;
pub mod normalize;
mod retry;
pub mod types;

pub use client::{ApiClient, ClientOptions};
pub use error::ClientError;
pub use normalize::{normalize_map_config, normalize_poi};
