use thiserror::Error;

/// Errors returned by the backend API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure, or a non-2xx status on a GET.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// `GET /map/{id}` returned an empty body.
    #[error("Map not found: {0}")]
    MapNotFound(String),

    /// The map detail carried no usable `area` polygon.
    #[error("Invalid area coordinates for map {0}")]
    InvalidArea(String),

    /// An RFC submission was answered with a non-success status.
    #[error("{endpoint} rejected the request with HTTP {status}")]
    Rejected { status: u16, endpoint: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
