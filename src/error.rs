//! Error Types
//!
//! Errors surfaced by the HTTP transport and by the MCP tool adapter.
//! Transport errors propagate unchanged through the client façade; the
//! adapter is the only layer that turns them into text.

/// Category of a failure that happened before any HTTP status was received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailure {
    /// Connection could not be established (refused, DNS, unreachable)
    Connect,

    /// Request or response exceeded the configured timeout
    Timeout,

    /// Any other failure while the request was in flight
    Other,
}

impl NetworkFailure {
    /// Classify a reqwest error
    pub fn classify(error: &reqwest::Error) -> Self {
        if error.is_connect() {
            Self::Connect
        } else if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for NetworkFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect => write!(f, "connection failed"),
            Self::Timeout => write!(f, "timed out"),
            Self::Other => write!(f, "request failed"),
        }
    }
}

/// Error types for requests against the optimization service
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Base URL or endpoint could not be parsed
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client itself could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request body could not be serialized
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// No response was received
    #[error("Network error on {method} {url} ({kind}): {message}")]
    Network {
        method: String,
        url: String,
        kind: NetworkFailure,
        message: String,
    },

    /// The service answered with a non-success status
    #[error("HTTP {status} from {method} {url}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected shape
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    /// HTTP status code, if the service answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Network failure category, if no response was received
    pub fn network_failure(&self) -> Option<NetworkFailure> {
        match self {
            Self::Network { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Error types for MCP tool dispatch
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No tool is registered under this name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments did not match the tool's input schema
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    /// The optimization service call failed
    #[error(transparent)]
    Api(#[from] TransportError),
}
