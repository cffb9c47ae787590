//! Error types and handling for the ticket-mcp core

use thiserror::Error;

/// Result type alias for ticket-mcp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the ticket-mcp core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool registration and lookup errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Client-side transport errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Ticket domain errors
    #[error("Ticket error: {0}")]
    Ticket(#[from] TicketError),

    /// Chat agent errors
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors raised by the tool registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Tool already registered: {name}")]
    Duplicate { name: String },

    #[error("Tool not found: {name}")]
    NotFound { name: String },
}

/// Domain failure surfaced by a tool handler.
///
/// The `kind` travels verbatim into the invocation envelope's `error.type`,
/// so handlers pick stable, caller-recognizable kinds (`NotFound`,
/// `EmptyUpdate`, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct HandlerError {
    pub kind: String,
    pub message: String,
}

impl HandlerError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Network-level failures on the invocation client side
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {message}")]
    Connect { message: String },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    #[error("Server returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            TransportError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            TransportError::Decode {
                message: err.to_string(),
            }
        } else {
            TransportError::Connect {
                message: err.to_string(),
            }
        }
    }
}

/// Ticket business-logic errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    #[error("Ticket {id} not found")]
    NotFound { id: u64 },

    #[error("No fields to update provided")]
    EmptyUpdate,

    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },
}

impl TicketError {
    /// Stable error kind for the invocation envelope
    pub fn kind(&self) -> &'static str {
        match self {
            TicketError::NotFound { .. } => "NotFound",
            TicketError::EmptyUpdate => "EmptyUpdate",
            TicketError::EmptyField { .. } => "InvalidArgument",
        }
    }
}

impl From<TicketError> for HandlerError {
    fn from(err: TicketError) -> Self {
        HandlerError::new(err.kind(), err.to_string())
    }
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {message}")]
    Api { message: String },
}

/// Chat agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Maximum tool-call steps exceeded: {max_steps}")]
    MaxStepsExceeded { max_steps: usize },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
