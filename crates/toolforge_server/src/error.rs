//! Server startup errors.

use std::net::SocketAddr;

/// Error raised while configuring or running the server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The server loop failed
    #[error("Server failed: {0}")]
    Serve(#[source] std::io::Error),

    /// A file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}
