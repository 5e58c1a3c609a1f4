//! Core error types for the weight map client

/// Every failure a weight map call can surface.
///
/// The variants follow the client's error taxonomy: connection faults are
/// fatal to the session, overflow and unknown operations are programming
/// defects, remote failures are recoverable by the caller, and decode errors
/// come from untrusted payloads.
#[derive(thiserror::Error, Debug)]
pub enum WeightMapError {
    /// Socket refused, reset, timed out or closed mid-exchange
    #[error("Connection error: {0}")]
    Connection(String),

    /// Encoded request does not fit in a single frame
    #[error("Protocol overflow: request needs {needed} bytes, frame holds {capacity}")]
    ProtocolOverflow { needed: usize, capacity: usize },

    /// Opcode has no entry in the method registry
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Server answered with a FAILURE status
    #[error("Remote failure: {0}")]
    RemoteFailure(String),

    /// Response payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Path contained a segment the decompressor cannot walk
    #[error("Malformed path: {0}")]
    MalformedPath(String),

    /// Argument cannot be represented by the method's encoder
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WeightMapError {
    /// True when the session that produced this error must be discarded.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// True for defects in the calling code; retrying cannot help.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::ProtocolOverflow { .. }
                | Self::UnknownOperation(_)
                | Self::InvalidArgument(_)
                | Self::Config(_)
        )
    }

    /// True for errors caused by a malformed response payload.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::MalformedPath(_))
    }
}

impl From<std::io::Error> for WeightMapError {
    fn from(err: std::io::Error) -> Self {
        WeightMapError::Connection(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WeightMapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_connection_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err: WeightMapError = io.into();
        assert!(err.is_fatal_to_session());
        assert!(!err.is_programming_error());
    }

    #[test]
    fn test_classification() {
        let overflow = WeightMapError::ProtocolOverflow { needed: 1030, capacity: 1024 };
        assert!(overflow.is_programming_error());
        assert!(!overflow.is_fatal_to_session());

        let remote = WeightMapError::RemoteFailure("bad arg".into());
        assert!(!remote.is_programming_error());
        assert!(!remote.is_fatal_to_session());
        assert_eq!(remote.to_string(), "Remote failure: bad arg");

        assert!(WeightMapError::MalformedPath("dx = 0".into()).is_decode_error());
    }
}
