//! Exit codes for `mapctl`
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | Success                                           |
//! | 1    | General error                                     |
//! | 2    | Usage or configuration error, programming defect  |
//! | 20   | Connection refused, reset, timed out or closed    |
//! | 21   | Server answered with a failure                    |
//! | 22   | Server response could not be decoded              |
//!
//! Supervisors restart on 20, and should not retry on 2.

use weightmap_config::ConfigError;
use weightmap_core::WeightMapError;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_CONNECTION: u8 = 20;
pub const EXIT_REMOTE_FAILURE: u8 = 21;
pub const EXIT_DECODE: u8 = 22;

/// Classify an error chain into an exit code
pub fn for_error(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ConfigError>().is_some() {
        return EXIT_USAGE;
    }

    match err.downcast_ref::<WeightMapError>() {
        Some(e) if e.is_fatal_to_session() => EXIT_CONNECTION,
        Some(e) if e.is_programming_error() => EXIT_USAGE,
        Some(e) if e.is_decode_error() => EXIT_DECODE,
        Some(WeightMapError::RemoteFailure(_)) => EXIT_REMOTE_FAILURE,
        _ => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_classification_through_context() {
        let err = Err::<(), _>(WeightMapError::Connection("refused".into()))
            .context("connecting to localhost:8080")
            .unwrap_err();
        assert_eq!(for_error(&err), EXIT_CONNECTION);

        let err = anyhow::Error::new(WeightMapError::RemoteFailure("bad arg".into()));
        assert_eq!(for_error(&err), EXIT_REMOTE_FAILURE);

        let err = anyhow::Error::new(WeightMapError::MalformedPath("dx = 0".into()));
        assert_eq!(for_error(&err), EXIT_DECODE);

        let err = anyhow::Error::new(WeightMapError::UnknownOperation("DEBUG_PRINT".into()));
        assert_eq!(for_error(&err), EXIT_USAGE);

        assert_eq!(for_error(&anyhow::anyhow!("something else")), EXIT_ERROR);
    }
}
