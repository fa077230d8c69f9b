//! SDK error types.

use crate::client::ClientError;
use crate::ws::WsError;

/// Any error raised by the SDK.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// REST client error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// WebSocket client error.
    #[error(transparent)]
    Ws(#[from] WsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: SdkError = ClientError::Unauthorized.into();
        assert_eq!(err.to_string(), "unauthorized");

        let err: SdkError = WsError::Closed.into();
        assert_eq!(err.to_string(), "connection closed");
    }
}
