//! Client errors

/// Errors that can occur in the client
///
/// Mutation paths always propagate one of these so the presentation layer can
/// render a distinct message per kind. Read paths never surface decode
/// problems; they degrade to empty listings instead.
#[derive(Debug)]
pub enum Error {
    /// No active wallet session (local precondition, no remote call made)
    NotConnected,
    /// Invalid input provided (local precondition, no remote call made)
    InvalidArgument(String),
    /// Selected content store backend is missing credentials or URL
    NotConfigured(String),
    /// Upload payload exceeds the configured size limit
    SizeExceeded { size: u64, limit: u64 },
    /// The remote actor declined the request (user cancellation, policy rejection)
    RemoteRejected(String),
    /// Remote-side resources exhausted (insufficient funds / gas)
    InsufficientResources(String),
    /// The wallet already has a connection request pending approval
    WalletBusy,
    /// No confirmation observed within the configured bound
    Timeout,
    /// Transport-level failure (connectivity, protocol)
    Network(String),
    /// Content store provider rejected or mangled the upload
    Store(String),
}

impl Error {
    /// Map a wallet/provider numeric error code to an error kind.
    ///
    /// `-32002` is the EIP-1193 "request already pending" code; `4001` is the
    /// user-rejection code. Everything else is a generic rejection.
    pub fn from_wallet_code(code: i64, message: &str) -> Error {
        match code {
            -32002 => Error::WalletBusy,
            4001 => Error::RemoteRejected("request rejected by user".to_string()),
            _ => Error::RemoteRejected(format!("wallet error {}: {}", code, message)),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotConnected => write!(f, "no wallet connected"),
            Error::InvalidArgument(e) => write!(f, "invalid argument: {}", e),
            Error::NotConfigured(e) => write!(f, "provider not configured: {}", e),
            Error::SizeExceeded { size, limit } => {
                write!(f, "payload of {} bytes exceeds limit of {} bytes", size, limit)
            }
            Error::RemoteRejected(e) => write!(f, "rejected by remote: {}", e),
            Error::InsufficientResources(e) => write!(f, "insufficient resources: {}", e),
            Error::WalletBusy => write!(
                f,
                "a wallet connection request is already pending approval"
            ),
            Error::Timeout => write!(f, "no confirmation within the configured bound"),
            Error::Network(e) => write!(f, "network error: {}", e),
            Error::Store(e) => write!(f, "content store error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotConnected;
        assert_eq!(err.to_string(), "no wallet connected");

        let err = Error::InvalidArgument("empty file name".to_string());
        assert_eq!(err.to_string(), "invalid argument: empty file name");

        let err = Error::SizeExceeded { size: 101, limit: 100 };
        assert_eq!(err.to_string(), "payload of 101 bytes exceeds limit of 100 bytes");

        let err = Error::Timeout;
        assert_eq!(err.to_string(), "no confirmation within the configured bound");

        let err = Error::RemoteRejected("user cancelled".to_string());
        assert_eq!(err.to_string(), "rejected by remote: user cancelled");

        let err = Error::Store("bad gateway".to_string());
        assert_eq!(err.to_string(), "content store error: bad gateway");
    }

    #[test]
    fn test_wallet_code_mapping() {
        assert!(matches!(Error::from_wallet_code(-32002, ""), Error::WalletBusy));
        assert!(matches!(
            Error::from_wallet_code(4001, ""),
            Error::RemoteRejected(_)
        ));
        assert!(matches!(
            Error::from_wallet_code(-32603, "internal"),
            Error::RemoteRejected(_)
        ));
    }

    #[test]
    fn test_error_is_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(Error::NotConnected);
        assert!(!err.to_string().is_empty());
    }
}
