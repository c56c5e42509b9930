//! Error types for murimi.

use thiserror::Error;

/// Result type alias using murimi's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for murimi operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Member not found
    #[error("Member not found: {0}")]
    MemberNotFound(uuid::Uuid),

    /// Cluster leader not found
    #[error("Cluster leader not found: {0}")]
    ClusterLeaderNotFound(uuid::Uuid),

    /// Another leader already registered this cluster name.
    ///
    /// Raised when the unique index on `cluster_leader.cluster_name` rejects
    /// an insert or update. The API layer maps this to a 409 with a message
    /// naming the cluster.
    #[error("A cluster leader for '{0}' already exists")]
    DuplicateClusterName(String),

    /// File storage operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_member_not_found() {
        let id = Uuid::nil();
        let err = Error::MemberNotFound(id);
        assert_eq!(err.to_string(), format!("Member not found: {}", id));
    }

    #[test]
    fn test_error_display_cluster_leader_not_found() {
        let id = Uuid::new_v4();
        let err = Error::ClusterLeaderNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_duplicate_cluster_name() {
        let err = Error::DuplicateClusterName("Mhondoro North".to_string());
        assert_eq!(
            err.to_string(),
            "A cluster leader for 'Mhondoro North' already exists"
        );
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("upload failed".to_string());
        assert_eq!(err.to_string(), "Storage error: upload failed");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("unknown export field".to_string());
        assert_eq!(err.to_string(), "Invalid input: unknown export field");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing DATABASE_URL".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing DATABASE_URL");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
