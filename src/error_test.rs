//! Tests for error types

#[cfg(test)]
mod tests {
    use crate::error::AdbError;
    use std::time::Duration;

    #[test]
    fn test_rejection_displays_reason_verbatim() {
        let err = AdbError::Rejected("device 'abc123' not found".to_string());
        assert_eq!(format!("{}", err), "device 'abc123' not found");
        assert!(err.is_rejection());
        assert_eq!(err.remote_reason(), Some("device 'abc123' not found"));
    }

    #[test]
    fn test_device_error_display() {
        let err = AdbError::NoDevicesFound;
        assert!(format!("{}", err).contains("No devices"));

        let err = AdbError::DeviceNotFound("xyz789".to_string());
        assert!(format!("{}", err).contains("xyz789"));

        let err = AdbError::MultipleDevicesFound;
        assert!(format!("{}", err).contains("Multiple"));
    }

    #[test]
    fn test_connection_error_names_address() {
        let err = AdbError::Connection {
            address: "127.0.0.1:5037".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        let text = format!("{}", err);
        assert!(text.contains("127.0.0.1:5037"));
        assert!(text.contains("refused"));
        assert!(!err.is_rejection());
        assert_eq!(err.remote_reason(), None);
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "early eof");
        let err: AdbError = io_err.into();
        assert!(format!("{}", err).contains("ADB connection error"));
    }

    #[test]
    fn test_app_error_display() {
        let err = AdbError::App("apk installed: Failure".to_string());
        assert_eq!(format!("{}", err), "apk installed: Failure");
    }

    #[test]
    fn test_timeout_display() {
        let err = AdbError::Timeout(Duration::from_secs(5));
        assert!(format!("{}", err).contains("5s"));
    }
}
