//! Console error types

use std::io;

use thiserror::Error;

use super::attr::ColorRole;
use super::port::StreamKind;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("process has no standard {0} handle")]
    HandleUnavailable(StreamKind),

    #[error("{operation} failed: {} (os error {code})", describe_os_error(.code))]
    Platform { operation: &'static str, code: i32 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown {role} color: {name}")]
    UnknownColor { role: ColorRole, name: String },

    #[error("console session is already closed")]
    SessionClosed,

    #[error("failed to restore console state: {}", join_errors(.0))]
    Restore(Vec<ConsoleError>),
}

impl ConsoleError {
    pub fn platform(operation: &'static str, code: i32) -> Self {
        ConsoleError::Platform { operation, code }
    }

    /// OS error code for platform failures
    pub fn os_code(&self) -> Option<i32> {
        match self {
            ConsoleError::Platform { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

fn describe_os_error(code: &i32) -> String {
    let text = io::Error::from_raw_os_error(*code).to_string();
    // io::Error appends its own "(os error N)"
    match text.rfind(" (os error") {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

fn join_errors(errors: &[ConsoleError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_unavailable_display() {
        let err = ConsoleError::HandleUnavailable(StreamKind::Error);
        assert_eq!(err.to_string(), "process has no standard error handle");
    }

    #[test]
    fn test_platform_error_carries_code() {
        let err = ConsoleError::platform("SetConsoleCursorPosition", 87);
        assert_eq!(err.os_code(), Some(87));
        let display = err.to_string();
        assert!(display.starts_with("SetConsoleCursorPosition failed: "));
        assert!(display.ends_with("(os error 87)"));
    }

    #[test]
    fn test_restore_lists_every_failure() {
        let err = ConsoleError::Restore(vec![
            ConsoleError::InvalidArgument("a".to_string()),
            ConsoleError::SessionClosed,
        ]);
        assert_eq!(
            err.to_string(),
            "failed to restore console state: invalid argument: a; console session is already closed"
        );
        assert_eq!(err.os_code(), None);
    }
}
