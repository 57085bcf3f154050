//! Typed response status decoded from the `responseHeader` block.

/// Header entry name carrying the status sentinel.
pub(crate) const STATUS_ENTRY: &str = "status";

/// Status value the server uses for success.
const SUCCESS_CODE: &str = "0";

/// Outcome reported by the server in a response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    /// Status `0`, or no status entry at all.
    Success,
    /// Any other status value, kept verbatim.
    Failure(String),
}

impl ServerStatus {
    /// Decodes the raw `status` entry value; `None` means the header had none.
    #[must_use]
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            None | Some(SUCCESS_CODE) => Self::Success,
            Some(other) => Self::Failure(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_success() {
        assert_eq!(ServerStatus::from_code(Some("0")), ServerStatus::Success);
    }

    #[test]
    fn test_whitespace_around_zero_is_success() {
        assert!(ServerStatus::from_code(Some(" 0\n")).is_success());
    }

    #[test]
    fn test_nonzero_is_failure_with_code() {
        assert_eq!(
            ServerStatus::from_code(Some("1")),
            ServerStatus::Failure("1".to_string())
        );
    }

    #[test]
    fn test_missing_status_is_success() {
        assert!(ServerStatus::from_code(None).is_success());
    }
}
