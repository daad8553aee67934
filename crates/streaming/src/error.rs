use thiserror::Error;

/// Failure modes a decode worker can report.
///
/// A decode failure is terminal for the load attempt: it is surfaced once
/// through the owner's callback and never retried. Malformed payloads are
/// the worker's responsibility to catch; the main thread treats any decoded
/// payload it receives as valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("malformed payload: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::DecodeError;

    #[test]
    fn messages_name_the_failure() {
        let e = DecodeError::Fetch("404".into());
        assert_eq!(e.to_string(), "fetch failed: 404");
    }
}
