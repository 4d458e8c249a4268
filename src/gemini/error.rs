use std::fmt;

use thiserror::Error;

use super::transport::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ConnectionTest,
    TextGeneration,
    Synthesis,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::ConnectionTest => "Connection",
            Operation::TextGeneration => "Text generation",
            Operation::Synthesis => "TTS generation",
        };
        f.write_str(label)
    }
}

/// Failures of a single client call. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Client not initialized")]
    NotConfigured,
    #[error("API call failed: HTTP {status}: {body}")]
    ConnectionRejected { status: u16, body: String },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("No text generated")]
    NoText,
    #[error("No audio content in response")]
    NoAudio,
    #[error("{operation} failed: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: TransportError,
    },
    #[error("{operation} failed: {source}")]
    MalformedBody {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },
    #[error("{operation} failed: {source}")]
    InvalidAudio {
        operation: Operation,
        #[source]
        source: base64::DecodeError,
    },
}

impl GeminiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GeminiError::ConnectionRejected { status, .. } | GeminiError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_what_the_dialog_shows() {
        assert_eq!(GeminiError::NoText.to_string(), "No text generated");
        assert_eq!(
            GeminiError::NoAudio.to_string(),
            "No audio content in response"
        );
        assert_eq!(
            GeminiError::Status {
                status: 400,
                body: "bad request".to_string()
            }
            .to_string(),
            "HTTP 400: bad request"
        );
        assert_eq!(
            GeminiError::ConnectionRejected {
                status: 403,
                body: "denied".to_string()
            }
            .to_string(),
            "API call failed: HTTP 403: denied"
        );
    }

    #[test]
    fn transport_failures_are_prefixed_by_operation() {
        let err = GeminiError::Transport {
            operation: Operation::ConnectionTest,
            source: TransportError::Connect("dns error".to_string()),
        };
        assert_eq!(err.to_string(), "Connection failed: could not connect: dns error");

        let err = GeminiError::Transport {
            operation: Operation::Synthesis,
            source: TransportError::Connect("refused".to_string()),
        };
        assert_eq!(err.to_string(), "TTS generation failed: could not connect: refused");
    }
}
