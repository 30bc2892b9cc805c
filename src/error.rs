use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImitateError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("generation service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation service returned HTTP {status}: {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("malformed service response: {0}")]
    MalformedResponse(String),

    #[error("image {index} could not be decoded: {reason}")]
    Decode { index: usize, reason: String },

    #[error("encoding error: {0}")]
    Encode(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImitateError {
    /// Process exit code for this error class. Service-side failures
    /// (transport, bad status, unparseable body) share one code so callers
    /// can tell "fix the input" apart from "fix the backend".
    pub fn exit_code(&self) -> i32 {
        match self {
            ImitateError::InvalidInput(_) => 2,
            ImitateError::Transport(_)
            | ImitateError::ServiceStatus { .. }
            | ImitateError::MalformedResponse(_) => 3,
            ImitateError::Decode { .. } => 4,
            ImitateError::Encode(_) | ImitateError::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImitateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_error_classes() {
        let invalid = ImitateError::InvalidInput("amount must be >= 1".into());
        let status = ImitateError::ServiceStatus {
            status: 500,
            body: "internal error".into(),
        };
        let decode = ImitateError::Decode {
            index: 1,
            reason: "not a png".into(),
        };

        assert_eq!(invalid.exit_code(), 2);
        assert_eq!(status.exit_code(), 3);
        assert_eq!(decode.exit_code(), 4);
    }

    #[test]
    fn decode_error_names_the_index() {
        let err = ImitateError::Decode {
            index: 3,
            reason: "truncated image data".into(),
        };
        assert!(err.to_string().contains("image 3"));
    }
}
