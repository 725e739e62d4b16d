use std::path::PathBuf;

use stark_felt::FeltError;
use thiserror::Error;

/// Everything that can go wrong while loading or storing a program document.
///
/// Variants carry the key path of the offending value (e.g.
/// `entry_points_by_type.EXTERNAL[0].builtins[1]`) so errors are actionable
/// without re-reading the document.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// `path` is empty when the name was decoded outside of a document.
    #[error("Unknown builtin '{name}'{}", location(.path))]
    UnknownBuiltin { path: String, name: String },

    /// The hint record is not a two-element list.
    #[error("Malformed hint tuple at {path}: expected [index, [hint, ...]], found {found}")]
    MalformedHintTuple { path: String, found: String },

    #[error("Invalid hint index at {path}: {token} is not an unsigned 64-bit integer")]
    InvalidHintIndex { path: String, token: String },

    #[error("Invalid hint payload at {path}: {reason}")]
    InvalidHintPayload { path: String, reason: String },

    #[error("Invalid field element at {path}: {source}")]
    InvalidFieldElement {
        path: String,
        #[source]
        source: FeltError,
    },

    #[error("Missing required field '{0}'")]
    MissingRequiredField(&'static str),

    #[error("Unexpected type at {path}: expected {expected}, found {found}")]
    UnexpectedType {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// The resource holding the document could not be read or written.
    #[error("Resource unavailable: {}", path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ProgramResult<T> = Result<T, ProgramError>;

fn location(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at {path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_builtin_message_includes_location_when_known() {
        let standalone = ProgramError::UnknownBuiltin {
            path: String::new(),
            name: "sha256".to_owned(),
        };
        assert_eq!(standalone.to_string(), "Unknown builtin 'sha256'");

        let in_document = ProgramError::UnknownBuiltin {
            path: "entry_points_by_type.EXTERNAL[0].builtins[1]".to_owned(),
            name: "sha256".to_owned(),
        };
        assert_eq!(
            in_document.to_string(),
            "Unknown builtin 'sha256' at entry_points_by_type.EXTERNAL[0].builtins[1]"
        );
    }
}
