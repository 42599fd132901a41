//! Error type shared by every stage of the build.
//!
//! Transport, decoding and I/O failures are carried through unchanged
//! (`#[error(transparent)]`) so the caller sees exactly what the underlying
//! layer raised. The remaining variants cover the mapping rules that have no
//! library error of their own.

use thiserror::Error;

/// Everything that can abort a build.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Render(#[from] std::fmt::Error),

    /// A timestamp matched none of the accepted formats.
    #[error("could not parse date `{input}`")]
    DateParse { input: String },

    /// A published post carried neither a published nor a created timestamp.
    #[error("post `{title}` has neither a published nor a created timestamp")]
    MissingDate { title: String },

    /// A published post carried no author object.
    #[error("post `{title}` has no author")]
    MissingAuthor { title: String },

    #[error("required setting `{0}` is missing or empty")]
    MissingSetting(&'static str),

    /// A `*_save_as` pattern contained an unknown strftime directive.
    #[error("invalid date pattern `{0}`")]
    InvalidPattern(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_parse_message_names_input() {
        let err = Error::DateParse {
            input: "yesterday-ish".to_string(),
        };
        assert_eq!(err.to_string(), "could not parse date `yesterday-ish`");
    }

    #[test]
    fn test_json_error_is_transparent() {
        let inner = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let expected = inner.to_string();
        let err: Error = inner.into();
        assert_eq!(err.to_string(), expected);
    }
}
