use thiserror::Error;

/// Failures raised while building the highlighter or tokenizing code.
///
/// Messages are stored as strings so the error stays `Clone`: a memoized
/// engine or grammar load hands the same failure to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HighlightError {
    #[error("invalid grammar `{name}`: {message}")]
    InvalidGrammar { name: String, message: String },

    #[error("invalid theme `{name}`: {message}")]
    InvalidTheme { name: String, message: String },

    #[error("failed to fetch grammar `{name}`: {message}")]
    Fetch { name: String, message: String },

    #[error("line {line} is {len} bytes, above the {limit} byte tokenization limit")]
    LineTooLong {
        line: usize,
        len: usize,
        limit: usize,
    },

    #[error("failed to parse `{language}` code: {message}")]
    Parse { language: String, message: String },
}

impl HighlightError {
    pub(crate) fn grammar(name: &str, message: impl ToString) -> Self {
        HighlightError::InvalidGrammar {
            name: name.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn theme(name: &str, message: impl ToString) -> Self {
        HighlightError::InvalidTheme {
            name: name.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn parse(language: &str, message: impl ToString) -> Self {
        HighlightError::Parse {
            language: language.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn fetch(name: &str, message: impl ToString) -> Self {
        HighlightError::Fetch {
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}
