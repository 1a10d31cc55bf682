use thiserror::Error;

use crate::text::{MessageContext, Messages};

/// Raised when the parser configuration itself is broken (ex: a repeated parameter name).
///
/// This is a caller bug, not a runtime condition; it surfaces from
/// [`CommandParser::build_parser`](crate::CommandParser::build_parser) before any user
/// input is processed.
#[derive(Debug, Error)]
#[error("Config error: {0}")]
pub struct ConfigError(pub(crate) String);

/// The closed set of parse failure categories.
///
/// Every parse failure is tagged with exactly one category, so callers can react
/// programmatically without inspecting message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A failure that fits no other category.
    Unspecified,
    /// A raw token could not be converted to the argument's value type.
    ArgumentValueConversion,
    /// A named token did not resolve to any argument.
    UnknownArgument,
    /// A named argument needed a value and none was usable.
    MissingNamedArgumentValue,
    /// A single-value argument was supplied more than once under the reject policy.
    DuplicateArgument,
    /// More positional input was supplied than there are positional arguments,
    /// or a switch was given an explicit value.
    TooManyArguments,
    /// A required argument never received a value.
    MissingRequiredArgument,
    /// A dictionary entry could not be added (ex: duplicate key).
    InvalidDictionaryValue,
    /// Conversion produced a null value where none is permitted.
    NullArgumentValue,
    /// The accumulated value could not be applied to its target.
    ApplyValueError,
    /// A combined short-name token included an argument that takes a value.
    CombinedShortNameNonSwitch,
    /// A name prefix matched more than one argument.
    AmbiguousPrefixAlias,
    /// A validation rule rejected the input.
    ValidationFailed,
    /// A dictionary token lacked the key/value separator.
    MissingKeyValuePairSeparator,
}

/// A structured parse failure: category, offending argument (when known), localized
/// message, and the wrapped lower-level cause (when one exists).
///
/// Raw conversion/callback failures never escape the parser; they are always wrapped
/// here so every failure presents the same surface.
#[derive(Debug, Error)]
#[error("Parse error: {message}")]
pub struct ParseError {
    category: ErrorCategory,
    argument: Option<String>,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ParseError {
    /// Build an error through the message template table.
    ///
    /// `ValidationFailed` and `AmbiguousPrefixAlias` messages are not uniform templates;
    /// those call sites construct the error via [`ParseError::with_message`] instead.
    pub(crate) fn categorized(
        messages: &dyn Messages,
        category: ErrorCategory,
        argument: Option<String>,
        value: Option<&str>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let detail = source.as_ref().map(|s| s.to_string());
        let message = messages.categorized(
            category,
            MessageContext {
                argument: argument.as_deref(),
                value,
                detail: detail.as_deref(),
            },
        );

        Self {
            category,
            argument,
            message,
            source,
        }
    }

    pub(crate) fn with_message(
        category: ErrorCategory,
        argument: Option<String>,
        message: String,
    ) -> Self {
        Self {
            category,
            argument,
            message,
            source: None,
        }
    }

    /// The failure category.
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// The display name of the offending argument; absent for parse-wide failures.
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// The localized, single-sentence description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::DefaultMessages;
    use crate::test::assert_contains;

    #[derive(Debug, Error)]
    #[error("underlying boom")]
    struct Boom;

    #[test]
    fn categorized_carries_context() {
        let error = ParseError::categorized(
            &DefaultMessages,
            ErrorCategory::ArgumentValueConversion,
            Some("--count".to_string()),
            Some("bogus"),
            Some(Box::new(Boom)),
        );

        assert_eq!(error.category(), ErrorCategory::ArgumentValueConversion);
        assert_eq!(error.argument(), Some("--count"));
        assert_contains!(error.message(), "bogus");
        assert_contains!(error.message(), "--count");
        assert_contains!(error.to_string(), "Parse error");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn parse_wide_has_no_argument() {
        let error = ParseError::categorized(
            &DefaultMessages,
            ErrorCategory::TooManyArguments,
            None,
            Some("extra"),
            None,
        );

        assert_eq!(error.argument(), None);
        assert_contains!(error.message(), "extra");
    }

    #[test]
    fn with_message_is_verbatim() {
        let error = ParseError::with_message(
            ErrorCategory::ValidationFailed,
            Some("--port".to_string()),
            "Invalid value for the argument '--port': must be below 1024.".to_string(),
        );

        assert_eq!(error.category(), ErrorCategory::ValidationFailed);
        assert_contains!(error.message(), "below 1024");
    }
}
