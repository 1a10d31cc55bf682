use crate::error::ErrorCategory;

/// Contextual parameters for an error message template.
///
/// `argument` is the offending argument rendered with its name-prefix exactly as the
/// user would type it; it is absent for parse-wide failures (ex: surplus positional input).
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageContext<'c> {
    /// The display name of the offending argument, if the failure is argument-specific.
    pub argument: Option<&'c str>,
    /// The offending input text, if any.
    pub value: Option<&'c str>,
    /// A short lower-level reason (ex: the wrapped conversion failure), if any.
    pub detail: Option<&'c str>,
}

/// Provider of every user-facing string emitted by the parser.
///
/// The parser core never hardcodes sentences; implement this trait to localize or
/// re-word diagnostics and the built-in help/version texts.
pub trait Messages {
    /// The message for an error of the given category.
    ///
    /// [`ErrorCategory::ValidationFailed`] and [`ErrorCategory::AmbiguousPrefixAlias`]
    /// never arrive here; their messages are multi-variant and composed through
    /// [`Messages::validation_failed`] and [`Messages::ambiguous_prefix`] instead.
    fn categorized(&self, category: ErrorCategory, context: MessageContext<'_>) -> String;

    /// The message for a failed validation rule on `argument`.
    fn validation_failed(&self, argument: &str, reason: &str) -> String;

    /// The message for a name prefix matching more than one argument.
    fn ambiguous_prefix(&self, prefix: &str, candidates: &[String]) -> String;

    /// The warning recorded when a repeated argument overwrites its prior value.
    fn duplicate_warning(&self, argument: &str) -> String;

    /// The help text of the built-in help switch.
    fn help_summary(&self) -> String;

    /// The help text of the built-in version switch.
    fn version_summary(&self) -> String;

    /// The usage line heading (ex: `usage`).
    fn usage_heading(&self) -> String;

    /// The heading above positional arguments in usage help.
    fn arguments_heading(&self) -> String;

    /// The heading above options in usage help.
    fn options_heading(&self) -> String;
}

/// The stock English [`Messages`] implementation.
#[derive(Debug, Default)]
pub struct DefaultMessages;

impl Messages for DefaultMessages {
    fn categorized(&self, category: ErrorCategory, context: MessageContext<'_>) -> String {
        let argument = context.argument.unwrap_or("<unknown>");

        match category {
            ErrorCategory::Unspecified => "An error occurred parsing the command line.".to_string(),
            ErrorCategory::ArgumentValueConversion => {
                let value = context.value.unwrap_or_default();
                match context.detail {
                    Some(detail) => format!(
                        "The value '{value}' is not valid for the argument '{argument}': {detail}."
                    ),
                    None => {
                        format!("The value '{value}' is not valid for the argument '{argument}'.")
                    }
                }
            }
            ErrorCategory::UnknownArgument => format!("Unknown argument '{argument}'."),
            ErrorCategory::MissingNamedArgumentValue => {
                format!("No value was supplied for the argument '{argument}'.")
            }
            ErrorCategory::DuplicateArgument => {
                format!("The argument '{argument}' was supplied more than once.")
            }
            ErrorCategory::TooManyArguments => match context.argument {
                Some(argument) => format!("The argument '{argument}' does not accept a value."),
                None => match context.value {
                    Some(value) => format!("Too many arguments were supplied (unexpected '{value}')."),
                    None => "Too many arguments were supplied.".to_string(),
                },
            },
            ErrorCategory::MissingRequiredArgument => {
                format!("The required argument '{argument}' was not supplied.")
            }
            ErrorCategory::InvalidDictionaryValue => {
                let detail = context.detail.unwrap_or("invalid entry");
                format!("Invalid dictionary value for the argument '{argument}': {detail}.")
            }
            ErrorCategory::NullArgumentValue => {
                format!("The argument '{argument}' does not accept a null value.")
            }
            ErrorCategory::ApplyValueError => {
                let detail = context.detail.unwrap_or("unrecoverable failure");
                format!("Could not apply the value for the argument '{argument}': {detail}.")
            }
            ErrorCategory::CombinedShortNameNonSwitch => {
                let value = context.value.unwrap_or_default();
                format!(
                    "The combined short arguments '{value}' may only contain switches ('{argument}' takes a value)."
                )
            }
            ErrorCategory::MissingKeyValuePairSeparator => {
                let value = context.value.unwrap_or_default();
                format!(
                    "The value '{value}' for the argument '{argument}' is missing a key/value separator."
                )
            }
            // Multi-variant messages; composed at their call sites.
            ErrorCategory::ValidationFailed | ErrorCategory::AmbiguousPrefixAlias => {
                unreachable!("internal error - must not route {category:?} through the template table")
            }
        }
    }

    fn validation_failed(&self, argument: &str, reason: &str) -> String {
        format!("Invalid value for the argument '{argument}': {reason}.")
    }

    fn ambiguous_prefix(&self, prefix: &str, candidates: &[String]) -> String {
        format!(
            "The argument name '{prefix}' is ambiguous; it could mean any of: {c}.",
            c = candidates.join(", ")
        )
    }

    fn duplicate_warning(&self, argument: &str) -> String {
        format!("The argument '{argument}' was supplied more than once; using the last value.")
    }

    fn help_summary(&self) -> String {
        "Show this help message and exit.".to_string()
    }

    fn version_summary(&self) -> String {
        "Show the version and exit.".to_string()
    }

    fn usage_heading(&self) -> String {
        "usage".to_string()
    }

    fn arguments_heading(&self) -> String {
        "arguments".to_string()
    }

    fn options_heading(&self) -> String {
        "options".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::assert_contains;

    #[test]
    fn conversion_references_value_and_argument() {
        let message = DefaultMessages.categorized(
            ErrorCategory::ArgumentValueConversion,
            MessageContext {
                argument: Some("--count"),
                value: Some("bogus"),
                detail: None,
            },
        );
        assert_contains!(message, "bogus");
        assert_contains!(message, "--count");
    }

    #[test]
    fn too_many_variants() {
        let with_argument = DefaultMessages.categorized(
            ErrorCategory::TooManyArguments,
            MessageContext {
                argument: Some("--verbose"),
                value: None,
                detail: None,
            },
        );
        assert_contains!(with_argument, "--verbose");

        let parse_wide = DefaultMessages.categorized(
            ErrorCategory::TooManyArguments,
            MessageContext {
                argument: None,
                value: Some("extra"),
                detail: None,
            },
        );
        assert_contains!(parse_wide, "extra");
    }

    #[test]
    fn ambiguous_prefix_lists_candidates() {
        let message = DefaultMessages.ambiguous_prefix(
            "--co",
            &["--config".to_string(), "--count".to_string()],
        );
        assert_contains!(message, "--config");
        assert_contains!(message, "--count");
    }

    #[test]
    #[should_panic]
    fn validation_failed_never_templated() {
        DefaultMessages.categorized(ErrorCategory::ValidationFailed, MessageContext::default());
    }
}
