use std::env;

use crate::constant::VERSION_NAME;
use crate::error::ParseError;
use crate::parser::base::Engine;
use crate::parser::interface::{ErrorContext, UserInterface};
use crate::parser::printer::Printer;
use crate::parser::session::{Outcome, ParseStatus};
use crate::text::Messages;

/// The configured command line parser.
/// Built via [`CommandParser::build`](crate::CommandParser::build) or
/// [`CommandParser::build_parser`](crate::CommandParser::build_parser).
pub struct ArgumentParser<'a> {
    program: String,
    engine: Engine<'a>,
    printer: Printer,
    version: Option<String>,
    user_interface: Box<dyn UserInterface>,
    messages: Box<dyn Messages>,
}

impl<'a> std::fmt::Debug for ArgumentParser<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentParser")
            .field("program", &self.program)
            .finish()
    }
}

impl<'a> ArgumentParser<'a> {
    pub(crate) fn assemble(
        program: String,
        engine: Engine<'a>,
        printer: Printer,
        version: Option<String>,
        user_interface: Box<dyn UserInterface>,
        messages: Box<dyn Messages>,
    ) -> Self {
        Self {
            program,
            engine,
            printer,
            version,
            user_interface,
            messages,
        }
    }

    /// Run the parser against the input tokens, returning the structured outcome.
    ///
    /// Nothing is printed; cancellations (help/version included) surface on the
    /// [`Outcome`] and failures as [`ParseError`].  Bound variables are assigned only
    /// when the outcome's status is [`ParseStatus::Success`].
    ///
    /// The parser resets its transient state up front, so it may be driven repeatedly,
    /// just not concurrently.
    pub fn try_parse_tokens(&mut self, tokens: &[&str]) -> Result<Outcome, ParseError> {
        self.engine
            .parse(tokens, &*self.messages)
            .map_err(|(_, error)| error)
    }

    /// Run the parser against the input tokens.
    ///
    /// Diagnostics are printed through the configured interface.  Returns `Err` with the
    /// intended exit code when parsing should not proceed: `0` after help/version or any
    /// other discard-cancellation, `1` after a parse failure.
    pub fn parse_tokens(&mut self, tokens: &[&str]) -> Result<Outcome, i32> {
        match self.engine.parse(tokens, &*self.messages) {
            Ok(outcome) => {
                for warning in outcome.warnings() {
                    self.user_interface.print_warning(warning.clone());
                }

                if outcome.help_requested() {
                    self.printer
                        .print_help(&self.program, &*self.messages, &*self.user_interface);
                    return Err(0);
                }

                if outcome.status() == ParseStatus::Canceled {
                    if outcome.canceled_by() == Some(VERSION_NAME) {
                        if let Some(version) = &self.version {
                            self.user_interface
                                .print(format!("{p} {version}", p = self.program));
                        }
                    }

                    return Err(0);
                }

                Ok(outcome)
            }
            Err((offset, error)) => {
                self.user_interface.print_error(&error);
                self.user_interface
                    .print_error_context(ErrorContext::new(offset, tokens));
                Err(1)
            }
        }
    }

    /// Run the parser against the Cli [`env::args`].
    ///
    /// Prints diagnostics and exits the process (via [`std::process::exit`]) on failure
    /// or cancellation: code `0` after help/version, code `1` after a parse failure.
    pub fn parse(&mut self) -> Outcome {
        let command_input: Vec<String> = env::args().skip(1).collect();

        match self.parse_tokens(
            command_input
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .as_slice(),
        ) {
            Ok(outcome) => outcome,
            Err(exit_code) => {
                std::process::exit(exit_code);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{CommandParser, Parameter, Scalar};
    use crate::model::{DuplicatePolicy, ParsingMode};
    use crate::parser::interface::util::channel_interface;
    use crate::parser::session::ParseStatus;
    use crate::test::assert_contains;
    use rstest::rstest;

    #[test]
    fn parse_tokens_empty() {
        let (sender, receiver) = channel_interface();
        let mut parser = CommandParser::new("program")
            .build_with_interface(Box::new(sender))
            .unwrap();

        let outcome = parser.parse_tokens(empty::slice()).unwrap();
        assert_eq!(outcome.status(), ParseStatus::Success);

        drop(parser);
        let (message, warning, error, error_context) = receiver.consume();
        assert_eq!(message, None);
        assert_eq!(warning, None);
        assert_eq!(error, None);
        assert_eq!(error_context, None);
    }

    #[rstest]
    #[case(vec!["--help"])]
    #[case(vec!["-h"])]
    fn parse_tokens_help(#[case] tokens: Vec<&str>) {
        let (sender, receiver) = channel_interface();
        let mut count: u32 = 0;
        {
            let mut parser = CommandParser::new("program")
                .add(Parameter::option(Scalar::new(&mut count), "count", Some('c')))
                .build_with_interface(Box::new(sender))
                .unwrap();

            let error_code = parser.parse_tokens(tokens.as_slice()).unwrap_err();
            assert_eq!(error_code, 0);
        }

        let message = receiver.consume_message();
        assert_contains!(message, "usage: program [-h]");
        assert_contains!(message, "-h, --help");
    }

    #[test]
    fn parse_tokens_version() {
        let (sender, receiver) = channel_interface();
        {
            let mut parser = CommandParser::new("program")
                .version("1.2.3")
                .build_with_interface(Box::new(sender))
                .unwrap();

            let error_code = parser.parse_tokens(&["--version"]).unwrap_err();
            assert_eq!(error_code, 0);
        }

        let message = receiver.consume_message();
        assert_contains!(message, "program 1.2.3");
    }

    #[test]
    fn parse_tokens_error() {
        let (sender, receiver) = channel_interface();
        let mut count: u32 = 0;
        {
            let mut parser = CommandParser::new("program")
                .add(Parameter::option(Scalar::new(&mut count), "count", Some('c')))
                .build_with_interface(Box::new(sender))
                .unwrap();

            let error_code = parser.parse_tokens(&["--count", "not-a-u32"]).unwrap_err();
            assert_eq!(error_code, 1);
        }

        let (message, warning, error, error_context) = receiver.consume();
        assert_eq!(message, None);
        assert_eq!(warning, None);
        let error = error.unwrap();
        assert_contains!(error, "Parse error");
        assert_contains!(error, "not-a-u32");
        let context = error_context.unwrap().to_string();
        assert_contains!(context, "--count not-a-u32");
    }

    #[test]
    fn parse_tokens_warning() {
        let (sender, receiver) = channel_interface();
        let mut count: u32 = 0;
        {
            let mut parser = CommandParser::new("program")
                .duplicates(DuplicatePolicy::Warn)
                .add(Parameter::option(Scalar::new(&mut count), "count", Some('c')))
                .build_with_interface(Box::new(sender))
                .unwrap();

            parser
                .parse_tokens(&["--count", "1", "--count", "2"])
                .unwrap();
        }

        let (message, warning, error, error_context) = receiver.consume();
        assert_eq!(message, None);
        assert_contains!(warning.unwrap(), "--count");
        assert_eq!(error, None);
        assert_eq!(error_context, None);
        assert_eq!(count, 2);
    }

    #[test]
    fn parse_tokens_single_dash_help() {
        let (sender, receiver) = channel_interface();
        {
            let mut parser = CommandParser::new("program")
                .mode(ParsingMode::SingleDash)
                .build_with_interface(Box::new(sender))
                .unwrap();

            let error_code = parser.parse_tokens(&["-help"]).unwrap_err();
            assert_eq!(error_code, 0);
        }

        let message = receiver.consume_message();
        assert_contains!(message, "usage: program [-help]");
    }
}
