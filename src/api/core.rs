use crate::api::field::Trigger;
use crate::api::parameter::Parameter;
use crate::constant::{HELP_NAME, HELP_SHORT, VERSION_NAME};
use crate::error::ConfigError;
use crate::model::{CancelMode, DuplicatePolicy, ParsingMode};
use crate::parser::{
    ArgumentParser, BoundArgument, ConsoleInterface, Engine, Printer, UserInterface,
};
use crate::text::{DefaultMessages, Messages};

/// The base command line parser builder.
///
/// Every parser carries an automatic `help` switch; a `version` switch is added by
/// [`CommandParser::version`].
///
/// ### Example
/// ```
/// use argent::{CommandParser, Parameter, Scalar, Switch};
///
/// let mut verbose: bool = false;
/// let mut count: u32 = 1;
/// let mut parser = CommandParser::new("program")
///     .add(Parameter::option(Switch::new(&mut verbose, true), "verbose", Some('v')))
///     .add(Parameter::option(Scalar::new(&mut count), "count", Some('c')))
///     .build_parser()
///     .unwrap();
///
/// parser.try_parse_tokens(&["-v", "--count", "3"]).unwrap();
/// drop(parser);
///
/// assert!(verbose);
/// assert_eq!(count, 3);
/// ```
pub struct CommandParser<'a> {
    program: String,
    about: Option<String>,
    mode: ParsingMode,
    duplicates: DuplicatePolicy,
    prefix_aliases: bool,
    version: Option<String>,
    messages: Box<dyn Messages>,
    parts: Vec<BoundArgument<'a>>,
}

impl<'a> CommandParser<'a> {
    /// Create a command line parser builder.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            about: None,
            mode: ParsingMode::default(),
            duplicates: DuplicatePolicy::default(),
            prefix_aliases: true,
            version: None,
            messages: Box::new(DefaultMessages),
            parts: Vec::default(),
        }
    }

    /// Document the about message for this command line parser.
    /// If repeated, only the final message will apply.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Select how option names are written on the command line.
    pub fn mode(mut self, mode: ParsingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Select the policy for single-value options supplied more than once.
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Enable or disable matching options by an unambiguous prefix of their long name.
    /// Enabled by default.
    pub fn prefix_aliases(mut self, enabled: bool) -> Self {
        self.prefix_aliases = enabled;
        self
    }

    /// Add an automatic `version` switch that prints the given version and stops
    /// parsing.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version.replace(version.into());
        self
    }

    /// Replace the provider of every user-facing string (diagnostics, help/version
    /// texts, usage headings).
    pub fn messages(mut self, messages: impl Messages + 'static) -> Self {
        self.messages = Box::new(messages);
        self
    }

    /// Add an argument/option to the command line parser.
    ///
    /// The order of positional argument parameters corresponds to their parse order,
    /// unless pinned with [`Parameter::at`].  The order of option parameters does not
    /// affect the parser semantics.
    ///
    /// ### Example
    /// ```
    /// use argent::{CommandParser, Parameter, Scalar};
    ///
    /// let mut a: u32 = 0;
    /// let mut b: u32 = 0;
    /// let mut parser = CommandParser::new("program")
    ///     .add(Parameter::argument(Scalar::new(&mut a), "a"))
    ///     .add(Parameter::argument(Scalar::new(&mut b), "b"))
    ///     .build_parser()
    ///     .unwrap();
    ///
    /// parser.try_parse_tokens(&["1", "2"]).unwrap();
    /// drop(parser);
    ///
    /// assert_eq!(a, 1);
    /// assert_eq!(b, 2);
    /// ```
    pub fn add<T: 'a>(mut self, parameter: Parameter<'a, T>) -> Self {
        self.parts.push(parameter.consume());
        self
    }

    pub(crate) fn build_with_interface(
        self,
        user_interface: Box<dyn UserInterface>,
    ) -> Result<ArgumentParser<'a>, ConfigError> {
        let CommandParser {
            program,
            about,
            mode,
            duplicates,
            prefix_aliases,
            version,
            messages,
            parts: user_parts,
        } = self;

        // The built-ins lead the help listing.
        let mut parts: Vec<BoundArgument<'a>> = Vec::default();
        parts.push(
            Parameter::option(Trigger::new(), HELP_NAME, Some(HELP_SHORT))
                .cancel(CancelMode::AbortWithHelp)
                .help(messages.help_summary())
                .consume(),
        );

        if version.is_some() {
            parts.push(
                Parameter::option(Trigger::new(), VERSION_NAME, None)
                    .cancel(CancelMode::Abort)
                    .help(messages.version_summary())
                    .consume(),
            );
        }

        parts.extend(user_parts);

        let engine = Engine::new(mode, duplicates, prefix_aliases, parts)?;
        let printer = Printer::terminal(about, engine.descriptors().to_vec(), mode);

        Ok(ArgumentParser::assemble(
            program,
            engine,
            printer,
            version,
            user_interface,
            messages,
        ))
    }

    /// Build the command line parser as a Result.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter
    /// name, a default that does not convert).
    pub fn build_parser(self) -> Result<ArgumentParser<'a>, ConfigError> {
        self.build_with_interface(Box::new(ConsoleInterface::default()))
    }

    /// Build the command line parser.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter
    /// name).  If an error is encountered, exits with error code `1` (via
    /// [`std::process::exit`]).
    pub fn build(self) -> ArgumentParser<'a> {
        match self.build_parser() {
            Ok(parser) => parser,
            Err(error) => {
                eprintln!("{error}");
                std::process::exit(1);
            }
        }
    }
}
