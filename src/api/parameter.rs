use crate::api::capture::{CliArgument, CliOption, FieldError, GenericField};
use crate::api::convert::Converted;
use crate::api::validate::Rule;
use crate::model::{Arity, CancelMode, Descriptor};
use crate::parser::SessionView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ParameterClass {
    Opt,
    Arg,
}

pub(super) struct ParameterInner<'a, T> {
    class: ParameterClass,
    field: Box<dyn GenericField<'a, T> + 'a>,
    rules: Vec<Rule<'a, T>>,
    name: String,
    short: Option<char>,
    aliases: Vec<String>,
    short_aliases: Vec<char>,
    long_suppressed: bool,
    position: Option<usize>,
    required: bool,
    hidden: bool,
    cancel: CancelMode,
    category: Option<String>,
    help: Option<String>,
    value_description: Option<String>,
    default_text: Option<String>,
    separator: Option<char>,
}

/// An argument/option for the command parser.
/// Used with [`CommandParser::add`](crate::CommandParser::add).
pub struct Parameter<'a, T>(ParameterInner<'a, T>);

impl<'a, T: 'a> Parameter<'a, T> {
    /// Create an option parameter: matched by name, in any order.
    ///
    /// ### Example
    /// ```
    /// use argent::{Parameter, Switch};
    ///
    /// let mut verbose: bool = false;
    /// Parameter::option(Switch::new(&mut verbose, true), "verbose", Some('v'));
    /// ```
    pub fn option(
        field: impl GenericField<'a, T> + CliOption + 'a,
        name: impl Into<String>,
        short: Option<char>,
    ) -> Self {
        Self(ParameterInner {
            class: ParameterClass::Opt,
            field: Box::new(field),
            rules: Vec::default(),
            name: name.into(),
            short,
            aliases: Vec::default(),
            short_aliases: Vec::default(),
            long_suppressed: false,
            position: None,
            required: false,
            hidden: false,
            cancel: CancelMode::None,
            category: None,
            help: None,
            value_description: None,
            default_text: None,
            separator: None,
        })
    }

    /// Create a positional argument parameter: matched by token order.
    ///
    /// ### Example
    /// ```
    /// use argent::{Parameter, Scalar};
    ///
    /// let mut source: String = String::default();
    /// Parameter::argument(Scalar::new(&mut source), "source");
    /// ```
    pub fn argument(
        field: impl GenericField<'a, T> + CliArgument + 'a,
        name: impl Into<String>,
    ) -> Self {
        Self(ParameterInner {
            class: ParameterClass::Arg,
            field: Box::new(field),
            rules: Vec::default(),
            name: name.into(),
            short: None,
            aliases: Vec::default(),
            short_aliases: Vec::default(),
            long_suppressed: false,
            position: None,
            required: false,
            hidden: false,
            cancel: CancelMode::None,
            category: None,
            help: None,
            value_description: None,
            default_text: None,
            separator: None,
        })
    }

    /// Document the help message for this parameter.
    /// If repeated, only the final message will apply.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.0.help = Some(description.into());
        self
    }

    /// Add an alternative long name.  May be repeated.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.0.aliases.push(alias.into());
        self
    }

    /// Add an alternative short name.  May be repeated.
    pub fn short_alias(mut self, alias: char) -> Self {
        self.0.short_aliases.push(alias);
        self
    }

    /// Drop the long name from the command line surface; only the short name matches.
    pub fn suppress_long_name(mut self) -> Self {
        self.0.long_suppressed = true;
        self
    }

    /// Require that this parameter receives a value during the parse.
    pub fn required(mut self) -> Self {
        self.0.required = true;
        self
    }

    /// Exclude this parameter from usage help.  A hidden parameter can be neither
    /// required nor positional.
    pub fn hidden(mut self) -> Self {
        self.0.hidden = true;
        self
    }

    /// Declare what happens to the overall parse when this parameter receives a value.
    ///
    /// For a [`Callback`](crate::Callback) parameter the callback's own return value is
    /// used instead.
    pub fn cancel(mut self, mode: CancelMode) -> Self {
        self.0.cancel = mode;
        self
    }

    /// Tag this parameter with a display grouping.  Never affects parsing.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.0.category = Some(category.into());
        self
    }

    /// Supply a default, written as input text.
    ///
    /// The text is run through the parameter's conversion once at build time, so a
    /// default that does not convert is a configuration error, caught before any user
    /// input is processed.  Only single-value parameters accept a default, and a
    /// required parameter may not carry one.
    pub fn default_text(mut self, text: impl Into<String>) -> Self {
        self.0.default_text = Some(text.into());
        self
    }

    /// Pin this positional argument to an explicit zero-based position.
    /// Arguments without an explicit position follow, in the order they were added.
    pub fn at(mut self, position: usize) -> Self {
        self.0.position = Some(position);
        self
    }

    /// Split each occurrence's token on `separator` and process the pieces as repeated
    /// values (ex: `--include a,b,c`).  Only repeatable parameters accept a separator.
    pub fn separator(mut self, separator: char) -> Self {
        self.0.separator = Some(separator);
        self
    }

    /// Override the description of this parameter's values shown in usage help and
    /// diagnostics.
    pub fn value_description(mut self, description: impl Into<String>) -> Self {
        self.0.value_description = Some(description.into());
        self
    }

    /// Attach a validation rule.  May be repeated; rules run in declaration order at
    /// their respective checkpoints.
    ///
    /// ### Example
    /// ```
    /// use argent::{Parameter, Rule, Scalar};
    ///
    /// let mut port: u16 = 8080;
    /// Parameter::option(Scalar::new(&mut port), "port", Some('p'))
    ///     .validate(Rule::after_conversion(|port: &u16| {
    ///         if *port >= 1024 {
    ///             Ok(())
    ///         } else {
    ///             Err("must not be a privileged port".to_string())
    ///         }
    ///     }));
    /// ```
    pub fn validate(mut self, rule: Rule<'a, T>) -> Self {
        self.0.rules.push(rule);
        self
    }

    pub(crate) fn consume(self) -> (Descriptor, Box<dyn AnonymousBinding<'a> + 'a>) {
        let inner = self.0;
        let descriptor = Descriptor {
            name: inner.name,
            short: inner.short,
            aliases: inner.aliases,
            short_aliases: inner.short_aliases,
            long_suppressed: inner.long_suppressed,
            positional: inner.class == ParameterClass::Arg,
            position: inner.position,
            arity: inner.field.arity(),
            nargs: inner.field.nargs(),
            required: inner.required,
            hidden: inner.hidden,
            cancel: inner.cancel,
            category: inner.category,
            help: inner.help,
            value_description: inner
                .value_description
                .unwrap_or_else(|| inner.field.value_description()),
            default_text: inner.default_text,
            separator: inner.separator,
        };
        let binding = TypedBinding {
            field: inner.field,
            rules: inner.rules,
            cancel: descriptor.cancel,
            separator: descriptor.separator,
            occupied: false,
        };

        (descriptor, Box::new(binding))
    }
}

/// The result of driving one value occurrence through a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SetOutcome {
    pub(crate) cancel: CancelMode,
    pub(crate) duplicate: bool,
}

// We need a (dyn .. [ignoring T] ..) here in order to put all the fields of varying types T
// under one collection.  The bottom of the object graph keeps the types T; up here the
// engine works across all T.
pub(crate) trait AnonymousBinding<'a> {
    /// Drive one occurrence through the pipeline: raw rules, conversion, typed rules,
    /// accumulation.  `None` means the parameter was matched without a value token.
    fn set_value(&mut self, token: Option<&str>) -> Result<SetOutcome, FieldError>;

    /// Probe the conversion without accumulating; used to vet default text at build time.
    fn check_convert(&self, token: &str) -> Result<(), FieldError>;

    /// Inject the default (when nothing was accumulated) and apply onto the target.
    fn finish(&mut self, default_text: Option<&str>) -> Result<(), FieldError>;

    /// Run the after-parsing rules.
    fn validate_after_parsing(&self, view: &SessionView<'_>) -> Result<(), String>;

    /// Restore the pristine pre-parse state.  Idempotent.
    fn reset(&mut self);
}

pub(crate) struct TypedBinding<'a, T> {
    field: Box<dyn GenericField<'a, T> + 'a>,
    rules: Vec<Rule<'a, T>>,
    cancel: CancelMode,
    separator: Option<char>,
    occupied: bool,
}

impl<'a, T> TypedBinding<'a, T> {
    fn resolve(&self, accepted_cancel: CancelMode) -> CancelMode {
        // A callback decides its own cancellation; everything else follows the
        // declaration.
        if self.field.arity() == Arity::Method {
            accepted_cancel
        } else {
            self.cancel
        }
    }

    fn set_one(&mut self, token: &str) -> Result<SetOutcome, FieldError> {
        for rule in &self.rules {
            rule.check_raw(token).map_err(FieldError::Rule)?;
        }

        let converted = self.field.convert(token)?;

        // An aborted parse discards its results, so there is nothing to validate.
        let declared_abort = self.field.arity() != Arity::Method
            && matches!(self.cancel, CancelMode::Abort | CancelMode::AbortWithHelp);

        if !declared_abort {
            if let Converted::Value(ref value) = converted {
                for rule in &self.rules {
                    rule.check_typed(value).map_err(FieldError::Rule)?;
                }
            }
        }

        let accepted = self.field.accumulate(converted)?;
        self.occupied = true;

        Ok(SetOutcome {
            cancel: self.resolve(accepted.cancel),
            duplicate: accepted.displaced,
        })
    }
}

impl<'a, T> AnonymousBinding<'a> for TypedBinding<'a, T> {
    fn set_value(&mut self, token: Option<&str>) -> Result<SetOutcome, FieldError> {
        match token {
            None => {
                let accepted = self.field.matched();
                self.occupied = true;
                Ok(SetOutcome {
                    cancel: self.resolve(accepted.cancel),
                    duplicate: accepted.displaced,
                })
            }
            Some(token) => {
                let pieces: Vec<&str> = match self.separator {
                    Some(separator) if token.contains(separator) => {
                        token.split(separator).collect()
                    }
                    _ => vec![token],
                };

                let mut duplicate = false;

                for piece in pieces {
                    let outcome = self.set_one(piece)?;
                    duplicate |= outcome.duplicate;

                    if outcome.cancel != CancelMode::None {
                        // Short-circuit the remaining pieces.
                        return Ok(SetOutcome {
                            cancel: outcome.cancel,
                            duplicate,
                        })
                    }
                }

                Ok(SetOutcome {
                    cancel: CancelMode::None,
                    duplicate,
                })
            }
        }
    }

    fn check_convert(&self, token: &str) -> Result<(), FieldError> {
        self.field.convert(token).map(|_| ())
    }

    fn finish(&mut self, default_text: Option<&str>) -> Result<(), FieldError> {
        if !self.occupied {
            if let Some(text) = default_text {
                let converted = self.field.convert(text)?;
                self.field.accumulate(converted)?;
            }
        }

        self.field.apply()
    }

    fn validate_after_parsing(&self, view: &SessionView<'_>) -> Result<(), String> {
        for rule in &self.rules {
            rule.check_after_parsing(view)?;
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.occupied = false;
        self.field.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::field::{Collection, Scalar, Switch};
    use crate::model::Nargs;

    #[test]
    fn option() {
        let mut flag: bool = false;
        let (descriptor, _) =
            Parameter::option(Switch::new(&mut flag, true), "flag", Some('f')).consume();

        assert_eq!(descriptor.name(), "flag");
        assert_eq!(descriptor.short(), Some('f'));
        assert!(!descriptor.positional());
        assert!(descriptor.is_switch());
        assert_eq!(descriptor.nargs(), Nargs::Precisely(0));
        assert_eq!(descriptor.cancel(), CancelMode::None);
    }

    #[test]
    fn argument() {
        let mut item: u32 = 0;
        let (descriptor, _) = Parameter::argument(Scalar::new(&mut item), "item")
            .at(2)
            .required()
            .consume();

        assert_eq!(descriptor.name(), "item");
        assert!(descriptor.positional());
        assert_eq!(descriptor.position(), Some(2));
        assert!(descriptor.required());
        assert!(!descriptor.is_switch());
        assert_eq!(descriptor.value_description(), "u32");
    }

    #[test]
    fn option_decorated() {
        let mut size: u64 = 0;
        let (descriptor, _) = Parameter::option(Scalar::new(&mut size), "size", None)
            .help("Chunk size.")
            .alias("chunk-size")
            .category("tuning")
            .value_description("BYTES")
            .default_text("4096")
            .consume();

        assert_eq!(descriptor.aliases, vec!["chunk-size".to_string()]);
        assert_eq!(descriptor.category(), Some("tuning"));
        assert_eq!(descriptor.value_description(), "BYTES");
        assert_eq!(descriptor.default_text, Some("4096".to_string()));
        assert_eq!(descriptor.help, Some("Chunk size.".to_string()));
    }

    #[test]
    fn binding_accumulates_and_applies() {
        let mut item: u32 = 0;
        {
            let (_, mut binding) = Parameter::argument(Scalar::new(&mut item), "item").consume();
            let outcome = binding.set_value(Some("5")).unwrap();
            assert_eq!(outcome.cancel, CancelMode::None);
            assert!(!outcome.duplicate);
            binding.finish(None).unwrap();
        }
        assert_eq!(item, 5);
    }

    #[test]
    fn binding_separator_splits() {
        let mut items: Vec<u32> = Vec::default();
        {
            let (_, mut binding) =
                Parameter::option(Collection::new(&mut items, Nargs::Any), "items", None)
                    .separator(',')
                    .consume();
            binding.set_value(Some("1,2,3")).unwrap();
            binding.finish(None).unwrap();
        }
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn binding_default_injected_when_absent() {
        let mut item: u32 = 0;
        {
            let (_, mut binding) = Parameter::argument(Scalar::new(&mut item), "item").consume();
            binding.finish(Some("9")).unwrap();
        }
        assert_eq!(item, 9);
    }

    #[test]
    fn binding_default_ignored_when_present() {
        let mut item: u32 = 0;
        {
            let (_, mut binding) = Parameter::argument(Scalar::new(&mut item), "item").consume();
            binding.set_value(Some("5")).unwrap();
            binding.finish(Some("9")).unwrap();
        }
        assert_eq!(item, 5);
    }

    #[test]
    fn binding_reset_discards() {
        let mut item: u32 = 0;
        {
            let (_, mut binding) = Parameter::argument(Scalar::new(&mut item), "item").consume();
            binding.set_value(Some("5")).unwrap();
            binding.reset();
            binding.reset();
            binding.finish(None).unwrap();
        }
        assert_eq!(item, 0);
    }

    #[test]
    fn binding_rules_run_in_order() {
        let mut item: u32 = 0;
        {
            let (_, mut binding) = Parameter::argument(Scalar::new(&mut item), "item")
                .validate(Rule::before_conversion(|token: &str| {
                    if token.len() > 3 {
                        Err("too long".to_string())
                    } else {
                        Ok(())
                    }
                }))
                .validate(Rule::after_conversion(|value: &u32| {
                    if *value == 0 {
                        Err("must not be zero".to_string())
                    } else {
                        Ok(())
                    }
                }))
                .consume();

            assert_matches!(
                binding.set_value(Some("10000")),
                Err(FieldError::Rule(reason)) if reason == "too long"
            );
            assert_matches!(
                binding.set_value(Some("0")),
                Err(FieldError::Rule(reason)) if reason == "must not be zero"
            );
            binding.set_value(Some("42")).unwrap();
            binding.finish(None).unwrap();
        }
        assert_eq!(item, 42);
    }

    #[test]
    fn binding_duplicate_reported() {
        let mut item: u32 = 0;
        let (_, mut binding) = Parameter::option(Scalar::new(&mut item), "item", None).consume();
        binding.set_value(Some("1")).unwrap();
        let outcome = binding.set_value(Some("2")).unwrap();
        assert!(outcome.duplicate);
    }

    #[test]
    fn binding_declared_cancel() {
        let mut flag: bool = false;
        let (_, mut binding) = Parameter::option(Switch::new(&mut flag, true), "flag", None)
            .cancel(CancelMode::AbortWithHelp)
            .consume();
        let outcome = binding.set_value(None).unwrap();
        assert_eq!(outcome.cancel, CancelMode::AbortWithHelp);
    }
}
