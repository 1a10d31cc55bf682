/// Describes the number of command input tokens consumed per occurrence of an argument/option.
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#nargs>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// `N`: Precisely `N` values.
    Precisely(u8),
    /// `*`: May be any number of values, including `0`.
    Any,
    /// `+`: At least one value must be specified.
    AtLeastOne,
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The accumulation shape of an argument/option: how occurrences combine into the final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Holds at most one value.
    Single,
    /// Appends every value to an ordered collection.
    MultiValue,
    /// Collects `key=value` pairs into a map.
    Dictionary,
    /// Invokes a callback with each value instead of storing it.
    Method,
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Declares what happens to the overall parse when an argument/option receives a value.
///
/// At most one cancellation is ever in flight: once triggered, the parser stops
/// consuming tokens for that pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelMode {
    /// Parsing continues normally.
    #[default]
    None,
    /// Parsing stops; results so far are discarded.
    Abort,
    /// Parsing stops; results so far are discarded and usage help is requested.
    AbortWithHelp,
    /// Parsing stops; results so far are kept and the unconsumed tokens are surfaced verbatim.
    Success,
}

/// Controls how option/argument names are written on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsingMode {
    /// Options use a single dash with the full name: `-name`, `-name=value`.
    /// Short names are not matchable in this mode.
    SingleDash,
    /// Posix-like: `--name`/`--name=value` for long names, `-n` for short names,
    /// `-abc` to combine short switches.
    #[default]
    LongShort,
}

/// Policy for an option supplied more than once when its arity holds a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The second occurrence is an error.
    #[default]
    Reject,
    /// The last occurrence wins, silently.
    Replace,
    /// The last occurrence wins and a warning is recorded on the outcome.
    Warn,
}

/// Immutable metadata for one recognized argument/option.
///
/// Built by [`Parameter`](crate::Parameter) and finalized by
/// [`CommandParser::build_parser`](crate::CommandParser::build_parser); the only field written
/// after construction is the resolved position of a positional argument.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub(crate) name: String,
    pub(crate) short: Option<char>,
    pub(crate) aliases: Vec<String>,
    pub(crate) short_aliases: Vec<char>,
    pub(crate) long_suppressed: bool,
    pub(crate) positional: bool,
    pub(crate) position: Option<usize>,
    pub(crate) arity: Arity,
    pub(crate) nargs: Nargs,
    pub(crate) required: bool,
    pub(crate) hidden: bool,
    pub(crate) cancel: CancelMode,
    pub(crate) category: Option<String>,
    pub(crate) help: Option<String>,
    pub(crate) value_description: String,
    pub(crate) default_text: Option<String>,
    pub(crate) separator: Option<char>,
}

impl Descriptor {
    /// The primary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The single-character short name, if any.
    pub fn short(&self) -> Option<char> {
        self.short
    }

    /// Whether this argument is matched by token order rather than by name prefix.
    pub fn positional(&self) -> bool {
        self.positional
    }

    /// The resolved zero-based position, when this is a positional argument.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// The accumulation shape.
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// The per-occurrence token cardinality.
    pub fn nargs(&self) -> Nargs {
        self.nargs
    }

    /// Whether the argument must receive a value during the parse.
    pub fn required(&self) -> bool {
        self.required
    }

    /// Whether the argument is excluded from usage help.
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// The declared cancellation behaviour.
    pub fn cancel(&self) -> CancelMode {
        self.cancel
    }

    /// The display grouping tag, if any.  Never affects parsing.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The description of this argument's values, shown in usage help and diagnostics.
    pub fn value_description(&self) -> &str {
        &self.value_description
    }

    /// True iff the argument is named and consumes no value tokens; its presence alone
    /// constitutes the value.
    pub fn is_switch(&self) -> bool {
        !self.positional && self.nargs == Nargs::Precisely(0)
    }

    /// The name rendered with the prefix exactly as the user would type it.
    pub fn display_name(&self, mode: ParsingMode) -> String {
        if self.positional {
            return self.name.clone();
        }

        match mode {
            ParsingMode::SingleDash => format!("-{n}", n = self.name),
            ParsingMode::LongShort => {
                if self.long_suppressed {
                    let short = self
                        .short
                        .expect("internal error - suppressed long name requires a short name");
                    format!("-{short}")
                } else {
                    format!("--{n}", n = self.name)
                }
            }
        }
    }
}

// "alloc::vec::Vec<core::option::Option<u32>>" reads as "Vec<Option<u32>>".
pub(crate) fn friendly_type_name(full: &str) -> String {
    let mut out = String::default();
    let mut segment = String::default();

    for c in full.chars() {
        match c {
            '<' | '>' | ',' | '(' | ')' | ' ' => {
                out.push_str(last_path_segment(&segment));
                segment.clear();
                out.push(c);
            }
            _ => segment.push(c),
        }
    }

    out.push_str(last_path_segment(&segment));
    out
}

fn last_path_segment(segment: &str) -> &str {
    segment.rsplit("::").next().unwrap_or(segment)
}
