use crate::parser::SessionView;

/// The point in the parsing pipeline at which a [`Rule`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// On the raw token text, before any conversion.
    BeforeConversion,
    /// On the converted, typed value.
    AfterConversion,
    /// After the whole token stream is consumed, whether or not this argument
    /// received a value.
    AfterParsing,
}

/// A validation rule attached to a parameter, tagged with the checkpoint it runs at.
///
/// Rules run in declaration order at their checkpoint and fail with a human-readable
/// reason.
///
/// ### Example
/// ```
/// use argent::Rule;
///
/// let below: Rule<'_, u16> = Rule::after_conversion(|port: &u16| {
///     if *port < 1024 {
///         Ok(())
///     } else {
///         Err("must be below 1024".to_string())
///     }
/// });
/// ```
pub struct Rule<'a, T>(Inner<'a, T>);

enum Inner<'a, T> {
    Raw(Box<dyn Fn(&str) -> Result<(), String> + 'a>),
    Typed(Box<dyn Fn(&T) -> Result<(), String> + 'a>),
    Post(Box<dyn Fn(&SessionView<'_>) -> Result<(), String> + 'a>),
}

impl<'a, T> Rule<'a, T> {
    /// A rule over the raw token text, run before conversion.
    pub fn before_conversion(check: impl Fn(&str) -> Result<(), String> + 'a) -> Self {
        Self(Inner::Raw(Box::new(check)))
    }

    /// A rule over the converted value, run after conversion.
    pub fn after_conversion(check: impl Fn(&T) -> Result<(), String> + 'a) -> Self {
        Self(Inner::Typed(Box::new(check)))
    }

    /// A rule over the completed parse, run once the token stream is exhausted.
    ///
    /// The rule receives a [`SessionView`] so conditional/cross-field checks can inspect
    /// which sibling arguments were supplied; it runs even when this argument is absent.
    pub fn after_parsing(check: impl Fn(&SessionView<'_>) -> Result<(), String> + 'a) -> Self {
        Self(Inner::Post(Box::new(check)))
    }

    /// The checkpoint this rule runs at.
    pub fn checkpoint(&self) -> Checkpoint {
        match &self.0 {
            Inner::Raw(_) => Checkpoint::BeforeConversion,
            Inner::Typed(_) => Checkpoint::AfterConversion,
            Inner::Post(_) => Checkpoint::AfterParsing,
        }
    }

    pub(crate) fn check_raw(&self, token: &str) -> Result<(), String> {
        match &self.0 {
            Inner::Raw(check) => check(token),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_typed(&self, value: &T) -> Result<(), String> {
        match &self.0 {
            Inner::Typed(check) => check(value),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_after_parsing(&self, view: &SessionView<'_>) -> Result<(), String> {
        match &self.0 {
            Inner::Post(check) => check(view),
            _ => Ok(()),
        }
    }
}
