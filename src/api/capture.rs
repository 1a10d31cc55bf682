use thiserror::Error;

use crate::api::convert::Converted;
use crate::model::{Arity, CancelMode, Nargs};

/// Marker trait for bindings that can formulate an option in the Cli.
pub trait CliOption {}

/// Marker trait for bindings that can formulate a positional argument in the Cli.
pub trait CliArgument {}

/// The result of one accumulation step.
#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    /// The cancellation requested by the binding itself (only ever non-`None` for
    /// callback-backed bindings).
    pub cancel: CancelMode,
    /// Whether a previously accumulated value was overwritten.
    pub displaced: bool,
}

impl Accepted {
    pub(crate) fn fresh() -> Self {
        Self {
            cancel: CancelMode::None,
            displaced: false,
        }
    }
}

/// Behaviour to convert, accumulate, and finally apply an explicit generic type `T` from
/// input `&str` tokens.
///
/// We use this at the bottom of the command line parser object graph so the compiler can
/// maintain each field's type.
#[doc(hidden)]
pub trait GenericField<'a, T> {
    /// Get the token cardinality for one occurrence of this binding.
    fn nargs(&self) -> Nargs;

    /// Get the accumulation shape of this binding.
    fn arity(&self) -> Arity;

    /// Declare that the parameter has been matched without a value token.
    fn matched(&mut self) -> Accepted;

    /// Convert a single token into the generic type `T`.  Pure; must not touch the
    /// accumulated state.
    fn convert(&self, token: &str) -> Result<Converted<T>, FieldError>;

    /// Fold one converted value into the accumulated state.
    fn accumulate(&mut self, value: Converted<T>) -> Result<Accepted, FieldError>;

    /// Copy the accumulated state onto the bound target.  A no-op when nothing was
    /// accumulated.
    fn apply(&mut self) -> Result<(), FieldError>;

    /// Discard the accumulated state.  Idempotent.
    fn reset(&mut self);

    /// Describe the values this binding accepts (ex: `u32`, `String=u32`).
    fn value_description(&self) -> String {
        crate::model::friendly_type_name(std::any::type_name::<T>())
    }
}

/// A failure raised from within a binding's conversion/accumulation pipeline.
/// Always re-wrapped into a categorized parse failure before reaching the caller.
#[doc(hidden)]
#[derive(Debug, Error)]
pub enum FieldError {
    /// The token did not convert to the binding's type.
    #[error("cannot convert '{token}' to {type_name}: {detail}")]
    InvalidConversion {
        /// The offending token.
        token: String,
        /// The friendly name of the target type.
        type_name: String,
        /// The conversion's own reason.
        detail: String,
    },

    /// A dictionary token lacked the key/value separator.
    #[error("'{token}' is missing the '{separator}' separator")]
    MissingSeparator {
        /// The offending token.
        token: String,
        /// The configured key/value separator.
        separator: String,
    },

    /// Conversion produced a null the binding cannot represent.
    #[error("null value")]
    NullValue,

    /// A dictionary key collided under the reject policy.
    #[error("duplicate key '{key}'")]
    DuplicateKey {
        /// The colliding key.
        key: String,
    },

    /// A callback-backed binding reported a failure.
    #[error("{0}")]
    Callback(String),

    /// A validation rule rejected the input.
    #[error("{0}")]
    Rule(String),
}
