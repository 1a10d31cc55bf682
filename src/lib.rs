//! `argent` is a descriptor-driven command line argument parsing engine for Rust.
//!
//! Although other crates provide command line parser functionality, we have found they
//! prioritize different concerns than those we are interested in.  `argent` attempts to
//! prioritize the following design concerns:
//! * *Type safe argument parsing*:
//! The user should not call any `&str -> T` conversion functions directly.
//! Each parameter binds a program variable; the parser converts, validates, and assigns.
//! * *Explicit metadata*:
//! Every recognized argument is described by an immutable descriptor (names, position,
//! arity, requiredness, cancellation, validation rules) assembled through a plain
//! builder.  No attribute discovery or code generation is involved; anything that can
//! produce descriptors can drive the engine.
//! * *Uniform failure surface*:
//! Every failure resolves to one localized sentence tagged with a category from a closed
//! taxonomy ([`ErrorCategory`]).  Raw conversion or callback failures never escape
//! unwrapped, and no user-facing text is hardcoded (see [`Messages`]).
//! * *Detailed yet basic UX*:
//! Usage help is generated from the same descriptor metadata, and parse errors point at
//! the offending token.  We do not aim to support rich display configurations, such as
//! colour output or shell completions.
//!
//! # Usage
//!
//! ```
//! use argent::{CommandParser, Nargs, Parameter, ParseStatus, Collection, Scalar, Switch};
//!
//! let mut verbose: bool = false;
//! let mut retries: u32 = 3;
//! let mut paths: Vec<String> = Vec::default();
//!
//! let mut parser = CommandParser::new("frobnicate")
//!     .about("Frobnicates the given paths.")
//!     .version("0.4.2")
//!     .add(Parameter::option(Switch::new(&mut verbose, true), "verbose", Some('v'))
//!         .help("Make the program output verbose."))
//!     .add(Parameter::option(Scalar::new(&mut retries), "retries", None)
//!         .default_text("3")
//!         .help("How many times to retry."))
//!     .add(Parameter::argument(Collection::new(&mut paths, Nargs::AtLeastOne), "paths")
//!         .required()
//!         .help("The paths to frobnicate."))
//!     .build_parser()
//!     .unwrap();
//!
//! let outcome = parser
//!     .try_parse_tokens(&["-v", "--retries", "5", "a.txt", "b.txt"])
//!     .unwrap();
//! assert_eq!(outcome.status(), ParseStatus::Success);
//! drop(parser);
//!
//! assert!(verbose);
//! assert_eq!(retries, 5);
//! assert_eq!(paths, vec!["a.txt".to_string(), "b.txt".to_string()]);
//! ```
//!
//! Parameters come in six binding shapes: [`Scalar`] and [`Optional`] hold a single
//! value, [`Switch`] takes no value, [`Collection`] appends into any [`Collectable`],
//! [`Mapping`] gathers `key=value` pairs into any [`Associative`], and [`Callback`]
//! hands each value to a function whose return decides whether parsing continues
//! ([`CancelMode`]).
//!
//! Validation attaches per-parameter as [`Rule`]s, running before conversion, after
//! conversion, or after the whole parse (where cross-field rules can inspect sibling
//! arguments through a [`SessionView`]).
//!
//! [`Collectable`]: prelude::Collectable
//! [`Associative`]: prelude::Associative
#![deny(missing_docs)]
mod api;
mod constant;
mod error;
mod matcher;
mod model;
mod parser;
#[allow(missing_docs)]
pub mod prelude;
mod text;

pub use api::*;
pub use error::{ConfigError, ErrorCategory, ParseError};
pub use model::*;
pub use parser::{ArgumentParser, Outcome, ParseStatus, SessionView};
pub use text::{DefaultMessages, MessageContext, Messages};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
pub(crate) mod test {
    macro_rules! assert_contains {
        ($base:expr, $sub:expr) => {
            let base = &$base;
            let sub = $sub;
            assert!(
                base.contains(sub),
                "'{b}' does not contain '{s}'",
                b = base,
                s = sub,
            );
        };
    }

    pub(crate) use assert_contains;
}
