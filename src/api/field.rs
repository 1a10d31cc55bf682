use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

use crate::api::capture::*;
use crate::api::convert::{from_str_conversion, Conversion, Converted};
use crate::constant::PAIR_SEPARATOR;
use crate::model::{friendly_type_name, Arity, CancelMode, Nargs};
use crate::prelude::{Associative, Collectable};

/// A parameter binding that takes a single value (precisely 1).
///
/// ### Example
/// ```
/// use argent::{CommandParser, Parameter, Scalar};
///
/// let mut count: u32 = 0;
/// let mut parser = CommandParser::new("program")
///     .add(Parameter::option(Scalar::new(&mut count), "count", Some('c')))
///     .build_parser()
///     .unwrap();
/// parser.try_parse_tokens(&["--count", "5"]).unwrap();
/// drop(parser);
/// assert_eq!(count, 5);
/// ```
pub struct Scalar<'a, T> {
    variable: &'a mut T,
    conversion: Conversion<'a, T>,
    pending: Option<T>,
}

impl<'a, T> CliOption for Scalar<'a, T> {}
impl<'a, T> CliArgument for Scalar<'a, T> {}

impl<'a, T: FromStr + 'a> Scalar<'a, T> {
    /// Create a scalar binding converting via `FromStr`.
    pub fn new(variable: &'a mut T) -> Self {
        Self {
            variable,
            conversion: from_str_conversion(),
            pending: None,
        }
    }
}

impl<'a, T> Scalar<'a, T> {
    /// Create a scalar binding with a custom conversion.
    pub fn converting(
        variable: &'a mut T,
        conversion: impl Fn(&str) -> Result<Converted<T>, String> + 'a,
    ) -> Self {
        Self {
            variable,
            conversion: Box::new(conversion),
            pending: None,
        }
    }
}

impl<'a, T> GenericField<'a, T> for Scalar<'a, T> {
    fn nargs(&self) -> Nargs {
        Nargs::Precisely(1)
    }

    fn arity(&self) -> Arity {
        Arity::Single
    }

    fn matched(&mut self) -> Accepted {
        // Do nothing.
        Accepted::fresh()
    }

    fn convert(&self, token: &str) -> Result<Converted<T>, FieldError> {
        (self.conversion)(token).map_err(|detail| FieldError::InvalidConversion {
            token: token.to_string(),
            type_name: self.value_description(),
            detail,
        })
    }

    fn accumulate(&mut self, value: Converted<T>) -> Result<Accepted, FieldError> {
        match value {
            Converted::Value(value) => {
                let displaced = self.pending.replace(value).is_some();
                Ok(Accepted {
                    cancel: CancelMode::None,
                    displaced,
                })
            }
            Converted::Null => Err(FieldError::NullValue),
        }
    }

    fn apply(&mut self) -> Result<(), FieldError> {
        if let Some(value) = self.pending.take() {
            *self.variable = value;
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.pending = None;
    }
}

/// A parameter binding that maps down to [`Option`], taking a single value (precisely 1).
///
/// The only binding that accepts a null conversion result: a null lands as `None` on the
/// target while still counting as a supplied value.
pub struct Optional<'a, T> {
    variable: &'a mut Option<T>,
    conversion: Conversion<'a, T>,
    pending: Option<Option<T>>,
}

impl<'a, T> CliOption for Optional<'a, T> {}

impl<'a, T: FromStr + 'a> Optional<'a, T> {
    /// Create an optional binding converting via `FromStr`.
    pub fn new(variable: &'a mut Option<T>) -> Self {
        Self {
            variable,
            conversion: from_str_conversion(),
            pending: None,
        }
    }
}

impl<'a, T> Optional<'a, T> {
    /// Create an optional binding with a custom conversion.
    pub fn converting(
        variable: &'a mut Option<T>,
        conversion: impl Fn(&str) -> Result<Converted<T>, String> + 'a,
    ) -> Self {
        Self {
            variable,
            conversion: Box::new(conversion),
            pending: None,
        }
    }
}

impl<'a, T> GenericField<'a, T> for Optional<'a, T> {
    fn nargs(&self) -> Nargs {
        Nargs::Precisely(1)
    }

    fn arity(&self) -> Arity {
        Arity::Single
    }

    fn matched(&mut self) -> Accepted {
        // Do nothing.
        Accepted::fresh()
    }

    fn convert(&self, token: &str) -> Result<Converted<T>, FieldError> {
        (self.conversion)(token).map_err(|detail| FieldError::InvalidConversion {
            token: token.to_string(),
            type_name: self.value_description(),
            detail,
        })
    }

    fn accumulate(&mut self, value: Converted<T>) -> Result<Accepted, FieldError> {
        let value = match value {
            Converted::Value(value) => Some(value),
            Converted::Null => None,
        };
        let displaced = self.pending.replace(value).is_some();
        Ok(Accepted {
            cancel: CancelMode::None,
            displaced,
        })
    }

    fn apply(&mut self) -> Result<(), FieldError> {
        if let Some(value) = self.pending.take() {
            *self.variable = value;
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.pending = None;
    }
}

/// An option binding that takes no values (precisely 0); its presence assigns `target`.
///
/// ### Example
/// ```
/// use argent::{CommandParser, Parameter, Switch};
///
/// let mut verbose = false;
/// let mut parser = CommandParser::new("program")
///     .add(Parameter::option(Switch::new(&mut verbose, true), "verbose", Some('v')))
///     .build_parser()
///     .unwrap();
/// parser.try_parse_tokens(&["-v"]).unwrap();
/// drop(parser);
/// assert!(verbose);
/// ```
pub struct Switch<'a, T> {
    variable: &'a mut T,
    target: T,
    count: usize,
}

impl<'a, T> CliOption for Switch<'a, T> {}

impl<'a, T> Switch<'a, T> {
    /// Create a switch binding.
    pub fn new(variable: &'a mut T, target: T) -> Self {
        Self {
            variable,
            target,
            count: 0,
        }
    }
}

impl<'a, T: Clone> GenericField<'a, T> for Switch<'a, T> {
    fn nargs(&self) -> Nargs {
        Nargs::Precisely(0)
    }

    fn arity(&self) -> Arity {
        Arity::Single
    }

    fn matched(&mut self) -> Accepted {
        self.count += 1;
        Accepted {
            cancel: CancelMode::None,
            displaced: self.count > 1,
        }
    }

    fn convert(&self, _token: &str) -> Result<Converted<T>, FieldError> {
        unreachable!("internal error - must not convert on a Switch");
    }

    fn accumulate(&mut self, _value: Converted<T>) -> Result<Accepted, FieldError> {
        unreachable!("internal error - must not accumulate on a Switch");
    }

    fn apply(&mut self) -> Result<(), FieldError> {
        if self.count > 0 {
            *self.variable = self.target.clone();
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}

/// A parameter binding that appends values to a collection (specifiable [`Nargs`]).
pub struct Collection<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    collection: &'a mut C,
    conversion: Conversion<'a, T>,
    pending: Vec<T>,
    nargs: Nargs,
}

impl<'a, C, T> CliOption for Collection<'a, C, T> where C: 'a + Collectable<T> {}
impl<'a, C, T> CliArgument for Collection<'a, C, T> where C: 'a + Collectable<T> {}

impl<'a, C, T> Collection<'a, C, T>
where
    C: 'a + Collectable<T>,
    T: FromStr + 'a,
{
    /// Create a collection binding converting via `FromStr`.
    pub fn new(collection: &'a mut C, nargs: Nargs) -> Self {
        Self {
            collection,
            conversion: from_str_conversion(),
            pending: Vec::default(),
            nargs,
        }
    }
}

impl<'a, C, T> Collection<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    /// Create a collection binding with a custom conversion.
    pub fn converting(
        collection: &'a mut C,
        nargs: Nargs,
        conversion: impl Fn(&str) -> Result<Converted<T>, String> + 'a,
    ) -> Self {
        Self {
            collection,
            conversion: Box::new(conversion),
            pending: Vec::default(),
            nargs,
        }
    }
}

impl<'a, C, T> GenericField<'a, T> for Collection<'a, C, T>
where
    C: 'a + Collectable<T>,
{
    fn nargs(&self) -> Nargs {
        self.nargs
    }

    fn arity(&self) -> Arity {
        Arity::MultiValue
    }

    fn matched(&mut self) -> Accepted {
        // Do nothing.
        Accepted::fresh()
    }

    fn convert(&self, token: &str) -> Result<Converted<T>, FieldError> {
        (self.conversion)(token).map_err(|detail| FieldError::InvalidConversion {
            token: token.to_string(),
            type_name: self.value_description(),
            detail,
        })
    }

    fn accumulate(&mut self, value: Converted<T>) -> Result<Accepted, FieldError> {
        match value {
            Converted::Value(value) => {
                self.pending.push(value);
                Ok(Accepted::fresh())
            }
            Converted::Null => Err(FieldError::NullValue),
        }
    }

    fn apply(&mut self) -> Result<(), FieldError> {
        if !self.pending.is_empty() {
            self.collection.clear();

            for value in self.pending.drain(..) {
                self.collection.add(value);
            }
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.pending.clear();
    }
}

impl<T> Collectable<T> for Vec<T> {
    fn add(&mut self, item: T) {
        self.push(item);
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

impl<T: Eq + std::hash::Hash> Collectable<T> for HashSet<T> {
    fn add(&mut self, item: T) {
        self.insert(item);
    }

    fn clear(&mut self) {
        HashSet::clear(self);
    }
}

/// A parameter binding that collects `key=value` pairs into a map (specifiable [`Nargs`]).
///
/// Each token is split on the first occurrence of the separator; the key and value halves
/// convert independently.  Duplicate keys are rejected unless
/// [`Mapping::overwrite_duplicates`] is set.
///
/// ### Example
/// ```
/// use std::collections::HashMap;
/// use argent::{CommandParser, Nargs, Parameter, Mapping};
///
/// let mut defines: HashMap<String, u32> = HashMap::default();
/// let mut parser = CommandParser::new("program")
///     .add(Parameter::option(
///         Mapping::new(&mut defines, Nargs::AtLeastOne),
///         "define",
///         Some('D'),
///     ))
///     .build_parser()
///     .unwrap();
/// parser.try_parse_tokens(&["-D", "threads=4", "retries=2"]).unwrap();
/// drop(parser);
/// assert_eq!(defines, HashMap::from([("threads".to_string(), 4), ("retries".to_string(), 2)]));
/// ```
pub struct Mapping<'a, M, K, V>
where
    M: 'a + Associative<K, V>,
{
    map: &'a mut M,
    key_conversion: Conversion<'a, K>,
    value_conversion: Conversion<'a, V>,
    separator: String,
    overwrite: bool,
    pending: Vec<(K, V)>,
    nargs: Nargs,
}

impl<'a, M, K, V> CliOption for Mapping<'a, M, K, V> where M: 'a + Associative<K, V> {}
impl<'a, M, K, V> CliArgument for Mapping<'a, M, K, V> where M: 'a + Associative<K, V> {}

impl<'a, M, K, V> Mapping<'a, M, K, V>
where
    M: 'a + Associative<K, V>,
    K: FromStr + 'a,
    V: FromStr + 'a,
{
    /// Create a mapping binding converting both halves via `FromStr`.
    pub fn new(map: &'a mut M, nargs: Nargs) -> Self {
        Self {
            map,
            key_conversion: from_str_conversion(),
            value_conversion: from_str_conversion(),
            separator: PAIR_SEPARATOR.to_string(),
            overwrite: false,
            pending: Vec::default(),
            nargs,
        }
    }
}

impl<'a, M, K, V> Mapping<'a, M, K, V>
where
    M: 'a + Associative<K, V>,
{
    /// Create a mapping binding with custom key/value conversions.
    pub fn converting(
        map: &'a mut M,
        nargs: Nargs,
        key_conversion: impl Fn(&str) -> Result<Converted<K>, String> + 'a,
        value_conversion: impl Fn(&str) -> Result<Converted<V>, String> + 'a,
    ) -> Self {
        Self {
            map,
            key_conversion: Box::new(key_conversion),
            value_conversion: Box::new(value_conversion),
            separator: PAIR_SEPARATOR.to_string(),
            overwrite: false,
            pending: Vec::default(),
            nargs,
        }
    }

    /// Change the key/value separator (ex: `:`).
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Allow duplicate keys; the last entry wins.
    pub fn overwrite_duplicates(mut self) -> Self {
        self.overwrite = true;
        self
    }
}

impl<'a, M, K, V> GenericField<'a, (K, V)> for Mapping<'a, M, K, V>
where
    M: 'a + Associative<K, V>,
    K: std::fmt::Display + PartialEq,
{
    fn nargs(&self) -> Nargs {
        self.nargs
    }

    fn arity(&self) -> Arity {
        Arity::Dictionary
    }

    fn matched(&mut self) -> Accepted {
        // Do nothing.
        Accepted::fresh()
    }

    fn convert(&self, token: &str) -> Result<Converted<(K, V)>, FieldError> {
        let (left, right) =
            token
                .split_once(&self.separator)
                .ok_or_else(|| FieldError::MissingSeparator {
                    token: token.to_string(),
                    separator: self.separator.clone(),
                })?;

        let key = (self.key_conversion)(left).map_err(|detail| FieldError::InvalidConversion {
            token: left.to_string(),
            type_name: friendly_type_name(std::any::type_name::<K>()),
            detail,
        })?;
        // Keys are never nullable.
        let Converted::Value(key) = key else {
            return Err(FieldError::NullValue);
        };

        let value =
            (self.value_conversion)(right).map_err(|detail| FieldError::InvalidConversion {
                token: right.to_string(),
                type_name: friendly_type_name(std::any::type_name::<V>()),
                detail,
            })?;
        let Converted::Value(value) = value else {
            return Err(FieldError::NullValue);
        };

        Ok(Converted::Value((key, value)))
    }

    fn accumulate(&mut self, value: Converted<(K, V)>) -> Result<Accepted, FieldError> {
        let (key, value) = match value {
            Converted::Value(pair) => pair,
            Converted::Null => return Err(FieldError::NullValue),
        };

        match self.pending.iter().position(|(k, _)| k == &key) {
            Some(index) => {
                if self.overwrite {
                    self.pending[index] = (key, value);
                    Ok(Accepted {
                        cancel: CancelMode::None,
                        displaced: true,
                    })
                } else {
                    Err(FieldError::DuplicateKey {
                        key: key.to_string(),
                    })
                }
            }
            None => {
                self.pending.push((key, value));
                Ok(Accepted::fresh())
            }
        }
    }

    fn apply(&mut self) -> Result<(), FieldError> {
        if !self.pending.is_empty() {
            self.map.clear();

            for (key, value) in self.pending.drain(..) {
                self.map.put(key, value);
            }
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.pending.clear();
    }

    fn value_description(&self) -> String {
        format!(
            "{k}{s}{v}",
            k = friendly_type_name(std::any::type_name::<K>()),
            s = self.separator,
            v = friendly_type_name(std::any::type_name::<V>())
        )
    }
}

impl<K: Eq + std::hash::Hash, V> Associative<K, V> for HashMap<K, V> {
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }
}

impl<K: Ord, V> Associative<K, V> for BTreeMap<K, V> {
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn clear(&mut self) {
        BTreeMap::clear(self);
    }
}

/// An option binding that invokes a callback with each value instead of storing it.
///
/// The callback's return value is the cancellation for the parse; this is how
/// terminate-early options are expressed.
///
/// ### Example
/// ```
/// use argent::{CancelMode, Callback, CommandParser, Parameter, ParseStatus};
///
/// let mut parser = CommandParser::new("program")
///     .add(Parameter::option(
///         Callback::new(|done: bool| {
///             if done { CancelMode::Success } else { CancelMode::None }
///         }),
///         "done",
///         None,
///     ))
///     .build_parser()
///     .unwrap();
/// let outcome = parser.try_parse_tokens(&["--done", "true", "left", "over"]).unwrap();
/// assert_eq!(outcome.status(), ParseStatus::Success);
/// assert_eq!(outcome.remaining(), vec!["left".to_string(), "over".to_string()]);
/// ```
pub struct Callback<'a, T> {
    callback: Box<dyn FnMut(T) -> Result<CancelMode, String> + 'a>,
    conversion: Conversion<'a, T>,
}

impl<'a, T> CliOption for Callback<'a, T> {}

impl<'a, T: FromStr + 'a> Callback<'a, T> {
    /// Create a callback binding converting via `FromStr`.
    pub fn new(mut callback: impl FnMut(T) -> CancelMode + 'a) -> Self {
        Self {
            callback: Box::new(move |value| Ok(callback(value))),
            conversion: from_str_conversion(),
        }
    }

    /// Create a callback binding whose callback may fail.
    pub fn fallible(callback: impl FnMut(T) -> Result<CancelMode, String> + 'a) -> Self {
        Self {
            callback: Box::new(callback),
            conversion: from_str_conversion(),
        }
    }
}

impl<'a, T> Callback<'a, T> {
    /// Create a callback binding with a custom conversion.
    pub fn converting(
        callback: impl FnMut(T) -> Result<CancelMode, String> + 'a,
        conversion: impl Fn(&str) -> Result<Converted<T>, String> + 'a,
    ) -> Self {
        Self {
            callback: Box::new(callback),
            conversion: Box::new(conversion),
        }
    }
}

impl<'a, T> GenericField<'a, T> for Callback<'a, T> {
    fn nargs(&self) -> Nargs {
        Nargs::Precisely(1)
    }

    fn arity(&self) -> Arity {
        Arity::Method
    }

    fn matched(&mut self) -> Accepted {
        // Do nothing.
        Accepted::fresh()
    }

    fn convert(&self, token: &str) -> Result<Converted<T>, FieldError> {
        (self.conversion)(token).map_err(|detail| FieldError::InvalidConversion {
            token: token.to_string(),
            type_name: self.value_description(),
            detail,
        })
    }

    fn accumulate(&mut self, value: Converted<T>) -> Result<Accepted, FieldError> {
        match value {
            Converted::Value(value) => match (self.callback)(value) {
                Ok(cancel) => Ok(Accepted {
                    cancel,
                    displaced: false,
                }),
                Err(message) => Err(FieldError::Callback(message)),
            },
            Converted::Null => Err(FieldError::NullValue),
        }
    }

    fn apply(&mut self) -> Result<(), FieldError> {
        // The side effect already happened during accumulation.
        Ok(())
    }

    fn reset(&mut self) {
        // Do nothing.
    }
}

// Value-less trigger backing the built-in help/version options.
pub(crate) struct Trigger {
    count: usize,
}

impl CliOption for Trigger {}

impl Trigger {
    pub(crate) fn new() -> Self {
        Self { count: 0 }
    }
}

impl<'a> GenericField<'a, bool> for Trigger {
    fn nargs(&self) -> Nargs {
        Nargs::Precisely(0)
    }

    fn arity(&self) -> Arity {
        Arity::Single
    }

    fn matched(&mut self) -> Accepted {
        self.count += 1;
        Accepted {
            cancel: CancelMode::None,
            displaced: self.count > 1,
        }
    }

    fn convert(&self, _token: &str) -> Result<Converted<bool>, FieldError> {
        unreachable!("internal error - must not convert on a Trigger");
    }

    fn accumulate(&mut self, _value: Converted<bool>) -> Result<Accepted, FieldError> {
        unreachable!("internal error - must not accumulate on a Trigger");
    }

    fn apply(&mut self) -> Result<(), FieldError> {
        Ok(())
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}
