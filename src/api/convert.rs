use std::str::FromStr;

use crate::model::friendly_type_name;

/// The result of converting one raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converted<T> {
    /// A typed value.
    Value(T),
    /// An explicit null: the token denotes the absence of a value.
    ///
    /// Only [`Optional`](crate::Optional) bindings can represent a null; every other
    /// binding rejects it.
    Null,
}

/// A conversion turns one raw token into a typed value.
/// Must be a deterministic pure function of the token.
pub(crate) type Conversion<'a, T> = Box<dyn Fn(&str) -> Result<Converted<T>, String> + 'a>;

pub(crate) fn from_str_conversion<'a, T>() -> Conversion<'a, T>
where
    T: FromStr + 'a,
{
    Box::new(|token| {
        T::from_str(token).map(Converted::Value).map_err(|_| {
            format!(
                "not a valid {t}",
                t = friendly_type_name(std::any::type_name::<T>())
            )
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::assert_contains;

    #[test]
    fn from_str() {
        let conversion: Conversion<'_, u32> = from_str_conversion();
        assert_eq!(conversion("5"), Ok(Converted::Value(5)));
        assert_eq!(conversion("05"), Ok(Converted::Value(5)));
    }

    #[test]
    fn from_str_invalid() {
        let conversion: Conversion<'_, u32> = from_str_conversion();
        let reason = conversion("not-a-u32").unwrap_err();
        assert_contains!(reason, "u32");
    }
}
