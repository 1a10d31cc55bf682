use crate::model::ParsingMode;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TokenKind<'t> {
    Long {
        name: &'t str,
        attached: Option<&'t str>,
    },
    Shorts {
        cluster: &'t str,
        attached: Option<&'t str>,
    },
    Value(&'t str),
}

// Find a 'long' name, such as:
//  --initial
//  --initial=..
// or 'short' name(s), such as (both -i and -v are example short names):
//  -i
//  -i=..
//  -iv
// Anything else is a plain value.  A dash followed by a digit reads as a value, so
// negative numbers parse as positional input.
pub(crate) fn classify<'t>(token: &'t str, mode: ParsingMode) -> TokenKind<'t> {
    match mode {
        ParsingMode::LongShort => {
            if let Some(rest) = token.strip_prefix("--") {
                let (name, attached) = split_equals_delimiter(rest);

                if name.is_empty() {
                    return TokenKind::Value(token);
                }

                return TokenKind::Long { name, attached };
            }

            if let Some(rest) = token.strip_prefix('-') {
                if leads_with_digit(rest) {
                    return TokenKind::Value(token);
                }

                let (cluster, attached) = split_equals_delimiter(rest);

                if cluster.is_empty() {
                    return TokenKind::Value(token);
                }

                return TokenKind::Shorts { cluster, attached };
            }

            TokenKind::Value(token)
        }
        ParsingMode::SingleDash => {
            if let Some(rest) = token.strip_prefix('-') {
                if leads_with_digit(rest) {
                    return TokenKind::Value(token);
                }

                let (name, attached) = split_equals_delimiter(rest);

                if name.is_empty() {
                    return TokenKind::Value(token);
                }

                return TokenKind::Long { name, attached };
            }

            TokenKind::Value(token)
        }
    }
}

fn leads_with_digit(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn split_equals_delimiter(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (token, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("--verbose", TokenKind::Long { name: "verbose", attached: None })]
    #[case("--size=5", TokenKind::Long { name: "size", attached: Some("5") })]
    #[case("--size=a=b", TokenKind::Long { name: "size", attached: Some("a=b") })]
    #[case("-v", TokenKind::Shorts { cluster: "v", attached: None })]
    #[case("-v=5", TokenKind::Shorts { cluster: "v", attached: Some("5") })]
    #[case("-vqx", TokenKind::Shorts { cluster: "vqx", attached: None })]
    #[case("value", TokenKind::Value("value"))]
    #[case("-", TokenKind::Value("-"))]
    #[case("--", TokenKind::Value("--"))]
    #[case("-5", TokenKind::Value("-5"))]
    #[case("-2.5", TokenKind::Value("-2.5"))]
    fn classify_long_short(#[case] token: &str, #[case] expected: TokenKind<'_>) {
        assert_eq!(classify(token, ParsingMode::LongShort), expected);
    }

    #[rstest]
    #[case("-verbose", TokenKind::Long { name: "verbose", attached: None })]
    #[case("-size=5", TokenKind::Long { name: "size", attached: Some("5") })]
    #[case("value", TokenKind::Value("value"))]
    #[case("-", TokenKind::Value("-"))]
    #[case("-5", TokenKind::Value("-5"))]
    fn classify_single_dash(#[case] token: &str, #[case] expected: TokenKind<'_>) {
        assert_eq!(classify(token, ParsingMode::SingleDash), expected);
    }
}
