use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::consts::IDENTIFIER_REGEX;
use crate::error::{Error, ErrorKind};

/// A 10-character alphanumeric marketplace catalog code, always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);
impl Identifier {
    /// Whether `s` already has the shape of an identifier (case-insensitive).
    pub fn is_valid(s: &str) -> bool {
        IDENTIFIER_REGEX.is_match(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl FromStr for Identifier {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !Self::is_valid(trimmed) {
            exn::bail!(ErrorKind::ParseError { field: "identifier", value: s.to_string() });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}
impl TryFrom<String> for Identifier {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}
impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("B0F3JG39SM", "B0F3JG39SM")]
    #[case("b0f3jg39sm", "B0F3JG39SM")]
    #[case("  B0F3JG39SM ", "B0F3JG39SM")]
    #[case("0123456789", "0123456789")]
    fn test_valid(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(input.parse::<Identifier>().unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("B0F3JG39S")]
    #[case("B0F3JG39SMX")]
    #[case("B0F3-G39SM")]
    #[case("brand model")]
    fn test_invalid(#[case] input: &str) {
        let err = input.parse::<Identifier>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::ParseError { field: "identifier", .. }));
    }
}
