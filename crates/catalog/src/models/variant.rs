use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::consts::VARIANT_REGEX;
use crate::error::{Error, ErrorKind};

/// The slot an image fills in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    /// The primary image (`MAIN`)
    Main,
    /// A numbered secondary image (`PT01`..`PT99`)
    Position(u8),
}
impl Variant {
    pub fn is_main(&self) -> bool {
        matches!(self, Self::Main)
    }
}
impl FromStr for Variant {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !VARIANT_REGEX.is_match(s) {
            exn::bail!(ErrorKind::ParseError { field: "variant", value: s.to_string() });
        }
        if s.eq_ignore_ascii_case("main") {
            return Ok(Self::Main);
        }
        // Two ASCII digits after `PT`, guaranteed by the regex.
        let position = s[2..].parse::<u8>().map_err(|_| ErrorKind::ParseError {
            field: "variant",
            value: s.to_string(),
        })?;
        Ok(Self::Position(position))
    }
}
impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Main => f.write_str("MAIN"),
            Self::Position(n) => write!(f, "PT{n:02}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("MAIN", Variant::Main)]
    #[case("main", Variant::Main)]
    #[case("PT02", Variant::Position(2))]
    #[case("pt07", Variant::Position(7))]
    #[case("PT99", Variant::Position(99))]
    fn test_parse(#[case] input: &str, #[case] expected: Variant) {
        assert_eq!(input.parse::<Variant>().unwrap(), expected);
    }

    #[rstest]
    #[case("PT2")]
    #[case("PT100")]
    #[case("MAINS")]
    #[case("")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<Variant>().is_err());
    }

    #[test]
    fn display_is_upper_case_and_padded() {
        assert_eq!(Variant::Main.to_string(), "MAIN");
        assert_eq!(Variant::Position(3).to_string(), "PT03");
        assert_eq!("pt10".parse::<Variant>().unwrap().to_string(), "PT10");
    }
}
