use regex::Regex;
use std::sync::LazyLock;

const VARIANT: &str = "(MAIN|PT\\d{2})";

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// `<key>.<VARIANT>.<ext>`; the key is the shortest prefix so that a key
// containing dots still splits on the first variant tag.
regex!(KEYED_NAME_REGEX, format!(r"(?i)^(.+?)\.{VARIANT}\.(.+)$").as_str());
// `<VARIANT>.<ext>` with no key at all.
regex!(BARE_NAME_REGEX, format!(r"(?i)^{VARIANT}\.(.+)$").as_str());
regex!(VARIANT_REGEX, format!(r"(?i)^{VARIANT}$").as_str());
regex!(IDENTIFIER_REGEX, r"(?i)^[A-Z0-9]{10}$");
regex!(WHITESPACE_REGEX, r"\s+");
