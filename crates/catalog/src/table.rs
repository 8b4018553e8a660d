//! The SKU → identifier lookup table.
//!
//! The table is produced by an external fetch step as a CSV file with at
//! least a `sku` and an `asin` column. Headers are matched
//! case-insensitively in any order and a UTF-8 byte-order mark is tolerated.
//! Rows whose value is not a valid [`Identifier`] are dropped silently.

use crate::error::{ErrorKind, Result};
use crate::models::{Identifier, ImageName};
use exn::ResultExt;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::instrument;

const SKU_COLUMN: &str = "sku";
const IDENTIFIER_COLUMN: &str = "asin";

/// Immutable mapping from normalized SKU to identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierTable {
    entries: HashMap<String, Identifier>,
}
impl IdentifierTable {
    /// Loads the table from a CSV file.
    ///
    /// # Errors
    /// [`ErrorKind::TableNotFound`] when the file is missing, otherwise the
    /// errors of [`from_reader`](Self::from_reader).
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                exn::bail!(ErrorKind::TableNotFound(path.to_path_buf()))
            },
            Err(e) => exn::bail!(ErrorKind::MalformedTable(e.to_string())),
        };
        let table = Self::from_reader(file)?;
        tracing::info!(entries = table.len(), "Loaded identifier table");
        Ok(table)
    }

    /// Reads the table from CSV data.
    ///
    /// # Errors
    /// [`ErrorKind::MissingColumn`] when the header lacks `sku` or `asin`,
    /// [`ErrorKind::MalformedTable`] when the data is not readable CSV.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv.headers().or_raise(|| ErrorKind::MalformedTable("unreadable header row".to_string()))?;
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
                .ok_or(ErrorKind::MissingColumn(name))
        };
        let (sku_col, id_col) = (column(SKU_COLUMN)?, column(IDENTIFIER_COLUMN)?);

        let mut entries = HashMap::new();
        for (line, record) in csv.records().enumerate() {
            let record = record.or_raise(|| ErrorKind::MalformedTable(format!("unreadable row {}", line + 2)))?;
            let sku = normalize(record.get(sku_col).unwrap_or_default());
            let Ok(identifier) = record.get(id_col).unwrap_or_default().parse::<Identifier>() else {
                continue;
            };
            if !sku.is_empty() {
                entries.insert(sku, identifier);
            }
        }
        Ok(Self { entries })
    }

    /// Looks up a key case-insensitively. When the key itself is unknown, the
    /// same key with every `-` replaced by `/` is tried.
    pub fn lookup(&self, key: &str) -> Option<&Identifier> {
        let key = normalize(key);
        self.entries.get(&key).or_else(|| self.entries.get(&key.replace('-', "/")))
    }

    /// Resolves a name against the table. Already resolved names and keys
    /// the table doesn't know are returned unchanged.
    pub fn resolve(&self, name: ImageName) -> ImageName {
        match name {
            ImageName::Unresolved { key, variant, ext } => match self.lookup(&key) {
                Some(identifier) => ImageName::Resolved { identifier: identifier.clone(), variant, ext },
                None => ImageName::Unresolved { key, variant, ext },
            },
            resolved => resolved,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
impl FromIterator<(String, Identifier)> for IdentifierTable {
    fn from_iter<T: IntoIterator<Item = (String, Identifier)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(sku, id)| (normalize(&sku), id)).collect(),
        }
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Variant;
    use rstest::rstest;

    fn table(csv: &str) -> IdentifierTable {
        IdentifierTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_load_basic() {
        let t = table("sku,asin\nBrand Model Case Black,b0f3jg39sm\n");
        assert_eq!(t.lookup("brand model case black").map(Identifier::as_str), Some("B0F3JG39SM"));
        assert_eq!(t.lookup("  BRAND MODEL CASE BLACK ").map(Identifier::as_str), Some("B0F3JG39SM"));
    }

    #[rstest]
    #[case("\u{feff}sku,asin\nk,B0F3JG39SM\n")]
    #[case("ASIN,Title,SKU\nB0F3JG39SM,whatever,k\n")]
    #[case("title,Sku,Asin\nx,k,B0F3JG39SM\n")]
    fn test_headers_any_order_and_case(#[case] csv: &str) {
        assert_eq!(table(csv).lookup("k").map(Identifier::as_str), Some("B0F3JG39SM"));
    }

    #[rstest]
    #[case("name,asin\nk,B0F3JG39SM\n", "sku")]
    #[case("sku,id\nk,B0F3JG39SM\n", "asin")]
    #[case("", "sku")]
    fn test_missing_column(#[case] csv: &str, #[case] column: &str) {
        let err = IdentifierTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingColumn(c) if *c == column));
    }

    #[test]
    fn invalid_rows_are_dropped() {
        let t = table("sku,asin\na,TOOSHORT\n,B0F3JG39SM\nb,B0F3-G39SM\nc,B0F3JG39SM\nd\n");
        assert_eq!(t.len(), 1);
        assert!(t.lookup("c").is_some());
    }

    #[test]
    fn dash_falls_back_to_slash() {
        let t = table("sku,asin\ncase a/b black,B0F3JG39SM\n");
        assert_eq!(t.lookup("case a-b black").map(Identifier::as_str), Some("B0F3JG39SM"));
        assert_eq!(t.lookup("case a_b black"), None);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("sku2asin.csv");
        let err = IdentifierTable::load(&path).unwrap_err();
        assert!(matches!(&*err, ErrorKind::TableNotFound(p) if p == &path));
        assert!(err.is_retryable());

        std::fs::write(&path, "sku,asin\nk,B0F3JG39SM\n").unwrap();
        assert_eq!(IdentifierTable::load(&path).unwrap().len(), 1);
    }

    #[test]
    fn resolve_transitions_known_keys() {
        let t = table("sku,asin\nbrand model case black,B0F3JG39SM\n");
        let name = ImageName::parse("Brand Model Case Black.MAIN.jpg").unwrap();
        let resolved = t.resolve(name);
        assert_eq!(resolved.file_name(), "B0F3JG39SM.MAIN.jpg");
        assert_eq!(resolved.variant(), Variant::Main);

        let unknown = ImageName::parse("Other.PT02.jpg").unwrap();
        assert_eq!(t.resolve(unknown.clone()), unknown);
    }
}
