use crate::Compression;
use crate::error::{Error, ErrorKind};
use std::str::FromStr;

impl FromStr for Compression {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stored" | "store" | "none" => Ok(Compression::Stored),
            "deflated" | "deflate" | "zip" => Ok(Compression::Deflated),
            "bzip2" | "bz2" => Ok(Compression::Bzip2),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(s.to_string())),
        }
    }
}
impl From<Compression> for zip::CompressionMethod {
    fn from(value: Compression) -> Self {
        match value {
            Compression::Stored => zip::CompressionMethod::Stored,
            Compression::Deflated => zip::CompressionMethod::Deflated,
            Compression::Bzip2 => zip::CompressionMethod::Bzip2,
        }
    }
}
