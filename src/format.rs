//! Output formats understood by the conversion service.
//!
//! The service is the authority on which formats exist, so [`Format`] never
//! rejects a value: unknown names are kept in [`Format::Custom`] and
//! forwarded as-is.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Requested output format, sent as the `format` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Format {
    /// Comma Separated Values. (default)
    #[default]
    Csv,
    /// XML using HTML tables.
    Xml,
    /// Single-sheet Excel workbook.
    XlsxSingle,
    /// Excel workbook with one sheet per page.
    XlsxMultiple,
    /// Any other value, passed through unchanged.
    Custom(String),
}

impl Format {
    /// Alias for [`Format::XlsxSingle`].
    pub const XLSX: Format = Format::XlsxSingle;

    /// The wire value for the `format` query parameter.
    pub fn as_str(&self) -> &str {
        match self {
            Format::Csv => "csv",
            Format::Xml => "xml",
            Format::XlsxSingle => "xlsx-single",
            Format::XlsxMultiple => "xlsx-multiple",
            Format::Custom(s) => s,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Format::from(s))
    }
}

impl From<&str> for Format {
    fn from(s: &str) -> Self {
        match s {
            "csv" => Format::Csv,
            "xml" => Format::Xml,
            "xlsx" | "xlsx-single" => Format::XlsxSingle,
            "xlsx-multiple" => Format::XlsxMultiple,
            other => Format::Custom(other.to_string()),
        }
    }
}

impl From<String> for Format {
    fn from(s: String) -> Self {
        Format::from(s.as_str())
    }
}

impl From<Format> for String {
    fn from(f: Format) -> Self {
        f.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values() {
        assert_eq!(Format::Csv.as_str(), "csv");
        assert_eq!(Format::Xml.as_str(), "xml");
        assert_eq!(Format::XlsxSingle.as_str(), "xlsx-single");
        assert_eq!(Format::XlsxMultiple.as_str(), "xlsx-multiple");
        assert_eq!(Format::XLSX, Format::XlsxSingle);
    }

    #[test]
    fn parse_known_and_alias() {
        assert_eq!("csv".parse::<Format>().unwrap(), Format::Csv);
        assert_eq!("xlsx".parse::<Format>().unwrap(), Format::XlsxSingle);
        assert_eq!("xlsx-multiple".parse::<Format>().unwrap(), Format::XlsxMultiple);
    }

    #[test]
    fn unknown_values_pass_through() {
        let f = Format::from("html");
        assert_eq!(f, Format::Custom("html".into()));
        assert_eq!(f.to_string(), "html");
    }

    #[test]
    fn serde_uses_wire_values() {
        let json = serde_json::to_string(&Format::XlsxMultiple).unwrap();
        assert_eq!(json, "\"xlsx-multiple\"");
        let back: Format = serde_json::from_str("\"xlsx\"").unwrap();
        assert_eq!(back, Format::XlsxSingle);
    }

    #[test]
    fn default_is_csv() {
        assert_eq!(Format::default(), Format::Csv);
    }
}
