//! CSV serialization with spreadsheet-compatible escaping.
//!
//! Documents are prefixed with a UTF-8 byte-order-mark so spreadsheet tools
//! detect the encoding, and fields containing commas, quotes or newlines are
//! quoted with internal quotes doubled.

use std::borrow::Cow;

/// UTF-8 byte-order-mark prepended to every generated document.
pub const UTF8_BOM: &str = "\u{feff}";

/// MIME type for generated CSV downloads.
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";

/// Escapes a single CSV field. A field containing a comma, a double quote or
/// a newline is wrapped in double quotes with internal quotes doubled;
/// anything else passes through unchanged.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Incremental CSV document writer with a fixed, caller-ordered header row.
pub struct CsvWriter {
    content: String,
    columns: usize,
}

impl CsvWriter {
    /// Starts a document: BOM followed by the escaped header row.
    pub fn new(headers: &[&str]) -> Self {
        let mut content = String::from(UTF8_BOM);
        push_row(&mut content, headers.iter().map(|h| Some(*h)));
        Self {
            content,
            columns: headers.len(),
        }
    }

    /// Appends a data row. Fields serialize in header order; `None` fields
    /// serialize to an empty unquoted value. Rows shorter than the header are
    /// padded with empty fields.
    pub fn row<'a, I>(&mut self, fields: I)
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut written = 0;
        let mut padded = Vec::with_capacity(self.columns);
        for field in fields {
            padded.push(field);
            written += 1;
        }
        while written < self.columns {
            padded.push(None);
            written += 1;
        }
        push_row(&mut self.content, padded.into_iter());
    }

    /// Returns the finished document.
    pub fn finish(self) -> String {
        self.content
    }
}

fn push_row<'a, I>(out: &mut String, fields: I)
where
    I: Iterator<Item = Option<&'a str>>,
{
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        if let Some(value) = field {
            out.push_str(&escape_field(value));
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(escape_field("Juan"), "Juan");
        assert_eq!(escape_field(""), "");
    }

    #[test]
    fn comma_forces_quoting() {
        assert_eq!(escape_field("O'Brien, Jr."), "\"O'Brien, Jr.\"");
    }

    #[test]
    fn internal_quotes_are_doubled() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn newline_forces_quoting() {
        assert_eq!(escape_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn document_starts_with_bom_and_headers() {
        let writer = CsvWriter::new(&["RUT", "Nombre"]);
        let doc = writer.finish();
        assert!(doc.starts_with(UTF8_BOM));
        assert_eq!(&doc[UTF8_BOM.len()..], "RUT,Nombre\n");
    }

    #[test]
    fn null_fields_serialize_empty() {
        let mut writer = CsvWriter::new(&["Nombre", "Teléfono", "Estado"]);
        writer.row([Some("O'Brien, Jr."), None, Some("Activo")]);
        let doc = writer.finish();
        let body = &doc[UTF8_BOM.len()..];
        assert_eq!(body, "Nombre,Teléfono,Estado\n\"O'Brien, Jr.\",,Activo\n");
    }

    #[test]
    fn short_rows_are_padded_to_header_width() {
        let mut writer = CsvWriter::new(&["A", "B", "C"]);
        writer.row([Some("x")]);
        let doc = writer.finish();
        assert!(doc.ends_with("x,,\n"));
    }
}
