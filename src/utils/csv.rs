//! Minimal CSV writing helpers.

use std::io::{self, Write};

/// Escape a string for CSV output.
pub fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Write one CSV record terminated by a newline.
pub fn write_csv_row<W, I, S>(out: &mut W, fields: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let line = fields
        .into_iter()
        .map(|f| escape_csv(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{}", line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_unchanged() {
        assert_eq!(escape_csv("hello"), "hello");
        assert_eq!(escape_csv(""), "");
    }

    #[test]
    fn special_fields_quoted() {
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(escape_csv("cr\rhere"), "\"cr\rhere\"");
    }

    #[test]
    fn row_joined_with_commas() {
        let mut out = Vec::new();
        write_csv_row(&mut out, ["id", "text, with comma", "x"]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,\"text, with comma\",x\n"
        );
    }
}
