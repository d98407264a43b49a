//! Plain-text bulletins
//!
//! Older offices still send text in a single-byte Cyrillic code page, so
//! anything that is not valid UTF-8 is decoded with a configurable fallback.

use crate::content::DocumentContent;
use crate::error::{BulletinError, Result};
use encoding_rs::Encoding;
use std::path::Path;
use tracing::{debug, warn};

pub fn read_text(path: &Path, fallback: &'static Encoding) -> Result<DocumentContent> {
    let bytes = std::fs::read(path)?;
    let text = decode(bytes, fallback, path);
    Ok(DocumentContent::Text(split_lines(&text)))
}

/// Decode as UTF-8, or with `fallback` when that fails
pub fn decode(bytes: Vec<u8>, fallback: &'static Encoding, path: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(error) => {
            debug!(
                "{} is not UTF-8, decoding as {}",
                path.display(),
                fallback.name()
            );
            let (text, _, had_errors) = fallback.decode(error.as_bytes());
            if had_errors {
                warn!(
                    "{} contains bytes that are invalid in {}",
                    path.display(),
                    fallback.name()
                );
            }
            text.into_owned()
        }
    }
}

/// Lines without terminators or a leading byte-order mark
fn split_lines(text: &str) -> Vec<String> {
    text.trim_start_matches('\u{feff}')
        .lines()
        .map(str::to_string)
        .collect()
}

/// Encoding for a WHATWG label such as `windows-1251` or `koi8-r`
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| BulletinError::Configuration {
        message: format!("unknown text encoding '{}'", label),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_utf8_lines_are_split_without_terminators() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all("\u{feff}первая\r\nвторая\n".as_bytes())
            .unwrap();

        let content = read_text(file.path(), encoding_rs::WINDOWS_1251).unwrap();
        assert_eq!(
            content.as_text().unwrap(),
            ["первая".to_string(), "вторая".to_string()]
        );
    }

    #[test]
    fn test_falls_back_to_single_byte_code_page() {
        let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode("р.Обь: Барнаул");
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&encoded).unwrap();

        let content = read_text(file.path(), encoding_rs::WINDOWS_1251).unwrap();
        assert_eq!(content.as_text().unwrap(), ["р.Обь: Барнаул".to_string()]);
    }

    #[test]
    fn test_encoding_labels() {
        assert_eq!(
            encoding_for_label("windows-1251").unwrap(),
            encoding_rs::WINDOWS_1251
        );
        assert_eq!(encoding_for_label("koi8-r").unwrap(), encoding_rs::KOI8_R);
        assert!(encoding_for_label("martian").is_err());
    }
}
