//! Integration tests for the processor module
//!
//! Tests the complete processing pipeline against bulletin directories built
//! in temporary directories.


use crate::constants::{ZS_END_MARKER, ZS_START_MARKER};
use crate::models::{CanonicalFeature, CanonicalSet};
use std::io::Write;
use std::path::Path;

/// Gauges shared by the processor tests
pub fn canonical_set() -> CanonicalSet {
    vec![
        CanonicalFeature::new("Красноярск", "Енисей", "POINT (92.87 56.01)"),
        CanonicalFeature::new("Канск", "Кан", "POINT (95.70 56.20)"),
        CanonicalFeature::new("Улан-Удэ", "Селенга", "POINT (107.60 51.83)"),
        CanonicalFeature::new("Кабанск", "Селенга", "POINT (106.65 52.05)"),
    ]
    .into_iter()
    .collect()
}

/// A plain-text bulletin with the given data lines between the markers
pub fn write_zs_bulletin(path: &Path, data_lines: &[&str]) {
    let mut lines = vec![
        "ГИДРОЛОГИЧЕСКИЙ БЮЛЛЕТЕНЬ".to_string(),
        ZS_START_MARKER.to_string(),
    ];
    lines.extend(data_lines.iter().map(|line| line.to_string()));
    lines.push(ZS_END_MARKER.to_string());
    std::fs::write(path, lines.join("\r\n")).unwrap();
}

pub const ZS_KRASNOYARSK: &str = ":р.Енисей     : Красноярск   :   212   :  +5    :        :        :         : чисто             : 450    :";
pub const ZS_KANSK: &str = ":р.Кан        : Канск        :   210   :  -1    :        :        :         : ледостав          : 380    :";

/// A minimal `.docx` holding the given tables
pub fn write_docx(path: &Path, tables: &[&[&[&str]]]) {
    let mut body = String::new();
    for table in tables {
        body.push_str("<w:tbl>");
        for row in *table {
            body.push_str("<w:tr>");
            for cell in *row {
                body.push_str(&format!(
                    "<w:tc><w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p></w:tc>",
                    cell
                ));
            }
            body.push_str("</w:tr>");
        }
        body.push_str("</w:tbl>");
    }
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let file = std::fs::File::create(path).unwrap();
    let mut archive = zip::ZipWriter::new(file);
    archive
        .start_file(
            "word/document.xml",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
    archive.write_all(xml.as_bytes()).unwrap();
    archive.finish().unwrap();
}

/// B-layout table for the Selenga gauges; the second station is misspelled
pub const B_SELENGA: &[&[&str]] = &[
    &["Река – пункт", "Уровень", "Изм.", "Пойма", "Выход", "", ""],
    &["Селенга – Улан-Удэ", "1245", "+3", "51", "800", "", ""],
    &["Селенга – Кабанс", "310", "0", "", "650", "", ""],
];
