//! End-to-end tests through the public API
//!
//! Builds a reference list, a rename table and a directory of bulletins on
//! disk, then runs the loaders and the processor the way the CLI does.

use hydro_bulletin::constants::{ZS_END_MARKER, ZS_START_MARKER};
use hydro_bulletin::loader::{load_canonical_set, load_rename_table};
use hydro_bulletin::reconcile::MemorySink;
use hydro_bulletin::{BulletinConfig, BulletinProcessor, VariantCode};
use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const REFERENCE_CSV: &str = "name,river,geometry\n\
Красноярск,Енисей,POINT (92.87 56.01)\n\
Канск,Кан,POINT (95.70 56.20)\n\
Улан-Удэ,Селенга,POINT (107.60 51.83)\n";

const KRASNOYARSK: &str = ":р.Енисей     : Красноярск-ГМС:   212   :  +5    :        :        :         : ледостав          : 450    :";
const KANSK: &str = ":р.Кан        : Канск        :   210   :  -1    :        :        :         : ледостав          : 380    :";
const KANSK_WRAPPED: &str = ":             :              :         :        :        :        :         : забереги          :        :";

struct Workspace {
    _temp_dir: TempDir,
    input: PathBuf,
    output: PathBuf,
    reference: PathBuf,
}

fn workspace() -> Workspace {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("bulletins");
    fs::create_dir_all(&input).unwrap();
    let reference = temp_dir.path().join("gauges.csv");
    fs::write(&reference, REFERENCE_CSV).unwrap();

    Workspace {
        output: temp_dir.path().join("features"),
        input,
        reference,
        _temp_dir: temp_dir,
    }
}

/// Plain-text bulletin encoded in windows-1251, as the offices send it
fn write_cp1251_bulletin(path: &Path, data_lines: &[&str]) {
    let mut lines = vec!["ГИДРОЛОГИЧЕСКИЙ БЮЛЛЕТЕНЬ", ZS_START_MARKER];
    lines.extend_from_slice(data_lines);
    lines.push(ZS_END_MARKER);
    let text = lines.join("\r\n");
    let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode(&text);
    fs::write(path, encoded).unwrap();
}

fn write_docx(path: &Path, rows: &[&[&str]]) {
    let mut body = String::from("<w:tbl>");
    for row in rows {
        body.push_str("<w:tr>");
        for cell in *row {
            body.push_str(&format!("<w:tc><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:tc>", cell));
        }
        body.push_str("</w:tr>");
    }
    body.push_str("</w:tbl>");
    let xml = format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut archive = zip::ZipWriter::new(fs::File::create(path).unwrap());
    archive
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    archive.write_all(xml.as_bytes()).unwrap();
    archive.finish().unwrap();
}

fn read_csv(path: &Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .unwrap()
        .finish()
        .unwrap()
}

fn text_column(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_cp1251_bulletin_with_rename_table() {
    let ws = workspace();
    write_cp1251_bulletin(&ws.input.join("zs_1003.txt"), &[KRASNOYARSK, KANSK, KANSK_WRAPPED]);

    let renames_path = ws.input.parent().unwrap().join("renames.csv");
    let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode("Красноярск-ГМС;Красноярск\r\n");
    fs::write(&renames_path, encoded).unwrap();

    let config = BulletinConfig::default();
    let canonical = load_canonical_set(&ws.reference, &config.reference_columns).unwrap();
    let renames = load_rename_table(&renames_path, encoding_rs::WINDOWS_1251).unwrap();
    assert_eq!(canonical.len(), 3);
    assert_eq!(renames.get("Красноярск-ГМС"), Some("Красноярск"));

    let sink = Arc::new(MemorySink::new());
    let stats = BulletinProcessor::new(
        ws.input.clone(),
        ws.output.clone(),
        canonical,
        Some(renames),
        config,
    )
    .unwrap()
    .with_sink(sink.clone())
    .with_progress(false)
    .process()
    .await
    .unwrap();

    assert_eq!(stats.documents_processed, 1);
    assert_eq!(stats.records_extracted, 2);
    assert_eq!(stats.records_merged, 2);
    assert!(sink.is_empty());

    let df = read_csv(&ws.output.join("zs_1003_ZS.csv"));
    assert_eq!(text_column(&df, "Obs Point"), vec!["Красноярск", "Канск"]);
    assert_eq!(text_column(&df, "River"), vec!["Енисей", "Кан"]);
    assert_eq!(
        text_column(&df, "Ice"),
        vec!["ледостав", "ледостав забереги"]
    );
    assert_eq!(text_column(&df, "Flood Lvl"), vec!["450", "380"]);
}

#[tokio::test]
async fn test_mixed_directory_with_approximate_matching() {
    let ws = workspace();
    write_cp1251_bulletin(&ws.input.join("krasnoyarsk.txt"), &[KANSK]);
    write_docx(
        &ws.input.join("buryatia.docx"),
        &[
            &["Река – пункт", "Уровень", "Изм.", "Пойма", "Выход", "", ""],
            &["Селенга – Улан-Удэ", "245", "+3", "", "800", "", ""],
        ],
    );
    fs::write(ws.input.join("notes.pdf"), "not a bulletin").unwrap();

    let config = BulletinConfig::default();
    let canonical = load_canonical_set(&ws.reference, &config.reference_columns).unwrap();

    let stats = BulletinProcessor::new(ws.input.clone(), ws.output.clone(), canonical, None, config)
        .unwrap()
        .with_sink(Arc::new(MemorySink::new()))
        .with_progress(false)
        .process()
        .await
        .unwrap();

    assert_eq!(stats.documents_processed, 2);
    assert_eq!(stats.documents_failed, 0);
    assert_eq!(
        stats.outputs,
        vec![
            ws.output.join("buryatia_B.csv"),
            ws.output.join("krasnoyarsk_ZS.csv")
        ]
    );

    let b = read_csv(&ws.output.join("buryatia_B.csv"));
    assert_eq!(text_column(&b, "Obs Point"), vec!["Улан-Удэ"]);
    assert_eq!(text_column(&b, "River"), vec!["Селенга"]);
    assert_eq!(text_column(&b, "Floodplain Lvl"), vec!["-"]);
}

#[tokio::test]
async fn test_single_format_leaves_other_layouts_failed() {
    let ws = workspace();
    write_cp1251_bulletin(&ws.input.join("zs.txt"), &[KANSK]);
    write_docx(
        &ws.input.join("b.docx"),
        &[&["Селенга – Улан-Удэ", "245", "+3", "", "800", "", ""]],
    );

    let config = BulletinConfig::default().with_formats(vec![VariantCode::Zs]);
    let canonical = load_canonical_set(&ws.reference, &config.reference_columns).unwrap();

    let stats = BulletinProcessor::new(ws.input, ws.output.clone(), canonical, None, config)
        .unwrap()
        .with_sink(Arc::new(MemorySink::new()))
        .with_progress(false)
        .process()
        .await
        .unwrap();

    assert_eq!(stats.documents_processed, 1);
    assert_eq!(stats.documents_failed, 1);
    assert_eq!(stats.outputs, vec![ws.output.join("zs_ZS.csv")]);
}
