//! End-to-end extraction of a PDF built with lopdf.

use std::fs;
use std::path::Path;

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use studypdf::{
    extract_file, BlockType, ContentSource, LopdfBackend, TableDetectorConfig, TableSource,
};
use tempfile::TempDir;

fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.resize(len, 0x42);
    data
}

fn jpeg_stream(len: usize) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 10i64,
            "Height" => 10i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8i64,
            "Filter" => "DCTDecode",
        },
        jpeg_bytes(len),
    )
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    content: &str,
    resources: lopdf::Dictionary,
) -> Object {
    let content_id = doc.add_object(Stream::new(
        lopdf::Dictionary::new(),
        content.as_bytes().to_vec(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    Object::from(page_id)
}

/// Two pages: a titled slide with two images, then a small table.
fn lecture_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let icon_id = doc.add_object(jpeg_stream(800));
    let chart_id = doc.add_object(jpeg_stream(5000));

    let slide = add_page(
        &mut doc,
        pages_id,
        "BT /F1 18 Tf 72 720 Td (Introduction) Tj ET \
         BT /F2 10 Tf 72 690 Td (Finance studies how money moves over time.) Tj ET \
         q 20 0 0 20 500 740 cm /Im1 Do Q \
         q 200 0 0 150 72 400 cm /Im2 Do Q",
        dictionary! {
            "Font" => dictionary! { "F1" => bold_id, "F2" => regular_id },
            "XObject" => dictionary! { "Im1" => icon_id, "Im2" => chart_id },
        },
    );

    let table = add_page(
        &mut doc,
        pages_id,
        "BT /F2 10 Tf 1 0 0 1 72 700 Tm (A) Tj ET \
         BT /F2 10 Tf 1 0 0 1 200 700 Tm (B) Tj ET \
         BT /F2 10 Tf 1 0 0 1 330 700 Tm (C) Tj ET \
         BT /F2 10 Tf 1 0 0 1 72 685 Tm (1) Tj ET \
         BT /F2 10 Tf 1 0 0 1 200 685 Tm (2) Tj ET \
         BT /F2 10 Tf 1 0 0 1 330 685 Tm (3) Tj ET",
        dictionary! {
            "Font" => dictionary! { "F2" => regular_id },
        },
    );

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![slide, table],
            "Count" => 2i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// One page whose title is shown in two pieces and whose body sits under a
/// scaling `cm`, the way slide exporters write them.
fn exported_slide_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let page = add_page(
        &mut doc,
        pages_id,
        "BT /F1 20 Tf 72 700 Td (Intro) Tj (duction) Tj ET \
         q .75 0 0 .75 0 0 cm \
         BT /F1 16 Tf 100 600 Td (Body text at twelve points) Tj ET Q",
        dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
    );

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page],
            "Count" => 1i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn write_lecture(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("Lec 1 Intro.pdf");
    fs::write(&path, lecture_pdf()).unwrap();
    path
}

#[test]
fn test_backend_reads_text_and_images() {
    let backend = LopdfBackend::load_bytes(&lecture_pdf()).unwrap();
    assert_eq!(backend.page_numbers(), vec![1, 2]);

    let lines = backend.page_lines(1).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text(), "Introduction");
    let first = lines[0].first_span().unwrap();
    assert_eq!(first.font_size, 18.0);
    assert!(first.is_bold);

    let images = backend.page_images(1).unwrap();
    assert_eq!(images.len(), 2);
    let chart = backend.extract_image(images[1]).unwrap();
    assert_eq!(chart.extension, "jpeg");
    assert_eq!(chart.byte_size(), 5000);

    assert!(backend.page_images(2).unwrap().is_empty());
}

#[test]
fn test_backend_detects_table() {
    let backend = LopdfBackend::load_bytes(&lecture_pdf()).unwrap();
    let tables = backend.detect_tables().unwrap();

    assert!(!tables.contains_key(&1));
    let grid = &tables[&2][0];
    assert_eq!(grid.len(), 2);
    assert_eq!(
        grid[0],
        vec![
            Some("A".to_string()),
            Some("B".to_string()),
            Some("C".to_string())
        ]
    );
}

#[test]
fn test_table_config_rejects_wide_grids() {
    let narrow = TableDetectorConfig {
        max_columns: 2,
        ..TableDetectorConfig::default()
    };
    let backend = LopdfBackend::load_bytes(&lecture_pdf())
        .unwrap()
        .with_table_config(narrow);

    assert!(backend.detect_tables().unwrap().is_empty());
}

#[test]
fn test_split_show_operators_form_one_word() {
    let backend = LopdfBackend::load_bytes(&exported_slide_pdf()).unwrap();
    let lines = backend.page_lines(1).unwrap();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text(), "Introduction");
    assert_eq!(lines[0].spans.len(), 1);
}

#[test]
fn test_scaled_body_is_a_paragraph() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("exported.pdf");
    fs::write(&input, exported_slide_pdf()).unwrap();

    let report = extract_file(&input, dir.path().join("out")).unwrap();
    let blocks = &report.document.pages[0].text_blocks;

    assert_eq!(blocks[0].text, "Introduction");
    assert_eq!(blocks[0].block_type, BlockType::Heading);
    assert_eq!(blocks[1].text, "Body text at twelve points");
    assert_eq!(blocks[1].font_size, 12.0);
    assert_eq!(blocks[1].block_type, BlockType::Paragraph);
}

#[test]
fn test_extract_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write_lecture(dir.path());
    let out = dir.path().join("extracted");

    let report = extract_file(&input, &out).unwrap();
    let doc = &report.document;

    assert!(report.warnings.is_empty());
    assert_eq!(doc.title, "Lec 1 Intro");
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.totals.total_images, 1);
    assert_eq!(doc.totals.total_tables, 1);
    assert_eq!(doc.totals.total_formulas, 0);
    assert_eq!(doc.pages[0].text_blocks[0].block_type, BlockType::Heading);
    assert_eq!(doc.pages[0].text_blocks[0].text, "Introduction");
    assert_eq!(doc.pages[0].text_blocks[1].block_type, BlockType::Paragraph);

    let image = out.join("images/page1_img1.jpeg");
    assert!(fs::metadata(&image).unwrap().len() >= 5000);
    assert!(!out.join("images/page1_img2.jpeg").exists());

    let table: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("tables/page2_table1.json")).unwrap())
            .unwrap();
    assert_eq!(table["row_count"], 1);
    assert_eq!(table["col_count"], 3);
    assert_eq!(table["page"], 2);
    assert_eq!(table["rows"][0], serde_json::json!(["1", "2", "3"]));

    let text = fs::read_to_string(out.join("text/full_text.txt")).unwrap();
    assert!(text.starts_with("# Lec 1 Intro\n"));
    assert!(text.contains("\n## Introduction\n"));
    assert!(text.contains("[Tables on this page: 1]"));
}

#[test]
fn test_rerun_overwrites_identically() {
    let dir = TempDir::new().unwrap();
    let input = write_lecture(dir.path());
    let out = dir.path().join("extracted");

    extract_file(&input, &out).unwrap();
    let first = fs::read(out.join("extracted_content.json")).unwrap();
    extract_file(&input, &out).unwrap();

    assert_eq!(first, fs::read(out.join("extracted_content.json")).unwrap());
}
