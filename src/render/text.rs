//! Plain-text rendering.
//!
//! The view is meant for reading and for feeding language models: a header,
//! one banner per page, paragraphs joined into single lines, and headings,
//! formulas and list items on lines of their own.

use crate::model::{BlockType, Document, Page};

const RULE_WIDTH: usize = 60;

/// Render a document as plain text.
pub fn to_plain_text(doc: &Document) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("# {}\n", doc.title));
    out.push_str(&format!("Source: {}\n", doc.source_file));
    out.push_str(&rule);
    out.push('\n');

    for page in &doc.pages {
        out.push_str(&format!("\n{}\n", rule));
        out.push_str(&format!("PAGE {}\n", page.page_number));
        out.push_str(&format!("{}\n\n", rule));
        render_page(page, &mut out);
    }

    out
}

fn render_page(page: &Page, out: &mut String) {
    let mut paragraph: Vec<&str> = Vec::new();

    for block in &page.text_blocks {
        match block.block_type {
            BlockType::Paragraph => {
                paragraph.push(&block.text);
                continue;
            }
            BlockType::Heading | BlockType::ListItem | BlockType::Formula => {
                flush(&mut paragraph, out);
            }
        }

        match block.block_type {
            BlockType::Heading => out.push_str(&format!("\n## {}\n\n", block.text)),
            BlockType::ListItem => out.push_str(&format!("{}\n", block.text)),
            BlockType::Formula => out.push_str(&format!("\n[FORMULA]: {}\n\n", block.text)),
            BlockType::Paragraph => {}
        }
    }
    flush(&mut paragraph, out);

    if !page.images.is_empty() {
        let names: Vec<&str> = page.images.iter().map(|i| i.filename.as_str()).collect();
        out.push_str(&format!("\n[Images on this page: {}]\n", names.join(", ")));
    }

    if !page.tables.is_empty() {
        out.push_str(&format!("\n[Tables on this page: {}]\n", page.tables.len()));
    }
}

fn flush(paragraph: &mut Vec<&str>, out: &mut String) {
    if !paragraph.is_empty() {
        out.push_str(&paragraph.join(" "));
        out.push_str("\n\n");
        paragraph.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageRef, Table, TableRef, TextBlock};

    fn block(text: &str, block_type: BlockType) -> TextBlock {
        TextBlock::new(text, block_type, 10.0, false).unwrap()
    }

    #[test]
    fn test_header_only() {
        let doc = Document::new("Lec 1", "Lec 1.pdf");
        let rule = "=".repeat(60);
        assert_eq!(
            to_plain_text(&doc),
            format!("# Lec 1\nSource: Lec 1.pdf\n{}\n", rule)
        );
    }

    #[test]
    fn test_page_layout() {
        let mut doc = Document::new("Lec", "Lec.pdf");
        let mut page = Page::new(1);
        page.text_blocks.push(block("Intro", BlockType::Heading));
        page.text_blocks.push(block("First part.", BlockType::Paragraph));
        page.text_blocks.push(block("Second part.", BlockType::Paragraph));
        page.text_blocks.push(block("- point", BlockType::ListItem));
        page.text_blocks.push(block("a ≤ b", BlockType::Formula));
        page.text_blocks.push(block("Closing.", BlockType::Paragraph));
        page.images.push(ImageRef::new(1, 1, "png", 2000));
        page.images.push(ImageRef::new(1, 2, "jpeg", 3000));
        let table = Table::from_raw(
            1,
            &vec![
                vec![Some("A".to_string())],
                vec![Some("1".to_string())],
            ],
        )
        .unwrap();
        page.tables.push(TableRef::new(&table, 1));
        doc.pages.push(page);

        let rule = "=".repeat(60);
        let expected = format!(
            "# Lec\nSource: Lec.pdf\n{rule}\n\
             \n{rule}\nPAGE 1\n{rule}\n\n\
             \n## Intro\n\n\
             First part. Second part.\n\n\
             - point\n\
             \n[FORMULA]: a ≤ b\n\n\
             Closing.\n\n\
             \n[Images on this page: page1_img1.png, page1_img2.jpeg]\n\
             \n[Tables on this page: 1]\n",
            rule = rule
        );
        assert_eq!(to_plain_text(&doc), expected);
    }

    #[test]
    fn test_paragraph_buffer_does_not_cross_pages() {
        let mut doc = Document::new("t", "t.pdf");
        for n in 1..=2 {
            let mut page = Page::new(n);
            page.text_blocks.push(block(&format!("text {}", n), BlockType::Paragraph));
            doc.pages.push(page);
        }

        let text = to_plain_text(&doc);
        assert!(text.contains("text 1\n\n\n"));
        assert!(text.contains("PAGE 2\n"));
        assert!(text.ends_with("text 2\n\n"));
    }
}
