use crate::core::pdf_layout::{self, DrawOp, Font, SheetLayout, PAGE_HEIGHT, PAGE_WIDTH};
use crate::domain::model::CharacterSheet;
use crate::domain::ports::PdfOptions;
use crate::utils::error::Result;
use chrono::{DateTime, Local};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, StringFormat, Stream};

const PRODUCER: &str = "heldenbogen";

#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub author: Option<String>,
    pub created: DateTime<Local>,
}

/// Lays out and encodes a sheet as a PDF document.
pub fn render(sheet: &CharacterSheet, options: &PdfOptions) -> Result<Vec<u8>> {
    let layout = pdf_layout::layout_sheet(sheet, options);
    let info = DocumentInfo {
        title: layout.title.clone(),
        author: options.author.clone(),
        created: Local::now(),
    };

    let data = write_document(&layout, &info)?;
    tracing::debug!(
        "Rendered '{}' as PDF ({} pages, {} bytes)",
        sheet.name,
        layout.pages.len(),
        data.len()
    );
    Ok(data)
}

pub fn write_document(layout: &SheetLayout, info: &DocumentInfo) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dictionary("Courier"));
    let bold_id = doc.add_object(font_dictionary("Courier-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content: Content = Content {
            operations: page.ops.iter().flat_map(operations).collect::<Vec<Operation>>(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(info_dictionary(info));
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn font_dictionary(base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn info_dictionary(info: &DocumentInfo) -> Dictionary {
    let mut dict = dictionary! {
        "Title" => text_string(&info.title),
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(info.created.format("D:%Y%m%d%H%M%S").to_string()),
    };
    if let Some(author) = &info.author {
        dict.set("Author", text_string(author));
    }
    dict
}

fn operations(op: &DrawOp) -> Vec<Operation> {
    match op {
        DrawOp::Rect {
            x,
            y,
            width,
            height,
        } => vec![
            Operation::new(
                "re",
                vec![(*x).into(), (*y).into(), (*width).into(), (*height).into()],
            ),
            Operation::new("S", vec![]),
        ],
        DrawOp::Text {
            x,
            y,
            size,
            font,
            text,
        } => {
            let font_name = match font {
                Font::Regular => "F1",
                Font::Bold => "F2",
            };
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![font_name.into(), (*size).into()]),
                Operation::new("Td", vec![(*x).into(), (*y).into()]),
                Operation::new("Tj", vec![text_string(text)]),
                Operation::new("ET", vec![]),
            ]
        }
    }
}

fn text_string(text: &str) -> Object {
    Object::String(win_ansi(text), StringFormat::Literal)
}

/// Encodes text for the standard fonts. Characters without a WinAnsi code
/// become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '–' => 0x96,
            '—' => 0x97,
            c if (' '..='~').contains(&c) => c as u8,
            c if ('\u{a0}'..='\u{ff}').contains(&c) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::FormState;
    use chrono::TimeZone;

    fn shown_strings(data: &[u8]) -> Vec<Vec<u8>> {
        let doc = Document::load_mem(data).unwrap();
        let mut shown = Vec::new();
        for (_, page_id) in doc.get_pages() {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            for operation in content.operations {
                if operation.operator == "Tj" {
                    if let Some(Object::String(bytes, _)) = operation.operands.first() {
                        shown.push(bytes.clone());
                    }
                }
            }
        }
        shown
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("Körper"), b"K\xf6rper".to_vec());
        assert_eq!(win_ansi("Fähigkeiten – ß"), b"F\xe4higkeiten \x96 \xdf".to_vec());
        assert_eq!(win_ansi("Lied 🎵"), b"Lied ?".to_vec());
    }

    #[test]
    fn test_rendered_pdf_parses() {
        let mut form = FormState::template();
        form.name = "Kim".to_string();
        form.hero_class = "Troublemaker".to_string();
        let sheet = form.build().unwrap();

        let data = render(&sheet, &PdfOptions::default()).unwrap();
        assert!(data.starts_with(b"%PDF-1.5"));

        let shown = shown_strings(&data);
        assert_eq!(shown[0], b"Kim - Troublemaker".to_vec());
        assert!(shown.contains(&win_ansi("Verfügbare Glückspunkte: 3")));
        assert!(shown.contains(&win_ansi("Schleichen*: 0")));
    }

    #[test]
    fn test_one_pdf_page_per_layout_page() {
        let mut form = FormState::template();
        form.notes = "Zeile\n".repeat(150);
        let sheet = form.build().unwrap();

        let layout = pdf_layout::layout_sheet(&sheet, &PdfOptions::default());
        let info = DocumentInfo {
            title: layout.title.clone(),
            author: Some("Spielleitung".to_string()),
            created: Local.with_ymd_and_hms(1985, 6, 1, 12, 0, 0).unwrap(),
        };
        let data = write_document(&layout, &info).unwrap();

        let doc = Document::load_mem(&data).unwrap();
        assert!(layout.pages.len() > 1);
        assert_eq!(doc.get_pages().len(), layout.pages.len());

        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info_dict = doc.get_dictionary(info_id).unwrap();
        assert_eq!(
            info_dict.get(b"Author").unwrap().as_str().unwrap(),
            b"Spielleitung"
        );
        assert_eq!(
            info_dict.get(b"CreationDate").unwrap().as_str().unwrap(),
            b"D:19850601120000"
        );
    }
}
