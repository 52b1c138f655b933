//! Fixed A4 layout of a character sheet.
//!
//! The layout only places bordered cells and text in PDF user space (points,
//! origin bottom-left); `pdf_writer` turns it into a document. Text is set in
//! Courier, so widths are exact: every glyph is 0.6 em wide.

use crate::domain::model::{Attribute, CharacterSheet, SheetKey};
use crate::domain::ports::PdfOptions;

pub const PAGE_WIDTH: i64 = 595;
pub const PAGE_HEIGHT: i64 = 842;
pub const MARGIN: i64 = 28;
pub const CONTENT_WIDTH: i64 = 536;

const PADDING: i64 = 4;
const SECTION_GAP: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Rect {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
    },
    Text {
        x: i64,
        y: i64,
        size: i64,
        font: Font,
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rect { .. } => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetLayout {
    pub title: String,
    pub pages: Vec<Page>,
}

impl SheetLayout {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(Page::texts)
    }
}

pub fn text_width(text: &str, size: i64) -> i64 {
    text.chars().count() as i64 * size * 6 / 10
}

/// How many Courier glyphs of `size` fit into `width`.
pub fn chars_fitting(width: i64, size: i64) -> usize {
    (width * 10 / (size.max(1) * 6)).max(1) as usize
}

/// Wraps at spaces, hard-breaking words longer than a line. Every `\n` starts a
/// new line; empty text yields one empty line.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r').replace('\t', " ");
        let mut line = String::new();
        let mut line_len = 0;

        for word in paragraph.split(' ') {
            let mut word: Vec<char> = word.chars().collect();

            let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
            if needed <= max_chars {
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.extend(word.iter());
                line_len += word.len();
                continue;
            }

            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
            }
            while word.len() > max_chars {
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            line.extend(word.iter());
            line_len = word.len();
        }

        lines.push(line);
    }

    lines
}

pub fn layout_sheet(sheet: &CharacterSheet, options: &PdfOptions) -> SheetLayout {
    let title = format!("{} - {}", sheet.name, sheet.hero_class);
    let mut composer = Composer::new(title, options);

    composer.section_heading("Glückspunkte");
    let half = CONTENT_WIDTH / 2;
    let row = composer.row_height();
    let style = composer.body(Align::Left);
    composer.ensure_space(row);
    composer.cell(0, half, row, &format!("Alter: {}", sheet.age), style);
    composer.cell(
        half,
        half,
        row,
        &format!("Verfügbare Glückspunkte: {}", sheet.luck_points),
        style,
    );
    composer.advance(row + SECTION_GAP);

    composer.section_heading("Attribute");
    for pair in Attribute::ALL.chunks(2) {
        composer.ensure_space(row);
        for (column, &attribute) in pair.iter().enumerate() {
            composer.cell(
                column as i64 * half,
                half,
                row,
                &format!("{}: {}", attribute, sheet.attributes[attribute]),
                style,
            );
        }
        composer.advance(row);
    }
    composer.advance(SECTION_GAP);

    skills_table(&mut composer, sheet);

    for (field, text) in sheet.description.iter() {
        composer.text_section(field.label(), text);
    }

    let items: Vec<&str> = sheet
        .inventory
        .iter()
        .map(String::as_str)
        .filter(|item| !item.is_empty())
        .collect();
    composer.text_section("Inventar", &items.join("\n"));
    composer.text_section("Versteck", &sheet.hideout);
    composer.text_section("Notizen", &sheet.notes);

    composer.finish()
}

/// One column per attribute, its three skills below it.
fn skills_table(composer: &mut Composer, sheet: &CharacterSheet) {
    let column_width = CONTENT_WIDTH / Attribute::ALL.len() as i64;
    let row = composer.row_height();

    let header = CellStyle {
        font: Font::Bold,
        size: composer.options.body_font_size,
        align: Align::Center,
    };
    let style = composer.body(Align::Left);

    composer.section_heading("Fähigkeiten");
    composer.ensure_space(row * 4);

    for (column, &attribute) in Attribute::ALL.iter().enumerate() {
        composer.cell(
            column as i64 * column_width,
            column_width,
            row,
            &format!("{} ({})", attribute, sheet.attributes[attribute]),
            header,
        );
    }
    composer.advance(row);

    let columns: Vec<Vec<_>> = Attribute::ALL
        .iter()
        .map(|attribute| attribute.skills().collect())
        .collect();
    let depth = columns.iter().map(Vec::len).max().unwrap_or(0);

    for line in 0..depth {
        for (column, skills) in columns.iter().enumerate() {
            let Some(&skill) = skills.get(line) else {
                continue;
            };
            let marker = if sheet.hero_class.is_core_skill(skill) { "*" } else { "" };
            composer.cell(
                column as i64 * column_width,
                column_width,
                row,
                &format!("{}{}: {}", skill, marker, sheet.skills[skill]),
                style,
            );
        }
        composer.advance(row);
    }

    composer.note(&format!("* Kernfähigkeit der Heldenklasse {}", sheet.hero_class));
    composer.advance(SECTION_GAP);
}

#[derive(Clone, Copy)]
struct CellStyle {
    font: Font,
    size: i64,
    align: Align,
}

struct Composer {
    options: PdfOptions,
    title: String,
    pages: Vec<Page>,
    /// Distance of the next free line from the top edge.
    cursor: i64,
}

impl Composer {
    fn new(title: String, options: &PdfOptions) -> Self {
        let mut composer = Self {
            options: options.clamped(),
            title,
            pages: Vec::new(),
            cursor: 0,
        };
        composer.new_page();
        composer
    }

    fn finish(self) -> SheetLayout {
        SheetLayout {
            title: self.title,
            pages: self.pages,
        }
    }

    fn row_height(&self) -> i64 {
        self.options.body_font_size + 2 * PADDING
    }

    fn line_height(&self) -> i64 {
        self.options.body_font_size + PADDING
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = MARGIN;

        let size = self.options.title_font_size;
        let height = size + 3 * PADDING;
        let title = self.title.clone();
        let style = CellStyle {
            font: Font::Bold,
            size,
            align: Align::Center,
        };
        self.cell(0, CONTENT_WIDTH, height, &title, style);
        self.advance(height + SECTION_GAP);
    }

    fn ensure_space(&mut self, height: i64) {
        if self.cursor + height > PAGE_HEIGHT - MARGIN {
            self.new_page();
        }
    }

    fn advance(&mut self, height: i64) {
        self.cursor += height;
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text(&mut self, x: i64, baseline_from_top: i64, size: i64, font: Font, text: &str) {
        if text.is_empty() {
            return;
        }
        self.push(DrawOp::Text {
            x: MARGIN + x,
            y: PAGE_HEIGHT - baseline_from_top,
            size,
            font,
            text: text.to_string(),
        });
    }

    fn frame(&mut self, x: i64, top: i64, width: i64, height: i64) {
        self.push(DrawOp::Rect {
            x: MARGIN + x,
            y: PAGE_HEIGHT - top - height,
            width,
            height,
        });
    }

    fn body(&self, align: Align) -> CellStyle {
        CellStyle {
            font: Font::Regular,
            size: self.options.body_font_size,
            align,
        }
    }

    fn heading(&self) -> CellStyle {
        CellStyle {
            font: Font::Bold,
            size: self.options.heading_font_size,
            align: Align::Center,
        }
    }

    fn heading_height(&self) -> i64 {
        self.options.heading_font_size + 2 * PADDING
    }

    /// A bordered single-line cell at the cursor. Overlong text is cut off.
    fn cell(&mut self, x: i64, width: i64, height: i64, text: &str, style: CellStyle) {
        let fitting = chars_fitting(width - 2 * PADDING, style.size);
        let text: String = text.chars().take(fitting).collect();
        let offset = match style.align {
            Align::Left => PADDING,
            Align::Center => (width - text_width(&text, style.size)) / 2,
        };

        let top = self.cursor;
        self.frame(x, top, width, height);
        self.text(
            x + offset,
            top + baseline_offset(height, style.size),
            style.size,
            style.font,
            &text,
        );
    }

    fn section_heading(&mut self, title: &str) {
        let height = self.heading_height();
        self.ensure_space(height + self.row_height());
        let style = self.heading();
        self.cell(0, CONTENT_WIDTH, height, title, style);
        self.advance(height);
    }

    /// An unbordered line of body text.
    fn note(&mut self, text: &str) {
        let line = self.line_height();
        self.ensure_space(line);
        let size = self.options.body_font_size;
        let top = self.cursor;
        self.text(PADDING, top + baseline_offset(line, size), size, Font::Regular, text);
        self.advance(line);
    }

    /// Heading plus a bordered block of wrapped text that may run over pages.
    fn text_section(&mut self, title: &str, content: &str) {
        self.section_heading(title);

        let size = self.options.body_font_size;
        let line = self.line_height();
        let lines = wrap_text(content, chars_fitting(CONTENT_WIDTH - 2 * PADDING, size));

        let mut block_top = self.cursor;
        for text in lines {
            if self.cursor + line + PADDING > PAGE_HEIGHT - MARGIN {
                self.close_block(block_top);
                self.new_page();
                block_top = self.cursor;
            }
            let top = self.cursor;
            self.text(PADDING, top + PADDING / 2 + baseline_offset(line, size), size, Font::Regular, &text);
            self.advance(line);
        }
        self.close_block(block_top);
        self.advance(SECTION_GAP);
    }

    fn close_block(&mut self, block_top: i64) {
        if self.cursor == block_top {
            return;
        }
        self.advance(PADDING);
        let height = self.cursor - block_top;
        self.frame(0, block_top, CONTENT_WIDTH, height);
    }
}

/// Baseline below the cell top that centers Courier capitals vertically.
fn baseline_offset(height: i64, size: i64) -> i64 {
    (height + size * 56 / 100) / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::FormState;
    use crate::domain::model::{DescriptionField, Skill};

    fn sample_sheet() -> CharacterSheet {
        let mut form = FormState::template();
        form.name = "Kim".to_string();
        form.hero_class = "Rocker".to_string();
        form.inventory = vec!["Walkman".into(), String::new(), "Kaugummi".into()];
        form.skills.insert("Bewegen".to_string(), 3);
        form.build().unwrap()
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("eins zwei drei", 9), vec!["eins zwei", "drei"]);
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
        assert_eq!(wrap_text("Donaudampfschiff", 6), vec!["Donaud", "ampfsc", "hiff"]);
        assert_eq!(wrap_text("ab Donaudampf", 6), vec!["ab", "Donaud", "ampf"]);
    }

    #[test]
    fn test_single_page_content() {
        let layout = layout_sheet(&sample_sheet(), &PdfOptions::default());
        let texts: Vec<&str> = layout.texts().collect();

        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.title, "Kim - Rocker");
        assert_eq!(texts[0], "Kim - Rocker");
        assert!(texts.contains(&"Alter: 12"));
        assert!(texts.contains(&"Verfügbare Glückspunkte: 3"));
        assert!(texts.contains(&"Körper: 1"));
        assert!(texts.contains(&"Körper (1)"));
        assert!(texts.contains(&"Bewegen*: 3"));
        assert!(texts.contains(&"Schleichen: 0"));
        assert!(texts.contains(&"Lieblingslied"));
        assert!(texts.contains(&"Walkman"));
        assert!(texts.contains(&"Kaugummi"));
        assert!(texts.contains(&"Notizen"));
    }

    #[test]
    fn test_skill_table_groups_under_attributes() {
        let layout = layout_sheet(&sample_sheet(), &PdfOptions::default());
        let page = &layout.pages[0];

        let position = |needle: &str| {
            page.ops
                .iter()
                .find_map(|op| match op {
                    DrawOp::Text { x, y, text, .. } if text == needle => Some((*x, *y)),
                    _ => None,
                })
                .unwrap()
        };

        // None of the Technik skills is a Rocker core skill.
        let (_, heading_y) = position("Technik (1)");
        for skill in Attribute::Technik.skills() {
            let (x, y) = position(&format!("{}: 0", skill));
            assert_eq!(x, MARGIN + CONTENT_WIDTH / 4 + PADDING);
            assert!(y < heading_y);
        }
        assert_eq!(Skill::Tuefteln.attribute(), Attribute::Technik);
    }

    #[test]
    fn test_long_notes_continue_on_next_page() {
        let mut sheet = sample_sheet();
        sheet.notes = (1..=120)
            .map(|i| format!("Notiz Nummer {}", i))
            .collect::<Vec<_>>()
            .join("\n");

        let layout = layout_sheet(&sheet, &PdfOptions::default());

        assert!(layout.pages.len() >= 2);
        for page in &layout.pages {
            assert_eq!(page.texts().next(), Some("Kim - Rocker"));
            for op in &page.ops {
                if let DrawOp::Rect { y, height, .. } = op {
                    assert!(*y >= MARGIN - PADDING, "rect below margin: {:?}", op);
                    assert!(y + height <= PAGE_HEIGHT - MARGIN + PADDING);
                }
            }
        }
        let last = layout.pages.last().unwrap();
        assert!(last.texts().any(|t| t == "Notiz Nummer 120"));
    }

    #[test]
    fn test_long_words_are_cut_in_cells() {
        let mut sheet = sample_sheet();
        sheet.name = "X".repeat(200);
        sheet
            .description
            .set(DescriptionField::Antrieb, "Y".repeat(200));

        let layout = layout_sheet(&sheet, &PdfOptions::default());
        for op in &layout.pages[0].ops {
            if let DrawOp::Text { x, size, text, .. } = op {
                assert!(x + text_width(text, *size) <= MARGIN + CONTENT_WIDTH);
            }
        }
        let antrieb: usize = layout.texts().filter(|t| t.starts_with('Y')).map(str::len).sum();
        assert_eq!(antrieb, 200);
    }

    #[test]
    fn test_font_sizes_outside_range_are_clamped() {
        let options = PdfOptions {
            author: None,
            title_font_size: 100,
            heading_font_size: -3,
            body_font_size: 0,
        };

        let layout = layout_sheet(&sample_sheet(), &options);
        for op in layout.pages.iter().flat_map(|page| &page.ops) {
            if let DrawOp::Text { size, .. } = op {
                assert!((6..=24).contains(size), "font size {} in {:?}", size, op);
            }
        }
        assert_eq!(chars_fitting(100, 0), 166);
    }
}
