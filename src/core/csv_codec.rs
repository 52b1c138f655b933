//! Two-column CSV export of a sheet: one `Feld,Wert` row per field.
//!
//! Nested maps are stored as inline JSON, the inventory as a ", "-joined string.

use crate::domain::model::{Attributes, CharacterSheet, Description, HeroClass, SheetKey, Skills};
use crate::utils::error::{Result, SheetError};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

pub const FIELD_COLUMN: &str = "Feld";
pub const VALUE_COLUMN: &str = "Wert";

pub const NAME: &str = "Name";
pub const AGE: &str = "Alter";
pub const HERO_CLASS: &str = "Heldenklasse";
pub const LUCK_POINTS: &str = "Glückspunkte";
pub const ATTRIBUTES: &str = "Attribute";
pub const SKILLS: &str = "Fähigkeiten";
pub const DESCRIPTION: &str = "Beschreibung";
pub const INVENTORY: &str = "Inventar";
pub const HIDEOUT: &str = "Versteck";
pub const NOTES: &str = "Notizen";

pub const INVENTORY_SEPARATOR: &str = ", ";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// The exported rows, in file order.
pub fn rows(sheet: &CharacterSheet) -> Result<Vec<(&'static str, String)>> {
    Ok(vec![
        (NAME, sheet.name.clone()),
        (AGE, sheet.age.to_string()),
        (HERO_CLASS, sheet.hero_class.label().to_string()),
        (LUCK_POINTS, sheet.luck_points.to_string()),
        (ATTRIBUTES, serde_json::to_string(&sheet.attributes)?),
        (SKILLS, serde_json::to_string(&sheet.skills)?),
        (DESCRIPTION, serde_json::to_string(&sheet.description)?),
        (INVENTORY, sheet.inventory.join(INVENTORY_SEPARATOR)),
        (HIDEOUT, sheet.hideout.clone()),
        (NOTES, sheet.notes.clone()),
    ])
}

pub fn encode(sheet: &CharacterSheet) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record([FIELD_COLUMN, VALUE_COLUMN])?;
    for (field, value) in rows(sheet)? {
        writer.write_record([field, value.as_str()])?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| SheetError::IoError(e.into_error()))?;

    tracing::debug!("Encoded '{}' as CSV ({} bytes)", sheet.name, data.len());
    Ok(data)
}

pub fn decode(data: &[u8]) -> Result<CharacterSheet> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let table = FieldTable::read(data)?;

    let sheet = CharacterSheet {
        name: table.text(NAME)?.to_string(),
        age: table.integer(AGE)?,
        hero_class: HeroClass::parse(table.text(HERO_CLASS)?.trim())?,
        luck_points: table.integer(LUCK_POINTS)?,
        attributes: table.json::<Attributes>(ATTRIBUTES)?,
        skills: table.json::<Skills>(SKILLS)?,
        description: table.json::<Description>(DESCRIPTION)?,
        inventory: table
            .text(INVENTORY)?
            .split(INVENTORY_SEPARATOR)
            .map(str::to_string)
            .collect(),
        hideout: table.text(HIDEOUT)?.to_string(),
        notes: table.text(NOTES)?.to_string(),
    };

    tracing::debug!("Decoded '{}' from CSV", sheet.name);
    Ok(sheet)
}

/// Field name to value, first occurrence wins.
struct FieldTable {
    values: HashMap<String, String>,
}

impl FieldTable {
    fn read(data: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data);

        let headers = reader.headers()?.clone();
        let field_index = headers.iter().position(|h| h == FIELD_COLUMN);
        let value_index = headers.iter().position(|h| h == VALUE_COLUMN);
        let (Some(field_index), Some(value_index)) = (field_index, value_index) else {
            return Err(SheetError::MissingColumns {
                expected: format!("{}, {}", FIELD_COLUMN, VALUE_COLUMN),
            });
        };

        let mut values = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let Some(field) = record.get(field_index) else {
                continue;
            };
            let value = record.get(value_index).unwrap_or_default();
            values
                .entry(field.to_string())
                .or_insert_with(|| value.to_string());
        }

        Ok(Self { values })
    }

    fn text(&self, field: &str) -> Result<&str> {
        self.values
            .get(field)
            .map(String::as_str)
            .ok_or_else(|| SheetError::MissingField {
                field: field.to_string(),
            })
    }

    fn integer(&self, field: &str) -> Result<i32> {
        let raw = self.text(field)?;
        raw.trim().parse().map_err(|_| SheetError::InvalidField {
            field: field.to_string(),
            reason: format!("'{}' is not a whole number", raw),
        })
    }

    fn json<T: DeserializeOwned>(&self, field: &str) -> Result<T> {
        serde_json::from_str(self.text(field)?).map_err(|e| SheetError::InvalidField {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }
}
