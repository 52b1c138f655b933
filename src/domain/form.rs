//! The character form: a TOML draft of the inputs, rebuilt into a sheet.
//!
//! Every input has the range its widget would allow. Draft values outside that
//! range are pulled back into it the way a slider would, so a sheet built here
//! can only violate the point sums, never a single value's range.

use crate::domain::model::{
    Attribute, CharacterSheet, Description, DescriptionField, FieldMap, HeroClass, SheetKey,
    Skill,
};
use crate::domain::rules;
use crate::utils::error::{Result, SheetError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormState {
    pub name: String,
    pub age: i32,
    pub hero_class: String,
    pub inventory: Vec<String>,
    pub hideout: String,
    pub notes: String,
    pub attributes: BTreeMap<String, i32>,
    pub skills: BTreeMap<String, i32>,
    pub description: BTreeMap<String, String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: rules::DEFAULT_AGE,
            hero_class: HeroClass::default().label().to_string(),
            inventory: vec![String::new(); rules::INVENTORY_SLOTS],
            hideout: String::new(),
            notes: String::new(),
            attributes: labelled(|_: Attribute| rules::DEFAULT_ATTRIBUTE),
            skills: labelled(|_: Skill| 0),
            description: labelled(|_: DescriptionField| String::new()),
        }
    }
}

impl FormState {
    /// The untouched form.
    pub fn template() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Fills the form with an existing sheet, e.g. one imported from CSV.
    ///
    /// An imported inventory can hold more entries than the form has slots
    /// when an item contained `", "`. The extra entries are joined back into
    /// the last slot.
    pub fn from_sheet(sheet: &CharacterSheet) -> Self {
        Self {
            name: sheet.name.clone(),
            age: sheet.age,
            hero_class: sheet.hero_class.label().to_string(),
            inventory: fit_inventory(&sheet.inventory),
            hideout: sheet.hideout.clone(),
            notes: sheet.notes.clone(),
            attributes: to_labels(&sheet.attributes),
            skills: to_labels(&sheet.skills),
            description: to_labels(&sheet.description),
        }
    }

    /// Reruns the form top to bottom and produces the sheet it shows.
    pub fn build(&self) -> Result<CharacterSheet> {
        let age = clamp_input("age", self.age, rules::AGE_RANGE);

        let hero_class = HeroClass::from_label(&self.hero_class).ok_or_else(|| {
            form_error(
                "hero_class",
                format!(
                    "'{}' is not a hero class, choose one of: {}",
                    self.hero_class,
                    HeroClass::ALL
                        .iter()
                        .map(|class| class.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )
        })?;

        check_labels::<Attribute, _>("attributes", &self.attributes)?;
        check_labels::<Skill, _>("skills", &self.skills)?;
        check_labels::<DescriptionField, _>("description", &self.description)?;

        let attributes = FieldMap::from_fn(|attribute: Attribute| {
            let value = self
                .attributes
                .get(attribute.label())
                .copied()
                .unwrap_or(rules::DEFAULT_ATTRIBUTE);
            clamp_input(attribute.label(), value, rules::ATTRIBUTE_RANGE)
        });

        // Skill ranges follow the selected class.
        let skills = FieldMap::from_fn(|skill: Skill| {
            let value = self.skills.get(skill.label()).copied().unwrap_or(0);
            clamp_input(skill.label(), value, rules::skill_range(hero_class, skill))
        });

        let description: Description = FieldMap::from_fn(|field: DescriptionField| {
            self.description
                .get(field.label())
                .cloned()
                .unwrap_or_default()
        });

        if self.inventory.len() > rules::INVENTORY_SLOTS {
            return Err(form_error(
                "inventory",
                format!(
                    "{} items given, the form has {} slots",
                    self.inventory.len(),
                    rules::INVENTORY_SLOTS
                ),
            ));
        }
        let mut inventory = self.inventory.clone();
        inventory.resize(rules::INVENTORY_SLOTS, String::new());

        let luck_points = i32::try_from(rules::luck_points(age))
            .map_err(|e| form_error("age", format!("no luck points for age {}: {}", age, e)))?;

        tracing::debug!("Form rebuilt for '{}' ({}, age {})", self.name, hero_class, age);

        Ok(CharacterSheet {
            name: self.name.clone(),
            age,
            hero_class,
            luck_points,
            attributes,
            skills,
            description,
            inventory,
            hideout: self.hideout.clone(),
            notes: self.notes.clone(),
        })
    }
}

fn fit_inventory(items: &[String]) -> Vec<String> {
    if items.len() <= rules::INVENTORY_SLOTS {
        return items.to_vec();
    }
    let last = rules::INVENTORY_SLOTS - 1;
    let mut inventory = items[..last].to_vec();
    inventory.push(items[last..].join(", "));
    inventory
}

fn labelled<K: SheetKey, V>(f: impl Fn(K) -> V) -> BTreeMap<String, V> {
    K::ALL
        .iter()
        .map(|&key| (key.label().to_string(), f(key)))
        .collect()
}

fn to_labels<K: SheetKey, V: Clone>(map: &FieldMap<K, V>) -> BTreeMap<String, V> {
    map.iter()
        .map(|(key, value)| (key.label().to_string(), value.clone()))
        .collect()
}

fn check_labels<K: SheetKey, V>(field: &str, values: &BTreeMap<String, V>) -> Result<()> {
    match values.keys().find(|label| K::from_label(label).is_none()) {
        Some(label) => Err(form_error(field, format!("unknown {} '{}'", K::KIND, label))),
        None => Ok(()),
    }
}

fn clamp_input(field: &str, value: i32, range: RangeInclusive<i32>) -> i32 {
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        tracing::warn!(
            "{} = {} is outside {}..={}, using {}",
            field,
            value,
            range.start(),
            range.end(),
            clamped
        );
    }
    clamped
}

fn form_error(field: &str, message: String) -> SheetError {
    SheetError::FormError {
        field: field.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_builds_default_sheet() {
        let sheet = FormState::template().build().unwrap();

        assert_eq!(sheet.name, "");
        assert_eq!(sheet.age, 12);
        assert_eq!(sheet.hero_class, HeroClass::Buecherwurm);
        assert_eq!(sheet.luck_points, 3);
        assert_eq!(sheet.attributes.total(), 4);
        assert_eq!(sheet.skills.total(), 0);
        assert_eq!(sheet.inventory, vec!["", "", ""]);
    }

    #[test]
    fn test_values_are_clamped_to_widget_ranges() {
        let mut form = FormState::template();
        form.age = 17;
        form.hero_class = "Bauer".to_string();
        form.attributes.insert("Körper".to_string(), 9);
        form.attributes.insert("Herz".to_string(), 0);
        form.skills.insert("Tüfteln".to_string(), 5);
        form.skills.insert("Programmieren".to_string(), 2);

        let sheet = form.build().unwrap();

        assert_eq!(sheet.age, 15);
        assert_eq!(sheet.luck_points, 0);
        assert_eq!(sheet.attributes[Attribute::Koerper], 5);
        assert_eq!(sheet.attributes[Attribute::Herz], 1);
        // Tüfteln is a core skill of Bauer, Programmieren is not.
        assert_eq!(sheet.skills[Skill::Tuefteln], 3);
        assert_eq!(sheet.skills[Skill::Programmieren], 1);
    }

    #[test]
    fn test_partial_maps_use_defaults() {
        let form = FormState::from_toml_str(
            r#"
name = "Olle"
age = 10
hero_class = "Rocker"

[attributes]
"Verstand" = 4
"#,
        )
        .unwrap();

        let sheet = form.build().unwrap();
        assert_eq!(sheet.attributes[Attribute::Verstand], 4);
        assert_eq!(sheet.attributes[Attribute::Koerper], 1);
        assert_eq!(sheet.skills.total(), 0);
        assert_eq!(sheet.luck_points, 5);
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let mut form = FormState::template();
        form.hero_class = "Magier".to_string();
        assert!(matches!(form.build(), Err(SheetError::FormError { ref field, .. }) if field == "hero_class"));

        let mut form = FormState::template();
        form.skills.insert("Zaubern".to_string(), 1);
        assert!(matches!(form.build(), Err(SheetError::FormError { ref field, .. }) if field == "skills"));
    }

    #[test]
    fn test_too_many_inventory_items() {
        let mut form = FormState::template();
        form.inventory = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        assert!(form.build().is_err());

        form.inventory = vec!["Walkman".into()];
        assert_eq!(form.build().unwrap().inventory, vec!["Walkman", "", ""]);
    }

    #[test]
    fn test_split_inventory_folds_into_last_slot() {
        let mut sheet = FormState::template().build().unwrap();
        sheet.inventory = vec!["Zange".into(), "Seil".into(), "Brot".into(), "Wasser".into()];

        let form = FormState::from_sheet(&sheet);
        assert_eq!(form.inventory, vec!["Zange", "Seil", "Brot, Wasser"]);
        assert_eq!(form.build().unwrap().inventory, form.inventory);
    }

    #[test]
    fn test_unknown_draft_keys_fail_to_parse() {
        assert!(FormState::from_toml_str("nmae = \"typo\"").is_err());
    }

    #[test]
    fn test_toml_round_trip_of_sheet() {
        let mut form = FormState::template();
        form.name = "Kim".to_string();
        form.hero_class = "Sonderling".to_string();
        form.skills.insert("Ermitteln".to_string(), 3);
        form.notes = "Hat einen Schlüssel\nzum Dach".to_string();
        let sheet = form.build().unwrap();

        let text = FormState::from_sheet(&sheet).to_toml_string().unwrap();
        let rebuilt = FormState::from_toml_str(&text).unwrap().build().unwrap();

        assert_eq!(rebuilt, sheet);
    }
}
