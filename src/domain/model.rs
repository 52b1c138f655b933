use crate::utils::error::SheetError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

/// A closed vocabulary whose variants appear on the sheet under a fixed German label.
///
/// `ALL` lists the variants in sheet order, which is also their `Ord` order.
pub trait SheetKey: Copy + Ord + fmt::Debug + 'static {
    const KIND: &'static str;
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.label() == label)
    }

    fn parse(label: &str) -> Result<Self, SheetError> {
        Self::from_label(label).ok_or_else(|| SheetError::UnknownName {
            kind: Self::KIND,
            name: label.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    Koerper,
    Technik,
    Herz,
    Verstand,
}

impl SheetKey for Attribute {
    const KIND: &'static str = "attribute";
    const ALL: &'static [Self] = &[
        Attribute::Koerper,
        Attribute::Technik,
        Attribute::Herz,
        Attribute::Verstand,
    ];

    fn label(self) -> &'static str {
        match self {
            Attribute::Koerper => "Körper",
            Attribute::Technik => "Technik",
            Attribute::Herz => "Herz",
            Attribute::Verstand => "Verstand",
        }
    }
}

impl Attribute {
    /// Skills governed by this attribute, in sheet order.
    pub fn skills(self) -> impl Iterator<Item = Skill> {
        Skill::ALL
            .iter()
            .copied()
            .filter(move |skill| skill.attribute() == self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Skill {
    Schleichen,
    Kraftakt,
    Bewegen,
    Tuefteln,
    Programmieren,
    Berechnen,
    Kontakte,
    Schmeicheln,
    Fuehren,
    Ermitteln,
    Begreifen,
    Einfuehlen,
}

impl SheetKey for Skill {
    const KIND: &'static str = "skill";
    const ALL: &'static [Self] = &[
        Skill::Schleichen,
        Skill::Kraftakt,
        Skill::Bewegen,
        Skill::Tuefteln,
        Skill::Programmieren,
        Skill::Berechnen,
        Skill::Kontakte,
        Skill::Schmeicheln,
        Skill::Fuehren,
        Skill::Ermitteln,
        Skill::Begreifen,
        Skill::Einfuehlen,
    ];

    fn label(self) -> &'static str {
        match self {
            Skill::Schleichen => "Schleichen",
            Skill::Kraftakt => "Kraftakt",
            Skill::Bewegen => "Bewegen",
            Skill::Tuefteln => "Tüfteln",
            Skill::Programmieren => "Programmieren",
            Skill::Berechnen => "Berechnen",
            Skill::Kontakte => "Kontakte",
            Skill::Schmeicheln => "Schmeicheln",
            Skill::Fuehren => "Führen",
            Skill::Ermitteln => "Ermitteln",
            Skill::Begreifen => "Begreifen",
            Skill::Einfuehlen => "Einfühlen",
        }
    }
}

impl Skill {
    pub fn attribute(self) -> Attribute {
        match self {
            Skill::Schleichen | Skill::Kraftakt | Skill::Bewegen => Attribute::Koerper,
            Skill::Tuefteln | Skill::Programmieren | Skill::Berechnen => Attribute::Technik,
            Skill::Kontakte | Skill::Schmeicheln | Skill::Fuehren => Attribute::Herz,
            Skill::Ermitteln | Skill::Begreifen | Skill::Einfuehlen => Attribute::Verstand,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeroClass {
    #[default]
    Buecherwurm,
    Computernerd,
    Bauer,
    Sportler,
    Klassenliebling,
    Rocker,
    Troublemaker,
    Sonderling,
}

impl SheetKey for HeroClass {
    const KIND: &'static str = "hero class";
    const ALL: &'static [Self] = &[
        HeroClass::Buecherwurm,
        HeroClass::Computernerd,
        HeroClass::Bauer,
        HeroClass::Sportler,
        HeroClass::Klassenliebling,
        HeroClass::Rocker,
        HeroClass::Troublemaker,
        HeroClass::Sonderling,
    ];

    fn label(self) -> &'static str {
        match self {
            HeroClass::Buecherwurm => "Bücherwurm",
            HeroClass::Computernerd => "Computernerd",
            HeroClass::Bauer => "Bauer",
            HeroClass::Sportler => "Sportler",
            HeroClass::Klassenliebling => "Klassenliebling",
            HeroClass::Rocker => "Rocker",
            HeroClass::Troublemaker => "Troublemaker",
            HeroClass::Sonderling => "Sonderling",
        }
    }
}

impl HeroClass {
    /// The three skills whose cap this class raises.
    pub fn core_skills(self) -> [Skill; 3] {
        use Skill::*;
        match self {
            HeroClass::Buecherwurm => [Berechnen, Ermitteln, Begreifen],
            HeroClass::Computernerd => [Berechnen, Programmieren, Begreifen],
            HeroClass::Bauer => [Kraftakt, Bewegen, Tuefteln],
            HeroClass::Sportler => [Kraftakt, Bewegen, Kontakte],
            HeroClass::Klassenliebling => [Kontakte, Schmeicheln, Fuehren],
            HeroClass::Rocker => [Bewegen, Schmeicheln, Einfuehlen],
            HeroClass::Troublemaker => [Kraftakt, Schleichen, Fuehren],
            HeroClass::Sonderling => [Schleichen, Ermitteln, Einfuehlen],
        }
    }

    pub fn is_core_skill(self, skill: Skill) -> bool {
        self.core_skills().contains(&skill)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DescriptionField {
    Antrieb,
    Problem,
    Stolz,
    Beschreibung,
    Lieblingslied,
}

impl SheetKey for DescriptionField {
    const KIND: &'static str = "description field";
    const ALL: &'static [Self] = &[
        DescriptionField::Antrieb,
        DescriptionField::Problem,
        DescriptionField::Stolz,
        DescriptionField::Beschreibung,
        DescriptionField::Lieblingslied,
    ];

    fn label(self) -> &'static str {
        match self {
            DescriptionField::Antrieb => "Antrieb",
            DescriptionField::Problem => "Problem",
            DescriptionField::Stolz => "Stolz",
            DescriptionField::Beschreibung => "Beschreibung",
            DescriptionField::Lieblingslied => "Lieblingslied",
        }
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_label!(Attribute, Skill, HeroClass, DescriptionField);

/// A total mapping from every key of `K` to a value.
///
/// Serializes as a JSON/TOML object keyed by label in sheet order. Deserializing
/// rejects unknown labels and requires every label to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap<K: SheetKey, V> {
    values: BTreeMap<K, V>,
}

impl<K: SheetKey, V> FieldMap<K, V> {
    pub fn from_fn(mut f: impl FnMut(K) -> V) -> Self {
        Self {
            values: K::ALL.iter().map(|&key| (key, f(key))).collect(),
        }
    }

    /// Builds a map from `(label, value)` pairs.
    pub fn try_from_labels<I>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let mut values = BTreeMap::new();
        for (label, value) in pairs {
            let key = K::from_label(&label)
                .ok_or_else(|| format!("unknown {} '{}'", K::KIND, label))?;
            values.insert(key, value);
        }

        if let Some(missing) = K::ALL.iter().find(|key| !values.contains_key(*key)) {
            return Err(format!("missing {} '{}'", K::KIND, missing.label()));
        }

        Ok(Self { values })
    }

    pub fn get(&self, key: K) -> &V {
        &self.values[&key]
    }

    pub fn set(&mut self, key: K, value: V) {
        self.values.insert(key, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.values.iter().map(|(key, value)| (*key, value))
    }
}

impl<K: SheetKey> FieldMap<K, i32> {
    /// Summed in `i64`, imported values may be anywhere in `i32`.
    pub fn total(&self) -> i64 {
        self.values.values().map(|&value| i64::from(value)).sum()
    }
}

impl<K: SheetKey, V: Default> Default for FieldMap<K, V> {
    fn default() -> Self {
        Self::from_fn(|_| V::default())
    }
}

impl<K: SheetKey, V> Index<K> for FieldMap<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &V {
        self.get(key)
    }
}

impl<K: SheetKey, V: Serialize> Serialize for FieldMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.values.iter().map(|(key, value)| (key.label(), value)))
    }
}

impl<'de, K: SheetKey, V: Deserialize<'de>> Deserialize<'de> for FieldMap<K, V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, V>::deserialize(deserializer)?;
        Self::try_from_labels(raw).map_err(D::Error::custom)
    }
}

pub type Attributes = FieldMap<Attribute, i32>;
pub type Skills = FieldMap<Skill, i32>;
pub type Description = FieldMap<DescriptionField, String>;

/// A flat character record as exported to CSV and rendered to PDF.
///
/// Values are not range-checked here: a sheet imported from CSV keeps whatever
/// the file held, and `core::point_buy` reports the problems as warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSheet {
    pub name: String,
    pub age: i32,
    pub hero_class: HeroClass,
    pub luck_points: i32,
    pub attributes: Attributes,
    pub skills: Skills,
    pub description: Description,
    pub inventory: Vec<String>,
    pub hideout: String,
    pub notes: String,
}

impl CharacterSheet {
    /// Base file name shared by every export, `{name}_{heldenklasse}`.
    pub fn file_stem(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
            .collect();
        format!("{}_{}", name, self.hero_class)
    }
}
