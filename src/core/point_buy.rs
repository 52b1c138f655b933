//! Point-buy checks. Nothing here blocks an export; every finding is a warning.

use crate::domain::model::{Attribute, CharacterSheet, SheetKey, Skill};
use crate::domain::rules;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleWarning {
    AgeOutOfRange { age: i32 },
    LuckMismatch { expected: i64, actual: i32 },
    AttributeSum { expected: i64, actual: i64 },
    AttributeOutOfRange { attribute: Attribute, value: i32 },
    SkillSum { expected: i64, actual: i64 },
    SkillOutOfRange { skill: Skill, value: i32, cap: i32 },
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleWarning::AgeOutOfRange { age } => write!(
                f,
                "Das Alter muss zwischen {} und {} liegen! (Derzeit: {})",
                rules::AGE_RANGE.start(),
                rules::AGE_RANGE.end(),
                age
            ),
            RuleWarning::LuckMismatch { expected, actual } => write!(
                f,
                "Die Glückspunkte müssen 15 minus Alter betragen, also {}! (Derzeit: {})",
                expected, actual
            ),
            RuleWarning::AttributeSum { expected, actual } => write!(
                f,
                "Die Summe der Attributpunkte muss genau {} betragen! (Derzeit: {})",
                expected, actual
            ),
            RuleWarning::AttributeOutOfRange { attribute, value } => write!(
                f,
                "{} muss zwischen {} und {} liegen! (Derzeit: {})",
                attribute,
                rules::ATTRIBUTE_RANGE.start(),
                rules::ATTRIBUTE_RANGE.end(),
                value
            ),
            RuleWarning::SkillSum { expected, actual } => write!(
                f,
                "Es müssen genau {} Punkte auf die Fähigkeiten verteilt werden! (Derzeit: {})",
                expected, actual
            ),
            RuleWarning::SkillOutOfRange { skill, value, cap } => write!(
                f,
                "{} muss zwischen 0 und {} liegen! (Derzeit: {})",
                skill, cap, value
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<RuleWarning>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleWarning> {
        self.warnings.iter()
    }

    pub fn log(&self, sheet_name: &str) {
        for warning in &self.warnings {
            tracing::warn!("⚠️ {}: {}", sheet_name, warning);
        }
    }
}

/// Checks a sheet against the point-buy rules.
///
/// Warnings come in a fixed order: age, luck, attribute sum, attribute ranges,
/// skill sum, skill ranges.
pub fn check(sheet: &CharacterSheet) -> ValidationReport {
    let mut warnings = Vec::new();

    if !rules::AGE_RANGE.contains(&sheet.age) {
        warnings.push(RuleWarning::AgeOutOfRange { age: sheet.age });
    }

    let expected_luck = rules::luck_points(sheet.age);
    if i64::from(sheet.luck_points) != expected_luck {
        warnings.push(RuleWarning::LuckMismatch {
            expected: expected_luck,
            actual: sheet.luck_points,
        });
    }

    warnings.extend(check_attributes(sheet));
    warnings.extend(check_skills(sheet));

    ValidationReport { warnings }
}

pub fn check_attributes(sheet: &CharacterSheet) -> Vec<RuleWarning> {
    let mut warnings = Vec::new();

    let budget = rules::attribute_budget(sheet.age);
    let total = sheet.attributes.total();
    if total != budget {
        warnings.push(RuleWarning::AttributeSum {
            expected: budget,
            actual: total,
        });
    }

    for &attribute in Attribute::ALL {
        let value = sheet.attributes[attribute];
        if !rules::ATTRIBUTE_RANGE.contains(&value) {
            warnings.push(RuleWarning::AttributeOutOfRange { attribute, value });
        }
    }

    warnings
}

pub fn check_skills(sheet: &CharacterSheet) -> Vec<RuleWarning> {
    let mut warnings = Vec::new();

    let total = sheet.skills.total();
    let budget = i64::from(rules::SKILL_POINT_BUDGET);
    if total != budget {
        warnings.push(RuleWarning::SkillSum {
            expected: budget,
            actual: total,
        });
    }

    for &skill in Skill::ALL {
        let value = sheet.skills[skill];
        if !rules::skill_range(sheet.hero_class, skill).contains(&value) {
            warnings.push(RuleWarning::SkillOutOfRange {
                skill,
                value,
                cap: rules::skill_cap(sheet.hero_class, skill),
            });
        }
    }

    warnings
}
