//! Point-buy constants of the character creation rules.

use crate::domain::model::{HeroClass, Skill};
use std::ops::RangeInclusive;

pub const AGE_RANGE: RangeInclusive<i32> = 10..=15;
pub const DEFAULT_AGE: i32 = 12;

pub const ATTRIBUTE_RANGE: RangeInclusive<i32> = 1..=5;
pub const DEFAULT_ATTRIBUTE: i32 = 1;

pub const CORE_SKILL_CAP: i32 = 3;
pub const OTHER_SKILL_CAP: i32 = 1;
pub const SKILL_POINT_BUDGET: i32 = 10;

/// Luck points plus age is always this much.
pub const LUCK_BASE: i32 = 15;

pub const INVENTORY_SLOTS: usize = 3;

pub fn luck_points(age: i32) -> i64 {
    i64::from(LUCK_BASE) - i64::from(age)
}

/// Attribute points to distribute equal the age.
pub fn attribute_budget(age: i32) -> i64 {
    i64::from(age)
}

pub fn skill_cap(hero_class: HeroClass, skill: Skill) -> i32 {
    if hero_class.is_core_skill(skill) {
        CORE_SKILL_CAP
    } else {
        OTHER_SKILL_CAP
    }
}

pub fn skill_range(hero_class: HeroClass, skill: Skill) -> RangeInclusive<i32> {
    0..=skill_cap(hero_class, skill)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luck_points() {
        assert_eq!(luck_points(10), 5);
        assert_eq!(luck_points(12), 3);
        assert_eq!(luck_points(15), 0);
        assert_eq!(luck_points(i32::MIN), 15 + 2_147_483_648);
        assert_eq!(luck_points(i32::MAX), 15 - 2_147_483_647);
    }

    #[test]
    fn test_skill_cap_depends_on_class() {
        assert_eq!(skill_cap(HeroClass::Computernerd, Skill::Programmieren), 3);
        assert_eq!(skill_cap(HeroClass::Bauer, Skill::Programmieren), 1);
        assert_eq!(skill_range(HeroClass::Bauer, Skill::Tuefteln), 0..=3);
    }

    #[test]
    fn test_full_caps_exceed_budget() {
        // 3 core skills at 3 plus 9 others at 1 leaves room above the budget.
        let max: i32 = 3 * CORE_SKILL_CAP + 9 * OTHER_SKILL_CAP;
        assert!(max > SKILL_POINT_BUDGET);
    }
}
