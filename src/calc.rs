//! Derived statistics for the d20 ruleset.
//!
//! Every function here is pure and total over its inputs. Range checks on
//! raw values happen where the values are edited, not here.

use crate::character::{Ability, AbilityScores, Character, CharacterClass, Size, Skill, SpeedDetails};
use crate::classes::{self, ClassProgression};
use crate::definitions::Definitions;
use serde::{Deserialize, Serialize};

/// Experience needed to reach levels 1 through 20: `500 * n * (n - 1)`.
pub const DEFAULT_XP_TABLE: [u64; 20] = [
    0, 1_000, 3_000, 6_000, 10_000, 15_000, 21_000, 28_000, 36_000, 45_000, 55_000, 66_000,
    78_000, 91_000, 105_000, 120_000, 136_000, 153_000, 171_000, 190_000,
];

/// Experience per level past the end of the table.
pub const DEFAULT_EPIC_XP_INCREMENT: u64 = 20_000;

pub const ITERATIVE_ATTACK_STEP: i32 = 5;

/// `floor((score - 10) / 2)`.
pub fn ability_modifier(score: i32) -> i32 {
    score.div_euclid(2) - 5
}

// region:  --- Attack and saves

/// Class entries merged by name, ignoring case and surrounding whitespace,
/// each paired with its progression and combined level.
fn merged_classes(classes: &[CharacterClass]) -> Vec<(ClassProgression, u32)> {
    let mut merged: Vec<(String, u32)> = Vec::new();
    for class in classes {
        let name = class.name.trim().to_ascii_lowercase();
        match merged.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, level)) => *level = level.saturating_add(class.level),
            None => merged.push((name, class.level)),
        }
    }
    merged
        .into_iter()
        .map(|(name, level)| (classes::lookup(&name).value, level))
        .collect()
}

/// Sum over classes of each class's base attack bonus.
pub fn base_attack_bonus(classes: &[CharacterClass]) -> i32 {
    merged_classes(classes)
        .into_iter()
        .fold(0, |bab, (progression, level)| {
            bab.saturating_add(progression.bab.value(level))
        })
}

/// Base attack bonus followed by its iterative attacks, each 5 lower, while
/// they stay positive. A character without levels gets `[0]`.
pub fn base_attack_progression(classes: &[CharacterClass]) -> Vec<i32> {
    let bab = base_attack_bonus(classes);
    if bab <= 0 {
        return vec![0];
    }

    let mut attacks = vec![bab];
    let mut next = bab - ITERATIVE_ATTACK_STEP;
    while next > 0 {
        attacks.push(next);
        next -= ITERATIVE_ATTACK_STEP;
    }
    attacks
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaseSaves {
    pub fortitude: i32,
    pub reflex: i32,
    pub will: i32,
}

pub fn base_saving_throws(classes: &[CharacterClass]) -> BaseSaves {
    merged_classes(classes)
        .into_iter()
        .fold(BaseSaves::default(), |mut saves, (progression, level)| {
            saves.fortitude = saves.fortitude.saturating_add(progression.fortitude.value(level));
            saves.reflex = saves.reflex.saturating_add(progression.reflex.value(level));
            saves.will = saves.will.saturating_add(progression.will.value(level));
            saves
        })
}

pub fn save_total(base: i32, ability_modifier: i32, misc: i32, temporary: i32) -> i32 {
    base + ability_modifier + misc + temporary
}

// endregion:  --- Attack and saves

// region:  --- Defense and combat

/// Inputs to armor class. All components are summed on top of 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArmorClassParts {
    pub dex_modifier: i32,
    pub armor: i32,
    pub shield: i32,
    pub size_modifier: i32,
    pub natural: i32,
    pub deflection: i32,
    pub dodge: i32,
    pub misc: i32,
}

impl ArmorClassParts {
    pub fn for_character(character: &Character) -> Self {
        let combat = &character.combat;
        ArmorClassParts {
            dex_modifier: character.abilities.modifier(Ability::Dexterity),
            armor: combat.armor,
            shield: combat.shield,
            size_modifier: size_modifier_for_ac(character.size),
            natural: combat.natural,
            deflection: combat.deflection,
            dodge: combat.dodge,
            misc: combat.ac_misc,
        }
    }
}

pub fn armor_class(parts: &ArmorClassParts) -> i32 {
    10 + parts.armor
        + parts.shield
        + parts.dex_modifier
        + parts.size_modifier
        + parts.natural
        + parts.deflection
        + parts.dodge
        + parts.misc
}

// Armor, shield and natural armor do not count against touch attacks.
pub fn touch_armor_class(parts: &ArmorClassParts) -> i32 {
    10 + parts.dex_modifier + parts.size_modifier + parts.deflection + parts.dodge + parts.misc
}

// A flat-footed defender loses a positive dex bonus and all dodge bonuses.
pub fn flat_footed_armor_class(parts: &ArmorClassParts) -> i32 {
    armor_class(&ArmorClassParts {
        dex_modifier: parts.dex_modifier.min(0),
        dodge: 0,
        ..*parts
    })
}

pub fn initiative(dex_modifier: i32, misc: i32) -> i32 {
    dex_modifier + misc
}

/// Grapple uses only the first entry of the attack progression.
pub fn grapple(bab: &[i32], str_modifier: i32, size_modifier_grapple: i32) -> i32 {
    bab.first().copied().unwrap_or(0) + str_modifier + size_modifier_grapple
}

pub fn size_modifier_for_ac(size: Size) -> i32 {
    match size {
        Size::Fine => 8,
        Size::Diminutive => 4,
        Size::Tiny => 2,
        Size::Small => 1,
        Size::Medium => 0,
        Size::Large => -1,
        Size::Huge => -2,
        Size::Gargantuan => -4,
        Size::Colossal => -8,
    }
}

pub fn size_modifier_for_grapple(size: Size) -> i32 {
    match size {
        Size::Fine => -16,
        Size::Diminutive => -12,
        Size::Tiny => -8,
        Size::Small => -4,
        Size::Medium => 0,
        Size::Large => 4,
        Size::Huge => 8,
        Size::Gargantuan => 12,
        Size::Colossal => 16,
    }
}

pub fn speed_total(details: &SpeedDetails) -> i32 {
    (details.base + details.misc + details.temporary).max(0)
}

// endregion:  --- Defense and combat

// region:  --- Skills

/// Ranks plus key ability modifier plus misc. Ranks may be fractional.
pub fn skill_total(skill: &Skill, abilities: &AbilityScores) -> f64 {
    skill.ranks + f64::from(abilities.modifier(skill.key_ability)) + f64::from(skill.misc)
}

/// Class skills cap at `level + 3`, cross-class skills at half that.
///
/// The intelligence modifier does not move the cap; it is accepted so the
/// call site reads the same as the other per-skill computations.
pub fn max_ranks(level: u32, is_class_skill: bool, _int_modifier: i32) -> f64 {
    let cap = f64::from(level) + 3.0;
    if is_class_skill { cap } else { cap / 2.0 }
}

/// Skill points gained for one level in a class, never fewer than one.
/// The first character level grants four times the amount.
pub fn skill_points_at_level(
    progression: &ClassProgression,
    int_modifier: i32,
    first_character_level: bool,
) -> u32 {
    let points = (progression.skill_points as i32 + int_modifier).max(1) as u32;
    if first_character_level { points.saturating_mul(4) } else { points }
}

/// Total skill points over all class levels, in class list order.
pub fn skill_points_available(classes: &[CharacterClass], int_modifier: i32) -> u32 {
    let mut first = true;
    let mut total: u32 = 0;
    for class in classes {
        let progression = classes::lookup(&class.name).value;
        for _ in 0..class.level {
            total = total.saturating_add(skill_points_at_level(&progression, int_modifier, first));
            first = false;
        }
    }
    total
}

/// Bonus a skill receives from custom skill definitions and feats.
///
/// A custom skill's rule applies once the character has at least
/// `min_ranks` ranks in the source skill. A feat's rule applies whenever
/// the character holds the feat.
pub fn synergy_bonus(skill: &Skill, character: &Character, definitions: &Definitions) -> i32 {
    let from_skills: i32 = character
        .skills
        .iter()
        .filter(|source| source.id != skill.id)
        .filter_map(|source| {
            let definition = definitions.skill(source.definition_id?)?;
            Some((source, definition))
        })
        .flat_map(|(source, definition)| {
            definition
                .synergies
                .iter()
                .filter(move |rule| source.ranks >= rule.min_ranks)
        })
        .filter(|rule| rule.applies_to(&skill.name))
        .map(|rule| rule.bonus)
        .sum();

    let from_feats: i32 = character
        .feats
        .iter()
        .filter_map(|feat| definitions.feat(feat.definition_id?))
        .flat_map(|definition| definition.synergies.iter())
        .filter(|rule| rule.applies_to(&skill.name))
        .map(|rule| rule.bonus)
        .sum();

    from_skills + from_feats
}

// endregion:  --- Skills

// region:  --- Experience

/// Experience needed to reach `level`. Levels past the end of the table grow
/// by `epic_increment` each.
pub fn xp_required_for_level(level: u32, table: &[u64], epic_increment: u64) -> u64 {
    if level <= 1 {
        return table.first().copied().unwrap_or(0);
    }
    let bound = table.len() as u32;
    if level <= bound {
        return table[(level - 1) as usize];
    }
    let last = table.last().copied().unwrap_or(0);
    let beyond = u64::from(level - bound.max(1));
    last.saturating_add(beyond.saturating_mul(epic_increment))
}

/// Highest level whose requirement does not exceed `xp`.
pub fn level_for_xp(xp: u64, table: &[u64], epic_increment: u64) -> u32 {
    let within = table.iter().take_while(|required| **required <= xp).count() as u32;
    let level = within.max(1);
    if within < table.len() as u32 || epic_increment == 0 {
        return level;
    }
    let last = table.last().copied().unwrap_or(0);
    let epic_levels = u32::try_from((xp - last) / epic_increment).unwrap_or(u32::MAX);
    level.saturating_add(epic_levels)
}

// endregion:  --- Experience

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterBuilder, CharacterFeat};
    use crate::definitions::{CustomSkillDefinition, FeatDefinition, SynergyRule};

    #[test]
    fn ability_modifier_floors_toward_negative() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(17), 3);
        assert_eq!(ability_modifier(7), -2);
        assert_eq!(ability_modifier(1), -5);
        for score in -20..40 {
            let expected = ((score - 10) as f64 / 2.0).floor() as i32;
            assert_eq!(ability_modifier(score), expected, "score {score}");
        }
        assert_eq!(ability_modifier(i32::MIN), i32::MIN / 2 - 5);
        assert_eq!(ability_modifier(i32::MAX), i32::MAX / 2 - 5);
    }

    #[test]
    fn attack_progression_scenarios() {
        assert_eq!(base_attack_progression(&[CharacterClass::new("Fighter", 5)]), vec![5]);
        assert_eq!(base_attack_progression(&[CharacterClass::new("Wizard", 10)]), vec![5]);
        assert_eq!(base_attack_progression(&[]), vec![0]);
        assert_eq!(
            base_attack_progression(&[CharacterClass::new("Fighter", 16)]),
            vec![16, 11, 6, 1]
        );
        assert_eq!(
            base_attack_progression(&[CharacterClass::new("Rogue", 8)]),
            vec![6, 1]
        );
    }

    #[test]
    fn multiclass_values_sum_per_class() {
        let classes = [CharacterClass::new("Fighter", 4), CharacterClass::new("Wizard", 3)];
        assert_eq!(base_attack_bonus(&classes), 5);
        let saves = base_saving_throws(&classes);
        assert_eq!(saves.fortitude, 4 + 1);
        assert_eq!(saves.reflex, 1 + 1);
        assert_eq!(saves.will, 1 + 3);
    }

    #[test]
    fn split_class_entries_progress_as_one_class() {
        let split = [CharacterClass::new("Fighter", 3), CharacterClass::new(" fighter ", 2)];
        let whole = [CharacterClass::new("Fighter", 5)];
        assert_eq!(base_saving_throws(&split), base_saving_throws(&whole));
        assert_eq!(base_saving_throws(&split).fortitude, 4);
        assert_eq!(base_attack_progression(&split), base_attack_progression(&whole));

        let rogue = [CharacterClass::new("Rogue", 1), CharacterClass::new("Rogue", 1)];
        assert_eq!(base_attack_bonus(&rogue), 1);
    }

    #[test]
    fn huge_levels_saturate() {
        let classes = [CharacterClass::new("Fighter", u32::MAX), CharacterClass::new("Barbarian", u32::MAX)];
        assert_eq!(base_attack_bonus(&classes), i32::MAX);
        assert_eq!(base_saving_throws(&classes).fortitude, i32::MAX);
        assert_eq!(max_ranks(u32::MAX, true, 0), f64::from(u32::MAX) + 3.0);
    }

    #[test]
    fn saves_follow_good_and_poor_progressions() {
        for level in 1..=30 {
            let saves = base_saving_throws(&[CharacterClass::new("Barbarian", level)]);
            assert_eq!(saves.fortitude, 2 + level as i32 / 2);
            assert_eq!(saves.reflex, level as i32 / 3);
            assert_eq!(saves.will, level as i32 / 3);
        }
    }

    #[test]
    fn unknown_classes_use_poor_saves() {
        let saves = base_saving_throws(&[CharacterClass::new("Warlock", 6)]);
        assert_eq!(saves, BaseSaves { fortitude: 2, reflex: 2, will: 2 });
    }

    #[test]
    fn armor_class_is_a_plain_sum() {
        let parts = ArmorClassParts {
            dex_modifier: 2,
            armor: 5,
            shield: 1,
            size_modifier: 1,
            natural: 2,
            deflection: 1,
            dodge: 1,
            misc: -1,
        };
        assert_eq!(armor_class(&parts), 22);
        let permuted = ArmorClassParts {
            dex_modifier: parts.natural,
            natural: parts.dex_modifier,
            armor: parts.dodge,
            dodge: parts.armor,
            ..parts
        };
        assert_eq!(armor_class(&permuted), armor_class(&parts));
        assert_eq!(touch_armor_class(&parts), 14);
        assert_eq!(flat_footed_armor_class(&parts), 19);
    }

    #[test]
    fn flat_footed_keeps_dex_penalty() {
        let parts = ArmorClassParts {
            dex_modifier: -1,
            dodge: 1,
            ..Default::default()
        };
        assert_eq!(flat_footed_armor_class(&parts), 9);
    }

    #[test]
    fn grapple_uses_first_attack_only() {
        assert_eq!(grapple(&[11, 6, 1], 3, size_modifier_for_grapple(Size::Large)), 18);
        assert_eq!(grapple(&[], 1, 0), 1);
        assert_eq!(initiative(3, 4), 7);
    }

    #[test]
    fn size_tables_mirror_each_other() {
        use strum::IntoEnumIterator;
        for size in Size::iter() {
            let ac = size_modifier_for_ac(size);
            let grapple = size_modifier_for_grapple(size);
            assert!((ac == 0 && grapple == 0) || ac.signum() == -grapple.signum());
        }
        assert_eq!(size_modifier_for_ac(Size::Fine), -size_modifier_for_ac(Size::Colossal));
    }

    #[test]
    fn skill_totals_keep_half_ranks() {
        let abilities = AbilityScores {
            dexterity: 14,
            ..Default::default()
        };
        let skill = Skill {
            misc: 1,
            ..Skill::new("Tumble", Ability::Dexterity, false).with_ranks(2.5)
        };
        assert_eq!(skill_total(&skill, &abilities), 5.5);
    }

    #[test]
    fn max_ranks_by_skill_kind() {
        for level in 0..40 {
            assert_eq!(max_ranks(level, true, 0), f64::from(level + 3));
            assert_eq!(max_ranks(level, false, 4), f64::from(level + 3) / 2.0);
        }
        assert_eq!(max_ranks(2, false, 0), 2.5);
    }

    #[test]
    fn skill_points_multiply_at_first_level() {
        let rogue = classes::lookup("Rogue").value;
        assert_eq!(skill_points_at_level(&rogue, 1, true), 36);
        assert_eq!(skill_points_at_level(&rogue, 1, false), 9);
        let wizard = classes::lookup("Wizard").value;
        assert_eq!(skill_points_at_level(&wizard, -3, false), 1);

        let classes = [CharacterClass::new("Fighter", 2), CharacterClass::new("Rogue", 1)];
        assert_eq!(skill_points_available(&classes, 0), 8 + 2 + 8);
    }

    #[test]
    fn experience_table_and_epic_levels() {
        assert_eq!(xp_required_for_level(1, &DEFAULT_XP_TABLE, 20_000), 0);
        assert_eq!(xp_required_for_level(5, &DEFAULT_XP_TABLE, 20_000), 10_000);
        assert_eq!(xp_required_for_level(20, &DEFAULT_XP_TABLE, 20_000), 190_000);
        assert_eq!(xp_required_for_level(21, &DEFAULT_XP_TABLE, 20_000), 210_000);
        assert_eq!(xp_required_for_level(23, &DEFAULT_XP_TABLE, 20_000), 250_000);
    }

    #[test]
    fn level_for_xp_inverts_the_table() {
        assert_eq!(level_for_xp(0, &DEFAULT_XP_TABLE, 20_000), 1);
        assert_eq!(level_for_xp(999, &DEFAULT_XP_TABLE, 20_000), 1);
        assert_eq!(level_for_xp(1_000, &DEFAULT_XP_TABLE, 20_000), 2);
        assert_eq!(level_for_xp(189_999, &DEFAULT_XP_TABLE, 20_000), 19);
        assert_eq!(level_for_xp(230_000, &DEFAULT_XP_TABLE, 20_000), 22);
        assert_eq!(level_for_xp(10_000_000, &DEFAULT_XP_TABLE, 0), 20);
        for level in 1..=30 {
            let xp = xp_required_for_level(level, &DEFAULT_XP_TABLE, 20_000);
            assert_eq!(level_for_xp(xp, &DEFAULT_XP_TABLE, 20_000), level);
        }
    }

    #[test]
    fn experience_saturates_with_large_increments() {
        assert_eq!(xp_required_for_level(u32::MAX, &DEFAULT_XP_TABLE, u64::MAX), u64::MAX);
        assert_eq!(level_for_xp(u64::MAX, &DEFAULT_XP_TABLE, 1), u32::MAX);
        assert_eq!(level_for_xp(u64::MAX, &DEFAULT_XP_TABLE, u64::MAX), 20);
    }

    #[test]
    fn synergies_need_ranks_in_the_source_skill() {
        let mut definitions = Definitions::default();
        let mut lore = CustomSkillDefinition::new("Courtly Lore", Ability::Intelligence);
        lore.synergies.push(SynergyRule::new("Diplomacy"));
        let lore_id = lore.id;
        definitions.custom_skills.push(lore);

        let mut silver_tongue = FeatDefinition::new("Silver Tongue");
        silver_tongue.synergies.push(SynergyRule {
            bonus: 1,
            ..SynergyRule::new("diplomacy")
        });
        let feat_id = silver_tongue.id;
        definitions.custom_feats.push(silver_tongue);

        let diplomacy = Skill::new("Diplomacy", Ability::Charisma, true);
        let mut courtly = Skill::new("Courtly Lore", Ability::Intelligence, true).with_ranks(4.0);
        courtly.definition_id = Some(lore_id);

        let mut character = CharacterBuilder::new("Envoy")
            .class("Bard", 4)
            .skill(diplomacy.clone())
            .skill(courtly)
            .feat(CharacterFeat {
                definition_id: Some(feat_id),
                name: "Silver Tongue".to_string(),
                notes: String::new(),
            })
            .build();
        assert_eq!(synergy_bonus(&diplomacy, &character, &definitions), 1);

        character.skills[1].ranks = 5.0;
        assert_eq!(synergy_bonus(&diplomacy, &character, &definitions), 3);
    }
}
