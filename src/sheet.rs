// /sheet.rs
use crate::calc::{self, ArmorClassParts};
use crate::character::{Ability, Character, SaveKind, SpeedKind};
use crate::classes;
use crate::definitions::Definitions;
use serde::Serialize;
use strum::IntoEnumIterator;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AbilityLine {
    pub ability: Ability,
    pub score: i32,
    pub modifier: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveLine {
    pub kind: SaveKind,
    pub base: i32,
    pub ability_modifier: i32,
    pub misc: i32,
    pub temporary: i32,
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillLine {
    pub skill_id: Uuid,
    pub name: String,
    pub ranks: f64,
    pub ability_modifier: i32,
    pub synergy: i32,
    pub total: f64,
    pub max_ranks: f64,
    pub over_cap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpeedLine {
    pub kind: SpeedKind,
    pub total: i32,
}

/// Every display value of a character sheet, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedStats {
    pub level: u32,
    pub abilities: Vec<AbilityLine>,
    pub base_attack: Vec<i32>,
    pub saves: Vec<SaveLine>,
    pub armor_class: i32,
    pub touch_armor_class: i32,
    pub flat_footed_armor_class: i32,
    pub initiative: i32,
    pub grapple: i32,
    pub skills: Vec<SkillLine>,
    pub skill_points: u32,
    pub speeds: Vec<SpeedLine>,
    pub xp_for_next_level: u64,
    pub unknown_classes: Vec<String>, // Classes that fell back to the default progression.
}

impl DerivedStats {
    pub fn compute(character: &Character, definitions: &Definitions) -> Self {
        let abilities = &character.abilities;
        let level = character.total_level();
        let settings = &definitions.settings;

        let base_attack = calc::base_attack_progression(&character.classes);

        // Class base saves are recomputed so a stale record never shows.
        let base_saves = calc::base_saving_throws(&character.classes);
        let saves = SaveKind::iter()
            .map(|kind| {
                let record = character.saving_throws.get(kind);
                let base = match kind {
                    SaveKind::Fortitude => base_saves.fortitude,
                    SaveKind::Reflex => base_saves.reflex,
                    SaveKind::Will => base_saves.will,
                };
                let ability_modifier = abilities.modifier(kind.key_ability());
                SaveLine {
                    kind,
                    base,
                    ability_modifier,
                    misc: record.misc,
                    temporary: record.temporary,
                    total: calc::save_total(base, ability_modifier, record.misc, record.temporary),
                }
            })
            .collect();

        let ac = ArmorClassParts::for_character(character);
        let int_modifier = abilities.modifier(Ability::Intelligence);

        let skills = character
            .skills
            .iter()
            .map(|skill| {
                let synergy = calc::synergy_bonus(skill, character, definitions);
                let max_ranks = calc::max_ranks(level, skill.class_skill, int_modifier);
                SkillLine {
                    skill_id: skill.id,
                    name: skill.name.clone(),
                    ranks: skill.ranks,
                    ability_modifier: abilities.modifier(skill.key_ability),
                    synergy,
                    total: calc::skill_total(skill, abilities) + f64::from(synergy),
                    max_ranks,
                    over_cap: skill.ranks > max_ranks,
                }
            })
            .collect();

        DerivedStats {
            level,
            abilities: abilities
                .iter()
                .map(|(ability, score)| AbilityLine {
                    ability,
                    score,
                    modifier: calc::ability_modifier(score),
                })
                .collect(),
            grapple: calc::grapple(
                &base_attack,
                abilities.modifier(Ability::Strength),
                calc::size_modifier_for_grapple(character.size),
            ) + character.combat.grapple_misc,
            base_attack,
            saves,
            armor_class: calc::armor_class(&ac),
            touch_armor_class: calc::touch_armor_class(&ac),
            flat_footed_armor_class: calc::flat_footed_armor_class(&ac),
            initiative: calc::initiative(ac.dex_modifier, character.combat.initiative_misc),
            skills,
            skill_points: calc::skill_points_available(&character.classes, int_modifier),
            speeds: SpeedKind::iter()
                .map(|kind| SpeedLine {
                    kind,
                    total: character.speeds.get(kind).total(),
                })
                .collect(),
            xp_for_next_level: calc::xp_required_for_level(
                level.max(1) + 1,
                &settings.xp_table,
                settings.epic_xp_increment,
            ),
            unknown_classes: character
                .classes
                .iter()
                .filter(|class| !classes::lookup(&class.name).found)
                .map(|class| class.name.clone())
                .collect(),
        }
    }

    pub fn save(&self, kind: SaveKind) -> Option<&SaveLine> {
        self.saves.iter().find(|line| line.kind == kind)
    }

    pub fn skill(&self, name: &str) -> Option<&SkillLine> {
        self.skills
            .iter()
            .find(|line| line.name.eq_ignore_ascii_case(name))
    }
}
