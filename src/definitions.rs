use crate::calc::{DEFAULT_EPIC_XP_INCREMENT, DEFAULT_XP_TABLE};
use crate::character::Ability;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A looked-up value together with whether a real definition backed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub found: bool,
}

impl<T> Resolved<T> {
    pub fn found(value: T) -> Self {
        Resolved { value, found: true }
    }

    pub fn fallback(value: T) -> Self {
        Resolved {
            value,
            found: false,
        }
    }
}

// Bonus granted to `target` once the source has `min_ranks` ranks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynergyRule {
    pub target: String,
    pub min_ranks: f64,
    pub bonus: i32,
}

impl Default for SynergyRule {
    fn default() -> Self {
        SynergyRule {
            target: String::new(),
            min_ranks: 5.0,
            bonus: 2,
        }
    }
}

impl SynergyRule {
    pub fn new(target: impl Into<String>) -> Self {
        SynergyRule {
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn applies_to(&self, skill_name: &str) -> bool {
        self.target.trim().eq_ignore_ascii_case(skill_name.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomSkillDefinition {
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,
    pub name: String,
    pub key_ability: Ability,
    pub trained_only: bool,
    pub description: String,
    pub synergies: Vec<SynergyRule>,
}

impl Default for CustomSkillDefinition {
    fn default() -> Self {
        CustomSkillDefinition {
            id: Uuid::new_v4(),
            name: String::new(),
            key_ability: Ability::Intelligence,
            trained_only: false,
            description: String::new(),
            synergies: Vec::new(),
        }
    }
}

impl CustomSkillDefinition {
    pub fn new(name: impl Into<String>, key_ability: Ability) -> Self {
        CustomSkillDefinition {
            name: name.into(),
            key_ability,
            ..Default::default()
        }
    }
}

// Feat synergies apply whenever the feat is held; `min_ranks` is not consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatDefinition {
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub prerequisites: String,
    pub key_ability: Option<Ability>,
    pub synergies: Vec<SynergyRule>,
}

impl Default for FeatDefinition {
    fn default() -> Self {
        FeatDefinition {
            id: Uuid::new_v4(),
            name: String::new(),
            description: String::new(),
            prerequisites: String::new(),
            key_ability: None,
            synergies: Vec::new(),
        }
    }
}

impl FeatDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        FeatDefinition {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Ruleset toggles shared by every character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSettings {
    pub reroll_ones: bool, // Reroll ones when rolling ability scores.
    pub point_buy_budget: u32,
    pub epic_xp_increment: u64,
    pub xp_table: Vec<u64>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettings {
            reroll_ones: false,
            point_buy_budget: 25,
            epic_xp_increment: DEFAULT_EPIC_XP_INCREMENT,
            xp_table: DEFAULT_XP_TABLE.to_vec(),
        }
    }
}

/// Everything persisted under the definitions key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Definitions {
    pub custom_skills: Vec<CustomSkillDefinition>,
    pub custom_feats: Vec<FeatDefinition>,
    pub settings: GlobalSettings,
}

impl Definitions {
    /// Gives fresh ids to templates stored without one. Returns how many
    /// were assigned.
    pub fn assign_missing_ids(&mut self) -> usize {
        let skills = self.custom_skills.iter_mut().map(|skill| &mut skill.id);
        let feats = self.custom_feats.iter_mut().map(|feat| &mut feat.id);
        let mut assigned = 0;
        for id in skills.chain(feats).filter(|id| id.is_nil()) {
            *id = Uuid::new_v4();
            assigned += 1;
        }
        assigned
    }

    pub fn skill(&self, id: Uuid) -> Option<&CustomSkillDefinition> {
        self.custom_skills.iter().find(|skill| skill.id == id)
    }

    pub fn feat(&self, id: Uuid) -> Option<&FeatDefinition> {
        self.custom_feats.iter().find(|feat| feat.id == id)
    }

    /// Display name of a custom skill, or a synthesized label for a dangling id.
    pub fn skill_name(&self, id: Uuid) -> Resolved<String> {
        match self.skill(id) {
            Some(skill) => Resolved::found(skill.name.clone()),
            None => Resolved::fallback(format!("Unknown skill ({})", short_id(id))),
        }
    }

    pub fn feat_name(&self, id: Uuid) -> Resolved<String> {
        match self.feat(id) {
            Some(feat) => Resolved::found(feat.name.clone()),
            None => Resolved::fallback(format!("Unknown feat ({})", short_id(id))),
        }
    }

    // Falls back to Intelligence, the key ability of untyped knowledge skills.
    pub fn skill_key_ability(&self, id: Uuid) -> Resolved<Ability> {
        match self.skill(id) {
            Some(skill) => Resolved::found(skill.key_ability),
            None => Resolved::fallback(Ability::Intelligence),
        }
    }
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string().chars().take(8).collect()
}
