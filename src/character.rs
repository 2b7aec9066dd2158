// Import necessary modules from external crates.
use crate::calc::{self, BaseSaves};
use crate::error::CharacterError;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

pub const MIN_ABILITY_SCORE: i32 = 1;

// Stable identifier of a stored character.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::From,
)]
#[serde(transparent)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    // Placeholder read for stored records that predate ids.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

// region:  --- Enumerations

/// The six ability scores.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    /// Parses a full name ("Strength") or an abbreviation ("str").
    pub fn parse(value: &str) -> Result<Self, CharacterError> {
        let value = value.trim();
        value
            .parse::<Ability>()
            .ok()
            .or_else(|| {
                Ability::iter().find(|ability| ability.abbreviation().eq_ignore_ascii_case(value))
            })
            .ok_or_else(|| CharacterError::UnknownAbility(value.to_string()))
    }
}

/// The nine size categories, smallest first.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Size {
    Fine,
    Diminutive,
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gargantuan,
    Colossal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SaveKind {
    Fortitude,
    Reflex,
    Will,
}

impl SaveKind {
    // Ability whose modifier is added to the save.
    pub fn key_ability(&self) -> Ability {
        match self {
            SaveKind::Fortitude => Ability::Constitution,
            SaveKind::Reflex => Ability::Dexterity,
            SaveKind::Will => Ability::Wisdom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SpeedKind {
    Land,
    Burrow,
    Climb,
    Fly,
    Swim,
}

// endregion:  --- Enumerations

// region:  --- Records

/// Ability scores keyed by ability name. Missing keys read as 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::uniform(10)
    }
}

impl AbilityScores {
    pub fn uniform(score: i32) -> Self {
        AbilityScores {
            strength: score,
            dexterity: score,
            constitution: score,
            intelligence: score,
            wisdom: score,
            charisma: score,
        }
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        let slot = match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        };
        *slot = score;
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        calc::ability_modifier(self.get(ability))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ability, i32)> + '_ {
        Ability::iter().map(|ability| (ability, self.get(ability)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub name: String,
    pub level: u32,
}

impl CharacterClass {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        CharacterClass {
            name: name.into(),
            level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,
    pub name: String,
    pub key_ability: Ability,
    pub ranks: f64, // Cross-class ranks come in half points.
    pub misc: i32,
    pub class_skill: bool,
    pub definition_id: Option<Uuid>, // Set when the skill comes from a custom definition.
}

impl Default for Skill {
    fn default() -> Self {
        Skill {
            id: Uuid::new_v4(),
            name: String::new(),
            key_ability: Ability::Intelligence,
            ranks: 0.0,
            misc: 0,
            class_skill: false,
            definition_id: None,
        }
    }
}

impl Skill {
    pub fn new(name: impl Into<String>, key_ability: Ability, class_skill: bool) -> Self {
        Skill {
            name: name.into(),
            key_ability,
            class_skill,
            ..Default::default()
        }
    }

    pub fn with_ranks(mut self, ranks: f64) -> Self {
        self.ranks = ranks;
        self
    }

    pub fn max_ranks(&self, character_level: u32, int_modifier: i32) -> f64 {
        calc::max_ranks(character_level, self.class_skill, int_modifier)
    }
}

// A feat held by a character, optionally backed by a custom definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterFeat {
    pub definition_id: Option<Uuid>,
    pub name: String,
    pub notes: String,
}

/// Base, misc and temporary components of a single save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingThrow {
    pub base: i32,
    pub misc: i32,
    pub temporary: i32,
}

impl SavingThrow {
    pub fn total(&self, ability_modifier: i32) -> i32 {
        calc::save_total(self.base, ability_modifier, self.misc, self.temporary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingThrows {
    pub fortitude: SavingThrow,
    pub reflex: SavingThrow,
    pub will: SavingThrow,
}

impl SavingThrows {
    pub fn get(&self, kind: SaveKind) -> &SavingThrow {
        match kind {
            SaveKind::Fortitude => &self.fortitude,
            SaveKind::Reflex => &self.reflex,
            SaveKind::Will => &self.will,
        }
    }

    pub fn get_mut(&mut self, kind: SaveKind) -> &mut SavingThrow {
        match kind {
            SaveKind::Fortitude => &mut self.fortitude,
            SaveKind::Reflex => &mut self.reflex,
            SaveKind::Will => &mut self.will,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedDetails {
    pub base: i32, // In feet.
    pub misc: i32,
    pub temporary: i32,
}

impl SpeedDetails {
    pub fn new(base: i32) -> Self {
        SpeedDetails {
            base,
            ..Default::default()
        }
    }

    pub fn total(&self) -> i32 {
        calc::speed_total(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Speeds {
    pub land: SpeedDetails,
    pub burrow: SpeedDetails,
    pub climb: SpeedDetails,
    pub fly: SpeedDetails,
    pub swim: SpeedDetails,
}

impl Default for Speeds {
    fn default() -> Self {
        Speeds {
            land: SpeedDetails::new(30),
            burrow: SpeedDetails::default(),
            climb: SpeedDetails::default(),
            fly: SpeedDetails::default(),
            swim: SpeedDetails::default(),
        }
    }
}

impl Speeds {
    pub fn get(&self, kind: SpeedKind) -> &SpeedDetails {
        match kind {
            SpeedKind::Land => &self.land,
            SpeedKind::Burrow => &self.burrow,
            SpeedKind::Climb => &self.climb,
            SpeedKind::Fly => &self.fly,
            SpeedKind::Swim => &self.swim,
        }
    }

    pub fn get_mut(&mut self, kind: SpeedKind) -> &mut SpeedDetails {
        match kind {
            SpeedKind::Land => &mut self.land,
            SpeedKind::Burrow => &mut self.burrow,
            SpeedKind::Climb => &mut self.climb,
            SpeedKind::Fly => &mut self.fly,
            SpeedKind::Swim => &mut self.swim,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum HealthStatus {
    Healthy,
    Staggered,
    Unconscious,
    Disabled,
    Dying,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Health {
    pub max: i32,
    pub current: i32,
    pub temporary: i32,
    pub nonlethal: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Health {
            max,
            current: max,
            ..Default::default()
        }
    }

    // Hit points available before lethal damage reaches current.
    pub fn effective(&self) -> i32 {
        self.current + self.temporary
    }

    pub fn status(&self) -> HealthStatus {
        match self.current {
            c if c <= -10 => HealthStatus::Dead,
            c if c < 0 => HealthStatus::Dying,
            0 => HealthStatus::Disabled,
            c if self.nonlethal > c => HealthStatus::Unconscious,
            c if self.nonlethal == c => HealthStatus::Staggered,
            _ => HealthStatus::Healthy,
        }
    }
}

// Per-character adjustments feeding armor class, initiative and grapple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatModifiers {
    pub armor: i32,
    pub shield: i32,
    pub natural: i32,
    pub deflection: i32,
    pub dodge: i32,
    pub ac_misc: i32,
    pub initiative_misc: i32,
    pub grapple_misc: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Story {
    pub backstory: String,
    pub appearance: String,
    pub personality: String,
    pub portrait: Option<String>, // URL or data URI of the portrait image.
}

// endregion:  --- Records

// Define a structure representing a complete character sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    #[serde(default = "CharacterId::nil")]
    pub id: CharacterId,

    // Personal Information
    pub name: String,
    pub player: String,
    pub race: String,
    pub alignment: String,
    pub deity: String,
    pub gender: String,
    pub size: Size,

    // Progression
    pub classes: Vec<CharacterClass>,
    pub experience: u64,

    // Attributes and overrides
    pub abilities: AbilityScores,
    pub combat: CombatModifiers,

    pub skills: Vec<Skill>,
    pub feats: Vec<CharacterFeat>,
    pub saving_throws: SavingThrows,
    pub speeds: Speeds,
    pub health: Health,
    pub languages: Vec<String>,
    pub story: Story,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Character {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Gives fresh ids to the character and its skills where the stored
    /// record had none. Returns whether anything changed.
    pub fn assign_missing_ids(&mut self) -> bool {
        let mut changed = false;
        if self.id.is_nil() {
            self.id = CharacterId::new();
            changed = true;
        }
        for skill in self.skills.iter_mut().filter(|skill| skill.id.is_nil()) {
            skill.id = Uuid::new_v4();
            changed = true;
        }
        changed
    }

    /// Sum of all class levels.
    pub fn total_level(&self) -> u32 {
        self.classes.iter().map(|class| class.level).sum()
    }

    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        self.abilities.modifier(ability)
    }

    pub fn set_ability_score(&mut self, ability: Ability, score: i32) -> Result<(), CharacterError> {
        if score < MIN_ABILITY_SCORE {
            return Err(CharacterError::InvalidScore { ability, score });
        }
        self.abilities.set(ability, score);
        Ok(())
    }

    // Adds levels to an existing class entry, or appends a new entry.
    pub fn add_class_levels(&mut self, name: &str, levels: u32) {
        match self
            .classes
            .iter_mut()
            .find(|class| class.name.eq_ignore_ascii_case(name.trim()))
        {
            Some(class) => class.level += levels,
            None => self.classes.push(CharacterClass::new(name.trim(), levels)),
        }
    }

    pub fn base_saves(&self) -> BaseSaves {
        calc::base_saving_throws(&self.classes)
    }

    /// Copies the class-derived base saves into the saving throw records.
    pub fn update_derived_attributes(&mut self) {
        let base = self.base_saves();
        self.saving_throws.fortitude.base = base.fortitude;
        self.saving_throws.reflex.base = base.reflex;
        self.saving_throws.will.base = base.will;
    }

    pub fn skill(&self, id: Uuid) -> Option<&Skill> {
        self.skills.iter().find(|skill| skill.id == id)
    }

    pub fn skill_mut(&mut self, id: Uuid) -> Option<&mut Skill> {
        self.skills.iter_mut().find(|skill| skill.id == id)
    }

    pub fn skill_by_name(&self, name: &str) -> Option<&Skill> {
        self.skills
            .iter()
            .find(|skill| skill.name.eq_ignore_ascii_case(name))
    }

    // First skill whose ranks exceed the cap for the current level.
    pub fn validate_skill_ranks(&self) -> Result<(), CharacterError> {
        let level = self.total_level();
        let int_modifier = self.ability_modifier(Ability::Intelligence);
        for skill in &self.skills {
            let max = skill.max_ranks(level, int_modifier);
            if skill.ranks > max {
                return Err(CharacterError::RanksExceeded {
                    skill: skill.name.clone(),
                    ranks: skill.ranks,
                    max,
                });
            }
        }
        Ok(())
    }

    pub fn has_feat(&self, definition_id: Uuid) -> bool {
        self.feats
            .iter()
            .any(|feat| feat.definition_id == Some(definition_id))
    }
}

/// Step-by-step construction of a [`Character`].
#[derive(Debug, Clone)]
pub struct CharacterBuilder {
    character: Character,
}

impl CharacterBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        CharacterBuilder {
            character: Character::new(name),
        }
    }

    pub fn id(mut self, id: CharacterId) -> Self {
        self.character.id = id;
        self
    }

    pub fn race(mut self, race: impl Into<String>) -> Self {
        self.character.race = race.into();
        self
    }

    pub fn alignment(mut self, alignment: impl Into<String>) -> Self {
        self.character.alignment = alignment.into();
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.character.size = size;
        self
    }

    pub fn class(mut self, name: &str, level: u32) -> Self {
        self.character.add_class_levels(name, level);
        self
    }

    pub fn ability(mut self, ability: Ability, score: i32) -> Self {
        self.character.abilities.set(ability, score);
        self
    }

    pub fn abilities(mut self, abilities: AbilityScores) -> Self {
        self.character.abilities = abilities;
        self
    }

    pub fn skill(mut self, skill: Skill) -> Self {
        self.character.skills.push(skill);
        self
    }

    pub fn feat(mut self, feat: CharacterFeat) -> Self {
        self.character.feats.push(feat);
        self
    }

    pub fn combat(mut self, combat: CombatModifiers) -> Self {
        self.character.combat = combat;
        self
    }

    pub fn health(mut self, max: i32) -> Self {
        self.character.health = Health::new(max);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.character.languages.push(language.into());
        self
    }

    pub fn experience(mut self, experience: u64) -> Self {
        self.character.experience = experience;
        self
    }

    pub fn build(mut self) -> Character {
        self.character.update_derived_attributes();
        self.character
    }
}
