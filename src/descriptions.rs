use crate::character::{Ability, SaveKind};

// region:  --- Abilities

pub const STRENGTH: &str = r#"
Muscle and physical power. Adds to melee attack and damage rolls, grapple checks, and Climb, Jump and Swim checks. Fighters, barbarians and paladins rely on it.
"#;

pub const DEXTERITY: &str = r#"
Agility, reflexes and balance. Adds to ranged attack rolls, Armor Class, initiative and Reflex saves, and to skills like Hide, Move Silently and Tumble. Essential for rogues.
"#;

pub const CONSTITUTION: &str = r#"
Health and stamina. Adds to hit points at every level and to Fortitude saves. Every character benefits from a high score.
"#;

pub const INTELLIGENCE: &str = r#"
How well a character learns and reasons. Sets the number of skill points gained each level and powers wizard spellcasting and knowledge skills.
"#;

pub const WISDOM: &str = r#"
Willpower, common sense and perception. Adds to Will saves and to Listen, Spot and Sense Motive. Clerics, druids and rangers cast spells with it.
"#;

pub const CHARISMA: &str = r#"
Force of personality and leadership. Drives Bluff, Diplomacy and Intimidate, and powers the spells of sorcerers and bards.
"#;

// endregion:  --- Abilities

// region:  --- Saves

pub const FORTITUDE: &str = r#"
Resisting poison, disease and other physical punishment. Adds the Constitution modifier.
"#;

pub const REFLEX: &str = r#"
Dodging area attacks such as fireballs and traps. Adds the Dexterity modifier.
"#;

pub const WILL: &str = r#"
Resisting mental influence and many magical effects. Adds the Wisdom modifier.
"#;

// endregion:  --- Saves

pub fn ability_description(ability: Ability) -> &'static str {
    match ability {
        Ability::Strength => STRENGTH,
        Ability::Dexterity => DEXTERITY,
        Ability::Constitution => CONSTITUTION,
        Ability::Intelligence => INTELLIGENCE,
        Ability::Wisdom => WISDOM,
        Ability::Charisma => CHARISMA,
    }
    .trim()
}

pub fn save_description(kind: SaveKind) -> &'static str {
    match kind {
        SaveKind::Fortitude => FORTITUDE,
        SaveKind::Reflex => REFLEX,
        SaveKind::Will => WILL,
    }
    .trim()
}
