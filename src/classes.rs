// /classes.rs
use crate::definitions::Resolved;
use serde::{Deserialize, Serialize};

/// Rate at which base attack bonus grows with class level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BabRate {
    Full,
    ThreeQuarter,
    Half,
}

impl BabRate {
    pub fn value(self, level: u32) -> i32 {
        let level = clamp_level(level);
        match self {
            BabRate::Full => level,
            // floor(3L/4) without forming 3L.
            BabRate::ThreeQuarter => level / 4 * 3 + level % 4 * 3 / 4,
            BabRate::Half => level / 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveRate {
    Good,
    Poor,
}

impl SaveRate {
    // A class with no levels contributes nothing, even to a good save.
    pub fn value(self, level: u32) -> i32 {
        if level == 0 {
            return 0;
        }
        let level = clamp_level(level);
        match self {
            SaveRate::Good => 2 + level / 2,
            SaveRate::Poor => level / 3,
        }
    }
}

fn clamp_level(level: u32) -> i32 {
    i32::try_from(level).unwrap_or(i32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassProgression {
    pub bab: BabRate,
    pub fortitude: SaveRate,
    pub reflex: SaveRate,
    pub will: SaveRate,
    pub skill_points: u32, // Per level, before the intelligence modifier.
}

impl Default for ClassProgression {
    fn default() -> Self {
        ClassProgression {
            bab: BabRate::Half,
            fortitude: SaveRate::Poor,
            reflex: SaveRate::Poor,
            will: SaveRate::Poor,
            skill_points: 2,
        }
    }
}

const fn progression(
    bab: BabRate,
    fortitude: SaveRate,
    reflex: SaveRate,
    will: SaveRate,
    skill_points: u32,
) -> ClassProgression {
    ClassProgression {
        bab,
        fortitude,
        reflex,
        will,
        skill_points,
    }
}

use BabRate::{Full, Half, ThreeQuarter};
use SaveRate::{Good, Poor};

pub const CORE_CLASSES: [(&str, ClassProgression); 11] = [
    ("Barbarian", progression(Full, Good, Poor, Poor, 4)),
    ("Bard", progression(ThreeQuarter, Poor, Good, Good, 6)),
    ("Cleric", progression(ThreeQuarter, Good, Poor, Good, 2)),
    ("Druid", progression(ThreeQuarter, Good, Poor, Good, 4)),
    ("Fighter", progression(Full, Good, Poor, Poor, 2)),
    ("Monk", progression(ThreeQuarter, Good, Good, Good, 4)),
    ("Paladin", progression(Full, Good, Poor, Poor, 2)),
    ("Ranger", progression(Full, Good, Good, Poor, 6)),
    ("Rogue", progression(ThreeQuarter, Poor, Good, Poor, 8)),
    ("Sorcerer", progression(Half, Poor, Poor, Good, 2)),
    ("Wizard", progression(Half, Poor, Poor, Good, 2)),
];

/// Looks up a class by name, ignoring case and surrounding whitespace.
///
/// Unknown classes resolve to the default progression (half BAB, all poor
/// saves) with `found` cleared so callers can flag them.
pub fn lookup(name: &str) -> Resolved<ClassProgression> {
    let name = name.trim();
    CORE_CLASSES
        .iter()
        .find(|(class, _)| class.eq_ignore_ascii_case(name))
        .map(|(_, progression)| Resolved::found(*progression))
        .unwrap_or_else(|| Resolved::fallback(ClassProgression::default()))
}
