// Import required modules and crates.
use crate::character::{Ability, AbilityScores};
use crate::error::CharacterError;
use rand::Rng; // RNG utilities from the rand crate for generating random numbers.
use strum::IntoEnumIterator;

pub const LOWEST_POINT_BUY_SCORE: i32 = 8;
pub const HIGHEST_POINT_BUY_SCORE: i32 = 18;

// Cost of each score from 8 through 18.
const POINT_BUY_COSTS: [u32; 11] = [0, 1, 2, 3, 4, 5, 6, 8, 10, 13, 16];

// Structure to hold the individual dice behind one rolled score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityRoll {
    pub dice: [u8; 4],
    pub dropped: u8, // The lowest die, excluded from the score.
    pub score: i32,
}

/// Rolls 4d6 and keeps the highest three. With `reroll_ones` every 1 is
/// rerolled until it comes up higher.
pub fn roll_ability(rng: &mut impl Rng, reroll_ones: bool) -> AbilityRoll {
    let mut dice = [0u8; 4];
    for die in dice.iter_mut() {
        let mut result = roll_die(rng);
        while reroll_ones && result == 1 {
            result = roll_die(rng);
        }
        *die = result;
    }

    let dropped = dice.iter().copied().min().unwrap_or(0);
    let sum: i32 = dice.iter().map(|die| i32::from(*die)).sum();
    AbilityRoll {
        dice,
        dropped,
        score: sum - i32::from(dropped),
    }
}

pub fn roll_ability_score(rng: &mut impl Rng, reroll_ones: bool) -> i32 {
    roll_ability(rng, reroll_ones).score
}

// Rolls one score per ability, in ability order.
pub fn roll_ability_scores(rng: &mut impl Rng, reroll_ones: bool) -> AbilityScores {
    let mut scores = AbilityScores::default();
    for ability in Ability::iter() {
        scores.set(ability, roll_ability_score(rng, reroll_ones));
    }
    scores
}

// Helper function to roll a single die.
fn roll_die(rng: &mut impl Rng) -> u8 {
    rng.random_range(1..=6)
}

/// Points needed to buy a score, `None` outside the purchasable range.
pub fn point_buy_cost(score: i32) -> Option<u32> {
    if !(LOWEST_POINT_BUY_SCORE..=HIGHEST_POINT_BUY_SCORE).contains(&score) {
        return None;
    }
    POINT_BUY_COSTS
        .get((score - LOWEST_POINT_BUY_SCORE) as usize)
        .copied()
}

pub fn point_buy_total(scores: &AbilityScores) -> Option<u32> {
    scores
        .iter()
        .map(|(_, score)| point_buy_cost(score))
        .sum()
}

/// Checks a point-buy allocation and returns the points spent.
pub fn check_point_buy(scores: &AbilityScores, budget: u32) -> Result<u32, CharacterError> {
    for (ability, score) in scores.iter() {
        if point_buy_cost(score).is_none() {
            return Err(CharacterError::InvalidScore { ability, score });
        }
    }
    let spent = point_buy_total(scores).unwrap_or(0);
    if spent > budget {
        return Err(CharacterError::PointBuyOverBudget { spent, budget });
    }
    Ok(spent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rolled_scores_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let roll = roll_ability(&mut rng, false);
            assert!((3..=18).contains(&roll.score));
            assert!(roll.dice.iter().all(|die| (1..=6).contains(die)));
            assert_eq!(roll.dropped, *roll.dice.iter().min().unwrap());
        }
    }

    #[test]
    fn reroll_ones_never_keeps_a_one() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let roll = roll_ability(&mut rng, true);
            assert!(roll.dice.iter().all(|die| *die >= 2));
            assert!(roll.score >= 6);
        }
    }

    #[test]
    fn seeded_rolls_are_repeatable() {
        let first = roll_ability_scores(&mut StdRng::seed_from_u64(42), false);
        let second = roll_ability_scores(&mut StdRng::seed_from_u64(42), false);
        assert_eq!(first, second);
    }

    #[test]
    fn point_buy_costs_follow_the_table() {
        assert_eq!(point_buy_cost(7), None);
        assert_eq!(point_buy_cost(8), Some(0));
        assert_eq!(point_buy_cost(14), Some(6));
        assert_eq!(point_buy_cost(15), Some(8));
        assert_eq!(point_buy_cost(18), Some(16));
        assert_eq!(point_buy_cost(19), None);
    }

    #[test]
    fn point_buy_checks_budget_and_range() {
        let scores = AbilityScores {
            strength: 16,
            dexterity: 14,
            constitution: 14,
            intelligence: 10,
            wisdom: 10,
            charisma: 8,
        };
        assert_eq!(point_buy_total(&scores), Some(10 + 6 + 6 + 2 + 2));
        assert_eq!(check_point_buy(&scores, 28).unwrap(), 26);
        assert!(matches!(
            check_point_buy(&scores, 25),
            Err(CharacterError::PointBuyOverBudget { spent: 26, budget: 25 })
        ));

        let dumped = AbilityScores {
            charisma: 6,
            ..scores
        };
        assert_eq!(point_buy_total(&dumped), None);
        assert!(matches!(
            check_point_buy(&dumped, 32),
            Err(CharacterError::InvalidScore { ability: Ability::Charisma, score: 6 })
        ));
    }
}
