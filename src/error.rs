use crate::character::{Ability, CharacterId};
use thiserror::Error;

// Enum for handling application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError), // Errors raised while reading or writing persisted records.

    #[error("Character error: {0}")]
    Character(#[from] CharacterError), // Errors specific to character rules.

    #[error("Suggestion error: {0}")]
    Suggestion(#[from] SuggestionError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Logger error: {0}")]
    Logger(String), // Another logger is already installed.
}

impl From<String> for AppError {
    fn from(error: String) -> Self {
        AppError::Settings(error)
    }
}

// Errors raised by the key-value stores and the repositories built on top of them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error), // Encoding a record for storage failed.

    // The stored blob exists but cannot be parsed. Callers may offer a reset.
    #[error("Corrupt store under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}

// Enum for character rule violations caught at the edit boundary.
#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("Character not found: {0}")]
    NotFound(CharacterId),

    #[error("Invalid {ability} score: {score}")]
    InvalidScore { ability: Ability, score: i32 },

    #[error("Skill '{skill}' has {ranks} ranks, maximum is {max}")]
    RanksExceeded { skill: String, ranks: f64, max: f64 },

    #[error("Point buy spends {spent} points, budget is {budget}")]
    PointBuyOverBudget { spent: u32, budget: u32 },

    #[error("Unknown ability: {0}")]
    UnknownAbility(String),
}

// Errors related to the feat/skill suggestion exchange.
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("Failed to parse suggestion response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid character level: {0}")]
    InvalidLevel(u32),

    #[error("Character class must not be empty")]
    EmptyClass,
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
