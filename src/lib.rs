pub mod calc;
pub mod character;
pub mod classes;
pub mod definitions;
pub mod descriptions;
pub mod dice;
pub mod error;
pub mod logging;
pub mod pending;
pub mod repository;
pub mod settings;
pub mod sheet;
pub mod storage;
pub mod suggestion;

// Re-export commonly used items for easier access
pub use character::{
    Ability, AbilityScores, Character, CharacterBuilder, CharacterClass, CharacterId, Size, Skill,
};
pub use definitions::{CustomSkillDefinition, Definitions, FeatDefinition, GlobalSettings};
pub use error::{AppError, CharacterError, StoreError};
pub use pending::PendingEdit;
pub use repository::{CharacterRepository, DefinitionsRepository};
pub use settings::Settings;
pub use sheet::DerivedStats;
pub use storage::{AnyStore, FileStore, KeyValueStore, MemoryStore};
