use crate::character::{Character, CharacterId};
use crate::definitions::{CustomSkillDefinition, Definitions, FeatDefinition, GlobalSettings};
use crate::error::{CharacterError, StoreError};
use crate::storage::{KeyValueStore, read_blob, storage_keys, write_blob};
use uuid::Uuid;

/// Characters held in memory and written back wholesale on every change.
///
/// Concurrent writers over the same store are not coordinated: the last
/// write wins.
#[derive(Debug)]
pub struct CharacterRepository<S: KeyValueStore> {
    store: S,
    characters: Vec<Character>,
}

impl<S: KeyValueStore> CharacterRepository<S> {
    /// Reads every stored character. Unparsable data is reported as
    /// [`StoreError::Corrupt`].
    pub fn load(store: S) -> Result<Self, StoreError> {
        let characters: Vec<Character> = read_blob(&store, storage_keys::CHARACTERS)?;
        log::debug!("Loaded {} characters", characters.len());
        Self::from_stored(store, characters)
    }

    // Records saved without ids get them here, and are written back once so
    // the ids stay the same in later sessions.
    fn from_stored(store: S, mut characters: Vec<Character>) -> Result<Self, StoreError> {
        let assigned = fill_missing_ids(&mut characters);
        let repository = Self { store, characters };
        if assigned > 0 {
            log::info!("Assigned ids to {assigned} stored characters");
            repository.persist()?;
        }
        Ok(repository)
    }

    /// Like [`load`](Self::load), but a corrupt store is replaced by an empty one.
    pub fn load_or_reset(store: S) -> Result<Self, StoreError> {
        match read_blob::<Vec<Character>, S>(&store, storage_keys::CHARACTERS) {
            Ok(characters) => Self::from_stored(store, characters),
            Err(e) if e.is_corrupt() => {
                log::error!("Resetting character store: {e}");
                let repository = Self {
                    store,
                    characters: Vec::new(),
                };
                repository.persist()?;
                Ok(repository)
            }
            Err(e) => Err(e),
        }
    }

    pub fn list(&self) -> &[Character] {
        &self.characters
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|character| character.id == id)
    }

    pub fn require(&self, id: CharacterId) -> Result<&Character, CharacterError> {
        self.get(id).ok_or(CharacterError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn add(&mut self, character: Character) -> Result<(), StoreError> {
        self.upsert(character)
    }

    pub fn update(&mut self, character: Character) -> Result<(), StoreError> {
        self.upsert(character)
    }

    // Both add and update fully replace any record with the same id.
    fn upsert(&mut self, character: Character) -> Result<(), StoreError> {
        log::debug!("Saving character {} ({})", character.name, character.id);
        match self.characters.iter_mut().find(|c| c.id == character.id) {
            Some(existing) => *existing = character,
            None => self.characters.push(character),
        }
        self.persist()
    }

    /// Deletes a character. Unknown ids are ignored and nothing is written.
    pub fn remove(&mut self, id: CharacterId) -> Result<(), StoreError> {
        let before = self.characters.len();
        self.characters.retain(|character| character.id != id);
        if self.characters.len() == before {
            return Ok(());
        }
        log::info!("Removed character {id}");
        self.persist()
    }

    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.characters.clear();
        self.persist()
    }

    /// Re-reads the store, dropping unsaved in-memory state.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.characters = read_blob(&self.store, storage_keys::CHARACTERS)?;
        if fill_missing_ids(&mut self.characters) > 0 {
            self.persist()?;
        }
        Ok(())
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&self) -> Result<(), StoreError> {
        write_blob(&self.store, storage_keys::CHARACTERS, &self.characters)
    }
}

fn fill_missing_ids(characters: &mut [Character]) -> usize {
    characters
        .iter_mut()
        .map(Character::assign_missing_ids)
        .filter(|assigned| *assigned)
        .count()
}

/// Custom skill and feat templates plus global settings, stored as one object.
#[derive(Debug)]
pub struct DefinitionsRepository<S: KeyValueStore> {
    store: S,
    definitions: Definitions,
}

impl<S: KeyValueStore> DefinitionsRepository<S> {
    pub fn load(store: S) -> Result<Self, StoreError> {
        let definitions = read_blob(&store, storage_keys::DEFINITIONS)?;
        Self::from_stored(store, definitions)
    }

    fn from_stored(store: S, mut definitions: Definitions) -> Result<Self, StoreError> {
        let assigned = definitions.assign_missing_ids();
        let repository = Self { store, definitions };
        if assigned > 0 {
            log::info!("Assigned ids to {assigned} stored definitions");
            repository.persist()?;
        }
        Ok(repository)
    }

    pub fn load_or_reset(store: S) -> Result<Self, StoreError> {
        match read_blob::<Definitions, S>(&store, storage_keys::DEFINITIONS) {
            Ok(definitions) => Self::from_stored(store, definitions),
            Err(e) if e.is_corrupt() => {
                log::error!("Resetting definitions store: {e}");
                let repository = Self {
                    store,
                    definitions: Definitions::default(),
                };
                repository.persist()?;
                Ok(repository)
            }
            Err(e) => Err(e),
        }
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    // region:  --- Custom skills

    pub fn list_skills(&self) -> &[CustomSkillDefinition] {
        &self.definitions.custom_skills
    }

    pub fn get_skill(&self, id: Uuid) -> Option<&CustomSkillDefinition> {
        self.definitions.skill(id)
    }

    pub fn upsert_skill(&mut self, skill: CustomSkillDefinition) -> Result<(), StoreError> {
        let skills = &mut self.definitions.custom_skills;
        match skills.iter_mut().find(|s| s.id == skill.id) {
            Some(existing) => *existing = skill,
            None => skills.push(skill),
        }
        self.persist()
    }

    pub fn remove_skill(&mut self, id: Uuid) -> Result<(), StoreError> {
        let skills = &mut self.definitions.custom_skills;
        let before = skills.len();
        skills.retain(|skill| skill.id != id);
        if skills.len() == before {
            return Ok(());
        }
        self.persist()
    }

    // endregion:  --- Custom skills

    // region:  --- Custom feats

    pub fn list_feats(&self) -> &[FeatDefinition] {
        &self.definitions.custom_feats
    }

    pub fn get_feat(&self, id: Uuid) -> Option<&FeatDefinition> {
        self.definitions.feat(id)
    }

    pub fn upsert_feat(&mut self, feat: FeatDefinition) -> Result<(), StoreError> {
        let feats = &mut self.definitions.custom_feats;
        match feats.iter_mut().find(|f| f.id == feat.id) {
            Some(existing) => *existing = feat,
            None => feats.push(feat),
        }
        self.persist()
    }

    pub fn remove_feat(&mut self, id: Uuid) -> Result<(), StoreError> {
        let feats = &mut self.definitions.custom_feats;
        let before = feats.len();
        feats.retain(|feat| feat.id != id);
        if feats.len() == before {
            return Ok(());
        }
        self.persist()
    }

    // endregion:  --- Custom feats

    pub fn settings(&self) -> &GlobalSettings {
        &self.definitions.settings
    }

    pub fn update_settings(&mut self, settings: GlobalSettings) -> Result<(), StoreError> {
        self.definitions.settings = settings;
        self.persist()
    }

    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.definitions = Definitions::default();
        self.persist()
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&self) -> Result<(), StoreError> {
        log::debug!(
            "Saving {} custom skills, {} custom feats",
            self.definitions.custom_skills.len(),
            self.definitions.custom_feats.len()
        );
        write_blob(&self.store, storage_keys::DEFINITIONS, &self.definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Ability, CharacterBuilder};
    use crate::storage::MemoryStore;

    fn fighter() -> Character {
        CharacterBuilder::new("Hedda Ironhand")
            .race("Dwarf")
            .class("Fighter", 5)
            .ability(Ability::Strength, 16)
            .build()
    }

    #[test]
    fn add_then_get_returns_the_same_record() {
        let mut repository = CharacterRepository::load(MemoryStore::new()).unwrap();
        let character = fighter();
        repository.add(character.clone()).unwrap();
        assert_eq!(repository.get(character.id), Some(&character));
    }

    #[test]
    fn update_replaces_the_whole_record() {
        let mut repository = CharacterRepository::load(MemoryStore::new()).unwrap();
        let mut character = fighter();
        repository.add(character.clone()).unwrap();

        character.name = "Hedda the Bold".to_string();
        character.languages = vec!["Dwarven".to_string()];
        repository.update(character.clone()).unwrap();

        assert_eq!(repository.len(), 1);
        assert_eq!(repository.get(character.id), Some(&character));
    }

    #[test]
    fn update_is_idempotent() {
        let store = MemoryStore::new();
        let mut repository = CharacterRepository::load(store.clone()).unwrap();
        let character = fighter();
        repository.update(character.clone()).unwrap();
        let first = store.load(storage_keys::CHARACTERS).unwrap();
        repository.update(character).unwrap();
        let second = store.load(storage_keys::CHARACTERS).unwrap();
        assert_eq!(first, second);
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn remove_missing_id_does_not_write() {
        let store = MemoryStore::new();
        let mut repository = CharacterRepository::load(store.clone()).unwrap();
        repository.remove(CharacterId::new()).unwrap();
        assert_eq!(store.load(storage_keys::CHARACTERS).unwrap(), None);
    }

    #[test]
    fn remove_then_get_is_absent() {
        let mut repository = CharacterRepository::load(MemoryStore::new()).unwrap();
        let character = fighter();
        repository.add(character.clone()).unwrap();
        repository.remove(character.id).unwrap();
        assert!(repository.get(character.id).is_none());
        assert!(matches!(
            repository.require(character.id),
            Err(CharacterError::NotFound(id)) if id == character.id
        ));
        assert!(repository.is_empty());
    }

    #[test]
    fn corrupt_store_is_distinguishable_and_resettable() {
        let store = MemoryStore::new();
        store.save(storage_keys::CHARACTERS, "{ definitely not json").unwrap();

        let error = CharacterRepository::load(store.clone()).unwrap_err();
        assert!(error.is_corrupt());

        let repository = CharacterRepository::load_or_reset(store.clone()).unwrap();
        assert!(repository.is_empty());
        assert_eq!(
            store.load(storage_keys::CHARACTERS).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn records_without_ids_keep_their_assigned_ids() {
        let store = MemoryStore::new();
        store
            .save(
                storage_keys::CHARACTERS,
                r#"[{"name":"Legacy","skills":[{"name":"Climb"}]},{"name":"Other"}]"#,
            )
            .unwrap();

        let first = CharacterRepository::load(store.clone()).unwrap();
        let legacy = first.list()[0].clone();
        assert!(!legacy.id.is_nil());
        assert_ne!(legacy.id, first.list()[1].id);

        let mut second = CharacterRepository::load(store.clone()).unwrap();
        assert_eq!(second.get(legacy.id), Some(&legacy));

        let mut renamed = legacy.clone();
        renamed.name = "Legacy Renamed".to_string();
        second.update(renamed).unwrap();
        assert_eq!(second.len(), 2);

        let third = CharacterRepository::load_or_reset(store).unwrap();
        assert_eq!(third.require(legacy.id).unwrap().name, "Legacy Renamed");
        assert_eq!(third.list()[0].skills[0].id, legacy.skills[0].id);
    }

    #[test]
    fn reload_discards_unsaved_changes() {
        let store = MemoryStore::new();
        let mut repository = CharacterRepository::load(store.clone()).unwrap();
        repository.add(fighter()).unwrap();

        let mut other = CharacterRepository::load(store).unwrap();
        other.reset().unwrap();

        repository.reload().unwrap();
        assert!(repository.is_empty());
    }

    #[test]
    fn definitions_crud_and_settings() {
        let store = MemoryStore::new();
        let mut repository = DefinitionsRepository::load(store.clone()).unwrap();
        assert!(repository.list_skills().is_empty());

        let mut skill = CustomSkillDefinition::new("Knowledge (sailing)", Ability::Intelligence);
        repository.upsert_skill(skill.clone()).unwrap();
        skill.trained_only = true;
        repository.upsert_skill(skill.clone()).unwrap();
        assert_eq!(repository.list_skills().len(), 1);
        assert!(repository.get_skill(skill.id).unwrap().trained_only);

        let feat = FeatDefinition::new("Sea Legs");
        repository.upsert_feat(feat.clone()).unwrap();

        let settings = GlobalSettings {
            reroll_ones: true,
            point_buy_budget: 32,
            ..Default::default()
        };
        repository.update_settings(settings.clone()).unwrap();

        let reloaded = DefinitionsRepository::load(store).unwrap();
        assert_eq!(reloaded.settings(), &settings);
        assert_eq!(reloaded.get_feat(feat.id), Some(&feat));

        let mut reloaded = reloaded;
        reloaded.remove_skill(skill.id).unwrap();
        reloaded.remove_feat(feat.id).unwrap();
        assert!(reloaded.definitions().custom_skills.is_empty());
        assert!(reloaded.list_feats().is_empty());
    }

    #[test]
    fn definitions_without_ids_keep_their_assigned_ids() {
        let store = MemoryStore::new();
        store
            .save(storage_keys::DEFINITIONS, r#"{"customFeats":[{"name":"Sea Legs"}]}"#)
            .unwrap();
        let first = DefinitionsRepository::load(store.clone()).unwrap();
        let feat = first.list_feats()[0].clone();
        let second = DefinitionsRepository::load(store).unwrap();
        assert_eq!(second.get_feat(feat.id), Some(&feat));
    }

    #[test]
    fn corrupt_definitions_reset_to_defaults() {
        let store = MemoryStore::new();
        store.save(storage_keys::DEFINITIONS, "[1, 2").unwrap();
        assert!(DefinitionsRepository::load(store.clone()).unwrap_err().is_corrupt());
        let repository = DefinitionsRepository::load_or_reset(store).unwrap();
        assert_eq!(repository.definitions(), &Definitions::default());
    }
}
