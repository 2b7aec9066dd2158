// src/suggestion.rs
use crate::error::SuggestionError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub character_class: String,
    pub level: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    #[serde(default)]
    pub suggested_feats: Vec<Suggestion>,
    #[serde(default)]
    pub suggested_skills: Vec<Suggestion>,
}

impl SuggestionRequest {
    pub fn new(character_class: &str, level: u32) -> Result<Self, SuggestionError> {
        let character_class = character_class.trim();
        if character_class.is_empty() {
            return Err(SuggestionError::EmptyClass);
        }
        if level == 0 {
            return Err(SuggestionError::InvalidLevel(level));
        }
        Ok(SuggestionRequest {
            character_class: character_class.to_string(),
            level,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    // Instruction text sent alongside the request.
    pub fn prompt(&self) -> String {
        format!(
            "Suggest feats and skills for a level {} {} in a d20 fantasy ruleset. \
             Answer in valid JSON with the fields \"suggestedFeats\" and \"suggestedSkills\", \
             each a list of objects with a \"name\" and a short \"description\".",
            self.level, self.character_class
        )
    }
}

impl SuggestionResponse {
    pub fn from_json(json: &str) -> Result<Self, SuggestionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.suggested_feats.is_empty() && self.suggested_skills.is_empty()
    }
}
