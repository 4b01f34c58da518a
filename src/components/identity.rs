use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Cosmetic choices made in the creation wizard or at the tailor.
#[derive(Component, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub hair: String,
    pub eyes: String,
    pub outfit: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            hair: "black".to_string(),
            eyes: "brown".to_string(),
            outfit: "academy uniform".to_string(),
            title: None,
        }
    }
}

impl Appearance {
    /// Update one field by name. Returns false for unknown fields.
    pub fn set_field(&mut self, field: &str, value: &str) -> bool {
        let value = value.trim();
        match field {
            "hair" => self.hair = value.to_string(),
            "eyes" => self.eyes = value.to_string(),
            "outfit" => self.outfit = value.to_string(),
            "title" => {
                self.title = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            _ => return false,
        }
        true
    }

    pub fn describe(&self) -> String {
        let mut text = format!("{} hair, {} eyes, wearing {}", self.hair, self.eyes, self.outfit);
        if let Some(title) = &self.title {
            text.push_str(&format!(", known as \"{}\"", title));
        }
        text
    }
}
