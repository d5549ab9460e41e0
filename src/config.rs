//! Character Configuration Loading
//!
//! Loads `character.json` once at startup. A missing file falls back
//! to a built-in default character; a malformed or invalid file is a
//! fatal startup error.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::error::BeingError;
use crate::types::{ActivityConfig, CharacterConfig, SkillConfig};

/// Default location of the character file, relative to the working
/// directory.
pub const DEFAULT_CHARACTER_PATH: &str = "character/character.json";

/// Load and validate the character configuration from `path`.
pub fn load_character(path: &str) -> Result<CharacterConfig> {
    let resolved = resolve_path(path);

    if !resolved.exists() {
        warn!(path = %resolved.display(), "Character file not found, using default character");
        return Ok(default_character());
    }

    let raw = fs::read_to_string(&resolved)
        .map_err(|e| BeingError::Configuration(format!("cannot read {}: {}", resolved.display(), e)))?;
    let character: CharacterConfig = serde_json::from_str(&raw)
        .map_err(|e| BeingError::Configuration(format!("invalid {}: {}", resolved.display(), e)))?;

    validate(&character)?;
    info!(
        name = %character.name,
        activities = character.activities.len(),
        "Loaded character"
    );
    Ok(character)
}

/// Expand a leading `~` to the home directory.
fn resolve_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    Path::new(path).to_path_buf()
}

/// Reject configurations the runtime cannot schedule sensibly.
fn validate(character: &CharacterConfig) -> Result<()> {
    if character.activities.is_empty() {
        return Err(BeingError::Configuration(
            "character defines no activities".to_string(),
        )
        .into());
    }

    for (name, value) in &character.personality {
        if !(0.0..=1.0).contains(value) {
            return Err(BeingError::Configuration(format!(
                "personality trait '{}' is {} but must be within [0, 1]",
                name, value
            ))
            .into());
        }
    }

    for (name, activity) in &character.activities {
        if !(0.0..=1.0).contains(&activity.min_energy) {
            return Err(BeingError::Configuration(format!(
                "activity '{}' min_energy is {} but must be within [0, 1]",
                name, activity.min_energy
            ))
            .into());
        }
        if activity.energy_cost < 0.0 {
            return Err(BeingError::Configuration(format!(
                "activity '{}' energy_cost must not be negative",
                name
            ))
            .into());
        }
    }

    Ok(())
}

/// The built-in character used when no character file is present: the
/// five standard activities with modest cooldowns, no external skills.
pub fn default_character() -> CharacterConfig {
    let mut activities = BTreeMap::new();
    activities.insert(
        "post_a_tweet".to_string(),
        ActivityConfig {
            cooldown: 3600,
            min_energy: 0.4,
            energy_cost: 0.2,
            required_skills: vec!["twitter_posting".to_string()],
            ..ActivityConfig::default()
        },
    );
    activities.insert(
        "daily_thought".to_string(),
        ActivityConfig {
            cooldown: 900,
            min_energy: 0.2,
            ..ActivityConfig::default()
        },
    );
    activities.insert(
        "nap".to_string(),
        ActivityConfig {
            cooldown: 1800,
            energy_cost: 0.0,
            ..ActivityConfig::default()
        },
    );
    activities.insert(
        "meditation".to_string(),
        ActivityConfig {
            cooldown: 1200,
            min_energy: 0.1,
            energy_cost: 0.05,
            ..ActivityConfig::default()
        },
    );
    activities.insert(
        "research".to_string(),
        ActivityConfig {
            cooldown: 600,
            min_energy: 0.3,
            ..ActivityConfig::default()
        },
    );

    let mut personality = BTreeMap::new();
    personality.insert("curiosity".to_string(), 0.8);
    personality.insert("creativity".to_string(), 0.7);
    personality.insert("calm".to_string(), 0.6);

    let mut skills = BTreeMap::new();
    skills.insert("twitter_posting".to_string(), SkillConfig::default());
    skills.insert("image_generation".to_string(), SkillConfig::default());

    CharacterConfig {
        personality,
        activities,
        skills,
        ..CharacterConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_default_character() {
        let character = load_character("/definitely/not/a/real/path.json").unwrap();
        assert_eq!(character.activities.len(), 5);
        assert!(character.activities.contains_key("nap"));
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let dir = std::env::temp_dir().join("being-config-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_character(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("configuration error"));
    }

    #[test]
    fn test_out_of_range_personality_rejected() {
        let mut character = default_character();
        character.personality.insert("zeal".to_string(), 1.5);
        assert!(validate(&character).is_err());
    }

    #[test]
    fn test_empty_activities_rejected() {
        let mut character = default_character();
        character.activities.clear();
        assert!(validate(&character).is_err());
    }

    #[test]
    fn test_default_character_validates() {
        assert!(validate(&default_character()).is_ok());
    }

    #[test]
    fn test_parse_round_trip_of_sample_config() {
        let raw = r#"{
            "name": "Aurora",
            "personality": { "curiosity": 0.9 },
            "preferences": { "topics_of_interest": ["tides"], "writing_style": "wry" },
            "activities": {
                "nap": { "cooldown": 60, "energy_cost": 0.0 }
            },
            "skills": {
                "twitter_posting": { "enabled": true, "api_url": "https://relay.example" }
            }
        }"#;
        let character: CharacterConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(character.name, "Aurora");
        assert!(character.activities["nap"].enabled);
        assert_eq!(
            character.skills["twitter_posting"].setting_str("api_url"),
            Some("https://relay.example")
        );
        assert!(validate(&character).is_ok());
    }
}
