//! Persona management for dealflow agents
//!
//! Loads prompt definitions from TOML files, so prompts can be tuned
//! without rebuilding.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// A persona definition loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct Persona {
    pub persona: PersonaMetadata,
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonaMetadata {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    pub system: String,
    /// Extra rules appended to the system prompt, one per line
    #[serde(default)]
    pub guidelines: Vec<String>,
}

/// Registry of all loaded personas
#[derive(Debug, Default)]
pub struct PersonaRegistry {
    personas: HashMap<String, Persona>,
}

impl PersonaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the personas compiled into the binary
    pub fn load_embedded() -> Self {
        let mut registry = Self::new();

        let embedded = [
            include_str!("../prompts/extractor.toml"),
            include_str!("../prompts/reporter.toml"),
        ];

        for toml_str in embedded {
            match toml::from_str::<Persona>(toml_str) {
                Ok(persona) if persona.persona.enabled => registry.register(persona),
                Ok(_) => {}
                Err(e) => warn!("Skipping invalid embedded persona: {}", e),
            }
        }

        registry
    }

    /// Load personas from a directory, replacing embedded ones with the same id
    pub fn load_overrides<P: AsRef<Path>>(mut self, dir: P) -> std::io::Result<Self> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();

            if path.extension().is_some_and(|ext| ext == "toml") {
                let content = std::fs::read_to_string(&path)?;
                match toml::from_str::<Persona>(&content) {
                    Ok(persona) if persona.persona.enabled => self.register(persona),
                    Ok(_) => {}
                    Err(e) => warn!("Skipping invalid persona {}: {}", path.display(), e),
                }
            }
        }

        Ok(self)
    }

    /// Register a persona
    pub fn register(&mut self, persona: Persona) {
        self.personas.insert(persona.persona.id.clone(), persona);
    }

    /// Get a persona by ID
    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.get(id)
    }

    /// Count of loaded personas
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

impl Persona {
    /// System prompt with guidelines appended as a rule list
    pub fn system_prompt(&self) -> String {
        let mut prompt = self.prompt.system.trim().to_string();
        if !self.prompt.guidelines.is_empty() {
            prompt.push_str("\n\nRules:\n");
            for (idx, rule) in self.prompt.guidelines.iter().enumerate() {
                prompt.push_str(&format!("{}. {}\n", idx + 1, rule));
            }
        }
        prompt
    }
}
