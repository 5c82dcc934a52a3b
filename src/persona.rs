//! Personas: who the NPC is and how it speaks.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Read-only description of one speaking character.
#[derive(Debug, Clone, PartialEq)]
pub struct Persona {
    /// Lookup key.
    pub character_id: String,
    /// Name used in the prompt and the conversation log.
    pub display_name: String,
    /// Free-form character description placed in the system framing.
    pub persona_text: String,
    /// Voice selector passed to the synthesizer, if any.
    pub speaker_id: Option<String>,
    /// Speech-rate multiplier. Also scales the text reveal speed.
    pub speech_rate: f32,
}

impl Persona {
    /// Create a persona with a neutral speech rate and no speaker.
    pub fn new(
        character_id: impl Into<String>,
        display_name: impl Into<String>,
        persona_text: impl Into<String>,
    ) -> Self {
        Self {
            character_id: character_id.into(),
            display_name: display_name.into(),
            persona_text: persona_text.into(),
            speaker_id: None,
            speech_rate: 1.0,
        }
    }

    /// Set the synthesizer speaker.
    #[must_use]
    pub fn with_speaker(mut self, speaker_id: impl Into<String>) -> Self {
        self.speaker_id = Some(speaker_id.into());
        self
    }

    /// Set the speech-rate multiplier.
    #[must_use]
    pub const fn with_speech_rate(mut self, speech_rate: f32) -> Self {
        self.speech_rate = speech_rate;
        self
    }
}

/// Source of personas.
///
/// A missing key aborts the turn; there is no fallback persona.
pub trait PersonaSource: Send + Sync {
    /// Look up a persona by character id.
    fn get(&self, character_id: &str) -> Option<Persona>;

    /// Look up a persona, turning a miss into [`Error::PersonaNotFound`].
    fn require(&self, character_id: &str) -> Result<Persona> {
        self.get(character_id)
            .ok_or_else(|| Error::PersonaNotFound(character_id.to_string()))
    }
}

/// In-memory persona table.
#[derive(Debug, Clone, Default)]
pub struct PersonaBook {
    entries: HashMap<String, Persona>,
}

impl PersonaBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a persona, keyed by its character id.
    pub fn insert(&mut self, persona: Persona) -> Option<Persona> {
        self.entries.insert(persona.character_id.clone(), persona)
    }

    /// Number of personas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the book has no personas.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Persona> for PersonaBook {
    fn from_iter<I: IntoIterator<Item = Persona>>(iter: I) -> Self {
        let mut book = Self::new();
        for persona in iter {
            book.insert(persona);
        }
        book
    }
}

impl PersonaSource for PersonaBook {
    fn get(&self, character_id: &str) -> Option<Persona> {
        self.entries.get(character_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_book_lookup() {
        let book: PersonaBook = [
            Persona::new("default", "Eliara", "A wandering herbalist.").with_speaker("p225"),
            Persona::new("smith", "Brom", "A gruff blacksmith.").with_speech_rate(0.8),
        ]
        .into_iter()
        .collect();

        assert_eq!(book.len(), 2);
        assert_eq!(book.get("default").unwrap().speaker_id.as_deref(), Some("p225"));
        assert!((book.require("smith").unwrap().speech_rate - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_persona_is_an_error() {
        let book = PersonaBook::new();
        assert!(book.get("ghost").is_none());
        assert!(matches!(book.require("ghost"), Err(Error::PersonaNotFound(id)) if id == "ghost"));
    }
}
