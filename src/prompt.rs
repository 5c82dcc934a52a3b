//! Prompt framing for the generation service.

use crate::actor::ConversationTurn;
use crate::persona::Persona;
use std::fmt::Write;

/// Builds the text prompt for one turn.
pub trait PromptBuilder: Send + Sync {
    /// Combine persona framing, prior turns, and the new player line.
    fn build(&self, persona: &Persona, history: &[ConversationTurn], player_line: &str) -> String;
}

/// Plain-text transcript prompt ending with the NPC's name as a cue.
///
/// ```text
/// You are Eliara. A wandering herbalist.
///
/// Conversation so far:
/// Player: hello
/// Eliara: Greetings.
/// Player: who are you?
/// Eliara:
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPromptBuilder;

impl DefaultPromptBuilder {
    /// Render prior turns as alternating `Player:` / `<name>:` lines.
    pub fn render_history(persona: &Persona, history: &[ConversationTurn]) -> String {
        let mut out = String::new();
        for (i, turn) in history.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = write!(
                out,
                "Player: {}\n{}: {}",
                turn.player_line, persona.display_name, turn.npc_reply
            );
        }
        out
    }
}

impl PromptBuilder for DefaultPromptBuilder {
    fn build(&self, persona: &Persona, history: &[ConversationTurn], player_line: &str) -> String {
        let name = &persona.display_name;
        let mut prompt = String::with_capacity(256);
        let _ = write!(prompt, "You are {name}. {}", persona.persona_text);
        prompt.push_str("\n\nConversation so far:\n");
        prompt.push_str(&Self::render_history(persona, history));
        let _ = write!(prompt, "\nPlayer: {player_line}\n{name}:");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eliara() -> Persona {
        Persona::new("default", "Eliara", "A wandering herbalist.")
    }

    #[test]
    fn test_prompt_first_turn() {
        let prompt = DefaultPromptBuilder.build(&eliara(), &[], "Hello");
        assert_eq!(
            prompt,
            "You are Eliara. A wandering herbalist.\n\nConversation so far:\n\nPlayer: Hello\nEliara:"
        );
    }

    #[test]
    fn test_prompt_includes_history_verbatim() {
        let history = vec![
            ConversationTurn::new("Hello", "Greetings, traveller."),
            ConversationTurn::new("Any herbs?", "Only thyme."),
        ];
        let prompt = DefaultPromptBuilder.build(&eliara(), &history, "Thanks");
        assert!(prompt.contains(
            "Conversation so far:\nPlayer: Hello\nEliara: Greetings, traveller.\nPlayer: Any herbs?\nEliara: Only thyme.\nPlayer: Thanks\nEliara:"
        ));
    }
}
