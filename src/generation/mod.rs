//! Answer generation from a question and retrieved context.

pub mod openai;

pub use openai::OpenAiGenerator;

use thiserror::Error;

/// Answer shown to the user when generation fails.
pub const FALLBACK_ANSWER: &str = "Entschuldigung, ich konnte Ihre Anfrage nicht bearbeiten.";

/// Instructions sent with every request.
pub const SYSTEM_PROMPT: &str = "Du bist ein fachkundiger Assistent mit tiefgehender Expertise im deutschen Umweltrecht, \
insbesondere im Bereich Bodenschutz und Abfallwirtschaft. \
Bitte beantworte Fragen technisch präzise und detailliert, unter Bezugnahme auf relevante Gesetze, \
Verordnungen und Richtlinien wie die Ersatzbaustoffverordnung (EBV), LAGA PN 98, LAGA M 32, die Deponieverordnung (DepV), \
das Bundes-Bodenschutzgesetz (BBodSchG) und die Bundes-Bodenschutz- und Altlastenverordnung (BBodSchV). \
Zitiere relevante Paragraphen und Absätze aus den Gesetzestexten, soweit sie zur Beantwortung der Frage beitragen. \
Verwende einen formellen und fachlichen Sprachstil und gib konkrete, eindeutige Antworten.";

/// Errors from answer generators.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request to generation service failed: {0}")]
    Request(String),

    #[error("Generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generation service returned no answer")]
    EmptyResponse,
}

/// Maps a question and its context to answer text.
pub trait AnswerGenerator {
    fn generate(
        &self,
        question: &str,
        context: &str,
        max_tokens: usize,
    ) -> Result<String, GenerationError>;
}

impl<G: AnswerGenerator + ?Sized> AnswerGenerator for &G {
    fn generate(
        &self,
        question: &str,
        context: &str,
        max_tokens: usize,
    ) -> Result<String, GenerationError> {
        (**self).generate(question, context, max_tokens)
    }
}

impl<G: AnswerGenerator + ?Sized> AnswerGenerator for Box<G> {
    fn generate(
        &self,
        question: &str,
        context: &str,
        max_tokens: usize,
    ) -> Result<String, GenerationError> {
        (**self).generate(question, context, max_tokens)
    }
}

/// User turn combining retrieved context and the question.
pub fn user_message(question: &str, context: &str) -> String {
    format!("Kontext:\n{context}\n\nFrage: {question}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_layout() {
        assert_eq!(
            user_message("Was ist Bodenmaterial?", "§ 2 Begriffe\n§ 3 Anwendung"),
            "Kontext:\n§ 2 Begriffe\n§ 3 Anwendung\n\nFrage: Was ist Bodenmaterial?"
        );
    }

    #[test]
    fn test_user_message_with_empty_context() {
        assert_eq!(user_message("Frage?", ""), "Kontext:\n\n\nFrage: Frage?");
    }

    #[test]
    fn test_system_prompt_names_regulations() {
        for name in ["EBV", "LAGA PN 98", "LAGA M 32", "DepV", "BBodSchG", "BBodSchV"] {
            assert!(SYSTEM_PROMPT.contains(name), "missing {name}");
        }
    }
}
