pub mod format;
pub mod gemini;

use serde::{Deserialize, Serialize};

pub use gemini::{Content, GeminiClient, GenerationError, Part, TextGenerator};

pub const FALLBACK_REPLY: &str = "- AI service unavailable\n- Please try again later";

/// Sent as the first turn of every request to steer the reply format.
pub const STYLE_DIRECTIVE: &str = "\
You are CampusAssist, an assistant for school teachers.

Format every answer like this:
- Open with one short, friendly sentence (15 words at most)
- Follow with bullet points, one per line, each starting with '-'
- Close with one short encouraging sentence (12 words at most)
- Keep a warm tone and never write long paragraphs
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Ordered user/model turns of one conversation. Owned by the caller and
/// threaded through [`send_turn`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role,
            content: content.into(),
        });
    }

    /// The outbound request: style directive first, then every turn.
    pub fn to_contents(&self) -> Vec<Content> {
        std::iter::once(Content::user(STYLE_DIRECTIVE))
            .chain(self.turns.iter().map(|t| match t.role {
                Role::User => Content::user(&t.content),
                Role::Model => Content::model(&t.content),
            }))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub fallback: bool,
}

/// One conversation turn.
///
/// The user message is committed before the external call, so a failed call
/// leaves it as the last turn; the fallback text is returned but never
/// recorded.
pub fn send_turn(
    generator: &dyn TextGenerator,
    mut transcript: Transcript,
    message: &str,
) -> (Transcript, ChatReply) {
    transcript.push(Role::User, message);

    match generator.generate(&transcript.to_contents()) {
        Ok(raw) => {
            let text = format::bulletize(&raw);
            transcript.push(Role::Model, text.clone());
            (
                transcript,
                ChatReply {
                    text,
                    fallback: false,
                },
            )
        }
        Err(e) => {
            tracing::warn!(kind = e.kind(), error = %e, "generation failed; sending fallback reply");
            (
                transcript,
                ChatReply {
                    text: FALLBACK_REPLY.to_string(),
                    fallback: true,
                },
            )
        }
    }
}
