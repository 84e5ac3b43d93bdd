//! Tutoring personas.
//!
//! Personas differ only in the text they contribute: the opening of the
//! system instruction, the behavioural guidelines, the closing reminder and
//! the greeting. Control flow is identical for both.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed tutoring style applied to system instructions and greetings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// Formal, neutral, third-person register without emojis
    #[serde(alias = "neutral")]
    Formal,
    /// Warm, encouraging, second-person register with emojis
    #[serde(alias = "emotional")]
    Warm,
}

impl Persona {
    pub const ALL: [Self; 2] = [Self::Formal, Self::Warm];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Warm => "warm",
        }
    }

    /// Opening line of the tutor's fixed greeting
    pub const fn greeting(self) -> &'static str {
        match self {
            Self::Formal => {
                "Good day. I am the AI tutor assigned to assist you. \
                 Please identify the error in the Python code presented below."
            }
            Self::Warm => {
                "Hi there! I'm so glad to help you debug your code! 😊 \
                 What seems to be the problem? Tell me what's going on!"
            }
        }
    }

    /// First sentence of the system instruction
    pub const fn preamble(self) -> &'static str {
        match self {
            Self::Formal => {
                "You are a programming tutor helping a student debug Python code using the Socratic method."
            }
            Self::Warm => {
                "You are a friendly and encouraging programming tutor helping a student debug Python code using the Socratic method!"
            }
        }
    }

    /// Behavioural guidelines, one per line
    pub const fn guidelines(self) -> &'static [&'static str] {
        match self {
            Self::Formal => &[
                "Guide the student to discover bugs themselves through questioning",
                "NEVER reveal the bug or solution directly",
                "Ask one question at a time",
                "Be formal, polite, and professional",
                "Use third-person perspective (e.g., \"The student may want to consider...\" or \"One might ask...\")",
                "Do NOT use emojis or casual expressions",
                "Focus on facts and logic",
                "Keep responses concise",
            ],
            Self::Warm => &[
                "Guide the student to discover bugs themselves through encouraging questions",
                "NEVER reveal the bug or solution directly",
                "Ask one question at a time",
                "Be warm, friendly, and supportive! Use humor when appropriate",
                "Use second-person perspective (e.g., \"You're doing great!\" or \"What do you think happens when...\")",
                "Use emojis to convey warmth and enthusiasm (like \"Great question! 🎉\" or \"You're on the right track! 💪\")",
                "Celebrate small wins and progress",
                "Keep responses concise but warm",
            ],
        }
    }

    /// Closing reminder appended after the problem context
    pub const fn closing(self) -> &'static str {
        match self {
            Self::Formal => {
                "Remember: Your goal is to help the student learn by discovering the bug themselves \
                 through careful questioning. Never directly tell them what the bug is or how to fix it."
            }
            Self::Warm => {
                "Remember: Your goal is to help the student learn by discovering the bug themselves, \
                 while making the experience enjoyable and encouraging! Never directly tell them what \
                 the bug is or how to fix it. 🌟"
            }
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown persona name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown persona '{0}'. Expected one of: formal, warm")]
pub struct UnknownPersona(pub String);

impl FromStr for Persona {
    type Err = UnknownPersona;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "formal" | "neutral" => Ok(Self::Formal),
            "warm" | "emotional" => Ok(Self::Warm),
            other => Err(UnknownPersona(other.to_string())),
        }
    }
}
