//! Turn and prompt domain types.
//!
//! These are the value objects that flow through the system:
//! the assembler produces a [`Prompt`], a provider consumes it, and the
//! answer comes back as an assistant [`Turn`].

use serde::{Deserialize, Serialize};

/// The role of a turn's author in a structured prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The language model
    Assistant,
    /// Out-of-band instructions or background context
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged turn of a structured prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// The shape a prompt takes on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnFormat {
    /// A single string, for legacy completion endpoints.
    #[default]
    Flat,
    /// An ordered list of role-tagged turns, for chat endpoints.
    Structured,
}

impl TurnFormat {
    /// Pick the format a model expects from its name.
    ///
    /// Legacy completion models (`davinci`, `curie`, `babbage`, `ada`,
    /// `*-instruct`, `text-*`) take flat prompts; everything else is treated
    /// as a chat model. Legacy names are matched as whole name parts split
    /// on `-`, `:` and `.`, so `ada:ft-acme` is flat but `canada-7b` is not.
    pub fn infer(model: &str) -> Self {
        let model = model.to_ascii_lowercase();
        let legacy = ["davinci", "curie", "babbage", "ada", "instruct"];
        let mut parts = model.split(['-', ':', '.']);
        if model.starts_with("text-") || parts.any(|part| legacy.contains(&part)) {
            TurnFormat::Flat
        } else {
            TurnFormat::Structured
        }
    }
}

/// An assembled prompt, ready to send to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prompt {
    Text(String),
    Turns(Vec<Turn>),
}

impl Prompt {
    pub fn format(&self) -> TurnFormat {
        match self {
            Prompt::Text(_) => TurnFormat::Flat,
            Prompt::Turns(_) => TurnFormat::Structured,
        }
    }

    /// Render the prompt as plain text, one `role: content` line per turn.
    pub fn render(&self) -> String {
        match self {
            Prompt::Text(text) => text.clone(),
            Prompt::Turns(turns) => turns
                .iter()
                .map(|t| format!("{}: {}", t.role, t.content))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Iterate over every piece of text content in the prompt.
    pub fn contents(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Prompt::Text(text) => Box::new(std::iter::once(text.as_str())),
            Prompt::Turns(turns) => Box::new(turns.iter().map(|t| t.content.as_str())),
        }
    }
}
