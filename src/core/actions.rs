//! Built-in actions offered for a captured selection
//!
//! Each action turns the selection into a prompt for the completion client.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Explain,
    Summarize,
    Improve,
    FixGrammar,
    TranslateToEnglish,
    Simplify,
    /// Free-form instruction from the user
    Custom(String),
}

impl Action {
    /// Every built-in action, in menu order
    pub fn builtins() -> [Action; 6] {
        [
            Action::Explain,
            Action::Summarize,
            Action::Improve,
            Action::FixGrammar,
            Action::TranslateToEnglish,
            Action::Simplify,
        ]
    }

    pub fn label(&self) -> &str {
        match self {
            Action::Explain => "Explain",
            Action::Summarize => "Summarize",
            Action::Improve => "Improve writing",
            Action::FixGrammar => "Fix grammar",
            Action::TranslateToEnglish => "Translate to English",
            Action::Simplify => "Simplify",
            Action::Custom(_) => "Custom",
        }
    }

    fn instruction(&self) -> &str {
        match self {
            Action::Explain => "Explain the following text clearly and concisely:",
            Action::Summarize => "Summarize the following text in a few sentences:",
            Action::Improve => {
                "Improve the writing of the following text. Reply with the improved text only:"
            }
            Action::FixGrammar => {
                "Fix the spelling and grammar of the following text. Reply with the corrected text only:"
            }
            Action::TranslateToEnglish => {
                "Translate the following text to English. Reply with the translation only:"
            }
            Action::Simplify => "Rewrite the following text in simpler words:",
            Action::Custom(instruction) => instruction.trim(),
        }
    }

    /// Combine the action's instruction with the selected text
    pub fn build_prompt(&self, selection: &str) -> String {
        format!("{}\n\n{}", self.instruction(), selection)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "explain" => Ok(Action::Explain),
            "summarize" | "summarise" | "summary" => Ok(Action::Summarize),
            "improve" | "improve writing" => Ok(Action::Improve),
            "fix grammar" | "grammar" => Ok(Action::FixGrammar),
            "translate" | "translate to english" => Ok(Action::TranslateToEnglish),
            "simplify" => Ok(Action::Simplify),
            _ => match s.trim().strip_prefix("custom:") {
                Some(instruction) if !instruction.trim().is_empty() => {
                    Ok(Action::Custom(instruction.trim().to_string()))
                }
                _ => Err(format!("Unknown action '{}'", s)),
            },
        }
    }
}
