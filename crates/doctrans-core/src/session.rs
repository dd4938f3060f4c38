//! Interaction state machine for one user session.
//!
//! ```text
//! Idle ─FileSelected─▶ FileSelected ─Extracted─▶ TextExtracted ─TranslateRequested─▶ Translating
//!                           │                                                     │
//!                           └──Failed──▶ Error ◀──────────────Failed──────────────┤
//!                                                                                 ▼
//!                                                                            Translated
//! ```
//!
//! `FileSelected` and `Reset` are accepted from every state, so a new upload
//! always starts over. Every transition is caused by a user action; nothing
//! advances on its own.

use thiserror::Error;

use crate::{ExtractedText, PipelineError, TranslatedText};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    FileSelected {
        file_name: String,
    },
    TextExtracted {
        file_name: Option<String>,
        text: ExtractedText,
    },
    Translating {
        text: ExtractedText,
    },
    Translated {
        text: ExtractedText,
        translated: TranslatedText,
    },
    Error {
        error: PipelineError,
        /// Extracted text, kept when the failure happened during translation.
        text: Option<ExtractedText>,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FileSelected { .. } => "file_selected",
            Self::TextExtracted { .. } => "text_extracted",
            Self::Translating { .. } => "translating",
            Self::Translated { .. } => "translated",
            Self::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    FileSelected(String),
    Extracted(ExtractedText),
    TranslateRequested,
    Translated(TranslatedText),
    Failed(PipelineError),
    Reset,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FileSelected(_) => "file_selected",
            Self::Extracted(_) => "extracted",
            Self::TranslateRequested => "translate_requested",
            Self::Translated(_) => "translated",
            Self::Failed(_) => "failed",
            Self::Reset => "reset",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot apply '{event}' in state '{state}'")]
    Invalid {
        state: &'static str,
        event: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    /// Rebuild a session whose extracted text is held by the client, e.g.
    /// when a later request carries the text back for translation.
    pub fn resume(text: ExtractedText) -> Self {
        Self {
            state: SessionState::TextExtracted {
                file_name: None,
                text,
            },
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Apply `event`. On an invalid transition the state is left unchanged.
    pub fn update(&mut self, event: SessionEvent) -> Result<(), TransitionError> {
        let current = std::mem::replace(&mut self.state, SessionState::Idle);
        let from = current.name();
        match next_state(current, event) {
            Ok(next) => {
                tracing::debug!(from, to = next.name(), "session transition");
                self.state = next;
                Ok(())
            }
            Err((unchanged, err)) => {
                self.state = unchanged;
                Err(err)
            }
        }
    }

    pub fn extracted_text(&self) -> Option<&ExtractedText> {
        match &self.state {
            SessionState::TextExtracted { text, .. }
            | SessionState::Translating { text }
            | SessionState::Translated { text, .. } => Some(text),
            SessionState::Error { text, .. } => text.as_ref(),
            SessionState::Idle | SessionState::FileSelected { .. } => None,
        }
    }

    pub fn translated_text(&self) -> Option<&TranslatedText> {
        match &self.state {
            SessionState::Translated { translated, .. } => Some(translated),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match &self.state {
            SessionState::Error { error, .. } => Some(error),
            _ => None,
        }
    }
}

fn next_state(
    state: SessionState,
    event: SessionEvent,
) -> Result<SessionState, (SessionState, TransitionError)> {
    use SessionEvent as E;
    use SessionState as S;

    match (state, event) {
        (_, E::Reset) => Ok(S::Idle),
        (_, E::FileSelected(file_name)) => Ok(S::FileSelected { file_name }),
        (S::FileSelected { file_name }, E::Extracted(text)) => Ok(S::TextExtracted {
            file_name: Some(file_name),
            text,
        }),
        (S::FileSelected { .. }, E::Failed(error)) => Ok(S::Error { error, text: None }),
        (S::TextExtracted { text, .. }, E::TranslateRequested)
        | (S::Translated { text, .. }, E::TranslateRequested) => Ok(S::Translating { text }),
        (S::Translating { text }, E::Translated(translated)) => {
            Ok(S::Translated { text, translated })
        }
        (S::Translating { text }, E::Failed(error)) => Ok(S::Error {
            error,
            text: Some(text),
        }),
        (state, event) => {
            let err = TransitionError::Invalid {
                state: state.name(),
                event: event.name(),
            };
            Err((state, err))
        }
    }
}
