//! Drives a [`Session`] through upload, extraction and translation.

use std::sync::Arc;

use thiserror::Error;

use doctrans_core::{
    DownloadArtifact, PipelineError, Session, SessionEvent, TransitionError, Translator,
    UploadedFile, translate_text,
};

use crate::Ingestor;

#[derive(Error, Debug)]
pub enum SessionError {
    /// A pipeline stage failed; the session is now in its error state.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// The action isn't valid in the session's current state.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// The extract → translate → deliver pipeline.
///
/// Holds the process-wide translator; cloning shares it.
#[derive(Clone)]
pub struct Pipeline {
    ingestor: Ingestor,
    translator: Arc<dyn Translator>,
}

impl Pipeline {
    pub fn new(ingestor: Ingestor, translator: Arc<dyn Translator>) -> Self {
        Self {
            ingestor,
            translator,
        }
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    /// Handle a new upload: select the file, then extract its text.
    /// A new upload always starts the session over.
    pub async fn upload(
        &self,
        session: &mut Session,
        upload: UploadedFile,
    ) -> Result<(), SessionError> {
        session.update(SessionEvent::FileSelected(upload.file_name.clone()))?;

        match self.ingestor.ingest_async(upload).await {
            Ok(text) => {
                session.update(SessionEvent::Extracted(text))?;
                Ok(())
            }
            Err(e) => {
                session.update(SessionEvent::Failed(e.clone()))?;
                Err(e.into())
            }
        }
    }

    /// Handle the Translate action for a session holding extracted text.
    pub async fn translate(&self, session: &mut Session) -> Result<(), SessionError> {
        session.update(SessionEvent::TranslateRequested)?;
        let text = session.extracted_text().cloned().unwrap_or_default();

        match translate_text(self.translator.as_ref(), &text).await {
            Ok(translated) => {
                session.update(SessionEvent::Translated(translated))?;
                Ok(())
            }
            Err(e) => {
                session.update(SessionEvent::Failed(e.clone()))?;
                Err(e.into())
            }
        }
    }

    /// The download for a translated session, if there is one yet.
    pub fn download(&self, session: &Session) -> Option<DownloadArtifact> {
        session
            .translated_text()
            .map(DownloadArtifact::from_translation)
    }
}
