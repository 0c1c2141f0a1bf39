use crate::client::{InferenceError, PredictionService};
use crate::prediction::PredictionResult;
use crate::selection::{
    ImagePicker, ImageReference, ImageSource, SelectionController, SelectionError,
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AnalyzeError {
    #[error("Please select an image first.")]
    NoImageSelected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientState {
    Idle,
    Loading,
    Success(PredictionResult),
    Failed(String),
}

impl ClientState {
    pub fn name(&self) -> &'static str {
        match self {
            ClientState::Idle => "idle",
            ClientState::Loading => "loading",
            ClientState::Success(_) => "success",
            ClientState::Failed(_) => "failed",
        }
    }
}

#[derive(Debug)]
pub struct PendingAnalysis {
    image: ImageReference,
}

impl PendingAnalysis {
    pub fn image(&self) -> &ImageReference {
        &self.image
    }
}

#[derive(Debug)]
pub enum AnalyzeTrigger {
    Started(PendingAnalysis),
    AlreadyLoading,
}

pub struct AnalysisSession<P: ImagePicker, S: PredictionService> {
    selection: SelectionController<P>,
    service: S,
    state: ClientState,
    advisory: Option<String>,
}

impl<P: ImagePicker, S: PredictionService> AnalysisSession<P, S> {
    pub fn new(picker: P, service: S) -> Self {
        Self {
            selection: SelectionController::new(picker),
            service,
            state: ClientState::Idle,
            advisory: None,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn selected_image(&self) -> Option<&ImageReference> {
        self.selection.current()
    }

    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    pub fn select_image(
        &mut self,
        source: &ImageSource,
    ) -> Result<&ImageReference, SelectionError> {
        match self.selection.select_image(source) {
            Ok(_) => {
                self.state = ClientState::Idle;
                self.advisory = None;
            }
            Err(e) => {
                tracing::warn!("Image selection failed: {}", e);
                self.advisory = Some(e.to_string());
                return Err(e);
            }
        }
        self.selection.current().ok_or(SelectionError::Cancelled)
    }

    pub fn begin_analysis(&mut self) -> Result<AnalyzeTrigger, AnalyzeError> {
        if self.state == ClientState::Loading {
            tracing::debug!("Analysis already in flight, ignoring trigger");
            return Ok(AnalyzeTrigger::AlreadyLoading);
        }

        let Some(image) = self.selection.current().cloned() else {
            let err = AnalyzeError::NoImageSelected;
            tracing::warn!("{}", err);
            self.advisory = Some(err.to_string());
            return Err(err);
        };

        self.state = ClientState::Loading;
        self.advisory = None;
        Ok(AnalyzeTrigger::Started(PendingAnalysis { image }))
    }

    pub fn complete_analysis(
        &mut self,
        pending: PendingAnalysis,
        outcome: Result<PredictionResult, InferenceError>,
    ) {
        if self.state != ClientState::Loading {
            tracing::warn!(
                state = self.state.name(),
                file = pending.image().file_name(),
                "Dropping analysis outcome outside of loading state"
            );
            return;
        }

        self.state = match outcome {
            Ok(result) => ClientState::Success(result),
            Err(e) => {
                tracing::error!(file = pending.image().file_name(), "Analysis failed: {}", e);
                ClientState::Failed(e.to_string())
            }
        };
    }

    pub async fn analyze(&mut self) -> Result<&ClientState, AnalyzeError> {
        if let AnalyzeTrigger::Started(pending) = self.begin_analysis()? {
            let outcome = self.service.predict(pending.image()).await;
            self.complete_analysis(pending, outcome);
        }
        Ok(&self.state)
    }

    pub fn dismiss_error(&mut self) {
        if matches!(self.state, ClientState::Failed(_)) {
            self.state = ClientState::Idle;
        }
        self.advisory = None;
    }
}
