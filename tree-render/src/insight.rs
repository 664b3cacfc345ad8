//! Narrative insight panel.
//!
//! The panel turns a selected node's facts into prose through a pluggable
//! provider. The provider is a collaborator seam; this crate never talks
//! to a model service itself. Provider failures degrade to a visible
//! fallback message rather than an error state the host has to handle.

use decomp_engine::NodeSummary;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a narrative provider can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NarrativeError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("no response generated")]
    EmptyResponse,
}

/// Produces a prose narrative for a node's facts.
pub trait NarrativeProvider {
    fn narrate(&self, summary: &NodeSummary) -> Result<String, NarrativeError>;
}

/// Lifecycle of one insight request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InsightState {
    /// No node selected for analysis yet.
    Idle,

    /// A request is in flight.
    Pending,

    /// The provider's narrative.
    Ready { text: String },

    /// The fallback message shown in place of a narrative.
    Failed { message: String },
}

/// State holder for the insight panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightPanel {
    pub state: InsightState,
}

impl Default for InsightPanel {
    fn default() -> Self {
        InsightPanel {
            state: InsightState::Idle,
        }
    }
}

impl InsightPanel {
    pub fn new() -> Self {
        InsightPanel::default()
    }

    /// Marks a request in flight. Hosts with async providers call this
    /// before dispatching and `complete` with the outcome.
    pub fn begin(&mut self) {
        self.state = InsightState::Pending;
    }

    /// Records a provider outcome. Failures become the user-visible
    /// fallback message.
    pub fn complete(&mut self, outcome: Result<String, NarrativeError>) {
        self.state = match outcome {
            Ok(text) => InsightState::Ready { text },
            Err(e) => {
                warn!("narrative generation failed: {}", e);
                InsightState::Failed {
                    message: format!("Unable to generate insights: {}", e),
                }
            }
        };
    }

    /// Runs a synchronous provider end to end.
    pub fn generate(&mut self, provider: &dyn NarrativeProvider, summary: &NodeSummary) {
        self.begin();
        self.complete(provider.narrate(summary));
    }

    /// The text to display, whichever state we are in.
    pub fn display_text(&self) -> &str {
        match &self.state {
            InsightState::Idle => "",
            InsightState::Pending => "Analyzing node...",
            InsightState::Ready { text } => text,
            InsightState::Failed { message } => message,
        }
    }

    pub fn reset(&mut self) {
        self.state = InsightState::Idle;
    }
}
