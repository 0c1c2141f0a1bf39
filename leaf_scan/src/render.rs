use crate::client::PredictionService;
use crate::prediction::{PredictionResult, Severity};
use crate::selection::{ImagePicker, ImageReference};
use crate::state::{AnalysisSession, ClientState};
use std::fmt::Write;

#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub state: &'a ClientState,
    pub image: Option<&'a ImageReference>,
    pub advisory: Option<&'a str>,
}

impl<'a, P: ImagePicker, S: PredictionService> From<&'a AnalysisSession<P, S>> for View<'a> {
    fn from(session: &'a AnalysisSession<P, S>) -> Self {
        Self {
            state: session.state(),
            image: session.selected_image(),
            advisory: session.advisory(),
        }
    }
}

pub fn render(view: &View<'_>, color: bool) -> String {
    let mut out = String::new();

    match view.image {
        Some(image) => {
            let _ = writeln!(out, "Image: {}", image.file_name());
        }
        None => out.push_str("No image selected. Pick one from the gallery or take a photo.\n"),
    }

    match view.state {
        ClientState::Idle if view.image.is_some() => out.push_str("Ready to analyze.\n"),
        ClientState::Idle => {}
        ClientState::Loading => out.push_str("Analyzing...\n"),
        ClientState::Success(result) => render_result(&mut out, result, color),
        ClientState::Failed(message) => {
            let _ = writeln!(out, "Error: {}", message);
        }
    }

    if let Some(advisory) = view.advisory {
        let _ = writeln!(out, "Notice: {}", advisory);
    }

    out
}

fn render_result(out: &mut String, result: &PredictionResult, color: bool) {
    let severity = result.severity();
    let headline = format!(
        "[{}] {} ({})",
        severity.icon(),
        result.display_label(),
        severity.as_str()
    );
    let _ = writeln!(out, "{}", paint(&headline, severity, color));
    let _ = writeln!(out, "Confidence: {}", result.confidence_percent());
    let _ = writeln!(out, "{}", result.advisory());
}

fn paint(text: &str, severity: Severity, color: bool) -> String {
    if color {
        format!("\x1b[{}m{}\x1b[0m", severity.ansi_color(), text)
    } else {
        text.to_string()
    }
}
