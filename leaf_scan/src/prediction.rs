use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiseaseClass {
    EarlyBlight,
    LateBlight,
    Healthy,
    Unknown(String),
}

impl DiseaseClass {
    pub fn as_str(&self) -> &str {
        match self {
            DiseaseClass::EarlyBlight => "Early_blight",
            DiseaseClass::LateBlight => "Late_blight",
            DiseaseClass::Healthy => "Healthy",
            DiseaseClass::Unknown(raw) => raw,
        }
    }
}

impl From<String> for DiseaseClass {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Early_blight" => Self::EarlyBlight,
            "Late_blight" => Self::LateBlight,
            "Healthy" => Self::Healthy,
            _ => Self::Unknown(s),
        }
    }
}

impl fmt::Display for DiseaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Danger,
    Healthy,
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Danger => "danger",
            Severity::Healthy => "healthy",
            Severity::Unknown => "unknown",
        }
    }

    pub fn ansi_color(&self) -> u8 {
        match self {
            Severity::Warning => 33,
            Severity::Danger => 31,
            Severity::Healthy => 32,
            Severity::Unknown => 90,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Warning => "!",
            Severity::Danger => "x",
            Severity::Healthy => "+",
            Severity::Unknown => "?",
        }
    }
}

struct Presentation {
    class: &'static str,
    label: &'static str,
    severity: Severity,
    advisory: &'static str,
}

static PRESENTATIONS: [Presentation; 3] = [
    Presentation {
        class: "Early_blight",
        label: "Early Blight",
        severity: Severity::Warning,
        advisory: "Early blight detected. Remove infected leaves and apply appropriate fungicide.",
    },
    Presentation {
        class: "Late_blight",
        label: "Late Blight",
        severity: Severity::Danger,
        advisory: "Late blight detected. This is serious – isolate the plant and consider professional advice.",
    },
    Presentation {
        class: "Healthy",
        label: "Healthy",
        severity: Severity::Healthy,
        advisory: "Leaf looks healthy. Keep monitoring regularly.",
    },
];

const UNKNOWN_ADVISORY: &str = "Unknown disease class. Please consult an expert.";

fn presentation(class: &DiseaseClass) -> Option<&'static Presentation> {
    PRESENTATIONS.iter().find(|p| p.class == class.as_str())
}

#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    disease_class: DiseaseClass,
    confidence: f64,
}

impl PredictionResult {
    pub fn new(disease_class: DiseaseClass, confidence: f64) -> Self {
        Self {
            disease_class,
            confidence,
        }
    }

    pub fn disease_class(&self) -> &DiseaseClass {
        &self.disease_class
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn display_label(&self) -> &str {
        match presentation(&self.disease_class) {
            Some(p) => p.label,
            None => self.disease_class.as_str(),
        }
    }

    pub fn severity(&self) -> Severity {
        presentation(&self.disease_class)
            .map(|p| p.severity)
            .unwrap_or(Severity::Unknown)
    }

    pub fn advisory(&self) -> &'static str {
        presentation(&self.disease_class)
            .map(|p| p.advisory)
            .unwrap_or(UNKNOWN_ADVISORY)
    }

    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}

impl From<PredictResponse> for PredictionResult {
    fn from(response: PredictResponse) -> Self {
        Self::new(response.prediction.into(), response.confidence)
    }
}
