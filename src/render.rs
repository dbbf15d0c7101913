//! Terminal presentation of a normalized result.
//!
//! The locale is an explicit argument; there is no process-wide language state.

use crate::schema::{Normalization, NormalizedResult, Verdict};
use colored::Colorize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

struct Strings {
    infected: &'static str,
    healthy: &'static str,
    no_flower: &'static str,
    confidence: &'static str,
    flower: &'static str,
    yes: &'static str,
    no: &'static str,
    unknown: &'static str,
    advice_infected: &'static str,
    advice_healthy: &'static str,
    advice_no_flower: &'static str,
}

const EN: Strings = Strings {
    infected: "Botrytis detected",
    healthy: "Healthy rose",
    no_flower: "No flower detected",
    confidence: "Confidence",
    flower: "Flower found",
    yes: "yes",
    no: "no",
    unknown: "unknown",
    advice_infected: "Botrytis was detected on the rose. Apply fungicide and isolate the affected specimen.",
    advice_healthy: "The rose looks healthy. Continue with regular monitoring.",
    advice_no_flower: "No flower was detected in the image. Please upload another image that clearly shows the flower.",
};

const ES: Strings = Strings {
    infected: "Botrytis Detectada",
    healthy: "Rosa Sana",
    no_flower: "No se detectó flor",
    confidence: "Confiabilidad",
    flower: "Flor encontrada",
    yes: "sí",
    no: "no",
    unknown: "desconocido",
    advice_infected: "Se ha detectado Botrytis en la rosa. Recomendamos aplicar fungicida y aislar el espécimen afectado.",
    advice_healthy: "La rosa parece estar en buen estado. Continúa con el monitoreo regular.",
    advice_no_flower: "No se ha detectado una flor en la imagen. Por favor sube otra imagen que contenga la flor claramente.",
};

impl Locale {
    fn strings(self) -> &'static Strings {
        match self {
            Locale::En => &EN,
            Locale::Es => &ES,
        }
    }
}

/// Heading shown for a verdict.
pub fn verdict_title(verdict: Verdict, locale: Locale) -> &'static str {
    let copy = locale.strings();
    match verdict {
        Verdict::Infected => copy.infected,
        Verdict::Healthy => copy.healthy,
        Verdict::NoFlowerDetected => copy.no_flower,
    }
}

/// Confidence as a percentage with two decimals, e.g. `60.00%`.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

pub fn render_human(result: &NormalizedResult, locale: Locale, color: bool) -> String {
    let copy = locale.strings();
    let verdict = result.verdict();

    let title = verdict_title(verdict, locale);
    let title = if color {
        match verdict {
            Verdict::Infected => title.red().bold().to_string(),
            Verdict::Healthy => title.green().bold().to_string(),
            Verdict::NoFlowerDetected => title.yellow().bold().to_string(),
        }
    } else {
        title.to_string()
    };

    let flower = match result.found_flower {
        Some(true) => copy.yes,
        Some(false) => copy.no,
        None => copy.unknown,
    };

    let advice = match verdict {
        Verdict::Infected => copy.advice_infected,
        Verdict::Healthy => copy.advice_healthy,
        Verdict::NoFlowerDetected => copy.advice_no_flower,
    };

    let mut out = String::new();
    out.push_str(&title);
    if verdict != Verdict::NoFlowerDetected {
        out.push('\n');
        out.push_str(&format!(
            "{}: {}",
            copy.confidence,
            format_confidence(result.confidence)
        ));
    }
    out.push('\n');
    out.push_str(&format!("{}: {}", copy.flower, flower));
    out.push('\n');
    out.push_str(advice);
    out
}

/// Human output followed by how the result was derived.
pub fn render_explained(report: &Normalization, locale: Locale, color: bool) -> String {
    let mut out = render_human(&report.result, locale, color);
    let heading = if color {
        "Derivation:".bold().cyan().to_string()
    } else {
        "Derivation:".to_string()
    };
    out.push_str("\n\n");
    out.push_str(&heading);
    out.push_str(&format!("\n  contract = {}", report.contract));
    out.push_str(&format!("\n  recognized = {}", report.recognized));
    if let Some(summary) = &report.summary {
        out.push_str(&format!("\n  detections = {}", summary.detections));
        out.push_str(&format!("\n  infected = {}", summary.infected));
        out.push_str(&format!(
            "\n  max_infected_confidence = {}",
            summary.max_infected_confidence
        ));
        out.push_str(&format!(
            "\n  max_healthy_confidence = {}",
            summary.max_healthy_confidence
        ));
    }
    out
}
