//! Startup check of the configured Tailwind documents.

use crate::error::FrontendError;
use std::path::PathBuf;
use tally_derive::api_model;
use tally_tailwind::{TailwindConfig, ValidationReport, load_all};
use tracing::{error, info, warn};

#[api_model(rename_all = "snake_case")]
#[derive(Clone)]
pub struct ProblemBody {
    pub field: String,
    pub message: String,
}

/// One configured document as the server saw it at startup.
#[api_model(rename_all = "snake_case")]
#[derive(Clone)]
pub struct TailwindReport {
    pub path: String,
    /// The parsed document in its JSON form; absent when it failed to load.
    #[schema(value_type = Object)]
    pub document: Option<TailwindConfig>,
    pub problems: Vec<ProblemBody>,
    /// Why the document failed to load.
    pub error: Option<String>,
}

impl TailwindReport {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.error.is_none() && self.problems.is_empty()
    }
}

/// Loads and validates every document; with `strict` the first broken one is fatal.
///
/// # Errors
/// [`FrontendError::Tailwind`] in strict mode.
pub fn check_documents(
    paths: &[PathBuf],
    strict: bool,
) -> Result<Vec<TailwindReport>, FrontendError> {
    let mut reports = Vec::with_capacity(paths.len());

    for loaded in load_all(paths) {
        let path = loaded.path.display().to_string();
        let report = match loaded.result {
            Ok(document) => {
                let problems =
                    document.validate().err().map(|r| problem_bodies(&r)).unwrap_or_default();
                TailwindReport { path, document: Some(document), problems, error: None }
            },
            Err(err) => TailwindReport {
                path,
                document: None,
                problems: Vec::new(),
                error: Some(err.to_string()),
            },
        };

        if report.is_healthy() {
            info!(path = %report.path, "Tailwind document loaded");
        } else if strict {
            error!(path = %report.path, "Tailwind document rejected");
            return Err(FrontendError::Tailwind {
                message: describe(&report).into(),
                context: Some(report.path.into()),
            });
        } else {
            warn!(path = %report.path, detail = %describe(&report), "Tailwind document has problems");
        }
        reports.push(report);
    }

    Ok(reports)
}

fn problem_bodies(report: &ValidationReport) -> Vec<ProblemBody> {
    report
        .problems()
        .iter()
        .map(|p| ProblemBody { field: p.field.clone(), message: p.message.clone() })
        .collect()
}

fn describe(report: &TailwindReport) -> String {
    report.error.clone().unwrap_or_else(|| {
        let problems: Vec<_> =
            report.problems.iter().map(|p| format!("{}: {}", p.field, p.message)).collect();
        problems.join("; ")
    })
}
