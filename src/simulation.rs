//! Batch diagnostics: resolve a list of questions and report coverage.

use serde::Serialize;
use std::fmt;

use crate::conversation::ConversationContext;
use crate::system::FaqSystem;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SimulationRow {
    pub question: String,
    pub matched: Option<String>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub rows: Vec<SimulationRow>,
}

impl SimulationReport {
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn matched(&self) -> usize {
        self.rows.iter().filter(|r| r.matched.is_some()).count()
    }

    /// Share of questions that resolved to an entry, as a rounded percentage.
    pub fn accuracy(&self) -> u32 {
        if self.rows.is_empty() {
            return 0;
        }
        (self.matched() as f64 / self.total() as f64 * 100.0).round() as u32
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Report:")?;
        for (i, row) in self.rows.iter().enumerate() {
            match &row.matched {
                Some(id) => writeln!(f, "{}. \"{}\" -> {} ✅", i + 1, row.question, id)?,
                None => writeln!(f, "{}. \"{}\" -> No Match ❌", i + 1, row.question)?,
            }
        }
        write!(
            f,
            "Accuracy: {}% ({}/{})",
            self.accuracy(),
            self.matched(),
            self.total()
        )
    }
}

/// Splits a batch on commas and newlines, dropping blanks.
pub fn split_questions(batch: &str) -> Vec<String> {
    batch
        .split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves every question against the current catalogue with an empty context.
pub fn simulate(system: &FaqSystem, batch: &str) -> SimulationReport {
    let catalogue = system.catalogue();
    let context = ConversationContext::default();
    let rows = split_questions(batch)
        .into_iter()
        .map(|question| {
            let matched = system
                .resolver()
                .resolve(&question, &catalogue, &context)
                .entry()
                .map(|e| e.id.clone());
            SimulationRow { question, matched }
        })
        .collect();
    let report = SimulationReport { rows };
    log::info!(
        "Simulated {} questions, {}% matched",
        report.total(),
        report.accuracy()
    );
    report
}
