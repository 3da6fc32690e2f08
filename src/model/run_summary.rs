use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use super::ingest_outcome::{ErrorCode, IngestOutcome};

/// Tally of a single run. Built up as files are processed and printed once at the end.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    pub skipped: usize,
    pub attempted: usize,
    pub ingested: usize,
    pub errors: BTreeMap<ErrorCode, usize>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &IngestOutcome) {
        match outcome {
            IngestOutcome::Skipped(_) => self.skipped += 1,
            IngestOutcome::Succeeded => {
                self.attempted += 1;
                self.ingested += 1;
            }
            IngestOutcome::Failed { code, .. } => {
                self.attempted += 1;
                *self.errors.entry(*code).or_insert(0) += 1;
            }
        }
    }

    pub fn failed(&self) -> usize {
        self.errors.values().sum()
    }

    /// The lines printed before submission starts.
    pub fn plan(skipped: usize, to_ingest: usize) -> String {
        format!(
            "Ignored {} file(s), because they were found in collection.\nIngesting {} file(s).",
            skipped, to_ingest
        )
    }
}

/// Renders the error tally, one line per distinct code.
impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (code, count) in &self.errors {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "The error code {} was returned {} time(s).", code, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ingest_outcome::SkipReason;

    fn failed(code: ErrorCode) -> IngestOutcome {
        IngestOutcome::Failed {
            code,
            message: "boom".into(),
        }
    }

    #[test]
    fn tallies_outcomes() {
        let mut summary = RunSummary::default();
        summary.record(&IngestOutcome::Skipped(SkipReason::AlreadyPresent));
        summary.record(&IngestOutcome::Succeeded);
        summary.record(&failed(ErrorCode::Service(400)));
        summary.record(&failed(ErrorCode::Service(400)));
        summary.record(&failed(ErrorCode::Unknown));

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.attempted, 4);
        assert_eq!(summary.ingested, 1);
        assert_eq!(summary.failed(), 3);
        assert_eq!(
            summary.to_string(),
            "The error code 400 was returned 2 time(s).\nThe error code UNKNOWN was returned 1 time(s)."
        );
    }

    #[test]
    fn clean_run_prints_nothing() {
        let mut summary = RunSummary::default();
        summary.record(&IngestOutcome::Succeeded);
        assert_eq!(summary.to_string(), "");
    }

    #[test]
    fn plan_lines() {
        assert_eq!(
            RunSummary::plan(2, 2),
            "Ignored 2 file(s), because they were found in collection.\nIngesting 2 file(s)."
        );
    }

    #[test]
    fn json_uses_codes_as_keys() {
        let mut summary = RunSummary::default();
        summary.record(&failed(ErrorCode::Service(429)));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["errors"]["429"], 1);
        assert_eq!(json["attempted"], 1);
    }
}
