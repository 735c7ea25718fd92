use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::emission::EmissionBreakdown;
use crate::report::Report;
use crate::submission::StoredRecord;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Choices {
        transport_modes: Vec<String>,
        participant_types: Vec<&'a str>,
        origins: &'a [&'a str],
    },
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
    Responses {
        responses: Vec<StoredRecord>,
    },
    Submission {
        record: StoredRecord,
        breakdown: EmissionBreakdown,
        report: Report,
        aggregate: Option<Aggregate>,
        report_path: String,
    },
}
