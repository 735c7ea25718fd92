use std::convert::TryFrom;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::emission::{self, Emission};
use crate::errors::BackendError;
use crate::normalization;
use crate::survey::{Origin, ParticipantType};
use crate::transport::TransportMode;

/// An ID in the store.
pub type RecordId = i64;

/// The form fields exactly as submitted, before any validation.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSubmission {
    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub email: Option<String>,

    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub origin: Option<String>,

    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub participant_type: Option<String>,

    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub principal_mode: Option<String>,

    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub principal_distance: Option<String>,

    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub local_mode: Option<String>,

    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub local_distance: Option<String>,

    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub event_days: Option<String>,
}

impl RawSubmission {
    /// Validates every field, refusing anything that cannot be computed
    /// with. Unknown participant types and transport modes are accepted.
    pub fn parse(self) -> Result<SubmissionInput, BackendError> {
        let email = required("email", self.email)?;
        let origin = Origin::from(required("origin", self.origin)?);
        let participant_type = self
            .participant_type
            .map(ParticipantType::from)
            .unwrap_or(ParticipantType::Other);

        let principal_mode = TransportMode::from(required("principal_mode", self.principal_mode)?);
        let principal_distance = parse_distance("principal_distance", self.principal_distance)?;

        let local_mode = TransportMode::from(required("local_mode", self.local_mode)?);
        let local_distance = parse_distance("local_distance", self.local_distance)?;
        let event_days = parse_days(self.event_days)?;

        Ok(SubmissionInput {
            email,
            origin,
            participant_type,
            principal_mode,
            principal_distance,
            local_mode,
            local_distance,
            event_days,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, BackendError> {
    value.ok_or_else(|| BackendError::invalid(field, "is required"))
}

fn parse_distance(field: &'static str, value: Option<String>) -> Result<f64, BackendError> {
    let raw = required(field, value)?;
    let distance: f64 = raw
        .parse()
        .map_err(|_| BackendError::invalid(field, format!("{:?} is not a number", raw)))?;

    emission::check_distance(field, distance)?;

    Ok(distance)
}

fn parse_days(value: Option<String>) -> Result<u32, BackendError> {
    const FIELD: &str = "event_days";

    let raw = required(FIELD, value)?;
    let days: i64 = raw
        .parse()
        .map_err(|_| BackendError::invalid(FIELD, format!("{:?} is not a whole number", raw)))?;

    if days < 1 {
        return Err(BackendError::invalid(FIELD, "must be at least 1"));
    }

    u32::try_from(days).map_err(|_| BackendError::invalid(FIELD, "is too large"))
}

/// A validated submission, ready for calculation.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SubmissionInput {
    pub email: String,
    pub origin: Origin,
    pub participant_type: ParticipantType,

    /// How the participant reached the event city.
    pub principal_mode: TransportMode,

    /// Kilometres to the event city.
    pub principal_distance: f64,

    /// How the participant moved around the event city.
    pub local_mode: TransportMode,

    /// Kilometres travelled locally on each day.
    pub local_distance: f64,

    pub event_days: u32,
}

/// A submission as persisted, with its total and the store's ID and
/// creation time. Records are never modified after creation.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StoredRecord {
    pub id: RecordId,

    #[serde(flatten)]
    pub input: SubmissionInput,

    pub emission_total: Emission,

    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

impl StoredRecord {
    /// The local leg, recomputed from the stored inputs.
    pub fn local_emission(&self) -> Emission {
        emission::local_emission(
            &self.input.local_mode,
            self.input.local_distance,
            self.input.event_days,
        )
    }

    /// The principal leg, derived from the stored total so that the two
    /// legs always add up to it.
    pub fn principal_emission(&self) -> Emission {
        // only totals no submission could produce fail to subtract
        self.emission_total
            .checked_sub(self.local_emission())
            .unwrap_or(Emission::ZERO)
    }

    /// The part of the email address before the `@`.
    pub fn email_local_part(&self) -> &str {
        self.input
            .email
            .split('@')
            .next()
            .unwrap_or(&self.input.email)
    }
}
