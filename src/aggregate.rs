//! Totals over every stored submission, used for the survey charts.

use serde::Serialize;

use crate::emission::Emission;
use crate::submission::StoredRecord;
use crate::survey::ParticipantType;
use crate::transport::{efficiency_table, ModeFactor, TransportMode};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Aggregate {
    /// Journey-to-the-city emissions per transport mode. Local travel is
    /// not included here.
    pub per_mode_totals: Vec<ModeTotal>,

    /// Full emission totals per participant type.
    pub per_participant_type_totals: Vec<ParticipantTypeTotal>,

    pub static_efficiency_table: Vec<ModeFactor>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModeTotal {
    pub mode: TransportMode,
    pub total: Emission,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParticipantTypeTotal {
    pub participant_type: ParticipantType,
    pub total: Emission,
}

/// Sums the stored submissions by transport mode and by participant type.
///
/// Only modes and types that occur in `records` are listed, in the order
/// the form offers them. Submissions whose journey used an unlisted mode
/// have no bucket and are left out of the per-mode totals.
pub fn aggregate(records: &[StoredRecord]) -> Aggregate {
    let per_mode_totals = TransportMode::KNOWN
        .iter()
        .filter_map(|mode| {
            let matching = records
                .iter()
                .filter(|record| &record.input.principal_mode == mode)
                .collect::<Vec<_>>();

            if matching.is_empty() {
                None
            } else {
                Some(ModeTotal {
                    mode: mode.clone(),
                    total: matching.iter().map(|r| r.principal_emission()).sum(),
                })
            }
        })
        .collect();

    let per_participant_type_totals = ParticipantType::ALL
        .iter()
        .filter_map(|&participant_type| {
            let matching = records
                .iter()
                .filter(|record| record.input.participant_type == participant_type)
                .collect::<Vec<_>>();

            if matching.is_empty() {
                None
            } else {
                Some(ParticipantTypeTotal {
                    participant_type,
                    total: matching.iter().map(|r| r.emission_total).sum(),
                })
            }
        })
        .collect();

    Aggregate {
        per_mode_totals,
        per_participant_type_totals,
        static_efficiency_table: efficiency_table(),
    }
}
