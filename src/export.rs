//! CSV export of every stored submission, and the matching reader.

use std::io;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::emission::Emission;
use crate::errors::BackendError;
use crate::submission::{RecordId, StoredRecord, SubmissionInput};
use crate::survey::{Origin, ParticipantType};
use crate::transport::TransportMode;

pub const FILE_NAME: &str = "co2_emissions_regatta.csv";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One line of the export, in column order.
#[derive(Debug, Deserialize, Serialize)]
struct Row {
    #[serde(rename = "ID")]
    id: RecordId,
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Origin")]
    origin: String,
    #[serde(rename = "ParticipantType")]
    participant_type: String,
    #[serde(rename = "PrincipalMode")]
    principal_mode: String,
    #[serde(rename = "PrincipalDistance")]
    principal_distance: f64,
    #[serde(rename = "LocalMode")]
    local_mode: String,
    #[serde(rename = "LocalDistance")]
    local_distance: f64,
    #[serde(rename = "EventDays")]
    event_days: u32,
    /// Grams, with two decimals.
    #[serde(rename = "Total")]
    total: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
}

impl From<&StoredRecord> for Row {
    fn from(record: &StoredRecord) -> Self {
        let input = &record.input;

        Row {
            id: record.id,
            email: input.email.clone(),
            origin: input.origin.as_str().to_owned(),
            participant_type: input.participant_type.as_str().to_owned(),
            principal_mode: input.principal_mode.as_str().to_owned(),
            principal_distance: input.principal_distance,
            local_mode: input.local_mode.as_str().to_owned(),
            local_distance: input.local_distance,
            event_days: input.event_days,
            total: record.emission_total.to_string(),
            timestamp: record.created_at.format(TIMESTAMP_FORMAT),
        }
    }
}

impl Row {
    fn into_record(self) -> Result<StoredRecord, BackendError> {
        let grams: f64 = self
            .total
            .parse()
            .map_err(|_| BackendError::invalid("Total", format!("{:?} is not a number", self.total)))?;

        let created_at = PrimitiveDateTime::parse(&self.timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| BackendError::invalid("Timestamp", e.to_string()))?
            .assume_utc();

        Ok(StoredRecord {
            id: self.id,
            input: SubmissionInput {
                email: self.email,
                origin: Origin::from(self.origin),
                participant_type: ParticipantType::from(self.participant_type),
                principal_mode: TransportMode::from(self.principal_mode),
                principal_distance: self.principal_distance,
                local_mode: TransportMode::from(self.local_mode),
                local_distance: self.local_distance,
                event_days: self.event_days,
            },
            emission_total: Emission::from_grams(grams),
            created_at,
        })
    }
}

/// Writes a header line followed by one line per record.
pub fn write_records<W: io::Write>(writer: W, records: &[StoredRecord]) -> Result<(), BackendError> {
    let mut writer = csv::Writer::from_writer(writer);

    for record in records {
        writer
            .serialize(Row::from(record))
            .map_err(|source| BackendError::Csv { source })?;
    }

    // with no rows serde never sees a struct, so the header is written by hand
    if records.is_empty() {
        writer
            .write_record(&HEADER)
            .map_err(|source| BackendError::Csv { source })?;
    }

    writer
        .flush()
        .map_err(|e| BackendError::Csv { source: e.into() })?;

    Ok(())
}

pub const HEADER: [&str; 11] = [
    "ID",
    "Email",
    "Origin",
    "ParticipantType",
    "PrincipalMode",
    "PrincipalDistance",
    "LocalMode",
    "LocalDistance",
    "EventDays",
    "Total",
    "Timestamp",
];

pub fn to_string(records: &[StoredRecord]) -> Result<String, BackendError> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, records)?;

    String::from_utf8(buffer).map_err(|e| BackendError::Csv {
        source: csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)),
    })
}

/// Reads records back from an export.
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<StoredRecord>, BackendError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    reader
        .deserialize::<Row>()
        .map(|row| row.map_err(|source| BackendError::Csv { source })?.into_record())
        .collect()
}

#[cfg(test)]
mod tests {
    use time::{Date, OffsetDateTime};

    use super::*;
    use crate::emission::compute;
    use crate::survey::FOREIGN_SENTINEL;

    fn records() -> Vec<StoredRecord> {
        let created_at = Date::try_from_ymd(2025, 3, 14)
            .unwrap()
            .try_with_hms(9, 26, 53)
            .unwrap()
            .assume_utc();

        let inputs = vec![
            SubmissionInput {
                email: "helm, crew@example.com".to_owned(),
                origin: Origin::from(FOREIGN_SENTINEL),
                participant_type: ParticipantType::RaceCommittee,
                principal_mode: TransportMode::Ferry,
                principal_distance: 12.75,
                local_mode: TransportMode::from("helicopter"),
                local_distance: 0.3,
                event_days: 5,
            },
            SubmissionInput {
                email: "rio@example.com".to_owned(),
                origin: Origin::from("Rio de Janeiro"),
                participant_type: ParticipantType::ServiceProvider,
                principal_mode: TransportMode::Motorcycle,
                principal_distance: 33.3,
                local_mode: TransportMode::BikeOrWalk,
                local_distance: 4.0,
                event_days: 2,
            },
        ];

        inputs
            .into_iter()
            .enumerate()
            .map(|(i, input)| StoredRecord {
                id: i as RecordId + 1,
                emission_total: compute(&input).unwrap().total,
                input,
                created_at,
            })
            .collect()
    }

    #[test]
    fn header_follows_column_order() {
        let csv = to_string(&records()).unwrap();

        assert_eq!(
            csv.lines().next(),
            Some("ID,Email,Origin,ParticipantType,PrincipalMode,PrincipalDistance,LocalMode,LocalDistance,EventDays,Total,Timestamp")
        );
    }

    #[test]
    fn rows_are_flat_serializations() {
        let csv = to_string(&records()).unwrap();
        let second = csv.lines().nth(2).unwrap();

        assert_eq!(
            second,
            "2,rio@example.com,Rio de Janeiro,Service provider,motorcycle,33.3,bike/walk,4.0,2,2680.65,2025-03-14 09:26:53"
        );
    }

    #[test]
    fn exported_records_read_back_unchanged() {
        let records = records();
        let csv = to_string(&records).unwrap();

        let read = read_records(csv.as_bytes()).unwrap();

        assert_eq!(read, records);
    }

    #[test]
    fn empty_export_has_only_a_header() {
        let csv = to_string(&[]).unwrap();

        assert_eq!(csv.lines().count(), 1);
        assert!(read_records(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn malformed_totals_are_refused() {
        let csv = "ID,Email,Origin,ParticipantType,PrincipalMode,PrincipalDistance,LocalMode,LocalDistance,EventDays,Total,Timestamp\n\
                   1,a@example.com,Bahia,Sailor,car,1,car,1,1,lots,2025-03-14 09:26:53\n";

        assert!(read_records(csv.as_bytes()).is_err());
    }

    #[test]
    fn unix_epoch_timestamps_round_trip() {
        let mut records = records();
        records[0].created_at = OffsetDateTime::unix_epoch();

        assert_eq!(read_records(to_string(&records).unwrap().as_bytes()).unwrap(), records);
    }
}
