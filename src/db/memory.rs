use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};
use time::OffsetDateTime;

use crate::db::Db;
use crate::emission::Emission;
use crate::errors::BackendError;
use crate::submission::{RecordId, StoredRecord, SubmissionInput};

/// A store that keeps submissions in process memory. Used when no
/// database is configured, and in tests.
#[derive(Debug, Default)]
pub struct MemoryDb {
    records: RwLock<Vec<StoredRecord>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Db for MemoryDb {
    fn insert(
        &self,
        input: SubmissionInput,
        total: Emission,
    ) -> BoxFuture<'_, Result<StoredRecord, BackendError>> {
        async move {
            let mut records = self.records.write().map_err(|_| poisoned())?;

            // IDs are never reused, since records are never removed
            let record = StoredRecord {
                id: records.len() as RecordId + 1,
                input,
                emission_total: total,
                created_at: now_in_whole_seconds(),
            };
            records.push(record.clone());

            Ok(record)
        }
        .boxed()
    }

    fn list_all(&self) -> BoxFuture<'_, Result<Vec<StoredRecord>, BackendError>> {
        async move {
            let records = self.records.read().map_err(|_| poisoned())?;

            Ok(records.clone())
        }
        .boxed()
    }

    fn get(&self, id: RecordId) -> BoxFuture<'_, Result<StoredRecord, BackendError>> {
        async move {
            let records = self.records.read().map_err(|_| poisoned())?;

            records
                .iter()
                .find(|record| record.id == id)
                .cloned()
                .ok_or(BackendError::NotFound(id))
        }
        .boxed()
    }
}

// exports and JSON carry whole seconds only
fn now_in_whole_seconds() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(OffsetDateTime::now_utc().timestamp())
}

fn poisoned() -> BackendError {
    BackendError::StoreUnavailable("in-memory store lock poisoned".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export;
    use crate::survey::{Origin, ParticipantType};
    use crate::transport::TransportMode;

    fn input(email: &str) -> SubmissionInput {
        SubmissionInput {
            email: email.to_owned(),
            origin: Origin::from("Paraná"),
            participant_type: ParticipantType::Organization,
            principal_mode: TransportMode::Bus,
            principal_distance: 120.0,
            local_mode: TransportMode::BikeOrWalk,
            local_distance: 1.0,
            event_days: 2,
        }
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let db = MemoryDb::new();

        let first = db.insert(input("a@example.com"), Emission::from_grams(1.0)).await.unwrap();
        let second = db.insert(input("b@example.com"), Emission::from_grams(2.0)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.created_at >= first.created_at);
    }

    #[tokio::test]
    async fn retrieves_what_was_inserted() {
        let db = MemoryDb::new();

        let stored = db.insert(input("a@example.com"), Emission::from_grams(8040.0)).await.unwrap();

        assert_eq!(db.get(stored.id).await.unwrap(), stored);
        assert_eq!(db.list_all().await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn stored_records_survive_an_export() {
        let db = MemoryDb::new();

        db.insert(input("a@example.com"), Emission::from_grams(8040.0)).await.unwrap();
        let mut long_mode = input("b@example.com");
        long_mode.principal_mode = TransportMode::from("a".repeat(200).as_str());
        db.insert(long_mode, Emission::from_grams(1000.0)).await.unwrap();

        let records = db.list_all().await.unwrap();
        assert_eq!(records[0].created_at.nanosecond(), 0);

        let csv = export::to_string(&records).unwrap();
        assert_eq!(export::read_records(csv.as_bytes()).unwrap(), records);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let db = MemoryDb::new();

        let error = db.get(42).await.unwrap_err();

        assert!(matches!(error, BackendError::NotFound(42)));
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        assert!(MemoryDb::new().list_all().await.unwrap().is_empty());
    }
}
