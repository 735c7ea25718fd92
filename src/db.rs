use futures::future::BoxFuture;

use crate::emission::Emission;
use crate::errors::BackendError;
use crate::submission::{RecordId, StoredRecord, SubmissionInput};

pub mod memory;

/// The persistent store of submissions. Records are only ever inserted.
pub trait Db {
    /// Stores a submission with its total, assigning an ID and a creation
    /// time. Either the whole record is written or nothing is.
    fn insert(
        &self,
        input: SubmissionInput,
        total: Emission,
    ) -> BoxFuture<'_, Result<StoredRecord, BackendError>>;

    /// Returns every record in ID order.
    fn list_all(&self) -> BoxFuture<'_, Result<Vec<StoredRecord>, BackendError>>;

    /// Returns the record with the given ID or [`BackendError::NotFound`].
    fn get(&self, id: RecordId) -> BoxFuture<'_, Result<StoredRecord, BackendError>>;
}

pub use self::memory::MemoryDb;
pub use self::postgres::*;

mod postgres {
    use std::convert::TryFrom;

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::postgres::{PgPool, PgRow};
    use time::OffsetDateTime;

    use crate::emission::Emission;
    use crate::errors::BackendError;
    use crate::submission::{RecordId, StoredRecord, SubmissionInput};
    use crate::survey::{Origin, ParticipantType};
    use crate::transport::TransportMode;

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }

        /// Creates the responses table if it does not exist yet.
        pub async fn initialize(&self) -> Result<(), BackendError> {
            sqlx::query(include_str!("queries/create_table.sql"))
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

            Ok(())
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn insert(
            &self,
            input: SubmissionInput,
            total: Emission,
        ) -> BoxFuture<'_, Result<StoredRecord, BackendError>> {
            async move {
                let event_days = i32::try_from(input.event_days)
                    .map_err(|_| BackendError::invalid("event_days", "is too large"))?;

                let query = sqlx::query_as(include_str!("queries/insert.sql"));

                let (id, created_at): (RecordId, OffsetDateTime) = query
                    .bind(input.email.as_str())
                    .bind(input.origin.as_str())
                    .bind(input.participant_type.as_str())
                    .bind(input.principal_mode.as_str())
                    .bind(input.principal_distance)
                    .bind(input.local_mode.as_str())
                    .bind(input.local_distance)
                    .bind(event_days)
                    .bind(total.centigrams())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(StoredRecord {
                    id,
                    input,
                    emission_total: total,
                    created_at,
                })
            }
            .boxed()
        }

        fn list_all(&self) -> BoxFuture<'_, Result<Vec<StoredRecord>, BackendError>> {
            async move {
                let records = sqlx::query(include_str!("queries/list_all.sql"))
                    .try_map(|row: PgRow| record_from_row(&row))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(records)
            }
            .boxed()
        }

        fn get(&self, id: RecordId) -> BoxFuture<'_, Result<StoredRecord, BackendError>> {
            async move {
                let record = sqlx::query(include_str!("queries/retrieve.sql"))
                    .bind(id)
                    .try_map(|row: PgRow| record_from_row(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                record.ok_or(BackendError::NotFound(id))
            }
            .boxed()
        }
    }

    fn record_from_row(row: &PgRow) -> Result<StoredRecord, sqlx::Error> {
        use sqlx::Row;

        let event_days: i32 = row.try_get("event_days")?;
        let event_days = u32::try_from(event_days).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        let input = SubmissionInput {
            email: row.try_get("email")?,
            origin: Origin::from(row.try_get::<String, _>("origin")?),
            participant_type: ParticipantType::from(row.try_get::<String, _>("participant_type")?),
            principal_mode: TransportMode::from(row.try_get::<String, _>("principal_mode")?),
            principal_distance: row.try_get("principal_distance")?,
            local_mode: TransportMode::from(row.try_get::<String, _>("local_mode")?),
            local_distance: row.try_get("local_distance")?,
            event_days,
        };

        Ok(StoredRecord {
            id: row.try_get("id")?,
            input,
            emission_total: Emission::from_centigrams(row.try_get("emission_total")?),
            created_at: row.try_get("created_at")?,
        })
    }

    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        BackendError::Sqlx { source: error }
    }
}
