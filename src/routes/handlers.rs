use std::time::{Duration, Instant};

use slog::{debug, o, warn};
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::aggregate::aggregate as aggregate_records;
use crate::emission::compute;
use crate::environment::Environment;
use crate::errors::BackendError;
use crate::export;
use crate::render::render_with_fallback;
use crate::report::compose;
use crate::routes::{
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::submission::{RawSubmission, RecordId, StoredRecord};
use crate::survey::{ParticipantType, ORIGINS};
use crate::transport::TransportMode;

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($body:block) => {{
        let start = Instant::now();

        // errors leave through `?` before the header is attached
        let result = $body;

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

pub async fn questionnaire(_environment: Environment) -> RouteResult {
    timed!({
        let transport_modes = TransportMode::KNOWN
            .iter()
            .map(|mode| mode.as_str().to_owned())
            .collect::<Vec<_>>();
        let participant_types = ParticipantType::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>();

        json(&SuccessResponse::Choices {
            transport_modes,
            participant_types,
            origins: &ORIGINS,
        })
    })
}

pub async fn submit(environment: Environment, form: RawSubmission) -> RouteResult {
    timed!({
        let Environment { logger, db, .. } = environment;
        let error_handler = |e: BackendError| Rejection::new(Context::submit(), e);

        debug!(logger, "Validating submission...");
        let input = form.parse().map_err(error_handler)?;

        debug!(logger, "Computing emissions...");
        let breakdown = compute(&input).map_err(error_handler)?;

        debug!(logger, "Writing submission to database...");
        let record = db
            .insert(input, breakdown.total)
            .await
            .map_err(error_handler)?;
        let logger = logger.new(o!("id" => record.id));

        // the record is committed, so a failed listing only drops the chart
        debug!(logger, "Aggregating submissions...");
        let aggregate = match db.list_all().await {
            Ok(records) => Some(aggregate_records(&records)),
            Err(e) => {
                warn!(logger, "Could not aggregate submissions"; "error" => %e);
                None
            }
        };

        let response = SuccessResponse::Submission {
            report: compose(&record),
            aggregate,
            report_path: format!("/download-report/{}", record.id),
            breakdown,
            record,
        };

        debug!(logger, "Sending response...");
        with_status(json(&response), StatusCode::CREATED)
    })
}

pub async fn data(environment: Environment) -> RouteResult {
    timed!({
        let responses = environment
            .db
            .list_all()
            .await
            .map_err(|e| Rejection::new(Context::data(), e))?;

        json(&SuccessResponse::Responses { responses })
    })
}

pub async fn aggregate(environment: Environment) -> RouteResult {
    timed!({
        let records = environment
            .db
            .list_all()
            .await
            .map_err(|e| Rejection::new(Context::aggregate(), e))?;

        json(&aggregate_records(&records))
    })
}

pub async fn download(environment: Environment) -> RouteResult {
    timed!({
        let error_handler = |e: BackendError| Rejection::new(Context::download(), e);

        let records = environment.db.list_all().await.map_err(error_handler)?;
        debug!(environment.logger, "Exporting submissions..."; "count" => records.len());
        let csv = export::to_string(&records).map_err(error_handler)?;

        with_header(
            with_header(csv, "content-type", "text/csv; charset=utf-8"),
            "content-disposition",
            format!("attachment; filename=\"{}\"", export::FILE_NAME),
        )
    })
}

pub async fn report(environment: Environment, id: RecordId) -> RouteResult {
    timed!({
        debug!(environment.logger, "Composing report..."; "id" => id);

        let record = environment
            .db
            .get(id)
            .await
            .map_err(|e| Rejection::new(Context::report(id), e))?;

        json(&compose(&record))
    })
}

pub async fn download_report(environment: Environment, id: RecordId) -> RouteResult {
    timed!({
        let error_handler = |e: BackendError| Rejection::new(Context::report(id), e);

        let record = environment.db.get(id).await.map_err(error_handler)?;

        debug!(environment.logger, "Rendering report..."; "id" => id);
        let renderer = environment.renderer.as_ref();
        let document = render_with_fallback(renderer, &environment.logger, &record)
            .map_err(|source| error_handler(BackendError::Render { source }))?;

        with_header(
            with_header(document, "content-type", renderer.content_type()),
            "content-disposition",
            format!(
                "attachment; filename=\"{}\"",
                report_file_name(&record, renderer.extension())
            ),
        )
    })
}

fn report_file_name(record: &StoredRecord, extension: &str) -> String {
    format!(
        "co2_emission_{}_{}.{}",
        file_name_safe(record.email_local_part()),
        record.created_at.format("%Y-%m-%d"),
        extension
    )
}

/// Replaces anything but ASCII letters, digits, dots, dashes and
/// underscores, so the name can sit in a quoted header parameter.
fn file_name_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
