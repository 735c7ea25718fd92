use std::sync::Arc;

use slog::{debug, error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};
use warp::{Filter, Reply};

use crate::environment::Environment;
use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod rejection;
mod response;

use self::rejection::Context;

pub use internal::*;

/// Form submissions are a handful of short fields.
const MAX_FORM_LENGTH: u64 = 16 * 1024;

/// Combines every survey route, formatting failures as JSON.
pub fn make_routes(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();

    make_questionnaire_route(environment.clone())
        .or(make_submit_route(environment.clone()))
        .or(make_aggregate_route(environment.clone()))
        .or(make_data_route(environment.clone()))
        .or(make_download_route(environment.clone()))
        .or(make_report_route(environment.clone()))
        .or(make_report_download_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        return Ok(reply_with(&logger, r));
    }

    // forms the decoder cannot read never reach the submit handler
    if let Some(e) = rej.find::<warp::body::BodyDeserializeError>() {
        debug!(logger, "Undecodable form"; "error" => %e);
        let r = rejection::Rejection::new(Context::submit(), BackendError::MalformedFormSubmission);

        return Ok(reply_with(&logger, &r));
    }

    Err(rej)
}

fn reply_with(logger: &Logger, r: &rejection::Rejection) -> WithStatus<Json> {
    let e = &r.error;
    error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);

    with_status(json(&r.flatten()), status_code_for(e))
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        InvalidInput { .. } | MalformedFormSubmission => StatusCode::BAD_REQUEST,
        NotFound(..) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{body, get as g, path as p, path::param as par, post};

    use super::{handlers, MAX_FORM_LENGTH};
    use crate::environment::Environment;
    use crate::submission::{RawSubmission, RecordId};

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let $route_variable = warp::any().map(move || environment.clone());

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_questionnaire_route => questionnaire, rt; p("questionnaire"), end(), g());
    route!(make_submit_route => submit, rt; p("submit"), end(), post(), body::content_length_limit(MAX_FORM_LENGTH), body::form::<RawSubmission>());
    route!(make_data_route => data, rt; p("data"), end(), g());
    route!(make_aggregate_route => aggregate, rt; p("data"), p("aggregate"), end(), g());
    route!(make_download_route => download, rt; p("download"), end(), g());
    route!(make_report_route => report, rt; p("report"), par::<RecordId>(), end(), g());
    route!(make_report_download_route => download_report, rt; p("download-report"), par::<RecordId>(), end(), g());
}
