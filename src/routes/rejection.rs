use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;
use crate::submission::RecordId;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Context {
    Aggregate,
    Data,
    Download,
    Report { id: RecordId },
    Submit,
}

impl Context {
    pub fn aggregate() -> Context {
        Context::Aggregate
    }

    pub fn data() -> Context {
        Context::Data
    }

    pub fn download() -> Context {
        Context::Download
    }

    pub fn report(id: RecordId) -> Context {
        Context::Report { id }
    }

    pub fn submit() -> Context {
        Context::Submit
    }
}
