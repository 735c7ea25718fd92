use std::sync::Arc;

use slog::Logger;

use crate::db::Db;
use crate::render::Renderer;

/// The handles every route needs.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<dyn Db + Send + Sync>,
    pub renderer: Arc<dyn Renderer>,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<dyn Db + Send + Sync>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            logger,
            db,
            renderer,
        }
    }
}
