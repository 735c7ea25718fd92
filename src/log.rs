use std::sync::Mutex;

use slog::Drain;
use slog::{o, Fuse, Level, Logger};
use slog_async::Async;
use slog_json::Json;

use crate::info;

/// Creates the root logger, writing JSON lines to stderr for every record
/// at `level` or above.
pub fn initialize_logger(level: Level) -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = Async::new(drain).build().filter_level(level).fuse();

    Logger::root(
        drain,
        o!("version" => info::VERSION, "revision" => info::REVISION, "build_timestamp" => info::BUILD_TIMESTAMP),
    )
}
