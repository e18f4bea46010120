use log::LevelFilter;
use simplelog::{ConfigBuilder, SimpleLogger};

use crate::config::{self, AppConfig};

/// Production keeps the noise down; everywhere else debug output is on.
fn level_for(app_config: &AppConfig) -> LevelFilter {
    if app_config.is_prod() {
        LevelFilter::Info
    } else {
        LevelFilter::Debug
    }
}

pub fn setup_simple_logger() -> anyhow::Result<()> {
    let logger_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("notification_service")
        .build();

    Ok(SimpleLogger::init(
        level_for(&config::APP_CONFIG),
        logger_config,
    )?)
}
