pub mod completions;
pub mod config;
pub mod init;
pub mod notify;
pub mod routine;

use pillroutine::core::clock::SystemClock;
use pillroutine::core::scheduler::{Scheduler, SchedulerSettings};
use pillroutine::db::Database;
use pillroutine::models::config::Config;
use pillroutine::platform::SqlitePlatform;

pub type CliScheduler<'db> = Scheduler<'db, SqlitePlatform<'db>, SystemClock>;

/// The one scheduler a command invocation works with.
pub fn scheduler<'db>(db: &'db Database, config: &Config) -> CliScheduler<'db> {
    Scheduler::new(
        db,
        SqlitePlatform::new(db, config.platform.notifications_allowed),
        SystemClock,
        SchedulerSettings::from_config(config),
    )
}
