use anyhow::Result;
use serde_json::json;

use pillroutine::db::Database;
use pillroutine::models::config::Config;
use pillroutine::output;

pub fn run(human: bool) -> Result<()> {
    let config = Config::load().unwrap_or_default();
    config.save()?;

    let db = Database::open(&Config::db_path())?;
    let mut scheduler = super::scheduler(&db, &config);
    let permission = scheduler.initialize()?;

    if human {
        println!("Config initialized at {:?}", Config::path());
        println!(
            "Notification channel '{}' ready (permission: {:?})",
            config.notifications.channel_id, permission
        );
    } else {
        let out = output::success(
            "init",
            json!({
                "config_path": Config::path(),
                "db_path": Config::db_path(),
                "channel_id": config.notifications.channel_id,
                "permission": permission,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
