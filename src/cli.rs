use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "pillroutine", version, about = "Medication routine reminders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as human-readable text instead of JSON
    #[arg(long = "human", short = 'H', global = true)]
    pub human: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write default config, create the database and notification channel
    Init,

    /// Create, inspect and cancel medication routines
    Routine {
        #[command(subcommand)]
        action: RoutineAction,
    },

    /// Inspect and manage registered notifications
    Notify {
        #[command(subcommand)]
        action: NotifyAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct RoutineArgs {
    /// Routine name, shown in the reminder body
    pub name: String,

    /// Comma-separated reminder times, 24-hour HH:MM (1 to 10)
    #[arg(long)]
    pub times: String,

    /// Active weekdays: mon,tue,... or daily, weekdays, weekends, none
    #[arg(long, default_value = "daily")]
    pub days: String,

    /// First day of the routine (default: today)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the routine (default: one year after start)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum RoutineAction {
    /// Create a routine and schedule its reminders
    Add {
        #[command(flatten)]
        args: RoutineArgs,

        /// Routine id (default: generated)
        #[arg(long)]
        id: Option<String>,
    },

    /// Show the triggers a routine would produce without registering them
    Preview {
        #[command(flatten)]
        args: RoutineArgs,
    },

    /// List routines
    List,

    /// Show a routine and its registered triggers
    Show {
        id: String,
    },

    /// Cancel a routine's reminders and delete it
    Cancel {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum NotifyAction {
    /// List registered triggers
    List,

    /// Show firings due in the next hours
    Upcoming {
        #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..=8760))]
        hours: u32,
    },

    /// Cancel every registered trigger
    CancelAll {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Display a reminder immediately
    Test {
        /// Routine name to show in the body
        name: String,
    },

    /// Cancel reminders of routines past their end date
    Sweep,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a config value
    Set {
        /// Config key (e.g. scheduling.on_duplicate, logging.level)
        key: String,
        /// Config value
        value: String,
    },
}
