mod cli;
mod cmd;

use clap::Parser;
use cli::{Cli, Commands, ConfigAction, NotifyAction, RoutineAction};
use pillroutine::models::config::Config;
use pillroutine::output;
use std::process;

fn main() {
    let cli = Cli::parse();

    let logging = Config::load().map(|c| c.logging).unwrap_or_default();
    pillroutine::diagnostics::init(&logging);

    let result = match cli.command {
        Commands::Init => cmd::init::run(cli.human),
        Commands::Routine { action } => match action {
            RoutineAction::Add { args, id } => cmd::routine::run_add(&args, id.as_deref(), cli.human),
            RoutineAction::Preview { args } => cmd::routine::run_preview(&args, cli.human),
            RoutineAction::List => cmd::routine::run_list(cli.human),
            RoutineAction::Show { id } => cmd::routine::run_show(&id, cli.human),
            RoutineAction::Cancel { id } => cmd::routine::run_cancel(&id, cli.human),
        },
        Commands::Notify { action } => match action {
            NotifyAction::List => cmd::notify::run_list(cli.human),
            NotifyAction::Upcoming { hours } => cmd::notify::run_upcoming(hours, cli.human),
            NotifyAction::CancelAll { yes } => cmd::notify::run_cancel_all(yes, cli.human),
            NotifyAction::Test { name } => cmd::notify::run_test(&name, cli.human),
            NotifyAction::Sweep => cmd::notify::run_sweep(cli.human),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => cmd::config::run_show(cli.human),
            ConfigAction::Set { key, value } => cmd::config::run_set(&key, &value),
        },
        Commands::Completions { shell } => cmd::completions::run(shell),
    };

    if let Err(e) = result {
        let err = output::error("", output::error_code(&e), &e.to_string());
        eprintln!("{}", serde_json::to_string(&err).unwrap());
        process::exit(1);
    }
}
