mod api;
mod autosubmit;
mod calculator;
mod config;
mod error;
mod manager;
mod map_solver;
mod poller;
mod shell;
mod store;

use std::sync::Arc;

use anyhow::Error;
use clap::{Parser, Subcommand};
use taskboard_types::Id;

use api::ApiClient;
use config::{Session, TeamCode};
use manager::{Action, Manager, Notice, ViewState};
use poller::{Poller, TerminalView};
use store::TeamCodeStore;

/// Poll, inspect and answer competition tasks for a team.
#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about, long_about = None)]
struct Cli {
    /// Base URL of the task server
    #[arg(long, env = "TASKBOARD_URL", value_name = "URL")]
    url: Option<String>,

    /// Team code, overrides the saved one
    #[arg(long, env = "TEAM_CODE", value_name = "CODE")]
    team: Option<String>,

    /// Delay between polls in milliseconds
    #[arg(long, env = "TASKBOARD_POLL_MS", value_name = "MS")]
    poll_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save the team code for later runs
    Team { code: String },

    /// List all tasks once
    Tasks,

    /// Keep the open/completed/locked board up to date until Ctrl-C
    Watch,

    /// Show the detail of one task
    Show { id: Id },

    /// Fetch a task, compute its answers and submit them
    Solve { id: Id },

    /// Drive the task view interactively from stdin
    Shell,

    /// Fetch one task and submit its answers immediately, logging the raw response
    Autosubmit {
        /// Task to submit [default: "2", sent as a string]
        #[arg(long)]
        task: Option<Id>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let cli = Cli::parse();

    let store = TeamCodeStore::from_env();
    if let Commands::Team { code } = &cli.command {
        let code = TeamCode::new(code.as_str());
        store.save(code.require()?)?;
        println!("Team Code saved successfully!");
        return Ok(());
    }

    let session = Session::resolve(cli.url, cli.team, cli.poll_ms, store.load()?);
    log::debug!("using {} with {:?}", session.base_url, session.team_code);
    let api = ApiClient::new(&session)?;

    match cli.command {
        Commands::Team { .. } => {}
        Commands::Tasks => {
            let manager = Manager::new(api, session);
            drive(&manager, [Action::LoadTasks]).await;
        }
        Commands::Show { id } => {
            let manager = Manager::new(api, session);
            drive(&manager, [Action::ViewTaskDetails(id)]).await;
        }
        Commands::Solve { id } => {
            let manager = Manager::new(api, session);
            drive(
                &manager,
                [Action::ViewTaskDetails(id), Action::SubmitTaskAnswers],
            )
            .await;
        }
        Commands::Watch => {
            let handle = Poller::start(Arc::new(api), &session, TerminalView)?;
            tokio::signal::ctrl_c().await?;
            handle.stop().await;
        }
        Commands::Shell => {
            let manager = Manager::new(api, session);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            shell::run(&manager, stdin).await?;
        }
        Commands::Autosubmit { task } => {
            let task = task.unwrap_or_else(autosubmit::default_task_id);
            let response = autosubmit::run(&api, &session, task).await?;
            println!("{}", response.message_or(&response.status));
        }
    }

    Ok(())
}

/// Apply actions in order, stopping at the first warning.
async fn drive<A: api::TaskApi>(
    manager: &Manager<A>,
    actions: impl IntoIterator<Item = Action>,
) -> ViewState {
    let mut state = ViewState::default();
    for action in actions {
        let transition = manager.apply(state.clone(), action).await;
        for line in manager::render(&state, &transition.state) {
            println!("{}", line);
        }
        state = transition.state;
        match transition.notice {
            Some(Notice::Info(message)) => println!("{}", message),
            Some(Notice::Warning(message)) => {
                eprintln!("{}", message);
                break;
            }
            None => {}
        }
    }
    state
}
