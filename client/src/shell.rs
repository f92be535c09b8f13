use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    api::TaskApi,
    manager::{self, Action, Manager, Notice, ViewState},
};

#[derive(Debug, PartialEq)]
pub enum Command {
    Run(Action),
    State,
    Help,
    Quit,
}

pub const HELP: &str = "commands: load | view <id> | submit | state | help | quit";

/// Parse one line of shell input. Blank lines and unknown commands give `None`.
pub fn parse(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match (words.next()?, words.next()) {
        ("load", None) => Command::Run(Action::LoadTasks),
        ("view", Some(id)) => Command::Run(Action::ViewTaskDetails(id.parse().ok()?)),
        ("submit", None) => Command::Run(Action::SubmitTaskAnswers),
        ("state", None) => Command::State,
        ("help", None) => Command::Help,
        ("quit" | "exit", None) => Command::Quit,
        _ => return None,
    };
    match words.next() {
        Some(_) => None,
        None => Some(command),
    }
}

/// Read commands until `quit` or end of input, applying each action to the
/// view state and printing what changed.
pub async fn run<A, R>(manager: &Manager<A>, input: R) -> std::io::Result<ViewState>
where
    A: TaskApi,
    R: AsyncBufRead + Unpin,
{
    let mut state = ViewState::default();
    let mut lines = input.lines();
    println!("{}", HELP);
    while let Some(line) = lines.next_line().await? {
        match parse(&line) {
            Some(Command::Run(action)) => {
                let transition = manager.apply(state.clone(), action).await;
                for line in manager::render(&state, &transition.state) {
                    println!("{}", line);
                }
                match transition.notice {
                    Some(Notice::Info(message)) => println!("{}", message),
                    Some(Notice::Warning(message)) => eprintln!("{}", message),
                    None => {}
                }
                state = transition.state;
            }
            Some(Command::State) => println!("{:?}", state.phase()),
            Some(Command::Help) => println!("{}", HELP),
            Some(Command::Quit) => break,
            None if line.trim().is_empty() => {}
            None => eprintln!("unknown command: {}", line.trim()),
        }
    }
    Ok(state)
}
