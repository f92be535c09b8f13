use std::sync::Arc;

use taskboard_types::{TaskList, TaskSelector, TaskState, TaskSummary};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::{
    api::{TaskApi, LOAD_TASKS_FAILURE},
    config::Session,
    error::Error,
};

/// Tasks split by state, each bucket in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub open: Vec<TaskSummary>,
    pub completed: Vec<TaskSummary>,
    pub locked: Vec<TaskSummary>,
}

/// Split tasks into the three state buckets. Tasks in an unknown state are
/// left out.
pub fn partition(tasks: &[TaskSummary]) -> Buckets {
    let mut buckets = Buckets::default();
    for task in tasks {
        let bucket = match task.state {
            TaskState::Open => &mut buckets.open,
            TaskState::Completed => &mut buckets.completed,
            TaskState::Locked => &mut buckets.locked,
            TaskState::Unknown => continue,
        };
        bucket.push(task.clone());
    }
    buckets
}

/// Where the poller draws its output.
pub trait BoardView: Send + 'static {
    /// Replace the three rendered lists.
    fn render(&mut self, buckets: &Buckets);

    /// Show a notice to the user.
    fn notify(&mut self, message: &str);
}

/// Prints the board to stdout and notices to stderr.
#[derive(Debug, Default)]
pub struct TerminalView;

impl TerminalView {
    pub fn line(task: &TaskSummary) -> String {
        format!("Task ID: {} - Points: {}", task.id, task.points)
    }
}

impl BoardView for TerminalView {
    fn render(&mut self, buckets: &Buckets) {
        for (title, tasks) in [
            ("Open", &buckets.open),
            ("Completed", &buckets.completed),
            ("Locked", &buckets.locked),
        ] {
            println!("{} ({})", title, tasks.len());
            for task in tasks {
                println!("  {}", Self::line(task));
            }
        }
        println!();
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Handle to a running poll loop. Dropping it stops the loop too.
#[derive(Debug)]
pub struct PollHandle {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl PollHandle {
    /// Stop polling, abandoning a fetch in flight, and wait for the loop to exit.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(err) = self.handle.await {
            log::error!("poll loop: {:?}", err);
        }
    }
}

pub struct Poller;

impl Poller {
    /// Start polling the full task list.
    ///
    /// A blank team code fails immediately without issuing any request.
    pub fn start<A, V>(api: Arc<A>, session: &Session, mut view: V) -> Result<PollHandle, Error>
    where
        A: TaskApi + 'static,
        V: BoardView,
    {
        let team_code = session.team_code.require()?.to_string();
        let interval = session.poll_interval;
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            loop {
                log::info!("Getting tasks, teamcode: {}", team_code);

                // the next fetch starts only after this one settles
                let envelope = tokio::select! {
                    envelope = api.get_tasks(&team_code, TaskSelector::All) => envelope,
                    _ = &mut stop_rx => break,
                };
                Self::handle(&mut view, envelope);

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = &mut stop_rx => break,
                }
            }
            log::info!("stopped polling");
        });

        Ok(PollHandle { stop_tx, handle })
    }

    fn handle<V: BoardView>(view: &mut V, envelope: taskboard_types::Envelope) {
        if !envelope.is_success() {
            view.notify(&envelope.message_or(LOAD_TASKS_FAILURE));
            return;
        }
        match envelope.decode::<TaskList>() {
            Ok(list) => view.render(&partition(&list.task_list)),
            Err(err) => {
                log::error!("task list: {:?}", err);
                view.notify(LOAD_TASKS_FAILURE);
            }
        }
    }
}
