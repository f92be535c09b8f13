use std::fmt;

use serde_json::value::RawValue;
use taskboard_types::{Envelope, Id, TaskDetail, TaskList, TaskSelector, TaskSummary};

use crate::{
    api::{Submission, TaskApi, LOAD_DETAIL_FAILURE, LOAD_TASKS_FAILURE, SUBMIT_FAILURE},
    calculator::AnswerCache,
    config::Session,
};

pub const SUBMIT_SUCCESS: &str = "Answers submitted successfully!";

/// The task whose detail is currently shown, with the exact payload and
/// hash the server sent for it.
#[derive(Debug, Clone)]
pub struct SelectedTask {
    pub detail: TaskDetail,
    pub original_data: Box<RawValue>,
    pub original_hash: Option<String>,
}

impl SelectedTask {
    pub(crate) fn from_envelope(envelope: &Envelope) -> Option<Self> {
        let original_data = envelope.data.clone()?;
        let detail: TaskDetail = match envelope.decode() {
            Ok(detail) => detail,
            Err(err) => {
                log::error!("task detail: {:?}", err);
                return None;
            }
        };
        // top-level hash wins over one embedded in the task
        let original_hash = envelope.hash.clone().or_else(|| detail.hash.clone());
        Some(SelectedTask {
            detail,
            original_data,
            original_hash,
        })
    }

    fn same_as(&self, other: &SelectedTask) -> bool {
        self.detail == other.detail
            && self.original_data.get() == other.original_data.get()
            && self.original_hash == other.original_hash
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Listed,
    Detailed,
}

/// Everything the task/answer view shows.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub tasks: Option<Vec<TaskSummary>>,
    pub selected: Option<SelectedTask>,
}

impl ViewState {
    pub fn phase(&self) -> Phase {
        match (&self.tasks, &self.selected) {
            (_, Some(_)) => Phase::Detailed,
            (Some(_), None) => Phase::Listed,
            (None, None) => Phase::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadTasks,
    ViewTaskDetails(Id),
    SubmitTaskAnswers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Info(message) | Notice::Warning(message) => f.write_str(message),
        }
    }
}

#[derive(Debug)]
pub struct Transition {
    pub state: ViewState,
    pub notice: Option<Notice>,
}

impl Transition {
    fn quiet(state: ViewState) -> Self {
        Transition {
            state,
            notice: None,
        }
    }

    fn warn(state: ViewState, message: impl Into<String>) -> Self {
        Transition {
            state,
            notice: Some(Notice::Warning(message.into())),
        }
    }
}

/// Drives the task/answer view: each action takes the current state and
/// produces the next one.
pub struct Manager<A> {
    api: A,
    session: Session,
    answers: AnswerCache,
}

impl<A: TaskApi> Manager<A> {
    pub fn new(api: A, session: Session) -> Self {
        Manager {
            api,
            session,
            answers: AnswerCache::default(),
        }
    }

    pub async fn apply(&self, state: ViewState, action: Action) -> Transition {
        let team_code = match self.session.team_code.require() {
            Ok(team_code) => team_code,
            Err(err) => return Transition::warn(state, err.to_string()),
        };
        match action {
            Action::LoadTasks => self.load_tasks(team_code, state).await,
            Action::ViewTaskDetails(id) => self.view_task_details(team_code, state, id).await,
            Action::SubmitTaskAnswers => self.submit_task_answers(team_code, state).await,
        }
    }

    async fn load_tasks(&self, team_code: &str, state: ViewState) -> Transition {
        let envelope = self.api.get_tasks(team_code, TaskSelector::All).await;
        if !envelope.is_success() {
            return Transition::warn(state, envelope.message_or(LOAD_TASKS_FAILURE));
        }
        match envelope.decode::<TaskList>() {
            Ok(list) => Transition::quiet(ViewState {
                tasks: Some(list.task_list),
                ..state
            }),
            Err(err) => {
                log::error!("task list: {:?}", err);
                Transition::warn(state, LOAD_TASKS_FAILURE)
            }
        }
    }

    async fn view_task_details(&self, team_code: &str, state: ViewState, id: Id) -> Transition {
        let envelope = self.api.get_tasks(team_code, TaskSelector::Task(id)).await;
        if !envelope.is_success() {
            return Transition::warn(state, envelope.message_or(LOAD_DETAIL_FAILURE));
        }
        match SelectedTask::from_envelope(&envelope) {
            Some(selected) => {
                log::info!("Task {:?}", selected.detail);
                Transition::quiet(ViewState {
                    selected: Some(selected),
                    ..state
                })
            }
            None => Transition::warn(state, LOAD_DETAIL_FAILURE),
        }
    }

    async fn submit_task_answers(&self, team_code: &str, state: ViewState) -> Transition {
        let Some(selected) = state.selected.clone() else {
            return Transition::quiet(state);
        };
        let answers = self
            .answers
            .answers(&selected.original_data, &selected.detail.questions)
            .await;
        let submission = Submission {
            id: selected.detail.id,
            original_data: selected.original_data,
            original_hash: selected.original_hash,
            answers,
        };
        let envelope = self.api.submit_answers(team_code, submission).await;
        if !envelope.is_success() {
            return Transition::warn(state, envelope.message_or(SUBMIT_FAILURE));
        }
        Transition {
            state: ViewState {
                selected: None,
                ..state
            },
            notice: Some(Notice::Info(SUBMIT_SUCCESS.to_string())),
        }
    }
}

/// Lines describing what changed between two view states.
pub fn render(prev: &ViewState, next: &ViewState) -> Vec<String> {
    let mut lines = vec![];

    if let Some(tasks) = &next.tasks {
        if prev.tasks.as_ref() != Some(tasks) {
            lines.push(format!("Tasks ({})", tasks.len()));
            for task in tasks {
                lines.push(format!(
                    "  Task ID: {} - Points: {} - {:?}",
                    task.id, task.points, task.state
                ));
            }
        }
    }

    match (&prev.selected, &next.selected) {
        (Some(prev), Some(next)) if prev.same_as(next) => {}
        (_, Some(selected)) => {
            let detail = &selected.detail;
            lines.push(format!("Task {} ({} points)", detail.id, detail.points));
            for question in &detail.questions {
                let params = &question.params;
                if params.map.is_some() && params.kind.is_none() {
                    lines.push(format!("  Question {}: map", question.id));
                    continue;
                }
                let operand = |n: &Option<serde_json::Value>| {
                    n.as_ref().map(ToString::to_string).unwrap_or_else(|| "-".to_string())
                };
                lines.push(format!(
                    "  Question {}: {} {} {}",
                    question.id,
                    params.kind.as_deref().unwrap_or("-"),
                    operand(&params.number1),
                    operand(&params.number2)
                ));
            }
        }
        (Some(_), None) => lines.push("Selection cleared".to_string()),
        (None, None) => {}
    }

    lines
}
