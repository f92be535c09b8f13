use std::collections::HashMap;

use rand::{rngs::StdRng, Rng, SeedableRng};
use sha3::{Digest, Sha3_256};
use taskboard_types::{
    AnswerEntry, AnswerSubmission, Id, Points, Question, QuestionParams, TaskDetail, TaskState,
    TaskSummary,
};
use tokio::sync::RwLock;

use crate::error::Error;

const ADDITION: &str = "ADDITION";
const SUBTRACTION: &str = "SUBTRACTION";

/// Holds every team's tasks.
pub struct Board {
    teams: RwLock<HashMap<String, Vec<TaskDetail>>>,
}

impl Board {
    pub fn new(teams: HashMap<String, Vec<TaskDetail>>) -> Self {
        Board {
            teams: RwLock::new(teams),
        }
    }

    /// A board where each team gets `task_count` arithmetic tasks. The first
    /// task is open, the rest are locked until their predecessor is solved.
    pub fn seeded(team_codes: &[&str], task_count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let teams = team_codes
            .iter()
            .map(|code| {
                let tasks = (1..=task_count as i64)
                    .map(|n| generate_task(&mut rng, n))
                    .collect();
                (code.to_string(), tasks)
            })
            .collect();
        Board::new(teams)
    }

    pub async fn task_list(&self, team_code: &str) -> Result<Vec<TaskSummary>, Error> {
        let teams = self.teams.read().await;
        let tasks = teams.get(team_code).ok_or(Error::InvalidTeamCode)?;
        Ok(tasks
            .iter()
            .map(|task| TaskSummary {
                id: task.id.clone(),
                points: task.points.clone(),
                state: task.state.unwrap_or(TaskState::Unknown),
            })
            .collect())
    }

    /// Detail of one task plus its integrity hash.
    pub async fn task_detail(&self, team_code: &str, id: &Id) -> Result<(TaskDetail, String), Error> {
        let teams = self.teams.read().await;
        let tasks = teams.get(team_code).ok_or(Error::InvalidTeamCode)?;
        let task = find(tasks, id).ok_or(Error::TaskNotFound)?;
        if task.state == Some(TaskState::Locked) {
            return Err(Error::TaskLocked);
        }
        let hash = integrity_hash(&serde_json::to_value(task)?);
        Ok((task.clone(), hash))
    }

    /// Check a submission and, if every answer is right, complete the task
    /// and unlock the next one.
    pub async fn submit(&self, submission: &AnswerSubmission) -> Result<(), Error> {
        let mut teams = self.teams.write().await;
        let tasks = teams
            .get_mut(&submission.teamcode)
            .ok_or(Error::InvalidTeamCode)?;
        let index = tasks
            .iter()
            .position(|task| same_id(&task.id, &submission.id))
            .ok_or(Error::TaskNotFound)?;

        let task = &tasks[index];
        match task.state {
            Some(TaskState::Locked) => return Err(Error::TaskLocked),
            Some(TaskState::Completed) => return Err(Error::TaskCompleted),
            _ => {}
        }

        // the echoed payload must be the current task, untouched
        let current = serde_json::to_value(task)?;
        let echoed: serde_json::Value = serde_json::from_str(submission.original_data.get())?;
        let hash = integrity_hash(&current);
        if echoed != current || submission.original_hash.as_deref() != Some(hash.as_str()) {
            return Err(Error::IntegrityCheck);
        }

        if !task
            .questions
            .iter()
            .all(|question| is_correct(question, &submission.answer_data))
        {
            return Err(Error::WrongAnswer);
        }

        log::info!("team {} completed task {}", submission.teamcode, task.id);
        tasks[index].state = Some(TaskState::Completed);
        if let Some(next) = tasks
            .iter_mut()
            .find(|task| task.state == Some(TaskState::Locked))
        {
            next.state = Some(TaskState::Open);
        }
        Ok(())
    }
}

/// Hex SHA3-256 of the canonical JSON encoding.
pub fn integrity_hash(value: &serde_json::Value) -> String {
    format!("{:x}", Sha3_256::digest(value.to_string().as_bytes()))
}

fn same_id(a: &Id, b: &Id) -> bool {
    a.to_string() == b.to_string()
}

fn find<'a>(tasks: &'a [TaskDetail], id: &Id) -> Option<&'a TaskDetail> {
    tasks.iter().find(|task| same_id(&task.id, id))
}

fn expected(params: &QuestionParams) -> Option<i64> {
    let a = params.number1.as_ref()?.as_i64()?;
    let b = params.number2.as_ref()?.as_i64()?;
    match params.kind.as_deref()? {
        ADDITION => a.checked_add(b),
        SUBTRACTION => a.checked_sub(b),
        _ => None,
    }
}

fn is_correct(question: &Question, answers: &[AnswerEntry]) -> bool {
    let given = answers
        .iter()
        .find(|entry| same_id(&entry.id, &question.id))
        .and_then(|entry| entry.answer.as_i64());
    given.is_some() && given == expected(&question.params)
}

fn generate_task(rng: &mut StdRng, n: i64) -> TaskDetail {
    let question_count = rng.gen_range(1..=3);
    let questions = (1..=question_count)
        .map(|q| {
            let kind = if rng.gen_bool(0.5) { ADDITION } else { SUBTRACTION };
            Question {
                id: Id::Number(n * 100 + q),
                params: QuestionParams {
                    kind: Some(kind.to_string()),
                    number1: Some(rng.gen_range(0..100i64).into()),
                    number2: Some(rng.gen_range(0..100i64).into()),
                    map: None,
                },
            }
        })
        .collect();
    TaskDetail {
        id: Id::Number(n),
        points: Points::from(rng.gen_range(1..=10i64)),
        state: Some(if n == 1 { TaskState::Open } else { TaskState::Locked }),
        questions,
        hash: None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::value::to_raw_value;

    use super::*;

    fn answers_for(task: &TaskDetail) -> Vec<AnswerEntry> {
        task.questions
            .iter()
            .map(|q| AnswerEntry {
                id: q.id.clone(),
                answer: expected(&q.params).map_or(serde_json::Value::Null, Into::into),
            })
            .collect()
    }

    fn submission(task: &TaskDetail, hash: &str, answers: Vec<AnswerEntry>) -> AnswerSubmission {
        AnswerSubmission {
            id: task.id.clone(),
            teamcode: "ABC123".to_string(),
            original_data: to_raw_value(task).unwrap(),
            original_hash: Some(hash.to_string()),
            answer_data: answers,
        }
    }

    #[test]
    fn seeding_is_deterministic() {
        let a = Board::seeded(&["ABC123"], 4, 7).teams.into_inner();
        let b = Board::seeded(&["ABC123"], 4, 7).teams.into_inner();
        assert_eq!(a, b);
        let tasks = &a["ABC123"];
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].state, Some(TaskState::Open));
        assert!(tasks[1..]
            .iter()
            .all(|t| t.state == Some(TaskState::Locked)));
    }

    #[test]
    fn hash_ignores_key_order() {
        let a: serde_json::Value = serde_json::from_str(r#"{"b":1,"a":[2,3]}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{ "a": [2,3], "b": 1 }"#).unwrap();
        assert_eq!(integrity_hash(&a), integrity_hash(&b));
        assert_eq!(integrity_hash(&a).len(), 64);
    }

    #[actix_web::test]
    async fn unknown_team_and_locked_task() {
        let board = Board::seeded(&["ABC123"], 2, 1);
        assert!(matches!(
            board.task_list("NOPE").await,
            Err(Error::InvalidTeamCode)
        ));
        assert!(matches!(
            board.task_detail("ABC123", &Id::Number(2)).await,
            Err(Error::TaskLocked)
        ));
        assert!(matches!(
            board.task_detail("ABC123", &Id::Number(9)).await,
            Err(Error::TaskNotFound)
        ));
    }

    #[actix_web::test]
    async fn correct_answers_complete_and_unlock() {
        let board = Board::seeded(&["ABC123"], 2, 1);
        let (task, hash) = board
            .task_detail("ABC123", &Id::Text("1".to_string()))
            .await
            .unwrap();
        board
            .submit(&submission(&task, &hash, answers_for(&task)))
            .await
            .unwrap();

        let states: Vec<_> = board
            .task_list("ABC123")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.state)
            .collect();
        assert_eq!(states, vec![TaskState::Completed, TaskState::Open]);

        // the old snapshot is now stale
        assert!(matches!(
            board.submit(&submission(&task, &hash, answers_for(&task))).await,
            Err(Error::TaskCompleted)
        ));
    }

    #[actix_web::test]
    async fn rejects_tampering_and_wrong_answers() {
        let board = Board::seeded(&["ABC123"], 1, 3);
        let (task, hash) = board.task_detail("ABC123", &Id::Number(1)).await.unwrap();

        assert!(matches!(
            board.submit(&submission(&task, "deadbeef", answers_for(&task))).await,
            Err(Error::IntegrityCheck)
        ));

        let mut tampered = task.clone();
        tampered.points = Points::from(100_i64);
        assert!(matches!(
            board
                .submit(&submission(&tampered, &hash, answers_for(&task)))
                .await,
            Err(Error::IntegrityCheck)
        ));

        let mut wrong = answers_for(&task);
        wrong[0].answer = serde_json::json!(-1000);
        assert!(matches!(
            board.submit(&submission(&task, &hash, wrong)).await,
            Err(Error::WrongAnswer)
        ));

        let mut missing = answers_for(&task);
        missing[0].answer = serde_json::Value::Null;
        assert!(matches!(
            board.submit(&submission(&task, &hash, missing)).await,
            Err(Error::WrongAnswer)
        ));

        let mut text = answers_for(&task);
        text[0].answer = serde_json::json!(["A", "B"]);
        assert!(matches!(
            board.submit(&submission(&task, &hash, text)).await,
            Err(Error::WrongAnswer)
        ));
    }
}
