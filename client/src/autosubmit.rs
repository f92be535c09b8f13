use taskboard_types::{Envelope, Id, TaskSelector};

use crate::{
    api::{Submission, TaskApi, LOAD_DETAIL_FAILURE},
    calculator,
    config::Session,
    error::Error,
    manager::SelectedTask,
};

/// Task fetched when none is named. Sent as the JSON string `"2"`.
pub fn default_task_id() -> Id {
    Id::Text("2".to_string())
}

/// Fetch one task, answer it and submit straight away.
///
/// Returns the envelope of the last request made: the failed detail fetch,
/// or the server's verdict on the submission.
pub async fn run<A: TaskApi>(api: &A, session: &Session, task_id: Id) -> Result<Envelope, Error> {
    let team_code = session.team_code.require()?;

    let envelope = api.get_tasks(team_code, TaskSelector::Task(task_id)).await;
    log::info!("{}", serde_json::to_string(&envelope)?);
    if !envelope.is_success() {
        return Ok(envelope);
    }
    let Some(selected) = SelectedTask::from_envelope(&envelope) else {
        return Ok(Envelope::error(LOAD_DETAIL_FAILURE));
    };

    let submission = Submission {
        answers: calculator::answer_all(&selected.detail.questions),
        id: selected.detail.id,
        original_data: selected.original_data,
        original_hash: selected.original_hash,
    };
    let response = api.submit_answers(team_code, submission).await;
    log::info!("{}", serde_json::to_string(&response)?);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::fake::{Call, FakeApi},
        config::TeamCode,
    };

    fn session(code: &str) -> Session {
        Session::new("http://localhost", TeamCode::new(code))
    }

    #[tokio::test]
    async fn fetches_answers_and_submits() {
        let api = FakeApi::with_responses([
            r#"{"status":"success","data":{"ID":2,"questions":[
                {"ID":1,"params":{"type":"SUBTRACTION","number1":10,"number2":4}},
                {"ID":2,"params":{"type":"DIVISION","number1":10,"number2":4}}
            ]},"hash":"abc"}"#,
            r#"{"status":"success","message":"ok"}"#,
        ]);
        let response = run(&api, &session("be98b0b5"), default_task_id())
            .await
            .unwrap();
        assert!(response.is_success());

        let calls = api.calls();
        let Call::GetTasks(_, selector) = &calls[0] else {
            panic!("expected a fetch, got {:?}", calls[0]);
        };
        assert_eq!(selector, &TaskSelector::Task(Id::Text("2".to_string())));
        let query = serde_json::json!({"id": selector, "teamcode": "be98b0b5"});
        assert_eq!(query.to_string(), r#"{"id":"2","teamcode":"be98b0b5"}"#);
        let Call::Submit(code, submission) = &calls[1] else {
            panic!("expected a submission");
        };
        assert_eq!(code, "be98b0b5");
        assert_eq!(submission.original_hash.as_deref(), Some("abc"));
        assert_eq!(
            serde_json::to_string(&submission.answers).unwrap(),
            r#"[{"id":1,"answer":6},{"id":2,"answer":null}]"#
        );
    }

    #[tokio::test]
    async fn map_tasks_are_answered_with_city_pairs() {
        let api = FakeApi::with_responses([
            r#"{"status":"success","data":{"ID":"9","questions":[
                {"ID":4,"params":{"map":{"cities":[
                    {"name":"Gyor","position":{"x":0,"y":0},"distances":{"Sopron":3}},
                    {"name":"Sopron","position":{"x":0,"y":6},"distances":{"Gyor":12}}
                ]}}}
            ]},"hash":"abc"}"#,
            r#"{"status":"success"}"#,
        ]);
        run(&api, &session("x"), Id::Text("9".to_string())).await.unwrap();
        let Call::Submit(_, submission) = &api.calls()[1] else {
            panic!("expected a submission");
        };
        assert_eq!(submission.id, Id::Text("9".to_string()));
        assert_eq!(
            serde_json::to_string(&submission.answers).unwrap(),
            r#"[{"id":4,"answer":["Sopron","Gyor"]}]"#
        );
    }

    #[tokio::test]
    async fn failed_fetch_does_not_submit() {
        let api = FakeApi::with_responses([r#"{"status":"error","message":"Locked."}"#]);
        let response = run(&api, &session("x"), Id::Number(2)).await.unwrap();
        assert_eq!(response.message.as_deref(), Some("Locked."));
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn blank_team_code_is_an_error() {
        let api = FakeApi::default();
        let result = run(&api, &session(""), Id::Number(2)).await;
        assert!(matches!(result, Err(Error::MissingTeamCode)));
        assert!(api.calls().is_empty());
    }
}
