use actix_web::{get, web, HttpResponse, Responder};
use serde_json::value::to_raw_value;
use taskboard_types::{AnswerSubmission, Envelope, TaskList, TaskQuery, TaskSelector};

use crate::{
    board::Board,
    error::{Error, CORRECT_ANSWER},
};

/// Bodies are read as raw bytes so requests without a JSON content type are
/// accepted too.
pub async fn get_tasks(body: web::Bytes, board: web::Data<Board>) -> HttpResponse {
    respond(tasks(&body, &board).await)
}

pub async fn answer(body: web::Bytes, board: web::Data<Board>) -> HttpResponse {
    respond(submit(&body, &board).await)
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

async fn tasks(body: &[u8], board: &Board) -> Result<Envelope, Error> {
    let query: TaskQuery = serde_json::from_slice(body)?;
    match query.id {
        TaskSelector::All => {
            let task_list = board.task_list(&query.teamcode).await?;
            Ok(Envelope::success(Some(to_raw_value(&TaskList { task_list })?)))
        }
        TaskSelector::Task(id) => {
            let (detail, hash) = board.task_detail(&query.teamcode, &id).await?;
            let mut envelope = Envelope::success(Some(to_raw_value(&detail)?));
            envelope.hash = Some(hash);
            Ok(envelope)
        }
    }
}

async fn submit(body: &[u8], board: &Board) -> Result<Envelope, Error> {
    let submission: AnswerSubmission = serde_json::from_slice(body)?;
    board.submit(&submission).await?;
    let mut envelope = Envelope::success(None);
    envelope.message = Some(CORRECT_ANSWER.to_string());
    Ok(envelope)
}

fn respond(result: Result<Envelope, Error>) -> HttpResponse {
    match result {
        Ok(envelope) => HttpResponse::Ok().json(envelope),
        Err(err) => {
            log::warn!("{}", err);
            err.into()
        }
    }
}
