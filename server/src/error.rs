use actix_web::HttpResponse;
use taskboard_types::Envelope;

/// Message sent with an accepted submission.
pub const CORRECT_ANSWER: &str = "Correct answer.";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid request.")]
    InvalidRequest(#[from] serde_json::Error),
    #[error("Invalid team code.")]
    InvalidTeamCode,
    #[error("Task not found.")]
    TaskNotFound,
    #[error("Task is locked.")]
    TaskLocked,
    #[error("Task already completed.")]
    TaskCompleted,
    #[error("Integrity check failed.")]
    IntegrityCheck,
    #[error("Wrong answer.")]
    WrongAnswer,
    #[error("std io")]
    StdIO(#[from] std::io::Error),
    #[error("std parse int")]
    StdParseInt(#[from] std::num::ParseIntError),
    #[error("{0}")]
    Internal(String),
}

impl From<Error> for HttpResponse {
    fn from(value: Error) -> Self {
        match value {
            Error::StdIO(_) | Error::StdParseInt(_) | Error::Internal(_) => {
                log::error!("{:?}", value);
                HttpResponse::InternalServerError().finish()
            }
            // application errors travel inside a normal response
            _ => HttpResponse::Ok().json(Envelope::error(value.to_string())),
        }
    }
}
