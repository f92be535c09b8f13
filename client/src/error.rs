#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Please enter a valid team code!")]
    MissingTeamCode,
    #[error("serde json")]
    SerdeJson(#[from] serde_json::Error),
    #[error("std io")]
    StdIO(#[from] std::io::Error),
    #[error("reqwest")]
    Reqwest(#[from] reqwest::Error),
}
