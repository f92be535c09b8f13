use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use taskboard_practice::{routes, Board, Error};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TEAMS: &str = "ABC123";
const DEFAULT_TASKS: usize = 5;

#[actix_web::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let addr = std::env::var("PRACTICE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let teams = std::env::var("PRACTICE_TEAMS").unwrap_or_else(|_| DEFAULT_TEAMS.to_string());
    let task_count = match std::env::var("PRACTICE_TASKS") {
        Ok(count) => count.parse::<usize>()?,
        Err(_) => DEFAULT_TASKS,
    };
    let team_codes: Vec<&str> = teams
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .collect();
    if team_codes.is_empty() {
        return Err(Error::Internal("PRACTICE_TEAMS names no team".to_string()));
    }

    // fresh numbers on every run
    let seed = rand::random::<u64>();
    let board = web::Data::new(Board::seeded(&team_codes, task_count, seed));
    log::info!(
        "seeded {} tasks for {} team(s)",
        task_count,
        team_codes.len()
    );

    // launch server
    HttpServer::new(move || {
        log::info!("starting practice server");
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(create_cors())
            .app_data(board.clone())
            .configure(routes)
    })
    .bind(addr)?
    .run()
    .await
    .map_err(From::from)
}

/// Browser clients are served from another origin.
fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .max_age(3600)
}
