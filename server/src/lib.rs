//! A local stand-in for the competition task server.

mod board;
mod error;
mod handlers;

use actix_web::web;

pub use board::{integrity_hash, Board};
pub use error::Error;

/// Register the task endpoints. The app must carry `web::Data<Board>`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/gettasks.php").route(web::post().to(handlers::get_tasks)))
        .service(web::resource("/answer.php").route(web::post().to(handlers::answer)))
        .service(handlers::health);
}
