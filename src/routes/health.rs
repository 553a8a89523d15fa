use crate::session::SessionSettings;
use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Health check endpoint
///
/// Reports liveness plus which session backend this process selected at
/// startup.
#[get("/health")]
pub async fn health(session: web::Data<SessionSettings>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "session_store": session.store.backend_name(),
        "timestamp": Utc::now()
    }))
}
