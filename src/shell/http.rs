use axum::{
    Json, Router,
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde_json::json;
use std::any::Any;
use tower_http::catch_panic::{CatchPanicLayer, ResponseForPanic};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::modules::time_tracking::adapters::inbound::http as tracker_http;
use crate::modules::time_tracking::application::error_banner::UNEXPECTED_ERROR;
use crate::shell::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tickets", get(tracker_http::list_tickets).post(tracker_http::create_ticket))
        .route(
            "/tickets/{id}",
            patch(tracker_http::update_ticket).delete(tracker_http::delete_ticket),
        )
        .route("/tickets/{id}/select", post(tracker_http::select_ticket))
        .route("/tickets/{id}/logs", post(tracker_http::add_log))
        .route("/filters", get(tracker_http::get_filters).put(tracker_http::update_filters))
        .route("/search", post(tracker_http::search))
        .route("/calendar/events", get(tracker_http::list_events))
        .route("/calendar/select", post(tracker_http::select_range))
        .route("/calendar/drop-ticket", post(tracker_http::drop_ticket))
        .route("/calendar/events/{id}", delete(tracker_http::delete_event))
        .route("/calendar/events/{id}/click", post(tracker_http::click_event))
        .route("/calendar/events/{id}/drop", post(tracker_http::drop_event))
        .route("/calendar/events/{id}/resize", post(tracker_http::resize_event))
        .route(
            "/calendar/events/{id}/editor",
            get(tracker_http::open_editor).put(tracker_http::save_editor),
        )
        .route("/export/logs.csv", get(tracker_http::export_logs))
        .route("/export/tickets.csv", get(tracker_http::export_tickets))
        .route("/import/tickets", post(tracker_http::import_tickets))
        .route("/errors", get(tracker_http::list_errors).delete(tracker_http::clear_errors))
        .with_state(state.clone())
        .layer(catch_panics(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub fn catch_panics(state: AppState) -> CatchPanicLayer<ReportPanic> {
    CatchPanicLayer::custom(ReportPanic { state })
}

/// Turns a handler panic into a 500 and an error banner entry.
#[derive(Clone)]
pub struct ReportPanic {
    state: AppState,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

impl ResponseForPanic for ReportPanic {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, payload: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let message = panic_message(payload.as_ref());
        // Guards held by the panicking handler are released while unwinding.
        match self.state.controller.try_lock() {
            Ok(mut controller) => controller.report_error(UNEXPECTED_ERROR, &message),
            Err(_) => {
                let controller = self.state.controller.clone();
                let message = message.clone();
                tokio::spawn(async move {
                    controller.lock().await.report_error(UNEXPECTED_ERROR, &message);
                });
            }
        }
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("{UNEXPECTED_ERROR} {message}") })),
        )
            .into_response()
    }
}
