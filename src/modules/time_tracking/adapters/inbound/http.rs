// HTTP inbound adapter: JSON endpoints over the application controller.
//
// Purpose
// - Let a front end draw the ticket list and calendar, and forward user gestures.
//
// Responsibilities
// - Translate request bodies into controller calls and outcomes into status codes.
// - Answer confirmations from the request and return alerts in the response.
// - Report unexpected failures to the error banner.
//
// Boundaries
// - Handlers hold the controller lock for the whole call and never await while holding it.

use crate::modules::time_tracking::adapters::outbound::csv_export::{LOGS_FILE_NAME, TICKETS_FILE_NAME};
use crate::modules::time_tracking::adapters::outbound::recording_prompt::RecordingPrompt;
use crate::modules::time_tracking::application::calendar_adapter::{EditorSave, GestureOutcome};
use crate::modules::time_tracking::application::controller::FilterUpdate;
use crate::modules::time_tracking::application::error_banner::UNEXPECTED_ERROR;
use crate::modules::time_tracking::application::errors::ApplicationError;
use crate::modules::time_tracking::application::event_store::DeleteOutcome;
use crate::modules::time_tracking::core::ports::CalendarWidget;
use crate::modules::time_tracking::core::snap::Interval;
use crate::modules::time_tracking::core::ticket::TicketPatch;
use crate::shell::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct GestureResponse {
    #[serde(flatten)]
    outcome: GestureOutcome,
    alerts: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn gesture_response(outcome: GestureOutcome, prompt: &RecordingPrompt) -> Response {
    let status = match &outcome {
        GestureOutcome::Created { .. } => StatusCode::CREATED,
        GestureOutcome::Updated { .. } | GestureOutcome::Removed { .. } => StatusCode::OK,
        GestureOutcome::Reverted { .. } => StatusCode::CONFLICT,
        GestureOutcome::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        GestureOutcome::Ignored => StatusCode::NOT_FOUND,
    };
    let body = GestureResponse {
        outcome,
        alerts: prompt.alerts(),
    };
    (status, Json(body)).into_response()
}

fn error_response(status: StatusCode, error: &ApplicationError) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn unprocessable() -> Response {
    StatusCode::UNPROCESSABLE_ENTITY.into_response()
}

pub async fn list_tickets(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.lock().await.ticket_list())
}

#[derive(Deserialize)]
pub struct CreateTicketBody {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub title: String,
}

pub async fn create_ticket(
    State(state): State<AppState>,
    body: Result<Json<CreateTicketBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return unprocessable();
    };
    match state.controller.lock().await.create_ticket(&body.key, &body.title) {
        Some(ticket) => (StatusCode::CREATED, Json(ticket)).into_response(),
        None => unprocessable(),
    }
}

pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<TicketPatch>, JsonRejection>,
) -> Response {
    let Ok(Json(patch)) = body else {
        return unprocessable();
    };
    let patch = TicketPatch { id, ..patch };
    match state.controller.lock().await.update_ticket(&patch) {
        Ok(ticket) => Json(ticket).into_response(),
        Err(error) => error_response(StatusCode::NOT_FOUND, &error),
    }
}

pub async fn select_ticket(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut controller = state.controller.lock().await;
    match controller.select_ticket(&id) {
        Ok(()) => Json(controller.ticket_list()).into_response(),
        Err(error) => error_response(StatusCode::NOT_FOUND, &error),
    }
}

#[derive(Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Response {
    let prompt = RecordingPrompt::answering(query.confirm);
    let outcome = state.controller.lock().await.delete_ticket(&id, &prompt);
    let status = match outcome {
        DeleteOutcome::NotFound => StatusCode::NOT_FOUND,
        DeleteOutcome::Cancelled | DeleteOutcome::Deleted { .. } => StatusCode::OK,
    };
    (status, Json(outcome)).into_response()
}

pub async fn add_log(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let prompt = RecordingPrompt::default();
    let outcome = state.controller.lock().await.add_log(&id, Utc::now());
    gesture_response(outcome, &prompt)
}

pub async fn get_filters(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.lock().await.user_settings().clone())
}

pub async fn update_filters(
    State(state): State<AppState>,
    body: Result<Json<FilterUpdate>, JsonRejection>,
) -> Response {
    let Ok(Json(update)) = body else {
        return unprocessable();
    };
    let mut controller = state.controller.lock().await;
    Json(controller.update_filters(update).clone()).into_response()
}

#[derive(Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub term: String,
}

/// Applies the search term after the debounce delay; a newer term cancels a pending one.
pub async fn search(State(state): State<AppState>, body: Result<Json<SearchBody>, JsonRejection>) -> Response {
    let Ok(Json(SearchBody { term })) = body else {
        return unprocessable();
    };
    let controller = state.controller.clone();
    let scheduled = match state.search.lock() {
        Ok(mut debouncer) => {
            debouncer.call(move || async move {
                controller.lock().await.set_search_term(&term);
            });
            true
        }
        Err(_) => false,
    };
    if !scheduled {
        state
            .controller
            .lock()
            .await
            .report_error(UNEXPECTED_ERROR, &"search is unavailable after an earlier failure");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    StatusCode::ACCEPTED.into_response()
}

pub async fn list_events(State(state): State<AppState>) -> impl IntoResponse {
    let controller = state.controller.lock().await;
    let events: Vec<_> = controller.calendar().widget().events().into_iter().cloned().collect();
    Json(events)
}

#[derive(Deserialize)]
pub struct RangeBody {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub async fn select_range(State(state): State<AppState>, body: Result<Json<RangeBody>, JsonRejection>) -> Response {
    let Some(range) = body.ok().and_then(|Json(body)| Interval::new(body.start, body.end)) else {
        return unprocessable();
    };
    let prompt = RecordingPrompt::default();
    let outcome = state.controller.lock().await.select_range(range, &prompt, Utc::now());
    gesture_response(outcome, &prompt)
}

pub async fn click_event(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if state.controller.lock().await.click_event(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

pub async fn drop_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<RangeBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return unprocessable();
    };
    let prompt = RecordingPrompt::default();
    let outcome = state
        .controller
        .lock()
        .await
        .drop_event(&id, body.start, body.end, Utc::now());
    gesture_response(outcome, &prompt)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeBody {
    #[serde(default)]
    pub start_delta_minutes: i64,
    #[serde(default)]
    pub end_delta_minutes: i64,
}

pub async fn resize_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ResizeBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return unprocessable();
    };
    let (Some(start_delta), Some(end_delta)) = (
        Duration::try_minutes(body.start_delta_minutes),
        Duration::try_minutes(body.end_delta_minutes),
    ) else {
        return unprocessable();
    };
    let prompt = RecordingPrompt::default();
    let outcome = state
        .controller
        .lock()
        .await
        .resize_event(&id, start_delta, end_delta, Utc::now());
    gesture_response(outcome, &prompt)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTicketBody {
    pub ticket_id: String,
    pub at: DateTime<Utc>,
}

pub async fn drop_ticket(
    State(state): State<AppState>,
    body: Result<Json<DropTicketBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return unprocessable();
    };
    let prompt = RecordingPrompt::default();
    let outcome = state
        .controller
        .lock()
        .await
        .drop_ticket(&body.ticket_id, body.at, Utc::now());
    gesture_response(outcome, &prompt)
}

pub async fn open_editor(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.controller.lock().await.open_editor(&id) {
        Some(request) => Json(request).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn save_editor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<EditorSave>, JsonRejection>,
) -> Response {
    let Ok(Json(save)) = body else {
        return unprocessable();
    };
    let save = EditorSave { id, ..save };
    let prompt = RecordingPrompt::default();
    let outcome = state.controller.lock().await.save_editor(&save, &prompt, Utc::now());
    gesture_response(outcome, &prompt)
}

pub async fn delete_event(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let prompt = RecordingPrompt::default();
    let outcome = state.controller.lock().await.delete_event(&id);
    gesture_response(outcome, &prompt)
}

fn csv_download(file_name: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        body,
    )
        .into_response()
}

pub async fn export_logs(State(state): State<AppState>) -> Response {
    let csv = state.controller.lock().await.export_logs_csv();
    csv_download(LOGS_FILE_NAME, csv)
}

pub async fn export_tickets(State(state): State<AppState>) -> Response {
    let csv = state.controller.lock().await.export_tickets_csv();
    csv_download(TICKETS_FILE_NAME, csv)
}

pub async fn import_tickets(State(state): State<AppState>, body: String) -> Response {
    let mut controller = state.controller.lock().await;
    match controller.import_tickets_csv(&body) {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => {
            controller.report_error("Import failed:", &error);
            error_response(StatusCode::BAD_REQUEST, &error)
        }
    }
}

pub async fn list_errors(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.lock().await.errors().messages().to_vec())
}

pub async fn clear_errors(State(state): State<AppState>) -> StatusCode {
    state.controller.lock().await.clear_errors();
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod time_tracking_http_inbound_tests {
    use crate::shared::infrastructure::key_value_store::STORE_NAMESPACE;
    use crate::shared::infrastructure::key_value_store::in_memory::InMemoryKeyValueStore;
    use crate::shell::config::Config;
    use crate::shell::http::router;
    use crate::shell::state::{AppState, build_state};
    use axum::{
        Router,
        body::Body,
        http::{Request, Response, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    #[fixture]
    async fn before_each() -> (Router, AppState) {
        let store = Arc::new(InMemoryKeyValueStore::new(STORE_NAMESPACE));
        let (state, writer) = build_state(store, &Config::default()).await;
        tokio::spawn(writer.run());
        (router(state.clone()), state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn text_body(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn create_ticket(app: &Router, key: &str, title: &str) -> String {
        let response = send(app, "POST", "/tickets", Some(json!({"key": key, "title": title}))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["id"].as_str().unwrap().to_string()
    }

    async fn create_block(app: &Router, start: &str, end: &str) -> String {
        let response = send(app, "POST", "/calendar/select", Some(json!({"start": start, "end": end}))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["block"]["id"].as_str().unwrap().to_string()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_create_and_list_tickets(#[future] before_each: (Router, AppState)) {
        let (app, _) = before_each.await;
        create_ticket(&app, "https://acme.zendesk.com/agent/tickets/4711", "Printer").await;

        let response = send(&app, "GET", "/tickets", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["rows"][0]["key"], "4711");
        assert_eq!(json["rows"][0]["link"], "https://zendesk.com/agent/tickets/4711");
        assert_eq!(json["rows"][0]["active"], true);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_422_for_an_empty_ticket_form(#[future] before_each: (Router, AppState)) {
        let (app, _) = before_each.await;
        let response = send(&app, "POST", "/tickets", Some(json!({"key": " ", "title": ""}))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app
            .clone()
            .oneshot(
                Request::post("/tickets")
                    .header("content-type", "application/json")
                    .body(Body::from("not-json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_update_and_select_tickets(#[future] before_each: (Router, AppState)) {
        let (app, _) = before_each.await;
        let id = create_ticket(&app, "4711", "Printer").await;
        create_ticket(&app, "4712", "Scanner").await;

        let response = send(&app, "PATCH", &format!("/tickets/{id}"), Some(json!({"note": "call back"}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["note"], "call back");

        let response = send(&app, "POST", &format!("/tickets/{id}/select"), None).await;
        let json = json_body(response).await;
        assert_eq!(json["rows"][1]["expanded"], true);
        assert_eq!(json["rows"][1]["note"], "call back");

        let response = send(&app, "PATCH", "/tickets/missing", Some(json!({"note": "x"}))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_only_delete_a_ticket_when_confirmed(#[future] before_each: (Router, AppState)) {
        let (app, _) = before_each.await;
        let id = create_ticket(&app, "4711", "Printer").await;
        create_block(&app, "2024-03-04T09:00:00Z", "2024-03-04T10:00:00Z").await;

        let response = send(&app, "DELETE", &format!("/tickets/{id}"), None).await;
        assert_eq!(json_body(response).await["outcome"], "cancelled");

        let response = send(&app, "DELETE", &format!("/tickets/{id}?confirm=true"), None).await;
        let json = json_body(response).await;
        assert_eq!(json["outcome"], "deleted");
        assert_eq!(json["removedTimeBlockIds"].as_array().unwrap().len(), 1);

        let response = send(&app, "DELETE", &format!("/tickets/{id}?confirm=true"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_alert_when_selecting_a_range_without_a_ticket(#[future] before_each: (Router, AppState)) {
        let (app, _) = before_each.await;
        let response = send(
            &app,
            "POST",
            "/calendar/select",
            Some(json!({"start": "2024-03-04T09:00:00Z", "end": "2024-03-04T10:00:00Z"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["alerts"][0], "Select a ticket first to add a time block.");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_snap_dropped_blocks_and_mirror_them_on_the_calendar(#[future] before_each: (Router, AppState)) {
        let (app, _) = before_each.await;
        create_ticket(&app, "4711", "Printer").await;
        create_block(&app, "2024-03-04T09:00:00Z", "2024-03-04T10:00:00Z").await;
        let moving = create_block(&app, "2024-03-04T13:00:00Z", "2024-03-04T13:30:00Z").await;

        let response = send(
            &app,
            "POST",
            &format!("/calendar/events/{moving}/drop"),
            Some(json!({"start": "2024-03-04T10:05:00Z", "end": "2024-03-04T10:35:00Z"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["snapped"], true);
        assert_eq!(json["block"]["start"], "2024-03-04T10:00:00Z");

        let events = json_body(send(&app, "GET", "/calendar/events", None).await).await;
        let mirrored = events.as_array().unwrap().iter().find(|e| e["id"] == moving.as_str()).unwrap();
        assert_eq!(mirrored["end"], "2024-03-04T10:30:00Z");
        assert_eq!(mirrored["extendedProps"]["ticketKey"], "4711");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_resize_edit_and_delete_blocks(#[future] before_each: (Router, AppState)) {
        let (app, _) = before_each.await;
        create_ticket(&app, "4711", "Printer").await;
        let id = create_block(&app, "2024-03-04T09:00:00Z", "2024-03-04T10:00:00Z").await;

        let response = send(
            &app,
            "POST",
            &format!("/calendar/events/{id}/resize"),
            Some(json!({"endDeltaMinutes": 30})),
        )
        .await;
        assert_eq!(json_body(response).await["block"]["end"], "2024-03-04T10:30:00Z");

        let editor = json_body(send(&app, "GET", &format!("/calendar/events/{id}/editor"), None).await).await;
        assert_eq!(editor["ticketTitle"], "Printer");

        let response = send(
            &app,
            "PUT",
            &format!("/calendar/events/{id}/editor"),
            Some(json!({"title": "Printer", "start": "2024-03-04T10:00", "end": "2024-03-04T09:00"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["alerts"][0], "End time must be after the start time.");

        let response = send(&app, "DELETE", &format!("/calendar/events/{id}"), None).await;
        assert_eq!(json_body(response).await["outcome"], "removed");
        let response = send(&app, "GET", &format!("/calendar/events/{id}/editor"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_resize_deltas_that_leave_the_calendar(#[future] before_each: (Router, AppState)) {
        let (app, state) = before_each.await;
        create_ticket(&app, "4711", "Printer").await;
        let id = create_block(&app, "2024-03-04T09:00:00Z", "2024-03-04T10:00:00Z").await;
        let resize = format!("/calendar/events/{id}/resize");

        let response = send(&app, "POST", &resize, Some(json!({"endDeltaMinutes": i64::MAX}))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = send(&app, "POST", &resize, Some(json!({"endDeltaMinutes": 100_000_000_000_000_i64}))).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["outcome"], "reverted");

        let events = json_body(send(&app, "GET", "/calendar/events", None).await).await;
        assert_eq!(events[0]["end"], "2024-03-04T10:00:00Z");
        assert!(state.controller.lock().await.errors().messages().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_create_a_block_when_a_ticket_is_dropped_on_the_grid(#[future] before_each: (Router, AppState)) {
        let (app, _) = before_each.await;
        let ticket_id = create_ticket(&app, "4711", "Printer").await;
        let response = send(
            &app,
            "POST",
            "/calendar/drop-ticket",
            Some(json!({"ticketId": ticket_id, "at": "2024-03-04T14:00:00Z"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["block"]["end"], "2024-03-04T14:30:00Z");

        let response = send(&app, "POST", &format!("/tickets/{ticket_id}/logs"), None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_export_logs_as_csv(#[future] before_each: (Router, AppState)) {
        let (app, _) = before_each.await;
        create_ticket(&app, "4711", "Printer").await;
        create_block(&app, "2024-03-04T09:00:00Z", "2024-03-04T09:45:00Z").await;

        let response = send(&app, "GET", "/export/logs.csv", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"ticket-time-logs.csv\""
        );
        let csv = text_body(response).await;
        assert_eq!(
            csv,
            "Start,End,Minutes,TicketKey,Title,Notes\n\"2024-03-04T09:00:00.000Z\",\"2024-03-04T09:45:00.000Z\",45,\"4711\",\"Printer\",\"\""
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_import_tickets_and_report_bad_files(#[future] before_each: (Router, AppState)) {
        let (app, _) = before_each.await;
        let response = app
            .clone()
            .oneshot(
                Request::post("/import/tickets")
                    .body(Body::from("Ticket ID,Subject,Status\n4711,Printer,In Progress"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(json_body(response).await["created"], 1);

        let response = app
            .clone()
            .oneshot(Request::post("/import/tickets").body(Body::from("Id,Subject\n1,2")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let errors = json_body(send(&app, "GET", "/errors", None).await).await;
        assert_eq!(errors[0], "Import failed: missing required columns: status");
        let response = send(&app, "DELETE", "/errors", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_persist_filters(#[future] before_each: (Router, AppState)) {
        let (app, _) = before_each.await;
        let response = send(&app, "PUT", "/filters", Some(json!({"statusFilters": ["closed"]}))).await;
        assert_eq!(json_body(response).await["statusFilters"], json!(["closed"]));
        let response = send(&app, "GET", "/filters", None).await;
        assert_eq!(json_body(response).await["themePresetId"], "midnight");
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn it_should_apply_only_the_last_search_after_the_debounce(#[future] before_each: (Router, AppState)) {
        let (app, state) = before_each.await;
        create_ticket(&app, "4711", "Printer").await;
        create_ticket(&app, "4712", "Scanner").await;

        for term in ["p", "pr", "scan"] {
            let response = send(&app, "POST", "/search", Some(json!({"term": term}))).await;
            assert_eq!(response.status(), StatusCode::ACCEPTED);
        }
        assert_eq!(state.controller.lock().await.search_term(), "");

        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;

        assert_eq!(state.controller.lock().await.search_term(), "scan");
        let json = json_body(send(&app, "GET", "/tickets", None).await).await;
        assert_eq!(json["rows"].as_array().unwrap().len(), 1);
        assert_eq!(json["rows"][0]["key"], "4712");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_report_a_search_that_cannot_be_scheduled(#[future] before_each: (Router, AppState)) {
        let (app, state) = before_each.await;
        let search = state.search.clone();
        let _ = std::thread::spawn(move || {
            let _guard = search.lock().unwrap();
            panic!("debouncer poisoned");
        })
        .join();

        let response = send(&app, "POST", "/search", Some(json!({"term": "scan"}))).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let errors = json_body(send(&app, "GET", "/errors", None).await).await;
        assert_eq!(errors[0], "Unexpected error: search is unavailable after an earlier failure");
    }
}
