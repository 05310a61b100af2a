use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::Database;
use crate::error::Error;
use crate::models::*;
use crate::view::render::{self, Messages};
use crate::view::{Dashboard, StatusFilter, StatusFilterParams};

// ============================================================
// Error Handling
// ============================================================

/// Log a store error and turn it into the message shown on the page.
///
/// Validation problems are the user's to fix and only warrant a warning in
/// the log. Anything else is a failed store call.
fn report(e: &Error) -> String {
    let msg = e.to_string();
    if e.is_validation() {
        tracing::warn!("Validation error: {}", msg);
    } else {
        tracing::error!("Store error: {}", msg);
    }
    msg
}

/// Dashboard location for `owner` with the active status filter, carrying an
/// optional notice or error.
fn dashboard_url(
    owner: &str,
    filter: &StatusFilter,
    notice: Option<&str>,
    error: Option<&str>,
) -> String {
    let mut url = String::from("/");
    let mut sep = '?';
    let mut params = vec![("owner", Some(owner))];
    params.extend(filter.params().into_iter().map(|(k, v)| (k, Some(v))));
    params.extend([("notice", notice), ("error", error)]);
    for (key, value) in params {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            url.push(sep);
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            sep = '&';
        }
    }
    url
}

/// One render cycle: fetch the owner's tasks, derive the page and render it.
///
/// A failing fetch is shown on the page and the listing is treated as empty.
fn render_dashboard(
    db: &Database,
    owner: &str,
    filter: StatusFilter,
    mut messages: Messages,
) -> Html<String> {
    let tasks = if owner.is_empty() {
        Vec::new()
    } else {
        match db.list_tasks_by_owner(owner) {
            Ok(tasks) => tasks,
            Err(e) => {
                messages.error = Some(report(&e));
                Vec::new()
            }
        }
    };

    let dashboard = Dashboard::new(owner, tasks, filter);
    let today = chrono::Local::now().date_naive();
    Html(render::page(&dashboard, &messages, today))
}

// ============================================================
// Health
// ============================================================

pub async fn health(State(db): State<Database>) -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    match db.ping() {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ok", "version": version })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable", "version": version })),
            )
        }
    }
}

// ============================================================
// Dashboard
// ============================================================

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub owner: String,
    pub notice: Option<String>,
    pub error: Option<String>,
    #[serde(flatten)]
    pub filter: StatusFilterParams,
}

pub async fn dashboard(
    State(db): State<Database>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let messages = Messages {
        notice: query.notice.clone(),
        error: query.error.clone(),
        ..Default::default()
    };
    render_dashboard(
        &db,
        query.owner.trim(),
        StatusFilter::from(&query.filter),
        messages,
    )
}

// ============================================================
// Tasks
// ============================================================

#[derive(Debug, Deserialize)]
pub struct AddTaskForm {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub title: String,
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: String,
    #[serde(flatten)]
    pub filter: StatusFilterParams,
}

pub async fn add_task(State(db): State<Database>, Form(form): Form<AddTaskForm>) -> Response {
    let owner = form.owner.trim();
    let filter = StatusFilter::from(&form.filter);
    if owner.is_empty() {
        return Redirect::to("/").into_response();
    }

    let due_date = match NaiveDate::parse_from_str(form.due_date.trim(), "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            let e = Error::Validation("Please pick a due date.".to_string());
            return rejected(&db, owner, filter, &e);
        }
    };

    let input = CreateTaskInput {
        owner: owner.to_string(),
        title: form.title,
        priority: form
            .priority
            .as_deref()
            .and_then(TaskPriority::from_str)
            .unwrap_or_default(),
        due_date,
    };

    match db.create_task(input) {
        Ok(task) => {
            let notice = format!("Task '{}' added!", task.title);
            Redirect::to(&dashboard_url(owner, &filter, Some(&notice), None)).into_response()
        }
        Err(e) if e.is_validation() => rejected(&db, owner, filter, &e),
        Err(e) => {
            let msg = report(&e);
            Redirect::to(&dashboard_url(owner, &filter, None, Some(&msg))).into_response()
        }
    }
}

/// Re-render with a warning instead of submitting the form.
fn rejected(db: &Database, owner: &str, filter: StatusFilter, e: &Error) -> Response {
    let messages = Messages {
        warning: Some(report(e)),
        ..Default::default()
    };
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        render_dashboard(db, owner, filter, messages),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct SaveTaskForm {
    #[serde(default)]
    pub owner: String,
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(flatten)]
    pub filter: StatusFilterParams,
}

pub async fn save_task(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Form(form): Form<SaveTaskForm>,
) -> Redirect {
    let owner = form.owner.trim();
    let filter = StatusFilter::from(&form.filter);
    let input = UpdateTaskInput {
        title: form.title.map(|t| t.trim().to_string()),
        status: form.status.as_deref().and_then(TaskStatus::from_str),
        priority: form.priority.as_deref().and_then(TaskPriority::from_str),
    };

    match db.update_task(id, input) {
        Ok(()) => Redirect::to(&dashboard_url(owner, &filter, Some("Task updated!"), None)),
        Err(e) => {
            let msg = report(&e);
            Redirect::to(&dashboard_url(owner, &filter, None, Some(&msg)))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OwnerForm {
    #[serde(default)]
    pub owner: String,
    #[serde(flatten)]
    pub filter: StatusFilterParams,
}

pub async fn delete_task(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Form(form): Form<OwnerForm>,
) -> Redirect {
    let owner = form.owner.trim();
    let filter = StatusFilter::from(&form.filter);
    let deleted = db.get_task(id).and_then(|task| {
        db.delete_task(id)?;
        Ok(task)
    });

    match deleted {
        Ok(Some(task)) => {
            let notice = format!("Task '{}' deleted.", task.title);
            Redirect::to(&dashboard_url(owner, &filter, Some(&notice), None))
        }
        Ok(None) => Redirect::to(&dashboard_url(owner, &filter, None, None)),
        Err(e) => {
            let msg = report(&e);
            Redirect::to(&dashboard_url(owner, &filter, None, Some(&msg)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_url_encodes_values() {
        assert_eq!(
            dashboard_url("Alex Smith", &StatusFilter::all(), Some("Task 'x' added!"), None),
            "/?owner=Alex%20Smith&notice=Task%20%27x%27%20added%21"
        );
    }

    #[test]
    fn dashboard_url_without_owner_is_root() {
        let all = StatusFilter::all();
        assert_eq!(dashboard_url("", &all, None, None), "/");
        assert_eq!(dashboard_url("", &all, None, Some("boom")), "/?error=boom");
    }

    #[test]
    fn dashboard_url_keeps_a_narrowed_filter() {
        let filter = StatusFilter::only([TaskStatus::InProgress]);
        assert_eq!(
            dashboard_url("Alex", &filter, Some("Task updated!"), None),
            "/?owner=Alex&filter=1&in_progress=on&notice=Task%20updated%21"
        );
    }
}
