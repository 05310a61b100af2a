//! Server-side HTML for the dashboard page.
//!
//! The page is rebuilt from scratch on every request. Every user-supplied
//! string passes through [`html_escape`].

use chrono::NaiveDate;

use super::{Dashboard, StatusFilter};
use crate::models::{Task, TaskPriority, TaskStatus};

pub const PAGE_TITLE: &str = "TaskMaster Pro";

const STYLE: &str = r#"
:root { --bg: #0e1117; --panel: #262730; --text: #fafafa; --muted: #a3a8b8; --accent: #ff4b4b; --ok: #4CAF50; --warn: #FFC107; }
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--text); display: flex; min-height: 100vh; }
aside { width: 320px; background: var(--panel); padding: 1.5rem; }
main { flex: 1; padding: 2rem 3rem; }
input, select, button { font: inherit; padding: .4rem .5rem; border-radius: 6px; border: 1px solid #444; background: #1a1c24; color: var(--text); }
button { cursor: pointer; }
button.primary { background: var(--accent); border-color: var(--accent); width: 100%; }
label { display: block; margin: .6rem 0 .2rem; color: var(--muted); }
aside input, aside select { width: 100%; }
.grid { display: grid; gap: 1rem; }
.grid-kpi { grid-template-columns: repeat(3, 1fr); }
.grid-split { grid-template-columns: 7fr 5fr; }
.card { background: var(--panel); border-radius: 8px; padding: 1rem; }
.stat-value { font-size: 2rem; font-weight: 600; }
.stat-label { color: var(--muted); }
.notice { padding: .75rem 1rem; border-radius: 6px; margin: .5rem 0; }
.notice-success { background: rgba(76, 175, 80, .2); }
.notice-warning { background: rgba(255, 193, 7, .2); }
.notice-error { background: rgba(244, 67, 54, .25); }
.notice-info { background: rgba(33, 150, 243, .2); }
.pie { width: 220px; height: 220px; border-radius: 50%; margin: 1rem auto; }
.legend { list-style: none; padding: 0; }
.legend li { margin: .25rem 0; }
.swatch { display: inline-block; width: .8rem; height: .8rem; border-radius: 2px; margin-right: .4rem; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: .4rem; border-bottom: 1px solid #333; }
form.task-row { display: grid; grid-template-columns: 4fr 2fr 2fr 1fr 1fr; gap: .5rem; margin: .4rem 0; }
form.filter label { display: inline-block; margin-right: 1rem; }
"#;

/// Transient messages shown above the dashboard.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    /// Outcome of the previous action, e.g. "Task updated!".
    pub notice: Option<String>,
    /// Rejected input; the form was not submitted.
    pub warning: Option<String>,
    /// A failed store call.
    pub error: Option<String>,
}

/// Render the whole page.
///
/// An empty owner disables every task view; only the name prompt is shown.
pub fn page(dashboard: &Dashboard, messages: &Messages, today: NaiveDate) -> String {
    let owner = dashboard.owner.as_str();
    let mut body = String::new();

    body.push_str(&sidebar(owner, &dashboard.filter, today));

    body.push_str("<main>");
    body.push_str("<h1>TaskMaster Dashboard</h1>");
    if owner.is_empty() {
        body.push_str("<p>Enter your full name in the sidebar to begin.</p>");
    } else {
        body.push_str(&format!(
            "<p>Managing tasks for: <strong>{}</strong></p>",
            html_escape(owner)
        ));
    }

    body.push_str(&messages_html(messages));

    if owner.is_empty() {
        body.push_str(&notice(
            "info",
            "Please enter your name in the sidebar to load your tasks.",
        ));
    }

    body.push_str(&kpis_html(dashboard));

    body.push_str(r#"<div class="grid grid-split">"#);
    body.push_str(&chart_html(dashboard));
    body.push_str(&deadlines_html(dashboard));
    body.push_str("</div>");

    body.push_str(&task_list_html(dashboard));
    body.push_str("</main>");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
<style>{}</style>
</head>
<body>{}</body>
</html>"#,
        PAGE_TITLE, STYLE, body
    )
}

fn sidebar(owner: &str, filter: &StatusFilter, today: NaiveDate) -> String {
    let mut html = String::from("<aside>");
    html.push_str(&format!(
        r#"<h2>User</h2>
<form method="get" action="/">
<label for="owner">Enter your name to see your tasks:</label>
<input id="owner" name="owner" value="{}" placeholder="e.g., Alex">
</form>"#,
        html_escape(owner)
    ));

    if !owner.is_empty() {
        html.push_str(&format!(
            r#"<h2>Add a New Task</h2>
<form method="post" action="/tasks">
<input type="hidden" name="owner" value="{owner}">{filter}
<label for="title">Task Name</label>
<input id="title" name="title" placeholder="e.g., Finish project report">
<label for="priority">Priority</label>
{priority}
<label for="due_date">Due Date</label>
<input id="due_date" type="date" name="due_date" value="{today}" required>
<p><button class="primary" type="submit">Add Task</button></p>
</form>"#,
            owner = html_escape(owner),
            filter = filter_fields(filter),
            priority = select(
                Some("priority"),
                "priority",
                priority_options(TaskPriority::default())
            ),
            today = today.format("%Y-%m-%d"),
        ));
    }

    html.push_str("</aside>");
    html
}

fn messages_html(messages: &Messages) -> String {
    let mut html = String::new();
    if let Some(text) = &messages.notice {
        html.push_str(&notice("success", text));
    }
    if let Some(text) = &messages.warning {
        html.push_str(&notice("warning", text));
    }
    if let Some(text) = &messages.error {
        html.push_str(&notice("error", text));
    }
    html
}

fn notice(kind: &str, text: &str) -> String {
    format!(
        r#"<div class="notice notice-{}">{}</div>"#,
        kind,
        html_escape(text)
    )
}

fn kpis_html(dashboard: &Dashboard) -> String {
    let kpis = dashboard.kpis;
    format!(
        r#"<h2>Project Overview</h2>
<div class="grid grid-kpi">
<div class="card stat"><div class="stat-value" id="kpi-total">{}</div><div class="stat-label">Total Tasks</div></div>
<div class="card stat"><div class="stat-value" id="kpi-completed">{}</div><div class="stat-label">Completed</div></div>
<div class="card stat"><div class="stat-value" id="kpi-pending">{}</div><div class="stat-label">Pending</div></div>
</div>"#,
        kpis.total, kpis.completed, kpis.pending
    )
}

/// Pie chart as a CSS conic gradient, one stop per non-empty status.
fn chart_html(dashboard: &Dashboard) -> String {
    let mut html = String::from(r#"<section class="card"><h2>Task Status Distribution</h2>"#);

    if dashboard.kpis.total == 0 {
        html.push_str(&notice(
            "info",
            "Add a task to see the status distribution chart.",
        ));
        html.push_str("</section>");
        return html;
    }

    let total = dashboard.kpis.total as f64;
    let mut stops = Vec::new();
    let mut legend = String::new();
    let mut start = 0.0;
    for slice in &dashboard.distribution {
        let share = slice.count as f64 / total * 100.0;
        let end = start + share;
        stops.push(format!(
            "{} {:.2}% {:.2}%",
            slice.status.color(),
            start,
            end
        ));
        legend.push_str(&format!(
            r#"<li data-status="{label}"><span class="swatch" style="background:{color}"></span>{label}: {count} ({share:.0}%)</li>"#,
            label = slice.status.as_str(),
            color = slice.status.color(),
            count = slice.count,
            share = share,
        ));
        start = end;
    }

    html.push_str(&format!(
        r#"<div class="pie" style="background: conic-gradient({})"></div><ul class="legend">{}</ul></section>"#,
        stops.join(", "),
        legend
    ));
    html
}

fn deadlines_html(dashboard: &Dashboard) -> String {
    let mut html = String::from(r#"<section class="card"><h2>Upcoming Deadlines</h2>"#);

    if dashboard.owner.is_empty() {
        html.push_str("</section>");
        return html;
    }
    if dashboard.kpis.pending == 0 || dashboard.deadlines.is_empty() {
        html.push_str(&notice("info", "No pending tasks with deadlines."));
        html.push_str("</section>");
        return html;
    }

    html.push_str(
        "<table id=\"deadlines\"><thead><tr><th>Task Name</th><th>Priority</th><th>Due Date</th></tr></thead><tbody>",
    );
    for deadline in &dashboard.deadlines {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            html_escape(&deadline.title),
            deadline.priority.as_str(),
            deadline.due_date.format("%Y-%m-%d")
        ));
    }
    html.push_str("</tbody></table></section>");
    html
}

fn task_list_html(dashboard: &Dashboard) -> String {
    let mut html = String::from("<section><h2>Manage Your Tasks</h2>");

    if dashboard.tasks.is_empty() {
        html.push_str(&notice(
            "info",
            "No tasks found. Add your first task from the sidebar!",
        ));
        html.push_str("</section>");
        return html;
    }

    html.push_str(&filter_form(&dashboard.owner, &dashboard.filter));

    let owner = html_escape(&dashboard.owner);
    let filter = filter_fields(&dashboard.filter);
    for task in dashboard.visible_tasks() {
        html.push_str(&task_row(task, &owner, &filter));
    }

    html.push_str("</section>");
    html
}

fn filter_form(owner: &str, filter: &StatusFilter) -> String {
    let mut boxes = String::new();
    for status in TaskStatus::ALL {
        boxes.push_str(&format!(
            r#"<label><input type="checkbox" name="{}"{}> {}</label>"#,
            status_param(status),
            if filter.contains(status) { " checked" } else { "" },
            status.as_str()
        ));
    }
    format!(
        r#"<form class="filter" method="get" action="/">
<input type="hidden" name="owner" value="{}">
<input type="hidden" name="filter" value="1">
<span>Filter by Status:</span> {}
<button type="submit">Apply</button>
</form>"#,
        html_escape(owner),
        boxes
    )
}

/// Hidden inputs carrying the active status filter through a form post.
fn filter_fields(filter: &StatusFilter) -> String {
    filter
        .params()
        .into_iter()
        .map(|(name, value)| format!(r#"<input type="hidden" name="{}" value="{}">"#, name, value))
        .collect()
}

fn task_row(task: &Task, escaped_owner: &str, filter_fields: &str) -> String {
    format!(
        r#"<form class="task-row" id="task-{id}" method="post" action="/tasks/{id}">
<input type="hidden" name="owner" value="{owner}">{filter}
<input name="title" value="{title}" aria-label="Task">
{status}
{priority}
<button type="submit">Save</button>
<button type="submit" formaction="/tasks/{id}/delete">Delete</button>
</form>"#,
        id = task.id,
        owner = escaped_owner,
        filter = filter_fields,
        title = html_escape(&task.title),
        status = select(None, "status", status_options(task.status)),
        priority = select(None, "priority", priority_options(task.priority)),
    )
}

/// Query-string name of a status checkbox.
pub fn status_param(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Completed => "completed",
    }
}

fn status_options(current: TaskStatus) -> Vec<(&'static str, bool)> {
    TaskStatus::ALL
        .iter()
        .map(|s| (s.as_str(), *s == current))
        .collect()
}

fn priority_options(current: TaskPriority) -> Vec<(&'static str, bool)> {
    TaskPriority::ALL
        .iter()
        .map(|p| (p.as_str(), *p == current))
        .collect()
}

/// A `<select>`; only controls with a `<label for>` get an id, since rows repeat names.
fn select(id: Option<&str>, name: &str, options: Vec<(&'static str, bool)>) -> String {
    let mut html = match id {
        Some(id) => format!(r#"<select id="{}" name="{}">"#, id, name),
        None => format!(r#"<select name="{}">"#, name),
    };
    for (label, selected) in options {
        html.push_str(&format!(
            r#"<option value="{0}"{1}>{0}</option>"#,
            label,
            if selected { " selected" } else { "" }
        ));
    }
    html.push_str("</select>");
    html
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
