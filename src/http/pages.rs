//! HTML pages: the demo forms and the log dashboards.
//!
//! Dashboard content is escaped. The comment echo in
//! [`comment_added`] is not, and must stay that way: it is the XSS target.

use html_escape::encode_text;
use std::fmt::Write;
use std::sync::Arc;

use crate::capture::LogRecord;
use crate::config::ServerMode;

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 0; padding: 20px; }
    h1 { color: #333; }
    form { margin-bottom: 20px; }
    input, button { padding: 8px; margin: 5px 0; }
    table { width: 100%; border-collapse: collapse; margin-top: 20px; }
    th, td { padding: 10px; text-align: left; border-bottom: 1px solid #ddd; }
    th { background-color: #f2f2f2; }
    tr:hover { background-color: #f5f5f5; }
    .attack { background-color: #ffcccc; }
    .details-btn { cursor: pointer; color: blue; text-decoration: underline; }
    .details { display: none; white-space: pre-wrap; font-family: monospace; }
    .nav { margin: 20px 0; }
    .nav a { margin-right: 15px; text-decoration: none; color: #0066cc; }
"#;

const DASHBOARD_SCRIPT: &str = r#"
    function toggleDetails(id) {
        var details = document.getElementById('details-' + id);
        details.style.display = details.style.display === 'block' ? 'none' : 'block';
    }
    setTimeout(function () { location.reload(); }, 10000);
"#;

fn page(title: &str, script: &str, body: &str) -> String {
    format!(
        "<html>\n<head>\n<title>{title}</title>\n<style>{STYLE}</style>\n<script>{script}</script>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

pub fn index(mode: ServerMode) -> String {
    let mut body = String::from(
        r#"<h1>Login</h1>
<form action="/login" method="post">
    <input name="username" placeholder="username">
    <input name="password" placeholder="password" type="password">
    <button>Log in</button>
</form>
<div class="nav">
    <a href="/comments">Comments</a>"#,
    );
    if mode.is_dev() {
        body.push_str("\n    <a href=\"/logs\">Request log</a>\n    <a href=\"/attack-logs\">Attack log</a>");
    }
    body.push_str("\n</div>");

    let title = match mode {
        ServerMode::Dev => "Development server (debug)",
        ServerMode::Prod => "prod",
    };
    page(title, "", &body)
}

pub fn comments_form() -> String {
    "<h1>Comments</h1><form method='post'><input name='comment'><button>Add</button></form>".to_string()
}

/// Echoes the comment verbatim.
pub fn comment_added(comment: &str) -> String {
    format!("<p>Comment added: {comment}</p>")
}

fn details_json(record: &LogRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string())
}

/// All captured requests, newest first.
pub fn request_dashboard(records: &[Arc<LogRecord>]) -> String {
    let mut rows = String::new();
    for (i, record) in records.iter().enumerate() {
        let (class, verdict) = if record.is_attack {
            ("attack", format!("<strong>⚠️ {}</strong>", encode_text(&record.attack_labels())))
        } else {
            ("", "normal".to_string())
        };
        let _ = write!(
            rows,
            r#"<tr class="{class}">
    <td>{time}</td><td>{method}</td><td>{path}</td><td>{ip}</td><td>{verdict}</td>
    <td><span class="details-btn" onclick="toggleDetails({i})">details</span></td>
</tr>
<tr><td colspan="6"><div id="details-{i}" class="details">{details}</div></td></tr>
"#,
            time = record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            method = encode_text(&record.method),
            path = encode_text(&record.path),
            ip = encode_text(&record.remote_addr),
            details = encode_text(&details_json(record)),
        );
    }

    let body = format!(
        r#"<h1>Request log</h1>
<div class="nav"><a href="/">Home</a><a href="/attack-logs">Attack log only</a></div>
<table>
<tr><th>Time</th><th>Method</th><th>Path</th><th>IP</th><th>Attack</th><th>Details</th></tr>
{rows}</table>"#
    );
    page("Request log", DASHBOARD_SCRIPT, &body)
}

/// Attack-flagged requests, newest first, with replay commands.
pub fn attack_dashboard(records: &[Arc<LogRecord>]) -> String {
    let content = if records.is_empty() {
        "<p>No suspected attacks logged yet.</p>".to_string()
    } else {
        let mut rows = String::new();
        for (i, record) in records.iter().enumerate() {
            let _ = write!(
                rows,
                r#"<tr>
    <td>{time}</td><td><strong>{types}</strong></td><td>{method}</td><td>{path}</td><td>{ip}</td>
    <td><span class="details-btn" onclick="toggleDetails({i})">details</span></td>
    <td><code>{replay}</code></td>
</tr>
<tr><td colspan="7"><div id="details-{i}" class="details">{details}</div></td></tr>
"#,
                time = record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                types = encode_text(&record.attack_labels()),
                method = encode_text(&record.method),
                path = encode_text(&record.path),
                ip = encode_text(&record.remote_addr),
                replay = encode_text(&record.replay_command),
                details = encode_text(&details_json(record)),
            );
        }
        format!(
            "<table>\n<tr><th>Time</th><th>Attack type</th><th>Method</th><th>Path</th><th>IP</th><th>Details</th><th>Replay</th></tr>\n{rows}</table>"
        )
    };

    let body = format!(
        r#"<h1>Suspected attacks</h1>
<div class="nav"><a href="/">Home</a><a href="/logs">All requests</a></div>
{content}"#
    );
    page("Suspected attacks", DASHBOARD_SCRIPT, &body)
}
