//! Page Renderer
//!
//! Server-side HTML for the clipboard and shelf page. The page is rebuilt from
//! disk on every request. Open pages subscribe to the websocket hub and reload
//! on change; without scripting they fall back to a meta refresh.

use std::fmt::Write;

use crate::clipboard::ClipboardView;
use crate::config::PageConfig;
use crate::storage::{Room, SharedFile};

/// Path of a room's page
pub fn page_path(room: &Room) -> String {
    match room {
        Room::Default => "/".to_string(),
        Room::Named(token) => format!("/r/{}", token),
    }
}

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

/// Render the full page for one room
pub fn render_page(
    room: &Room,
    view: &ClipboardView,
    files: &[SharedFile],
    page: &PageConfig,
) -> String {
    let base = format!("/r/{}", room);
    let here = page_path(room);
    let title = escape_html(&page.title);

    let mut html = String::with_capacity(4096);

    // Writes to a String cannot fail
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<noscript><meta http-equiv="refresh" content="{refresh}"></noscript>
<title>{title}</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }}
pre {{ background: #f0f2f6; padding: 1rem; border-radius: 8px; white-space: pre-wrap; word-break: break-word; }}
.timestamp {{ font-size: 0.8em; color: #666; }}
.danger {{ color: #f44336; }}
textarea {{ width: 100%; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p>Type text on one device and copy it from any other device. Room: <code>{room}</code>
 &middot; <a href="/new-room">New room</a> &middot; <a href="{here}">Refresh</a></p>
<form method="post" action="{base}/submit">
<textarea name="text" rows="6" placeholder="Type your text here"></textarea>
<button type="submit">Save to Shared Clipboard</button>
<button type="reset">Clear Text</button>
</form>
<h2>Shared Clipboard Contents</h2>
"#,
        refresh = page.refresh_secs,
        title = title,
        room = escape_html(room.as_str()),
        here = here,
        base = base,
    );

    match &view.latest {
        None => html.push_str("<p>Clipboard is empty. Add some text above.</p>\n"),
        Some(latest) => {
            let _ = write!(
                html,
                r#"<p><strong>Latest Entry:</strong> <span class="timestamp">Last updated: {time}</span></p>
<pre id="latest">{text}</pre>
<button type="button" onclick="navigator.clipboard.writeText(document.getElementById('latest').textContent)">Copy Latest Text</button>
"#,
                time = escape_html(&latest.time),
                text = escape_html(&latest.text),
            );

            if !view.history.is_empty() {
                let _ = write!(
                    html,
                    "<details>\n<summary>View History (Last {} entries)</summary>\n",
                    view.count
                );
                for (i, entry) in view.history.iter().enumerate() {
                    let _ = write!(
                        html,
                        "<p><strong>Entry {}</strong> ({})</p>\n<pre>{}</pre>\n",
                        i + 1,
                        escape_html(&entry.time),
                        escape_html(&entry.text)
                    );
                }
                html.push_str("</details>\n");
            }
        }
    }

    let _ = write!(
        html,
        r#"<form method="post" action="{base}/clear"><button type="submit" class="danger">Clear ALL Entries</button></form>
<hr>
<h2>Shared Files</h2>
<form method="post" action="{base}/files" enctype="multipart/form-data">
<input type="file" name="file" multiple>
<button type="submit">Upload</button>
</form>
"#,
        base = base,
    );

    if files.is_empty() {
        html.push_str("<p>No files shared yet.</p>\n");
    } else {
        let mut sorted: Vec<&SharedFile> = files.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        html.push_str("<ul>\n");
        for file in sorted {
            let encoded = urlencoding::encode(&file.name);
            let _ = write!(
                html,
                r#"<li><a href="/api/v1/files/{encoded}" download>{name}</a> ({size})
<form method="post" action="{base}/files/{encoded}/delete" style="display:inline"><button type="submit">Delete</button></form></li>
"#,
                encoded = encoded,
                name = escape_html(&file.name),
                size = format_size(file.size),
                base = base,
            );
        }
        html.push_str("</ul>\n");
        let _ = write!(
            html,
            r#"<form method="post" action="{base}/clear-files"><button type="submit" class="danger">Delete All Files</button></form>
"#,
            base = base,
        );
    }

    let _ = write!(
        html,
        r#"<script>
(function () {{
  var fallback = function () {{ setTimeout(function () {{ location.reload(); }}, {refresh_ms}); }};
  var scheme = location.protocol === "https:" ? "wss://" : "ws://";
  var ws = new WebSocket(scheme + location.host + "/api/v1/ws");
  ws.onopen = function () {{
    ws.send(JSON.stringify({{ type: "subscribe", topics: ["{topic}", "shelf"] }}));
  }};
  ws.onmessage = function (event) {{
    var msg = JSON.parse(event.data);
    if (msg.type === "entries_updated" || msg.type === "shelf_updated") location.reload();
  }};
  ws.onclose = fallback;
}})();
</script>
</body>
</html>
"#,
        refresh_ms = page.refresh_secs.saturating_mul(1000),
        topic = room.topic(),
    );

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Entry;

    fn entry(text: &str, time: &str) -> Entry {
        Entry {
            text: text.to_string(),
            time: time.to_string(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_huge_refresh_does_not_overflow() {
        let page = PageConfig {
            refresh_secs: u64::MAX,
            ..PageConfig::default()
        };
        let view = ClipboardView::from_entries(&Room::Default, vec![]);
        let html = render_page(&Room::Default, &view, &[], &page);
        assert!(html.contains(&u64::MAX.to_string()));
    }

    #[test]
    fn test_page_path() {
        assert_eq!(page_path(&Room::Default), "/");
        assert_eq!(page_path(&Room::Named("ab12cd34".to_string())), "/r/ab12cd34");
    }

    #[test]
    fn test_empty_page() {
        let view = ClipboardView::from_entries(&Room::Default, vec![]);
        let html = render_page(&Room::Default, &view, &[], &PageConfig::default());

        assert!(html.contains("Clipboard is empty"));
        assert!(html.contains("No files shared yet"));
        assert!(html.contains(r#"content="15""#));
        assert!(html.contains(r#"action="/r/default/submit""#));
        assert!(!html.contains("<details>"));
    }

    #[test]
    fn test_page_shows_latest_and_history() {
        let view = ClipboardView::from_entries(
            &Room::Default,
            vec![
                entry("newest <script>", "2024-01-01 10:00:02"),
                entry("older", "2024-01-01 10:00:01"),
            ],
        );
        let html = render_page(&Room::Default, &view, &[], &PageConfig::default());

        assert!(html.contains("newest &lt;script&gt;"));
        assert!(!html.contains("newest <script>"));
        assert!(html.contains("Last updated: 2024-01-01 10:00:02"));
        assert!(html.contains("<details>"));
        assert!(html.contains("<strong>Entry 1</strong> (2024-01-01 10:00:01)"));
    }

    #[test]
    fn test_page_lists_files_sorted_and_encoded() {
        let room = Room::Named("ab12cd34".to_string());
        let view = ClipboardView::from_entries(&room, vec![]);
        let files = vec![
            SharedFile {
                name: "zeta.txt".to_string(),
                size: 10,
            },
            SharedFile {
                name: "a b.txt".to_string(),
                size: 2048,
            },
        ];
        let html = render_page(&room, &view, &files, &PageConfig::default());

        let a = html.find("a b.txt").unwrap();
        let z = html.find("zeta.txt").unwrap();
        assert!(a < z);
        assert!(html.contains("/api/v1/files/a%20b.txt"));
        assert!(html.contains(r#"action="/r/ab12cd34/files/a%20b.txt/delete""#));
        assert!(html.contains("(2.0 KB)"));
        assert!(html.contains("room.ab12cd34"));
    }
}
