//! Static dashboard page.

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Build the dashboard page once at startup.
pub fn render_page(title: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <title>{title}</title>
        <style>
            body {{ font-family: Arial; background: #fefefe; text-align: center; margin-top: 100px; }}
            h1 {{ color: #2a9d8f; }}
            p {{ font-size: 18px; color: #264653; }}
        </style>
    </head>
    <body>
        <h1>{title}</h1>
        <p>Your DevOps metrics will be visualized here.</p>
        <p><a href="/metrics">View Prometheus Metrics</a></p>
    </body>
</html>
"#
    )
}
