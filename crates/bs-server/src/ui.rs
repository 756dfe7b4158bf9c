//! HTML status page. Pure functions of their inputs so they can be tested
//! without a server.

use bs_core::models::{BuildOutcome, BuildStatus};
use html_escape::{encode_double_quoted_attribute, encode_text};

pub const DISABLED_PAGE: &str = "<h1>Web UI disabled</h1>";

const REFRESH_SECS: u32 = 5;

/// Everything the status page shows.
pub struct StatusPage<'a> {
    pub hostname: &'a str,
    pub api_port: u16,
    pub cache_port: u16,
    pub public_key: &'a str,
    pub statuses: &'a [BuildStatus],
}

pub fn render_status_page(page: &StatusPage<'_>) -> String {
    let hostname = encode_text(page.hostname);
    let public_key = encode_text(page.public_key);
    let cache_url = format!("http://{hostname}:{}", page.cache_port);
    let cards: String = page.statuses.iter().map(render_repository_card).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>NixOS Build Server - {hostname}</title>
    <meta http-equiv="refresh" content="{REFRESH_SECS}">
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 1200px; margin: 0 auto; padding: 20px; background: #f5f5f5; }}
        .header {{ background: white; padding: 20px; border-radius: 5px; margin-bottom: 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        .info {{ background: #e3f2fd; padding: 15px; border-radius: 5px; margin: 15px 0; border-left: 4px solid #2196F3; }}
        .repo {{ border: 1px solid #ddd; padding: 15px; margin: 10px 0; border-radius: 5px; background: #f9f9f9; }}
        .repo p {{ margin: 5px 0; }}
        .badge {{ background: orange; color: white; padding: 2px 6px; border-radius: 3px; font-size: 12px; }}
        .trigger {{ background: #4CAF50; color: white; border: none; padding: 8px 16px; cursor: pointer; border-radius: 3px; margin-right: 5px; }}
        .logs {{ background: #2196F3; color: white; border: none; padding: 8px 16px; cursor: pointer; border-radius: 3px; }}
        code {{ background: #f5f5f5; padding: 2px 6px; border-radius: 3px; font-family: monospace; }}
        pre {{ background: white; padding: 10px; border-radius: 3px; overflow-x: auto; }}
        footer {{ margin-top: 30px; padding: 15px; background: white; border-radius: 5px; text-align: center; color: #666; font-size: 12px; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>NixOS Build Server</h1>
        <p><strong>Hostname:</strong> {hostname}</p>
        <p><strong>API Port:</strong> {api_port}</p>
        <p><strong>Cache URL:</strong> <code>{cache_url}</code></p>
    </div>

    <div class="info">
        <h3>Binary Cache Configuration</h3>
        <p>Add this to your NixOS configuration to use this cache:</p>
        <pre>nix.settings = {{
  substituters = [ "{cache_url}" ];
  trusted-public-keys = [ "{public_key}" ];
}};</pre>
    </div>

    <h2>Repositories</h2>
{cards}
    <footer>
        Auto-refreshes every {REFRESH_SECS} seconds &bull; <a href="/info">API Info</a> &bull; <a href="/health">Health Check</a>
    </footer>

    <script>
    function triggerBuild(repo) {{
        fetch(`/build/trigger/${{encodeURIComponent(repo)}}`, {{ method: 'POST' }})
            .then(response => response.json())
            .then(data => {{
                alert(data.message || data.detail);
                location.reload();
            }})
            .catch(error => alert('Error: ' + error));
    }}
    </script>
</body>
</html>
"#,
        api_port = page.api_port,
    )
}

fn render_repository_card(status: &BuildStatus) -> String {
    let repository = encode_text(&status.repository);
    let repository_attr = encode_double_quoted_attribute(&status.repository);
    let running_badge = if status.is_running {
        r#" <span class="badge">RUNNING</span>"#
    } else {
        ""
    };
    let last_status = status
        .last_status
        .map(BuildOutcome::as_str)
        .unwrap_or("never built");
    let last_commit = encode_text(status.last_commit.as_deref().unwrap_or("N/A"));
    let last_finish = status
        .last_finish
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        r#"    <div class="repo">
        <h3>{repository}{running_badge}</h3>
        <p><strong>Status:</strong> <span style="color: {color};">{last_status}</span></p>
        <p><strong>Last Commit:</strong> {last_commit}</p>
        <p><strong>Last Finish:</strong> {last_finish}</p>
        <div>
            <button class="trigger" data-repo="{repository_attr}" onclick="triggerBuild(this.dataset.repo)">Trigger Build</button>
            <a href="/build/logs/{repository_attr}?lines=100" target="_blank"><button class="logs">View Logs</button></a>
        </div>
    </div>
"#,
        color = status_color(status.last_status),
    )
}

fn status_color(outcome: Option<BuildOutcome>) -> &'static str {
    match outcome {
        Some(BuildOutcome::Success) => "green",
        Some(BuildOutcome::Failed) => "red",
        _ => "gray",
    }
}
