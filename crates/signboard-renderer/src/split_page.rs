//! Generated display documents.
//!
//! The same two-pane markup serves the browser backend (injected straight
//! into the page), the kiosk backend (written to a local file), and the
//! served backend (returned from `GET /`). Only the served backend embeds a
//! self-refresh timer, since it has no other way to pick up configuration
//! changes.

use signboard_core::SplitOrientation;

/// Full-viewport single-frame document.
pub fn single_document(url: &str, refresh_secs: Option<u32>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    html, body {{ height: 100%; overflow: hidden; }}
    .frame {{ width: 100%; height: 100%; border: none; outline: none; }}
</style>
{refresh}</head>
<body>
<iframe class="frame" src="{url}"></iframe>
</body>
</html>
"#,
        url = attr_escape(url),
        refresh = refresh_script(refresh_secs),
    )
}

/// Two-pane document; row layout for horizontal, column for vertical.
pub fn split_document(
    orientation: SplitOrientation,
    primary_url: &str,
    secondary_url: &str,
    refresh_secs: Option<u32>,
) -> String {
    let direction = match orientation {
        SplitOrientation::Horizontal => "row",
        SplitOrientation::Vertical => "column",
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    body {{ height: 100vh; overflow: hidden; }}
    .container {{ width: 100%; height: 100%; display: flex; flex-direction: {direction}; }}
    .frame {{ flex: 1; border: none; outline: none; }}
</style>
{refresh}</head>
<body>
<div class="container">
    <iframe class="frame" src="{primary}"></iframe>
    <iframe class="frame" src="{secondary}"></iframe>
</div>
</body>
</html>
"#,
        primary = attr_escape(primary_url),
        secondary = attr_escape(secondary_url),
        refresh = refresh_script(refresh_secs),
    )
}

/// Placeholder shown when no configuration resolves.
pub fn no_config_document() -> &'static str {
    "<h1>No configuration found</h1>"
}

fn refresh_script(refresh_secs: Option<u32>) -> String {
    match refresh_secs {
        Some(secs) if secs > 0 => {
            let millis = u64::from(secs) * 1000;
            format!("<script>setTimeout(() => window.location.reload(), {millis});</script>\n")
        }
        _ => String::new(),
    }
}

fn attr_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_split_is_row() {
        let html = split_document(
            SplitOrientation::Horizontal,
            "https://example.test/b",
            "https://example.test/c",
            None,
        );
        assert!(html.contains("flex-direction: row"));
        assert!(html.contains(r#"src="https://example.test/b""#));
        assert!(html.contains(r#"src="https://example.test/c""#));
        assert_eq!(html.matches("<iframe").count(), 2);
    }

    #[test]
    fn test_vertical_split_is_column() {
        let html = split_document(
            SplitOrientation::Vertical,
            "https://example.test/b",
            "https://example.test/c",
            None,
        );
        assert!(html.contains("flex-direction: column"));
    }

    #[test]
    fn test_single_document_has_one_frame_and_no_secondary() {
        let html = single_document("https://example.test/a", None);
        assert_eq!(html.matches("<iframe").count(), 1);
        assert!(html.contains(r#"src="https://example.test/a""#));
    }

    #[test]
    fn test_refresh_timer_embedded_in_milliseconds() {
        let html = single_document("https://example.test/a", Some(300));
        assert!(html.contains("location.reload(), 300000"));

        let html = split_document(
            SplitOrientation::Horizontal,
            "https://example.test/b",
            "https://example.test/c",
            Some(60),
        );
        assert!(html.contains("location.reload(), 60000"));
    }

    #[test]
    fn test_no_refresh_script_when_absent_or_zero() {
        assert!(!single_document("https://example.test/a", None).contains("<script>"));
        assert!(!single_document("https://example.test/a", Some(0)).contains("<script>"));
    }

    #[test]
    fn test_urls_are_attribute_escaped() {
        let html = single_document(r#"https://example.test/a?x="1"&y=2"#, None);
        assert!(html.contains("&quot;1&quot;&amp;y=2"));
        assert!(!html.contains(r#"?x="1""#));
    }
}
