//! Content-type inference for uploaded objects.

/// Used when the extension is unknown or missing.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Guess the content type of `key` from its extension, falling back to [`DEFAULT_CONTENT_TYPE`].
pub fn content_type_for(key: &str) -> String {
    let extension = std::path::Path::new(key)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    // mime_guess releases disagree on the JavaScript type; browsers accept this one everywhere.
    if matches!(extension.as_deref(), Some("js" | "mjs")) {
        return "application/javascript".to_string();
    }

    mime_guess::from_path(key)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_web_assets() {
        assert_eq!(content_type_for("index.html"), "text/html");
        assert_eq!(content_type_for("sub/b.css"), "text/css");
        assert_eq!(content_type_for("sub/deep/c.js"), "application/javascript");
        assert_eq!(content_type_for("img/logo.png"), "image/png");
    }

    #[test]
    fn extension_case_is_ignored() {
        assert_eq!(content_type_for("INDEX.HTML"), "text/html");
        assert_eq!(content_type_for("APP.JS"), "application/javascript");
    }

    #[test]
    fn unknown_or_missing_extension_falls_back_to_text() {
        assert_eq!(content_type_for("LICENSE"), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for("notes.zz-unknown"), DEFAULT_CONTENT_TYPE);
    }
}
