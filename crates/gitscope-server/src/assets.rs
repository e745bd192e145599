//! Embedded browser client, served from the binary.

use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "../../client"]
struct ClientAssets;

/// Serve the embedded client. `/` maps to `index.html`; unknown paths
/// without an extension also fall back to it.
pub async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    match ClientAssets::get(path) {
        Some(content) => serve(path, content),
        None if !path.contains('.') => match ClientAssets::get("index.html") {
            Some(content) => serve("index.html", content),
            None => not_found(),
        },
        None => not_found(),
    }
}

fn serve(path: &str, content: rust_embed::EmbeddedFile) -> Response {
    let mime = mime_guess::from_path(path).first_or_text_plain();
    ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}
