//! Bundled dashboard page.
//!
//! The page polls `/v1/metrics` (falling back to `/health`) on ports
//! 8080-8090 every two seconds and renders one tab per responding server.

/// Dashboard HTML, served verbatim by the gateway.
pub const DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

/// Escape `text` for embedding inside a Python `"""` string literal.
pub fn python_triple_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"")
}
