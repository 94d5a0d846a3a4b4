//! Recipe for `mlx_lm/server.py` (stdlib `http.server` handler).
//!
//! Adds a module-level `deque` ring buffer, per-request recording at the end
//! of `handle_completion()`, and `/v1/metrics` + `/dashboard` GET routes.

use crate::dashboard::{python_triple_quoted, DASHBOARD_HTML};
use crate::metrics::DEFAULT_CAPACITY;
use crate::patch::{Locator, Recipe, Step};

pub const SENTINEL: &str = "_metrics_store";

const IMPORT_ANCHOR: &[&str] = &["from .utils import load"];

const ROUTE_ANCHOR: &str = "self.handle_health_check()\n        else:";
const ROUTE_OFFSET: usize = "self.handle_health_check()\n".len();

const RECORD_SNIPPET: &str = r##"

        # Log per-request metrics
        latency = time.perf_counter() - start_time
        prompt_tokens = len(ctx.prompt)
        completion_tokens = len(tokens)
        total_tokens = prompt_tokens + completion_tokens
        tps = completion_tokens / latency if latency > 0 else 0
        logging.info(
            f"prompt={prompt_tokens} completion={completion_tokens} "
            f"total={total_tokens} | latency={latency:.1f}s | {tps:.2f} tok/s"
        )
        _metrics_store.append({
            "timestamp": time.strftime("%Y-%m-%d %H:%M:%S"),
            "model": self.requested_model,
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": total_tokens,
            "latency": round(latency, 2),
            "tokens_per_sec": round(tps, 2),
        })
"##;

const ROUTE_SNIPPET: &str = r##"        elif self.path == "/v1/metrics":
            self.handle_metrics_request()
        elif self.path == "/dashboard":
            self.handle_dashboard_request()
"##;

const HANDLER_SNIPPET: &str = r##"    def handle_metrics_request(self):
        """Return recent request metrics as JSON."""
        self._set_completion_headers(200)
        self.end_headers()
        metrics = list(_metrics_store)
        total_requests = len(metrics)
        avg_tps = (
            sum(m["tokens_per_sec"] for m in metrics) / total_requests
            if total_requests > 0
            else 0
        )
        total_prompt = sum(m["prompt_tokens"] for m in metrics)
        total_completion = sum(m["completion_tokens"] for m in metrics)
        data = {
            "requests": metrics,
            "summary": {
                "total_requests": total_requests,
                "avg_tokens_per_sec": round(avg_tps, 2),
                "total_prompt_tokens": total_prompt,
                "total_completion_tokens": total_completion,
            },
        }
        self.wfile.write(json.dumps(data).encode())
        self.wfile.flush()

    def handle_dashboard_request(self):
        """Serve a live HTML dashboard that polls /v1/metrics."""
        self.send_response(200)
        self.send_header("Content-Type", "text/html; charset=utf-8")
        self.end_headers()
        html = _DASHBOARD_HTML
        self.wfile.write(html.encode())
        self.wfile.flush()

"##;

const MARKERS: &[(&str, &str)] = &[
    ("_metrics_store", "_metrics_store declaration"),
    ("_DASHBOARD_HTML", "dashboard HTML string"),
    ("handle_metrics_request", "metrics request handler"),
    ("handle_dashboard_request", "dashboard request handler"),
    ("\"/v1/metrics\"", "/v1/metrics route"),
    ("\"/dashboard\"", "/dashboard route"),
];

fn store_block() -> String {
    format!(
        "\n\n\
         # Module-level store for recent request metrics (used by /dashboard and /v1/metrics)\n\
         {SENTINEL}: deque = deque(maxlen={DEFAULT_CAPACITY})\n\
         \n\
         _DASHBOARD_HTML = \"\"\"{}\"\"\"\n",
        python_triple_quoted(DASHBOARD_HTML)
    )
}

pub fn recipe() -> Recipe {
    Recipe {
        name: "mlx_lm",
        package: "mlx_lm",
        sentinel: SENTINEL,
        steps: vec![
            Step::new(
                "_metrics_store + _DASHBOARD_HTML after imports",
                Locator::LineEnd(IMPORT_ANCHOR),
                store_block(),
            ),
            Step::new(
                "metrics recording in handle_completion()",
                Locator::LastBefore {
                    needle: "self.wfile.flush()",
                    bound: "def completion_usage_response",
                },
                RECORD_SNIPPET,
            ),
            Step::new(
                "/v1/metrics and /dashboard routes in do_GET()",
                Locator::Inside {
                    anchor: ROUTE_ANCHOR,
                    offset: ROUTE_OFFSET,
                },
                ROUTE_SNIPPET,
            ),
            Step::new(
                "handle_metrics_request() and handle_dashboard_request()",
                Locator::Before(&["def handle_health_check(self):"]),
                HANDLER_SNIPPET,
            ),
        ],
        markers: MARKERS,
        followup: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_counted_steps() {
        assert_eq!(recipe().expected_insertions(), 4);
    }

    #[test]
    fn store_block_embeds_escaped_dashboard() {
        let block = store_block();
        assert!(block.contains("_metrics_store: deque = deque(maxlen=200)"));
        assert!(block.contains("_DASHBOARD_HTML = \"\"\"<!DOCTYPE html>"));
        assert!(block.contains(r"\\u2014"));
        assert!(block.ends_with("</html>\"\"\"\n"));
    }
}
