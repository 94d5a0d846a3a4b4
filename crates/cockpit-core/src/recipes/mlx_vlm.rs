//! Recipe for `mlx_vlm/server.py` (FastAPI).
//!
//! Adds CORS for GET (so a dashboard served from another port can poll), a
//! ring buffer with a `_record_vlm_metric()` helper, and a `/v1/metrics`
//! route. Wiring `_record_vlm_metric()` into the generation handlers is
//! left to the operator; see [`FOLLOWUP`].

use crate::metrics::DEFAULT_CAPACITY;
use crate::patch::{Locator, Recipe, Step};

pub const SENTINEL: &str = "_vlm_metrics_store";

const CORS_IMPORT: &str = "from fastapi.middleware.cors import CORSMiddleware";

const CORS_SNIPPET: &str = r##"
app.add_middleware(
    CORSMiddleware,
    allow_origins=["*"],
    allow_methods=["GET"],
    allow_headers=["*"],
)
"##;

const RECORDER_FN: &str = r##"

def _metric_float(value):
    value = float(value or 0)
    return value if value == value and 0 < value < float("inf") else 0.0


def _record_vlm_metric(model, prompt_tokens, completion_tokens, latency, tokens_per_sec):
    prompt_tokens = max(int(prompt_tokens or 0), 0)
    completion_tokens = max(int(completion_tokens or 0), 0)
    _vlm_metrics_store.append({
        "timestamp": time.strftime("%Y-%m-%d %H:%M:%S"),
        "model": str(model or "").split("/")[-1] or "unknown",
        "prompt_tokens": prompt_tokens,
        "completion_tokens": completion_tokens,
        "total_tokens": prompt_tokens + completion_tokens,
        "latency": round(_metric_float(latency), 2),
        "tokens_per_sec": round(_metric_float(tokens_per_sec), 2),
    })
"##;

const ROUTE_SNIPPET: &str = r##"
@app.get("/v1/metrics")
async def metrics_endpoint():
    """Return recent request metrics and summary."""
    requests_list = list(_vlm_metrics_store)
    total = len(requests_list)
    if total > 0:
        avg_tps = sum(r["tokens_per_sec"] for r in requests_list) / total
        total_prompt = sum(r["prompt_tokens"] for r in requests_list)
        total_completion = sum(r["completion_tokens"] for r in requests_list)
    else:
        avg_tps = 0
        total_prompt = 0
        total_completion = 0
    return {
        "requests": requests_list,
        "summary": {
            "total_requests": total,
            "avg_tokens_per_sec": round(avg_tps, 2),
            "total_prompt_tokens": total_prompt,
            "total_completion_tokens": total_completion,
        },
    }


"##;

const MARKERS: &[(&str, &str)] = &[
    ("_vlm_metrics_store", "metrics store"),
    ("_record_vlm_metric", "recording function"),
    ("/v1/metrics", "metrics route"),
    ("CORSMiddleware", "CORS middleware"),
];

/// Reminder printed after a successful patch.
pub const FOLLOWUP: &str = "per-request metrics are not recorded yet: add _record_vlm_metric() \
calls to the streaming and non-streaming paths of POST /responses and POST /chat/completions, \
after generation finishes (model, prompt tokens, generation tokens, latency, generation tps)";

fn store_block() -> String {
    format!(
        "\n\n\
         # --- Metrics store (mirrors mlx_lm server format) ---\n\
         {SENTINEL}: deque = deque(maxlen={DEFAULT_CAPACITY})\n\
         {RECORDER_FN}"
    )
}

pub fn recipe() -> Recipe {
    Recipe {
        name: "mlx_vlm",
        package: "mlx_vlm",
        sentinel: SENTINEL,
        steps: vec![
            Step::new(
                "CORSMiddleware import",
                Locator::LineEnd(&["from fastapi import"]),
                format!("{CORS_IMPORT}\n"),
            )
            .uncounted()
            .unless_present(CORS_IMPORT),
            Step::new(
                "CORS middleware",
                Locator::AfterCall("app = FastAPI("),
                CORS_SNIPPET,
            )
            .unless_present("app.add_middleware"),
            Step::new(
                "_vlm_metrics_store + _record_vlm_metric()",
                Locator::LineEnd(&["model_cache = {}", "model_cache: "]),
                store_block(),
            ),
            Step::new(
                "/v1/metrics endpoint",
                Locator::Before(&[
                    "@app.get(\"/health\")",
                    "@app.post(\"/unload\")",
                    "if __name__",
                ]),
                ROUTE_SNIPPET,
            ),
        ],
        markers: MARKERS,
        followup: Some(FOLLOWUP),
    }
}
