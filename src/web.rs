use std::time;
use tracing::debug;

// Longest a /slow request is allowed to take.
const MAX_SLOW_MILLIS: u64 = 30_000;

pub fn router() -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::get(index))
        .route("/slow/:millis", axum::routing::get(slow))
        .fallback(fallback_handler)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

async fn fallback_handler() -> (http::StatusCode, String) {
    (http::StatusCode::NOT_FOUND, "Page Not Found".to_owned())
}

pub async fn index() -> &'static str {
    "OK"
}

// Sleeps before answering, handy to watch a drain wait for in-flight requests.
pub async fn slow(axum::extract::Path(millis): axum::extract::Path<u64>) -> String {
    let millis = millis.min(MAX_SLOW_MILLIS);
    debug!(millis, "slow request");

    tokio::time::sleep(time::Duration::from_millis(millis)).await;

    format!("slept {}ms", millis)
}
