use std::sync::Arc;

use api::AppState;
use axum::{routing::get, Router};
use runtime::{store::FileStore, SystemClock};

use crate::config::Config;

pub fn build_state(config: &Config) -> AppState {
    AppState::new(
        Arc::new(FileStore::new(&config.settings_dir)),
        Arc::new(SystemClock::new(config.utc_offset)),
    )
}

pub fn build_app(state: AppState) -> Router {
    debug_assert!(api::module_ready());
    debug_assert!(ui::module_ready());

    api::app(state).route("/health", get(healthcheck))
}

async fn healthcheck() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use api::AppState;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use runtime::SystemClock;
    use time::UtcOffset;
    use tower::ServiceExt;

    #[tokio::test]
    async fn server_healthcheck_responds_ok() {
        let app = super::build_app(AppState::in_memory(Arc::new(SystemClock::new(
            UtcOffset::UTC,
        ))));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
