//! HTTP surface
//!
//! A small axum router exposing FX comparison, insights and share links.

pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Settings;
use crate::error::{FinnestError, FinnestResult};
use crate::fx::FxAggregator;
use crate::insights::InsightsService;
use crate::storage::Storage;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub fx: Arc<FxAggregator>,
    pub insights: Arc<InsightsService>,
    pub public_url: Arc<str>,
    pub cache_control: String,
}

impl AppState {
    pub fn new(
        storage: Arc<Storage>,
        fx: Arc<FxAggregator>,
        insights: Arc<InsightsService>,
        settings: &Settings,
    ) -> Self {
        Self {
            storage,
            fx,
            insights,
            public_url: Arc::from(settings.server.public_url.as_str()),
            cache_control: settings.fx.cache_control(),
        }
    }

    /// Build every service from settings
    pub fn from_settings(storage: Arc<Storage>, settings: &Settings) -> FinnestResult<Self> {
        let fx = Arc::new(FxAggregator::from_settings(&settings.fx)?);
        let insights = Arc::new(InsightsService::from_settings(&settings.insights)?);
        Ok(Self::new(storage, fx, insights, settings))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/fx/compare", get(routes::compare_rates))
        .route("/api/insights", post(routes::generate_insights))
        .route("/api/shares", post(routes::create_share))
        .route("/api/shares/{token}", get(routes::resolve_share))
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve(state: AppState, bind: &str) -> FinnestResult<()> {
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| FinnestError::Config(format!("Cannot bind {}: {}", bind, e)))?;
    let addr = listener.local_addr()?;
    info!(%addr, model = state.insights.has_model(), "serving");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinnestPaths;
    use crate::fx::{FxProvider, QuoteSource};
    use crate::models::{Asset, CurrencyCode};
    use mockito::Matcher;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use tempfile::TempDir;

    async fn start(fx: FxAggregator) -> (TempDir, Arc<Storage>, SocketAddr) {
        let temp_dir = TempDir::new().unwrap();
        let storage =
            Storage::new(FinnestPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        storage.load_all().unwrap();
        let storage = Arc::new(storage);

        let mut settings = Settings::default();
        settings.server.public_url = "finnest.test".into();
        let state = AppState::new(
            Arc::clone(&storage),
            Arc::new(fx),
            Arc::new(InsightsService::offline()),
            &settings,
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        (temp_dir, storage, addr)
    }

    fn no_sources() -> FxAggregator {
        FxAggregator::new(Vec::new(), reqwest::Client::new())
    }

    #[tokio::test]
    async fn compare_defaults_and_caches() {
        let mut upstream = mockito::Server::new_async().await;
        let _mock = upstream
            .mock("GET", "/latest")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("from".into(), "AUD".into()),
                Matcher::UrlEncoded("to".into(), "USD".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"date":"2024-05-10","rates":{"USD":0.66}}"#)
            .create_async()
            .await;
        let down = mockito::Server::new_async().await;

        let sources: Vec<Arc<dyn QuoteSource>> = vec![
            Arc::new(FxProvider::open_er_api().with_base_url(down.url())),
            Arc::new(FxProvider::frankfurter().with_base_url(upstream.url())),
        ];
        let (_temp, _storage, addr) =
            start(FxAggregator::new(sources, reqwest::Client::new())).await;

        let resp = reqwest::get(format!("http://{addr}/api/fx/compare"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["cache-control"],
            "s-maxage=300, stale-while-revalidate=600"
        );
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(body["base"], "AUD");
        assert_eq!(body["quote"], "USD");
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["provider"], "frankfurter");
        assert_eq!(results[0]["rate"], 0.66);
        assert!(results[1]["rate"].is_null());
    }

    #[tokio::test]
    async fn compare_rejects_bad_pairs() {
        let (_temp, _storage, addr) = start(no_sources()).await;

        for query in ["base=usd&quote=usd", "base=AUDX&quote=USD"] {
            let resp = reqwest::get(format!("http://{addr}/api/fx/compare?{query}"))
                .await
                .unwrap();
            assert_eq!(resp.status(), 400);
            let body: Value = resp.json().await.unwrap();
            assert_eq!(body, json!({"ok": false, "error": "Invalid currency pair"}));
        }
    }

    #[tokio::test]
    async fn compare_uppercases_params() {
        let (_temp, _storage, addr) = start(no_sources()).await;
        let resp = reqwest::get(format!("http://{addr}/api/fx/compare?base=eur&quote=gbp"))
            .await
            .unwrap();
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["base"], "EUR");
        assert_eq!(body["quote"], "GBP");
    }

    #[tokio::test]
    async fn insights_accepts_malformed_body() {
        let (_temp, _storage, addr) = start(no_sources()).await;
        let resp = reqwest::Client::new()
            .post(format!("http://{addr}/api/insights"))
            .body("{oops")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["disclaimer"], "Informational only - not financial advice.");
        assert!(body["insights"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn share_create_and_resolve() {
        let (_temp, storage, addr) = start(no_sources()).await;
        let asset = Asset::new("o", "Home", "property", CurrencyCode::parse("AUD").unwrap(), 9.0);
        storage.assets.upsert(asset.clone()).unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://{addr}/api/shares"))
            .json(&json!({
                "tab": "beneficiary",
                "beneficiaryId": "b-7",
                "assets": [asset.id.to_string()],
                "permissions": {"view": true, "download": false}
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let created: Value = resp.json().await.unwrap();
        assert_eq!(created["ok"], true);
        let token = created["token"].as_str().unwrap().to_string();
        assert_eq!(
            created["url"],
            format!("https://finnest.test/share/{}", token)
        );

        let resp = reqwest::get(format!("http://{addr}/api/shares/{token}"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let view: Value = resp.json().await.unwrap();
        assert_eq!(view["share"]["target_id"], "b-7");
        assert_eq!(view["assets"][0]["name"], "Home");
        assert_eq!(view["assets"][0]["type"], "property");
        assert!(view["assets"][0].get("notes").is_none());
    }

    #[tokio::test]
    async fn share_errors() {
        let (_temp, _storage, addr) = start(no_sources()).await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("http://{addr}/api/shares"))
            .json(&json!({"tab": "nobody"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["ok"], false);

        let resp = reqwest::get(format!("http://{addr}/api/shares/missing"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"ok": false, "error": "Not found"}));
    }
}
