use axum::{
    Router,
    response::{IntoResponse, Redirect},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tower_sessions::{
    Expiry, SessionManagerLayer,
    cookie::{SameSite, time::Duration},
};

use crate::{Config, Ctx, web::navigator::Route};

pub mod bill;
pub mod error;
pub mod modal;
pub mod navigator;
pub mod session;
pub mod templates;

pub type Result<T> = std::result::Result<T, error::Error>;

pub const SESSION_EXPIRATION_SEC: i64 = 60 * 30; // 30 min
pub const USER: &str = "user";

pub fn router(ctx: Ctx, cfg: &Config) -> Router {
    let sessions = SessionManagerLayer::new(ctx.session_store.clone())
        .with_secure(cfg.cookie_secure)
        .with_domain(cfg.domain.clone())
        .with_same_site(SameSite::Strict)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRATION_SEC,
        )))
        .with_http_only(true);

    let web = Router::new()
        .route("/health", get(health))
        .route("/", get(home))
        .route("/bills", get(bill::ssr::list))
        .route("/bills/new", get(bill::ssr::new_bill))
        .route("/bills/{id}/receipt", get(bill::ssr::receipt))
        .layer(sessions)
        .layer(TraceLayer::new_for_http());
    Router::new().merge(web).with_state(ctx)
}

async fn health() -> Result<&'static str> {
    Ok("OK")
}

#[tracing::instrument(level = tracing::Level::DEBUG)]
pub async fn home() -> impl IntoResponse {
    Redirect::to(&Route::Bills.path())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use scraper::{Html, Selector};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        db::{
            InMemStore,
            bill::{Bill, BillStore, StoreError},
        },
        web::session::MemorySessionStore,
    };

    struct FailingStore(StoreError);

    #[async_trait]
    impl BillStore for FailingStore {
        async fn list(&self) -> std::result::Result<Vec<Bill>, StoreError> {
            Err(self.0.clone())
        }
    }

    fn app(store: Arc<dyn BillStore>) -> Router {
        let config = Config::for_tests();
        let ctx = Ctx {
            bill_store: store,
            config: config.clone(),
            session_store: MemorySessionStore::default(),
        };
        router(ctx, &config)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn fixtures() -> Arc<dyn BillStore> {
        Arc::new(InMemStore::with_builtin_fixtures().unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(
            get(app(fixtures()), "/health").await,
            (StatusCode::OK, "OK".to_string())
        );
    }

    #[tokio::test]
    async fn home_redirects_to_bills() {
        let resp = app(fixtures())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/bills");
    }

    #[tokio::test]
    async fn bills_page_lists_fixtures_and_sets_session() {
        let resp = app(fixtures())
            .oneshot(Request::builder().uri("/bills").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(header::SET_COOKIE));

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let html = Html::parse_document(std::str::from_utf8(&body).unwrap());
        let eyes = Selector::parse(r#"[data-testid="icon-eye"]"#).unwrap();
        assert_eq!(html.select(&eyes).count(), 4);
        let icon = Selector::parse(r#"[data-testid="icon-window"].active-icon"#).unwrap();
        assert!(html.select(&icon).next().is_some());
    }

    #[tokio::test]
    async fn store_errors_render_error_pages() {
        let (status, body) = get(app(Arc::new(FailingStore(StoreError::NotFound))), "/bills").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Erreur 404"));

        let (status, body) = get(app(Arc::new(FailingStore(StoreError::Server))), "/bills").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Erreur 500"));
        assert!(!body.contains("icon-eye"));
    }

    #[tokio::test]
    async fn new_bill_page_has_form() {
        let (status, body) = get(app(fixtures()), "/bills/new").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"data-testid="form-new-bill""#));
    }

    #[tokio::test]
    async fn receipt_page_decodes_escaped_bill_id() {
        let store = Arc::new(InMemStore::new(vec![crate::db::bill::tests::bill(
            "a/b",
            "2004-04-04",
        )]));
        let (status, body) = get(app(store), "/bills/a%2Fb/receipt").await;
        assert_eq!(status, StatusCode::OK);
        let html = Html::parse_document(&body);
        let modal = Selector::parse("#modaleFile.show").unwrap();
        assert!(html.select(&modal).next().is_some());
    }

    #[tokio::test]
    async fn receipt_page_shows_modal() {
        let (status, body) = get(app(fixtures()), "/bills/BeKy5Mo4jkmdfPGYpTxZ/receipt").await;
        assert_eq!(status, StatusCode::OK);
        let html = Html::parse_document(&body);
        let modal = Selector::parse("#modaleFile.show").unwrap();
        assert!(html.select(&modal).next().is_some());

        let (status, body) = get(app(fixtures()), "/bills/unknown/receipt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Erreur 404"));
        assert!(!body.contains("icon-eye"));
    }
}
