#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Extension, Router,
};
use axum_authz::{authorize, Authorizer, CurrentUser, RouteMeta};
use once_cell::sync::Lazy;
use reqwest::Url;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub static FIXTURES: Lazy<PathBuf> =
    Lazy::new(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"));

pub fn fixture(name: &str) -> PathBuf {
    FIXTURES.join(name)
}

pub async fn fixture_authorizer(policy: &str) -> Authorizer {
    Authorizer::new(fixture("model.conf"), fixture(policy))
        .await
        .expect("failed to build fixture authorizer")
}

#[derive(Debug, serde::Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Stand-in for an upstream authentication layer: promotes the
/// `x-test-role` header into a typed principal, or leaves the request
/// unauthenticated when the header is absent.
async fn fake_auth(mut request: Request, next: Next) -> Response {
    if let Some(role) = request
        .headers()
        .get("x-test-role")
        .and_then(|v| v.to_str().ok())
    {
        let user = CurrentUser::new("test-user", role);
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

pub struct TestApp {
    pub address: Url,
    /// Downstream handler invocations, across all gated routes.
    pub hits: Arc<AtomicUsize>,
    client: reqwest::Client,
    _shutdown: oneshot::Sender<()>,
    _server_task: JoinHandle<()>,
}

impl TestApp {
    pub async fn spawn(authorizer: Authorizer) -> Self {
        init_tracing();

        let hits = Arc::new(AtomicUsize::new(0));
        let app = gated_app(authorizer, hits.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
        let server_task = tokio::spawn(async move {
            if let Err(e) = server.await {
                println!("server error : {:?}", e);
            }
        });

        Self {
            address: Url::parse(&format!("http://{}", addr)).unwrap(),
            hits,
            client: reqwest::Client::new(),
            _shutdown: shutdown_tx,
            _server_task: server_task,
        }
    }

    pub fn downstream_hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub async fn get(&self, path: &str, role: Option<&str>) -> reqwest::Response {
        let mut req = self.client.get(self.address.join(path).unwrap());
        if let Some(role) = role {
            req = req.header("x-test-role", role);
        }
        req.send().await.unwrap()
    }

    pub async fn post(&self, path: &str, role: Option<&str>) -> reqwest::Response {
        let mut req = self.client.post(self.address.join(path).unwrap());
        if let Some(role) = role {
            req = req.header("x-test-role", role);
        }
        req.send().await.unwrap()
    }
}

fn gated_app(authorizer: Authorizer, hits: Arc<AtomicUsize>) -> Router {
    let list_hits = hits.clone();
    let list = move || {
        let hits = list_hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            "widgets"
        }
    };

    let purge_hits = hits.clone();
    let purge = move || {
        let hits = purge_hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            "purged"
        }
    };

    let bare_hits = hits;
    let bare = move || {
        let hits = bare_hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            "bare"
        }
    };

    // The metadata extension must sit outside the gate so it is inserted
    // before `authorize` reads the request; layers added later are outermost.
    Router::new()
        .route(
            "/widgets",
            get(list)
                .layer::<_, std::convert::Infallible>(from_fn_with_state(
                    authorizer.clone(),
                    authorize,
                ))
                .layer(Extension(RouteMeta::new("widgets", "list"))),
        )
        .route(
            "/widgets/purge",
            post(purge)
                .layer::<_, std::convert::Infallible>(from_fn_with_state(
                    authorizer.clone(),
                    authorize,
                ))
                .layer(Extension(RouteMeta::new("widgets", "purge"))),
        )
        // Gated, but deliberately registered without RouteMeta.
        .route(
            "/bare",
            get(bare).layer(from_fn_with_state(authorizer, authorize)),
        )
        .layer(from_fn(fake_auth))
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
