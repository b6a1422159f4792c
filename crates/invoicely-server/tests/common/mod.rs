//! Shared setup for router tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use invoicely_server::middleware::auth::{encode_token, Claims, ROLE_ADMIN, ROLE_SUPER_ADMIN, ROLE_USER};
use invoicely_server::{AppState, Server, ServerConfig};
use invoicely_test_utils::temp_dir;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "router-test-secret-0123456789abcdef";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub config: ServerConfig,
    _dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.auth.jwt_secret = SECRET.to_string();
    config.upload.dir = dir.path().join("uploads");
    config.cache.sweep_interval_secs = 3600;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(configure: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let dir = temp_dir();
    let mut config = test_config(&dir);
    configure(&mut config);

    let server = Server::new(config.clone()).await.unwrap();
    TestApp {
        router: server.router(),
        state: server.state().clone(),
        config,
        _dir: dir,
    }
}

pub struct Caller {
    pub id: Uuid,
    pub token: String,
}

fn caller(email: &str, roles: &[&str]) -> Caller {
    let id = Uuid::new_v4();
    let roles = roles.iter().map(|r| r.to_string()).collect();
    let token = encode_token(&Claims::new_access(id, email, roles, 3600), SECRET).unwrap();
    Caller { id, token }
}

pub fn user() -> Caller {
    caller("user@acme.test", &[ROLE_USER])
}

pub fn admin() -> Caller {
    caller("admin@acme.test", &[ROLE_USER, ROLE_ADMIN])
}

pub fn super_admin() -> Caller {
    caller("root@invoicely.test", &[ROLE_SUPER_ADMIN])
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, caller: Option<&Caller>) -> Response<Body> {
        let mut builder = Request::get(uri);
        if let Some(caller) = caller {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", caller.token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, caller: &Caller, body: Value) -> Response<Body> {
        let request = Request::post(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", caller.token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_multipart(&self, uri: &str, caller: &Caller, body: Vec<u8>) -> Response<Body> {
        let request = Request::post(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", caller.token))
            .header(
                header::CONTENT_TYPE,
                invoicely_test_utils::multipart_content_type(),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

pub async fn json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}
