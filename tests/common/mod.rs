#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use sharefeed::auth::session;
use sharefeed::config::Config;
use sharefeed::db::{self, models::{Post, PostKind, Role}};
use sharefeed::posts::NewPost;
use sharefeed::state::AppState;
use sharefeed::users::NewUser;

pub const PASSWORD: &str = "correct horse";
pub const BOUNDARY: &str = "sharefeed-test-boundary";

pub struct TestApp {
    pub _tmp: TempDir,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.resolve_paths(tmp.path());

        let pool = db::create_pool(&config.db_path()).expect("Failed to create test database");
        db::run_migrations(&pool).expect("Failed to run migrations");

        let state = AppState::new(pool, config);
        let router = sharefeed::routes::app(state.clone());
        Self {
            _tmp: tmp,
            state,
            router,
        }
    }

    /// Insert a user whose password is `PASSWORD`. Low bcrypt cost keeps tests fast.
    pub async fn seed_user(&self, email: &str, role: Role) -> i64 {
        let password_hash = bcrypt::hash(PASSWORD, 4).unwrap();
        self.state
            .users
            .create(NewUser {
                name: email.split('@').next().unwrap().to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await
            .unwrap()
            .id
    }

    /// Session cookie header value for `user_id`.
    pub fn cookie_for(&self, user_id: i64) -> String {
        let token = session::create_session(&self.state.db, user_id, 1).unwrap();
        format!("{}={}", self.state.config.auth.cookie_name, token)
    }

    pub async fn seed_post(&self, user_id: i64, tag: &str, kind: PostKind, content: &str) -> Post {
        self.state
            .posts
            .create(NewPost {
                user_id,
                tag: tag.to_string(),
                kind,
                content: content.to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(Method::DELETE).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn post_multipart(&self, uri: &str, body: Vec<u8>, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }
}

/// Multipart body from text fields plus an optional `image` file part.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}
