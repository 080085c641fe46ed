use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use league_api::client::LeagueApi;
use league_api::memory::MemoryStore;
use league_api::posts::{edit_post, publish_post, remove_post};
use league_api::session::{
    CredentialVerifier, NoCredentials, SESSION_COOKIE, SESSION_TTL_HOURS, SessionGuard,
    StaticCredentials, session_token_from_cookies,
};
use league_api::store::{BlobStore, PostStore};
use league_api::uploads::{UploadedFile, store_upload};
use league_api::{ApiError, LeagueError, NewPost, PostKind, PostUpdate};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

const BIND_ENV: &str = "LEAGUE_GATEWAY_BIND";
const DEFAULT_BIND: &str = "127.0.0.1:8080";
const UPLOAD_FIELD: &str = "file";

type Verifier = Box<dyn CredentialVerifier + Send + Sync>;

struct GatewayState<S> {
    guard: SessionGuard<Verifier>,
    store: S,
}

type Shared<S> = Arc<GatewayState<S>>;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct Reply {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl Reply {
    fn ok() -> Self {
        Self { ok: true, message: None, url: None }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self { ok: false, message: Some(message.into()), url: None }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let addr = env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let verifier: Verifier = match StaticCredentials::from_env() {
        Some(credentials) => Box::new(credentials),
        None => {
            warn!("LEAGUE_ADMIN_EMAIL / LEAGUE_ADMIN_PASSWORD not set; every login will fail");
            Box::new(NoCredentials)
        }
    };
    let guard = SessionGuard::new(verifier);

    let url = env::var("LEAGUE_API_URL").ok().filter(|v| !v.trim().is_empty());
    let seed = env::var("LEAGUE_SEED_JSON").ok().filter(|v| !v.trim().is_empty());
    match (url, seed) {
        (Some(url), _) => {
            let api_key = env::var("LEAGUE_API_KEY").unwrap_or_default();
            info!("posts and uploads go to {url}");
            serve(&addr, GatewayState { guard, store: LeagueApi::new(url, api_key) }).await
        }
        (None, Some(path)) => {
            let store = MemoryStore::from_seed_file(&PathBuf::from(path))?;
            info!("posts and uploads kept in memory");
            serve(&addr, GatewayState { guard, store }).await
        }
        (None, None) => {
            info!("posts and uploads kept in memory");
            serve(&addr, GatewayState { guard, store: MemoryStore::new() }).await
        }
    }
}

async fn serve<S>(addr: &str, state: GatewayState<S>) -> anyhow::Result<()>
where
    S: BlobStore + PostStore + Send + Sync + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!("admin gateway listening on {addr}");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

fn build_router<S>(state: GatewayState<S>) -> Router
where
    S: BlobStore + PostStore + Send + Sync + 'static,
{
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/admin/login", post(login::<S>))
        .route("/api/uploads", post(upload::<S>));
    let router = post_routes(router, "/api/blogs", PostKind::Blog);
    let router = post_routes(router, "/api/notices", PostKind::Notice);
    router.with_state(Arc::new(state))
}

/// List/create at `base`, read/update/delete at `base/:id`.
fn post_routes<S>(router: Router<Shared<S>>, base: &str, kind: PostKind) -> Router<Shared<S>>
where
    S: BlobStore + PostStore + Send + Sync + 'static,
{
    router
        .route(
            base,
            get(list_posts::<S>).post(create_post::<S>).layer(Extension(kind)),
        )
        .route(
            &format!("{base}/:id"),
            get(show_post::<S>)
                .put(update_post::<S>)
                .delete(delete_post::<S>)
                .layer(Extension(kind)),
        )
}

async fn healthz() -> &'static str {
    "ok"
}

fn session_cookie(token: &str) -> String {
    let max_age = SESSION_TTL_HOURS * 60 * 60;
    format!("{SESSION_COOKIE}={token}; HttpOnly; Max-Age={max_age}; Path=/")
}

async fn login<S>(
    State(state): State<Shared<S>>,
    Json(body): Json<LoginRequest>,
) -> Response
where
    S: BlobStore + PostStore + Send + Sync + 'static,
{
    match state.guard.login(&body.email, &body.password, Utc::now()) {
        Ok(session) => {
            let cookie = session_cookie(&session.token());
            ([(header::SET_COOKIE, cookie)], Json(Reply::ok())).into_response()
        }
        Err(e) => {
            (StatusCode::UNAUTHORIZED, Json(Reply::failed(e.to_string()))).into_response()
        }
    }
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session_token_from_cookies)
}

async fn upload<S>(
    State(state): State<Shared<S>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response
where
    S: BlobStore + PostStore + Send + Sync + 'static,
{
    let token = cookie_token(&headers);
    let now = Utc::now();

    // Nothing is read from the body until the session checks out.
    if let Err(e) = state.guard.authorize(token, now) {
        return failure(e);
    }
    let file = match read_upload(multipart).await {
        Ok(file) => file,
        Err(message) => {
            error!("upload form could not be read: {message}");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(Reply::failed(message))).into_response();
        }
    };

    match store_upload(&state.guard, token, &state.store, file, now).await {
        Ok(url) => Json(Reply { ok: true, message: None, url: Some(url) }).into_response(),
        Err(e) => failure(e),
    }
}

async fn list_posts<S>(
    State(state): State<Shared<S>>,
    Extension(kind): Extension<PostKind>,
) -> Response
where
    S: BlobStore + PostStore + Send + Sync + 'static,
{
    match state.store.list_posts(kind).await {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => failure(e.into()),
    }
}

async fn show_post<S>(
    State(state): State<Shared<S>>,
    Extension(kind): Extension<PostKind>,
    Path(id): Path<String>,
) -> Response
where
    S: BlobStore + PostStore + Send + Sync + 'static,
{
    match state.store.get_post(kind, &id).await {
        Ok(post) => Json(post).into_response(),
        Err(e) => failure(e.into()),
    }
}

async fn create_post<S>(
    State(state): State<Shared<S>>,
    Extension(kind): Extension<PostKind>,
    headers: HeaderMap,
    Json(body): Json<NewPost>,
) -> Response
where
    S: BlobStore + PostStore + Send + Sync + 'static,
{
    let token = cookie_token(&headers);
    match publish_post(&state.guard, token, &state.store, kind, body, Utc::now()).await {
        Ok(post) => Json(post).into_response(),
        Err(e) => failure(e),
    }
}

async fn update_post<S>(
    State(state): State<Shared<S>>,
    Extension(kind): Extension<PostKind>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<PostUpdate>,
) -> Response
where
    S: BlobStore + PostStore + Send + Sync + 'static,
{
    let token = cookie_token(&headers);
    match edit_post(&state.guard, token, &state.store, kind, &id, &body, Utc::now()).await {
        Ok(post) => Json(post).into_response(),
        Err(e) => failure(e),
    }
}

async fn delete_post<S>(
    State(state): State<Shared<S>>,
    Extension(kind): Extension<PostKind>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: BlobStore + PostStore + Send + Sync + 'static,
{
    let token = cookie_token(&headers);
    match remove_post(&state.guard, token, &state.store, kind, &id, Utc::now()).await {
        Ok(()) => Json(Reply::ok()).into_response(),
        Err(e) => failure(e),
    }
}

/// The first part named `file`, if the form has one.
async fn read_upload(mut multipart: Multipart) -> Result<Option<UploadedFile>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;
        return Ok(Some(UploadedFile { file_name, content_type, bytes: bytes.to_vec() }));
    }
    Ok(None)
}

fn failure(e: LeagueError) -> Response {
    let status = match &e {
        LeagueError::UnauthorizedMutation | LeagueError::InvalidCredentials => {
            StatusCode::UNAUTHORIZED
        }
        LeagueError::MissingUpload | LeagueError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LeagueError::Store(ApiError::NotFound(_)) => StatusCode::NOT_FOUND,
        _ => {
            error!("request failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(Reply::failed(e.to_string()))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_api::memory::StoreOp;
    use reqwest::multipart::{Form, Part};
    use serde_json::Value;

    struct TestGateway {
        base: String,
        store: MemoryStore,
        client: reqwest::Client,
    }

    async fn start() -> TestGateway {
        let store = MemoryStore::new();
        let state = GatewayState {
            guard: SessionGuard::new(Box::new(StaticCredentials::new(
                "admin@league.test",
                "s3cret",
                "Fixtures Secretary",
            )) as Verifier),
            store: store.clone(),
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        TestGateway { base: format!("http://{addr}"), store, client: reqwest::Client::new() }
    }

    impl TestGateway {
        async fn login(&self, password: &str) -> reqwest::Response {
            self.client
                .post(format!("{}/api/admin/login", self.base))
                .json(&serde_json::json!({ "email": "admin@league.test", "password": password }))
                .send()
                .await
                .unwrap()
        }

        /// Log in and return the `name=value` pair to send back as a cookie.
        async fn session_cookie(&self) -> String {
            let resp = self.login("s3cret").await;
            let set_cookie = resp.headers()[reqwest::header::SET_COOKIE].to_str().unwrap();
            set_cookie.split(';').next().unwrap().to_string()
        }

        async fn upload(&self, cookie: Option<&str>, form: Form) -> (u16, Value) {
            let mut request = self.client.post(format!("{}/api/uploads", self.base)).multipart(form);
            if let Some(cookie) = cookie {
                request = request.header(reqwest::header::COOKIE, cookie);
            }
            let resp = request.send().await.unwrap();
            let status = resp.status().as_u16();
            (status, resp.json().await.unwrap())
        }

        async fn send_json(
            &self,
            method: reqwest::Method,
            path: &str,
            cookie: Option<&str>,
            body: Option<Value>,
        ) -> (u16, Value) {
            let mut request = self.client.request(method, format!("{}{path}", self.base));
            if let Some(cookie) = cookie {
                request = request.header(reqwest::header::COOKIE, cookie);
            }
            if let Some(body) = body {
                request = request.json(&body);
            }
            let resp = request.send().await.unwrap();
            let status = resp.status().as_u16();
            (status, resp.json().await.unwrap())
        }
    }

    fn crest_form() -> Form {
        let part = Part::bytes(vec![0x89, b'P', b'N', b'G'])
            .file_name("club crest.png")
            .mime_str("image/png")
            .unwrap();
        Form::new().part("file", part)
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let gateway = start().await;
        let resp = gateway.login("s3cret").await;
        assert_eq!(resp.status().as_u16(), 200);
        let set_cookie = resp.headers()[reqwest::header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(set_cookie.starts_with("admin_session=super_admin|"));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Max-Age=86400"));
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_wrong_password_is_401() {
        let gateway = start().await;
        let resp = gateway.login("guess").await;
        assert_eq!(resp.status().as_u16(), 401);
        assert!(resp.headers().get(reqwest::header::SET_COOKIE).is_none());
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, serde_json::json!({ "ok": false, "message": "Invalid credentials" }));
    }

    #[tokio::test]
    async fn test_upload_without_session_is_401() {
        let gateway = start().await;
        let (status, body) = gateway.upload(None, crest_form()).await;
        assert_eq!(status, 401);
        assert_eq!(body["message"], "Unauthorized");

        let (status, _) = gateway.upload(Some("admin_session=forged"), crest_form()).await;
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_400() {
        let gateway = start().await;
        let cookie = gateway.session_cookie().await;
        let form = Form::new().text("caption", "no file here");
        let (status, body) = gateway.upload(Some(&cookie), form).await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "No file provided");
    }

    #[tokio::test]
    async fn test_upload_stores_file_and_returns_url() {
        let gateway = start().await;
        let cookie = gateway.session_cookie().await;
        let (status, body) = gateway.upload(Some(&cookie), crest_form()).await;
        assert_eq!(status, 200);
        assert_eq!(body["ok"], true);

        let url = body["url"].as_str().unwrap();
        let path = url.strip_prefix("memory://uploads/").unwrap();
        assert!(path.ends_with("_club_crest.png"));
        assert_eq!(gateway.store.blob(path), Some(vec![0x89, b'P', b'N', b'G']));
    }

    #[tokio::test]
    async fn test_healthz() {
        let gateway = start().await;
        let resp = gateway.client.get(format!("{}/healthz", gateway.base)).send().await.unwrap();
        assert_eq!(resp.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_blog_post_with_uploaded_image() {
        let gateway = start().await;
        let cookie = gateway.session_cookie().await;
        let (_, uploaded) = gateway.upload(Some(&cookie), crest_form()).await;
        let image_url = uploaded["url"].as_str().unwrap().to_string();

        let draft = serde_json::json!({
            "title": "Derby day",
            "body": "Class of 1998 host Class of 2003 on Saturday.",
            "image_url": image_url,
        });
        let (status, post) =
            gateway.send_json(reqwest::Method::POST, "/api/blogs", Some(&cookie), Some(draft)).await;
        assert_eq!(status, 200);
        assert_eq!(post["image_url"], image_url.as_str());
        assert_eq!(post["author_email"], "admin@league.test");
        assert_eq!(post["is_published"], true);

        let (status, blogs) = gateway.send_json(reqwest::Method::GET, "/api/blogs", None, None).await;
        assert_eq!(status, 200);
        assert_eq!(blogs[0]["title"], "Derby day");
        let (_, notices) = gateway.send_json(reqwest::Method::GET, "/api/notices", None, None).await;
        assert_eq!(notices, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_post_writes_need_a_session() {
        let gateway = start().await;
        let draft = serde_json::json!({ "title": "AGM", "body": "Friday 7pm" });
        let (status, body) =
            gateway.send_json(reqwest::Method::POST, "/api/notices", None, Some(draft)).await;
        assert_eq!(status, 401);
        assert_eq!(body["message"], "Unauthorized");
        let (_, notices) = gateway.send_json(reqwest::Method::GET, "/api/notices", None, None).await;
        assert_eq!(notices, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_post_without_title_is_400() {
        let gateway = start().await;
        let cookie = gateway.session_cookie().await;
        let draft = serde_json::json!({ "body": "no title" });
        let (status, _) =
            gateway.send_json(reqwest::Method::POST, "/api/notices", Some(&cookie), Some(draft)).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_edit_then_delete_notice() {
        let gateway = start().await;
        let cookie = gateway.session_cookie().await;
        let draft = serde_json::json!({ "title": "AGM", "body": "Friday 7pm" });
        let (_, post) =
            gateway.send_json(reqwest::Method::POST, "/api/notices", Some(&cookie), Some(draft)).await;
        let path = format!("/api/notices/{}", post["id"].as_str().unwrap());

        let edit = serde_json::json!({ "body": "Moved to Saturday 11am" });
        let (status, _) =
            gateway.send_json(reqwest::Method::PUT, &path, None, Some(edit.clone())).await;
        assert_eq!(status, 401);
        let (status, edited) =
            gateway.send_json(reqwest::Method::PUT, &path, Some(&cookie), Some(edit)).await;
        assert_eq!(status, 200);
        assert_eq!(edited["title"], "AGM");
        assert_eq!(edited["body"], "Moved to Saturday 11am");
        assert!(edited["updated_at"].is_string());

        let (status, shown) = gateway.send_json(reqwest::Method::GET, &path, None, None).await;
        assert_eq!(status, 200);
        assert_eq!(shown["body"], "Moved to Saturday 11am");

        let (status, body) = gateway.send_json(reqwest::Method::DELETE, &path, Some(&cookie), None).await;
        assert_eq!(status, 200);
        assert_eq!(body, serde_json::json!({ "ok": true }));
        let (status, _) = gateway.send_json(reqwest::Method::GET, &path, None, None).await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_store_failure_on_save_is_500_with_its_message() {
        let gateway = start().await;
        let cookie = gateway.session_cookie().await;
        gateway.store.fail_next(StoreOp::SavePost, "disk quota exceeded");
        let draft = serde_json::json!({ "title": "AGM", "body": "Friday 7pm" });
        let (status, body) =
            gateway.send_json(reqwest::Method::POST, "/api/blogs", Some(&cookie), Some(draft)).await;
        assert_eq!(status, 500);
        assert_eq!(body["message"], "disk quota exceeded");
    }
}
