#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use quicklink::domain::click_event::ClickEvent;
use quicklink::domain::click_worker::{ClickRecorder, run_click_worker};
use quicklink::domain::entities::{
    Click, NewClick, NewUrlRecord, NewUser, UrlPatch, UrlRecord, UrlStats, User,
};
use quicklink::domain::oauth::{OAuthIdentity, OAuthProvider};
use quicklink::domain::repositories::{
    ClickRepository, InsertUrlError, UrlRepository, UserRepository,
};
use quicklink::error::AppError;
use quicklink::infrastructure::memory::{RateLimiter, SessionStore};
use quicklink::routes::build_router;
use quicklink::state::{AppState, HttpSettings, Repositories, Runtime};

pub const BASE_URL: &str = "http://sho.rt";
pub const FRONTEND_URL: &str = "http://localhost:3000";

/// URL store that enforces short code uniqueness like the database does.
#[derive(Default)]
pub struct InMemoryUrlRepository {
    records: Mutex<Vec<UrlRecord>>,
    next_id: AtomicI64,
}

impl InMemoryUrlRepository {
    pub fn all(&self) -> Vec<UrlRecord> {
        self.records.lock().clone()
    }

    /// Inserts a record directly, bypassing allocation.
    pub fn seed(&self, code: &str, url: &str, owner_id: Option<i64>) -> UrlRecord {
        let now = Utc::now();
        let record = UrlRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            original_url: url.to_string(),
            short_code: code.to_string(),
            custom_alias: None,
            owner_id,
            title: None,
            description: None,
            expires_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.records.lock().push(record.clone());
        record
    }

    pub fn expire(&self, code: &str) {
        for r in self.records.lock().iter_mut() {
            if r.short_code == code {
                r.expires_at = Some(Utc::now() - chrono::Duration::hours(1));
            }
        }
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.records.lock().iter().any(|r| r.short_code == code))
    }

    async fn insert(&self, new_url: NewUrlRecord) -> Result<UrlRecord, InsertUrlError> {
        // Yield so concurrent allocations interleave between check and insert.
        tokio::task::yield_now().await;

        let mut records = self.records.lock();
        if records.iter().any(|r| r.short_code == new_url.short_code) {
            return Err(InsertUrlError::UniqueViolation);
        }

        let now = Utc::now();
        let record = UrlRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            original_url: new_url.draft.original_url,
            short_code: new_url.short_code,
            custom_alias: new_url.custom_alias,
            owner_id: new_url.draft.owner_id,
            title: new_url.draft.title,
            description: new_url.draft.description,
            expires_at: new_url.draft.expires_at,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn find_active_by_code_or_alias(
        &self,
        code: &str,
    ) -> Result<Option<UrlRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .iter()
            .find(|r| {
                r.is_active && (r.short_code == code || r.custom_alias.as_deref() == Some(code))
            })
            .cloned())
    }

    async fn find_for_owner(
        &self,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<UrlRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .iter()
            .find(|r| r.id == id && r.owner_id == Some(owner_id) && r.is_active)
            .cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UrlRecord>, AppError> {
        let mut owned: Vec<UrlRecord> = self
            .records
            .lock()
            .iter()
            .filter(|r| r.owner_id == Some(owner_id) && r.is_active)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(owned
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, AppError> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| r.owner_id == Some(owner_id) && r.is_active)
            .count() as i64)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        patch: UrlPatch,
    ) -> Result<Option<UrlRecord>, AppError> {
        let mut records = self.records.lock();
        let Some(r) = records
            .iter_mut()
            .find(|r| r.id == id && r.owner_id == Some(owner_id) && r.is_active)
        else {
            return Ok(None);
        };

        if let Some(url) = patch.original_url {
            r.original_url = url;
        }
        if patch.title.is_some() {
            r.title = patch.title;
        }
        if patch.description.is_some() {
            r.description = patch.description;
        }
        if patch.expires_at.is_some() {
            r.expires_at = patch.expires_at;
        }
        r.updated_at = Utc::now();

        Ok(Some(r.clone()))
    }

    async fn deactivate(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        let mut records = self.records.lock();
        match records
            .iter_mut()
            .find(|r| r.id == id && r.owner_id == Some(owner_id) && r.is_active)
        {
            Some(r) => {
                r.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_active(&self) -> Result<i64, AppError> {
        Ok(self.records.lock().iter().filter(|r| r.is_active).count() as i64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryClickRepository {
    clicks: Mutex<Vec<Click>>,
}

impl InMemoryClickRepository {
    pub fn len(&self) -> usize {
        self.clicks.lock().len()
    }
}

#[async_trait]
impl ClickRepository for InMemoryClickRepository {
    async fn append(&self, click: NewClick) -> Result<(), AppError> {
        let mut clicks = self.clicks.lock();
        let id = clicks.len() as i64 + 1;
        clicks.push(Click {
            id,
            url_id: click.url_id,
            ip_address: click.ip_address,
            user_agent: click.user_agent,
            referrer: click.referrer,
            device: click.device,
            os: click.os,
            browser: click.browser,
            clicked_at: click.clicked_at,
        });
        Ok(())
    }

    async fn list_for_url(
        &self,
        url_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Click>, AppError> {
        let mut clicks: Vec<Click> = self
            .clicks
            .lock()
            .iter()
            .filter(|c| c.url_id == url_id)
            .cloned()
            .collect();
        clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at));

        Ok(clicks
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn stats_for_url(&self, url_id: i64) -> Result<UrlStats, AppError> {
        let clicks = self.clicks.lock();
        let for_url: Vec<&Click> = clicks.iter().filter(|c| c.url_id == url_id).collect();

        let mut ips: Vec<&str> = for_url
            .iter()
            .filter_map(|c| c.ip_address.as_deref())
            .collect();
        ips.sort_unstable();
        ips.dedup();

        Ok(UrlStats {
            url_id,
            total_clicks: for_url.len() as i64,
            unique_clicks: ips.len() as i64,
            last_clicked: for_url.iter().map(|c| c.clicked_at).max(),
        })
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        Ok(self.clicks.lock().len() as i64)
    }
}

/// Click store whose writes never complete.
pub struct StalledClickRepository;

#[async_trait]
impl ClickRepository for StalledClickRepository {
    async fn append(&self, _click: NewClick) -> Result<(), AppError> {
        std::future::pending().await
    }

    async fn list_for_url(&self, _: i64, _: i64, _: i64) -> Result<Vec<Click>, AppError> {
        Ok(Vec::new())
    }

    async fn stats_for_url(&self, url_id: i64) -> Result<UrlStats, AppError> {
        Ok(UrlStats::empty(url_id))
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        Ok(0)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Id of a registered user.
    pub fn find(&self, email: &str) -> i64 {
        self.users
            .lock()
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.id)
            .unwrap()
    }

    fn insert_locked(users: &mut Vec<User>, new_user: NewUser) -> User {
        let now = Utc::now();
        let user = User {
            id: users.len() as i64 + 1,
            email: new_user.email,
            name: new_user.name,
            picture: new_user.picture,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock();
        if users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(AppError::conflict(
                "User already exists",
                serde_json::json!({}),
            ));
        }
        Ok(Self::insert_locked(&mut users, new_user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().iter().find(|u| u.id == id).cloned())
    }

    async fn upsert_oauth_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock();
        if let Some(u) = users
            .iter_mut()
            .find(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            u.name = new_user.name;
            u.picture = new_user.picture;
            u.updated_at = Utc::now();
            return Ok(u.clone());
        }
        Ok(Self::insert_locked(&mut users, new_user))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.users.lock().len() as i64)
    }
}

/// Provider that accepts a single code and returns a fixed identity.
pub struct StaticOAuthProvider {
    pub code: String,
    pub identity: OAuthIdentity,
}

impl StaticOAuthProvider {
    pub fn new(code: &str, email: &str) -> Self {
        Self {
            code: code.to_string(),
            identity: OAuthIdentity {
                email: email.to_string(),
                name: "OAuth User".to_string(),
                picture: Some("https://img.example.com/u.png".to_string()),
            },
        }
    }
}

#[async_trait]
impl OAuthProvider for StaticOAuthProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://accounts.example.com/authorize?client_id=test&state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthIdentity, AppError> {
        if code == self.code {
            Ok(self.identity.clone())
        } else {
            Err(AppError::unauthorized(
                "OAuth code exchange failed",
                serde_json::json!({}),
            ))
        }
    }
}

/// Knobs for [`TestApp::build`].
pub struct TestOptions {
    pub rate_limit: usize,
    pub rate_window: Duration,
    pub session_ttl: Duration,
    pub click_queue: usize,
    pub clicks: Option<Arc<dyn ClickRepository>>,
    pub oauth: Option<Arc<dyn OAuthProvider>>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            rate_limit: 1000,
            rate_window: Duration::from_secs(60),
            session_ttl: Duration::from_secs(3600),
            click_queue: 100,
            clicks: None,
            oauth: None,
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub urls: Arc<InMemoryUrlRepository>,
    pub clicks: Arc<InMemoryClickRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub sessions: Arc<SessionStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(TestOptions::default())
    }

    /// Builds the full router over in-memory storage, with the click worker
    /// running.
    pub fn build(options: TestOptions) -> Self {
        let urls = Arc::new(InMemoryUrlRepository::default());
        let clicks = Arc::new(InMemoryClickRepository::default());
        let users = Arc::new(InMemoryUserRepository::default());

        let click_store: Arc<dyn ClickRepository> = match options.clicks {
            Some(custom) => custom,
            None => clicks.clone(),
        };

        let (recorder, rx) = ClickRecorder::channel(options.click_queue);
        spawn_worker(rx, click_store.clone());

        let sessions = Arc::new(SessionStore::new(options.session_ttl));
        let state = AppState::new(
            Repositories {
                urls: urls.clone(),
                clicks: click_store,
                users: users.clone(),
            },
            test_settings(),
            Runtime {
                recorder,
                rate_limiter: Arc::new(RateLimiter::new(options.rate_limit, options.rate_window)),
                sessions: sessions.clone(),
                oauth: options.oauth,
            },
        );

        let app = build_router(state.clone(), FRONTEND_URL);
        let server = TestServer::new(app).unwrap();

        Self {
            server,
            state,
            urls,
            clicks,
            users,
            sessions,
        }
    }

    /// Registers a user and returns their JWT.
    pub async fn register(&self, email: &str) -> String {
        let response = self
            .server
            .post("/api/v1/auth/register")
            .json(&serde_json::json!({
                "email": email,
                "password": "correct-horse",
                "name": "Test User",
            }))
            .await;
        assert_eq!(response.status_code(), 201);

        response.json::<serde_json::Value>()["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Waits until the click worker has stored `n` clicks.
    pub async fn wait_for_clicks(&self, n: usize) {
        for _ in 0..200 {
            if self.clicks.len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {n} clicks, found {}", self.clicks.len());
    }
}

pub fn test_settings() -> HttpSettings {
    HttpSettings {
        base_url: BASE_URL.to_string(),
        secure_cookies: false,
        behind_proxy: true,
        short_code_length: 6,
        max_url_length: 2048,
        jwt_secret: "test-jwt-secret".to_string(),
        session_secret: "test-session-secret".to_string(),
    }
}

fn spawn_worker(rx: mpsc::Receiver<ClickEvent>, repo: Arc<dyn ClickRepository>) {
    tokio::spawn(run_click_worker(rx, repo, 2));
}

/// Extracts `name=value` from the response's `Set-Cookie` headers.
pub fn set_cookie(response: &axum_test::TestResponse, name: &str) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{name}=")))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}
