//! Testing utilities for the Folio workspace
//!
//! Shared test helpers, fixtures, and an in-memory backend.

#![allow(missing_docs)]

use async_trait::async_trait;
use folio_core::storage::AUTH_TOKEN_KEY;
use folio_core::{
    ApiClient, ApiError, AuthResponse, Certificate, Credentials, KeyValueStore, MemoryStore,
    Notification, NotificationLevel, Notifier, PasswordChange, Project, ProjectCategory,
    Registration, Resource, Skill, UploadFile, User,
};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Backend operation, for call logs and injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    Create,
    Read,
    Update,
    Remove,
    Upload,
    Login,
    Register,
    Logout,
    CurrentUser,
    ChangePassword,
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: Operation,
    pub resource: Option<Resource>,
    pub id: Option<String>,
    pub payload: Option<Value>,
    /// Token found in storage when the call arrived
    pub token: Option<String>,
}

#[derive(Debug)]
struct Account {
    password: String,
    user: User,
}

#[derive(Debug, Default)]
struct StubState {
    collections: BTreeMap<Resource, Vec<Value>>,
    hero: Map<String, Value>,
    accounts: BTreeMap<String, Account>,
    sessions: BTreeMap<String, String>,
    issued: u64,
    next_id: u64,
    calls: Vec<Call>,
    failures: BTreeMap<Operation, ApiError>,
}

/// In-memory backend speaking the same contract as the HTTP client
///
/// Reads the bearer token from the shared storage on every call, the way
/// `HttpApiClient` does, so session tests exercise the real token
/// lifecycle. Writes require a valid token; creates enforce a small set
/// of required fields per resource and answer 400 when one is missing.
/// Tokens are issued as `t1`, `t2`, ...
pub struct StubBackend {
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<StubState>,
}

impl StubBackend {
    /// Create backend reading tokens from `storage`
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: Mutex::new(StubState::default()),
        }
    }

    /// Backend with its own storage and the admin account; returns both
    pub fn with_admin() -> (Arc<Self>, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let backend =
            Self::new(storage.clone()).with_account(ADMIN_EMAIL, ADMIN_PASSWORD, admin_user());
        (Arc::new(backend), storage)
    }

    /// Add an account
    #[must_use]
    pub fn with_account(self, email: &str, password: &str, user: User) -> Self {
        self.state.lock().accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user,
            },
        );
        self
    }

    /// Seed records into a collection
    #[must_use]
    pub fn with_records(self, resource: Resource, records: Vec<Value>) -> Self {
        self.state
            .lock()
            .collections
            .entry(resource)
            .or_default()
            .extend(records);
        self
    }

    /// Seed the hero section
    #[must_use]
    pub fn with_hero(self, hero: Value) -> Self {
        if let Value::Object(map) = hero {
            self.state.lock().hero = map;
        }
        self
    }

    /// Make every call of `operation` fail with `error` until cleared
    pub fn fail(&self, operation: Operation, error: ApiError) {
        self.state.lock().failures.insert(operation, error);
    }

    /// Remove injected failures
    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Every call so far
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Calls of one operation
    #[must_use]
    pub fn calls_of(&self, operation: Operation) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation == operation)
            .collect()
    }

    /// Records currently held for a collection
    #[must_use]
    pub fn records(&self, resource: Resource) -> Vec<Value> {
        self.state
            .lock()
            .collections
            .get(&resource)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `token` belongs to a live session
    #[must_use]
    pub fn is_session_live(&self, token: &str) -> bool {
        self.state.lock().sessions.contains_key(token)
    }

    fn begin(
        &self,
        operation: Operation,
        resource: Option<Resource>,
        id: Option<&str>,
        payload: Option<&Value>,
    ) -> Result<(), ApiError> {
        let token = self.storage.get(AUTH_TOKEN_KEY).ok().flatten();
        let mut state = self.state.lock();
        state.calls.push(Call {
            operation,
            resource,
            id: id.map(str::to_string),
            payload: payload.cloned(),
            token,
        });
        match state.failures.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn authorized_user(&self) -> Result<User, ApiError> {
        let token = self
            .storage
            .get(AUTH_TOKEN_KEY)
            .ok()
            .flatten()
            .ok_or_else(|| ApiError::status_error(401, "Not authorized, no token"))?;
        let state = self.state.lock();
        state
            .sessions
            .get(&token)
            .and_then(|email| state.accounts.get(email))
            .map(|account| account.user.clone())
            .ok_or_else(|| ApiError::status_error(401, "Not authorized, token failed"))
    }

    fn issue_token(state: &mut StubState, email: &str) -> String {
        state.issued += 1;
        let token = format!("t{}", state.issued);
        state.sessions.insert(token.clone(), email.to_string());
        token
    }
}

fn required_fields(resource: Resource) -> &'static [&'static str] {
    match resource {
        Resource::Education => &["period", "degree", "institution"],
        Resource::Experience => &["period", "role", "company"],
        Resource::Skill => &["title", "icon"],
        Resource::Certificate => &["title", "issuer"],
        Resource::Publication => &["title", "journal"],
        Resource::Project => &["title", "description"],
        Resource::HomeSection => &[],
    }
}

fn matches_id(record: &Value, id: &str) -> bool {
    record.get("_id").and_then(Value::as_str) == Some(id)
}

fn merge(target: &mut Map<String, Value>, patch: &Value) {
    if let Value::Object(fields) = patch {
        for (key, value) in fields {
            if key != "_id" && key != "id" {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn not_found() -> ApiError {
    ApiError::status_error(404, "Not found")
}

#[async_trait]
impl ApiClient for StubBackend {
    async fn create(&self, resource: Resource, payload: Value) -> Result<Value, ApiError> {
        self.begin(Operation::Create, Some(resource), None, Some(&payload))?;
        self.authorized_user()?;

        for field in required_fields(resource) {
            let present = payload
                .get(*field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty());
            if !present {
                return Err(ApiError::status_error(400, format!("{field} is required")));
            }
        }

        let mut state = self.state.lock();
        state.next_id += 1;
        let mut record = match payload {
            Value::Object(map) => map,
            _ => return Err(ApiError::status_error(400, "Body must be an object")),
        };
        record.insert(
            "_id".to_string(),
            json!(format!("{}-{}", resource.path(), state.next_id)),
        );
        let record = Value::Object(record);
        state
            .collections
            .entry(resource)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn read(&self, resource: Resource, id: Option<String>) -> Result<Value, ApiError> {
        self.begin(Operation::Read, Some(resource), id.as_deref(), None)?;
        let state = self.state.lock();
        if resource.is_singleton() {
            return Ok(Value::Object(state.hero.clone()));
        }
        let records = state.collections.get(&resource).cloned().unwrap_or_default();
        match id {
            None => Ok(Value::Array(records)),
            Some(id) => records
                .into_iter()
                .find(|r| matches_id(r, &id))
                .ok_or_else(not_found),
        }
    }

    async fn update(
        &self,
        resource: Resource,
        id: Option<String>,
        payload: Value,
    ) -> Result<Value, ApiError> {
        self.begin(Operation::Update, Some(resource), id.as_deref(), Some(&payload))?;
        self.authorized_user()?;

        let mut state = self.state.lock();
        let Some(id) = id else {
            if !resource.is_singleton() {
                return Err(not_found());
            }
            merge(&mut state.hero, &payload);
            return Ok(Value::Object(state.hero.clone()));
        };
        let record = state
            .collections
            .get_mut(&resource)
            .and_then(|records| records.iter_mut().find(|r| matches_id(r, &id)))
            .ok_or_else(not_found)?;
        if let Value::Object(map) = &mut *record {
            merge(map, &payload);
        }
        Ok(record.clone())
    }

    async fn remove(&self, resource: Resource, id: String) -> Result<(), ApiError> {
        self.begin(Operation::Remove, Some(resource), Some(&id), None)?;
        self.authorized_user()?;

        let mut state = self.state.lock();
        let records = state.collections.entry(resource).or_default();
        let before = records.len();
        records.retain(|r| !matches_id(r, &id));
        if records.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn upload_file(&self, file: UploadFile) -> Result<String, ApiError> {
        self.begin(Operation::Upload, None, None, None)?;
        self.authorized_user()?;
        if file.bytes.is_empty() {
            return Err(ApiError::status_error(400, "No file uploaded"));
        }
        Ok(format!("https://cdn.example.com/uploads/{}", file.file_name))
    }

    async fn login(&self, credentials: Credentials) -> Result<AuthResponse, ApiError> {
        self.begin(Operation::Login, None, None, None)?;
        let mut state = self.state.lock();
        let user = match state.accounts.get(&credentials.email) {
            Some(account) if account.password == credentials.password => account.user.clone(),
            _ => return Err(ApiError::status_error(401, "Invalid email or password")),
        };
        let token = Self::issue_token(&mut state, &credentials.email);
        Ok(AuthResponse { token, user })
    }

    async fn register(&self, registration: Registration) -> Result<AuthResponse, ApiError> {
        self.begin(Operation::Register, None, None, None)?;
        let mut state = self.state.lock();
        if state.accounts.contains_key(&registration.email) {
            return Err(ApiError::status_error(400, "User already exists"));
        }
        state.next_id += 1;
        let user = User {
            id: format!("user-{}", state.next_id),
            email: registration.email.clone(),
            name: registration.name,
            role: "user".to_string(),
            avatar_url: None,
        };
        state.accounts.insert(
            registration.email.clone(),
            Account {
                password: registration.password,
                user: user.clone(),
            },
        );
        let token = Self::issue_token(&mut state, &registration.email);
        Ok(AuthResponse { token, user })
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.begin(Operation::Logout, None, None, None)?;
        if let Some(token) = self.storage.get(AUTH_TOKEN_KEY).ok().flatten() {
            self.state.lock().sessions.remove(&token);
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.begin(Operation::CurrentUser, None, None, None)?;
        self.authorized_user()
    }

    async fn change_password(&self, change: PasswordChange) -> Result<(), ApiError> {
        self.begin(Operation::ChangePassword, None, None, None)?;
        let user = self.authorized_user()?;
        let mut state = self.state.lock();
        let account = state
            .accounts
            .values_mut()
            .find(|a| a.user.id == user.id)
            .ok_or_else(not_found)?;
        if account.password != change.current_password {
            return Err(ApiError::status_error(400, "Current password is incorrect"));
        }
        account.password = change.new_password;
        Ok(())
    }
}

/// Notifier that keeps everything it is sent
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.seen.lock().iter().map(|n| n.message.clone()).collect()
    }

    #[must_use]
    pub fn count(&self, level: NotificationLevel) -> usize {
        self.seen.lock().iter().filter(|n| n.level == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}

pub fn admin_user() -> User {
    User {
        id: "1".to_string(),
        email: ADMIN_EMAIL.to_string(),
        name: "Admin".to_string(),
        role: "admin".to_string(),
        avatar_url: None,
    }
}

pub fn sample_skill() -> Skill {
    Skill {
        id: String::new(),
        title: "Languages".to_string(),
        icon: "Code".to_string(),
        skills: vec!["Go".to_string(), "Rust".to_string()],
    }
}

pub fn sample_certificate() -> Certificate {
    Certificate {
        id: String::new(),
        title: "AWS Solutions Architect".to_string(),
        issuer: "Amazon Web Services".to_string(),
        date: "2024-03".to_string(),
        credential_id: "AWS-123".to_string(),
        image: "https://cdn.example.com/aws.png".to_string(),
        link: "https://aws.example.com/verify/AWS-123".to_string(),
        skills: vec!["Cloud".to_string()],
    }
}

pub fn sample_project() -> Project {
    Project {
        id: String::new(),
        title: "Folio".to_string(),
        description: "Portfolio engine".to_string(),
        overview: "Content client and admin dashboard".to_string(),
        image: "https://cdn.example.com/folio.png".to_string(),
        images: Vec::new(),
        categories: vec![ProjectCategory::Web],
        technologies: vec!["Rust".to_string(), "Tokio".to_string()],
        live_url: None,
        github_url: Some("https://github.com/example/folio".to_string()),
        featured: true,
    }
}
