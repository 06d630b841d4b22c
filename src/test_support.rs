//! In-memory store substitutes and request helpers shared by handler
//! tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use uuid::Uuid;

use crate::db::agents::AgentStore;
use crate::db::users::UserStore;
use crate::db::StoreError;
use crate::middleware::cors::OriginPolicy;
use crate::models::agent::{Agent, AgentUpdate, NewAgent};
use crate::models::error::DuplicateField;
use crate::models::user::{NewUser, User, UserUpdate};
use crate::storage::{BlobStore, StorageError};
use crate::AppState;

pub const TEST_ORIGIN: &str = "http://localhost:3000";

const BOUNDARY: &str = "test-boundary";

#[derive(Default)]
pub struct MemoryAgentStore {
    agents: Mutex<Vec<Agent>>,
    calls: AtomicUsize,
}

impl MemoryAgentStore {
    pub fn seed(&self, agent: Agent) {
        self.agents.lock().unwrap().push(agent);
    }

    pub fn count(&self) -> usize {
        self.agents.lock().unwrap().len()
    }

    /// Number of store operations handlers have issued.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AgentStore for MemoryAgentStore {
    async fn find_all(&self) -> Result<Vec<Agent>, StoreError> {
        self.touch();
        Ok(self.agents.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Agent>, StoreError> {
        self.touch();
        Ok(self
            .agents
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Agent>, StoreError> {
        self.touch();
        Ok(self
            .agents
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_mobile_number(
        &self,
        mobile_number: &str,
    ) -> Result<Option<Agent>, StoreError> {
        self.touch();
        Ok(self
            .agents
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.mobile_number == mobile_number)
            .cloned())
    }

    async fn insert(&self, agent: NewAgent) -> Result<Agent, StoreError> {
        self.touch();
        let mut agents = self.agents.lock().unwrap();

        // Mirror the unique constraints the real store enforces.
        if agents.iter().any(|a| a.email == agent.email) {
            return Err(StoreError::Duplicate(DuplicateField::Email));
        }
        if agents.iter().any(|a| a.mobile_number == agent.mobile_number) {
            return Err(StoreError::Duplicate(DuplicateField::MobileNumber));
        }

        let now = Utc::now();
        let created = Agent {
            id: Uuid::new_v4(),
            agent_id: agent.agent_id,
            first_name: agent.first_name,
            last_name: agent.last_name,
            email: agent.email,
            mobile_number: agent.mobile_number,
            gender: agent.gender,
            date_of_birth: agent.date_of_birth,
            id_proof_file_path: agent.documents.id_proof,
            address_proof_file_path: agent.documents.address_proof,
            photo_file_path: agent.documents.photo,
            created_at: now,
            updated_at: now,
        };
        agents.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, update: AgentUpdate) -> Result<Option<Agent>, StoreError> {
        self.touch();
        let mut agents = self.agents.lock().unwrap();
        let Some(agent) = agents.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        if let Some(v) = update.first_name {
            agent.first_name = v;
        }
        if let Some(v) = update.last_name {
            agent.last_name = v;
        }
        if let Some(v) = update.email {
            agent.email = v;
        }
        if let Some(v) = update.mobile_number {
            agent.mobile_number = v;
        }
        if let Some(v) = update.gender {
            agent.gender = v;
        }
        if let Some(v) = update.date_of_birth {
            agent.date_of_birth = v;
        }
        if let Some(v) = update.documents.id_proof {
            agent.id_proof_file_path = Some(v);
        }
        if let Some(v) = update.documents.address_proof {
            agent.address_proof_file_path = Some(v);
        }
        if let Some(v) = update.documents.photo {
            agent.photo_file_path = Some(v);
        }
        agent.updated_at = Utc::now();

        Ok(Some(agent.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.touch();
        let mut agents = self.agents.lock().unwrap();
        let before = agents.len();
        agents.retain(|a| a.id != id);
        Ok(agents.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(DuplicateField::Email));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            user_id: user.user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            mobile_number: user.mobile_number,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(v) = update.first_name {
            user.first_name = v;
        }
        if let Some(v) = update.last_name {
            user.last_name = v;
        }
        if let Some(v) = update.email {
            user.email = v;
        }
        if let Some(v) = update.mobile_number {
            user.mobile_number = v;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

pub struct UploadRecord {
    pub name: String,
    pub size: usize,
    pub content_type: Option<String>,
}

#[derive(Default)]
pub struct MemoryBlobStore {
    pub uploads: Mutex<Vec<UploadRecord>>,
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn ensure_container(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn upload(
        &self,
        name: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        self.uploads.lock().unwrap().push(UploadRecord {
            name: name.to_string(),
            size: data.len(),
            content_type: content_type.map(str::to_string),
        });
        Ok(format!("http://blobs.test/agentfiles/{}", name))
    }
}

pub struct TestContext {
    pub agents: Arc<MemoryAgentStore>,
    pub users: Arc<MemoryUserStore>,
    pub blobs: Arc<MemoryBlobStore>,
}

pub fn test_app() -> (Router, TestContext) {
    let agents = Arc::new(MemoryAgentStore::default());
    let users = Arc::new(MemoryUserStore::default());
    let blobs = Arc::new(MemoryBlobStore::default());

    let state = AppState {
        agents: agents.clone(),
        users: users.clone(),
        blobs: blobs.clone(),
    };
    let policy = OriginPolicy::new(vec![TEST_ORIGIN.to_string()]);

    (
        crate::app(state, policy),
        TestContext {
            agents,
            users,
            blobs,
        },
    )
}

pub fn sample_agent(email: &str, mobile_number: &str) -> Agent {
    let now = Utc::now();
    Agent {
        id: Uuid::new_v4(),
        agent_id: Uuid::new_v4(),
        first_name: "Asha".to_string(),
        last_name: "Verma".to_string(),
        email: email.to_string(),
        mobile_number: mobile_number.to_string(),
        gender: "female".to_string(),
        date_of_birth: "1990-01-01".to_string(),
        id_proof_file_path: None,
        address_proof_file_path: None,
        photo_file_path: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ORIGIN, TEST_ORIGIN)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ORIGIN, TEST_ORIGIN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn multipart_request(
    method: &str,
    uri: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ORIGIN, TEST_ORIGIN)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
