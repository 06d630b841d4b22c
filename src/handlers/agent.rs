//! Agent CRUD handlers.
//!
//! Create and update accept multipart forms: scalar fields plus optional
//! file parts for the document slots. Each request runs the same linear
//! pipeline: parse, validate, check duplicates, upload files, persist.
//! File uploads and the database write are not atomic; an upload that
//! succeeded before a later failure leaves its blob behind.

use std::collections::HashMap;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::handlers::MessageResponse;
use crate::models::agent::{Agent, AgentUpdate, DocumentSlot, NewAgent};
use crate::models::error::{ApiError, DuplicateField};
use crate::storage::unique_blob_name;
use crate::AppState;

/// Required scalar attributes, checked in this order at creation time.
const REQUIRED_FIELDS: &[&str] = &[
    "firstName",
    "lastName",
    "email",
    "mobileNumber",
    "gender",
    "dateOfBirth",
];

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub message: String,
    pub agent: Agent,
}

/// One recognized file part from a multipart form.
struct UploadPart {
    slot: DocumentSlot,
    data: Vec<u8>,
    content_type: Option<String>,
}

#[derive(Default)]
struct ParsedForm {
    fields: HashMap<String, String>,
    files: Vec<UploadPart>,
}

/// Drains a multipart body into scalar fields and recognized file parts.
/// File parts naming no known document slot and parts with no content are
/// skipped, never persisted. For repeated scalar fields the first value
/// wins.
async fn collect_form(mut multipart: Multipart) -> Result<ParsedForm, ApiError> {
    let mut form = ParsedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if field.file_name().is_some() {
            let Some(slot) = DocumentSlot::from_field_name(&name) else {
                tracing::debug!("Skipping unrecognized file field: {}", name);
                continue;
            };
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Parse(e.to_string()))?;
            if data.is_empty() {
                continue;
            }
            form.files.push(UploadPart {
                slot,
                data: data.to_vec(),
                content_type,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::Parse(e.to_string()))?;
            form.fields.entry(name).or_insert(value);
        }
    }

    Ok(form)
}

fn new_agent_from_fields(fields: &HashMap<String, String>) -> Result<NewAgent, ApiError> {
    for &name in REQUIRED_FIELDS {
        if !fields.get(name).is_some_and(|v| !v.trim().is_empty()) {
            return Err(ApiError::Validation(name.to_string()));
        }
    }

    Ok(NewAgent {
        agent_id: Uuid::new_v4(),
        first_name: fields["firstName"].clone(),
        last_name: fields["lastName"].clone(),
        email: fields["email"].clone(),
        mobile_number: fields["mobileNumber"].clone(),
        gender: fields["gender"].clone(),
        date_of_birth: fields["dateOfBirth"].clone(),
        documents: Default::default(),
    })
}

/// Uploads every recognized file part in order, returning slot/URL pairs.
/// A failed upload aborts the batch; blobs uploaded before the failure
/// stay behind.
async fn upload_documents(
    state: &AppState,
    files: Vec<UploadPart>,
) -> Result<Vec<(DocumentSlot, String)>, ApiError> {
    let mut uploaded = Vec::with_capacity(files.len());
    for part in files {
        let blob_name = unique_blob_name(part.slot.as_str());
        let url = state
            .blobs
            .upload(&blob_name, part.data, part.content_type.as_deref())
            .await?;
        uploaded.push((part.slot, url));
    }
    Ok(uploaded)
}

/// Create a new agent
pub async fn create_agent(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<AgentResponse>), ApiError> {
    let multipart = multipart.map_err(|e| ApiError::Parse(e.to_string()))?;
    let form = collect_form(multipart).await?;

    let mut agent = new_agent_from_fields(&form.fields)?;

    if state.agents.find_by_email(&agent.email).await?.is_some() {
        return Err(ApiError::Duplicate(DuplicateField::Email));
    }
    if state
        .agents
        .find_by_mobile_number(&agent.mobile_number)
        .await?
        .is_some()
    {
        return Err(ApiError::Duplicate(DuplicateField::MobileNumber));
    }

    for (slot, url) in upload_documents(&state, form.files).await? {
        agent.documents.set(slot, url);
    }

    let agent = state.agents.insert(agent).await?;
    tracing::info!("Created agent: agent_id={}", agent.agent_id);

    Ok((
        StatusCode::CREATED,
        Json(AgentResponse {
            message: "Agent created successfully".to_string(),
            agent,
        }),
    ))
}

/// Get all agents
pub async fn get_agents(State(state): State<AppState>) -> Result<Json<Vec<Agent>>, ApiError> {
    let agents = state.agents.find_all().await?;
    Ok(Json(agents))
}

/// Get a specific agent by ID
pub async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Agent>, ApiError> {
    let agent = state
        .agents
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Agent"))?;
    Ok(Json(agent))
}

/// Update an agent
pub async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AgentResponse>, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::Parse(e.to_string()))?;
    let form = collect_form(multipart).await?;

    if state.agents.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound("Agent"));
    }

    // Required-field and duplicate pre-checks run only at creation; the
    // unique constraints still hold at the persistence boundary.
    let mut update = AgentUpdate::from_fields(&form.fields);
    for (slot, url) in upload_documents(&state, form.files).await? {
        update.documents.set(slot, url);
    }

    let agent = state
        .agents
        .update(id, update)
        .await?
        .ok_or(ApiError::NotFound("Agent"))?;

    Ok(Json(AgentResponse {
        message: "Agent updated successfully".to_string(),
        agent,
    }))
}

/// Delete an agent
pub async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.agents.delete(id).await? {
        return Err(ApiError::NotFound("Agent"));
    }

    Ok(Json(MessageResponse {
        message: "Agent deleted successfully".to_string(),
    }))
}
