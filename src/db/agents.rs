use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{map_unique_violation, StoreError};
use crate::models::agent::{Agent, AgentUpdate, NewAgent};

/// Persistence access for the agent collection.
#[async_trait]
pub trait AgentStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Agent>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Agent>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Agent>, StoreError>;
    async fn find_by_mobile_number(&self, mobile_number: &str)
        -> Result<Option<Agent>, StoreError>;
    async fn insert(&self, agent: NewAgent) -> Result<Agent, StoreError>;
    async fn update(&self, id: Uuid, update: AgentUpdate) -> Result<Option<Agent>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub struct PgAgentStore {
    pool: PgPool,
}

impl PgAgentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentStore for PgAgentStore {
    async fn find_all(&self) -> Result<Vec<Agent>, StoreError> {
        let agents = sqlx::query_as::<_, Agent>("SELECT * FROM agents")
            .fetch_all(&self.pool)
            .await?;
        Ok(agents)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Agent>, StoreError> {
        let agent = sqlx::query_as::<_, Agent>("SELECT * FROM agents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(agent)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Agent>, StoreError> {
        let agent = sqlx::query_as::<_, Agent>("SELECT * FROM agents WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(agent)
    }

    async fn find_by_mobile_number(
        &self,
        mobile_number: &str,
    ) -> Result<Option<Agent>, StoreError> {
        let agent = sqlx::query_as::<_, Agent>("SELECT * FROM agents WHERE mobile_number = $1")
            .bind(mobile_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(agent)
    }

    async fn insert(&self, agent: NewAgent) -> Result<Agent, StoreError> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Agent>(
            r#"
            INSERT INTO agents (
                id, agent_id, first_name, last_name, email, mobile_number,
                gender, date_of_birth, id_proof_file_path,
                address_proof_file_path, photo_file_path, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(agent.agent_id)
        .bind(&agent.first_name)
        .bind(&agent.last_name)
        .bind(&agent.email)
        .bind(&agent.mobile_number)
        .bind(&agent.gender)
        .bind(&agent.date_of_birth)
        .bind(&agent.documents.id_proof)
        .bind(&agent.documents.address_proof)
        .bind(&agent.documents.photo)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        tracing::info!("Created agent record: id={}", created.id);
        Ok(created)
    }

    async fn update(&self, id: Uuid, update: AgentUpdate) -> Result<Option<Agent>, StoreError> {
        // Merge semantics: absent fields keep their stored values.
        let agent = sqlx::query_as::<_, Agent>(
            r#"
            UPDATE agents
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                mobile_number = COALESCE($5, mobile_number),
                gender = COALESCE($6, gender),
                date_of_birth = COALESCE($7, date_of_birth),
                id_proof_file_path = COALESCE($8, id_proof_file_path),
                address_proof_file_path = COALESCE($9, address_proof_file_path),
                photo_file_path = COALESCE($10, photo_file_path),
                updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(&update.mobile_number)
        .bind(&update.gender)
        .bind(&update.date_of_birth)
        .bind(&update.documents.id_proof)
        .bind(&update.documents.address_proof)
        .bind(&update.documents.photo)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(agent)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM agents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
