use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

use crate::core::{exclusions::canonical, Assignment, ExclusionSet, MatchError};
use crate::models::{AssignmentRecord, ExclusionRecord, Participant, ParticipantId};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] MatchError),
}

/// Read-only view of everything a matching round needs
#[derive(Debug, Clone)]
pub struct RoundSnapshot {
    pub participants: Vec<Participant>,
    pub exclusions: ExclusionSet<ParticipantId>,
}

impl RoundSnapshot {
    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.user_id).collect()
    }

    pub fn find(&self, user_id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }
}

/// PostgreSQL store for participants, exclusions and the current round
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Register a participant, refreshing their names if already present
    ///
    /// Returns the stored row and whether it existed before. The wishlist of
    /// an existing participant is kept.
    pub async fn upsert_participant(
        &self,
        user_id: ParticipantId,
        username: Option<&str>,
        first_name: &str,
        last_name: Option<&str>,
    ) -> Result<(Participant, bool), PostgresError> {
        let existed = self.get_participant(user_id).await?.is_some();

        let query = r#"
            INSERT INTO participants (user_id, username, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id)
            DO UPDATE SET
                username = EXCLUDED.username,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name
            RETURNING user_id, username, first_name, last_name, wishlist, registered_at
        "#;

        let participant = sqlx::query_as::<_, Participant>(query)
            .bind(user_id)
            .bind(username)
            .bind(first_name)
            .bind(last_name)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Upserted participant {} (existed: {})", user_id, existed);

        Ok((participant, existed))
    }

    pub async fn get_participant(
        &self,
        user_id: ParticipantId,
    ) -> Result<Option<Participant>, PostgresError> {
        let query = r#"
            SELECT user_id, username, first_name, last_name, wishlist, registered_at
            FROM participants
            WHERE user_id = $1
        "#;

        let participant = sqlx::query_as::<_, Participant>(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(participant)
    }

    pub async fn is_registered(&self, user_id: ParticipantId) -> Result<bool, PostgresError> {
        Ok(self.get_participant(user_id).await?.is_some())
    }

    /// All participants ordered by first name
    pub async fn list_participants(&self) -> Result<Vec<Participant>, PostgresError> {
        let query = r#"
            SELECT user_id, username, first_name, last_name, wishlist, registered_at
            FROM participants
            ORDER BY first_name, user_id
        "#;

        let participants = sqlx::query_as::<_, Participant>(query)
            .fetch_all(&self.pool)
            .await?;

        Ok(participants)
    }

    /// Remove a participant with every exclusion and assignment referencing them
    pub async fn remove_participant(&self, user_id: ParticipantId) -> Result<bool, PostgresError> {
        let mut tx = self.pool.begin().await?;

        let exclusions = sqlx::query("DELETE FROM exclusions WHERE user1_id = $1 OR user2_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let assignments =
            sqlx::query("DELETE FROM assignments WHERE giver_id = $1 OR receiver_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

        let removed = sqlx::query("DELETE FROM participants WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Removed participant {} ({} exclusions, {} assignments)",
            user_id,
            exclusions.rows_affected(),
            assignments.rows_affected()
        );

        Ok(removed.rows_affected() > 0)
    }

    pub async fn update_wishlist(
        &self,
        user_id: ParticipantId,
        wishlist: &str,
    ) -> Result<(), PostgresError> {
        let result = sqlx::query("UPDATE participants SET wishlist = $1 WHERE user_id = $2")
            .bind(wishlist)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PostgresError::NotFound(format!("participant {}", user_id)));
        }

        Ok(())
    }

    pub async fn get_wishlist(&self, user_id: ParticipantId) -> Result<Option<String>, PostgresError> {
        let participant = self
            .get_participant(user_id)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("participant {}", user_id)))?;

        Ok(participant.wishlist().map(str::to_string))
    }

    /// Register an exclusion; returns `false` if it already existed
    pub async fn add_exclusion(
        &self,
        user1_id: ParticipantId,
        user2_id: ParticipantId,
    ) -> Result<bool, PostgresError> {
        let (low, high) = canonical(user1_id, user2_id)?;

        let query = r#"
            INSERT INTO exclusions (user1_id, user2_id)
            VALUES ($1, $2)
            ON CONFLICT (user1_id, user2_id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(low)
            .bind(high)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drop an exclusion; returns `false` if it was absent
    pub async fn remove_exclusion(
        &self,
        user1_id: ParticipantId,
        user2_id: ParticipantId,
    ) -> Result<bool, PostgresError> {
        let (low, high) = canonical(user1_id, user2_id)?;

        let result = sqlx::query("DELETE FROM exclusions WHERE user1_id = $1 AND user2_id = $2")
            .bind(low)
            .bind(high)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_exclusions(&self) -> Result<Vec<ExclusionRecord>, PostgresError> {
        let rows = sqlx::query_as::<_, ExclusionRecord>(
            "SELECT id, user1_id, user2_id FROM exclusions ORDER BY user1_id, user2_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn has_exclusion(
        &self,
        user1_id: ParticipantId,
        user2_id: ParticipantId,
    ) -> Result<bool, PostgresError> {
        let (low, high) = match canonical(user1_id, user2_id) {
            Ok(pair) => pair,
            Err(_) => return Ok(false),
        };

        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM exclusions WHERE user1_id = $1 AND user2_id = $2",
        )
        .bind(low)
        .bind(high)
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    /// Participants and exclusions read in one repeatable-read transaction
    pub async fn load_round_snapshot(&self) -> Result<RoundSnapshot, PostgresError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT user_id, username, first_name, last_name, wishlist, registered_at
            FROM participants
            ORDER BY first_name, user_id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let exclusions =
            sqlx::query_as::<_, ExclusionRecord>("SELECT id, user1_id, user2_id FROM exclusions")
                .fetch_all(&mut *tx)
                .await?;

        tx.commit().await?;

        let exclusions =
            ExclusionSet::from_pairs(exclusions.into_iter().map(|e| (e.user1_id, e.user2_id)))?;

        tracing::debug!(
            "Loaded round snapshot: {} participants, {} exclusions",
            participants.len(),
            exclusions.len()
        );

        Ok(RoundSnapshot {
            participants,
            exclusions,
        })
    }

    /// Discard the previous round and store a new one atomically
    pub async fn replace_assignments(
        &self,
        round_id: uuid::Uuid,
        assignment: &Assignment<ParticipantId>,
    ) -> Result<(), PostgresError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM assignments").execute(&mut *tx).await?;

        for pair in assignment {
            sqlx::query(
                r#"
                INSERT INTO assignments (giver_id, receiver_id, round_id, created_at)
                VALUES ($1, $2, $3, NOW())
                "#,
            )
            .bind(pair.giver)
            .bind(pair.receiver)
            .bind(round_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!("Stored round {} with {} assignments", round_id, assignment.len());

        Ok(())
    }

    pub async fn clear_assignments(&self) -> Result<u64, PostgresError> {
        let result = sqlx::query("DELETE FROM assignments").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Receiver the given participant buys for in the current round
    pub async fn get_receiver(
        &self,
        giver_id: ParticipantId,
    ) -> Result<Option<ParticipantId>, PostgresError> {
        let row = sqlx::query("SELECT receiver_id FROM assignments WHERE giver_id = $1")
            .bind(giver_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("receiver_id")))
    }

    pub async fn get_giver(
        &self,
        receiver_id: ParticipantId,
    ) -> Result<Option<ParticipantId>, PostgresError> {
        let row = sqlx::query("SELECT giver_id FROM assignments WHERE receiver_id = $1")
            .bind(receiver_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("giver_id")))
    }

    pub async fn list_assignments(&self) -> Result<Vec<AssignmentRecord>, PostgresError> {
        let rows = sqlx::query_as::<_, AssignmentRecord>(
            "SELECT giver_id, receiver_id, round_id, created_at FROM assignments ORDER BY created_at, giver_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
