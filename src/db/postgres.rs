use crate::db::{CatalogStore, ResultStore, StoreError};
use crate::domain::models::{
    AnswerType, AnswerValue, CatalogSnapshot, DiagnosticResult, NewDiagnosticResult, NewPillar,
    NewQuestion, Pillar, PillarPatch, PillarQuestions, PillarScore, Question, QuestionPatch,
    Settings, SettingsPatch,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// One row of the catalog join. Question columns are nullable because a
/// pillar may not have questions yet.
#[derive(FromRow)]
struct SnapshotRow {
    pillar_id: Uuid,
    pillar_name: String,
    pillar_order: i32,
    pillar_created_at: DateTime<Utc>,
    pillar_updated_at: DateTime<Utc>,
    question_id: Option<Uuid>,
    question_text: Option<String>,
    points: Option<i32>,
    positive_answer: Option<AnswerValue>,
    answer_type: Option<AnswerType>,
    question_order: Option<i32>,
    question_created_at: Option<DateTime<Utc>>,
    question_updated_at: Option<DateTime<Utc>>,
}

#[derive(FromRow)]
struct ResultRow {
    id: Uuid,
    user_id: Uuid,
    company_data: serde_json::Value,
    answers: Json<BTreeMap<Uuid, AnswerValue>>,
    pillar_scores: Json<BTreeMap<Uuid, PillarScore>>,
    total_score: i32,
    max_possible_score: i32,
    percentage_score: f64,
    created_at: DateTime<Utc>,
}

impl From<ResultRow> for DiagnosticResult {
    fn from(row: ResultRow) -> Self {
        DiagnosticResult {
            id: row.id,
            user_id: row.user_id,
            company_data: row.company_data,
            answers: row.answers.0,
            pillar_scores: row.pillar_scores.0,
            total_score: row.total_score,
            max_possible_score: row.max_possible_score,
            percentage_score: row.percentage_score,
            created_at: row.created_at,
        }
    }
}

const RESULT_COLUMNS: &str = "id, user_id, company_data, answers, pillar_scores, \
     total_score, max_possible_score, percentage_score, created_at";

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn snapshot(&self) -> Result<CatalogSnapshot, StoreError> {
        // A single statement so the view is consistent even under
        // concurrent catalog writes.
        let rows = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT p.id AS pillar_id,
                   p.name AS pillar_name,
                   p.order_index AS pillar_order,
                   p.created_at AS pillar_created_at,
                   p.updated_at AS pillar_updated_at,
                   q.id AS question_id,
                   q.text AS question_text,
                   q.points,
                   q.positive_answer,
                   q.answer_type,
                   q.order_index AS question_order,
                   q.created_at AS question_created_at,
                   q.updated_at AS question_updated_at
            FROM pillars p
            LEFT JOIN questions q ON q.pillar_id = p.id
            ORDER BY p.order_index, p.name, p.id, q.order_index, q.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut snapshot = CatalogSnapshot::default();
        for row in rows {
            if snapshot
                .pillars
                .last()
                .map(|entry| entry.pillar.id != row.pillar_id)
                .unwrap_or(true)
            {
                snapshot.pillars.push(PillarQuestions {
                    pillar: Pillar {
                        id: row.pillar_id,
                        name: row.pillar_name,
                        order_index: row.pillar_order,
                        created_at: row.pillar_created_at,
                        updated_at: row.pillar_updated_at,
                    },
                    questions: Vec::new(),
                });
            }

            if let (
                Some(id),
                Some(text),
                Some(points),
                Some(positive_answer),
                Some(answer_type),
                Some(order_index),
                Some(created_at),
                Some(updated_at),
            ) = (
                row.question_id,
                row.question_text,
                row.points,
                row.positive_answer,
                row.answer_type,
                row.question_order,
                row.question_created_at,
                row.question_updated_at,
            ) {
                if let Some(entry) = snapshot.pillars.last_mut() {
                    entry.questions.push(Question {
                        id,
                        pillar_id: row.pillar_id,
                        text,
                        points,
                        positive_answer,
                        answer_type,
                        order_index,
                        created_at,
                        updated_at,
                    });
                }
            }
        }

        Ok(snapshot)
    }

    async fn insert_pillar(&self, new: NewPillar) -> Result<Pillar, StoreError> {
        let pillar = sqlx::query_as::<_, Pillar>(
            r#"
            INSERT INTO pillars (id, name, order_index)
            VALUES ($1, $2, $3)
            RETURNING id, name, order_index, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.name)
        .bind(new.order_index)
        .fetch_one(&self.pool)
        .await?;
        Ok(pillar)
    }

    async fn update_pillar(
        &self,
        id: Uuid,
        patch: PillarPatch,
    ) -> Result<Option<Pillar>, StoreError> {
        let pillar = sqlx::query_as::<_, Pillar>(
            r#"
            UPDATE pillars
            SET name = COALESCE($2, name),
                order_index = COALESCE($3, order_index),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, order_index, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.order_index)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pillar)
    }

    async fn delete_pillar(&self, id: Uuid) -> Result<bool, StoreError> {
        // Questions go with it via ON DELETE CASCADE.
        let done = sqlx::query("DELETE FROM pillars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn insert_question(&self, new: NewQuestion) -> Result<Question, StoreError> {
        let pillar_id = new.pillar_id;
        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions
                (id, pillar_id, text, points, positive_answer, answer_type, order_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, pillar_id, text, points, positive_answer, answer_type,
                      order_index, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.pillar_id)
        .bind(new.text)
        .bind(new.points)
        .bind(new.positive_answer)
        .bind(new.answer_type)
        .bind(new.order_index)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.constraint() == Some("questions_pillar_id_fkey") => {
                StoreError::UnknownPillar(pillar_id)
            }
            _ => StoreError::from(err),
        })?;
        Ok(question)
    }

    async fn update_question(
        &self,
        id: Uuid,
        patch: QuestionPatch,
    ) -> Result<Option<Question>, StoreError> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            UPDATE questions
            SET text = COALESCE($2, text),
                points = COALESCE($3, points),
                positive_answer = COALESCE($4, positive_answer),
                answer_type = COALESCE($5, answer_type),
                order_index = COALESCE($6, order_index),
                updated_at = now()
            WHERE id = $1
            RETURNING id, pillar_id, text, points, positive_answer, answer_type,
                      order_index, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.text)
        .bind(patch.points)
        .bind(patch.positive_answer)
        .bind(patch.answer_type)
        .bind(patch.order_index)
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }

    async fn delete_question(&self, id: Uuid) -> Result<bool, StoreError> {
        let done = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn settings(&self) -> Result<Settings, StoreError> {
        let settings = sqlx::query_as::<_, Settings>(
            "SELECT logo, navbar_logo, updated_at FROM settings LIMIT 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, StoreError> {
        let settings = sqlx::query_as::<_, Settings>(
            r#"
            UPDATE settings
            SET logo = COALESCE($1, logo),
                navbar_logo = COALESCE($2, navbar_logo),
                updated_at = now()
            RETURNING logo, navbar_logo, updated_at
            "#,
        )
        .bind(patch.logo)
        .bind(patch.navbar_logo)
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }
}

#[async_trait]
impl ResultStore for PostgresStore {
    async fn insert(&self, new: NewDiagnosticResult) -> Result<DiagnosticResult, StoreError> {
        let row = sqlx::query_as::<_, ResultRow>(&format!(
            r#"
            INSERT INTO diagnostic_results
                (id, user_id, company_data, answers, pillar_scores,
                 total_score, max_possible_score, percentage_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {RESULT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.company_data)
        .bind(Json(new.answers))
        .bind(Json(new.scored.pillar_scores))
        .bind(new.scored.total_score)
        .bind(new.scored.max_possible_score)
        .bind(new.scored.percentage_score)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<DiagnosticResult>, StoreError> {
        let row = sqlx::query_as::<_, ResultRow>(&format!(
            "SELECT {RESULT_COLUMNS} FROM diagnostic_results WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DiagnosticResult>, StoreError> {
        let rows = sqlx::query_as::<_, ResultRow>(&format!(
            r#"
            SELECT {RESULT_COLUMNS}
            FROM diagnostic_results
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let done = sqlx::query("DELETE FROM diagnostic_results WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
