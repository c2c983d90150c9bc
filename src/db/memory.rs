//! In-memory store used by the test suite. Mirrors the Postgres
//! implementation's semantics: one lock acquisition per operation, so every
//! read sees a consistent view and writes are linearizable.

use crate::db::{CatalogStore, ResultStore, StoreError};
use crate::domain::models::{
    CatalogSnapshot, DiagnosticResult, NewDiagnosticResult, NewPillar, NewQuestion, Pillar,
    PillarPatch, PillarQuestions, Question, QuestionPatch, Settings, SettingsPatch,
};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug)]
struct Inner {
    pillars: Vec<Pillar>,
    questions: Vec<Question>,
    results: Vec<DiagnosticResult>,
    settings: Settings,
}

#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                pillars: Vec::new(),
                questions: Vec::new(),
                results: Vec::new(),
                settings: Settings {
                    logo: None,
                    navbar_logo: None,
                    updated_at: Utc::now(),
                },
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn snapshot(&self) -> Result<CatalogSnapshot, StoreError> {
        let inner = self.inner.read().await;

        let mut pillars = inner.pillars.clone();
        pillars.sort_by(|a, b| {
            (a.order_index, &a.name, a.id).cmp(&(b.order_index, &b.name, b.id))
        });

        let entries = pillars
            .into_iter()
            .map(|pillar| {
                let mut questions: Vec<Question> = inner
                    .questions
                    .iter()
                    .filter(|q| q.pillar_id == pillar.id)
                    .cloned()
                    .collect();
                questions.sort_by_key(|q| (q.order_index, q.id));
                PillarQuestions { pillar, questions }
            })
            .collect();

        Ok(CatalogSnapshot { pillars: entries })
    }

    async fn insert_pillar(&self, new: NewPillar) -> Result<Pillar, StoreError> {
        let now = Utc::now();
        let pillar = Pillar {
            id: Uuid::new_v4(),
            name: new.name,
            order_index: new.order_index,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.pillars.push(pillar.clone());
        Ok(pillar)
    }

    async fn update_pillar(
        &self,
        id: Uuid,
        patch: PillarPatch,
    ) -> Result<Option<Pillar>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(pillar) = inner.pillars.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            pillar.name = name;
        }
        if let Some(order_index) = patch.order_index {
            pillar.order_index = order_index;
        }
        pillar.updated_at = Utc::now();
        Ok(Some(pillar.clone()))
    }

    async fn delete_pillar(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.pillars.len();
        inner.pillars.retain(|p| p.id != id);
        if inner.pillars.len() == before {
            return Ok(false);
        }
        inner.questions.retain(|q| q.pillar_id != id);
        Ok(true)
    }

    async fn insert_question(&self, new: NewQuestion) -> Result<Question, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.pillars.iter().any(|p| p.id == new.pillar_id) {
            return Err(StoreError::UnknownPillar(new.pillar_id));
        }
        let now = Utc::now();
        let question = Question {
            id: Uuid::new_v4(),
            pillar_id: new.pillar_id,
            text: new.text,
            points: new.points,
            positive_answer: new.positive_answer,
            answer_type: new.answer_type,
            order_index: new.order_index,
            created_at: now,
            updated_at: now,
        };
        inner.questions.push(question.clone());
        Ok(question)
    }

    async fn update_question(
        &self,
        id: Uuid,
        patch: QuestionPatch,
    ) -> Result<Option<Question>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(question) = inner.questions.iter_mut().find(|q| q.id == id) else {
            return Ok(None);
        };
        if let Some(text) = patch.text {
            question.text = text;
        }
        if let Some(points) = patch.points {
            question.points = points;
        }
        if let Some(positive_answer) = patch.positive_answer {
            question.positive_answer = positive_answer;
        }
        if let Some(answer_type) = patch.answer_type {
            question.answer_type = answer_type;
        }
        if let Some(order_index) = patch.order_index {
            question.order_index = order_index;
        }
        question.updated_at = Utc::now();
        Ok(Some(question.clone()))
    }

    async fn delete_question(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.questions.len();
        inner.questions.retain(|q| q.id != id);
        Ok(inner.questions.len() != before)
    }

    async fn settings(&self) -> Result<Settings, StoreError> {
        Ok(self.inner.read().await.settings.clone())
    }

    async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(logo) = patch.logo {
            inner.settings.logo = Some(logo);
        }
        if let Some(navbar_logo) = patch.navbar_logo {
            inner.settings.navbar_logo = Some(navbar_logo);
        }
        inner.settings.updated_at = Utc::now();
        Ok(inner.settings.clone())
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn insert(&self, new: NewDiagnosticResult) -> Result<DiagnosticResult, StoreError> {
        let result = DiagnosticResult {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            company_data: new.company_data,
            answers: new.answers,
            pillar_scores: new.scored.pillar_scores,
            total_score: new.scored.total_score,
            max_possible_score: new.scored.max_possible_score,
            percentage_score: new.scored.percentage_score,
            created_at: Utc::now(),
        };
        self.inner.write().await.results.push(result.clone());
        Ok(result)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<DiagnosticResult>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.results.iter().find(|r| r.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<DiagnosticResult>, StoreError> {
        let inner = self.inner.read().await;
        // Results are appended in creation order, so reverse iteration is
        // newest-first even when timestamps collide.
        Ok(inner
            .results
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.results.len();
        inner.results.retain(|r| r.id != id);
        Ok(inner.results.len() != before)
    }
}
