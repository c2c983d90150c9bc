use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Member => "MEMBER",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MEMBER" => Ok(Role::Member),
            _ => Err(()),
        }
    }
}

/// Caller identity as resolved by the session layer. Identity issuance is
/// external; the core only ever consumes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User { id: Uuid, role: Role },
}

impl Identity {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Identity::User { id, .. } => Some(*id),
            Identity::Anonymous => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Identity::User { role: Role::Admin, .. })
    }
}

/// A submitted answer. `N/A` is only legal on TERNARY questions and never
/// earns points.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type)]
#[sqlx(type_name = "answer_value")]
pub enum AnswerValue {
    #[serde(rename = "SIM")]
    #[sqlx(rename = "SIM")]
    Sim,
    #[serde(rename = "NÃO", alias = "NAO")]
    #[sqlx(rename = "NÃO")]
    Nao,
    #[serde(rename = "N/A", alias = "NA", alias = "NÃO SE APLICA", alias = "NAO SE APLICA")]
    #[sqlx(rename = "N/A")]
    NaoSeAplica,
}

impl AnswerValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerValue::Sim => "SIM",
            AnswerValue::Nao => "NÃO",
            AnswerValue::NaoSeAplica => "N/A",
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, AnswerValue::NaoSeAplica)
    }
}

impl TryFrom<&str> for AnswerValue {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_uppercase().as_str() {
            "SIM" => Ok(AnswerValue::Sim),
            "NÃO" | "NAO" => Ok(AnswerValue::Nao),
            "N/A" | "NA" | "NÃO SE APLICA" | "NAO SE APLICA" => Ok(AnswerValue::NaoSeAplica),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "answer_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AnswerType {
    Binary,
    Ternary,
}

impl AnswerType {
    pub fn legal_values(&self) -> &'static [AnswerValue] {
        match self {
            AnswerType::Binary => &[AnswerValue::Sim, AnswerValue::Nao],
            AnswerType::Ternary => &[
                AnswerValue::Sim,
                AnswerValue::Nao,
                AnswerValue::NaoSeAplica,
            ],
        }
    }

    pub fn accepts(&self, value: AnswerValue) -> bool {
        self.legal_values().contains(&value)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct Pillar {
    pub id: Uuid,
    pub name: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub pillar_id: Uuid,
    pub text: String,
    pub points: i32,
    pub positive_answer: AnswerValue,
    pub answer_type: AnswerType,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewPillar {
    pub name: String,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PillarPatch {
    pub name: Option<String>,
    pub order_index: Option<i32>,
}

fn default_points() -> i32 {
    1
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewQuestion {
    pub pillar_id: Uuid,
    pub text: String,
    #[serde(default = "default_points")]
    pub points: i32,
    pub positive_answer: AnswerValue,
    pub answer_type: AnswerType,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct QuestionPatch {
    pub text: Option<String>,
    pub points: Option<i32>,
    pub positive_answer: Option<AnswerValue>,
    pub answer_type: Option<AnswerType>,
    pub order_index: Option<i32>,
}

/// One pillar with its questions, both in display order.
#[derive(Clone, Debug, Serialize)]
pub struct PillarQuestions {
    pub pillar: Pillar,
    pub questions: Vec<Question>,
}

/// A consistent point-in-time view of the whole catalog, taken once per
/// scoring operation.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CatalogSnapshot {
    pub pillars: Vec<PillarQuestions>,
}

impl CatalogSnapshot {
    pub fn is_empty(&self) -> bool {
        self.pillars.is_empty()
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.pillars.iter().flat_map(|entry| entry.questions.iter())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PillarScore {
    pub earned: i32,
    pub max: i32,
    pub percentage: f64,
}

/// Output of the scoring engine. Maps are ordered so identical inputs
/// serialize identically.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoredDiagnostic {
    pub pillar_scores: BTreeMap<Uuid, PillarScore>,
    pub total_score: i32,
    pub max_possible_score: i32,
    pub percentage_score: f64,
}

#[derive(Clone, Debug)]
pub struct NewDiagnosticResult {
    pub user_id: Uuid,
    pub company_data: serde_json::Value,
    pub answers: BTreeMap<Uuid, AnswerValue>,
    pub scored: ScoredDiagnostic,
}

/// The immutable, owner-scoped record of one scored submission. There is no
/// update path for results anywhere in the crate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_data: serde_json::Value,
    pub answers: BTreeMap<Uuid, AnswerValue>,
    pub pillar_scores: BTreeMap<Uuid, PillarScore>,
    pub total_score: i32,
    pub max_possible_score: i32,
    pub percentage_score: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct Settings {
    pub logo: Option<String>,
    pub navbar_logo: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SettingsPatch {
    pub logo: Option<String>,
    pub navbar_logo: Option<String>,
}
