use crate::domain::models::{AnswerValue, CatalogSnapshot};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Rejection of a submitted answer set. Validation failures are
/// deterministic: retrying the same submission reproduces the same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no answer submitted for question {question_id}")]
    MissingAnswer { question_id: Uuid },
    #[error("\"{value}\" is not a legal answer for question {question_id}")]
    IllegalAnswer { question_id: Uuid, value: String },
    #[error("company_data payload is missing")]
    MissingCompanyData,
}

/// Check a raw submission against the catalog snapshot and return the typed
/// answer set.
///
/// The catalog is authoritative: every question in the snapshot must be
/// answered with a value legal for its answer type, and submitted ids the
/// snapshot does not know are dropped silently.
pub fn validate_answers(
    snapshot: &CatalogSnapshot,
    answers: &HashMap<Uuid, String>,
) -> Result<BTreeMap<Uuid, AnswerValue>, ValidationError> {
    let mut validated = BTreeMap::new();

    for question in snapshot.questions() {
        let raw = answers
            .get(&question.id)
            .ok_or(ValidationError::MissingAnswer {
                question_id: question.id,
            })?;

        let value =
            AnswerValue::try_from(raw.as_str()).map_err(|_| ValidationError::IllegalAnswer {
                question_id: question.id,
                value: raw.clone(),
            })?;

        if !question.answer_type.accepts(value) {
            return Err(ValidationError::IllegalAnswer {
                question_id: question.id,
                value: raw.clone(),
            });
        }

        validated.insert(question.id, value);
    }

    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::engine::tests_support::{binary_question, snapshot_with, ternary_question};

    #[test]
    fn accepts_complete_legal_submission() {
        let q1 = binary_question(2, AnswerValue::Sim);
        let q2 = ternary_question(3, AnswerValue::Nao);
        let snapshot = snapshot_with("Gestão", vec![q1.clone(), q2.clone()]);

        let answers = HashMap::from([
            (q1.id, "SIM".to_string()),
            (q2.id, "N/A".to_string()),
        ]);

        let validated = validate_answers(&snapshot, &answers).unwrap();
        assert_eq!(validated[&q1.id], AnswerValue::Sim);
        assert_eq!(validated[&q2.id], AnswerValue::NaoSeAplica);
    }

    #[test]
    fn missing_answer_is_a_hard_failure() {
        let q1 = binary_question(1, AnswerValue::Sim);
        let q2 = binary_question(1, AnswerValue::Sim);
        let snapshot = snapshot_with("Finanças", vec![q1.clone(), q2.clone()]);

        let answers = HashMap::from([(q1.id, "SIM".to_string())]);

        assert_eq!(
            validate_answers(&snapshot, &answers),
            Err(ValidationError::MissingAnswer { question_id: q2.id })
        );
    }

    #[test]
    fn neutral_on_binary_question_is_illegal() {
        let q = binary_question(1, AnswerValue::Sim);
        let snapshot = snapshot_with("Operações", vec![q.clone()]);

        let answers = HashMap::from([(q.id, "N/A".to_string())]);

        assert_eq!(
            validate_answers(&snapshot, &answers),
            Err(ValidationError::IllegalAnswer {
                question_id: q.id,
                value: "N/A".to_string(),
            })
        );
    }

    #[test]
    fn unknown_value_is_illegal() {
        let q = binary_question(1, AnswerValue::Sim);
        let snapshot = snapshot_with("Operações", vec![q.clone()]);

        let answers = HashMap::from([(q.id, "MAYBE".to_string())]);

        assert!(matches!(
            validate_answers(&snapshot, &answers),
            Err(ValidationError::IllegalAnswer { question_id, .. }) if question_id == q.id
        ));
    }

    #[test]
    fn unknown_question_ids_are_dropped() {
        let q = binary_question(1, AnswerValue::Sim);
        let snapshot = snapshot_with("Pessoas", vec![q.clone()]);

        let stray = Uuid::new_v4();
        let answers = HashMap::from([
            (q.id, "NÃO".to_string()),
            (stray, "SIM".to_string()),
        ]);

        let validated = validate_answers(&snapshot, &answers).unwrap();
        assert_eq!(validated.len(), 1);
        assert!(!validated.contains_key(&stray));
    }
}
