use crate::domain::models::{AnswerValue, CatalogSnapshot, PillarScore, ScoredDiagnostic};
use crate::scoring::validation::{validate_answers, ValidationError};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// What a neutral TERNARY answer does to the pillar's achievable maximum.
///
/// `ExcludeFromMax` removes the question from the denominator so an `N/A`
/// never lowers the percentage; `CountTowardMax` keeps the question's points
/// in the denominator while still earning zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NeutralPolicy {
    #[default]
    ExcludeFromMax,
    CountTowardMax,
}

/// Validate and score one submission against a catalog snapshot.
///
/// Pure: identical inputs always produce identical output, and no I/O
/// happens here. Persistence stamps `created_at` later.
pub fn score(
    answers: &HashMap<Uuid, String>,
    snapshot: &CatalogSnapshot,
    neutral_policy: NeutralPolicy,
) -> Result<ScoredDiagnostic, ValidationError> {
    let validated = validate_answers(snapshot, answers)?;
    Ok(score_validated(&validated, snapshot, neutral_policy))
}

/// Tally an already-validated answer set. The map must come from
/// `validate_answers` against the same snapshot; ids absent from it
/// contribute nothing.
pub(crate) fn score_validated(
    answers: &BTreeMap<Uuid, AnswerValue>,
    snapshot: &CatalogSnapshot,
    neutral_policy: NeutralPolicy,
) -> ScoredDiagnostic {
    let mut pillar_scores = BTreeMap::new();
    let mut total_score = 0;
    let mut max_possible_score = 0;

    for entry in &snapshot.pillars {
        let mut earned = 0;
        let mut max = 0;

        for question in &entry.questions {
            let Some(value) = answers.get(&question.id) else {
                continue;
            };

            if *value == question.positive_answer {
                earned += question.points;
                max += question.points;
            } else if value.is_neutral() {
                if neutral_policy == NeutralPolicy::CountTowardMax {
                    max += question.points;
                }
            } else {
                max += question.points;
            }
        }

        total_score += earned;
        max_possible_score += max;
        pillar_scores.insert(
            entry.pillar.id,
            PillarScore {
                earned,
                max,
                percentage: percentage(earned, max),
            },
        );
    }

    ScoredDiagnostic {
        pillar_scores,
        total_score,
        max_possible_score,
        percentage_score: percentage(total_score, max_possible_score),
    }
}

fn percentage(earned: i32, max: i32) -> f64 {
    if max > 0 {
        f64::from(earned) / f64::from(max) * 100.0
    } else {
        0.0
    }
}


#[cfg(test)]
mod tests {
    use super::tests_support::{add_pillar, binary_question, snapshot_with, ternary_question};
    use super::*;

    fn answers_of(pairs: &[(Uuid, &str)]) -> HashMap<Uuid, String> {
        pairs
            .iter()
            .map(|(id, value)| (*id, value.to_string()))
            .collect()
    }

    #[test]
    fn security_pillar_scenario() {
        let q1 = binary_question(2, AnswerValue::Sim);
        let q2 = binary_question(3, AnswerValue::Nao);
        let snapshot = snapshot_with("Segurança", vec![q1.clone(), q2.clone()]);
        let pillar_id = snapshot.pillars[0].pillar.id;

        let answers = answers_of(&[(q1.id, "SIM"), (q2.id, "SIM")]);
        let scored = score(&answers, &snapshot, NeutralPolicy::ExcludeFromMax).unwrap();

        let pillar = &scored.pillar_scores[&pillar_id];
        assert_eq!(pillar.earned, 2);
        assert_eq!(pillar.max, 5);
        assert_eq!(pillar.percentage, 40.0);
        assert_eq!(scored.total_score, 2);
        assert_eq!(scored.max_possible_score, 5);
        assert_eq!(scored.percentage_score, 40.0);
    }

    #[test]
    fn neutral_excluded_from_max_by_default() {
        let q = ternary_question(4, AnswerValue::Sim);
        let snapshot = snapshot_with("Tecnologia", vec![q.clone()]);
        let pillar_id = snapshot.pillars[0].pillar.id;

        let answers = answers_of(&[(q.id, "N/A")]);
        let scored = score(&answers, &snapshot, NeutralPolicy::ExcludeFromMax).unwrap();

        let pillar = &scored.pillar_scores[&pillar_id];
        assert_eq!(pillar.earned, 0);
        assert_eq!(pillar.max, 0);
        assert_eq!(pillar.percentage, 0.0);
        assert_eq!(scored.max_possible_score, 0);
        assert_eq!(scored.percentage_score, 0.0);
    }

    #[test]
    fn neutral_counts_toward_max_under_alternative_policy() {
        let q1 = ternary_question(4, AnswerValue::Sim);
        let q2 = binary_question(4, AnswerValue::Sim);
        let snapshot = snapshot_with("Tecnologia", vec![q1.clone(), q2.clone()]);

        let answers = answers_of(&[(q1.id, "N/A"), (q2.id, "SIM")]);
        let scored = score(&answers, &snapshot, NeutralPolicy::CountTowardMax).unwrap();

        assert_eq!(scored.total_score, 4);
        assert_eq!(scored.max_possible_score, 8);
        assert_eq!(scored.percentage_score, 50.0);
    }

    #[test]
    fn negative_answer_earns_zero_but_counts_toward_max() {
        let q = binary_question(3, AnswerValue::Nao);
        let snapshot = snapshot_with("Finanças", vec![q.clone()]);

        let answers = answers_of(&[(q.id, "SIM")]);
        let scored = score(&answers, &snapshot, NeutralPolicy::ExcludeFromMax).unwrap();

        assert_eq!(scored.total_score, 0);
        assert_eq!(scored.max_possible_score, 3);
        assert_eq!(scored.percentage_score, 0.0);
    }

    #[test]
    fn empty_catalog_scores_zero_without_error() {
        let snapshot = CatalogSnapshot::default();
        let answers = answers_of(&[(Uuid::new_v4(), "SIM")]);

        let scored = score(&answers, &snapshot, NeutralPolicy::ExcludeFromMax).unwrap();
        assert_eq!(scored.total_score, 0);
        assert_eq!(scored.max_possible_score, 0);
        assert_eq!(scored.percentage_score, 0.0);
        assert!(scored.pillar_scores.is_empty());
    }

    #[test]
    fn missing_answer_rejects_whole_submission() {
        let q1 = binary_question(1, AnswerValue::Sim);
        let q2 = binary_question(1, AnswerValue::Sim);
        let snapshot = snapshot_with("Gestão", vec![q1.clone(), q2.clone()]);

        let answers = answers_of(&[(q1.id, "SIM")]);
        let err = score(&answers, &snapshot, NeutralPolicy::ExcludeFromMax).unwrap_err();
        assert_eq!(err, ValidationError::MissingAnswer { question_id: q2.id });
    }

    #[test]
    fn illegal_value_rejects_whole_submission() {
        let q = binary_question(1, AnswerValue::Sim);
        let snapshot = snapshot_with("Gestão", vec![q.clone()]);

        let answers = answers_of(&[(q.id, "MAYBE")]);
        let err = score(&answers, &snapshot, NeutralPolicy::ExcludeFromMax).unwrap_err();
        assert_eq!(
            err,
            ValidationError::IllegalAnswer {
                question_id: q.id,
                value: "MAYBE".to_string(),
            }
        );
    }

    #[test]
    fn score_stays_within_bounds_and_percentage_is_derived() {
        let mut snapshot = CatalogSnapshot::default();
        let q1 = binary_question(2, AnswerValue::Sim);
        let q2 = binary_question(5, AnswerValue::Nao);
        let q3 = ternary_question(3, AnswerValue::Sim);
        add_pillar(&mut snapshot, "Gestão", vec![q1.clone(), q2.clone()]);
        add_pillar(&mut snapshot, "Pessoas", vec![q3.clone()]);

        let answers = answers_of(&[(q1.id, "SIM"), (q2.id, "NÃO"), (q3.id, "NÃO")]);
        let scored = score(&answers, &snapshot, NeutralPolicy::ExcludeFromMax).unwrap();

        assert!(scored.total_score >= 0);
        assert!(scored.total_score <= scored.max_possible_score);
        assert_eq!(scored.total_score, 7);
        assert_eq!(scored.max_possible_score, 10);
        assert_eq!(
            scored.percentage_score,
            f64::from(scored.total_score) / f64::from(scored.max_possible_score) * 100.0
        );
    }

    #[test]
    fn scoring_is_deterministic() {
        let q1 = binary_question(2, AnswerValue::Sim);
        let q2 = ternary_question(3, AnswerValue::Nao);
        let snapshot = snapshot_with("Gestão", vec![q1.clone(), q2.clone()]);

        let answers = answers_of(&[(q1.id, "SIM"), (q2.id, "N/A")]);
        let first = score(&answers, &snapshot, NeutralPolicy::ExcludeFromMax).unwrap();
        let second = score(&answers, &snapshot, NeutralPolicy::ExcludeFromMax).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn unknown_ids_do_not_affect_the_score() {
        let q = binary_question(2, AnswerValue::Sim);
        let snapshot = snapshot_with("Gestão", vec![q.clone()]);

        let mut answers = answers_of(&[(q.id, "SIM")]);
        let baseline = score(&answers, &snapshot, NeutralPolicy::ExcludeFromMax).unwrap();

        answers.insert(Uuid::new_v4(), "NÃO".to_string());
        let with_stray = score(&answers, &snapshot, NeutralPolicy::ExcludeFromMax).unwrap();

        assert_eq!(baseline, with_stray);
    }

    #[test]
    fn pillar_without_questions_scores_zero() {
        let mut snapshot = CatalogSnapshot::default();
        add_pillar(&mut snapshot, "Vazio", vec![]);
        let pillar_id = snapshot.pillars[0].pillar.id;

        let scored = score(&HashMap::new(), &snapshot, NeutralPolicy::ExcludeFromMax).unwrap();
        let pillar = &scored.pillar_scores[&pillar_id];
        assert_eq!((pillar.earned, pillar.max, pillar.percentage), (0, 0, 0.0));
    }
}
