use crate::db::CatalogStore;
use crate::domain::models::{AnswerType, AnswerValue, NewPillar, NewQuestion};
use anyhow::Result;

struct SeedQuestion<'a> {
    text: &'a str,
    points: i32,
    positive_answer: AnswerValue,
    answer_type: AnswerType,
}

struct SeedPillar<'a> {
    name: &'a str,
    questions: &'a [SeedQuestion<'a>],
}

const DEFAULT_CATALOG: &[SeedPillar] = &[
    SeedPillar {
        name: "Gestão e Estratégia",
        questions: &[
            SeedQuestion {
                text: "A empresa possui planejamento estratégico formalizado?",
                points: 2,
                positive_answer: AnswerValue::Sim,
                answer_type: AnswerType::Binary,
            },
            SeedQuestion {
                text: "As metas são acompanhadas com indicadores periódicos?",
                points: 2,
                positive_answer: AnswerValue::Sim,
                answer_type: AnswerType::Binary,
            },
            SeedQuestion {
                text: "As decisões importantes dependem exclusivamente do dono?",
                points: 1,
                positive_answer: AnswerValue::Nao,
                answer_type: AnswerType::Binary,
            },
        ],
    },
    SeedPillar {
        name: "Finanças",
        questions: &[
            SeedQuestion {
                text: "A empresa possui fluxo de caixa projetado para os próximos meses?",
                points: 3,
                positive_answer: AnswerValue::Sim,
                answer_type: AnswerType::Binary,
            },
            SeedQuestion {
                text: "As finanças pessoais dos sócios se misturam com as da empresa?",
                points: 2,
                positive_answer: AnswerValue::Nao,
                answer_type: AnswerType::Binary,
            },
            SeedQuestion {
                text: "Existe reserva financeira para emergências?",
                points: 1,
                positive_answer: AnswerValue::Sim,
                answer_type: AnswerType::Binary,
            },
        ],
    },
    SeedPillar {
        name: "Marketing e Vendas",
        questions: &[
            SeedQuestion {
                text: "A empresa conhece o perfil do seu cliente ideal?",
                points: 2,
                positive_answer: AnswerValue::Sim,
                answer_type: AnswerType::Binary,
            },
            SeedQuestion {
                text: "Há um processo comercial definido, da prospecção ao fechamento?",
                points: 2,
                positive_answer: AnswerValue::Sim,
                answer_type: AnswerType::Binary,
            },
            SeedQuestion {
                text: "A empresa anuncia em canais digitais?",
                points: 1,
                positive_answer: AnswerValue::Sim,
                answer_type: AnswerType::Ternary,
            },
        ],
    },
    SeedPillar {
        name: "Pessoas e Cultura",
        questions: &[
            SeedQuestion {
                text: "Os papéis e responsabilidades da equipe estão documentados?",
                points: 2,
                positive_answer: AnswerValue::Sim,
                answer_type: AnswerType::Ternary,
            },
            SeedQuestion {
                text: "A rotatividade de colaboradores é alta?",
                points: 1,
                positive_answer: AnswerValue::Nao,
                answer_type: AnswerType::Ternary,
            },
        ],
    },
    SeedPillar {
        name: "Tecnologia e Segurança",
        questions: &[
            SeedQuestion {
                text: "Os dados críticos da empresa possuem backup automatizado?",
                points: 3,
                positive_answer: AnswerValue::Sim,
                answer_type: AnswerType::Binary,
            },
            SeedQuestion {
                text: "O acesso aos sistemas é individual e protegido por senha?",
                points: 2,
                positive_answer: AnswerValue::Sim,
                answer_type: AnswerType::Ternary,
            },
        ],
    },
];

/// Populate the default Portuguese catalog on first boot. A non-empty
/// catalog is left untouched.
pub async fn seed_catalog(store: &dyn CatalogStore) -> Result<()> {
    let snapshot = store.snapshot().await?;
    if !snapshot.is_empty() {
        return Ok(());
    }

    for (pillar_index, seed) in DEFAULT_CATALOG.iter().enumerate() {
        let pillar = store
            .insert_pillar(NewPillar {
                name: seed.name.to_string(),
                order_index: pillar_index as i32,
            })
            .await?;

        for (question_index, question) in seed.questions.iter().enumerate() {
            store
                .insert_question(NewQuestion {
                    pillar_id: pillar.id,
                    text: question.text.to_string(),
                    points: question.points,
                    positive_answer: question.positive_answer,
                    answer_type: question.answer_type,
                    order_index: question_index as i32,
                })
                .await?;
        }
    }

    tracing::info!("Seeded default catalog: {} pillars", DEFAULT_CATALOG.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    #[tokio::test]
    async fn seeds_once_and_only_when_empty() {
        let store = MemoryStore::new();

        seed_catalog(&store).await.unwrap();
        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.pillars.len(), DEFAULT_CATALOG.len());

        seed_catalog(&store).await.unwrap();
        let again = store.snapshot().await.unwrap();
        assert_eq!(again.pillars.len(), DEFAULT_CATALOG.len());
    }
}
