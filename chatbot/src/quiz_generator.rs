use crate::error::{ChatbotError, Result};
use crate::gemini_service::GenerationClient;
use crate::literal;
use crate::models::*;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub const QUIZ_QUESTION_COUNT: usize = 5;
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Result of a quiz request. `questions` is empty whenever `error` is set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuizOutcome {
    pub questions: Vec<QuizQuestion>,
    pub error: Option<String>,
}

pub struct QuizGenerator<G> {
    client: Arc<G>,
}

impl<G: GenerationClient> QuizGenerator<G> {
    pub fn new(client: Arc<G>) -> Self {
        Self { client }
    }

    /// Never fails: problems come back as an empty quiz plus a message.
    pub async fn generate_quiz(&self, summary: &str) -> QuizOutcome {
        match self.try_generate_quiz(summary).await {
            Ok(questions) => QuizOutcome {
                questions,
                error: None,
            },
            Err(e) => {
                log::warn!("Quiz generation failed: {}", e);
                QuizOutcome {
                    questions: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub async fn try_generate_quiz(&self, summary: &str) -> Result<Vec<QuizQuestion>> {
        let prompt = build_quiz_prompt(summary);

        let reply = self
            .client
            .generate(&[ContentPart::Text(prompt)])
            .await
            .map_err(|e| ChatbotError::Generation(e.to_string()))?;

        let questions = validate_quiz(&parse_reply(&reply)?)?;
        if questions.len() != QUIZ_QUESTION_COUNT {
            return Err(ChatbotError::QuizValidation(format!(
                "expected {} questions, got {}",
                QUIZ_QUESTION_COUNT,
                questions.len()
            )));
        }

        log::info!("Generated quiz with {} questions", questions.len());
        Ok(questions)
    }
}

pub fn build_quiz_prompt(summary: &str) -> String {
    format!(
        r#"Create a multiple-choice quiz that tests understanding of the summary below.

RULES:
1. Write exactly {count} questions
2. Every question has exactly {options} answer options
3. Exactly one option is correct; give its position as "correct_answer", a number from 0 to {last}
4. Base every question only on the summary
5. Reply with ONLY a JSON array, no commentary and no code fences, shaped like:
[{{"question": "...", "options": ["...", "...", "...", "..."], "correct_answer": 0}}]

SUMMARY:
{summary}"#,
        count = QUIZ_QUESTION_COUNT,
        options = OPTIONS_PER_QUESTION,
        last = OPTIONS_PER_QUESTION - 1,
    )
}

/// Strict JSON first, then the bracketed span read as a structured literal.
pub fn parse_reply(reply: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(reply) {
        return Ok(value);
    }

    let start = reply.find('[');
    let end = reply.rfind(']');
    let candidate = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => {
            return Err(ChatbotError::QuizParse(
                "reply contains no bracketed list".to_string(),
            ))
        }
    };

    log::debug!("Strict JSON parse failed, salvaging {} bytes", candidate.len());
    literal::parse(candidate).map_err(|e| ChatbotError::QuizParse(e.to_string()))
}

pub fn validate_quiz(value: &Value) -> Result<Vec<QuizQuestion>> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid("quiz must be a list of questions"))?;

    if items.is_empty() {
        return Err(invalid("quiz has no questions"));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| validate_question(i + 1, item))
        .collect()
}

fn validate_question(number: usize, item: &Value) -> Result<QuizQuestion> {
    let object = item
        .as_object()
        .ok_or_else(|| invalid(format!("question {} is not an object", number)))?;

    for key in ["question", "options", "correct_answer"] {
        if !object.contains_key(key) {
            return Err(invalid(format!("question {} is missing '{}'", number, key)));
        }
    }

    let question = object["question"]
        .as_str()
        .ok_or_else(|| invalid(format!("question {} text is not a string", number)))?
        .to_string();

    let options = object["options"]
        .as_array()
        .ok_or_else(|| invalid(format!("question {} options are not a list", number)))?;
    if options.len() != OPTIONS_PER_QUESTION {
        return Err(invalid(format!(
            "question {} has {} options, expected {}",
            number,
            options.len(),
            OPTIONS_PER_QUESTION
        )));
    }
    let options = options
        .iter()
        .map(|option| option_text(option).ok_or_else(|| invalid(format!("question {} has a non-text option", number))))
        .collect::<Result<Vec<_>>>()?;

    let correct_answer = object["correct_answer"]
        .as_u64()
        .map(|n| n as usize)
        .filter(|n| *n < OPTIONS_PER_QUESTION)
        .ok_or_else(|| {
            invalid(format!(
                "question {} correct_answer {} is not an integer from 0 to {}",
                number,
                object["correct_answer"],
                OPTIONS_PER_QUESTION - 1
            ))
        })?;

    Ok(QuizQuestion {
        question,
        options,
        correct_answer,
    })
}

fn option_text(option: &Value) -> Option<String> {
    match option {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn invalid(message: impl Into<String>) -> ChatbotError {
    ChatbotError::QuizValidation(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_quiz_json, ScriptedClient};
    use serde_json::json;

    fn generator(client: ScriptedClient) -> (Arc<ScriptedClient>, QuizGenerator<ScriptedClient>) {
        let client = Arc::new(client);
        (client.clone(), QuizGenerator::new(client))
    }

    #[tokio::test]
    async fn test_valid_reply_yields_five_questions() {
        let (client, generator) = generator(ScriptedClient::replying(vec![Ok(sample_quiz_json(5))]));

        let outcome = generator.generate_quiz("The Eiffel Tower is in Paris.").await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.questions.len(), 5);
        assert_eq!(outcome.questions[0].options.len(), 4);

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        match calls[0].as_slice() {
            [ContentPart::Text(prompt)] => {
                assert!(prompt.contains("The Eiffel Tower is in Paris."));
                assert!(prompt.contains("exactly 5 questions"));
                assert!(prompt.contains("correct_answer"));
            }
            other => panic!("expected a single text part, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_prose_wrapped_reply_is_salvaged() {
        let reply = format!("Here you go:\n{}\nHope this helps!", sample_quiz_json(5));
        let (_, generator) = generator(ScriptedClient::replying(vec![Ok(reply)]));

        let outcome = generator.generate_quiz("summary").await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.questions.len(), 5);
    }

    #[tokio::test]
    async fn test_code_fenced_reply_is_salvaged() {
        let reply = format!("```json\n{}\n```", sample_quiz_json(5));
        let (_, generator) = generator(ScriptedClient::replying(vec![Ok(reply)]));

        assert_eq!(generator.generate_quiz("summary").await.questions.len(), 5);
    }

    #[tokio::test]
    async fn test_three_options_rejected() {
        let reply = r#"[{"question":"Q1","options":["a","b","c"],"correct_answer":1}]"#;
        let (_, generator) = generator(ScriptedClient::replying(vec![Ok(reply.to_string())]));

        let outcome = generator.generate_quiz("summary").await;
        assert!(outcome.questions.is_empty());
        assert!(outcome.error.unwrap().contains("3 options"));
    }

    #[tokio::test]
    async fn test_wrong_question_count_rejected() {
        let (_, generator) = generator(ScriptedClient::replying(vec![Ok(sample_quiz_json(3))]));

        let err = generator.try_generate_quiz("summary").await.unwrap_err();
        assert!(matches!(err, ChatbotError::QuizValidation(_)));
    }

    #[tokio::test]
    async fn test_unparseable_reply() {
        let (_, generator) = generator(ScriptedClient::replying(vec![Ok(
            "Sorry, I cannot make a quiz from that.".to_string(),
        )]));

        let err = generator.try_generate_quiz("summary").await.unwrap_err();
        assert!(matches!(err, ChatbotError::QuizParse(_)));
    }

    #[tokio::test]
    async fn test_service_error_gives_empty_quiz() {
        let (_, generator) = generator(ScriptedClient::replying(vec![Err("quota exceeded".to_string())]));

        let outcome = generator.generate_quiz("summary").await;
        assert!(outcome.questions.is_empty());
        assert!(outcome.error.unwrap().contains("quota exceeded"));
    }

    #[test]
    fn test_parse_reply_salvages_single_quoted_literals() {
        let reply = "Sure! [{'question': 'Q', 'options': ['a', 'b', 'c', 'd'], 'correct_answer': 2,}] Done.";
        let value = parse_reply(reply).unwrap();
        assert_eq!(value[0]["correct_answer"], 2);
    }

    #[test]
    fn test_deeply_nested_reply_is_a_parse_error() {
        let reply = format!("Sure: {}{}", "[".repeat(5000), "]".repeat(5000));
        match parse_reply(&reply) {
            Err(ChatbotError::QuizParse(message)) => assert!(message.contains("nesting too deep")),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deeply_nested_reply_gives_empty_quiz() {
        let reply = format!("{}{}", "[".repeat(5000), "]".repeat(5000));
        let (_, generator) = generator(ScriptedClient::replying(vec![Ok(reply)]));

        let outcome = generator.generate_quiz("summary").await;
        assert!(outcome.questions.is_empty());
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_parse_reply_without_brackets() {
        assert!(matches!(parse_reply("] backwards ["), Err(ChatbotError::QuizParse(_))));
        assert!(matches!(parse_reply("no list here"), Err(ChatbotError::QuizParse(_))));
    }

    #[test]
    fn test_validation_rules() {
        let good = json!({"question": "Q", "options": ["a", "b", "c", "d"], "correct_answer": 3});
        assert_eq!(validate_quiz(&json!([good.clone()])).unwrap()[0].correct_option(), "d");

        let rejected = [
            json!([]),
            json!({"question": "Q"}),
            json!([{"question": "Q", "options": ["a", "b", "c", "d"]}]),
            json!([{"options": ["a", "b", "c", "d"], "correct_answer": 0}]),
            json!([{"question": "Q", "options": ["a", "b", "c", "d", "e"], "correct_answer": 0}]),
            json!([{"question": "Q", "options": ["a", "b", "c", "d"], "correct_answer": 4}]),
            json!([{"question": "Q", "options": ["a", "b", "c", "d"], "correct_answer": -1}]),
            json!([{"question": "Q", "options": ["a", "b", "c", "d"], "correct_answer": 1.5}]),
            json!([{"question": "Q", "options": ["a", "b", "c", "d"], "correct_answer": "1"}]),
            json!([{"question": "Q", "options": ["a", "b", "c", "d"], "correct_answer": true}]),
            json!([{"question": "Q", "options": ["a", null, "c", "d"], "correct_answer": 0}]),
            json!([good, "not an object"]),
        ];
        for value in rejected {
            assert!(
                matches!(validate_quiz(&value), Err(ChatbotError::QuizValidation(_))),
                "expected rejection of {}",
                value
            );
        }
    }

    #[test]
    fn test_numeric_options_become_text() {
        let value = json!([{"question": "2+2?", "options": [3, 4, 5, 6], "correct_answer": 1}]);
        let quiz = validate_quiz(&value).unwrap();
        assert_eq!(quiz[0].options, vec!["3", "4", "5", "6"]);
        assert_eq!(quiz[0].correct_option(), "4");
    }
}
