use once_cell::sync::Lazy;
use rand::Rng;

use crate::{
    constants::prompts::{
        CONTEXT_SECTION_HEADER, CONTEXT_WINDOW_SEPARATOR, QUESTION_FORMAT_RULES,
        QUESTION_GENERATOR_PREAMBLE,
    },
    models::domain::{GenerationRequest, QuestionSelection},
};

pub const CONTEXT_WINDOW_COUNT: usize = 5;
const CONTEXT_RADIUS: usize = 2;
const MIN_SENTENCES_FOR_SPLIT: usize = 4;

static SENTENCE_BOUNDARY: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"[.!?]+").expect("SENTENCE_BOUNDARY is a valid regex pattern")
});

/// Splits text into sentence-like units on `.`, `!` and `?`, dropping blanks.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_BOUNDARY
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// The pool context windows are drawn from. Short documents are used whole.
pub fn chunk_pool(text: &str) -> Vec<&str> {
    let sentences = split_sentences(text);
    if sentences.len() < MIN_SENTENCES_FOR_SPLIT {
        vec![text]
    } else {
        sentences
    }
}

/// Up to two chunks either side of a random pivot, joined into one excerpt.
pub fn context_window<R: Rng + ?Sized>(pool: &[&str], rng: &mut R) -> String {
    if pool.is_empty() {
        return String::new();
    }

    let pivot = rng.gen_range(0..pool.len());
    let start = pivot.saturating_sub(CONTEXT_RADIUS);
    let end = (pivot + CONTEXT_RADIUS + 1).min(pool.len());

    format!("{}.", pool[start..end].join(". "))
}

fn count_instruction(request: &GenerationRequest) -> String {
    let params = &request.params;
    match params.selection {
        QuestionSelection::Objective => {
            format!("Create {} objective questions.", params.objective_count)
        }
        QuestionSelection::Theory => format!("Create {} theory questions.", params.theory_count),
        QuestionSelection::Both => format!(
            "Create {} objective questions and {} theory questions.",
            params.objective_count, params.theory_count
        ),
    }
}

pub fn build_prompt_with_rng<R: Rng + ?Sized>(request: &GenerationRequest, rng: &mut R) -> String {
    let pool = chunk_pool(&request.document_text);
    let windows: Vec<String> = (0..CONTEXT_WINDOW_COUNT)
        .map(|_| context_window(&pool, &mut *rng))
        .collect();

    format!(
        "{}\n{}\n\n{}\n\n{}\n{}",
        QUESTION_GENERATOR_PREAMBLE,
        count_instruction(request),
        QUESTION_FORMAT_RULES,
        CONTEXT_SECTION_HEADER,
        windows.join(CONTEXT_WINDOW_SEPARATOR)
    )
}

pub fn build_prompt(request: &GenerationRequest) -> String {
    let mut rng = rand::thread_rng();
    build_prompt_with_rng(request, &mut rng)
}
