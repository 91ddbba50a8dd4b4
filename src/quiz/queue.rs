use std::collections::HashSet;

use tracing::warn;

use crate::models::Question;

/// Pending questions in presentation order. The head is the only question
/// that can be shown or answered.
#[derive(Debug, Clone, Default)]
pub struct QuestionQueue {
    questions: Vec<Question>,
}

impl QuestionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue wholesale. Ignored unless the queue is empty, so a
    /// late refetch cannot reseed a quiz in progress. Ids are unique: later
    /// repeats of an id are dropped.
    pub fn set_all(&mut self, questions: Vec<Question>) -> bool {
        if !self.questions.is_empty() {
            return false;
        }

        let mut seen = HashSet::new();
        self.questions = questions
            .into_iter()
            .filter(|q| {
                let first = seen.insert(q.id.clone());
                if !first {
                    warn!("Dropping duplicate question {}", q.id);
                }
                first
            })
            .collect();
        true
    }

    pub fn remove_head(&mut self) -> Option<Question> {
        if self.questions.is_empty() {
            None
        } else {
            Some(self.questions.remove(0))
        }
    }

    pub fn reset(&mut self) {
        self.questions.clear();
    }

    pub fn head(&self) -> Option<&Question> {
        self.questions.first()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
