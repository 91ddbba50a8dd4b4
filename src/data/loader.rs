use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Question;

/// Errors raised while reading a local question file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} must contain at least one question")]
    Empty(PathBuf),

    #[error("{path}: duplicate question id {id}")]
    DuplicateId { path: PathBuf, id: String },

    #[error("{path}: question {id} has no correctAnswer among its options")]
    MissingAnswer { path: PathBuf, id: String },
}

/// Load questions from a JSON array on disk.
///
/// Local files back the offline mode, so every question must carry a
/// `correctAnswer` that is one of its options, and ids must be unique.
pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_questions(&json_content, path)
}

fn parse_questions(json_content: &str, path: &Path) -> Result<Vec<Question>, LoadError> {
    let questions: Vec<Question> =
        serde_json::from_str(json_content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if questions.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    let mut seen = HashSet::new();
    for question in &questions {
        if !seen.insert(question.id.as_str()) {
            return Err(LoadError::DuplicateId {
                path: path.to_path_buf(),
                id: question.id.clone(),
            });
        }

        let answered = question
            .correct_answer
            .as_ref()
            .is_some_and(|answer| question.options.contains(answer));
        if !answered {
            return Err(LoadError::MissingAnswer {
                path: path.to_path_buf(),
                id: question.id.clone(),
            });
        }
    }

    Ok(questions)
}
