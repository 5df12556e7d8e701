//! JSONL corpus loading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::info;

use super::problem::{Corpus, Problem};
use crate::error::CorpusError;

/// Loads problems from a JSONL file, decompressing it when the path ends in `.gz`.
///
/// # Errors
///
/// Fails on unreadable files, malformed lines and duplicate task ids.
pub fn load_problems(path: impl AsRef<Path>) -> Result<Corpus, CorpusError> {
    let path = path.as_ref();
    let read_error = |source| CorpusError::Read {
        path: path.display().to_string(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let is_gzip = path.extension().is_some_and(|ext| ext == "gz");

    let corpus = if is_gzip {
        parse_problems(BufReader::new(GzDecoder::new(file)))
    } else {
        parse_problems(BufReader::new(file))
    }
    .map_err(|err| match err {
        CorpusError::Read { source, .. } => read_error(source),
        other => other,
    })?;

    info!(path = %path.display(), problems = corpus.len(), "Loaded problem corpus");
    Ok(corpus)
}

/// Parses one problem per non-blank line.
pub fn parse_problems<R: BufRead>(reader: R) -> Result<Corpus, CorpusError> {
    let mut corpus = Corpus::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CorpusError::Read {
            path: String::new(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let problem: Problem =
            serde_json::from_str(&line).map_err(|source| CorpusError::InvalidLine {
                line: index + 1,
                source,
            })?;

        if corpus.contains_key(&problem.task_id) {
            return Err(CorpusError::DuplicateTask(problem.task_id));
        }
        corpus.insert(problem.task_id.clone(), problem);
    }

    Ok(corpus)
}
