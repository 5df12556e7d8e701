//! JSON export of the result mapping.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::ExportError;
use crate::pipeline::ResultMapping;

/// Writes the mapping as a 2-space indented JSON object keyed by task id.
///
/// Parent directories are created as needed. An empty mapping is written as
/// `{}`.
pub fn write_result_mapping(
    path: impl AsRef<Path>,
    mapping: &ResultMapping,
) -> Result<(), ExportError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            ExportError::FilesystemError(format!(
                "failed to create '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let json = serde_json::to_string_pretty(mapping)?;
    fs::write(path, json)?;

    info!(path = %path.display(), entries = mapping.len(), "Wrote buggy problems");
    Ok(())
}

/// Reads a mapping previously written by [`write_result_mapping`].
pub fn read_result_mapping(path: impl AsRef<Path>) -> Result<ResultMapping, ExportError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Problem;
    use crate::injection::BugInjection;
    use crate::pipeline::BuggyProblem;

    fn sample_mapping() -> ResultMapping {
        let mut problem = Problem::new(
            "task_1",
            "def add(a,b):",
            "return a+b",
            "def check(candidate):\n    assert candidate(2,3) == 5",
            "add",
        );
        problem
            .extra
            .insert("difficulty".to_string(), serde_json::json!("easy"));

        let buggy = BuggyProblem::new(
            &problem,
            BugInjection {
                bug_explanation: "uses subtraction".to_string(),
                buggy_code: "return a-b".to_string(),
            },
        );
        ResultMapping::from([("task_1".to_string(), buggy)])
    }

    #[test]
    fn test_write_creates_parents_and_indents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out").join("buggy_problems.json");

        write_result_mapping(&path, &sample_mapping()).expect("write");

        let content = fs::read_to_string(&path).expect("read");
        assert!(content.starts_with("{\n  \"task_1\": {\n"));

        let value: serde_json::Value = serde_json::from_str(&content).expect("json");
        let entry = &value["task_1"];
        assert_eq!(entry["starting_code"], "return a-b");
        assert_eq!(entry["bug_explanation"], "uses subtraction");
        assert_eq!(entry["canonical_solution"], "return a+b");
        assert_eq!(entry["entry_point"], "add");
        assert_eq!(entry["difficulty"], "easy");
    }

    #[test]
    fn test_empty_mapping_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.json");

        write_result_mapping(&path, &ResultMapping::new()).expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "{}");
        assert!(read_result_mapping(&path).expect("read back").is_empty());
    }

    #[test]
    fn test_read_back_matches_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("buggy.json");
        let mapping = sample_mapping();

        write_result_mapping(&path, &mapping).expect("write");
        assert_eq!(read_result_mapping(&path).expect("read"), mapping);
    }
}
