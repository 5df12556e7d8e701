//! Problem descriptor type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Problems keyed by task id, iterated in id order.
pub type Corpus = BTreeMap<String, Problem>;

/// One programming problem with its reference solution and hidden tests.
///
/// Descriptor fields this crate does not interpret are kept in `extra` and
/// written back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Stable identifier, e.g. `HumanEval/0`.
    pub task_id: String,
    /// Function signature and docstring.
    pub prompt: String,
    /// Reference function body.
    pub canonical_solution: String,
    /// Test harness defining `check(candidate)`.
    pub test: String,
    /// Name of the function under test.
    pub entry_point: String,
    /// Any other descriptor fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Problem {
    /// Creates a problem with no extra descriptor fields.
    pub fn new(
        task_id: impl Into<String>,
        prompt: impl Into<String>,
        canonical_solution: impl Into<String>,
        test: impl Into<String>,
        entry_point: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            prompt: prompt.into(),
            canonical_solution: canonical_solution.into(),
            test: test.into(),
            entry_point: entry_point.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Full program text with `completion` standing in for the reference body.
    pub fn program_with(&self, completion: &str) -> String {
        format!(
            "{}{}\n{}\ncheck({})",
            self.prompt, completion, self.test, self.entry_point
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_with_places_completion_after_prompt() {
        let problem = Problem::new(
            "task_1",
            "def add(a, b):\n",
            "    return a + b\n",
            "def check(candidate):\n    assert candidate(2, 3) == 5\n",
            "add",
        );

        let program = problem.program_with("    return a - b\n");
        assert!(program.starts_with("def add(a, b):\n    return a - b\n"));
        assert!(program.ends_with("check(add)"));
        assert!(!program.contains("a + b"));
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let raw = r#"{"task_id":"t","prompt":"p","canonical_solution":"s","test":"x","entry_point":"f","source":"humaneval"}"#;
        let problem: Problem = serde_json::from_str(raw).expect("should parse");
        assert_eq!(problem.extra["source"], "humaneval");

        let value = serde_json::to_value(&problem).expect("serialize");
        assert_eq!(value["source"], "humaneval");
        assert_eq!(value["entry_point"], "f");
    }
}
