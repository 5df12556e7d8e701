//! Local Python interpreter oracle.
//!
//! Mirrors the HumanEval execution contract: the program is the problem
//! prompt, the completion, the test harness and a final
//! `check(<entry_point>)` call. It passes when the interpreter exits cleanly
//! within the timeout.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::validator::{CorrectnessOracle, OracleVerdict};
use crate::corpus::Problem;
use crate::error::ValidationError;

/// Interpreter used when none is configured.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Per-candidate execution limit.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Name of the script written into the scratch directory.
const PROGRAM_FILE: &str = "program.py";

/// Runs candidates with a local Python interpreter in a scratch directory.
///
/// This is process isolation only; the candidate runs with the caller's
/// privileges.
#[derive(Debug, Clone)]
pub struct PythonOracle {
    interpreter: String,
    timeout: Duration,
}

impl Default for PythonOracle {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PythonOracle {
    pub fn new(interpreter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Last non-empty stderr line, usually the exception summary.
fn failure_reason(stderr: &[u8], exit_code: Option<i32>) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| match exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        })
}

#[async_trait]
impl CorrectnessOracle for PythonOracle {
    async fn check(
        &self,
        problem: &Problem,
        completion: &str,
    ) -> Result<OracleVerdict, ValidationError> {
        let workdir = tempfile::tempdir().map_err(ValidationError::TempDir)?;
        let script = workdir.path().join(PROGRAM_FILE);
        tokio::fs::write(&script, problem.program_with(completion))
            .await
            .map_err(ValidationError::TempDir)?;

        let child = Command::new(&self.interpreter)
            .arg(&script)
            .current_dir(workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ValidationError::Spawn {
                interpreter: self.interpreter.clone(),
                source,
            })?;

        // On timeout the child is dropped and killed.
        let verdict = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => OracleVerdict::passed(),
            Ok(Ok(output)) => {
                OracleVerdict::failed(failure_reason(&output.stderr, output.status.code()))
            }
            Ok(Err(e)) => return Err(ValidationError::Wait(e)),
            Err(_) => OracleVerdict::timed_out(),
        };

        debug!(
            task_id = %problem.task_id,
            result = %verdict.result,
            "Python oracle finished"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_problem() -> Problem {
        Problem::new(
            "task_1",
            "def add(a, b):\n",
            "    return a + b\n",
            "def check(candidate):\n    assert candidate(2, 3) == 5\n",
            "add",
        )
    }

    #[test]
    fn test_failure_reason_uses_last_stderr_line() {
        let stderr = b"Traceback (most recent call last):\n  File \"program.py\"\nAssertionError\n\n";
        assert_eq!(failure_reason(stderr, Some(1)), "AssertionError");
        assert_eq!(failure_reason(b"", Some(2)), "exit code 2");
        assert_eq!(failure_reason(b"  \n", None), "terminated by signal");
    }

    #[test]
    fn test_defaults() {
        let oracle = PythonOracle::default();
        assert_eq!(oracle.interpreter(), "python3");
        assert_eq!(oracle.timeout(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_validation_error() {
        let oracle = PythonOracle::new("bug-forge-no-such-interpreter", DEFAULT_TIMEOUT);
        let err = oracle
            .check(&add_problem(), "    return a + b\n")
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::Spawn { .. }));
    }

    #[tokio::test]
    #[ignore] // Requires python3 on PATH: cargo test -- --ignored
    async fn test_python_reference_passes_and_bug_fails() {
        let oracle = PythonOracle::default();
        let problem = add_problem();

        let reference = oracle.check(&problem, "    return a + b\n").await.expect("runs");
        assert!(reference.passed, "reference should pass: {}", reference.result);

        let buggy = oracle.check(&problem, "    return a - b\n").await.expect("runs");
        assert!(!buggy.passed);
        assert!(buggy.result.contains("AssertionError"), "got {}", buggy.result);
    }

    #[tokio::test]
    #[ignore] // Requires python3 on PATH: cargo test -- --ignored
    async fn test_python_infinite_loop_times_out() {
        let oracle = PythonOracle::new(DEFAULT_INTERPRETER, Duration::from_millis(500));
        let verdict = oracle
            .check(&add_problem(), "    while True:\n        pass\n")
            .await
            .expect("runs");
        assert_eq!(verdict, OracleVerdict::timed_out());
    }
}
