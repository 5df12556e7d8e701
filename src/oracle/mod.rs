//! Correctness oracle: decides whether a candidate passes a problem's tests.
//!
//! - [`CorrectnessOracle`] runs a completion against the hidden tests and
//!   returns an [`OracleVerdict`].
//! - [`CandidateValidator`] is the pass/fail view the retry controller uses.
//! - [`PythonOracle`] executes the composed program in a local interpreter.
//!
//! A failing verdict is an ordinary result. [`crate::error::ValidationError`]
//! is reserved for the oracle not being able to run at all.

pub mod python;
pub mod validator;

pub use python::{PythonOracle, DEFAULT_INTERPRETER, DEFAULT_TIMEOUT};
pub use validator::{CandidateValidator, CorrectnessOracle, OracleValidator, OracleVerdict};
