//! Prompt for asking a model to plant a subtle bug in a reference solution.

/// Builds the bug injection prompt for one problem.
///
/// Both parts are embedded verbatim apart from trailing newlines.
pub fn build_bug_injection_prompt(prompt: &str, solution: &str) -> String {
    format!(
        r#"Here's a Python function:

{prompt}
{solution}

Introduce a subtle bug in this function. Provide your response in JSON format with two fields:
1. "bug_explanation": A brief description of the bug you introduced.
2. "buggy_code": The function body with the bug introduced (exclude the function signature and docstring).

Ensure the bug is not too obvious and the code still looks plausible.
"#,
        prompt = prompt.trim_end_matches('\n'),
        solution = solution.trim_end_matches('\n'),
    )
}
