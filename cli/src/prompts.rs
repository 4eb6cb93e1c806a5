//! Built-in task prompt templates

/// Ask the model for a reference manual of the codebase it can reach
/// through its tools.
pub const PROJECT_ANALYSIS: &str = r#"# Task
You are a professional programmer. Getting familiar with a new codebase can be
difficult and time-consuming.

Your task is to analyze the code in this repository and to provide a reference
manual so that someone else can easily understand the architecture of the
project. Your reference manual should describe the high-level architecture and
serve as a guide on getting familiar with the codebase.

Use the provided tools and your own reasoning skills as a professional
programmer to solve this task.

# Guidelines
- Before you provide a reference manual, you should inspect all relevant files.
- Do not base your review solely on the directory structure.
- Do not base your review solely on any README or wiki files.
- Your review must include source code.
- Use your own critical thinking as necessary.
- Use the available tools as necessary.
- If the project contains many files, try to start with obvious entry points.
- You must analyze at least 15 source code files (if there are 15 or more).

On task completion, use the finish tool to provide your result."#;

/// Ask the model to recommend docstrings for undocumented symbols.
pub const ADD_DOCSTRINGS: &str = r#"You are a professional programmer. Getting familiar with a new codebase can be
difficult and time-consuming, especially if documentation is lacking.

Your task is to analyze the Python code in this repository and recommend docstrings
for all currently undocumented functions, methods, and classes. Every file should
also have a top-level docstring.

Use the provided tools and your own reasoning skills as a professional
programmer to solve this task.

Your output should have the following format, one per recommended docstring:

file:
<filepath>
symbol:
<name of symbol to add docstring to, use "module" for top level file comments>
docstring:
<python docstring>

On task completion, use the finish tool to provide your result."#;

/// Look up a template by its CLI name
pub fn get(name: &str) -> Option<&'static str> {
    match name {
        "project-analysis" => Some(PROJECT_ANALYSIS),
        "add-docstrings" => Some(ADD_DOCSTRINGS),
        _ => None,
    }
}

/// Names accepted by `--template`
pub fn names() -> &'static [&'static str] {
    &["project-analysis", "add-docstrings"]
}
