use indoc::indoc;

/// First stage: turn a terse request into a detailed engineering task.
pub const PROMPT_ENHANCER: &str = indoc! {"
    Rewrite the user's request into a precise software engineering task.
    Add missing technical details.
    Focus on implementation.
"};

/// Second stage: produce code only.
pub const CODE_GENERATOR: &str = indoc! {"
    You are an elite senior Python developer.
    Generate clean, complete, production-ready Python 3.11 code that runs as is.
    Return ONLY the full working code, no explanations or prose.
"};
