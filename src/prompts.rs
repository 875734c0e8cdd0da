//! Prompt templates for the three tutoring requests.

pub const LEARN: &str = include_str!("../data/prompts/learn.txt");
pub const QUIZ: &str = include_str!("../data/prompts/quiz.txt");
pub const ASK: &str = include_str!("../data/prompts/ask.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// Substitution is a single pass over the template, so values are inserted
/// verbatim even when they contain `{{...}}` themselves. Unknown
/// placeholders are left in place.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let key = &after[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    result.push_str(rest);
    result
}

pub fn learn_prompt(subject: &str, topic: &str) -> String {
    render(LEARN.trim_end(), &[("subject", subject), ("topic", topic)])
}

/// Formatting of the answer is left to the structured-output schema.
pub fn quiz_prompt(subject: &str, topic: &str) -> String {
    render(QUIZ.trim_end(), &[("subject", subject), ("topic", topic)])
}

pub fn ask_prompt(subject: &str, topic: &str, question: &str) -> String {
    render(
        ASK.trim_end(),
        &[("subject", subject), ("topic", topic), ("question", question)],
    )
}
