use std::sync::LazyLock;

use regex::Regex;

use crate::core::syntax::Comment;

/// Leading whitespace and an optional `*` block comment gutter.
static LINE_DECORATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\s*\*)?\s*").expect("valid regex"));

/// Turn raw comment text into description lines joined with Markdown hard breaks.
///
/// Each line loses its leading whitespace, an optional `*` gutter and trailing
/// whitespace; empty lines are dropped.
pub fn clean(text: &str) -> String {
    text.lines()
        .map(|line| LINE_DECORATION.replace(line, "").trim_end().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("  \n")
}

/// Description built from several comments, indented by `depth` levels.
pub fn from_comments<'a>(comments: impl IntoIterator<Item = &'a Comment>, depth: usize) -> String {
    let text = comments
        .into_iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    indent(&clean(&text), depth)
}

/// Indent every line by two spaces per level.
pub fn indent(text: &str, depth: usize) -> String {
    if depth == 0 || text.is_empty() {
        return text.to_string();
    }
    let pad = "  ".repeat(depth);
    text.split('\n')
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append a description below a bullet line, if there is one.
pub fn attach(bullet: String, description: &str) -> String {
    if description.is_empty() {
        bullet
    } else {
        format!("{}  \n{}", bullet, description)
    }
}
