//! # Response Formatter
//!
//! Cleans model output of markup the transcript can't show, then dresses up
//! the structured release fields with emoji.
//!
//! ```text
//! raw ──► strip_artifacts ──► decorate ──► formatted
//! ```

/// Line prefixes that get an emoji in place of their bullet.
const FIELD_EMOJI: &[(&str, &str)] = &[
    ("Release Name:", "🔥"),
    ("Date:", "📅"),
    ("Stores:", "🏪"),
    ("Resell:", "💰"),
];

const BULLET: &str = "• ";

/// Removes code fences, LaTeX boxes, markdown emphasis and headings, braces,
/// and double quotes. Escaped `\n` sequences become real newlines.
pub fn strip_artifacts(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```", "")
        .replace("\\boxed{", "")
        .replace("**", "")
        .replace("####", "")
        .replace("###", "")
        .replace("\\n", "\n")
        .replace(['"', '“', '”'], "'")
        .replace(['{', '}'], "")
}

fn decorate_line(line: &str) -> String {
    let line = match line.strip_prefix("- ") {
        Some(rest) => format!("{BULLET}{rest}"),
        None => line.to_string(),
    };

    if let Some(rest) = line.strip_prefix(BULLET) {
        for (label, emoji) in FIELD_EMOJI {
            if rest.starts_with(label) {
                return format!("{emoji} {rest}");
            }
        }
    }
    line
}

/// Turns leading `- ` into `• ` and gives the release fields their emoji.
/// Applying it twice changes nothing.
pub fn decorate(text: &str) -> String {
    text.split('\n')
        .map(decorate_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full post-processing for one completion.
pub fn format_completion(raw: &str) -> String {
    decorate(&strip_artifacts(raw))
}
