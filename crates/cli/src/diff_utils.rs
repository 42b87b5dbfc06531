//! Utilities for generating line-by-line diffs

use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};

/// Generate a unified diff with colored output
///
/// Returns a formatted string with colored diff hunks showing additions (+) and deletions (-)
pub fn generate_unified_diff(old_text: &str, new_text: &str, context_lines: usize) -> String {
    let diff = TextDiff::from_lines(old_text, new_text);

    let mut output = String::new();

    for (hunk_idx, hunk) in diff
        .unified_diff()
        .context_radius(context_lines)
        .iter_hunks()
        .enumerate()
    {
        if hunk_idx > 0 {
            output.push('\n');
        }

        // Hunk header (e.g., @@ -12,7 +12,8 @@)
        let header = format!("{}", hunk.header());
        output.push_str(&format!("{}\n", header.cyan()));

        for change in hunk.iter_changes() {
            let line: &str = change.value();

            match change.tag() {
                ChangeTag::Delete => {
                    output.push_str(&format!("{}", format!("-{}", line).red()));
                }
                ChangeTag::Insert => {
                    output.push_str(&format!("{}", format!("+{}", line).green()));
                }
                ChangeTag::Equal => {
                    output.push_str(&format!("{}", format!(" {}", line).dimmed()));
                }
            }

            // Add newline if the line doesn't end with one
            if !line.ends_with('\n') {
                output.push('\n');
            }
        }
    }

    output
}

/// Count inserted and deleted lines
pub fn change_stats(old_text: &str, new_text: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(old_text, new_text);
    diff.iter_all_changes()
        .fold((0, 0), |(ins, del), change| match change.tag() {
            ChangeTag::Insert => (ins + 1, del),
            ChangeTag::Delete => (ins, del + 1),
            ChangeTag::Equal => (ins, del),
        })
}
