// autocommit-core/src/utils.rs
//! Small string helpers shared by the logger and the tool layer.

/// Truncates to at most `max_chars` characters, ending with "..." when cut.
/// Counts characters, not bytes.
pub fn truncate_string(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    if max_chars < 3 {
        input.chars().take(max_chars).collect()
    } else {
        format!("{}...", input.chars().take(max_chars - 3).collect::<String>())
    }
}

/// Joins a git invocation for display: `git <command> <args...>`.
pub fn display_command(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        format!("git {}", command)
    } else {
        format!("git {} {}", command, args.join(" "))
    }
}
