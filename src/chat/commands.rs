//! Bot command parser.

use std::sync::LazyLock;

use regex::Regex;

/// Static reply for `/start` and `/help`.
pub const COMMAND_LIST: &str = "\
Welcome to the Job Management bot! Available commands:

1. /start - Start the bot
2. /register - Register as a worker
3. /task - Show today's tasks
4. /report <TaskId> [note] - Submit a task completion report (attach a photo with this as its caption)
5. /help - Show this command list";

/// A recognised bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start` or `/help`.
    Help,
    /// `/register`.
    Register,
    /// `/task`.
    Tasks,
    /// `/report <taskId> [note…]`.
    Report {
        /// Task identifier token.
        task_id: String,
        /// Free text after the task identifier.
        note: Option<String>,
    },
    /// `/report` without a task identifier.
    ReportUsage,
}

static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Pattern is a compile-time constant.
    Regex::new(r"(?s)^/([A-Za-z]+)(?:@\w+)?(?:\s+(.*))?$").expect("valid command pattern")
});

/// Parse a message text into a bot command.
///
/// Matching is case-sensitive on the command name; a `@botname` suffix is
/// tolerated. Returns `None` for anything that is not a known command.
#[must_use]
pub fn parse(text: &str) -> Option<BotCommand> {
    let caps = COMMAND_RE.captures(text.trim())?;
    let name = caps.get(1)?.as_str();
    let rest = caps.get(2).map_or("", |m| m.as_str()).trim();

    match name {
        "start" | "help" => Some(BotCommand::Help),
        "register" => Some(BotCommand::Register),
        "task" => Some(BotCommand::Tasks),
        "report" => {
            // Task id is the leading run of word characters.
            let end = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let (task_id, tail) = rest.split_at(end);
            if task_id.is_empty() {
                return Some(BotCommand::ReportUsage);
            }
            let note = Some(tail.trim_start_matches([',', ';', ':']).trim())
                .filter(|n| !n.is_empty())
                .map(str::to_owned);
            Some(BotCommand::Report {
                task_id: task_id.to_owned(),
                note,
            })
        }
        _ => None,
    }
}
