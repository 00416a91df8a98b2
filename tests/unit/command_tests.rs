use jobdesk::chat::commands::{parse, BotCommand, COMMAND_LIST};

#[test]
fn start_and_help_show_command_list() {
    assert_eq!(parse("/start"), Some(BotCommand::Help));
    assert_eq!(parse("/help"), Some(BotCommand::Help));
    assert!(COMMAND_LIST.contains("/report"));
}

#[test]
fn register_and_task() {
    assert_eq!(parse("/register"), Some(BotCommand::Register));
    assert_eq!(parse("  /task  "), Some(BotCommand::Tasks));
}

#[test]
fn report_without_note() {
    assert_eq!(
        parse("/report TASK001"),
        Some(BotCommand::Report {
            task_id: "TASK001".into(),
            note: None,
        })
    );
}

#[test]
fn report_without_task_id_asks_for_usage() {
    assert_eq!(parse("/report"), Some(BotCommand::ReportUsage));
    assert_eq!(parse("/report   "), Some(BotCommand::ReportUsage));
}

#[test]
fn longer_command_names_do_not_match_prefixes() {
    assert_eq!(parse("/tasks"), None);
    assert_eq!(parse("/reporting TASK001"), None);
}

#[test]
fn unknown_commands_are_ignored() {
    assert_eq!(parse("/delete everything"), None);
    assert_eq!(parse(""), None);
}

#[test]
fn report_task_id_stops_at_punctuation() {
    assert_eq!(
        parse("/report TASK001,"),
        Some(BotCommand::Report {
            task_id: "TASK001".into(),
            note: None,
        })
    );
    assert_eq!(
        parse("/report TASK002: valve replaced"),
        Some(BotCommand::Report {
            task_id: "TASK002".into(),
            note: Some("valve replaced".into()),
        })
    );
}

#[test]
fn report_with_punctuation_only_asks_for_usage() {
    assert_eq!(parse("/report , done"), Some(BotCommand::ReportUsage));
}
