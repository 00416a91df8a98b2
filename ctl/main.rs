#![forbid(unsafe_code)]

//! `jobdesk-ctl` — local supervisor CLI for the `jobdesk` server.
//!
//! Connects to the IPC socket and sends JSON commands to the server.

use std::io::{BufRead, BufReader, Write};

use clap::{Parser, Subcommand};
use interprocess::local_socket::{traits::Stream as _, GenericNamespaced, Stream, ToNsName};

#[derive(Debug, Parser)]
#[command(
    name = "jobdesk-ctl",
    about = "Local supervisor CLI for the jobdesk server",
    version,
    long_about = None
)]
struct Cli {
    /// IPC socket name (must match server's `ipc_name` config).
    #[arg(long, default_value = "jobdesk")]
    ipc_name: String,

    /// Reviewer or creator name recorded with the change.
    #[arg(long)]
    reviewer: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List reports awaiting review.
    Pending,

    /// List approved and rejected reports.
    Validated,

    /// Show dashboard counts.
    Stats,

    /// Approve a pending report.
    Approve {
        /// Report ID, e.g. `SUB001`.
        id: String,
    },

    /// Reject a pending report.
    Reject {
        /// Report ID, e.g. `SUB001`.
        id: String,
        /// Reason shown to the worker.
        #[arg(long)]
        reason: String,
    },

    /// Create a task.
    CreateTask {
        /// Short title shown to workers.
        #[arg(long)]
        title: String,
        /// Longer description.
        #[arg(long)]
        description: Option<String>,
        /// Assignment date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// List tasks, optionally for one date.
    Tasks {
        /// Assignment date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,
    },
}

impl Command {
    fn to_request(&self) -> serde_json::Value {
        match self {
            Self::Pending => serde_json::json!({ "command": "pending" }),
            Self::Validated => serde_json::json!({ "command": "validated" }),
            Self::Stats => serde_json::json!({ "command": "stats" }),
            Self::Approve { id } => serde_json::json!({ "command": "approve", "id": id }),
            Self::Reject { id, reason } => {
                serde_json::json!({ "command": "reject", "id": id, "reason": reason })
            }
            Self::CreateTask {
                title,
                description,
                date,
            } => serde_json::json!({
                "command": "create_task",
                "title": title,
                "description": description,
                "date": date,
            }),
            Self::Tasks { date } => serde_json::json!({ "command": "tasks", "date": date }),
        }
    }
}

fn main() {
    let args = Cli::parse();

    let mut request_json = args.command.to_request();
    if let Some(ref reviewer) = args.reviewer {
        request_json["reviewer"] = serde_json::Value::String(reviewer.clone());
    }
    if let Ok(token) = std::env::var("JOBDESK_IPC_TOKEN") {
        request_json["auth_token"] = serde_json::Value::String(token);
    }

    match send_ipc_command(&args.ipc_name, &request_json) {
        Ok(response) => {
            if let Some(obj) = response.as_object() {
                let ok = obj
                    .get("ok")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                if ok {
                    if let Some(data) = obj.get("data") {
                        println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
                    } else {
                        println!("OK");
                    }
                } else {
                    let err_msg = obj
                        .get("error")
                        .and_then(|v| v.as_str())
                        .unwrap_or("unknown error");
                    eprintln!("Error: {err_msg}");
                    std::process::exit(1);
                }
            } else {
                println!("{response}");
            }
        }
        Err(err) => {
            eprintln!("Failed to connect to server: {err}");
            eprintln!("Is jobdesk running with ipc_name '{}'?", args.ipc_name);
            std::process::exit(1);
        }
    }
}

/// Connect to the IPC socket, send a JSON command, and read the response.
fn send_ipc_command(
    ipc_name: &str,
    request: &serde_json::Value,
) -> std::result::Result<serde_json::Value, Box<dyn std::error::Error>> {
    let name = ipc_name.to_ns_name::<GenericNamespaced>()?;
    let mut stream = Stream::connect(name)?;

    let mut request_line = serde_json::to_string(request)?;
    request_line.push('\n');
    stream.write_all(request_line.as_bytes())?;
    stream.flush()?;

    let mut reader = BufReader::new(&stream);
    let mut response_line = String::new();
    reader.read_line(&mut response_line)?;

    let response: serde_json::Value = serde_json::from_str(response_line.trim())?;
    Ok(response)
}
