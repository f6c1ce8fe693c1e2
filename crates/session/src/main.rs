#![forbid(unsafe_code)]

//! Line-oriented JSON driver: one request object per stdin line, one
//! response object per stdout line. This is the seam a presentation shell
//! talks to; nothing here renders prose beyond serialized outcomes.

use ql_core::TaskStatus;
use ql_session::{Session, TaskRef};
use ql_storage::SqliteStore;
use serde::Deserialize;
use serde_json::json;
use std::io::{BufRead, Write};

const DEFAULT_STORAGE_DIR: &str = ".questlog";

#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum Command {
    Login { name: String },
    Profile,
    Finalize { class: String, race: String },
    SetImage { image: String },
    Add { name: String, difficulty: String, due: String },
    Update { id: i64, name: Option<String>, difficulty: Option<String>, due: Option<String> },
    List { status: String },
    Complete { id: Option<i64>, name: Option<String> },
    Delete { id: Option<i64>, name: Option<String> },
    History { limit: Option<usize> },
    Quit,
}

fn storage_dir() -> String {
    if let Some(dir) = std::env::args().nth(1) {
        return dir;
    }
    std::env::var("QUESTLOG_DIR").unwrap_or_else(|_| DEFAULT_STORAGE_DIR.to_string())
}

fn main() -> std::process::ExitCode {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let store = match SqliteStore::open(storage_dir()) {
        Ok(store) => store,
        Err(err) => {
            let _ = writeln!(out, "{}", json!({ "ok": false, "error": err.to_string() }));
            return std::process::ExitCode::FAILURE;
        }
    };
    let mut store = Some(store);
    let mut session: Option<Session> = None;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match serde_json::from_str::<Command>(&line) {
            Ok(command) => command,
            Err(err) => {
                respond(&mut out, Err(format!("bad request: {err}")));
                continue;
            }
        };

        if matches!(command, Command::Quit) {
            respond(&mut out, Ok(json!({ "bye": true })));
            break;
        }

        let result = dispatch(command, &mut store, &mut session);
        respond(&mut out, result);
    }

    std::process::ExitCode::SUCCESS
}

fn dispatch(
    command: Command,
    store: &mut Option<SqliteStore>,
    session: &mut Option<Session>,
) -> Result<serde_json::Value, String> {
    if let Command::Login { name } = command {
        if session.is_some() {
            return Err("already logged in".to_string());
        }
        let taken = store.take().ok_or_else(|| "store unavailable".to_string())?;
        // A failed login hands the store back so the user can retry.
        let logged_in = match Session::login(taken, &name) {
            Ok(logged_in) => logged_in,
            Err((err, taken)) => {
                *store = Some(taken);
                return Err(err.to_string());
            }
        };
        let view = logged_in.profile().map_err(|err| err.to_string())?;
        *session = Some(logged_in);
        return to_value(&view);
    }

    let Some(session) = session.as_mut() else {
        return Err("not logged in".to_string());
    };

    match command {
        Command::Login { .. } | Command::Quit => unreachable!("handled above"),
        Command::Profile => to_value(&session.profile().map_err(|err| err.to_string())?),
        Command::Finalize { class, race } => to_value(
            &session
                .finalize_profile(&class, &race)
                .map_err(|err| err.to_string())?,
        ),
        Command::SetImage { image } => to_value(
            &session
                .set_profile_image(&image)
                .map_err(|err| err.to_string())?,
        ),
        Command::Add { name, difficulty, due } => to_value(
            &session
                .add_task(&name, &difficulty, &due)
                .map_err(|err| err.to_string())?,
        ),
        Command::List { status } => {
            let status = TaskStatus::parse(status.trim())
                .ok_or_else(|| format!("unknown status {status:?} (expected open or done)"))?;
            to_value(&session.tasks(status).map_err(|err| err.to_string())?)
        }
        Command::Update { id, name, difficulty, due } => to_value(
            &session
                .update_task(
                    &TaskRef::Id(id),
                    name.as_deref(),
                    difficulty.as_deref(),
                    due.as_deref(),
                )
                .map_err(|err| err.to_string())?,
        ),
        Command::Complete { id, name } => {
            let task = task_ref(id, name)?;
            to_value(&session.complete_task(&task).map_err(|err| err.to_string())?)
        }
        Command::Delete { id, name } => {
            let task = task_ref(id, name)?;
            to_value(&session.delete_task(&task).map_err(|err| err.to_string())?)
        }
        Command::History { limit } => {
            to_value(&session.history(limit).map_err(|err| err.to_string())?)
        }
    }
}

fn task_ref(id: Option<i64>, name: Option<String>) -> Result<TaskRef, String> {
    match (id, name) {
        (Some(id), None) => Ok(TaskRef::Id(id)),
        (None, Some(name)) => Ok(TaskRef::Name(name)),
        _ => Err("provide exactly one of id or name".to_string()),
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, String> {
    serde_json::to_value(value).map_err(|err| err.to_string())
}

fn respond(out: &mut impl Write, result: Result<serde_json::Value, String>) {
    let body = match result {
        Ok(value) => json!({ "ok": true, "result": value }),
        Err(error) => json!({ "ok": false, "error": error }),
    };
    let _ = writeln!(out, "{body}");
}
