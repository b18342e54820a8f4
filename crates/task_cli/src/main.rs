use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use task_cli::cli::{
    Cli, Command, build_config_overrides, expand_alias, scan_config_overrides,
    split_command_line, verbose_requested,
};
use task_cli::filter::{TimeFilter, filter_tasks};
use task_cli::render::{Presenter, color_enabled, task_json, tasks_json};
use task_core::clock::{SystemClock, local_offset};
use task_core::config::{self, Config, ListFormat};
use task_core::error::AppError;
use task_core::manager::TaskManager;
use task_core::model::{Priority, Task, parse_datetime};
use task_core::notify::{self, NotificationOutcome};
use task_core::storage::json_store;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn print_json(value: &serde_json::Value) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn resolve_config(args: &[String]) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        tracing::warn!(error = %err, "ignoring unusable config, using defaults");
    }
    let overrides = build_config_overrides(&scan_config_overrides(args))?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn parse_priority(raw: Option<&str>) -> Result<Option<Priority>, AppError> {
    raw.map(Priority::parse).transpose()
}

fn parse_user_datetime(raw: Option<&str>) -> Result<Option<OffsetDateTime>, AppError> {
    raw.map(|value| parse_datetime(value, local_offset()))
        .transpose()
}

fn print_task(task: &Task, json: bool, message: String) -> Result<(), AppError> {
    if json {
        print_json(&task_json(task)?)
    } else {
        println!("{message}");
        Ok(())
    }
}

fn report_notifications(outcome: &NotificationOutcome, json: bool) -> Result<(), AppError> {
    for failure in &outcome.failures {
        eprintln!(
            "WARN: notification for task {} failed: {}",
            failure.task_id,
            failure.error.report()
        );
    }

    if json {
        return print_json(&tasks_json(&outcome.tasks)?);
    }

    if outcome.tasks.is_empty() && outcome.failures.is_empty() {
        println!("No tasks need attention");
    }
    for task in &outcome.tasks {
        println!("Notified: {}", notify::notification_body(task));
    }
    Ok(())
}

/// Runs one parsed command against the loaded tasks.
fn execute(
    command: Command,
    json: bool,
    config: &Config,
    manager: &mut TaskManager,
    presenter: &Presenter,
) -> Result<(), AppError> {
    match command {
        Command::Add {
            title,
            priority,
            due,
            reminder,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };
            let priority = parse_priority(priority.as_deref())?;
            let due = parse_user_datetime(due.as_deref())?;
            let reminder = parse_user_datetime(reminder.as_deref())?;

            let mut task = manager.add_task(&title, priority);
            if let Some(due) = due {
                task = manager.set_due_date(task.id, due)?;
            }
            if let Some(reminder) = reminder {
                task = manager.set_reminder(task.id, reminder)?;
            }

            let message = format!(
                "Task added with ID: {} (Priority: {})",
                task.id,
                presenter.priority(task.priority)
            );
            print_task(&task, json, message)?;
            Ok(())
        }
        Command::List {
            priority,
            by_due,
            due,
            all,
            format,
        } => {
            let filter = due
                .as_deref()
                .map(|raw| TimeFilter::parse(raw, manager.now()))
                .transpose()?;
            let format = match format.as_deref() {
                Some(raw) => ListFormat::parse(raw)?,
                None => config.list_format.unwrap_or_default(),
            };

            let tasks = filter_tasks(
                manager.get_tasks_sorted(priority, by_due),
                filter.as_ref(),
                all,
            );

            if json {
                print_json(&tasks_json(&tasks)?)?;
            } else if tasks.is_empty() {
                println!("No tasks found matching the criteria");
            } else {
                match format {
                    ListFormat::Table => println!("{}", presenter.table(&tasks)),
                    ListFormat::List => println!("{}", presenter.list(&tasks)),
                }
            }
            Ok(())
        }
        Command::Update {
            id,
            title,
            priority,
            done,
            undone,
            due,
            reminder,
            remove_due,
            remove_reminder,
        } => {
            let current = manager.get_task_by_id(id)?;
            let priority = parse_priority(priority.as_deref())?;
            let due = parse_user_datetime(due.as_deref())?;
            let reminder = parse_user_datetime(reminder.as_deref())?;
            let done = if done {
                true
            } else if undone {
                false
            } else {
                current.done
            };

            let mut task = manager.update_task(id, title.as_deref().unwrap_or(""), done, priority)?;
            if remove_due {
                task = manager.remove_due_date(id)?;
            }
            // A new pair is checked against itself, not the reminder it replaces.
            if remove_reminder || (due.is_some() && reminder.is_some()) {
                task = manager.remove_reminder(id)?;
            }
            if let Some(due) = due {
                task = manager.set_due_date(id, due)?;
            }
            if let Some(reminder) = reminder {
                task = manager.set_reminder(id, reminder)?;
            }

            print_task(&task, json, format!("Task {id} updated successfully"))?;
            Ok(())
        }
        Command::Delete { id } => {
            let task = manager.delete_task(id)?;
            print_task(&task, json, format!("Task {id} deleted successfully"))?;
            Ok(())
        }
        Command::Get { id } => {
            let task = manager.get_task_by_id(id)?;
            if json {
                print_json(&task_json(&task)?)?;
            } else {
                println!("{}", presenter.detail(&task));
            }
            Ok(())
        }
        Command::Notify => {
            let notifier = notify::notifier_from_env()?;
            let outcome = notify::notify_due_tasks(manager, notifier.as_ref());
            report_notifications(&outcome, json)?;

            let pending = notifier.wait_for_activations(notify::ACTIVATION_WAIT);
            if pending > 0 {
                tracing::debug!(pending, "stopped waiting for notification activations");
            }
            Ok(())
        }
    }
}

fn run_command(cli: Cli, config: &Config) -> Result<(), AppError> {
    let path = json_store::store_path()?;
    let mut manager = TaskManager::from_tasks(json_store::load_tasks(&path)?, SystemClock)?;
    let presenter = Presenter::new(config, color_enabled(cli.json));

    tracing::debug!(command = ?cli.command, store = %path.display(), "running command");
    let mutates = cli.command.mutates();
    execute(cli.command, cli.json, config, &mut manager, &presenter)?;
    if mutates {
        json_store::save_tasks(&path, manager.tasks())?;
    }
    Ok(())
}

fn run_args(args: Vec<String>) -> Result<(), AppError> {
    let config = resolve_config(&args)?;
    let args = expand_alias(args, &config)?;

    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push("task".to_string());
    argv.extend(args);

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(normalize_parse_error(err)),
    };

    run_command(cli, &config)
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let result = split_command_line(line).and_then(|args| {
            if args.is_empty() {
                Ok(())
            } else {
                run_args(args)
            }
        });
        if let Err(err) = result {
            eprintln!("ERROR: {}", err.report());
        }
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    init_tracing(verbose_requested(&args));

    let result = if args.is_empty() {
        run_interactive()
    } else {
        run_args(args)
    };

    if let Err(err) = result {
        eprintln!("ERROR: {}", err.report());
        std::process::exit(1);
    }
}
