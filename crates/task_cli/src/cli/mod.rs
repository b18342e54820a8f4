use clap::{CommandFactory, Parser, Subcommand};
use task_core::config::{Config, ConfigOverrides, ListFormat};
use task_core::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "task", author, version, about = "Task CLI - A simple task manager", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new task
    ///
    /// Example: task add "Buy milk" --priority high --due "2024-01-20 15:00"
    Add {
        title: Option<String>,
        /// Task priority: low, medium, high (default: medium)
        #[arg(short, long)]
        priority: Option<String>,
        /// Due date (format: YYYY-MM-DD HH:MM)
        #[arg(long)]
        due: Option<String>,
        /// Reminder time (format: YYYY-MM-DD HH:MM)
        #[arg(long)]
        reminder: Option<String>,
    },
    /// List and filter tasks
    ///
    /// Example: task list --priority --due thisweek
    List {
        /// Sort by priority
        #[arg(long)]
        priority: bool,
        /// Sort by due date
        #[arg(long = "by-due")]
        by_due: bool,
        /// Filter by time: today, tomorrow, thisweek, nextweek, overdue,
        /// duesoon, upcoming, or a date (YYYY-MM-DD HH:MM)
        #[arg(long, value_name = "FILTER")]
        due: Option<String>,
        /// Show completed tasks
        #[arg(long)]
        all: bool,
        /// Output format: table or list
        #[arg(long)]
        format: Option<String>,
    },
    /// Update an existing task
    ///
    /// Example: task update 3 --title "Pay rent" --done
    Update {
        id: u64,
        /// New task title
        #[arg(long)]
        title: Option<String>,
        /// Change priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,
        /// Mark as completed
        #[arg(long, conflicts_with = "undone")]
        done: bool,
        /// Mark as not completed
        #[arg(long)]
        undone: bool,
        /// Set due date (YYYY-MM-DD HH:MM)
        #[arg(long, conflicts_with = "remove_due")]
        due: Option<String>,
        /// Set reminder (YYYY-MM-DD HH:MM)
        #[arg(long, conflicts_with = "remove_reminder")]
        reminder: Option<String>,
        /// Remove due date
        #[arg(long)]
        remove_due: bool,
        /// Remove reminder
        #[arg(long)]
        remove_reminder: bool,
    },
    /// Remove a task
    ///
    /// Example: task delete 1
    Delete { id: u64 },
    /// Show detailed task information
    ///
    /// Example: task get 1
    Get { id: u64 },
    /// Send desktop notifications for overdue, due-soon and upcoming tasks
    ///
    /// Example: task notify
    Notify,
}

impl Command {
    /// Whether a successful run changes the task store.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Add { .. } | Command::Update { .. } | Command::Delete { .. }
        )
    }
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    ListFormat,
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    match canonical_field.as_str() {
        "theme" | "list_format" | "format" if remainder.is_some() => {
            Err(format!("{canonical_field} override cannot have subfields"))
        }
        "theme" => Ok(ParsedConfigOverride {
            target: ConfigOverrideTarget::Theme,
            value,
        }),
        "list_format" | "format" => Ok(ParsedConfigOverride {
            target: ConfigOverrideTarget::ListFormat,
            value,
        }),
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

/// Builds [`ConfigOverrides`] from every raw `--config-override` value.
pub fn build_config_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::ListFormat => {
                overrides.list_format = Some(ListFormat::parse(&parsed.value)?);
            }
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
        }
    }
    Ok(overrides)
}

/// Collects `--config-override` values ahead of clap, since they can define
/// the alias the command line starts with.
pub fn scan_config_overrides(args: &[String]) -> Vec<String> {
    let mut found = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == CONFIG_OVERRIDE_FLAG {
            if let Some(value) = iter.next() {
                found.push(value.clone());
            }
        } else if let Some(value) = arg.strip_prefix("--config-override=") {
            found.push(value.to_string());
        }
    }
    found
}

pub fn verbose_requested(args: &[String]) -> bool {
    args.iter().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Replaces a leading alias with its configured command line. Built-in
/// command names are never shadowed.
pub fn expand_alias(args: Vec<String>, config: &Config) -> Result<Vec<String>, AppError> {
    let Some(position) = command_position(&args) else {
        return Ok(args);
    };

    let word = args[position].as_str();
    if is_builtin_command(word) {
        return Ok(args);
    }
    let Some(expansion) = config.alias(word) else {
        return Ok(args);
    };

    tracing::debug!(alias = word, expansion, "expanding alias");
    let mut expanded = args[..position].to_vec();
    expanded.extend(split_command_line(expansion)?);
    expanded.extend(args[position + 1..].iter().cloned());
    Ok(expanded)
}

fn command_position(args: &[String]) -> Option<usize> {
    let mut skip_next = false;
    for (index, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == CONFIG_OVERRIDE_FLAG {
            skip_next = true;
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return Some(index);
    }
    None
}

fn is_builtin_command(word: &str) -> bool {
    word == "help"
        || Cli::command()
            .get_subcommands()
            .any(|sub| sub.get_name() == word)
}

/// Splits a line into arguments, honouring double quotes and `\"` / `\\`
/// escapes inside them.
pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
                quoted = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
