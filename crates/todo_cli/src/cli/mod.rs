use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use todo_core::config::{self, Config, ConfigOverrides};
use todo_core::error::AppError;
use todo_core::model::TaskStatus;
use todo_core::view::{Intent, RowRef};

#[derive(Parser, Debug)]
#[command(name = "todo", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Start the session with a status filter applied
    #[arg(long, value_enum, global = true)]
    pub filter: Option<StatusArg>,

    /// Directory holding the task storage
    #[arg(long, value_name = "DIR", global = true)]
    pub store_dir: Option<PathBuf>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task to the top of the list
    ///
    /// Example: todo add Buy milk
    Add {
        /// Task text; several words are joined with spaces
        text: Vec<String>,
    },
    /// Flip a task between pending and completed
    ///
    /// Example: todo toggle 0
    Toggle { row: String },
    /// Mark a task as completed
    ///
    /// Example: todo check 0
    Check { row: String },
    /// Mark a task as pending
    ///
    /// Example: todo uncheck 0
    Uncheck { row: String },
    /// Delete a task
    ///
    /// Example: todo delete 0
    #[command(alias = "rm")]
    Delete { row: String },
    /// Toggle a status filter; repeating the active filter clears it
    ///
    /// Example: todo filter pending
    Filter {
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// Delete every task
    ///
    /// Example: todo clear
    Clear,
    /// Show the task list
    ///
    /// Example: todo list
    #[command(alias = "ls")]
    List,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    Pending,
    Completed,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => TaskStatus::Pending,
            StatusArg::Completed => TaskStatus::Completed,
        }
    }
}

impl Command {
    pub fn into_intent(self) -> Result<Intent, AppError> {
        let intent = match self {
            Self::Add { text } => Intent::Add(text.join(" ")),
            Self::Toggle { row } => Intent::Toggle(row.parse::<RowRef>()?),
            Self::Check { row } => Intent::SetStatus(row.parse::<RowRef>()?, true),
            Self::Uncheck { row } => Intent::SetStatus(row.parse::<RowRef>()?, false),
            Self::Delete { row } => Intent::Delete(row.parse::<RowRef>()?),
            Self::Filter { status } => Intent::Filter(status.into()),
            Self::Clear => Intent::ClearAll,
            Self::List => Intent::Show,
        };
        Ok(intent)
    }
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Alias(String),
    StoreDir,
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
        "store_dir" => {
            if remainder.is_some() {
                return Err(format!("{canonical_field} override cannot have subfields"));
            }
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::StoreDir,
                value,
            })
        }
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

/// Folds every `--config-override` value into a set of overrides.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
            ConfigOverrideTarget::StoreDir => {
                if parsed.value.is_empty() {
                    return Err(AppError::invalid_input("store_dir cannot be empty"));
                }
                overrides.store_dir = Some(PathBuf::from(parsed.value));
            }
        }
    }
    Ok(overrides)
}

/// Global flags that consume the following argument.
const VALUE_FLAGS: [&str; 3] = ["--filter", "--store-dir", CONFIG_OVERRIDE_FLAG];

/// Replaces the subcommand word with its alias expansion. `args` excludes the
/// program name.
pub fn expand_aliases(args: Vec<String>, config: &Config) -> Vec<String> {
    let mut position = None;
    let mut skip_next = false;
    for (index, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        position = Some(index);
        break;
    }

    let Some(position) = position else {
        return args;
    };
    let Some(expansion) = config::expand_alias(config, &args[position]) else {
        return args;
    };

    let mut expanded = Vec::with_capacity(args.len() + expansion.len());
    expanded.extend_from_slice(&args[..position]);
    expanded.extend(expansion);
    expanded.extend_from_slice(&args[position + 1..]);
    expanded
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
