use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use std::path::Path;
use todo_cli::cli::{self, Cli};
use todo_cli::session::Session;
use todo_core::config::{self, Config};
use todo_core::error::AppError;
use todo_core::storage::{self, FileStore};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("todo=debug,todo_cli=debug,todo_core=debug")
        } else {
            EnvFilter::new("error")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
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

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
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
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn open_storage(flag: Option<&Path>, config: &Config) -> Result<FileStore, AppError> {
    let dir = match flag.or(config.store_dir.as_deref()) {
        Some(dir) => dir.to_path_buf(),
        None => storage::default_store_dir()?,
    };
    debug!(dir = %dir.display(), "using file storage");
    Ok(FileStore::new(dir))
}

fn parse_cli(args: Vec<String>) -> Result<Cli, clap::Error> {
    let argv = std::iter::once("todo".to_string()).chain(args);
    Cli::try_parse_from(argv)
}

fn is_help_request(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

fn run_once(args: Vec<String>, base: Config) -> Result<(), AppError> {
    let args = cli::expand_aliases(args, &base);
    let parsed = parse_cli(args).map_err(|err| {
        if is_help_request(&err) {
            err.exit()
        }
        normalize_parse_error(err)
    })?;

    let overrides = cli::collect_overrides(&parsed.config_override)?;
    let config = config::merge_overrides(&base, &overrides);
    let storage = open_storage(parsed.store_dir.as_deref(), &config)?;

    let mut session =
        Session::new(storage, config).with_filter(parsed.filter.map(Into::into));
    let output = session.run_and_format(parsed.command, parsed.json)?;
    println!("{output}");
    Ok(())
}

fn run_line<S: storage::KeyValueStore>(
    session: &mut Session<S>,
    line: &str,
) -> Result<(), AppError> {
    let args = split_command_line(line)?;
    if args.is_empty() {
        return Ok(());
    }

    let args = cli::expand_aliases(args, session.config());
    let parsed = match parse_cli(args) {
        Ok(parsed) => parsed,
        Err(err) if is_help_request(&err) => {
            print!("{}", err.render());
            return Ok(());
        }
        Err(err) => return Err(normalize_parse_error(err)),
    };
    let output = session.run_and_format(parsed.command, parsed.json)?;
    println!("{output}");
    Ok(())
}

fn run_interactive(config: Config) -> Result<(), AppError> {
    let storage = open_storage(None, &config)?;
    let mut session = Session::new(storage, config);
    let initial = session.run_and_format(cli::Command::List, false)?;
    println!("{initial}");

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

        if let Err(err) = run_line(&mut session, line) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|arg| arg == "-v" || arg == "--verbose");
    init_tracing(verbose);

    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        debug!(error = %err, "using default config");
    }

    let result = if args.is_empty() {
        run_interactive(loaded.config)
    } else {
        run_once(args, loaded.config)
    };

    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
