use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use log::error;

use pydytype::{
    comments::comments::{parse_command_comment, parse_module_comments},
    errors::errors::Error,
    format_error, logging, parse_module,
    runtime::{builtins::typing_globals, literal::literal_eval, namespace::Namespace},
    type_checker::{resolver::Environment, type_checker::check_annotation},
};

#[derive(Parser)]
#[command(name = "pydytype", version, about = "Check runtime values against their declared types")]
struct Cli {
    /// off, error, warn, info, debug or trace (defaults to $PYDYTYPE_LOG, then warn)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the declared types known on each line of a file
    Lines {
        file: PathBuf,
        /// Also print names without a declared type
        #[arg(long)]
        all: bool,
    },
    /// Print the `# pydytype: <command>` tags of a file
    Comments {
        file: PathBuf,
    },
    /// Check a literal value against a type expression
    Check {
        /// e.g. 'dict[str, list[int]]'
        type_expression: String,
        /// e.g. "{'a': [1, 2]}"
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = logging::resolve_level(cli.log_level.as_deref());
    if let Err(err) = logging::init(level) {
        eprintln!("failed to install logger: {}", err);
    }

    match cli.command {
        Commands::Lines { file, all } => lines(&file, all),
        Commands::Comments { file } => comments(&file),
        Commands::Check {
            type_expression,
            value,
        } => check(&type_expression, &value),
    }
}

fn display_error(error: &Error, file: &Path) {
    let content = fs::read_to_string(file).unwrap_or_default();
    eprint!("{}", format_error(error, &content, file));
}

fn lines(file: &Path, all: bool) -> ExitCode {
    let table = match parse_module(file) {
        Ok(table) => table,
        Err(err) => {
            display_error(&err, file);
            return ExitCode::FAILURE;
        }
    };

    for (line, types) in table.iter() {
        let mut entries = types
            .iter()
            .filter(|(_, type_expression)| all || type_expression.is_some())
            .map(|(name, type_expression)| {
                format!("{}: {}", name, type_expression.as_deref().unwrap_or("-"))
            })
            .collect::<Vec<_>>();
        if entries.is_empty() {
            continue;
        }
        entries.sort();
        println!("{:>4} | {}", line, entries.join(", "));
    }

    ExitCode::SUCCESS
}

fn comments(file: &Path) -> ExitCode {
    let comments = match parse_module_comments(file) {
        Ok(comments) => comments,
        Err(err) => {
            display_error(&err, file);
            return ExitCode::FAILURE;
        }
    };

    for (line, comment) in &comments {
        if let Some(command) = parse_command_comment(Some(comment.as_str())) {
            println!("{:>4} | {}", line, command);
        }
    }

    ExitCode::SUCCESS
}

fn check(type_expression: &str, value: &str) -> ExitCode {
    let value = match literal_eval(value) {
        Ok(value) => value,
        Err(err) => {
            error!("invalid value: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let locals = Namespace::new();
    let globals = typing_globals();
    match check_annotation(&value, type_expression, &Environment::new(&locals, &globals)) {
        Ok(verdict) => {
            match &verdict.descriptor {
                Some(descriptor) => println!("{} against {}: {}", value, descriptor, verdict.outcome),
                None => println!("{} against {}: {}", value, type_expression, verdict.outcome),
            }
            if verdict.outcome.is_conformant() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            error!("cannot resolve `{}`: {}", type_expression, err);
            ExitCode::FAILURE
        }
    }
}
