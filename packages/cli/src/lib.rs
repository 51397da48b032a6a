//! Command line front end for `rtdb-client`.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};
use rtdb_client::{QueryOption, Ref, ReqwestTransport, Value};

/// Environment variable consulted when `--url` is not given.
pub const URL_ENV: &str = "RTDB_URL";
/// Environment variable consulted when `--auth` is not given.
pub const AUTH_ENV: &str = "RTDB_AUTH";

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("no database URL: pass --url or set RTDB_URL")]
    MissingUrl,

    #[error("could not read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON value: {0}")]
    InvalidValue(#[source] serde_json::Error),

    #[error("could not write output: {0}")]
    Output(#[from] std::io::Error),

    #[error(transparent)]
    Client(#[from] rtdb_client::Error),
}

/// rtdb - read and write a realtime JSON database over REST
#[derive(Parser, Debug)]
#[command(name = "rtdb")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Database URL, e.g. https://my-db.example.com
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Auth token sent with every request
    #[arg(long, global = true)]
    pub auth: Option<String>,

    /// Client-side request timeout in seconds
    #[arg(long, global = true, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value at PATH
    Get {
        path: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Overwrite the value at PATH (VALUE is JSON or @file)
    Set { path: String, value: String },
    /// Append VALUE under a generated key and print the key
    Push { path: String, value: String },
    /// Merge the fields of VALUE into PATH
    Update { path: String, value: String },
    /// Delete the value at PATH
    Remove { path: String },
    /// Security rules
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
}

impl Command {
    /// Subcommand name, e.g. `rules set`.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::Set { .. } => "set",
            Command::Push { .. } => "push",
            Command::Update { .. } => "update",
            Command::Remove { .. } => "remove",
            Command::Rules {
                command: RulesCommand::Get,
            } => "rules get",
            Command::Rules {
                command: RulesCommand::Set { .. },
            } => "rules set",
        }
    }

    /// Database path the command targets, relative to the root.
    pub fn path(&self) -> &str {
        match self {
            Command::Get { path, .. }
            | Command::Set { path, .. }
            | Command::Push { path, .. }
            | Command::Update { path, .. }
            | Command::Remove { path } => path.as_str(),
            Command::Rules { .. } => rtdb_client::rules::RULES_PATH,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// Print the rules exactly as stored
    Get,
    /// Replace the rules (VALUE is JSON or @file)
    Set { value: String },
}

#[derive(ClapArgs, Debug, Default)]
pub struct QueryArgs {
    /// Order children by this child key ($key, $value and $priority are special)
    #[arg(long)]
    pub order_by: Option<String>,
    #[arg(long)]
    pub start_at: Option<String>,
    #[arg(long)]
    pub end_at: Option<String>,
    #[arg(long)]
    pub equal_to: Option<String>,
    #[arg(long)]
    pub limit_to_first: Option<u32>,
    #[arg(long)]
    pub limit_to_last: Option<u32>,
    /// Only fetch the keys at PATH
    #[arg(long)]
    pub shallow: bool,
}

impl QueryArgs {
    pub fn to_options(&self) -> Vec<QueryOption> {
        let mut opts = Vec::new();
        if let Some(key) = &self.order_by {
            opts.push(match key.as_str() {
                "$key" => QueryOption::OrderByKey,
                "$value" => QueryOption::OrderByValue,
                "$priority" => QueryOption::OrderByPriority,
                _ => QueryOption::OrderBy(key.clone()),
            });
        }
        if let Some(v) = &self.start_at {
            opts.push(QueryOption::StartAt(filter_value(v)));
        }
        if let Some(v) = &self.end_at {
            opts.push(QueryOption::EndAt(filter_value(v)));
        }
        if let Some(v) = &self.equal_to {
            opts.push(QueryOption::EqualTo(filter_value(v)));
        }
        if let Some(n) = self.limit_to_first {
            opts.push(QueryOption::LimitToFirst(n));
        }
        if let Some(n) = self.limit_to_last {
            opts.push(QueryOption::LimitToLast(n));
        }
        if self.shallow {
            opts.push(QueryOption::Shallow);
        }
        opts
    }
}

/// Filter arguments are JSON literals; anything else is taken as a string.
fn filter_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Raw bytes of a VALUE argument: inline text, or the contents of `@file`.
pub fn value_bytes(arg: &str) -> Result<Vec<u8>, CliError> {
    match arg.strip_prefix('@') {
        Some(file) => {
            let path = PathBuf::from(file);
            std::fs::read(&path).map_err(|source| CliError::ReadFile { path, source })
        }
        None => Ok(arg.as_bytes().to_vec()),
    }
}

/// Parse a VALUE argument as JSON.
pub fn parse_value(arg: &str) -> Result<Value, CliError> {
    let bytes = value_bytes(arg)?;
    serde_json::from_slice(&bytes).map_err(CliError::InvalidValue)
}

/// Resolve the root reference from flags, falling back to the environment.
pub fn connect(args: &Args) -> Result<Ref, CliError> {
    let url = args
        .url
        .clone()
        .or_else(|| std::env::var(URL_ENV).ok())
        .ok_or(CliError::MissingUrl)?;
    let auth = args.auth.clone().or_else(|| std::env::var(AUTH_ENV).ok());

    let transport = ReqwestTransport::new(Duration::from_secs(args.timeout))
        .map_err(|e| rtdb_client::Error::Transport(Box::new(e)))?;
    let mut root = Ref::with_transport_at(&url, Arc::new(transport))?;
    if let Some(token) = auth {
        root = root.with_auth(token);
    }
    Ok(root)
}

/// Run one command against `root`, writing results to `out`.
pub fn run(root: &Ref, command: &Command, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Get { path, query } => {
            let value: Value = root.child(path).get(&query.to_options())?;
            serde_json::to_writer_pretty(&mut *out, &value).map_err(std::io::Error::from)?;
            writeln!(out)?;
        }
        Command::Set { path, value } => {
            root.child(path).set(&parse_value(value)?)?;
        }
        Command::Push { path, value } => {
            let name = root.child(path).push(&parse_value(value)?)?;
            writeln!(out, "{}", name)?;
        }
        Command::Update { path, value } => {
            root.child(path).update(&parse_value(value)?)?;
        }
        Command::Remove { path } => {
            root.child(path).remove()?;
        }
        Command::Rules { command } => match command {
            RulesCommand::Get => {
                out.write_all(&root.get_rules_json()?)?;
                writeln!(out)?;
            }
            RulesCommand::Set { value } => {
                root.set_rules_json(&value_bytes(value)?)?;
            }
        },
    }
    tracing::info!(command = command.name(), path = command.path(), "done");
    Ok(())
}
