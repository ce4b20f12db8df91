use std::time::Duration;

use ansiwire_stream::{InterceptConfig, Terminal, DEFAULT_CHUNK_SIZE};
use ansiwire_transport::{Connection, Endpoint, Listener};
use clap::{Args, Subcommand, ValueEnum};
use tracing::info;

use crate::exit::{stream_error, transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod emit;
pub mod probe;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a query and print the terminal's report.
    Probe(ProbeArgs),
    /// Pass terminal output through and print every report.
    Watch(WatchArgs),
    /// Send display commands.
    Emit(EmitArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Probe(args) => probe::run(args, format),
        Command::Watch(args) => watch::run(args, format),
        Command::Emit(args) => emit::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where the terminal is and how to reach it.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Terminal endpoint: unix:/path, tcp:host:port, or host:port.
    pub endpoint: String,
    /// Bind the endpoint and wait for the terminal to connect instead of dialing it.
    #[arg(long)]
    pub listen: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Which query to send.
    #[arg(long, value_enum, default_value = "position")]
    pub query: Query,
    /// Maximum time to wait for the report (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", env = "ANSIWIRE_TIMEOUT")]
    pub timeout: String,
    /// Read chunk size in bytes. Reports split across chunks are not seen.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Query {
    /// Cursor position (ESC [ 6 n).
    Position,
    /// Device status (ESC [ 5 n).
    Status,
    /// Device code (ESC [ c).
    Code,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Exit after N reports.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,
    /// Read chunk size in bytes.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[derive(Args, Debug)]
pub struct EmitArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Erase the screen.
    #[arg(long)]
    pub erase: bool,
    /// Move the cursor, as ROW,COL.
    #[arg(long, value_name = "ROW,COL")]
    pub goto: Option<String>,
    /// Display attributes by name or code (comma-separated).
    #[arg(long, value_name = "ATTR", value_delimiter = ',')]
    pub set: Vec<String>,
    /// Hide the cursor.
    #[arg(long, conflicts_with = "show_cursor")]
    pub hide_cursor: bool,
    /// Show the cursor.
    #[arg(long)]
    pub show_cursor: bool,
    /// Turn line wrap on or off.
    #[arg(long, value_enum, value_name = "on|off")]
    pub line_wrap: Option<Toggle>,
    /// Plain text to write after the sequences.
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_endpoint(input: &str) -> CliResult<Endpoint> {
    input
        .parse()
        .map_err(|err| transport_error("bad endpoint", err))
}

/// Dial the endpoint, or with `--listen` accept one connection on it.
pub(crate) fn open_connection(target: &TargetArgs) -> CliResult<(Connection, Endpoint)> {
    let endpoint = parse_endpoint(&target.endpoint)?;
    if !target.listen {
        let conn = endpoint
            .connect()
            .map_err(|err| transport_error("connect failed", err))?;
        return Ok((conn, endpoint));
    }

    let listener = Listener::bind(&endpoint).map_err(|err| transport_error("bind failed", err))?;
    info!(endpoint = %listener.endpoint(), "waiting for terminal");
    let conn = listener
        .accept()
        .map_err(|err| transport_error("accept failed", err))?;
    Ok((conn, listener.endpoint().clone()))
}

pub(crate) fn open_terminal(
    target: &TargetArgs,
    chunk_size: usize,
) -> CliResult<(Terminal<Connection>, Endpoint)> {
    if chunk_size == 0 {
        return Err(CliError::new(USAGE, "--chunk-size must be greater than zero"));
    }
    let (conn, endpoint) = open_connection(target)?;
    let config = InterceptConfig {
        chunk_size,
        ..InterceptConfig::default()
    };
    let term =
        Terminal::wrap_with_config(conn, &config).map_err(|err| stream_error("wrap failed", err))?;
    Ok((term, endpoint))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert_eq!(parse_duration("").unwrap_err().code, USAGE);
    }

    #[test]
    fn parse_endpoint_maps_to_usage() {
        assert!(parse_endpoint("unix:/tmp/t.sock").is_ok());
        assert_eq!(parse_endpoint("no-port").unwrap_err().code, USAGE);
    }
}
