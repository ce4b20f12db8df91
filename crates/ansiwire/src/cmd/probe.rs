use std::io;
use std::thread;
use std::time::{Duration, Instant};

use ansiwire_report::Report;
use ansiwire_stream::{ControlSequences, Reports, StreamError, TerminalReader};
use tracing::debug;

use crate::cmd::{open_terminal, parse_duration, ProbeArgs, Query};
use crate::exit::{io_error, stream_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS};
use crate::output::{print_report, OutputFormat};

pub fn run(args: ProbeArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let (term, endpoint) = open_terminal(&args.target, args.chunk_size)?;
    let (reader, mut writer, reports) = term.into_split();

    // Clean bytes must keep moving or the worker never gets to the report.
    let drain = thread::Builder::new()
        .name("ansiwire-drain".to_string())
        .spawn(move || discard(reader))
        .map_err(|err| io_error("failed to start reader", err))?;

    send_query(&mut writer, args.query).map_err(|err| io_error("query failed", err))?;
    debug!(query = ?args.query, ?timeout, "query sent");

    let result = wait_for_answer(&reports, args.query, timeout);
    // Late reports must not park the worker while the drain thread winds down.
    drop(reports);
    let _ = writer.close();
    let discarded = join_drain(drain)?;

    let report = match result {
        Ok(report) => report,
        Err(StreamError::Disconnected) => {
            return Err(match discarded {
                Err(err) => io_error("terminal read failed", err),
                Ok(_) => CliError::new(FAILURE, "terminal closed before reporting"),
            })
        }
        Err(err) => return Err(stream_error("no report", err)),
    };

    print_report(&report, &endpoint.to_string(), format);
    Ok(SUCCESS)
}

pub(crate) fn send_query<W: ControlSequences>(out: &mut W, query: Query) -> io::Result<()> {
    match query {
        Query::Position => out.query_cursor_position(),
        Query::Status => out.query_device_status(),
        Query::Code => out.query_device_code(),
    }
}

/// Read and drop clean bytes until the stream ends.
fn discard(mut reader: TerminalReader) -> io::Result<u64> {
    let copied = io::copy(&mut reader, &mut io::sink())?;
    debug!(bytes = copied, "discarded terminal output");
    Ok(copied)
}

fn join_drain(drain: thread::JoinHandle<io::Result<u64>>) -> CliResult<io::Result<u64>> {
    drain
        .join()
        .map_err(|_| CliError::new(INTERNAL, "drain thread panicked"))
}

/// First report that answers `query`. Other reports are logged and skipped.
fn wait_for_answer(
    reports: &Reports,
    query: Query,
    timeout: Duration,
) -> Result<Report, StreamError> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(StreamError::Timeout(timeout));
        }
        let report = reports.recv_timeout(remaining).map_err(|err| match err {
            StreamError::Timeout(_) => StreamError::Timeout(timeout),
            other => other,
        })?;
        if answers(query, &report) {
            return Ok(report);
        }
        debug!(%report, "ignoring unrelated report");
    }
}

/// Whether `report` answers `query`.
fn answers(query: Query, report: &Report) -> bool {
    matches!(
        (query, report),
        (Query::Position, Report::CursorPosition(_))
            | (Query::Status, Report::DeviceOk | Report::DeviceFailure)
            | (Query::Code, Report::DeviceCode { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_map_to_sequences() {
        let mut out = Vec::new();
        send_query(&mut out, Query::Position).unwrap();
        send_query(&mut out, Query::Status).unwrap();
        send_query(&mut out, Query::Code).unwrap();
        assert_eq!(out, b"\x1b[6n\x1b[5n\x1b[c");
    }

    #[test]
    fn answers_match_query_kind() {
        use ansiwire_report::Position;

        assert!(answers(Query::Position, &Report::CursorPosition(Position::default())));
        assert!(answers(Query::Status, &Report::DeviceFailure));
        assert!(answers(Query::Code, &Report::DeviceCode { code: 1 }));
        assert!(!answers(Query::Code, &Report::DeviceOk));
    }

    #[test]
    fn panicked_drain_is_an_internal_error() {
        let drain = thread::spawn(|| -> io::Result<u64> { panic!("drain failed") });
        assert_eq!(join_drain(drain).unwrap_err().code, INTERNAL);

        let drain = thread::spawn(|| -> io::Result<u64> { Ok(3) });
        assert_eq!(join_drain(drain).unwrap().unwrap(), 3);
    }
}
