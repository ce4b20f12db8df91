use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ansiwire_stream::{StreamError, TerminalReader};
use tracing::{debug, info};

use crate::cmd::{open_terminal, WatchArgs};
use crate::exit::{io_error, stream_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_report, OutputFormat};

/// How often the report loop looks at the Ctrl-C flag.
const TICK: Duration = Duration::from_millis(200);

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let (term, endpoint) = open_terminal(&args.target, args.chunk_size)?;
    let endpoint = endpoint.to_string();
    let (reader, mut writer, reports) = term.into_split();

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let passthrough = thread::Builder::new()
        .name("ansiwire-passthrough".to_string())
        .spawn(move || copy_to_stdout(reader))
        .map_err(|err| io_error("failed to start reader", err))?;

    let mut printed = 0u64;
    let mut stream_ended = false;
    while running.load(Ordering::SeqCst) {
        match reports.recv_timeout(TICK) {
            Ok(report) => {
                info!(%report, "report received");
                print_report(&report, &endpoint, format);
                printed += 1;
                if args.count.is_some_and(|count| printed >= count) {
                    break;
                }
            }
            Err(StreamError::Timeout(_)) => continue,
            Err(StreamError::Disconnected) => {
                stream_ended = true;
                break;
            }
            Err(err) => return Err(stream_error("watch failed", err)),
        }
    }
    debug!(printed, stream_ended, "report loop finished");

    drop(reports);
    if !stream_ended {
        let _ = writer.close();
    }
    let copied = passthrough
        .join()
        .map_err(|_| CliError::new(INTERNAL, "passthrough thread panicked"))?;

    match copied {
        Ok(bytes) => {
            debug!(bytes, "passthrough finished");
            Ok(SUCCESS)
        }
        // A closed stream surfaces as an error only when the terminal did it.
        Err(err) if stream_ended => Err(io_error("terminal read failed", err)),
        Err(_) => Ok(SUCCESS),
    }
}

/// Forward clean chunks to stdout until the stream ends.
fn copy_to_stdout(mut reader: TerminalReader) -> io::Result<u64> {
    let stdout = io::stdout();
    let mut total = 0u64;
    while let Some(chunk) = reader.read_chunk()? {
        let mut out = stdout.lock();
        out.write_all(&chunk)?;
        out.flush()?;
        total += chunk.len() as u64;
    }
    Ok(total)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
