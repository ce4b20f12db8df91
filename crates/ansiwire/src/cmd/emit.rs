use std::io::{self, Write};

use ansiwire_report::sequence;
use ansiwire_report::Attribute;
use ansiwire_stream::ControlSequences;
use tracing::debug;

use crate::cmd::{open_connection, EmitArgs, Toggle};
use crate::exit::{io_error, sequence_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_emitted, OutputFormat};

/// One step of an `emit` run, in the order it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Erase,
    Goto(u16, u16),
    Set(Vec<Attribute>),
    HideCursor,
    ShowCursor,
    LineWrap(Toggle),
    Text(String),
}

impl Step {
    fn name(&self) -> String {
        match self {
            Step::Erase => "erase-screen".to_string(),
            Step::Goto(row, col) => format!("goto {row},{col}"),
            Step::Set(attrs) => {
                let names: Vec<&str> = attrs.iter().map(|a| a.name()).collect();
                format!("set {}", names.join(","))
            }
            Step::HideCursor => "cursor-hide".to_string(),
            Step::ShowCursor => "cursor-show".to_string(),
            Step::LineWrap(Toggle::On) => "line-wrap on".to_string(),
            Step::LineWrap(Toggle::Off) => "line-wrap off".to_string(),
            Step::Text(text) => format!("text ({} bytes)", text.len()),
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            Step::Erase => sequence::ERASE_SCREEN.len(),
            Step::Goto(row, col) => sequence::goto(*row, *col).len(),
            Step::Set(attrs) => sequence::set(attrs).len(),
            Step::HideCursor => sequence::CURSOR_HIDE.len(),
            Step::ShowCursor => sequence::CURSOR_SHOW.len(),
            Step::LineWrap(Toggle::On) => sequence::ENABLE_LINE_WRAP.len(),
            Step::LineWrap(Toggle::Off) => sequence::DISABLE_LINE_WRAP.len(),
            Step::Text(text) => text.len(),
        }
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Step::Erase => out.erase_screen(),
            Step::Goto(row, col) => out.goto(*row, *col),
            Step::Set(attrs) => out.set(attrs),
            Step::HideCursor => out.cursor_hide(),
            Step::ShowCursor => out.cursor_show(),
            Step::LineWrap(Toggle::On) => out.enable_line_wrap(),
            Step::LineWrap(Toggle::Off) => out.disable_line_wrap(),
            Step::Text(text) => {
                out.write_all(text.as_bytes())?;
                out.flush()
            }
        }
    }
}

pub fn run(args: EmitArgs, format: OutputFormat) -> CliResult<i32> {
    let steps = plan(&args)?;
    if steps.is_empty() {
        return Err(CliError::new(USAGE, "nothing to emit"));
    }

    let (mut conn, endpoint) = open_connection(&args.target)?;
    let mut written = 0usize;
    for step in &steps {
        step.write_to(&mut conn)
            .map_err(|err| io_error("write failed", err))?;
        written += step.encoded_len();
        debug!(step = %step.name(), "emitted");
    }

    let names: Vec<String> = steps.iter().map(Step::name).collect();
    print_emitted(&endpoint.to_string(), &names, written, format);
    Ok(SUCCESS)
}

fn plan(args: &EmitArgs) -> CliResult<Vec<Step>> {
    let mut steps = Vec::new();
    if args.erase {
        steps.push(Step::Erase);
    }
    if let Some(target) = &args.goto {
        let (row, col) = parse_goto(target)?;
        steps.push(Step::Goto(row, col));
    }
    if !args.set.is_empty() {
        let attrs = args
            .set
            .iter()
            .map(|name| name.parse::<Attribute>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| sequence_error("--set", err))?;
        steps.push(Step::Set(attrs));
    }
    if args.hide_cursor {
        steps.push(Step::HideCursor);
    }
    if args.show_cursor {
        steps.push(Step::ShowCursor);
    }
    if let Some(toggle) = args.line_wrap {
        steps.push(Step::LineWrap(toggle));
    }
    if let Some(text) = &args.text {
        steps.push(Step::Text(text.clone()));
    }
    Ok(steps)
}

fn parse_goto(input: &str) -> CliResult<(u16, u16)> {
    let usage = || CliError::new(USAGE, format!("--goto expects ROW,COL, got {input:?}"));
    let (row, col) = input.split_once(',').ok_or_else(usage)?;
    let row = row.trim().parse().map_err(|_| usage())?;
    let col = col.trim().parse().map_err(|_| usage())?;
    Ok((row, col))
}
