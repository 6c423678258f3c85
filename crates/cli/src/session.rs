//! `irlab session` -- interactive REPL over a live pipeline session.
//!
//! Every command is forwarded to a session actor running on a tokio
//! runtime. With `auto_recompute` on, edits schedule a debounced run in the
//! background; `run` forces a recompute and waits for its result.

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use irlab_core::{
    parse_pass_list, Config, PassCatalog, PassId, PipelineSequence, SessionClosed, SessionHandle,
    SessionDriver, SessionSnapshot, SessionState,
};
use irlab_toy::toy_engine;
use tokio::runtime::Runtime;

use crate::render;
use crate::{print_json, read_source, report_error, OutputFormat};

/// Longest wait for a run before showing whatever the session has.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the interactive session REPL, optionally seeded with `file`.
pub fn run_session(file: Option<&Path>, config: &Config, output: OutputFormat, quiet: bool) {
    let runtime = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(
                &format!("error: failed to start async runtime: {}", e),
                output,
                quiet,
            );
            process::exit(1);
        }
    };

    let engine = Arc::new(toy_engine());
    let available = engine.catalog().list_available();
    let (session, _task) = {
        let _guard = runtime.enter();
        SessionDriver::spawn(engine, config.session.clone())
    };

    let repl = Repl {
        runtime,
        session,
        available,
        tool: config.query.tool.clone(),
        auto_recompute: config.session.auto_recompute,
        output,
    };

    if let Some(path) = file {
        let text = match read_source(path) {
            Ok(s) => s,
            Err(e) => {
                let msg = format!("error reading file '{}': {}", path.display(), e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        };
        if repl.call(repl.session.edit_input(text)).is_err() {
            report_error("error: session closed unexpectedly", output, quiet);
            process::exit(1);
        }
    }

    if !quiet {
        println!();
        println!("  irlab session: {} passes available", repl.available.len());
        println!("  Commands: help, show, input, load, clear-input, add, pop, clear, toggle, passes, run, query, quit");
        println!();
    }

    if let Err(SessionClosed) = repl.run_loop() {
        report_error("error: session closed unexpectedly", output, quiet);
        process::exit(1);
    }
}

struct Repl {
    runtime: Runtime,
    session: SessionHandle,
    available: Vec<PassId>,
    tool: String,
    auto_recompute: bool,
    output: OutputFormat,
}

impl Repl {
    fn call<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Wait for an `Idle` snapshot at `revision`, giving up after
    /// [`SETTLE_TIMEOUT`].
    fn settle(&self, revision: u64) -> Result<SessionSnapshot, SessionClosed> {
        let waited = self.call(async {
            tokio::time::timeout(SETTLE_TIMEOUT, self.session.settled(revision)).await
        });
        match waited {
            Ok(snapshot) => snapshot,
            Err(_) => {
                tracing::warn!(revision, "session did not settle in time");
                Ok(self.session.snapshot())
            }
        }
    }

    fn run_loop(&self) -> Result<(), SessionClosed> {
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        let mut line = String::new();

        loop {
            print!("irlab> ");
            if io::stdout().flush().is_err() {
                break;
            }

            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => {
                    // EOF (Ctrl-D)
                    println!();
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("error reading input: {}", e);
                    break;
                }
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let (cmd, rest) = match trimmed.split_once(char::is_whitespace) {
                Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
                None => (trimmed.to_lowercase(), ""),
            };

            match cmd.as_str() {
                "help" => print_help(),
                "show" => self.show()?,
                "input" => {
                    if rest.is_empty() {
                        eprintln!("usage: input <text>   (use \\n for line breaks)");
                        continue;
                    }
                    let text = rest.replace("\\n", "\n");
                    self.call(self.session.edit_input(text))?;
                    println!("  input updated");
                }
                "load" => {
                    if rest.is_empty() {
                        eprintln!("usage: load <file>");
                        continue;
                    }
                    match read_source(Path::new(rest)) {
                        Ok(text) => {
                            let lines = text.lines().count();
                            self.call(self.session.edit_input(text))?;
                            println!("  loaded {} ({} lines)", rest, lines);
                        }
                        Err(e) => eprintln!("error reading file '{}': {}", rest, e),
                    }
                }
                "clear-input" => {
                    self.call(self.session.clear_input())?;
                    println!("  input cleared");
                }
                "add" => self.add(rest)?,
                "pop" => {
                    let before = self.session.snapshot();
                    self.call(self.session.remove_last_pass())?;
                    match before.passes.last() {
                        Some(pass) => println!("  removed {}", pass),
                        None => println!("  no passes selected"),
                    }
                }
                "clear" => {
                    self.call(self.session.clear_passes())?;
                    println!("  all passes cleared");
                }
                "toggle" => {
                    self.call(self.session.toggle_display_mode())?;
                    let snapshot = self.session.snapshot();
                    println!("  display mode: {}", mode_label(&snapshot));
                    println!("{}", render::pass_list(&snapshot.projected));
                }
                "passes" => self.print_available(),
                "run" => self.run()?,
                "query" => self.query(),
                "quit" | "exit" => break,
                _ => {
                    eprintln!(
                        "unknown command: {}. Type 'help' for available commands.",
                        cmd
                    );
                }
            }
        }
        Ok(())
    }

    fn add(&self, rest: &str) -> Result<(), SessionClosed> {
        let requested = parse_pass_list(rest);
        if requested.is_empty() {
            eprintln!("usage: add <pass>[,<pass>...]");
            return Ok(());
        }
        if let Some(unknown) = requested.iter().find(|p| !self.available.contains(*p)) {
            eprintln!(
                "unknown pass '{}'. Type 'passes' for available passes.",
                unknown
            );
            return Ok(());
        }
        for pass in &requested {
            self.call(self.session.append_pass(pass.clone()))?;
            println!("  added {}", pass);
        }
        Ok(())
    }

    /// Current session view. Waits for a pending automatic run first.
    fn show(&self) -> Result<(), SessionClosed> {
        let mut snapshot = self.session.snapshot();
        if self.auto_recompute && snapshot.state != SessionState::Idle {
            snapshot = self.settle(snapshot.revision)?;
        }
        match self.output {
            OutputFormat::Json => print_json(&snapshot),
            OutputFormat::Text => {
                println!();
                println!(
                    "  input: {} | display: {} | state: {}",
                    input_summary(&snapshot.input),
                    mode_label(&snapshot),
                    state_label(snapshot.state),
                );
                println!("  passes:");
                println!("{}", render::pass_list(&snapshot.projected));
                println!("  output:");
                println!(
                    "{}",
                    render::output_pane(&snapshot.input, snapshot.result.as_ref())
                );
            }
        }
        Ok(())
    }

    fn run(&self) -> Result<(), SessionClosed> {
        let revision = self.call(self.session.request_recompute())?;
        let snapshot = self.settle(revision)?;
        match self.output {
            OutputFormat::Json => print_json(&snapshot.result),
            OutputFormat::Text => println!(
                "{}",
                render::output_pane(&snapshot.input, snapshot.result.as_ref())
            ),
        }
        Ok(())
    }

    fn query(&self) {
        let snapshot = self.session.snapshot();
        let sequence: PipelineSequence = snapshot.passes.into_iter().collect();
        println!("  {}", sequence.to_query(&self.tool));
    }

    fn print_available(&self) {
        println!();
        for pass in &self.available {
            println!("  {}", pass);
        }
        println!();
    }
}

fn print_help() {
    println!();
    println!("  help                Show this help");
    println!("  show                Show input, selected passes and output");
    println!("  input <text>        Replace the input (use \\n for line breaks)");
    println!("  load <file>         Replace the input with a file's contents");
    println!("  clear-input         Clear the input");
    println!("  add <pass>[,...]    Append passes to the pipeline");
    println!("  pop                 Remove the last pass");
    println!("  clear               Remove all passes");
    println!("  toggle              Switch between condensed and expanded pass lists");
    println!("  passes              List available passes");
    println!("  run                 Recompute now and show the output");
    println!("  query               Show the pipeline as a command line");
    println!("  quit                Exit the session");
    println!();
}

fn input_summary(input: &str) -> String {
    match input.lines().count() {
        0 => "empty".to_owned(),
        1 => "1 line".to_owned(),
        n => format!("{} lines", n),
    }
}

fn mode_label(snapshot: &SessionSnapshot) -> &'static str {
    match snapshot.display_mode.style_class() {
        Some(class) => class,
        None => "expanded",
    }
}

fn state_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::Stale => "stale",
        SessionState::Running => "running",
        SessionState::Cancelled => "cancelled",
    }
}
