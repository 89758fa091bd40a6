//! Meta-command front end.
//!
//! Feeds terminal lines through the [`InputValidator`] and dispatches
//! complete chunks to the [`Session`]. Lines starting with `.` are meta
//! commands when no chunk is being continued; unknown ones are handed to
//! the compiler like any other input.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use cinder_ir::WrapPolicy;

use crate::error::{ExecuteFileError, SessionError};
use crate::options::CompileOptions;
use crate::session::{ExecuteFileOutput, ProcessOutput, Session};
use crate::validator::{InputValidator, ValidationResult};

bitflags! {
    /// Toggles set by meta commands.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MetaFlags: u32 {
        /// `.printAST`: echo the declarations of each transaction.
        const PRINT_AST = 1 << 0;
        /// `.rawInput`: compile input as top-level declarations.
        const RAW_INPUT = 1 << 1;
        /// `.dynamicExtensions`: defer unknown names to run time.
        const DYNAMIC_LOOKUP = 1 << 2;
    }
}

const HELP: &str = "\
 .q                       Exit
 .L <file>                Load a file
 .x <file>[(args)]        Load a file and call the function named after it
 .X <file>[(args)]        Same as .x
 .I [path]                Add an include path, or list them
 .printAST [0|1]          Print the declarations of each transaction
 .rawInput [0|1]          Treat input as top-level declarations
 .dynamicExtensions [0|1] Resolve unknown names at run time
 .file                    Show session statistics
 .@                       Cancel the input being continued
 .help                    Show this text";

/// A recognized meta command.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum MetaCommand {
    Quit,
    Load(String),
    Execute(String),
    Include(Option<PathBuf>),
    Toggle(MetaFlags, Option<bool>),
    File,
    Cancel,
    Help,
}

impl MetaCommand {
    /// Recognize `line` as a meta command.
    ///
    /// Returns `None` for lines the compiler should see instead, including
    /// known commands with an argument they cannot take.
    pub fn parse(line: &str) -> Option<MetaCommand> {
        let line = line.trim();
        let rest = line.strip_prefix('.')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let command = match name {
            "q" if arg.is_empty() => MetaCommand::Quit,
            "L" => MetaCommand::Load(arg.to_owned()),
            "x" | "X" => MetaCommand::Execute(arg.to_owned()),
            "I" if arg.is_empty() => MetaCommand::Include(None),
            "I" => MetaCommand::Include(Some(PathBuf::from(arg))),
            "printAST" => MetaCommand::Toggle(MetaFlags::PRINT_AST, parse_switch(arg)?),
            "rawInput" => MetaCommand::Toggle(MetaFlags::RAW_INPUT, parse_switch(arg)?),
            "dynamicExtensions" => {
                MetaCommand::Toggle(MetaFlags::DYNAMIC_LOOKUP, parse_switch(arg)?)
            }
            "file" if arg.is_empty() => MetaCommand::File,
            "@" if arg.is_empty() => MetaCommand::Cancel,
            "help" | "?" if arg.is_empty() => MetaCommand::Help,
            _ => return None,
        };
        Some(command)
    }
}

/// `Some(None)` toggles; `None` rejects the argument.
fn parse_switch(arg: &str) -> Option<Option<bool>> {
    match arg {
        "" => Some(None),
        "0" => Some(Some(false)),
        "1" => Some(Some(true)),
        _ => None,
    }
}

fn flag_name(flag: MetaFlags) -> &'static str {
    if flag == MetaFlags::PRINT_AST {
        "printAST"
    } else if flag == MetaFlags::RAW_INPUT {
        "rawInput"
    } else {
        "dynamicExtensions"
    }
}

/// What one terminal line produced.
#[derive(Debug)]
pub enum LineResult {
    /// Chunk incomplete; prompt again at `indent`.
    NeedsMore { indent: usize },
    Processed(ProcessOutput),
    Executed(ExecuteFileOutput),
    FileError(ExecuteFileError),
    /// Text for the user: help, flag state, statistics.
    Message(String),
    Cancelled,
    Empty,
    Quit,
}

/// Line-level driver of a session.
#[derive(Clone, Debug, Default)]
pub struct MetaProcessor {
    validator: InputValidator,
    flags: MetaFlags,
}

impl MetaProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> MetaFlags {
        self.flags
    }

    /// Depth of the chunk being continued, for the prompt.
    pub fn depth(&self) -> usize {
        self.validator.depth()
    }

    pub fn is_continuing(&self) -> bool {
        !self.validator.is_empty()
    }

    /// Options implied by the current flags.
    pub fn compile_options(&self) -> CompileOptions {
        let wrap = if self.flags.contains(MetaFlags::RAW_INPUT) {
            WrapPolicy::Raw
        } else {
            WrapPolicy::Wrap
        };
        CompileOptions::default()
            .with_wrap(wrap)
            .with_print_ast(self.flags.contains(MetaFlags::PRINT_AST))
            .with_dynamic_lookup(self.flags.contains(MetaFlags::DYNAMIC_LOOKUP))
    }

    pub fn process_line(
        &mut self,
        session: &mut Session,
        line: &str,
    ) -> Result<LineResult, SessionError> {
        if line.trim() == ".@" {
            self.validator.reset();
            return Ok(LineResult::Cancelled);
        }
        if self.validator.is_empty() {
            if let Some(command) = MetaCommand::parse(line) {
                return self.run_command(session, command);
            }
        }

        match self.validator.validate(line) {
            ValidationResult::NeedsMore { indent } => Ok(LineResult::NeedsMore { indent }),
            ValidationResult::Ready => {
                let input = self.validator.take_input();
                if input.trim().is_empty() {
                    return Ok(LineResult::Empty);
                }
                session.set_options(self.compile_options());
                Ok(LineResult::Processed(session.process(&input)?))
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self, session))]
    pub fn run_command(
        &mut self,
        session: &mut Session,
        command: MetaCommand,
    ) -> Result<LineResult, SessionError> {
        session.set_options(self.compile_options());
        let result = match command {
            MetaCommand::Quit => LineResult::Quit,
            MetaCommand::Cancel => {
                self.validator.reset();
                LineResult::Cancelled
            }
            MetaCommand::Help => LineResult::Message(HELP.to_owned()),
            MetaCommand::Load(arg) if arg.is_empty() => {
                LineResult::Message("usage: .L <file>".to_owned())
            }
            MetaCommand::Execute(arg) if arg.is_empty() => {
                LineResult::Message("usage: .x <file>[(args)]".to_owned())
            }
            MetaCommand::Load(path) => {
                let loaded = session.load_file(Path::new(&path)).map(|load| ExecuteFileOutput {
                    load,
                    call: None,
                });
                file_result(loaded)?
            }
            MetaCommand::Execute(spec) => file_result(session.execute_file(&spec))?,
            MetaCommand::Include(Some(path)) => {
                session.add_include_path(path);
                LineResult::Empty
            }
            MetaCommand::Include(None) => {
                let mut text = String::from("include paths:");
                for path in session.include_paths() {
                    let _ = write!(text, "\n  {}", path.display());
                }
                LineResult::Message(text)
            }
            MetaCommand::Toggle(flag, value) => {
                let on = value.unwrap_or(!self.flags.contains(flag));
                self.flags.set(flag, on);
                session.set_options(self.compile_options());
                let state = if on { "on" } else { "off" };
                LineResult::Message(format!("{} is {state}", flag_name(flag)))
            }
            MetaCommand::File => {
                let stats = session.stats();
                let mut text = format!(
                    "{} transaction(s), {} declaration(s)",
                    stats.transactions, stats.decls
                );
                for (path, lines) in &stats.files {
                    let _ = write!(text, "\n  {} ({lines} lines)", path.display());
                }
                LineResult::Message(text)
            }
        };
        Ok(result)
    }
}

fn file_result(
    result: Result<ExecuteFileOutput, ExecuteFileError>,
) -> Result<LineResult, SessionError> {
    match result {
        Ok(output) => Ok(LineResult::Executed(output)),
        Err(ExecuteFileError::Session(err)) => Err(err),
        Err(err) => Ok(LineResult::FileError(err)),
    }
}
