//! Cinder Eval - runs committed declarations.
//!
//! The evaluator walks the checked trees stored in the
//! [`CompilationContext`](cinder_sema::CompilationContext):
//! - [`Value`]: runtime values (all `Copy`)
//! - [`Globals`]: storage for translation-unit variables, outliving increments
//! - [`Interpreter`]: executes one declaration at a time
//! - [`SharedPrintHandler`]: where `printf`/`puts` output goes

mod errors;
mod globals;
pub mod interpreter;
mod print_handler;
mod value;

pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use globals::Globals;
pub use interpreter::{Interpreter, DEFAULT_MAX_DEPTH};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use value::{Value, ValueDisplay};
