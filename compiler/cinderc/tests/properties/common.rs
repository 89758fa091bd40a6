//! Shared helpers.

use cinder_eval::{buffer_handler, Value};
use cinderc::{CompileStatus, ProcessOutput, Session, SessionConfig};

/// Session whose output is captured.
pub fn session() -> Session {
    Session::new(SessionConfig::new().with_print_handler(buffer_handler()))
}

/// Submit `text` and require it to compile and run cleanly.
pub fn ok(session: &mut Session, text: &str) -> ProcessOutput {
    let out = session.process(text).unwrap();
    assert!(
        out.is_success(),
        "`{text}` failed: {:?} {:?}",
        out.compile.diagnostics,
        out.run
    );
    out
}

/// Trailing value of `text`.
pub fn eval(session: &mut Session, text: &str) -> Value {
    ok(session, text)
        .value
        .unwrap_or_else(|| panic!("`{text}` produced no value"))
        .value
}

pub fn status(session: &mut Session, text: &str) -> CompileStatus {
    session.process(text).unwrap().compile.status
}
