//! Salsa inputs.
//!
//! Included files are the only inputs. Re-reading a file whose text
//! changed on disk updates its input, which invalidates the queries that
//! read it.

use std::path::PathBuf;

/// An included source file.
#[salsa::input]
pub struct SourceFile {
    /// Canonical path of the file.
    #[return_ref]
    pub path: PathBuf,

    /// Text as last read from disk.
    #[return_ref]
    pub text: String,
}
