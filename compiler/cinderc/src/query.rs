//! Salsa queries over included files.
//!
//! An included file is preprocessed and lexed once per revision of its
//! text. Re-including an unchanged file reuses the cached tokens, and its
//! fingerprint tells the compiler the file was already compiled.

use std::hash::{Hash, Hasher};

use cinder_lexer::LexOutput;
use rustc_hash::FxHasher;

use crate::db::Db;
use crate::include::{extract_includes, Directives};
use crate::input::SourceFile;

/// The file's include directives and its text without them.
#[salsa::tracked]
pub fn directives(db: &dyn Db, file: SourceFile) -> Directives {
    extract_includes(file.text(db))
}

/// Tokens of the file's text with directives removed.
#[salsa::tracked]
pub fn tokens(db: &dyn Db, file: SourceFile) -> LexOutput {
    let text = directives(db, file).text;
    cinder_lexer::lex(&text, db.interner())
}

/// Content hash used for include-once checks.
#[salsa::tracked]
pub fn fingerprint(db: &dyn Db, file: SourceFile) -> u64 {
    let mut hasher = FxHasher::default();
    file.text(db).hash(&mut hasher);
    hasher.finish()
}

/// Number of lines in the file.
#[salsa::tracked]
pub fn line_count(db: &dyn Db, file: SourceFile) -> usize {
    file.text(db).lines().count()
}

#[cfg(test)]
mod tests;
