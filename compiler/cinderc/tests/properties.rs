// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Session-level behavior tests.
//!
//! Each module drives a full [`cinderc::Session`] through its public API:
//!
//! - `visibility/` - what later increments can see of earlier ones
//! - `failure/` - atomicity of failed increments and runtime faults
//! - `redefinition/` - redefinitions and previously bound calls
//! - `input/` - multi-line input through the meta front end
//! - `dynamic/` - deferred name lookup
//! - `files/` - `.L` and `.x` file execution
//!
//! ```bash
//! cargo test -p cinderc --test properties
//! ```

#[path = "properties/common.rs"]
mod common;

#[path = "properties/dynamic.rs"]
mod dynamic;

#[path = "properties/failure.rs"]
mod failure;

#[path = "properties/files.rs"]
mod files;

#[path = "properties/input.rs"]
mod input;

#[path = "properties/redefinition.rs"]
mod redefinition;

#[path = "properties/visibility.rs"]
mod visibility;
