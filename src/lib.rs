//! # flamingock-cli
//!
//! Command-line executor that drives the Flamingock change engine embedded in a
//! Java application: it launches the application jar in CLI mode, asks it to
//! run one operation, and reports the JSON response the application writes back.
//!
//! ## Architecture
//!
//! - **cli**: clap command surface (`execute apply`, `audit list|fix`, `issue list|get`)
//! - **passthrough**: `-J` JVM args and `--` application args, with reserved-prefix validation
//! - **options**: per-run execution options
//! - **jar**: target jar resolution and Spring Boot / plain uber classification
//! - **launcher**: java command construction and process launch
//! - **orchestration**: one run end to end, including the response file lifecycle
//! - **response**: response document model
//! - **render**: text and JSON output
//! - **config**: java binary, work directory and log filter resolution
//! - **error**: exit-code carrying errors

pub mod cli;
pub mod config;
pub mod error;
pub mod jar;
pub mod launcher;
pub mod operation;
pub mod options;
pub mod orchestration;
pub mod passthrough;
pub mod render;
pub mod response;
