//! Hirelane core: the assessment pipeline state machine and its scoring and
//! proctoring contracts.
//!
//! The pipeline walks a candidate through resume screening, a psychometric
//! test, a resume-grounded technical test, and a final job-description-based
//! assessment. Stage scores combine into a weighted qualification decision,
//! and proctoring violations can terminate an application from any
//! non-terminal state. Persistence and question content are behind traits so
//! binaries and tests supply their own adapters.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod telemetry;
