//! Shared test utilities for docanalyzer integration tests.
//!
//! This module provides:
//! - `TestHarness` with temp directories and a mocked inference endpoint
//! - Builders for PDF/DOCX fixtures and configurations

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{RecordingProgress, TestHarness};
