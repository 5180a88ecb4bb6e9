//! Test module organization for report ingestion
//!
//! Tests for the ingestion pipeline, one module per stage.

pub mod parser_tests;
