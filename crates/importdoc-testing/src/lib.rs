//! Testing infrastructure for importdoc tests.
//!
//! This crate provides utilities for writing robust tests:
//! - `FakeImportSystem`: in-memory import system with call recording
//! - `fixtures`: on-disk package trees and a scripted fake interpreter
//! - `TestWorld`: isolated environment for running the CLI binary
//! - `assertions`: checks over emitted findings

pub mod assertions;
pub mod fake;
pub mod fixtures;
pub mod world;

pub use fake::FakeImportSystem;
pub use fixtures::{FakeInterpreter, PackageTree};
pub use world::{CliResult, TestWorld};
