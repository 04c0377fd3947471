// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! Config acquisition talks to a `CommandRunner` instead of spawning
//! processes itself. Production code uses [`super::RealCommandRunner`]; tests
//! can provide a fake that records invocations and returns canned output.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

pub type RunFuture<'a> = Pin<Box<dyn Future<Output = Result<CommandOutput>> + Send + 'a>>;

/// Trait abstracting how an external command is executed.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion and capture its output.
    ///
    /// Spawn failures and non-zero exits are errors.
    fn run_capture<'a>(&'a self, program: &'a str, args: &'a [String]) -> RunFuture<'a>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    fn run_capture<'a>(&'a self, program: &'a str, args: &'a [String]) -> RunFuture<'a> {
        (**self).run_capture(program, args)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run_capture<'a>(&'a self, program: &'a str, args: &'a [String]) -> RunFuture<'a> {
        (**self).run_capture(program, args)
    }
}
