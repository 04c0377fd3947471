use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tmplwatch::exec::{CommandOutput, CommandRunner, RunFuture};

/// One recorded invocation: program plus argv.
pub type Invocation = (String, Vec<String>);

#[derive(Debug, Clone)]
enum Reply {
    Stdout(String),
    Fail(String),
}

/// A fake command runner that:
/// - records every `(program, args)` it is asked to run
/// - answers with queued replies, repeating the last one once the queue is
///   down to a single entry
#[derive(Debug, Clone, Default)]
pub struct FakeCommandRunner {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that always prints `stdout`.
    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        let runner = Self::new();
        runner.push_stdout(stdout);
        runner
    }

    /// Runner that always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        let runner = Self::new();
        runner.push_failure(message);
        runner
    }

    pub fn push_stdout(&self, stdout: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Stdout(stdout.into()));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(message.into()));
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Option<Reply> {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    }
}

impl CommandRunner for FakeCommandRunner {
    fn run_capture<'a>(&'a self, program: &'a str, args: &'a [String]) -> RunFuture<'a> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        let reply = self.next_reply();

        Box::pin(async move {
            match reply {
                Some(Reply::Stdout(stdout)) => Ok(CommandOutput {
                    stdout,
                    stderr: String::new(),
                }),
                Some(Reply::Fail(message)) => Err(anyhow::anyhow!(message)),
                None => Err(anyhow::anyhow!("no reply queued for `{program}`")),
            }
        })
    }
}
