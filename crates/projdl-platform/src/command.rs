use crate::error::{Error, Result};
use crate::shell::Shell;
use std::ffi::OsStr;
use std::io;
use std::process::{Command as StdCommand, ExitStatus};

/// Builder over [`std::process::Command`] that remembers the program name for
/// error reporting.
#[derive(Debug)]
pub struct Command {
    inner:   StdCommand,
    program: String,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            inner: StdCommand::new(&program),
            program,
        }
    }

    /// Run `script` through `shell` (`sh -c <script>` or `cmd /C <script>`).
    pub fn shell(shell: Shell, script: &str) -> Self {
        Self::new(shell.executable()).arg(shell.script_flag()).arg(script)
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.inner.env(key, val);
        self
    }

    pub fn program(&self) -> &str { &self.program }

    /// Run to completion with inherited stdio and return the exit status.
    pub fn status(&mut self) -> Result<ExitStatus> {
        // Arguments may carry credentials; only the program is logged.
        tracing::debug!(program = %self.program, "spawning");
        self.inner.status().map_err(|e| self.spawn_error(e))
    }

    /// Like [`Command::status`], collapsed to "exited with code 0".
    pub fn succeeds(&mut self) -> Result<bool> { Ok(self.status()?.success()) }

    fn spawn_error(&self, source: io::Error) -> Error {
        if source.kind() == io::ErrorKind::NotFound {
            Error::CommandNotFound {
                cmd: self.program.clone(),
            }
        } else {
            Error::CommandFailed {
                cmd: self.program.clone(),
                source,
            }
        }
    }
}
