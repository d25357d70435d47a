//! External program invocation

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Command;

/// A program to run and where to run it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory
    pub dir: PathBuf,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a program exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
    /// Exited successfully
    pub success: bool,
    /// Exit code, if the program exited normally
    pub code: Option<i32>,
}

impl ProcessStatus {
    /// Successful exit
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    /// Failed exit with `code`
    #[must_use]
    pub const fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// Runs external programs
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner {
    /// Run to completion, inheriting stdio
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the program cannot be started.
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessStatus>;
}

/// [`ProcessRunner`] spawning real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessStatus> {
        tracing::debug!(command = %invocation, dir = %invocation.dir.display(), "spawning");

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.dir)
            .status()?;

        Ok(ProcessStatus {
            success: status.success(),
            code: status.code(),
        })
    }
}
