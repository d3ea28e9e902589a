//! Identity probe strategies.
//!
//! A probe either produces a raw identifier or nothing. Missing commands,
//! unreadable files and unparseable output all degrade to `None`.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Output parser shared by command and file probes.
pub type Parser = fn(&str) -> Option<String>;

/// A single strategy for reading a hardware identifier.
pub trait IdentityProbe: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Attempt to read the identifier.
    fn probe(&self) -> Option<String>;
}

/// Runs an external command and parses its standard output.
pub struct CommandProbe {
    name: &'static str,
    program: &'static str,
    args: &'static [&'static str],
    parser: Parser,
}

impl CommandProbe {
    /// Create a command probe.
    pub const fn new(
        name: &'static str,
        program: &'static str,
        args: &'static [&'static str],
        parser: Parser,
    ) -> Self {
        Self {
            name,
            program,
            args,
            parser,
        }
    }
}

impl IdentityProbe for CommandProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn probe(&self) -> Option<String> {
        let output = Command::new(self.program)
            .args(self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        let output = match output {
            Ok(o) if o.status.success() => o,
            Ok(o) => {
                debug!(probe = self.name, status = ?o.status, "probe command failed");
                return None;
            }
            Err(e) => {
                debug!(probe = self.name, error = %e, "probe command unavailable");
                return None;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        (self.parser)(&stdout)
    }
}

/// Reads a file and parses its contents.
pub struct FileProbe {
    name: &'static str,
    path: PathBuf,
    parser: Parser,
}

impl FileProbe {
    /// Create a file probe.
    pub fn new(name: &'static str, path: impl Into<PathBuf>, parser: Parser) -> Self {
        Self {
            name,
            path: path.into(),
            parser,
        }
    }
}

impl IdentityProbe for FileProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn probe(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => (self.parser)(&contents),
            Err(e) => {
                debug!(probe = self.name, path = %self.path.display(), error = %e, "probe file unreadable");
                None
            }
        }
    }
}

/// First non-empty trimmed line.
pub fn first_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(String::from)
}
