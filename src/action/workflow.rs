//! Workflow commands understood by the CI runner
//!
//! PATH additions and step outputs go to the files the runner names in
//! `GITHUB_PATH` / `GITHUB_OUTPUT`. Without those files the legacy `::cmd::`
//! lines are printed instead.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

/// Emits runner commands to `out` or to the runner's command files
pub struct WorkflowCommands<W: Write> {
    out: W,
    path_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

impl WorkflowCommands<io::Stdout> {
    pub fn stdout(path_file: Option<PathBuf>, output_file: Option<PathBuf>) -> Self {
        Self::new(io::stdout(), path_file, output_file)
    }
}

impl<W: Write> WorkflowCommands<W> {
    pub fn new(out: W, path_file: Option<PathBuf>, output_file: Option<PathBuf>) -> Self {
        Self {
            out,
            path_file,
            output_file,
        }
    }

    /// Prepend `dir` to PATH for the following steps
    pub fn add_path(&mut self, dir: &Path) -> io::Result<()> {
        debug!("Adding {} to PATH", dir.display());
        match &self.path_file {
            Some(file) => append_line(file, &dir.display().to_string()),
            None => writeln!(self.out, "::add-path::{}", dir.display()),
        }
    }

    /// Set a step output
    pub fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
        match &self.output_file {
            Some(file) if value.contains('\n') => {
                let delimiter = heredoc_delimiter(value);
                append_line(file, &format!("{name}<<{delimiter}\n{value}\n{delimiter}"))
            }
            Some(file) => append_line(file, &format!("{name}={value}")),
            None => writeln!(
                self.out,
                "::set-output name={}::{}",
                escape_property(name),
                escape_data(value)
            ),
        }
    }

    /// Mark the step as failed with `message`
    pub fn set_failed(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "::error::{}", escape_data(message))
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

fn append_line(file: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(file)?;
    writeln!(file, "{line}")
}

/// A delimiter that does not occur in `value`
fn heredoc_delimiter(value: &str) -> String {
    let mut delimiter = String::from("ghadelimiter");
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    delimiter
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}
