//! Forwarding active-resource updates to the external CLI.
//!
//! Switching the active project or space of a `tanzu` context involves more
//! than a config write (credentials, kubeconfig entries), so it is delegated
//! to the CLI binary:
//!
//! ```text
//! <bin> context update tanzu-active-resource <name> --project <p> --space <s>
//! ```
//!
//! Before running it, the CLI is asked for an alternate command line via
//! `<bin> _custom_command <args...>`. When that succeeds with non-empty
//! output, the whitespace-separated output replaces the arguments; otherwise
//! the original arguments are used.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Environment variable naming the CLI binary.
pub const TANZU_BIN_ENV: &str = "TANZU_BIN";

/// Binary used when neither an explicit path nor `TANZU_BIN` is given.
pub const DEFAULT_BINARY: &str = "tanzu";

/// Subcommand that asks the CLI for an alternate command line.
pub const CUSTOM_COMMAND_NAME: &str = "_custom_command";

/// Where the CLI is found and where its output goes.
///
/// # Examples
///
/// ```
/// use tanzu_config::delegate::CommandOptions;
///
/// let mut captured = Vec::new();
/// let options = CommandOptions::new()
///     .with_binary("/usr/local/bin/tanzu")
///     .with_output_writer(&mut captured);
/// ```
pub struct CommandOptions<'a> {
    output: Box<dyn Write + 'a>,
    error: Box<dyn Write + 'a>,
    binary: PathBuf,
}

impl Default for CommandOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandOptions<'a> {
    /// Options writing to the process stdout/stderr, with the binary taken
    /// from `TANZU_BIN` (or `tanzu` on the `PATH`).
    #[must_use]
    pub fn new() -> Self {
        let binary = std::env::var_os(TANZU_BIN_ENV)
            .filter(|bin| !bin.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_BINARY), PathBuf::from);

        Self {
            output: Box::new(io::stdout()),
            error: Box::new(io::stderr()),
            binary,
        }
    }

    /// Sends the command's stdout to `writer`.
    #[must_use]
    pub fn with_output_writer(mut self, writer: impl Write + 'a) -> Self {
        self.output = Box::new(writer);
        self
    }

    /// Sends the command's stderr to `writer`.
    #[must_use]
    pub fn with_error_writer(mut self, writer: impl Write + 'a) -> Self {
        self.error = Box::new(writer);
        self
    }

    /// Runs `binary` instead of the default.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// The binary that will be run.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

/// Asks the CLI to make `project`/`space` the active resource of the `tanzu`
/// context `name`.
///
/// The command's stdout and stderr are written to the option sinks, also
/// when it fails. Both streams are captured before delivery: all of stdout
/// reaches its sink before any of stderr, so when both sinks are the same
/// writer the two streams are not interleaved as the command wrote them.
///
/// # Errors
///
/// - [`Error::Io`] if the binary cannot be run or a sink cannot be written
/// - [`Error::Subprocess`] if the command exits unsuccessfully
///
/// # Examples
///
/// ```no_run
/// use tanzu_config::delegate::{set_tanzu_context_active_resource, CommandOptions};
///
/// set_tanzu_context_active_resource("my-tanzu", "projectA", "", CommandOptions::new()).unwrap();
/// ```
pub fn set_tanzu_context_active_resource(
    name: &str,
    project: &str,
    space: &str,
    mut options: CommandOptions<'_>,
) -> Result<()> {
    let args: Vec<OsString> = [
        "context",
        "update",
        "tanzu-active-resource",
        name,
        "--project",
        project,
        "--space",
        space,
    ]
    .into_iter()
    .map(OsString::from)
    .collect();

    let args = alternate_args(&options.binary, &args).unwrap_or(args);
    let command_line = describe(&options.binary, &args);
    log::debug!("running {command_line}");

    let output = Command::new(&options.binary).args(&args).output()?;

    options.output.write_all(&output.stdout)?;
    options.output.flush()?;
    options.error.write_all(&output.stderr)?;
    options.error.flush()?;

    if output.status.success() {
        return Ok(());
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    Err(Error::Subprocess {
        command: command_line,
        status: output.status.to_string(),
        output: combined.trim().to_string(),
    })
}

/// The alternate arguments offered by the CLI, if any.
fn alternate_args(binary: &Path, args: &[OsString]) -> Option<Vec<OsString>> {
    let output = match Command::new(binary).arg(CUSTOM_COMMAND_NAME).args(args).output() {
        Ok(output) => output,
        Err(e) => {
            log::debug!("{CUSTOM_COMMAND_NAME} unavailable: {e}");
            return None;
        }
    };

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let alternate: Vec<OsString> = stdout.split_whitespace().map(OsString::from).collect();
    (!alternate.is_empty()).then_some(alternate)
}

fn describe(binary: &Path, args: &[OsString]) -> String {
    let mut line = binary.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}
