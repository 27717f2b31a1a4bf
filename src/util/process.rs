//! Subprocess execution utilities.
//!
//! Every external tool the cross-compiler drives (`configure`, `make`,
//! `patch`, `autoconf`) goes through a [`CommandRunner`]. The real runner
//! relays the child's combined output line by line, tagged with its pid.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::io::{self, BufRead, BufReader, PipeReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use anyhow::{Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<OsString>,
    env: BTreeMap<String, OsString>,
    cwd: Option<PathBuf>,
    shell: bool,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
            shell: false,
        }
    }

    /// Create a builder for a script interpreted by `sh -c`.
    ///
    /// Use this when the command needs redirection or pipes. Arguments added
    /// afterwards become the script's positional parameters (`"$1"`, ...), so
    /// paths reach the script byte for byte without quoting.
    pub fn shell(script: impl Into<String>) -> Self {
        ProcessBuilder {
            program: PathBuf::from("sh"),
            args: vec!["-c".into(), script.into().into(), "sh".into()],
            env: BTreeMap::new(),
            cwd: None,
            shell: true,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_os_string()));
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get an environment override, if one was set.
    pub fn get_env(&self, key: &str) -> Option<&OsStr> {
        self.env.get(key).map(OsString::as_os_str)
    }

    /// Get the working directory, if one was set.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Whether this command runs through `sh -c`.
    pub fn is_shell(&self) -> bool {
        self.shell
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Run to completion, relaying combined stdout/stderr to `out`.
    ///
    /// Writes an `Executing ... with pid of N:` header, then every output
    /// line prefixed with `[N] `. Nothing is written to the child's stdin.
    /// Returns the child's exit code. If relaying fails the child is killed
    /// and reaped before the error is returned.
    pub fn stream_to(&self, out: &mut dyn Write) -> Result<i32> {
        let (reader, writer) = io::pipe().context("failed to create output pipe")?;

        // The Command holds the write ends; it must be dropped before reading
        // or the reader never sees EOF.
        let mut child = {
            let mut cmd = self.build_command();
            cmd.stdin(Stdio::null());
            cmd.stdout(writer.try_clone().context("failed to clone output pipe")?);
            cmd.stderr(writer);
            cmd.spawn()
                .with_context(|| format!("failed to spawn `{}`", self.display_command()))?
        };

        if let Err(e) = self.relay(&child, reader, out) {
            reap(&mut child);
            return Err(e);
        }

        let status = child
            .wait()
            .with_context(|| format!("failed to wait for `{}`", self.display_command()))?;

        Ok(exit_code(status))
    }

    /// Copy the child's output to `out` until EOF.
    fn relay(&self, child: &Child, reader: PipeReader, out: &mut dyn Write) -> Result<()> {
        let pid = child.id();
        writeln!(out, "Executing {} with pid of {}:", self.display_command(), pid)
            .context("failed to write command output")?;

        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();
        loop {
            line.clear();
            let n = reader
                .read_until(b'\n', &mut line)
                .with_context(|| format!("failed to read output of `{}`", self.display_command()))?;
            if n == 0 {
                break;
            }
            if line.last() == Some(&b'\n') {
                line.pop();
            }
            writeln!(out, "[{}] {}", pid, String::from_utf8_lossy(&line))
                .context("failed to write command output")?;
        }
        out.flush().context("failed to write command output")?;
        Ok(())
    }

    /// Display the command for logs and error messages.
    ///
    /// Shell commands show their script with positional parameters filled in.
    pub fn display_command(&self) -> String {
        if self.shell {
            let mut script = self
                .args
                .get(1)
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            for (i, param) in self.args.iter().skip(3).enumerate() {
                let quoted = shell_quote(&param.to_string_lossy());
                script = script.replace(&format!("\"${}\"", i + 1), &quoted);
            }
            return script;
        }
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

/// Kill a child that is no longer being relayed and collect its status.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!("failed to kill pid {}: {}", child.id(), e);
    }
    if let Err(e) = child.wait() {
        tracing::debug!("failed to wait for pid {}: {}", child.id(), e);
    }
}

/// `{flag}{path}` as one argument, keeping the path's exact bytes.
pub fn path_arg(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path);
    arg
}

/// Exit code of a finished process; signal deaths map to `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

/// Quote a string for display as an `sh` word.
pub fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"/._-+=:,@".contains(&b))
    {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Something that can run a command to completion and report its exit code.
///
/// Non-zero exit codes are returned, not raised; the caller decides whether
/// they are fatal. An `Err` means the command could not be run at all.
pub trait CommandRunner {
    fn run(&mut self, cmd: &ProcessBuilder) -> Result<i32>;
}

/// Runner that executes real subprocesses and streams their output.
#[derive(Debug)]
pub struct StreamingRunner<W: Write> {
    out: W,
}

impl StreamingRunner<io::Stdout> {
    /// Stream to standard output.
    pub fn stdout() -> Self {
        StreamingRunner { out: io::stdout() }
    }
}

impl<W: Write> StreamingRunner<W> {
    /// Stream to the given sink.
    pub fn new(out: W) -> Self {
        StreamingRunner { out }
    }

    /// Recover the output sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandRunner for StreamingRunner<W> {
    fn run(&mut self, cmd: &ProcessBuilder) -> Result<i32> {
        tracing::debug!("running `{}`", cmd.display_command());
        cmd.stream_to(&mut self.out)
    }
}
