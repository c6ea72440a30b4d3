use crate::report::Report;
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::info;

/// Delivers reports.
pub trait Mailer {
    fn send(&mut self, report: &Report) -> Result<()>;
}

/// Hands messages to a local `sendmail`-compatible binary, which reads the
/// recipients from the headers (`-t`).
#[derive(Debug, Clone)]
pub struct SendmailMailer {
    program: PathBuf,
}

impl SendmailMailer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Mailer for SendmailMailer {
    fn send(&mut self, report: &Report) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(["-t", "-i"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start {}", self.program.display()))?;

        {
            let stdin = child
                .stdin
                .as_mut()
                .context("sendmail stdin was not captured")?;
            stdin.write_all(report.to_message().as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        info!(to = %report.to, subject = %report.subject, "report mailed");
        Ok(())
    }
}

/// Prints messages instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct ConsoleMailer;

impl Mailer for ConsoleMailer {
    fn send(&mut self, report: &Report) -> Result<()> {
        println!("{}", report.to_message().replace("\r\n", "\n"));
        Ok(())
    }
}
