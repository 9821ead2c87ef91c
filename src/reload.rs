use anyhow::{bail, Context, Result};
use std::process::Command;

/// Seam for the one side effect the overlay can trigger. The controller
/// decides; the host supplies the mechanism.
pub trait Reloader {
    fn reload(&mut self) -> Result<()>;
}

/// Runs the configured reload command through the shell. With no command
/// configured the decision still shows up in the transition log, but nothing
/// is executed.
pub struct ShellReloader {
    command: Option<String>,
}

impl ShellReloader {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl Reloader for ShellReloader {
    fn reload(&mut self) -> Result<()> {
        let Some(command) = &self.command else {
            return Ok(());
        };

        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .status()
            .with_context(|| format!("spawning reload command '{command}'"))?;
        if !status.success() {
            bail!("reload command '{command}' exited with {status}");
        }
        Ok(())
    }
}
