//! Background launch.

use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// Re-launch the current executable with `args`, detached from this terminal.
///
/// Returns the child's PID. The child is not waited on.
pub fn spawn_detached(args: Vec<String>) -> Result<u32> {
    let exe = std::env::current_exe().context("failed to locate current executable")?;

    let mut cmd = Command::new(&exe);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    // Own process group, so Ctrl-C in the launching shell does not reach it.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let child = cmd
        .spawn()
        .with_context(|| format!("failed to spawn {}", exe.display()))?;

    Ok(child.id())
}
