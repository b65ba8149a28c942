// ABOUTME: App orchestrator — wires config, action log, archive extraction, and the shell loop.
// ABOUTME: Startup order: record "start emulator", extract the archive, then run the REPL.

use std::io::{BufRead, Write};

use anyhow::Context;
use tracing::info;

use crate::archive::Workspace;
use crate::cli::Cli;
use crate::config::Config;
use crate::session::state::canonical_root;
use crate::session::{ActionLog, Session};
use crate::shell::{Shell, ShellOptions};

/// Text of the record written before the archive is extracted.
pub const START_RECORD: &str = "start emulator";

/// Top-level application.
pub struct App {
    config: Config,
    cli: Cli,
}

impl App {
    pub fn new(config: Config, cli: Cli) -> Self {
        Self { config, cli }
    }

    /// Run against the process's standard streams.
    pub fn run(self) -> anyhow::Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        let mut stderr = std::io::stderr();
        self.run_with(stdin.lock(), &mut stdout, &mut stderr)
    }

    /// Run against arbitrary streams.
    pub fn run_with<R, W, E>(self, input: R, out: &mut W, err: &mut E) -> anyhow::Result<()>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        let log = ActionLog::from_config(&self.cli.log, &self.config.log);
        log.append(&self.cli.username, START_RECORD)
            .context("recording emulator start")?;

        let workspace = Workspace::extract(&self.cli.archive)?;
        let root = canonical_root(workspace.path())?;

        let session = Session::new(&self.cli.username, root);
        let options = ShellOptions::from(&self.config.shell);
        let mut shell = Shell::new(session, log, options);
        let result = shell.run(input, out, err);

        if self.cli.keep_workdir || self.config.shell.keep_workdir {
            let kept = workspace.keep();
            info!(workdir = %kept.display(), "Keeping working directory");
            writeln!(err, "Working directory kept at {}", kept.display())?;
        }
        result
    }
}
