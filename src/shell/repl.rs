// ABOUTME: The interactive read-eval loop — prompt, parse, log, dispatch.
// ABOUTME: Generic over input and output streams so whole sessions can be driven from tests.

use std::io::{BufRead, Write};

use anyhow::Context;
use tracing::debug;

use crate::config::ShellConfig;
use crate::session::{ActionLog, Session};
use crate::shell::command::{Command, ParsedLine, parse_line};
use crate::shell::fs_ops::{self, Removal};

/// Whether the loop should keep reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Prompt and listing options for the loop.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub host: String,
    pub sort_entries: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self::from(&ShellConfig::default())
    }
}

impl From<&ShellConfig> for ShellOptions {
    fn from(config: &ShellConfig) -> Self {
        Self {
            host: config.host.clone(),
            sort_entries: config.sort_entries,
        }
    }
}

/// An interactive shell over one session and its action log.
pub struct Shell {
    session: Session,
    log: ActionLog,
    options: ShellOptions,
}

impl Shell {
    pub fn new(session: Session, log: ActionLog, options: ShellOptions) -> Self {
        Self {
            session,
            log,
            options,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run until `exit` or end of input.
    ///
    /// End of input behaves like `exit`, including its log record. Errors
    /// are returned only for I/O on the streams or a failed log append.
    pub fn run<R, W, E>(&mut self, mut input: R, out: &mut W, err: &mut E) -> anyhow::Result<()>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        let mut buf = Vec::new();
        loop {
            write!(out, "{}", self.session.prompt(&self.options.host))?;
            out.flush()?;

            buf.clear();
            // Non-UTF-8 input is decoded lossily rather than ending the session.
            let read = input.read_until(b'\n', &mut buf).context("reading command")?;
            if read == 0 {
                debug!("End of input");
                self.execute(Command::Exit, out, err)?;
                return Ok(());
            }

            let line = String::from_utf8_lossy(&buf);
            if self.execute_line(&line, out, err)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Parse and run a single input line.
    pub fn execute_line<W, E>(&mut self, line: &str, out: &mut W, err: &mut E) -> anyhow::Result<Flow>
    where
        W: Write,
        E: Write,
    {
        match parse_line(line) {
            ParsedLine::Empty => Ok(Flow::Continue),
            ParsedLine::MissingArgument { usage } => {
                writeln!(err, "{usage}")?;
                Ok(Flow::Continue)
            }
            ParsedLine::Unknown(name) => {
                writeln!(out, "Unknown command: {name}")?;
                Ok(Flow::Continue)
            }
            ParsedLine::Command(command) => self.execute(command, out, err),
        }
    }

    /// Log a command, then run it.
    pub fn execute<W, E>(&mut self, command: Command, out: &mut W, err: &mut E) -> anyhow::Result<Flow>
    where
        W: Write,
        E: Write,
    {
        let text = command.log_text();
        debug!(command = %text, cwd = %self.session.cwd().display(), "Dispatching");
        self.log
            .append(self.session.username(), &text)
            .with_context(|| format!("recording '{text}'"))?;

        match command {
            Command::Exit => return Ok(Flow::Exit),
            Command::Ls => match fs_ops::list_dir(self.session.cwd(), self.options.sort_entries) {
                Ok(names) => {
                    for name in names {
                        writeln!(out, "{name}")?;
                    }
                }
                Err(e) => writeln!(err, "ls: {}: {}", self.session.cwd().display(), e)?,
            },
            Command::Cd { target } => {
                if let Err(refused) = self.session.change_dir(&target) {
                    writeln!(err, "Directory does not exist: {}", refused.0.display())?;
                }
            }
            Command::Rm { target } => {
                let path = self.session.resolve(&target);
                match fs_ops::remove_path(&path) {
                    Ok(Removal::Removed) => writeln!(out, "Removed: {}", path.display())?,
                    Ok(Removal::NotFound) => writeln!(
                        err,
                        "File or directory does not exist: {}",
                        path.display()
                    )?,
                    Err(e) => writeln!(err, "rm: {}: {}", path.display(), e)?,
                }
            }
            Command::Tree => {
                fs_ops::write_tree(self.session.cwd(), self.options.sort_entries, out, err)?;
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: std::path::PathBuf,
        shell: Shell,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("subdir")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("subdir").join("b.txt"), "b").unwrap();
        let log = ActionLog::new(dir.path().join("log.xml"));
        let shell = Shell::new(Session::new("alice", &root), log, ShellOptions::default());
        Fixture {
            _dir: dir,
            root,
            shell,
        }
    }

    fn run_line(shell: &mut Shell, line: &str) -> (Flow, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let flow = shell.execute_line(line, &mut out, &mut err).unwrap();
        (
            flow,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn logged(shell: &Shell) -> Vec<String> {
        shell
            .log
            .records()
            .unwrap()
            .into_iter()
            .map(|r| r.command)
            .collect()
    }

    #[test]
    fn unknown_command_is_reported_and_not_logged() {
        let mut f = fixture();
        let (flow, out, _) = run_line(&mut f.shell, "cat a.txt");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(out, "Unknown command: cat\n");
        assert!(logged(&f.shell).is_empty());
    }

    #[test]
    fn missing_argument_prints_usage_and_is_not_logged() {
        let mut f = fixture();
        let (_, out, err) = run_line(&mut f.shell, "cd");
        assert!(out.is_empty());
        assert_eq!(err, "Usage: cd <directory>\n");
        let (_, _, err) = run_line(&mut f.shell, "rm");
        assert_eq!(err, "Usage: rm <file/directory>\n");
        assert!(logged(&f.shell).is_empty());
    }

    #[test]
    fn failed_cd_is_logged_and_keeps_cwd() {
        let mut f = fixture();
        let (_, _, err) = run_line(&mut f.shell, "cd nowhere");
        assert!(err.starts_with("Directory does not exist: "));
        assert_eq!(f.shell.session().cwd(), f.root.as_path());

        let (_, out, _) = run_line(&mut f.shell, "ls");
        assert_eq!(out, "a.txt\nsubdir\n");
        assert_eq!(logged(&f.shell), vec!["cd nowhere", "ls"]);
    }

    #[test]
    fn rm_missing_path_leaves_tree_unchanged() {
        let mut f = fixture();
        let (_, out, err) = run_line(&mut f.shell, "rm ghost");
        assert!(out.is_empty());
        assert!(err.starts_with("File or directory does not exist: "));
        let (_, out, _) = run_line(&mut f.shell, "ls");
        assert_eq!(out, "a.txt\nsubdir\n");
    }

    #[test]
    fn rm_resolves_against_current_directory() {
        let mut f = fixture();
        run_line(&mut f.shell, "cd subdir");
        let (_, out, _) = run_line(&mut f.shell, "rm b.txt");
        assert_eq!(
            out,
            format!("Removed: {}\n", f.root.join("subdir").join("b.txt").display())
        );
        assert!(f.root.join("a.txt").exists());
    }

    #[test]
    fn ls_after_removing_cwd_reports_error() {
        let mut f = fixture();
        run_line(&mut f.shell, "cd subdir");
        run_line(&mut f.shell, "rm .");
        let (flow, out, err) = run_line(&mut f.shell, "ls");
        assert_eq!(flow, Flow::Continue);
        assert!(out.is_empty());
        assert!(err.starts_with("ls: "));
    }

    #[test]
    fn tree_output() {
        let mut f = fixture();
        let (_, out, _) = run_line(&mut f.shell, "tree");
        assert_eq!(out, "|-- a.txt\n|-- subdir\n|   |-- b.txt\n");
    }

    #[test]
    fn exit_is_logged_and_stops() {
        let mut f = fixture();
        let (flow, out, _) = run_line(&mut f.shell, "exit now");
        assert_eq!(flow, Flow::Exit);
        assert!(out.is_empty());
        assert_eq!(logged(&f.shell), vec!["exit"]);
    }

    #[test]
    fn run_prints_prompts_and_treats_eof_as_exit() {
        let mut f = fixture();
        let input = "\nls\n".as_bytes();
        let mut out = Vec::new();
        let mut err = Vec::new();
        f.shell.run(input, &mut out, &mut err).unwrap();

        let out = String::from_utf8(out).unwrap();
        let prompt = format!("alice@virtual_shell:{}$ ", f.root.display());
        assert_eq!(out.matches(&prompt).count(), 3);
        assert!(out.contains("a.txt\nsubdir\n"));
        assert_eq!(logged(&f.shell), vec!["ls", "exit"]);
    }

    #[test]
    fn invalid_utf8_line_does_not_end_session() {
        let mut f = fixture();
        let mut out = Vec::new();
        let mut err = Vec::new();
        f.shell
            .run(&b"ls \xff\nls\nexit\n"[..], &mut out, &mut err)
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("a.txt\nsubdir\n").count(), 2);
        assert_eq!(logged(&f.shell), vec!["ls", "ls", "exit"]);
    }

    #[test]
    fn invalid_utf8_argument_is_decoded_lossily() {
        let mut f = fixture();
        let mut out = Vec::new();
        let mut err = Vec::new();
        f.shell
            .run(&b"cd \xffdir\n"[..], &mut out, &mut err)
            .unwrap();

        let err = String::from_utf8(err).unwrap();
        assert!(err.starts_with("Directory does not exist: "));
        assert!(err.contains('\u{FFFD}'));
        assert_eq!(logged(&f.shell), vec!["cd \u{FFFD}dir", "exit"]);
    }

    #[test]
    fn log_failure_stops_the_loop() {
        let mut f = fixture();
        fs::write(f.shell.log.path(), "not xml").unwrap();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = f.shell.run("ls\n".as_bytes(), &mut out, &mut err);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("recording 'ls'"));
        assert!(message.contains("Corrupt action log"));
    }
}
