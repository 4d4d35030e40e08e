//! Invocation of the external command-line tools

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ExternalToolError {
    #[error("`{program}` was not found on PATH")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to launch `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write output of `{program}` to {}", .path.display())]
    Redirect {
        program: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// A fully specified command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    /// File that receives the tool's stdout, if it should not go to the terminal.
    pub stdout: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Append `flag` only when `enabled`.
    pub fn flag_if(self, enabled: bool, flag: &str) -> Self {
        if enabled { self.arg(flag) } else { self }
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    /// Arguments as displayable strings. Non-UTF-8 bytes are replaced.
    pub fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Whether `arg` appears verbatim.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// The value following `flag`, if present.
    pub fn value_of(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.display_args() {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        if let Some(path) = &self.stdout {
            write!(f, " > {}", path.display())?;
        }
        Ok(())
    }
}

/// Executes invocations on behalf of the pipeline.
pub trait ToolRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), ExternalToolError>;

    /// Make sure `program` can be started before any work begins.
    fn ensure_available(&self, program: &str) -> Result<PathBuf, ExternalToolError> {
        which::which(program).map_err(|source| ExternalToolError::NotFound {
            program: program.to_string(),
            source,
        })
    }
}

/// Runs tools as child processes and waits for each to finish.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), ExternalToolError> {
        info!("{invocation}");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(path) = &invocation.stdout {
            command.stdout(Stdio::from(create_redirect(invocation, path)?));
        }

        let status = command.status().map_err(|source| ExternalToolError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;
        debug!("`{}` finished with {status}", invocation.program);

        if status.success() {
            Ok(())
        } else {
            Err(ExternalToolError::Failed {
                program: invocation.program.clone(),
                status,
            })
        }
    }
}

fn create_redirect(invocation: &Invocation, path: &Path) -> Result<File, ExternalToolError> {
    File::create(path).map_err(|source| ExternalToolError::Redirect {
        program: invocation.program.clone(),
        path: path.to_path_buf(),
        source,
    })
}

/// Print install hints for the tools this pipeline depends on.
pub fn print_install_hint(role: &str, program: &str) {
    eprintln!("\n`{program}` ({role}) is not installed or not on PATH.");
    match role {
        "basecaller" => {
            eprintln!("  Guppy is distributed through the Oxford Nanopore community site.");
            eprintln!("  Install the GPU build and make sure guppy_basecaller is on PATH.");
        }
        "demultiplexer" => {
            eprintln!("  pip install qcat");
        }
        "compressor" => {
            #[cfg(target_os = "linux")]
            eprintln!("  sudo apt-get install gzip pigz");
            #[cfg(target_os = "macos")]
            eprintln!("  brew install pigz");
        }
        "archiver" => {
            #[cfg(target_os = "linux")]
            {
                eprintln!("  # Ubuntu/Debian:");
                eprintln!("  sudo apt-get install p7zip-full");
                eprintln!("\n  # Fedora/RHEL:");
                eprintln!("  sudo dnf install p7zip p7zip-plugins");
            }
            #[cfg(target_os = "macos")]
            eprintln!("  brew install p7zip");
        }
        _ => {}
    }
    eprintln!("  Or point the pipeline config at the program's full path.");
}
