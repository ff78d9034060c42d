use super::{BuildError, BuildReport, BuildRequest};
use crate::source::SupportTool;
use std::ffi::OsString;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub const DEFAULT_RUNTIME: &str = "java";

/// Launches the external builder and streams its stdout
#[derive(Debug, Clone)]
pub struct BuildInvoker {
    program: String,
    leading_args: Vec<String>,
}

impl Default for BuildInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME)
    }
}

impl BuildInvoker {
    /// Builder run as `<runtime> -jar <cli.jar> ...`
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            program: runtime.into(),
            leading_args: vec!["-jar".to_string()],
        }
    }

    /// Arbitrary program with its own fixed leading arguments
    pub fn with_command(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Positional argument list handed to the program
    pub fn assemble_args(&self, request: &BuildRequest) -> Result<Vec<OsString>, BuildError> {
        let cli = request.support_tool(SupportTool::Cli.name())?;
        let patches = request.support_tool(SupportTool::Patches.name())?;
        let integrations = request.support_tool(SupportTool::Integrations.name())?;

        let mut args: Vec<OsString> = self.leading_args.iter().map(OsString::from).collect();
        args.push(cli.into());
        args.push("-a".into());
        args.push(request.base_binary_path.clone().into());
        args.push("-b".into());
        args.push(patches.into());
        args.push("-m".into());
        args.push(integrations.into());
        args.push("-o".into());
        args.push(request.output_path.clone().into());
        args.extend(request.selection.to_args().into_iter().map(OsString::from));

        Ok(args)
    }

    /// Runs the build, printing builder output to stdout as it arrives
    pub async fn run(&self, request: &BuildRequest) -> Result<BuildReport, BuildError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let printer = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                println!("{}", line);
            }
        });

        let result = self.run_streaming(request, tx).await;
        // Sender is gone once run_streaming returns, so the printer drains and exits.
        let _ = printer.await;
        result
    }

    /// Runs the build, forwarding each stdout line to `lines` in emission order
    pub async fn run_streaming(
        &self,
        request: &BuildRequest,
        lines: mpsc::UnboundedSender<String>,
    ) -> Result<BuildReport, BuildError> {
        let args = self.assemble_args(request)?;
        info!(
            app = %request.target,
            program = %self.program,
            "Sending request to builder"
        );
        debug!(?args, "Builder arguments");

        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BuildError::LaunchFailed {
                program: self.program.clone(),
                source,
            })?;

        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            // Builder output is not guaranteed to be UTF-8; only the exit status decides success.
            while reader.read_until(b'\n', &mut buf).await? > 0 {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
                // A dropped receiver only means nobody is watching the output.
                let _ = lines.send(line.to_string());
                buf.clear();
            }
        }
        drop(lines);

        let status = child.wait().await?;
        let elapsed = start.elapsed();

        if !status.success() {
            // Killed by a signal: no exit code to report.
            return Err(BuildError::NonZeroExit {
                code: status.code().unwrap_or(-1),
            });
        }

        info!(
            app = %request.target,
            elapsed_ms = elapsed.as_millis() as u64,
            "Patching completed"
        );
        Ok(BuildReport { elapsed })
    }
}
