use crate::core::protocol::parse_response;
use crate::core::session::GtpSession;
use crate::domain::model::Response;
use crate::domain::ports::{GoPlayer, GtpClient};
use crate::utils::error::{GtpError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

const QUIT_GRACE: Duration = Duration::from_secs(5);

/// A GTP program running as a child process, driven over its stdin/stdout.
pub struct GtpProcess {
    label: String,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    timeout: Option<Duration>,
    /// 逾時後管線裡可能還留著舊回應，程式不再可用
    dead: bool,
}

impl GtpProcess {
    /// Starts `command_line` through `sh -c`, the way the match scripts
    /// invoke their programs. stderr is inherited.
    pub fn spawn(label: &str, command_line: &str, timeout: Option<Duration>) -> Result<Self> {
        let process_error = |message: String| GtpError::Process {
            command: command_line.to_string(),
            message,
        };

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| process_error(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| process_error("stdin is not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| process_error("stdout is not piped".to_string()))?;

        tracing::debug!("Started {} (pid {:?}): {}", label, child.id(), command_line);

        Ok(Self {
            label: label.to_string(),
            child,
            stdin,
            stdout: BufReader::new(stdout),
            timeout,
            dead: false,
        })
    }

    fn exited(&self) -> GtpError {
        GtpError::EngineExited {
            engine: self.label.clone(),
        }
    }

    async fn exchange(&mut self, command: &str) -> Result<Response> {
        let line = format!("{}\n", command.trim_end());
        if self.stdin.write_all(line.as_bytes()).await.is_err() || self.stdin.flush().await.is_err() {
            return Err(self.exited());
        }

        let mut lines: Vec<String> = Vec::new();
        let mut buffer = String::new();
        loop {
            buffer.clear();
            if self.stdout.read_line(&mut buffer).await? == 0 {
                return Err(self.exited());
            }
            let content = buffer.trim_end_matches(['\r', '\n']);
            if content.trim().is_empty() {
                // 回應開始前的空行直接略過
                if lines.is_empty() {
                    continue;
                }
                break;
            }
            lines.push(content.to_string());
        }

        tracing::debug!("{} <- '{}' -> {:?}", self.label, command, lines);
        parse_response(&lines)
    }
}

#[async_trait]
impl GtpClient for GtpProcess {
    fn label(&self) -> &str {
        &self.label
    }

    async fn send(&mut self, command: &str) -> Result<Response> {
        if self.dead {
            return Err(self.exited());
        }
        let Some(limit) = self.timeout else {
            return self.exchange(command).await;
        };
        match tokio::time::timeout(limit, self.exchange(command)).await {
            Ok(result) => result,
            Err(_) => {
                self.dead = true;
                if let Err(e) = self.child.start_kill() {
                    tracing::debug!("Killing {} failed: {}", self.label, e);
                }
                Err(GtpError::EngineTimeout {
                    engine: self.label.clone(),
                    command: command.to_string(),
                    timeout: limit,
                })
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if !self.dead {
            if let Err(e) = self.send("quit").await {
                tracing::debug!("{} did not acknowledge quit: {}", self.label, e);
            }
        }
        match tokio::time::timeout(QUIT_GRACE, self.child.wait()).await {
            Ok(status) => {
                tracing::debug!("{} exited with {}", self.label, status?);
            }
            Err(_) => {
                tracing::warn!("{} still running after quit, killing it", self.label);
                self.child.kill().await?;
            }
        }
        Ok(())
    }

    fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

/// An in-process engine behind the client interface.
pub struct LocalClient<P: GoPlayer> {
    label: String,
    session: GtpSession<P>,
}

impl<P: GoPlayer> LocalClient<P> {
    pub fn new(label: &str, session: GtpSession<P>) -> Self {
        Self {
            label: label.to_string(),
            session,
        }
    }

    pub fn session(&self) -> &GtpSession<P> {
        &self.session
    }
}

#[async_trait]
impl<P: GoPlayer> GtpClient for LocalClient<P> {
    fn label(&self) -> &str {
        &self.label
    }

    async fn send(&mut self, command: &str) -> Result<Response> {
        if self.session.quit_requested() {
            return Err(GtpError::EngineExited {
                engine: self.label.clone(),
            });
        }
        self.session
            .handle_line(command)
            .ok_or_else(|| GtpError::Protocol {
                message: format!("nothing to execute in '{}'", command),
            })
    }

    async fn close(&mut self) -> Result<()> {
        if !self.session.quit_requested() {
            self.send("quit").await?;
        }
        Ok(())
    }
}
