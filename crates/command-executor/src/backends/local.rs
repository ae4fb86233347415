//! Local process execution backend

use async_process::Child;
use async_trait::async_trait;
use futures::stream::Stream;
use futures_lite::io::AsyncRead;
use std::io::PipeReader;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::event::{ProcessEvent, ProcessEventType};
use crate::launcher::Launcher;
use crate::process::{ExitStatus, ProcessHandle};

const READ_CHUNK: usize = 8 * 1024;

#[cfg(unix)]
type OutputPipe = async_io::Async<std::fs::File>;

#[cfg(not(unix))]
type OutputPipe = async_fs::File;

#[cfg(unix)]
fn output_pipe(reader: PipeReader) -> std::io::Result<OutputPipe> {
    use std::os::fd::OwnedFd;

    async_io::Async::new(std::fs::File::from(OwnedFd::from(reader)))
}

#[cfg(not(unix))]
fn output_pipe(reader: PipeReader) -> std::io::Result<OutputPipe> {
    use std::os::windows::io::OwnedHandle;

    Ok(async_fs::File::from(std::fs::File::from(OwnedHandle::from(reader))))
}

/// Launcher for executing processes locally
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalLauncher;

/// A handle to control a local process; dropping it kills the process
pub struct LocalProcessHandle {
    child: Child,
}

/// Stream of process events read from the pipe shared by stdout and stderr
pub struct MergedOutputStream {
    output: Option<OutputPipe>,
    buf: Vec<u8>,
    started_sent: bool,
    child_id: u32,
}

#[async_trait]
impl Launcher for LocalLauncher {
    type EventStream = MergedOutputStream;
    type Handle = LocalProcessHandle;

    async fn launch(&self, command: Command) -> Result<(Self::EventStream, Self::Handle)> {
        let spawn_error = |e: std::io::Error| {
            Error::spawn_failed(format!(
                "{}: {}",
                command.get_program().to_string_lossy(),
                e
            ))
        };

        let (mut async_cmd, reader) = command.prepare().map_err(spawn_error)?;
        let child = async_cmd.spawn().map_err(spawn_error)?;
        // Closes the parent's write ends; EOF then follows the child's exit
        drop(async_cmd);

        let child_id = child.id();
        debug!("Launched `{}` as pid {}", command.display(), child_id);

        let handle = LocalProcessHandle { child };
        let events = MergedOutputStream {
            output: Some(output_pipe(reader).map_err(spawn_error)?),
            buf: vec![0; READ_CHUNK],
            started_sent: false,
            child_id,
        };

        Ok((events, handle))
    }
}

impl LocalProcessHandle {
    #[cfg(unix)]
    fn send_signal(&self, signal: nix::sys::signal::Signal) -> Result<()> {
        use nix::sys::signal;
        use nix::unistd::Pid;

        let pid = Pid::from_raw(self.child.id() as i32);
        signal::kill(pid, signal).map_err(|e| Error::signal_failed(signal as i32, e.to_string()))
    }
}

#[async_trait]
impl ProcessHandle for LocalProcessHandle {
    fn pid(&self) -> Option<u32> {
        Some(self.child.id())
    }

    async fn wait(&mut self) -> Result<ExitStatus> {
        let pid = self.child.id();
        let status = self.child.status().await.map_err(|e| Error::WaitFailed {
            pid,
            reason: e.to_string(),
        })?;

        Ok(ExitStatus {
            code: status.code(),
            #[cfg(unix)]
            signal: {
                use std::os::unix::process::ExitStatusExt;
                status.signal()
            },
        })
    }

    async fn kill(&mut self) -> Result<()> {
        #[cfg(unix)]
        {
            self.send_signal(nix::sys::signal::Signal::SIGKILL)
        }

        #[cfg(not(unix))]
        {
            self.child
                .kill()
                .map_err(|e| Error::signal_failed(-1, e.to_string()))
        }
    }
}

impl Drop for LocalProcessHandle {
    fn drop(&mut self) {
        // Synchronous kill; a process that already exited makes this a no-op
        let _ = self.child.kill();
    }
}

impl Stream for MergedOutputStream {
    type Item = ProcessEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if !this.started_sent {
            this.started_sent = true;
            let event = ProcessEvent::new(ProcessEventType::Started { pid: this.child_id });
            return Poll::Ready(Some(event));
        }

        let Some(reader) = this.output.as_mut() else {
            return Poll::Ready(None);
        };

        match Pin::new(reader).poll_read(cx, &mut this.buf) {
            Poll::Ready(Ok(0)) => {
                this.output = None;
                Poll::Ready(None)
            }
            Poll::Ready(Ok(n)) => Poll::Ready(Some(ProcessEvent::output(this.buf[..n].to_vec()))),
            Poll::Ready(Err(e)) if e.kind() == std::io::ErrorKind::Interrupted => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Poll::Ready(Err(e)) => {
                debug!("Output pipe of pid {} failed: {}", this.child_id, e);
                this.output = None;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
