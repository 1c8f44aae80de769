use std::io;
use std::io::BufRead;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::warn;

/// Line-oriented console the simulated occupant talks through
///
/// This trait allows the occupant to be driven by a scripted console in tests
#[async_trait]
pub trait Console: Send {
    /// Wait for the next line of input, without its line ending
    ///
    /// Returns None once input is exhausted
    async fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Write text as-is, flushing so prompts show before a read
    async fn write(&mut self, text: &str) -> io::Result<()>;
}

/// Factory producing a fresh console for every occupant session
pub type ConsoleFactory = Arc<dyn Fn() -> Box<dyn Console> + Send + Sync>;

/// Console backed by the process's stdin and stdout
///
/// Stdin is read on a dedicated OS thread which forwards lines over a
/// channel. All clones share that one receiver, so a line goes to
/// whichever session is waiting first: a stopped session still blocked on
/// input takes the next line before a newer session sees anything.
#[derive(Clone)]
pub struct Terminal {
    lines: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
}

impl Terminal {
    /// Start the stdin reader thread
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Failed to read from stdin: {}", e);
                            break;
                        }
                    }
                }
                debug!("stdin reader finished");
            })?;

        Ok(Self {
            lines: Arc::new(Mutex::new(rx)),
        })
    }

    /// A factory handing every session a clone of this terminal
    pub fn factory(&self) -> ConsoleFactory {
        let terminal = self.clone();
        Arc::new(move || Box::new(terminal.clone()) as Box<dyn Console>)
    }
}

#[async_trait]
impl Console for Terminal {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut lines = self.lines.lock().await;
        Ok(lines.recv().await)
    }

    async fn write(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await?;
        stdout.flush().await
    }
}

/// Scripted console for testing
///
/// Lines are fed through the paired sender; dropping it ends input.
#[cfg(test)]
pub struct MockConsole {
    pub input: mpsc::UnboundedReceiver<String>,
    pub output: Arc<std::sync::Mutex<String>>,
    /// Held by idle consoles so input never ends
    _idle_tx: Option<mpsc::UnboundedSender<String>>,
}

#[cfg(test)]
impl MockConsole {
    pub fn new() -> (Self, mpsc::UnboundedSender<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let console = Self {
            input: rx,
            output: Arc::new(std::sync::Mutex::new(String::new())),
            _idle_tx: None,
        };
        (console, tx)
    }

    /// A console that never produces input
    pub fn idle() -> Self {
        let (mut console, tx) = Self::new();
        console._idle_tx = Some(tx);
        console
    }

    pub fn idle_factory() -> ConsoleFactory {
        Arc::new(|| Box::new(MockConsole::idle()) as Box<dyn Console>)
    }
}

#[cfg(test)]
#[async_trait]
impl Console for MockConsole {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.recv().await)
    }

    async fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.lock().unwrap().push_str(text);
        Ok(())
    }
}
