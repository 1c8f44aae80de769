//! Simulated occupant.
//!
//! While a house controller is connected, an occupant sits at the console
//! and flips the door, light, proximity and intruder flags by hand. It runs
//! alongside the connection task and shares the same [`House`].

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use tokio::task::JoinError;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::console::Console;
use crate::house::House;
use crate::house::Toggle;

const PROMPT: &str = "Enter a command: d=[toggle door], l=[toggle light], p=[toggle proximity], \
                      i=[toggle intruder], RET=[show current status]: ";

/// A console command understood by the occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Toggle(Toggle),
    ShowStatus,
}

impl UserCommand {
    /// Parse one console line. Unrecognized input yields None.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim_end_matches('\r') {
            "d" => Some(UserCommand::Toggle(Toggle::Door)),
            "l" => Some(UserCommand::Toggle(Toggle::Light)),
            "p" => Some(UserCommand::Toggle(Toggle::Proximity)),
            "i" => Some(UserCommand::Toggle(Toggle::Intruder)),
            "" => Some(UserCommand::ShowStatus),
            _ => None,
        }
    }
}

fn toggle_label(toggle: Toggle) -> &'static str {
    match toggle {
        Toggle::Door => "door",
        Toggle::Light => "light",
        Toggle::Proximity => "proximity",
        Toggle::Intruder => "intruder",
    }
}

/// The occupant loop bound to one house and one console.
pub struct UserActor {
    house: House,
    console: Box<dyn Console>,
    stop: Arc<AtomicBool>,
}

/// Control handle for a running [`UserActor`].
pub struct UserActorHandle {
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl UserActorHandle {
    /// Ask the occupant to leave.
    ///
    /// Takes effect the next time the occupant checks in, which may be
    /// after its pending console read returns. The read is not cancelled.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the occupant loop to exit.
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}

impl UserActor {
    /// Spawn the occupant on the current runtime.
    pub fn start(house: House, console: Box<dyn Console>) -> UserActorHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let actor = Self {
            house,
            console,
            stop: stop.clone(),
        };
        let task = tokio::spawn(actor.run());
        UserActorHandle { stop, task }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    async fn run(mut self) {
        debug!("Occupant started");

        while !self.stopped() {
            let status = format!("Current state: {}\n", self.house.snapshot());
            if let Err(e) = self.console.write(&status).await {
                warn!("Occupant failed to write to console: {}", e);
                break;
            }
            if let Err(e) = self.console.write(PROMPT).await {
                warn!("Occupant failed to write to console: {}", e);
                break;
            }

            let line = match self.console.read_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("Console input closed, occupant leaving");
                    break;
                }
                Err(e) => {
                    warn!("Occupant failed to read from console: {}", e);
                    break;
                }
            };

            if self.stopped() {
                debug!("Discarding console input after stop: {:?}", line);
                break;
            }

            if let Err(e) = self.handle_line(&line).await {
                warn!("Occupant failed to write to console: {}", e);
                break;
            }
        }

        debug!("Occupant stopped");
    }

    async fn handle_line(&mut self, line: &str) -> std::io::Result<()> {
        match UserCommand::parse(line) {
            Some(UserCommand::Toggle(toggle)) => {
                let on = self.house.toggle(toggle);
                info!("Occupant toggled {} to {}", toggle_label(toggle), on);
                let reply = format!(
                    "{} is now {}\n",
                    toggle_label(toggle),
                    if on { "1" } else { "0" }
                );
                self.console.write(&reply).await
            }
            Some(UserCommand::ShowStatus) => Ok(()),
            None => {
                debug!("Ignoring console input: {:?}", line);
                Ok(())
            }
        }
    }
}
