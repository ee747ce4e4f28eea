//! Chat worker
//!
//! Runs the session on its own thread so the UI never waits on the model.
//! The UI sends commands and polls events.

use crate::integration::ChatSession;
use crate::{ChatError, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

/// Commands that can be sent to the orchestrator
#[derive(Debug, Clone)]
pub enum OrchestratorCommand {
    /// Answer a user message
    Submit(String),

    /// Stop the worker
    Shutdown,
}

/// Events emitted by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorEvent {
    /// A message was accepted and sent to the model
    TurnStarted(String),

    /// The displayed response grew
    Partial(String),

    /// The whole response has been revealed
    Complete { response: String, total_ms: u64 },

    /// The turn failed
    Error {
        /// Friendly text for the UI
        message: String,
        /// Full error for logs and details
        detail: String,
    },

    /// Orchestrator has shut down
    Shutdown,
}

/// Handle for controlling the orchestrator from the UI
#[derive(Clone)]
pub struct OrchestratorHandle {
    command_tx: Sender<OrchestratorCommand>,
    event_rx: Receiver<OrchestratorEvent>,
}

impl OrchestratorHandle {
    /// Build a handle from raw channel ends
    pub fn from_channels(
        command_tx: Sender<OrchestratorCommand>,
        event_rx: Receiver<OrchestratorEvent>,
    ) -> Self {
        Self {
            command_tx,
            event_rx,
        }
    }

    /// Send a command to the orchestrator
    pub fn send_command(&self, cmd: OrchestratorCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| ChatError::Channel(format!("Failed to send command: {}", e)))
    }

    pub fn submit(&self, message: impl Into<String>) -> Result<()> {
        self.send_command(OrchestratorCommand::Submit(message.into()))
    }

    /// Try to receive an event from the orchestrator
    pub fn try_recv_event(&self) -> Option<OrchestratorEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Block until the next event arrives
    pub fn recv_event(&self) -> Option<OrchestratorEvent> {
        self.event_rx.recv().ok()
    }
}

/// Owns the session and the runtime its model client was built on
pub struct Orchestrator {
    session: ChatSession,
    runtime: Runtime,
    command_rx: Receiver<OrchestratorCommand>,
    event_tx: Sender<OrchestratorEvent>,
}

impl Orchestrator {
    pub fn new(session: ChatSession, runtime: Runtime) -> (Self, OrchestratorHandle) {
        let (command_tx, command_rx) = bounded(100);
        // Partial events arrive once per character
        let (event_tx, event_rx) = unbounded();

        let orchestrator = Self {
            session,
            runtime,
            command_rx,
            event_tx,
        };
        (orchestrator, OrchestratorHandle::from_channels(command_tx, event_rx))
    }

    /// Start the worker thread
    ///
    /// This consumes the orchestrator; turns are handled one at a time in
    /// arrival order.
    pub fn start(self) -> Result<JoinHandle<()>> {
        let Orchestrator {
            mut session,
            runtime,
            command_rx,
            event_tx,
        } = self;

        thread::Builder::new()
            .name("chat".to_string())
            .spawn(move || {
                info!("Orchestrator started");

                loop {
                    match command_rx.recv() {
                        Ok(OrchestratorCommand::Submit(message)) => {
                            if message.trim().is_empty() {
                                debug!("Ignoring empty message");
                                continue;
                            }

                            let _ = event_tx.send(OrchestratorEvent::TurnStarted(message.clone()));
                            let started = Instant::now();

                            // A failed send means the UI has closed
                            let result = runtime.block_on(session.handle_turn(&message, |prefix| {
                                event_tx
                                    .send(OrchestratorEvent::Partial(prefix.to_string()))
                                    .is_ok()
                            }));

                            let event = match result {
                                Ok(response) => OrchestratorEvent::Complete {
                                    response,
                                    total_ms: started.elapsed().as_millis() as u64,
                                },
                                Err(e) => {
                                    error!("Turn failed: {}", e);
                                    OrchestratorEvent::Error {
                                        message: e.user_message(),
                                        detail: e.to_string(),
                                    }
                                }
                            };
                            let _ = event_tx.send(event);
                        }

                        Ok(OrchestratorCommand::Shutdown) => {
                            info!("Orchestrator shutdown requested");
                            break;
                        }

                        Err(e) => {
                            warn!("Command channel closed: {}", e);
                            break;
                        }
                    }
                }

                let _ = event_tx.send(OrchestratorEvent::Shutdown);
                info!("Orchestrator stopped");
            })
            .map_err(|e| ChatError::Channel(format!("Failed to start chat worker: {}", e)))
    }
}
