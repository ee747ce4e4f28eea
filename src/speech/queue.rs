//! Serialized speech playback
//!
//! One worker thread owns the engine and speaks requests in arrival order,
//! so replies from rapid successive turns queue up instead of talking over
//! each other. Dropping the queue discards requests that have not started,
//! so at most the current utterance delays exit.

use crate::config::ResponseSettings;
use crate::speech::SpeechEngine;
use crate::{ChatError, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::thread;
use tracing::{debug, error, info, warn};

/// Requests waiting beyond this are dropped
pub const SPEECH_QUEUE_CAPACITY: usize = 8;

#[derive(Clone, Debug)]
pub enum SpeechCommand {
    Speak(String),
    Shutdown,
}

/// Handle to the speech worker
pub struct SpeechQueue {
    command_tx: Sender<SpeechCommand>,
    /// Second receiver, used only to discard waiting requests
    pending_rx: Receiver<SpeechCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl SpeechQueue {
    /// Start the worker with the default capacity
    pub fn spawn(engine: SpeechEngine, config: ResponseSettings) -> Result<Self> {
        Self::with_capacity(engine, config, SPEECH_QUEUE_CAPACITY)
    }

    pub fn with_capacity(
        mut engine: SpeechEngine,
        config: ResponseSettings,
        capacity: usize,
    ) -> Result<Self> {
        let (command_tx, command_rx) = bounded(capacity);
        let pending_rx = command_rx.clone();

        let worker = thread::Builder::new()
            .name("speech".to_string())
            .spawn(move || {
                info!("Speech worker started ({})", engine.driver_name());

                while let Ok(command) = command_rx.recv() {
                    match command {
                        SpeechCommand::Speak(text) => {
                            debug!("Speaking queued response ({} chars)", text.len());
                            if let Err(e) = engine.speak(&text, &config) {
                                error!("Speech failed: {}", e);
                            }
                        }
                        SpeechCommand::Shutdown => break,
                    }
                }

                info!("Speech worker stopped");
            })
            .map_err(|e| ChatError::Speech(format!("Failed to start speech worker: {}", e)))?;

        Ok(Self {
            command_tx,
            pending_rx,
            worker: Some(worker),
        })
    }

    /// Queue text for speaking without waiting for playback
    ///
    /// Returns false when the request was dropped.
    pub fn enqueue(&self, text: impl Into<String>) -> bool {
        match self.command_tx.try_send(SpeechCommand::Speak(text.into())) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Speech queue is full; dropping response audio");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Speech worker is gone; dropping response audio");
                false
            }
        }
    }

    /// Drop requests the worker has not picked up yet
    ///
    /// Returns how many were discarded.
    pub fn discard_pending(&self) -> usize {
        self.pending_rx
            .try_iter()
            .filter(|command| matches!(command, SpeechCommand::Speak(_)))
            .count()
    }

    /// Finish queued speech, then stop the worker
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            // Blocks behind queued requests so nothing already accepted is lost
            let _ = self.command_tx.send(SpeechCommand::Shutdown);
            if worker.join().is_err() {
                error!("Speech worker panicked");
            }
        }
    }
}

impl Drop for SpeechQueue {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let discarded = self.discard_pending();
            if discarded > 0 {
                info!("Discarded {} queued responses on exit", discarded);
            }
        }
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::engine::tests::FakeDriver;
    use crate::speech::Platform;
    use std::time::{Duration, Instant};

    #[test]
    fn test_requests_spoken_in_order() {
        let driver = FakeDriver::default();
        let engine = SpeechEngine::new(Box::new(driver.clone()), Platform::Other);
        let mut queue = SpeechQueue::spawn(engine, ResponseSettings::default()).unwrap();

        assert!(queue.enqueue("one"));
        assert!(queue.enqueue("two"));
        assert!(queue.enqueue("three"));
        queue.shutdown();

        assert_eq!(*driver.spoken.lock(), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_failure_does_not_stop_worker() {
        let driver = FakeDriver::default();
        *driver.fail_next.lock() = true;
        let engine = SpeechEngine::new(Box::new(driver.clone()), Platform::Other);
        let mut queue = SpeechQueue::spawn(engine, ResponseSettings::default()).unwrap();

        queue.enqueue("lost");
        queue.enqueue("heard");
        queue.shutdown();

        assert_eq!(*driver.spoken.lock(), vec!["heard"]);
        assert_eq!(*driver.ended.lock(), 1);
    }

    #[test]
    fn test_enqueue_after_shutdown_is_dropped() {
        let engine = SpeechEngine::new(Box::new(FakeDriver::default()), Platform::Other);
        let mut queue = SpeechQueue::spawn(engine, ResponseSettings::default()).unwrap();
        queue.shutdown();
        assert!(!queue.enqueue("too late"));
    }

    #[test]
    fn test_drop_discards_waiting_requests() {
        let driver = FakeDriver::default();
        *driver.pause.lock() = Duration::from_millis(200);
        let engine = SpeechEngine::new(Box::new(driver.clone()), Platform::Other);
        let queue = SpeechQueue::spawn(engine, ResponseSettings::default()).unwrap();

        for text in ["one", "two", "three", "four", "five"] {
            assert!(queue.enqueue(text));
        }
        let started = Instant::now();
        drop(queue);

        assert!(started.elapsed() < Duration::from_millis(600));
        assert!(driver.spoken.lock().len() <= 1);
    }

    #[test]
    fn test_discard_pending_counts_speak_requests() {
        let driver = FakeDriver::default();
        *driver.pause.lock() = Duration::from_millis(300);
        let engine = SpeechEngine::new(Box::new(driver.clone()), Platform::Other);
        let mut queue = SpeechQueue::spawn(engine, ResponseSettings::default()).unwrap();

        queue.enqueue("first");
        // Let the worker pick up the first request
        std::thread::sleep(Duration::from_millis(100));
        queue.enqueue("second");
        queue.enqueue("third");

        assert_eq!(queue.discard_pending(), 2);
        queue.shutdown();
        assert_eq!(*driver.spoken.lock(), vec!["first"]);
    }
}
