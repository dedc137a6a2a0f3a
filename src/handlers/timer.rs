//! Background periodic flush

use super::buffer::FlushEngine;
use crate::core::{Result, SinkError};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const TIMER_THREAD_NAME: &str = "logtail-flush";

/// Thread that flushes an engine every `interval` until stopped
///
/// The thread waits on a stop channel with a timeout, so stopping it does
/// not have to wait out the remainder of an interval.
#[derive(Debug)]
pub struct FlushTimer {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl FlushTimer {
    pub fn start(engine: Arc<FlushEngine>, interval: Duration) -> Result<Self> {
        let (stop, stop_signal) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name(TIMER_THREAD_NAME.to_string())
            .spawn(move || loop {
                match stop_signal.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if let Err(err) = engine.flush() {
                            log::error!(
                                target: "logtail_sink",
                                "periodic flush failed: {}",
                                err
                            );
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|err| SinkError::io("spawn flush timer thread", err))?;

        log::debug!(
            target: "logtail_sink",
            "flush timer started with a {:?} interval",
            interval
        );

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Signal the thread and wait for it; safe to call more than once
    pub fn stop(&mut self) {
        // Disconnecting the channel wakes the thread
        drop(self.stop.take());

        if let Some(handle) = self.handle.take() {
            // A failure callback on the timer thread may release the last
            // handler reference, which stops the timer from its own thread
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                log::error!(target: "logtail_sink", "flush timer thread panicked");
            }
        }
    }
}

impl Drop for FlushTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
