//! Off-thread simulation variant.
//!
//! A [`FieldWorker`] moves a [`Field`] onto its own thread. The thread owns
//! the field exclusively; the handle communicates only through one-way
//! messages (pointer position, theme), all idempotent latest-value-wins
//! updates, and receives finished [`Frame`]s back over a channel.
//!
//! Dropping the handle stops and joins the thread, so replacing a worker
//! can never leave a stale loop running: K restarts leave exactly one live
//! worker.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use glam::Vec2;

use crate::config::{FieldConfig, Theme};
use crate::error::WorkerError;
use crate::field::{Field, Frame};

static LIVE_WORKERS: AtomicUsize = AtomicUsize::new(0);

/// Number of worker loops currently running. Diagnostic; restart tests
/// assert this stays at one.
pub fn live_count() -> usize {
    LIVE_WORKERS.load(Ordering::SeqCst)
}

enum Msg {
    Pointer(Option<Vec2>),
    Theme(Theme),
    Stop,
}

pub struct FieldWorker {
    tx: Sender<Msg>,
    frames: Receiver<Frame>,
    handle: Option<JoinHandle<()>>,
}

impl FieldWorker {
    /// Validate the config, then spawn the simulation thread stepping at
    /// the given tick interval.
    pub fn spawn(config: FieldConfig, tick: Duration) -> Result<Self, WorkerError> {
        let field = Field::new(config)?;
        let (tx, rx) = mpsc::channel();
        // One slot: frames are dropped, not queued, when the consumer
        // stalls (e.g. a minimized window stops redrawing).
        let (frame_tx, frames) = mpsc::sync_channel(1);

        let handle = thread::Builder::new()
            .name("plexus-field".into())
            .spawn(move || run_loop(field, rx, frame_tx, tick))?;

        Ok(Self {
            tx,
            frames,
            handle: Some(handle),
        })
    }

    /// Latest pointer position in field coordinates; `None` when it left.
    pub fn set_pointer(&self, pointer: Option<Vec2>) {
        let _ = self.tx.send(Msg::Pointer(pointer));
    }

    pub fn set_theme(&self, theme: Theme) {
        let _ = self.tx.send(Msg::Theme(theme));
    }

    /// Drain the frame channel and keep only the newest frame.
    pub fn latest_frame(&self) -> Option<Frame> {
        self.frames.try_iter().last()
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.tx.send(Msg::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FieldWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(mut field: Field, rx: Receiver<Msg>, frame_tx: SyncSender<Frame>, tick: Duration) {
    LIVE_WORKERS.fetch_add(1, Ordering::SeqCst);
    let dt = tick.as_secs_f32();

    'outer: loop {
        // Latest-value-wins: drain everything queued since last tick.
        loop {
            match rx.try_recv() {
                Ok(Msg::Pointer(p)) => field.set_pointer(p),
                Ok(Msg::Theme(t)) => field.set_theme(t),
                Ok(Msg::Stop) | Err(TryRecvError::Disconnected) => break 'outer,
                Err(TryRecvError::Empty) => break,
            }
        }

        field.step(dt);
        match frame_tx.try_send(field.frame()) {
            // Slot still holds an unconsumed frame; skip this one.
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => {
                // Receiver gone: the handle was dropped mid-shutdown.
                break;
            }
        }

        thread::sleep(tick);
    }

    LIVE_WORKERS.fetch_sub(1, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // LIVE_WORKERS is process-global, so tests asserting on it cannot
    // overlap.
    static SERIAL: Mutex<()> = Mutex::new(());

    fn tick() -> Duration {
        Duration::from_millis(2)
    }

    fn config() -> FieldConfig {
        let mut cfg = FieldConfig::background(1440.0, 900.0);
        cfg.ramp = Duration::from_millis(20);
        cfg
    }

    #[test]
    fn test_worker_produces_frames() {
        let _guard = SERIAL.lock().unwrap();
        let worker = FieldWorker::spawn(config(), tick()).unwrap();
        let mut frame = None;
        for _ in 0..500 {
            if let Some(f) = worker.latest_frame() {
                if !f.points.is_empty() {
                    frame = Some(f);
                    break;
                }
            }
            thread::sleep(Duration::from_millis(2));
        }
        let frame = frame.expect("worker never produced a populated frame");
        assert!(!frame.points.is_empty());
        worker.stop();
    }

    #[test]
    fn test_frame_backlog_stays_bounded_without_consumer() {
        let _guard = SERIAL.lock().unwrap();
        let worker = FieldWorker::spawn(config(), tick()).unwrap();

        // Nobody draining frames: the worker keeps ticking but the
        // channel must never queue more than its single slot.
        thread::sleep(Duration::from_millis(300));
        assert!(worker.frames.try_iter().count() <= 1);

        // After the stall the consumer still gets a fresh frame.
        let mut resumed = None;
        for _ in 0..500 {
            if let Some(frame) = worker.latest_frame() {
                resumed = Some(frame);
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        assert!(resumed.is_some(), "no frame after backlog drain");
        worker.stop();
    }

    #[test]
    fn test_drop_joins_thread() {
        let _guard = SERIAL.lock().unwrap();
        let worker = FieldWorker::spawn(config(), tick()).unwrap();
        assert!(worker.is_running());
        drop(worker);
        // Drop joined synchronously, so the loop has fully exited.
        assert_eq!(live_count(), 0);
    }

    #[test]
    fn test_restart_leaves_exactly_one_worker() {
        let _guard = SERIAL.lock().unwrap();
        let mut slot: Option<FieldWorker> = None;
        for _ in 0..5 {
            // Replacing the slot drops (stops and joins) the previous
            // worker before the new one is observed.
            slot = Some(FieldWorker::spawn(config(), tick()).unwrap());
            assert!(live_count() <= 2);
        }
        let worker = slot.take().unwrap();
        thread::sleep(Duration::from_millis(10));
        assert!(worker.is_running());
        assert_eq!(live_count(), 1);
        worker.stop();
        assert_eq!(live_count(), 0);
    }
}
