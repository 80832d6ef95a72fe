use crate::{
    CoreError, CoreResult, audio,
    audio::chunk::{AudioChunk, concat_chunks},
};

use std::{
    panic::Location,
    sync::{Arc, Mutex, mpsc},
    thread::JoinHandle,
    time::{Duration, Instant},
};

use cpal::{
    BufferSize, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// How long `start()` waits for the worker thread to open the device.
const START_TIMEOUT: Duration = Duration::from_secs(2);

/// How long `stop()` waits for the worker thread to exit before taking a
/// locked snapshot of the buffer instead.
const JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Abstraction over the audio capture worker so the recording controller
/// can be driven with a fake in tests.
pub trait CaptureBackend: Send {
    /// Spawn the capture worker. Fails with `CaptureBusy` if one is live.
    fn start(&mut self) -> CoreResult<()>;

    /// Stop the worker and return all captured samples in chunk order.
    /// Zero captured chunks yield `Ok(empty)`, never an error, so the
    /// caller can classify the recording as too short. Calling `stop`
    /// with no live worker also yields `Ok(empty)`.
    fn stop(&mut self) -> CoreResult<Vec<f32>>;
}

struct CaptureWorker {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
    chunks: Arc<Mutex<Vec<AudioChunk>>>,
}

/// Microphone capture backed by a dedicated worker thread.
///
/// The cpal stream lives entirely on the worker thread: it is opened after
/// `start()` spawns the thread and released on every exit path, including
/// device errors. The struct itself holds only channels and the shared
/// chunk buffer, so it is `Send` and can live inside the controller.
pub struct MicCapture {
    worker: Option<CaptureWorker>,
}

impl MicCapture {
    /// Create an idle capture backend. The input device is not touched
    /// until `start()`.
    pub fn new() -> Self {
        Self { worker: None }
    }
}

impl Default for MicCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for MicCapture {
    #[track_caller]
    #[instrument(skip(self))]
    fn start(&mut self) -> CoreResult<()> {
        if self.worker.is_some() {
            return Err(CoreError::CaptureBusy {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let chunks: Arc<Mutex<Vec<AudioChunk>>> = Arc::new(Mutex::new(Vec::new()));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::channel::<CoreResult<()>>();

        let thread_chunks = Arc::clone(&chunks);
        let handle = std::thread::spawn(move || {
            run_capture(&thread_chunks, &stop_rx, &ready_tx);
        });

        // Bounded handshake: the worker reports whether the device opened.
        match ready_rx.recv_timeout(START_TIMEOUT) {
            Ok(Ok(())) => {
                self.worker = Some(CaptureWorker {
                    stop_tx,
                    handle,
                    chunks,
                });
                info!("Audio capture started");
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                // Worker never reported; tell it to stop and abandon it.
                let _ = stop_tx.send(());
                Err(CoreError::CaptureThread {
                    reason: "Capture worker did not become ready in time".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    #[instrument(skip(self))]
    fn stop(&mut self) -> CoreResult<Vec<f32>> {
        let Some(worker) = self.worker.take() else {
            debug!("Stop requested with no live capture worker");
            return Ok(Vec::new());
        };

        let _ = worker.stop_tx.send(());

        // Bounded join. The worker only blocks on the stop channel, so it
        // exits promptly; if it somehow does not, take a locked snapshot
        // of the buffer rather than hanging the controller.
        let deadline = Instant::now() + JOIN_TIMEOUT;
        while !worker.handle.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        if worker.handle.is_finished() {
            if worker.handle.join().is_err() {
                warn!("Capture worker panicked; salvaging buffered samples");
            }
        } else {
            warn!("Capture worker did not exit within join timeout");
        }

        let chunks = {
            let mut guard = worker.chunks.lock().unwrap_or_else(|e| {
                error!("Chunk buffer lock poisoned, recovering: {}", e);
                e.into_inner()
            });
            std::mem::take(&mut *guard)
        };

        let samples = concat_chunks(&chunks);
        info!(
            chunk_count = chunks.len(),
            sample_count = samples.len(),
            "Audio capture stopped"
        );

        Ok(samples)
    }
}

impl Drop for MicCapture {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.handle.join();
        }
    }
}

/// Worker thread body: open the input device, append one chunk per device
/// callback, and hold the stream until a stop signal arrives. The stream
/// is dropped before the thread exits on every path.
fn run_capture(
    chunks: &Arc<Mutex<Vec<AudioChunk>>>,
    stop_rx: &mpsc::Receiver<()>,
    ready_tx: &mpsc::Sender<CoreResult<()>>,
) {
    let stream = match open_input_stream(chunks) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if ready_tx.send(Ok(())).is_err() {
        // start() gave up on us; release the device immediately.
        drop(stream);
        return;
    }

    // Blocks until stop() signals or the MicCapture was dropped.
    let _ = stop_rx.recv();
    drop(stream);
    debug!("Capture worker released device and exited");
}

#[track_caller]
fn open_input_stream(chunks: &Arc<Mutex<Vec<AudioChunk>>>) -> CoreResult<cpal::Stream> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or(CoreError::NoMicrophoneFound {
            location: ErrorLocation::from(Location::caller()),
        })?;

    debug!(device_name = ?device.name().ok(), "Opening input device");

    let config = StreamConfig {
        channels: audio::CHANNELS,
        sample_rate: audio::SAMPLE_RATE,
        buffer_size: BufferSize::Default,
    };

    let callback_chunks = Arc::clone(chunks);
    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Recover from lock poison rather than dropping audio. A
                // poisoned mutex means a previous holder panicked, but the
                // chunk list itself is still valid.
                let mut buf = callback_chunks.lock().unwrap_or_else(|e| {
                    error!("Chunk buffer lock poisoned, recovering: {}", e);
                    e.into_inner()
                });
                buf.push(AudioChunk::new(data.to_vec()));
            },
            |err| {
                // Device errors mid-capture are logged; capture continues.
                error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to build stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    stream.play().map_err(|e| CoreError::DeviceError {
        reason: format!("Failed to start stream: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(stream)
}
