//! Live microphone input analysed on a background thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::analysis::Analyzer;
use crate::error::{Error, Result};
use crate::input::{InputSignal, InputSource, SharedInput};
use crate::params::AnalyzerConfig;

/// Microphone capture feeding a [`SharedInput`] slot.
///
/// The cpal callback only appends mono samples; the analysis thread wakes
/// every `update_interval_ms`, analyses the newest window and publishes the
/// result. The frame loop reads whatever was published last.
pub struct MicrophoneInput {
    shared: SharedInput,

    /// Input stream (kept alive)
    _stream: cpal::Stream,

    running: Arc<AtomicBool>,
    analysis_thread: Option<thread::JoinHandle<()>>,
}

impl MicrophoneInput {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("No audio input device found".to_string()))?;
        let stream_config = device
            .default_input_config()
            .map_err(|e| Error::Audio(format!("Failed to get input config: {}", e)))?;

        let sample_rate = stream_config.sample_rate().0;
        let channels = stream_config.channels().max(1) as usize;
        log::info!(
            "Microphone: {} @ {}Hz",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate
        );

        let analyzer = Analyzer::new(AnalyzerConfig {
            sample_rate_hz: sample_rate as usize,
            ..config
        })?;

        let capture = Arc::new(Mutex::new(Vec::<f32>::new()));
        let capture_callback = Arc::clone(&capture);

        let stream = device
            .build_input_stream(
                &stream_config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mut buf = capture_callback.lock().unwrap_or_else(|p| p.into_inner());
                    buf.extend(
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
                    );
                },
                |err| log::error!("Audio input stream error: {}", err),
                None,
            )
            .map_err(|e| Error::Audio(format!("Failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::Audio(format!("Failed to start input stream: {}", e)))?;

        let shared = SharedInput::new();
        let running = Arc::new(AtomicBool::new(true));
        let analysis_thread = spawn_analysis_thread(
            analyzer,
            capture,
            shared.clone(),
            Arc::clone(&running),
        );

        Ok(Self {
            shared,
            _stream: stream,
            running,
            analysis_thread: Some(analysis_thread),
        })
    }

    /// Override the tracked pitch with a fixed value
    pub fn lock_pitch(&mut self, pitch: Option<f32>) {
        self.shared.lock_pitch = pitch;
    }
}

impl InputSource for MicrophoneInput {
    fn read(&mut self, now: f32) -> InputSignal {
        self.shared.read(now)
    }
}

impl Drop for MicrophoneInput {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.analysis_thread.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn the analysis thread
fn spawn_analysis_thread(
    mut analyzer: Analyzer,
    capture: Arc<Mutex<Vec<f32>>>,
    shared: SharedInput,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    let interval = Duration::from_millis(analyzer.config().update_interval_ms);
    let window = analyzer.window_size();

    thread::spawn(move || {
        let mut block = Vec::with_capacity(window);
        while running.load(Ordering::Relaxed) {
            thread::sleep(interval);

            {
                let mut buf = capture.lock().unwrap_or_else(|p| p.into_inner());
                if buf.len() > window {
                    let excess = buf.len() - window;
                    buf.drain(..excess);
                }
                block.clear();
                block.extend_from_slice(&buf);
            }

            shared.write(analyzer.analyze(&block));
        }
    })
}
