use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, SupportedStreamConfig};
use crossbeam_channel::{bounded, Sender};

use crate::error::BridgeError;

/// Real-time audio output for one session.
///
/// `cpal::Stream` is not `Send`, so the stream lives on a dedicated thread
/// for its whole lifetime. Dropping the `AudioOutput` signals that thread to
/// stop the stream and joins it.
pub struct AudioOutput {
    shutdown: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl AudioOutput {
    /// Picks the default output device and its default stream configuration.
    pub fn default_device() -> Result<(Device, SupportedStreamConfig), BridgeError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(BridgeError::NoOutputDevice)?;
        let config = device
            .default_output_config()
            .map_err(|err| BridgeError::AudioStream(err.to_string()))?;
        Ok((device, config))
    }

    /// Spawns the stream thread. `render` fills interleaved f32 frames at the
    /// configuration's channel count and sample rate; setup failures on the
    /// thread are reported back synchronously.
    pub fn spawn<F>(
        device: Device,
        config: SupportedStreamConfig,
        render: F,
    ) -> Result<Self, BridgeError>
    where
        F: FnMut(&mut [f32]) + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let (init_tx, init_rx) = bounded::<Result<(), BridgeError>>(1);

        let thread = thread::spawn(move || {
            let stream = match build_stream(&device, config, render) {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            if let Err(err) = stream.play() {
                let _ = init_tx.send(Err(BridgeError::AudioStream(err.to_string())));
                return;
            }
            let _ = init_tx.send(Ok(()));

            // Keeps the stream alive until the driver is dropped.
            let _ = shutdown_rx.recv();
        });

        match init_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                shutdown: shutdown_tx,
                thread: Some(thread),
            }),
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(_) => Err(BridgeError::AudioStream(
                "audio thread exited during setup".to_string(),
            )),
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn build_stream<F>(
    device: &Device,
    config: SupportedStreamConfig,
    render: F,
) -> Result<Stream, BridgeError>
where
    F: FnMut(&mut [f32]) + Send + 'static,
{
    match config.sample_format() {
        SampleFormat::F32 => build_typed::<f32, F>(device, &config.into(), render),
        SampleFormat::I16 => build_typed::<i16, F>(device, &config.into(), render),
        SampleFormat::U16 => build_typed::<u16, F>(device, &config.into(), render),
        format => Err(BridgeError::AudioStream(format!(
            "unsupported sample format {format:?}"
        ))),
    }
}

fn build_typed<T, F>(
    device: &Device,
    config: &cpal::StreamConfig,
    mut render: F,
) -> Result<Stream, BridgeError>
where
    T: SizedSample + FromSample<f32>,
    F: FnMut(&mut [f32]) + Send + 'static,
{
    let err_fn = |err| log::error!("audio stream error: {err}");
    let mut scratch: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len(), 0.0);
                render(&mut scratch);
                for (out, sample) in data.iter_mut().zip(scratch.drain(..)) {
                    *out = T::from_sample(sample);
                }
            },
            err_fn,
            None,
        )
        .map_err(|err| BridgeError::AudioStream(err.to_string()))
}
