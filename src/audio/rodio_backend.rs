//! rodio-based audio backend.
//!
//! `rodio::OutputStream` is not `Send`, so a dedicated audio thread owns the
//! stream and every sink; [`RodioBackend`] talks to it over a channel.
//! Decoding happens on the caller's thread and produces f32 PCM; `play`
//! waits for the audio thread to confirm the sink was created.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::backend::{AudioBackend, AudioError, DecodedSound, PlaybackHandle};

enum AudioCmd {
    Play {
        sound: DecodedSound,
        volume: f32,
        handle: PlaybackHandle,
        reply: Sender<Result<PlaybackHandle, AudioError>>,
    },
    StopAll,
    Shutdown,
}

pub struct RodioBackend {
    commands: Sender<AudioCmd>,
    next_handle: AtomicU64,
    thread: Option<JoinHandle<()>>,
}

impl RodioBackend {
    /// Open the default output device on a new audio thread.
    pub fn start() -> Result<Self, AudioError> {
        let (commands, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("chat-sfx-audio".into())
            .spawn(move || audio_thread_main(rx, ready_tx))
            .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| AudioError::DeviceUnavailable("audio thread exited".into()))??;

        log::info!("audio: rodio output stream opened");
        Ok(Self {
            commands,
            next_handle: AtomicU64::new(1),
            thread: Some(thread),
        })
    }

    /// Stop every sound that is still playing.
    pub fn stop_all(&self) {
        let _ = self.commands.send(AudioCmd::StopAll);
    }
}

impl AudioBackend for RodioBackend {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedSound, AudioError> {
        let decoder = Decoder::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<f32> = decoder.convert_samples::<f32>().collect();
        Ok(DecodedSound::new(channels, sample_rate, samples))
    }

    fn play(&self, sound: &DecodedSound, volume: f32) -> Result<PlaybackHandle, AudioError> {
        let handle = PlaybackHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let (reply, response) = mpsc::channel();

        self.commands
            .send(AudioCmd::Play {
                sound: sound.clone(),
                volume,
                handle,
                reply,
            })
            .map_err(|_| AudioError::Playback("audio thread is gone".into()))?;

        response
            .recv()
            .map_err(|_| AudioError::Playback("audio thread is gone".into()))?
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        let _ = self.commands.send(AudioCmd::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn audio_thread_main(rx: Receiver<AudioCmd>, ready: Sender<Result<(), AudioError>>) {
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(s) => s,
        Err(e) => {
            let _ = ready.send(Err(AudioError::DeviceUnavailable(e.to_string())));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    let mut sinks: HashMap<PlaybackHandle, Sink> = HashMap::new();

    while let Ok(cmd) = rx.recv() {
        // Finished sinks are dropped lazily.
        sinks.retain(|_, sink| !sink.empty());

        match cmd {
            AudioCmd::Play {
                sound,
                volume,
                handle,
                reply,
            } => {
                let result = Sink::try_new(&stream_handle)
                    .map_err(|e| AudioError::Playback(e.to_string()))
                    .map(|sink| {
                        sink.set_volume(volume.clamp(0.0, 1.0));
                        sink.append(SamplesBuffer::new(
                            sound.channels,
                            sound.sample_rate,
                            sound.samples.to_vec(),
                        ));
                        sinks.insert(handle, sink);
                        handle
                    });
                let _ = reply.send(result);
            }
            AudioCmd::StopAll => {
                for (_, sink) in sinks.drain() {
                    sink.stop();
                }
            }
            AudioCmd::Shutdown => break,
        }
    }

    for (_, sink) in sinks.drain() {
        sink.stop();
    }
    log::debug!("audio: rodio thread exited");
}
