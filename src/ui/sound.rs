/// Sound engine: procedural audio via rodio.
///
/// Two voices:
///   - an ambient loop that plays while a dialog is open, its volume set
///     every tick from the listener's distance to the talking object;
///   - one-shot blips (dialog opened, hotbar slot changed).
///
/// All buffers are generated as in-memory WAV at init. Build without the
/// "sound" feature to get the silent stub below.

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        master_volume: f32,
        ambient: Option<Sink>,
        tune: Arc<Vec<u8>>,
        sfx_open: Arc<Vec<u8>>,
        sfx_select: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new(master_volume: f32) -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(error = %e, "no audio output device, running silent");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                master_volume: master_volume.clamp(0.0, 1.0),
                ambient: None,
                tune: Arc::new(make_wav(&gen_ambient_tune())),
                sfx_open: Arc::new(make_wav(&gen_chime())),
                sfx_select: Arc::new(make_wav(&gen_blip(880.0, 0.03, 0.2))),
            })
        }

        fn decode(buf: &Arc<Vec<u8>>) -> Option<Decoder<Cursor<Vec<u8>>>> {
            Decoder::new(Cursor::new(buf.as_ref().clone())).ok()
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            if let Some(src) = Self::decode(buf) {
                sink.set_volume(self.master_volume);
                sink.append(src);
                sink.detach();
            }
        }

        /// Drive the ambient loop from an attenuation level in [0, 1].
        /// Zero stops the loop; the next non-zero level restarts it.
        pub fn set_ambient(&mut self, level: f32) {
            if level <= 0.0 {
                if let Some(sink) = self.ambient.take() {
                    sink.stop();
                }
                return;
            }

            if self.ambient.is_none() {
                let Ok(sink) = Sink::try_new(&self.handle) else { return };
                let Some(src) = Self::decode(&self.tune) else { return };
                sink.append(src.repeat_infinite());
                self.ambient = Some(sink);
            }
            if let Some(sink) = &self.ambient {
                sink.set_volume(self.master_volume * level.min(1.0));
            }
        }

        pub fn play_dialog_open(&self) { self.play(&self.sfx_open); }
        pub fn play_select(&self) { self.play(&self.sfx_select); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: mono f32 samples
    // ════════════════════════════════════════════════════════════

    fn tone(freq: f32, i: usize) -> f32 {
        (i as f32 / SAMPLE_RATE as f32 * freq * TAU).sin()
    }

    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| tone(freq, i) * (1.0 - i as f32 / n as f32) * volume)
            .collect()
    }

    /// Dialog open: two rising notes.
    fn gen_chime() -> Vec<f32> {
        let mut samples = gen_blip(659.0, 0.06, 0.3); // E5
        samples.extend(gen_blip(988.0, 0.10, 0.3)); // B5
        samples
    }

    /// Stomping bass line with an off-beat lead, two bars, loops seamlessly.
    pub(super) fn gen_ambient_tune() -> Vec<f32> {
        const BEAT: f32 = 0.25;
        let bass = [110.0_f32, 110.0, 146.8, 110.0, 98.0, 98.0, 130.8, 146.8];
        let lead = [440.0_f32, 523.3, 587.3, 659.3, 587.3, 523.3, 493.9, 440.0];

        let n = (SAMPLE_RATE as f32 * BEAT) as usize;
        let mut samples = Vec::with_capacity(n * bass.len());
        for (&b, &l) in bass.iter().zip(lead.iter()) {
            for i in 0..n {
                let t = i as f32 / n as f32;
                let kick = (1.0 - t).powi(4);
                // square-ish bass: sine + 3rd harmonic
                let low = tone(b, i) * 0.7 + tone(b * 3.0, i) * 0.2;
                let high = if t >= 0.5 { tone(l, i) * (1.0 - t) * 2.0 } else { 0.0 };
                samples.push((low * kick * 0.5 + high * 0.15).clamp(-1.0, 1.0));
            }
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit PCM mono
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let byte_rate = SAMPLE_RATE * CHANNELS as u32 * BITS as u32 / 8;
        let block_align = CHANNELS * BITS / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_master_volume: f32) -> Option<Self> { Some(SoundEngine) }
    pub fn set_ambient(&mut self, _level: f32) {}
    pub fn play_dialog_open(&self) {}
    pub fn play_select(&self) {}
}
