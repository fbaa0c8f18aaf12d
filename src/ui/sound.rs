/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// One effect per puzzle beat: node selected, wire placed, board reset,
/// round won. All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_select: Arc<Vec<u8>>,
        sfx_connect: Arc<Vec<u8>>,
        sfx_reset: Arc<Vec<u8>>,
        sfx_won: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_select: Arc::new(make_wav(&gen_blip(880.0, 0.04, 0.2))),
                sfx_connect: Arc::new(make_wav(&gen_connect())),
                sfx_reset: Arc::new(make_wav(&gen_reset())),
                sfx_won: Arc::new(make_wav(&gen_won())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_select(&self) { self.play(&self.sfx_select); }
        pub fn play_connect(&self) { self.play(&self.sfx_connect); }
        pub fn play_reset(&self) { self.play(&self.sfx_reset); }
        pub fn play_won(&self) { self.play(&self.sfx_won); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Simple sine blip at given frequency and duration
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32); // linear fade out
                (t * freq * 2.0 * std::f32::consts::PI).sin() * env * volume
            })
            .collect()
    }

    /// Wire placed: a sawtooth chirp sliding up an octave, then a tick as
    /// the plug seats
    fn gen_connect() -> Vec<f32> {
        let chirp = (SAMPLE_RATE as f32 * 0.05) as usize;
        let mut phase = 0.0_f32;
        let mut samples: Vec<f32> = (0..chirp)
            .map(|i| {
                let p = i as f32 / chirp as f32;
                phase = (phase + (700.0 + p * 700.0) / SAMPLE_RATE as f32).fract();
                let saw = phase * 2.0 - 1.0;
                saw * (1.0 - p * 0.5) * 0.2
            })
            .collect();
        samples.extend(gen_blip(2093.0, 0.015, 0.3)); // C7 tick
        samples
    }

    /// Reset: two relay clicks dropping a fifth, like breakers tripping
    fn gen_reset() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[330.0_f32, 220.0] {
            let n = (SAMPLE_RATE as f32 * 0.045) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let phase = (t * freq).fract();
                let square = if phase < 0.5 { 1.0 } else { -1.0 };
                let env = (-(i as f32) / (n as f32 * 0.25)).exp();
                samples.push(square * env * 0.18);
            }
            // silence between clicks
            samples.extend(std::iter::repeat(0.0).take((SAMPLE_RATE as f32 * 0.03) as usize));
        }
        samples
    }

    /// Round won: the circuit powers up. A hum swells under a rising pitch,
    /// then an A-major chord rings out.
    fn gen_won() -> Vec<f32> {
        let tau = 2.0 * std::f32::consts::PI;
        let mut samples = Vec::new();

        let swell = (SAMPLE_RATE as f32 * 0.3) as usize;
        let mut phase = 0.0_f32;
        for i in 0..swell {
            let p = i as f32 / swell as f32;
            let freq = 110.0 + p * p * 330.0; // 110Hz → 440Hz
            phase += freq / SAMPLE_RATE as f32;
            let hum = (phase * tau).sin() * 0.5 + (phase * 2.0 * tau).sin() * 0.2;
            samples.push(hum * p * 0.3);
        }

        let chord = [440.0_f32, 554.4, 659.3];
        let ring = (SAMPLE_RATE as f32 * 0.45) as usize;
        for i in 0..ring {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = (1.0 - i as f32 / ring as f32).powi(2);
            let tremolo = 0.85 + 0.15 * (t * 12.0 * tau).sin();
            let sum: f32 = chord.iter().map(|&f| (t * f * tau).sin()).sum();
            samples.push(sum / chord.len() as f32 * env * tremolo * 0.35);
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    /// Encode mono f32 samples as a 16-bit PCM WAV file.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let data_len = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_len as usize);
        let mut put = |bytes: &[u8]| buf.extend_from_slice(bytes);

        put(b"RIFF");
        put(&(36 + data_len).to_le_bytes());
        put(b"WAVE");

        put(b"fmt ");
        put(&16u32.to_le_bytes());
        put(&1u16.to_le_bytes()); // PCM
        put(&CHANNELS.to_le_bytes());
        put(&SAMPLE_RATE.to_le_bytes());
        put(&(SAMPLE_RATE * block_align as u32).to_le_bytes());
        put(&block_align.to_le_bytes());
        put(&BITS.to_le_bytes());

        put(b"data");
        put(&data_len.to_le_bytes());
        for &s in samples {
            put(&((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_sample_count() {
            let samples = gen_connect();
            let wav = make_wav(&samples);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + samples.len() * 2);
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
            assert_eq!(data_size as usize, samples.len() * 2);
        }

        #[test]
        fn samples_stay_in_range() {
            for sfx in [gen_blip(880.0, 0.04, 0.2), gen_connect(), gen_reset(), gen_won()] {
                assert!(!sfx.is_empty());
                assert!(sfx.iter().all(|s| s.abs() <= 1.0));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_select(&self) {}
    pub fn play_connect(&self) {}
    pub fn play_reset(&self) {}
    pub fn play_won(&self) {}
}
