/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::app::Cue;
use crate::sim::event::GameEvent;

/// Which effect a cue triggers, if any.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Gold,
    Key,
    Hurt,
    Defeat,
    Clear,
    GameOver,
}

pub fn sfx_for(cue: Cue) -> Option<Sfx> {
    match cue {
        Cue::Game(GameEvent::GoldPicked { .. }) => Some(Sfx::Gold),
        Cue::Game(GameEvent::KeyPicked { .. }) => Some(Sfx::Key),
        Cue::Game(GameEvent::SpikesHit { .. }) => Some(Sfx::Hurt),
        Cue::Game(GameEvent::SpiderDefeated { .. }) => Some(Sfx::Defeat),
        Cue::LevelComplete => Some(Sfx::Clear),
        Cue::GameOver => Some(Sfx::GameOver),
        Cue::Game(_) => None,
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;
    use std::f32::consts::TAU;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::{debug, warn};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_gold: Arc<Vec<u8>>,
        sfx_key: Arc<Vec<u8>>,
        sfx_hurt: Arc<Vec<u8>>,
        sfx_defeat: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };
            debug!("sound engine ready");

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_gold: Arc::new(make_wav(&gen_pickup())),
                sfx_key: Arc::new(make_wav(&gen_key())),
                sfx_hurt: Arc::new(make_wav(&gen_hurt())),
                sfx_defeat: Arc::new(make_wav(&gen_defeat())),
                sfx_clear: Arc::new(make_wav(&gen_clear())),
                sfx_game_over: Arc::new(make_wav(&gen_game_over())),
            })
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = match sfx {
                Sfx::Gold => &self.sfx_gold,
                Sfx::Key => &self.sfx_key,
                Sfx::Hurt => &self.sfx_hurt,
                Sfx::Defeat => &self.sfx_defeat,
                Sfx::Clear => &self.sfx_clear,
                Sfx::GameOver => &self.sfx_game_over,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn samples(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// A run of notes, each a sine with a light overtone and a fade.
    fn gen_notes(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let mut out = Vec::new();
        for &freq in notes {
            let n = samples(note_dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 2.0 * TAU).sin() * 0.3;
                out.push(wave * env * volume);
            }
        }
        out
    }

    /// Gold pickup: quick ascending arpeggio C6→E6→G6
    fn gen_pickup() -> Vec<f32> {
        let notes = [1047.0_f32, 1319.0, 1568.0];
        let note_dur = 0.045;
        let mut out = Vec::new();
        for &freq in &notes {
            let n = samples(note_dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                // Square-ish wave (sine + 3rd harmonic) for retro feel
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                out.push(wave * env * 0.25);
            }
        }
        out
    }

    /// Key: two-note chime G5→C6
    fn gen_key() -> Vec<f32> {
        gen_notes(&[784.0, 1047.0], 0.09, 0.3)
    }

    /// Spikes: short noise burst with descending pitch
    fn gen_hurt() -> Vec<f32> {
        let n = samples(0.12);
        let mut lcg: u32 = 12345;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 200.0 + (1.0 - t) * 300.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * freq * TAU).sin();
                lcg = lcg.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (lcg as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(0.8);
                (tone * 0.4 + noise * 0.6) * env * 0.3
            })
            .collect()
    }

    /// Spider defeated: short descending whistle
    fn gen_defeat() -> Vec<f32> {
        let n = samples(0.15);
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 900.0 - t * 600.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.6);
                (ti * freq * TAU).sin() * env * 0.25
            })
            .collect()
    }

    /// Level clear: ascending fanfare C5→E5→G5→C6 with a held top note
    fn gen_clear() -> Vec<f32> {
        let mut out = gen_notes(&[523.0, 659.0, 784.0, 1047.0], 0.1, 0.3);
        let n = samples(0.25);
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            out.push((t * 1047.0 * TAU).sin() * env * 0.3);
        }
        out
    }

    /// Game over: sad descending tone A4→F#4→Eb4→C4, faded out
    fn gen_game_over() -> Vec<f32> {
        let mut out = gen_notes(&[440.0, 370.0, 311.0, 261.0], 0.12, 0.3);
        let total = out.len();
        let fade_len = total / 4;
        for (i, s) in out.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        out
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}
