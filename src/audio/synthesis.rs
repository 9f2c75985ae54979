//! Procedural Glicol composition rendered offline as an input source.

use glicol::Engine;

use super::analysis::Analyzer;
use crate::error::{Error, Result};
use crate::input::{InputSignal, InputSource};
use crate::params::{audio_constants::BLOCK_SIZE, AnalyzerConfig};

/// Glicol composition (procedural music code)
pub const GLICOL_COMPOSITION: &str = r#"
~gate: speed 2.0 >> seq 60 _60 _~a 48
~a: choose 48 48 48 72 0 0 0
~amp: ~gate >> envperc 0.001 0.1
~pit: ~gate >> mul 261.63
~lead: saw ~pit >> mul ~amp >> lpf ~mod 5.0 >> mul 0.1
~mod: sin 0.2 >> mul 1300 >> add 1500
o: ~lead >> plate 0.1
"#;

/// Synthesises blocks on demand so the audio stays locked to simulation time
pub struct SynthInput {
    engine: Engine<BLOCK_SIZE>,
    analyzer: Analyzer,
    /// Rolling window of the left channel
    recent: Vec<f32>,
    rendered: u64,
}

impl SynthInput {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        Self::with_code(GLICOL_COMPOSITION, config)
    }

    /// Use a custom Glicol composition
    pub fn with_code(code: &str, config: AnalyzerConfig) -> Result<Self> {
        let mut engine = Engine::<BLOCK_SIZE>::new();
        engine.set_sr(config.sample_rate_hz);
        engine.update_with_code(code);
        engine
            .update()
            .map_err(|e| Error::Audio(format!("Glicol engine init failed: {:?}", e)))?;

        let analyzer = Analyzer::new(config)?;
        Ok(Self {
            recent: Vec::with_capacity(analyzer.window_size() + BLOCK_SIZE),
            engine,
            analyzer,
            rendered: 0,
        })
    }

    /// Samples synthesised so far
    pub fn rendered_samples(&self) -> u64 {
        self.rendered
    }

    fn render_until(&mut self, target: u64) {
        let window = self.analyzer.window_size();
        while self.rendered < target {
            let (buffers, _) = self.engine.next_block(vec![]);
            // Safety limiter: hard clip to ±0.5
            self.recent
                .extend((0..BLOCK_SIZE).map(|i| buffers[0][i].clamp(-0.5, 0.5)));
            self.rendered += BLOCK_SIZE as u64;

            if self.recent.len() > window {
                let excess = self.recent.len() - window;
                self.recent.drain(..excess);
            }
        }
    }
}

impl InputSource for SynthInput {
    fn read(&mut self, now: f32) -> InputSignal {
        let sample_rate = self.analyzer.config().sample_rate_hz as f32;
        self.render_until((now.max(0.0) * sample_rate) as u64);
        self.analyzer.analyze(&self.recent)
    }
}
