//! The cycle loop: read cursor, one pipeline pass per cycle, indicator
//! update, pacing.

use serde::Serialize;

use super::pacing::Pacer;
use super::state::Pipeline;
use crate::audio::source::SampleTable;
use crate::dsp::classify::{Band, BandThresholds};
use crate::dsp::transform::ForwardTransform;
use crate::error::ConfigError;
use crate::indicator::Indicator;

/// Circular position in the sample table. Always `< len`.
#[derive(Clone, Copy, Debug)]
pub struct ReadCursor {
    pos: usize,
    len: usize,
    step: usize,
}

impl ReadCursor {
    pub fn new(len: usize, step: usize) -> Self {
        debug_assert!(len > 0);
        Self { pos: 0, len, step }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn advance(&mut self) {
        self.pos = (self.pos + self.step % self.len) % self.len;
    }

    /// Cycles until the cursor is back where it started.
    pub fn period(&self) -> usize {
        self.len / gcd(self.len, self.step % self.len)
    }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Per-band tallies of a finite run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub cycles: usize,
    pub low: usize,
    pub mid: usize,
    pub high: usize,
    pub band_changes: usize,
    pub last_band: Option<Band>,
    pub final_cursor: usize,
}

impl RunSummary {
    pub fn from_bands(bands: &[Band], final_cursor: usize) -> Self {
        let mut summary = RunSummary {
            cycles: bands.len(),
            final_cursor,
            ..Default::default()
        };
        for band in bands {
            match band {
                Band::Low => summary.low += 1,
                Band::Mid => summary.mid += 1,
                Band::High => summary.high += 1,
            }
        }
        summary.band_changes = bands.windows(2).filter(|w| w[0] != w[1]).count();
        summary.last_band = bands.last().copied();
        summary
    }
}

pub struct FrameScheduler<T, I, P> {
    source: SampleTable,
    pipeline: Pipeline<T>,
    cursor: ReadCursor,
    indicator: I,
    pacer: P,
}

impl<T, I, P> FrameScheduler<T, I, P>
where
    T: ForwardTransform,
    I: Indicator,
    P: Pacer,
{
    /// Builds and validates the pipeline for `source`. On error nothing is
    /// ever sent to `indicator`.
    pub fn new(
        source: SampleTable,
        frame_size: usize,
        transform: T,
        thresholds: BandThresholds,
        indicator: I,
        pacer: P,
    ) -> Result<Self, ConfigError> {
        let pipeline = Pipeline::new(frame_size, transform, source.sample_rate(), thresholds)?;
        let cursor = ReadCursor::new(source.len(), frame_size);

        log::info!(
            "Scheduler ready: frame {} @ {}Hz ({:.2} Hz/bin), source {} samples, cursor period {} cycles",
            frame_size,
            source.sample_rate(),
            source.sample_rate() as f32 / frame_size as f32,
            source.len(),
            cursor.period()
        );

        Ok(Self {
            source,
            pipeline,
            cursor,
            indicator,
            pacer,
        })
    }

    /// One cycle without the pacing wait.
    pub fn step(&mut self) -> Band {
        let start = self.cursor.position();
        self.cursor.advance();

        let band = self.pipeline.process(&self.source, start);
        self.indicator.show(band);
        log::trace!("frame @{} -> {}", start, band);
        band
    }

    /// Runs `cycles` paced cycles and returns each cycle's band.
    pub fn run_cycles(&mut self, cycles: usize) -> Vec<Band> {
        let mut bands = Vec::with_capacity(cycles);
        for _ in 0..cycles {
            bands.push(self.step());
            self.pacer.wait();
        }
        bands
    }

    /// Production loop. Only a reset or power-off ends it.
    pub fn run_forever(mut self) -> ! {
        log::info!("Entering cycle loop");
        loop {
            self.step();
            self.pacer.wait();
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor.position()
    }

}
