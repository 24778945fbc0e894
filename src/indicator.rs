use indicatif::ProgressBar;
use std::io::Write;

use crate::dsp::classify::Band;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Level {
    #[default]
    Low,
    High,
}

/// One discrete output line, e.g. a GPIO pin wired to an LED.
pub trait OutputLine {
    fn drive(&mut self, level: Level);
}

/// Receives one band per cycle.
pub trait Indicator {
    fn show(&mut self, band: Band);
}

impl<I: Indicator + ?Sized> Indicator for &mut I {
    fn show(&mut self, band: Band) {
        (**self).show(band)
    }
}

/// Three mutually exclusive lines: 0 = low, 1 = mid, 2 = high.
///
/// Every call drives all three lines, so the result never depends on the
/// previous state.
pub struct LedBank<L> {
    lines: [L; 3],
}

impl<L: OutputLine> LedBank<L> {
    pub fn new(lines: [L; 3]) -> Self {
        Self { lines }
    }
}

impl<L: OutputLine> Indicator for LedBank<L> {
    fn show(&mut self, band: Band) {
        for line in self.lines.iter_mut() {
            line.drive(Level::Low);
        }
        self.lines[band.index()].drive(Level::High);
    }
}

/// A line that only remembers its last level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LatchedLine {
    level: Level,
}

impl LatchedLine {
    pub fn is_asserted(&self) -> bool {
        self.level == Level::High
    }
}

impl OutputLine for LatchedLine {
    fn drive(&mut self, level: Level) {
        self.level = level;
    }
}

impl LedBank<LatchedLine> {
    pub fn latched() -> Self {
        Self::new([LatchedLine::default(); 3])
    }

    pub fn asserted(&self) -> Option<Band> {
        Band::ALL
            .iter()
            .copied()
            .find(|b| self.lines[b.index()].is_asserted())
    }

    /// `LOW ● MID ○ HIGH ○`
    pub fn render(&self) -> String {
        Band::ALL
            .iter()
            .map(|b| {
                let dot = if self.lines[b.index()].is_asserted() { '●' } else { '○' };
                format!("{} {}", b.label().to_uppercase(), dot)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Terminal stand-in for the LED board.
///
/// With a progress bar attached the LED state becomes the bar's message and
/// each call counts as one cycle of progress. Otherwise the state is redrawn
/// in place on stdout.
pub struct ConsoleIndicator {
    bank: LedBank<LatchedLine>,
    progress: Option<ProgressBar>,
}

impl ConsoleIndicator {
    pub fn new(progress: Option<ProgressBar>) -> Self {
        Self {
            bank: LedBank::latched(),
            progress,
        }
    }
}

impl Indicator for ConsoleIndicator {
    fn show(&mut self, band: Band) {
        let previous = self.bank.asserted();
        self.bank.show(band);
        if previous != Some(band) {
            log::debug!("Indicator: {:?} -> {}", previous, band);
        }

        let state = self.bank.render();
        match self.progress {
            Some(ref pb) => {
                pb.set_message(state);
                pb.inc(1);
            }
            None => {
                let mut out = std::io::stdout().lock();
                let _ = write!(out, "\r{}", state);
                let _ = out.flush();
            }
        }
    }
}
