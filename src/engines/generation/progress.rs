use super::stats::GenerationStats;
use log::{info, warn};
use std::io::Write;
use std::sync::mpsc::Sender;

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, iteration: usize);
    fn on_generation_complete(&mut self, stats: &GenerationStats);
}

/// Reports progress through the `log` facade
pub struct LogProgressCallback {
    every: usize,
}

impl LogProgressCallback {
    /// Logs every `every`-th generation (at least every generation when 0 or 1)
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl Default for LogProgressCallback {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ProgressCallback for LogProgressCallback {
    fn on_generation_start(&mut self, iteration: usize) {
        log::debug!("Generation {} starting...", iteration);
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        if stats.iteration % self.every != 0 {
            return;
        }
        info!(
            "Generation {} complete. Best score: {:.4}, mean: {:.4}, species: {}, failed scores: {}",
            stats.iteration,
            stats.best_score,
            stats.mean_score,
            stats.species_count,
            stats.scoring.failed + stats.scoring.undecodable
        );
    }
}

/// Writes one JSON object per completed generation
pub struct JsonLinesProgressCallback<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesProgressCallback<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ProgressCallback for JsonLinesProgressCallback<W> {
    fn on_generation_start(&mut self, _iteration: usize) {}

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        let written = serde_json::to_writer(&mut self.writer, stats)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"))
            .and_then(|_| self.writer.flush());
        if let Err(e) = written {
            warn!("Failed to write progress line: {}", e);
        }
    }
}

/// Messages sent by [`ChannelProgressCallback`]
#[derive(Debug, Clone)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete(GenerationStats),
}

/// Forwards progress to another thread, e.g. a front end watching a run
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, iteration: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(iteration));
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        let _ = self
            .sender
            .send(ProgressMessage::GenerationComplete(stats.clone()));
    }
}
