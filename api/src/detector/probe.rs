//! Probe orchestration: size gate, analyzer, consistency check.
//!
//! Every path that spawned an analyzer waits for it before returning, whether
//! the probe ended in a verdict, an error, or a timeout.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use super::DetectError;
use super::checker::{Evaluation, evaluate};
use super::locator::ResourceLocator;
use super::size_gate::SizeGate;
use super::stream::FrameSampleStream;
use crate::models::{Dimensions, ProbeResult};

/// Limits and tooling for the analysis phase
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub ffprobe_path: PathBuf,
    /// Wall-clock ceiling for reading frames; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Frame-count ceiling; `None` reads until the analyzer stops
    pub max_frames: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeState {
    Init,
    SizeChecked,
    Streaming,
    EarlyAborted,
    Exhausted,
    Closed,
}

fn enter(state: ProbeState) {
    debug!(?state, "probe state");
}

#[derive(Debug, Clone)]
pub struct Detector {
    gate: SizeGate,
    analysis: AnalysisSettings,
}

impl Detector {
    pub fn new(gate: SizeGate, analysis: AnalysisSettings) -> Self {
        Self { gate, analysis }
    }

    /// Judge whether `locator` keeps the same frame geometry throughout.
    #[tracing::instrument(level = "info", skip(self, locator), fields(url = %locator))]
    pub async fn probe(&self, locator: &ResourceLocator) -> Result<ProbeResult, DetectError> {
        enter(ProbeState::Init);
        let length = self.gate.check(locator).await?;
        enter(ProbeState::SizeChecked);
        debug!(length, "declared length accepted");

        let stream = FrameSampleStream::open(&self.analysis.ffprobe_path, locator)?;
        let result = self.analyze(stream).await?;

        info!(
            safe = result.safe,
            scanned = result.scanned_count,
            "probe finished"
        );
        Ok(result)
    }

    /// Drive an already spawned analyzer to a verdict and reap it.
    ///
    /// The analysis timeout covers reading frames and waiting for the
    /// analyzer to exit afterwards.
    pub async fn analyze(&self, mut stream: FrameSampleStream) -> Result<ProbeResult, DetectError> {
        enter(ProbeState::Streaming);
        debug!(pid = ?stream.id(), "frame analyzer started");

        let deadline = self
            .analysis
            .timeout
            .map(|limit| (Instant::now() + limit, limit));

        let outcome = within(deadline, evaluate(&mut stream, self.analysis.max_frames)).await;
        let evaluation = match outcome {
            Ok(evaluation) => evaluation,
            Err(err) => return Err(abort(&mut stream, err).await),
        };

        if !evaluation.safe {
            enter(ProbeState::EarlyAborted);
            close(&mut stream).await;
            return Ok(evaluation.into());
        }

        enter(ProbeState::Exhausted);
        let outcome = within(deadline, stream.finish()).await;
        let status = match outcome {
            Ok(status) => status,
            Err(err) => return Err(abort(&mut stream, err).await),
        };
        enter(ProbeState::Closed);

        if !status.success() {
            let stderr = stream.take_stderr().await;
            warn!(%status, %stderr, "frame analyzer failed");
            return Err(DetectError::AnalyzerExit { status, stderr });
        }

        Ok(evaluation.into())
    }
}

async fn within<T>(
    deadline: Option<(Instant, Duration)>,
    work: impl Future<Output = Result<T, DetectError>>,
) -> Result<T, DetectError> {
    match deadline {
        Some((at, limit)) => timeout_at(at, work)
            .await
            .unwrap_or(Err(DetectError::AnalysisTimedOut(limit))),
        None => work.await,
    }
}

async fn abort(stream: &mut FrameSampleStream, err: DetectError) -> DetectError {
    warn!(pid = ?stream.id(), "analysis aborted: {}", err);
    close(stream).await;
    err
}

/// Cancel and reap. A failed wait leaves the child to `kill_on_drop`.
async fn close(stream: &mut FrameSampleStream) {
    match stream.cancel().await {
        Ok(status) => debug!(%status, "frame analyzer stopped"),
        Err(e) => warn!(pid = ?stream.id(), "failed to reap frame analyzer: {}", e),
    }
    enter(ProbeState::Closed);
}

impl From<Evaluation> for ProbeResult {
    fn from(evaluation: Evaluation) -> Self {
        let (dimensions, format) = match evaluation.reference {
            Some(reference) => (
                Some(Dimensions {
                    width: reference.width,
                    height: reference.height,
                }),
                reference.pixel_format,
            ),
            None => (None, String::new()),
        };

        ProbeResult {
            safe: evaluation.safe,
            scanned_count: evaluation.scanned,
            dimensions,
            format,
        }
    }
}
