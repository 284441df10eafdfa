//! Incremental frame consistency check
//!
//! The first frame fixes the reference geometry; the first frame that
//! disagrees with it ends the check. Frames are looked at one at a time and
//! never buffered, so arbitrarily long videos cost constant memory.

use std::future::Future;

use super::DetectError;
use super::sample::{FrameSample, ReferenceGeometry};

/// A pull-based source of frame samples, in analyzer emission order.
pub trait FrameSource {
    fn next_sample(
        &mut self,
    ) -> impl Future<Output = Result<Option<FrameSample>, DetectError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub safe: bool,
    /// Every sample observed, including the one that broke consistency
    pub scanned: u64,
    pub reference: Option<ReferenceGeometry>,
}

#[derive(Debug, Default)]
pub struct ConsistencyChecker {
    reference: Option<ReferenceGeometry>,
    scanned: u64,
}

impl ConsistencyChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, sample: &FrameSample) -> Step {
        self.scanned += 1;
        match &self.reference {
            None => {
                self.reference = Some(sample.geometry());
                Step::Continue
            }
            Some(reference) if sample.matches(reference) => Step::Continue,
            Some(_) => Step::Mismatch,
        }
    }

    pub fn scanned(&self) -> u64 {
        self.scanned
    }

    fn conclude(self, safe: bool) -> Evaluation {
        Evaluation {
            safe,
            scanned: self.scanned,
            reference: self.reference,
        }
    }
}

/// Pull samples until a mismatch, exhaustion, or an error.
///
/// Returns as soon as a mismatching sample is observed without pulling any
/// further; the caller owns cancelling whatever produces the samples. An
/// empty source is safe with nothing scanned. With `max_frames` set, a source
/// that yields more than that many samples without a verdict fails with
/// [`DetectError::FrameLimitExceeded`].
pub async fn evaluate<S: FrameSource>(
    source: &mut S,
    max_frames: Option<u64>,
) -> Result<Evaluation, DetectError> {
    let mut checker = ConsistencyChecker::new();

    while let Some(sample) = source.next_sample().await? {
        if max_frames.is_some_and(|max| checker.scanned() >= max) {
            return Err(DetectError::FrameLimitExceeded(checker.scanned()));
        }
        if checker.observe(&sample) == Step::Mismatch {
            return Ok(checker.conclude(false));
        }
    }

    Ok(checker.conclude(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays fixed records and counts how many were pulled.
    struct Replay {
        records: VecDeque<Result<FrameSample, DetectError>>,
        pulled: usize,
    }

    impl Replay {
        fn lines(lines: &[&str]) -> Self {
            Self {
                records: lines
                    .iter()
                    .map(|line| FrameSample::parse_record(line))
                    .collect(),
                pulled: 0,
            }
        }
    }

    impl FrameSource for Replay {
        async fn next_sample(&mut self) -> Result<Option<FrameSample>, DetectError> {
            match self.records.pop_front() {
                Some(record) => {
                    self.pulled += 1;
                    record.map(Some)
                }
                None => Ok(None),
            }
        }
    }

    fn hd() -> ReferenceGeometry {
        ReferenceGeometry {
            width: 1920,
            height: 1080,
            pixel_format: "yuv420p".to_string(),
        }
    }

    #[tokio::test]
    async fn uniform_stream_is_safe() {
        let mut source = Replay::lines(&[
            "0.0,1920,1080,yuv420p",
            "0.04,1920,1080,yuv420p",
            "0.08,1920,1080,yuv420p",
        ]);
        let evaluation = evaluate(&mut source, None).await.unwrap();
        assert_eq!(
            evaluation,
            Evaluation {
                safe: true,
                scanned: 3,
                reference: Some(hd()),
            }
        );
    }

    #[tokio::test]
    async fn size_change_stops_at_offending_frame() {
        let mut source = Replay::lines(&[
            "0.0,1920,1080,yuv420p",
            "0.04,8192,8192,yuv420p",
            "0.08,1920,1080,yuv420p",
            "0.12,1920,1080,yuv420p",
        ]);
        let evaluation = evaluate(&mut source, None).await.unwrap();
        assert!(!evaluation.safe);
        assert_eq!(evaluation.scanned, 2);
        assert_eq!(evaluation.reference, Some(hd()));
        assert_eq!(source.pulled, 2);
        assert_eq!(source.records.len(), 2);
    }

    #[tokio::test]
    async fn pixel_format_change_alone_is_unsafe() {
        let mut source = Replay::lines(&[
            "0.0,1920,1080,yuv420p",
            "0.04,1920,1080,yuv420p",
            "0.08,1920,1080,yuv444p",
        ]);
        let evaluation = evaluate(&mut source, None).await.unwrap();
        assert!(!evaluation.safe);
        assert_eq!(evaluation.scanned, 3);
    }

    #[tokio::test]
    async fn empty_stream_is_safe_without_reference() {
        let mut source = Replay::lines(&[]);
        let evaluation = evaluate(&mut source, None).await.unwrap();
        assert_eq!(
            evaluation,
            Evaluation {
                safe: true,
                scanned: 0,
                reference: None,
            }
        );
    }

    #[test]
    fn reference_never_moves() {
        let mut checker = ConsistencyChecker::new();
        let first = FrameSample::parse_record("0.0,640,480,gray").unwrap();
        let second = FrameSample::parse_record("0.1,320,240,gray").unwrap();
        assert_eq!(checker.observe(&first), Step::Continue);
        assert_eq!(checker.observe(&second), Step::Mismatch);
        assert_eq!(checker.observe(&second), Step::Mismatch);
        assert_eq!(checker.scanned(), 3);
        assert_eq!(checker.conclude(false).reference, Some(first.geometry()));
    }

    #[tokio::test]
    async fn malformed_record_propagates() {
        let mut source = Replay::lines(&["0.0,1920,1080,yuv420p", "0.04,1920,1080"]);
        let err = evaluate(&mut source, None).await.unwrap_err();
        assert!(matches!(err, DetectError::MalformedFrameRecord { .. }));
    }

    #[tokio::test]
    async fn frame_limit_applies_only_past_the_ceiling() {
        let lines = ["0.0,1,1,gray", "0.1,1,1,gray", "0.2,1,1,gray"];

        let mut exact = Replay::lines(&lines);
        let evaluation = evaluate(&mut exact, Some(3)).await.unwrap();
        assert!(evaluation.safe);
        assert_eq!(evaluation.scanned, 3);

        let mut over = Replay::lines(&lines);
        let err = evaluate(&mut over, Some(2)).await.unwrap_err();
        assert!(matches!(err, DetectError::FrameLimitExceeded(2)));
    }
}
