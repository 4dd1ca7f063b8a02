//! Landmark replay source: JSON Lines from a file or stdin
//!
//! One frame per line:
//!
//! ```text
//! {"t_ms": 1234, "width": 640, "height": 480, "landmarks": [[x, y], [x, y, z], ...]}
//! ```
//!
//! `"landmarks": null` (or a missing key) is a frame without a hand.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::landmarks::{FrameSize, Landmark};

/// On-disk shape of one line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub t_ms: u64,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub landmarks: Option<Vec<Vec<f64>>>,
}

/// A decoded frame ready for the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFrame {
    pub timestamp: Duration,
    pub size: FrameSize,
    pub landmarks: Option<Vec<Landmark>>,
}

impl TryFrom<FrameRecord> for ReplayFrame {
    type Error = anyhow::Error;

    fn try_from(record: FrameRecord) -> Result<Self> {
        let landmarks = record
            .landmarks
            .map(|points| {
                points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| match p.as_slice() {
                        [x, y] => Ok(Landmark::new(*x, *y)),
                        [x, y, z] => Ok(Landmark { x: *x, y: *y, z: Some(*z) }),
                        other => anyhow::bail!(
                            "landmark {} has {} coordinates (expected 2 or 3)",
                            i,
                            other.len()
                        ),
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(Self {
            timestamp: Duration::from_millis(record.t_ms),
            size: FrameSize::new(record.width, record.height),
            landmarks,
        })
    }
}

/// Parse one line; blank lines yield `None`
pub fn parse_line(line: &str) -> Result<Option<ReplayFrame>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let record: FrameRecord = serde_json::from_str(line).context("Invalid frame JSON")?;
    ReplayFrame::try_from(record).map(Some)
}

/// Counters for one replay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub frames: u64,
    pub skipped: u64,
}

/// Read frames line by line and forward them until EOF or the receiver drops
///
/// Unparsable lines are logged and skipped.
pub async fn read_frames<R>(reader: R, tx: mpsc::Sender<ReplayFrame>) -> Result<ReplayStats>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut stats = ReplayStats::default();
    let mut line_no = 0u64;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        line_no += 1;
        match parse_line(&line) {
            Ok(Some(frame)) => {
                if tx.send(frame).await.is_err() {
                    debug!("Frame receiver closed, stopping replay");
                    break;
                }
                stats.frames += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("⚠️  Skipping line {}: {:#}", line_no, e);
                stats.skipped += 1;
            }
        }
    }

    info!(
        "📼 Replay finished: {} frames, {} skipped",
        stats.frames, stats.skipped
    );
    Ok(stats)
}

/// Spawn a reader task over a file path, or stdin when `path` is `None`
pub fn spawn_reader(
    path: Option<String>,
    tx: mpsc::Sender<ReplayFrame>,
) -> tokio::task::JoinHandle<Result<ReplayStats>> {
    tokio::spawn(async move {
        match path {
            Some(path) => {
                info!("📼 Replaying landmarks from {}", path);
                let file = tokio::fs::File::open(&path)
                    .await
                    .with_context(|| format!("Failed to open input file: {}", path))?;
                read_frames(file, tx).await
            }
            None => {
                info!("📼 Reading landmarks from stdin");
                read_frames(tokio::io::stdin(), tx).await
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn hand_json(n: usize) -> String {
        let points: Vec<String> = (0..n).map(|i| format!("[{}, {}]", i, i * 2)).collect();
        format!(
            r#"{{"t_ms": 40, "width": 640, "height": 480, "landmarks": [{}]}}"#,
            points.join(", ")
        )
    }

    #[test]
    fn test_parse_hand_frame() {
        let frame = parse_line(&hand_json(21)).unwrap().unwrap();
        assert_eq!(frame.timestamp, Duration::from_millis(40));
        assert_eq!(frame.size, FrameSize::new(640, 480));
        let landmarks = frame.landmarks.unwrap();
        assert_eq!(landmarks.len(), 21);
        assert_eq!(landmarks[3], Landmark::new(3.0, 6.0));
    }

    #[test]
    fn test_parse_no_hand_and_depth() {
        let frame = parse_line(r#"{"t_ms": 0, "width": 640, "height": 480, "landmarks": null}"#)
            .unwrap()
            .unwrap();
        assert_eq!(frame.landmarks, None);

        let frame = parse_line(r#"{"t_ms": 0, "width": 640, "height": 480}"#)
            .unwrap()
            .unwrap();
        assert_eq!(frame.landmarks, None);

        let frame = parse_line(
            r#"{"t_ms": 0, "width": 640, "height": 480, "landmarks": [[1.5, 2.5, -0.1]]}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(frame.landmarks.unwrap()[0].z, Some(-0.1));
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(parse_line("not json").is_err());
        assert!(
            parse_line(r#"{"t_ms": 0, "width": 640, "height": 480, "landmarks": [[1.0]]}"#)
                .is_err()
        );
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_frames_skips_garbage() {
        let input = format!("{}\n\ngarbage\n{}\n", hand_json(21), hand_json(21));
        let (tx, mut rx) = mpsc::channel(8);

        let stats = read_frames(input.as_bytes(), tx).await.unwrap();
        assert_eq!(stats, ReplayStats { frames: 2, skipped: 1 });

        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 2);
    }

    #[tokio::test]
    async fn test_spawn_reader_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{}", hand_json(21))?;
        writeln!(file, r#"{{"t_ms": 80, "width": 640, "height": 480, "landmarks": null}}"#)?;

        let (tx, mut rx) = mpsc::channel(8);
        let handle = spawn_reader(Some(file.path().to_string_lossy().to_string()), tx);

        let first = rx.recv().await.unwrap();
        assert!(first.landmarks.is_some());
        let second = rx.recv().await.unwrap();
        assert_eq!(second.timestamp, Duration::from_millis(80));

        let stats = handle.await??;
        assert_eq!(stats.frames, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_spawn_reader_missing_file() {
        let (tx, _rx) = mpsc::channel(1);
        let result = spawn_reader(Some("/nonexistent/frames.jsonl".to_string()), tx)
            .await
            .unwrap();
        assert!(result.is_err());
    }
}
