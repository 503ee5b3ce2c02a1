//! The collection worker.
//!
//! Collection runs on its own task so the caller stays free to print
//! progress and watch for a stop request. The serial port is owned by the
//! worker for the whole session and is closed when the worker returns,
//! however it returns.
//!
//! Every line read is bounded by [`CollectOptions::line_timeout`] and
//! raced against a [`CancellationToken`].

use icsig_core::{MessageSet, ReadingVector, MESSAGES_PER_SET};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_serial::SerialPortBuilderExt;
use tokio_util::sync::CancellationToken;

use crate::collector::{Feed, SampleCollector};
use crate::error::{AcquireError, AcquireResult};

/// How long to wait for a single line before giving up.
pub const DEFAULT_LINE_TIMEOUT: Duration = Duration::from_secs(30);

/// The fixture resets when the port opens; give it time to boot.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub line_timeout: Duration,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            line_timeout: DEFAULT_LINE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    pub settle_delay: Duration,
}

/// Events reported back to the caller while collecting.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Connected { port: String },
    Value { index: usize, value: f64 },
    MessageComplete { count: usize, vector: ReadingVector },
    Rejected { token: String },
}

#[derive(Debug)]
pub enum CollectOutcome {
    /// A full message set was collected.
    Complete(MessageSet),
    /// Collection was stopped early; holds the vectors completed so far.
    Stopped { messages: Vec<ReadingVector> },
}

fn report(progress: &mpsc::UnboundedSender<Progress>, event: Progress) {
    if progress.send(event).is_err() {
        log::debug!("Progress receiver dropped");
    }
}

/// Collect one message set from a line-oriented source.
pub async fn collect<R>(
    source: R,
    options: &CollectOptions,
    cancel: &CancellationToken,
    progress: &mpsc::UnboundedSender<Progress>,
) -> AcquireResult<CollectOutcome>
where
    R: AsyncBufRead + Unpin,
{
    let mut source = source;
    let mut collector = SampleCollector::new();
    let mut raw = Vec::new();

    while !collector.is_complete() {
        raw.clear();
        let read = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                log::info!(
                    "Collection stopped after {} messages",
                    collector.messages().len()
                );
                return Ok(CollectOutcome::Stopped {
                    messages: collector.into_messages(),
                });
            }
            read = tokio::time::timeout(options.line_timeout, source.read_until(b'\n', &mut raw)) => read,
        };

        let bytes = read.map_err(|_| AcquireError::Timeout(options.line_timeout))??;
        if bytes == 0 {
            return Err(AcquireError::SourceClosed {
                collected: collector.messages().len(),
                expected: MESSAGES_PER_SET,
            });
        }

        let line = String::from_utf8_lossy(&raw);
        match collector.push_line(&line) {
            Feed::Ignored => {}
            Feed::Rejected(token) => report(progress, Progress::Rejected { token }),
            Feed::Value { index, value } => report(progress, Progress::Value { index, value }),
            Feed::MessageComplete { count, vector } => {
                report(progress, Progress::MessageComplete { count, vector });
            }
        }
    }

    log::info!("Data collection complete");
    Ok(CollectOutcome::Complete(collector.into_message_set()?))
}

/// Open the serial port and collect one message set from it.
pub async fn collect_from_port(
    settings: &SerialSettings,
    options: &CollectOptions,
    cancel: &CancellationToken,
    progress: &mpsc::UnboundedSender<Progress>,
) -> AcquireResult<CollectOutcome> {
    log::info!(
        "Connecting to {} at {} baud",
        settings.port,
        settings.baud_rate
    );

    let port = tokio_serial::new(&settings.port, settings.baud_rate)
        .open_native_async()
        .map_err(|source| AcquireError::Serial {
            port: settings.port.clone(),
            source,
        })?;

    tokio::select! {
        () = cancel.cancelled() => {
            log::info!("Collection stopped while waiting for {}", settings.port);
            return Ok(CollectOutcome::Stopped { messages: Vec::new() });
        }
        () = tokio::time::sleep(settings.settle_delay) => {}
    }

    report(
        progress,
        Progress::Connected {
            port: settings.port.clone(),
        },
    );

    let outcome = collect(BufReader::new(port), options, cancel, progress).await;
    log::info!("Serial port {} closed", settings.port);
    outcome
}

/// Names of the serial ports present on this machine.
pub fn available_ports() -> AcquireResult<Vec<String>> {
    let ports = tokio_serial::available_ports().map_err(|source| AcquireError::Serial {
        port: "<enumerate>".to_string(),
        source,
    })?;
    Ok(ports.into_iter().map(|info| info.port_name).collect())
}

/// A running collection session.
#[derive(Debug)]
pub struct CollectionHandle {
    progress: mpsc::UnboundedReceiver<Progress>,
    cancel: CancellationToken,
    task: JoinHandle<AcquireResult<CollectOutcome>>,
}

impl CollectionHandle {
    /// Next progress event; `None` once the worker has finished.
    pub async fn next_progress(&mut self) -> Option<Progress> {
        self.progress.recv().await
    }

    /// Ask the worker to stop after the line it is waiting on.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Wait for the worker and return its outcome.
    pub async fn finish(self) -> AcquireResult<CollectOutcome> {
        self.task
            .await
            .map_err(|e| AcquireError::Task(e.to_string()))?
    }
}

/// Start collecting from the configured serial port on a background task.
#[must_use]
pub fn spawn_collection(settings: SerialSettings, options: CollectOptions) -> CollectionHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        collect_from_port(&settings, &options, &token, &tx).await
    });

    CollectionHandle {
        progress: rx,
        cancel,
        task,
    }
}

/// Run [`collect`] on a background task over any line source.
#[must_use]
pub fn spawn_collection_from<R>(source: R, options: CollectOptions) -> CollectionHandle
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move { collect(source, &options, &token, &tx).await });

    CollectionHandle {
        progress: rx,
        cancel,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icsig_core::CHANNELS;

    fn fixture_output(messages: usize) -> String {
        let mut out = String::new();
        for m in 0..messages {
            for c in 0..CHANNELS {
                out.push_str(&format!("{:1.3}\r\n", (m + c) as f64 * 0.5));
            }
        }
        out
    }

    #[tokio::test]
    async fn test_collect_complete_set() {
        let data = fixture_output(MESSAGES_PER_SET);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let outcome = collect(data.as_bytes(), &CollectOptions::default(), &cancel, &tx)
            .await
            .unwrap();

        let set = match outcome {
            CollectOutcome::Complete(set) => set,
            CollectOutcome::Stopped { .. } => panic!("expected a complete set"),
        };
        assert_eq!(set.len(), MESSAGES_PER_SET);
        assert_eq!(set.vectors()[2][1], 1.5);

        let mut completed = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, Progress::MessageComplete { .. }) {
                completed += 1;
            }
        }
        assert_eq!(completed, MESSAGES_PER_SET);
    }

    #[tokio::test]
    async fn test_collect_reports_rejected_tokens() {
        let data = format!("garbage\r\n\r\n{}", fixture_output(MESSAGES_PER_SET));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcome = collect(
            data.as_bytes(),
            &CollectOptions::default(),
            &CancellationToken::new(),
            &tx,
        )
        .await
        .unwrap();
        assert!(matches!(outcome, CollectOutcome::Complete(_)));
        assert_eq!(
            rx.try_recv().unwrap(),
            Progress::Rejected {
                token: "garbage".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_collect_tolerates_invalid_utf8() {
        let mut data = vec![0xff, 0xfe, b'\n'];
        data.extend_from_slice(fixture_output(MESSAGES_PER_SET).as_bytes());
        let (tx, _rx) = mpsc::unbounded_channel();

        let outcome = collect(
            data.as_slice(),
            &CollectOptions::default(),
            &CancellationToken::new(),
            &tx,
        )
        .await
        .unwrap();
        assert!(matches!(outcome, CollectOutcome::Complete(_)));
    }

    #[tokio::test]
    async fn test_collect_source_closed_early() {
        let data = fixture_output(2);
        let (tx, _rx) = mpsc::unbounded_channel();

        let result = collect(
            data.as_bytes(),
            &CollectOptions::default(),
            &CancellationToken::new(),
            &tx,
        )
        .await;
        assert!(matches!(
            result,
            Err(AcquireError::SourceClosed {
                collected: 2,
                expected: MESSAGES_PER_SET
            })
        ));
    }

    #[tokio::test]
    async fn test_collect_already_cancelled() {
        let data = fixture_output(MESSAGES_PER_SET);
        let (tx, _rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = collect(data.as_bytes(), &CollectOptions::default(), &cancel, &tx)
            .await
            .unwrap();
        match outcome {
            CollectOutcome::Stopped { messages } => assert!(messages.is_empty()),
            CollectOutcome::Complete(_) => panic!("cancelled collection should stop"),
        }
    }

    #[tokio::test]
    async fn test_open_missing_port_is_resource_failure() {
        let settings = SerialSettings {
            port: "/dev/icsig-no-such-port".to_string(),
            baud_rate: 9600,
            settle_delay: Duration::ZERO,
        };
        let (tx, _rx) = mpsc::unbounded_channel();

        let result = collect_from_port(
            &settings,
            &CollectOptions::default(),
            &CancellationToken::new(),
            &tx,
        )
        .await;
        let err = result.unwrap_err();
        assert!(matches!(err, AcquireError::Serial { .. }));
        assert!(err.is_resource_failure());
    }
}
