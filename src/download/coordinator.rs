use super::{ArtifactFetch, CompletionRecord, DownloadTask, FetchError};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Min-ordered queue of completion records, fastest download on top
#[derive(Debug, Default)]
pub struct CompletionQueue {
    heap: BinaryHeap<Reverse<CompletionRecord>>,
}

impl CompletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CompletionRecord) {
        self.heap.push(Reverse(record));
    }

    pub fn pop(&mut self) -> Option<CompletionRecord> {
        self.heap.pop().map(|Reverse(record)| record)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Records of a fully drained batch, ascending by elapsed time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub records: Vec<CompletionRecord>,
}

impl DownloadReport {
    pub fn file_names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.file_name.as_str()).collect()
    }
}

/// Runs download tasks concurrently on the tokio runtime
///
/// One coordinator is owned per orchestrator run. It holds no counters or
/// queues of its own; every call to [`fetch_all`](Self::fetch_all) returns a
/// batch that knows exactly how many results to wait for.
#[derive(Clone)]
pub struct DownloadCoordinator {
    fetcher: Arc<dyn ArtifactFetch>,
}

impl DownloadCoordinator {
    pub fn new(fetcher: Arc<dyn ArtifactFetch>) -> Self {
        Self { fetcher }
    }

    /// Spawns one worker per task and returns immediately
    pub fn fetch_all(&self, tasks: Vec<DownloadTask>) -> DownloadBatch {
        let expected = tasks.len();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut workers = Vec::with_capacity(expected);

        for task in tasks {
            let fetcher = Arc::clone(&self.fetcher);
            let tx = tx.clone();
            workers.push(tokio::spawn(async move {
                let result = fetcher.fetch(&task).await;
                debug!(file = %task.file_name, ok = result.is_ok(), "Download worker finished");
                // The batch may have been dropped; nothing left to notify then.
                let _ = tx.send(result);
            }));
        }

        DownloadBatch {
            rx,
            expected,
            received: 0,
            workers,
        }
    }
}

/// Results of one [`DownloadCoordinator::fetch_all`] call
pub struct DownloadBatch {
    rx: mpsc::UnboundedReceiver<Result<CompletionRecord, FetchError>>,
    expected: usize,
    received: usize,
    workers: Vec<JoinHandle<()>>,
}

impl DownloadBatch {
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Next finished download in arrival order, `None` once all are in
    pub async fn next(&mut self) -> Option<Result<CompletionRecord, FetchError>> {
        if self.received >= self.expected {
            return None;
        }

        match self.rx.recv().await {
            Some(result) => {
                self.received += 1;
                Some(result)
            }
            None => {
                // Every sender is gone but results are missing: a worker panicked.
                let err = FetchError::Incomplete {
                    expected: self.expected,
                    received: self.received,
                };
                self.received = self.expected;
                Some(Err(err))
            }
        }
    }

    /// Waits for every scheduled download, then prints one timing line per
    /// success, fastest first
    ///
    /// Returns the first failure after the whole batch has drained, so no
    /// worker is still writing into the work directory when the caller
    /// moves on. An empty batch returns immediately.
    pub async fn report(mut self) -> Result<DownloadReport, FetchError> {
        let mut queue = CompletionQueue::new();
        let mut first_error = None;

        while let Some(result) = self.next().await {
            match result {
                Ok(record) => queue.push(record),
                Err(err) => {
                    error!(error = %err, "Download failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        let mut records = Vec::with_capacity(queue.len());
        while let Some(record) = queue.pop() {
            println!("{}", record.report_line());
            records.push(record);
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(DownloadReport { records }),
        }
    }
}

impl Drop for DownloadBatch {
    fn drop(&mut self) {
        if self.received < self.expected {
            for worker in &self.workers {
                worker.abort();
            }
        }
    }
}
