use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use super::deserialize::deserialize;
use super::model::Dataset;

const CHUNK_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Cause of a failed read, kept next to `LoadState::Error` for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("loader worker stopped before reporting a result")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// Load state machine
// ---------------------------------------------------------------------------

/// Progress of one file-read lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotStarted,
    Loading,
    Loaded,
    Aborted,
    Error,
}

/// What the worker thread reports back.
#[derive(Debug)]
pub enum LoadEvent {
    Started,
    Loaded(String),
    Aborted,
    Failed(LoadError),
}

impl LoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Aborted | LoadState::Error)
    }

    /// Next state after `event`. Terminal states absorb everything.
    pub fn on_event(self, event: &LoadEvent) -> LoadState {
        if self.is_terminal() {
            return self;
        }
        match event {
            LoadEvent::Started => LoadState::Loading,
            LoadEvent::Loaded(_) => LoadState::Loaded,
            LoadEvent::Aborted => LoadState::Aborted,
            LoadEvent::Failed(_) => LoadState::Error,
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Shared flag the caller raises to cancel an outstanding read.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Something that yields the full text of a file.
///
/// `read_text` returns `Ok(None)` when it stopped because of `abort`.
pub trait TextSource: Send + 'static {
    fn name(&self) -> String;
    fn read_text(&mut self, abort: &AbortSignal) -> Result<Option<String>, LoadError>;
}

/// A file on disk, read in chunks so an abort takes effect mid-read.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextSource for FileSource {
    fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn read_text(&mut self, abort: &AbortSignal) -> Result<Option<String>, LoadError> {
        let io_err = |source| LoadError::Io {
            name: self.path.display().to_string(),
            source,
        };
        let mut file = File::open(&self.path).map_err(io_err)?;
        let mut bytes = Vec::new();
        let mut chunk = vec![0u8; CHUNK_SIZE];

        loop {
            if abort.is_raised() {
                return Ok(None);
            }
            let n = match file.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_err(e)),
            };
            bytes.extend_from_slice(&chunk[..n]);
        }

        Ok(Some(decode(bytes)))
    }
}

/// In-memory bytes, e.g. a file dropped onto the window without a path.
pub struct BytesSource {
    name: String,
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl TextSource for BytesSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn read_text(&mut self, abort: &AbortSignal) -> Result<Option<String>, LoadError> {
        if abort.is_raised() {
            return Ok(None);
        }
        Ok(Some(decode(std::mem::take(&mut self.bytes))))
    }
}

/// UTF-8 with replacement characters for invalid sequences.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

// ---------------------------------------------------------------------------
// AsyncFileLoader
// ---------------------------------------------------------------------------

/// Reads one source on a worker thread and deserializes it once complete.
///
/// One instance covers exactly one read; `start` consumes its source.
pub struct AsyncFileLoader {
    name: String,
    state: LoadState,
    dataset: Dataset,
    error: Option<LoadError>,
    abort: AbortSignal,
    events: Receiver<LoadEvent>,
}

impl AsyncFileLoader {
    /// Spawn the worker thread and return the loader observing it.
    pub fn start<S: TextSource>(mut source: S) -> Self {
        let name = source.name();
        let abort = AbortSignal::default();
        let (tx, rx) = mpsc::channel();

        let worker_abort = abort.clone();
        let spawned = thread::Builder::new()
            .name(format!("load {name}"))
            .spawn(move || run_worker(&mut source, &worker_abort, &tx));

        let mut loader = Self {
            name,
            state: LoadState::NotStarted,
            dataset: Vec::new(),
            error: None,
            abort,
            events: rx,
        };
        match spawned {
            Ok(_) => log::debug!("started loading {}", loader.name),
            Err(source) => {
                let name = loader.name.clone();
                loader.apply(LoadEvent::Failed(LoadError::Io { name, source }));
            }
        }
        loader
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    /// Ask the worker to stop. No effect once a terminal state is reached.
    pub fn abort(&self) {
        if !self.state.is_terminal() {
            log::debug!("abort requested for {}", self.name);
            self.abort.raise();
        }
    }

    /// Apply every pending event without blocking. Returns the current state.
    pub fn poll(&mut self) -> LoadState {
        while !self.state.is_terminal() {
            match self.events.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.apply(LoadEvent::Failed(LoadError::Disconnected))
                }
            }
        }
        self.state
    }

    fn apply(&mut self, event: LoadEvent) {
        let next = self.state.on_event(&event);
        if next == self.state {
            return;
        }
        self.state = next;

        match event {
            LoadEvent::Started => {}
            LoadEvent::Loaded(text) => {
                self.dataset = deserialize(&text);
                log::info!("loaded {} rows from {}", self.dataset.len(), self.name);
            }
            LoadEvent::Aborted => {
                log::warn!("loading {} was aborted", self.name);
            }
            LoadEvent::Failed(e) => {
                log::error!("loading {} failed: {e}", self.name);
                self.error = Some(e);
            }
        }
    }
}

fn run_worker<S: TextSource>(source: &mut S, abort: &AbortSignal, tx: &Sender<LoadEvent>) {
    // A closed channel only means the loader was dropped.
    let _ = tx.send(LoadEvent::Started);

    let event = match source.read_text(abort) {
        Ok(Some(_)) if abort.is_raised() => LoadEvent::Aborted,
        Ok(Some(text)) => LoadEvent::Loaded(text),
        Ok(None) => LoadEvent::Aborted,
        Err(e) => LoadEvent::Failed(e),
    };
    let _ = tx.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::mpsc::SyncSender;

    use crate::data::model::CellValue;

    /// Blocks inside `read_text` until the test releases it.
    struct GatedSource {
        entered: SyncSender<()>,
        release: Receiver<()>,
        text: &'static str,
    }

    impl TextSource for GatedSource {
        fn name(&self) -> String {
            "gated.csv".to_string()
        }

        fn read_text(&mut self, _abort: &AbortSignal) -> Result<Option<String>, LoadError> {
            let _ = self.entered.send(());
            let _ = self.release.recv();
            Ok(Some(self.text.to_string()))
        }
    }

    /// Poll until the worker reports a terminal state.
    fn settle(mut loader: AsyncFileLoader) -> AsyncFileLoader {
        while !loader.poll().is_terminal() {
            thread::yield_now();
        }
        loader
    }

    fn gated(text: &'static str) -> (GatedSource, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::sync_channel(1);
        let (release_tx, release_rx) = mpsc::channel();
        let source = GatedSource {
            entered: entered_tx,
            release: release_rx,
            text,
        };
        (source, entered_rx, release_tx)
    }

    #[test]
    fn transitions_are_one_directional() {
        let s = LoadState::NotStarted.on_event(&LoadEvent::Started);
        assert_eq!(s, LoadState::Loading);
        let s = s.on_event(&LoadEvent::Aborted);
        assert_eq!(s, LoadState::Aborted);
        assert_eq!(s.on_event(&LoadEvent::Loaded(String::new())), LoadState::Aborted);
        assert_eq!(s.on_event(&LoadEvent::Started), LoadState::Aborted);

        let err = LoadState::Loading.on_event(&LoadEvent::Failed(LoadError::Disconnected));
        assert_eq!(err, LoadState::Error);
        assert_eq!(err.on_event(&LoadEvent::Started), LoadState::Error);
    }

    #[test]
    fn loads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "KP,X,Y,Z\n0,1,2,3\n\n1,4,5,6\n").unwrap();

        let loader = settle(AsyncFileLoader::start(FileSource::new(file.path())));
        assert_eq!(loader.state, LoadState::Loaded);
        assert!(loader.error().is_none());
        assert_eq!(loader.dataset().len(), 2);
        assert_eq!(loader.dataset()[1].get("X"), Some(&CellValue::Number(4.0)));
    }

    #[test]
    fn empty_file_loads_as_empty_dataset() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let loader = settle(AsyncFileLoader::start(FileSource::new(file.path())));
        assert_eq!(loader.state, LoadState::Loaded);
        assert!(loader.dataset().is_empty());
    }

    #[test]
    fn missing_file_reports_error_with_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let loader = settle(AsyncFileLoader::start(FileSource::new(dir.path().join("nope.csv"))));
        assert_eq!(loader.state, LoadState::Error);
        assert!(loader.dataset().is_empty());
        assert!(matches!(loader.error(), Some(LoadError::Io { .. })));
    }

    #[test]
    fn file_source_stops_reading_once_aborted() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![b'a'; CHUNK_SIZE * 2 + 10]).unwrap();

        let abort = AbortSignal::default();
        abort.raise();
        let mut source = FileSource::new(file.path());
        assert!(matches!(source.read_text(&abort), Ok(None)));

        let text = source.read_text(&AbortSignal::default()).unwrap();
        assert_eq!(text.map(|t| t.len()), Some(CHUNK_SIZE * 2 + 10));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let source = BytesSource::new("bytes.csv", b"A,B\n\xff,2\n".to_vec());
        let loader = settle(AsyncFileLoader::start(source));
        assert_eq!(loader.state, LoadState::Loaded);
        assert_eq!(
            loader.dataset()[0].get("A"),
            Some(&CellValue::Text("\u{FFFD}".into()))
        );
    }

    #[test]
    fn abort_during_loading_yields_empty_dataset() {
        let (source, entered, release) = gated("A\n1\n");
        let mut loader = AsyncFileLoader::start(source);

        entered.recv().unwrap();
        assert_eq!(loader.poll(), LoadState::Loading);

        loader.abort();
        release.send(()).unwrap();

        let loader = settle(loader);
        assert_eq!(loader.state, LoadState::Aborted);
        assert!(loader.dataset().is_empty());
        assert!(loader.error().is_none());
    }

    #[test]
    fn poll_does_not_block_before_completion() {
        let (source, entered, release) = gated("A\n1\n2\n");
        let mut loader = AsyncFileLoader::start(source);

        entered.recv().unwrap();
        assert!(!loader.poll().is_terminal());
        assert!(loader.dataset().is_empty());

        release.send(()).unwrap();
        while !loader.poll().is_terminal() {
            thread::yield_now();
        }
        assert_eq!(loader.state, LoadState::Loaded);
        assert_eq!(loader.dataset().len(), 2);
    }

    #[test]
    fn abort_after_completion_has_no_effect() {
        let source = BytesSource::new("done.csv", "A\n1\n");
        let mut loader = AsyncFileLoader::start(source);
        while !loader.poll().is_terminal() {
            thread::yield_now();
        }
        loader.abort();
        assert_eq!(loader.poll(), LoadState::Loaded);
        assert_eq!(loader.dataset().len(), 1);
    }
}
