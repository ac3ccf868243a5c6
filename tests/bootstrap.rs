use prompt_fn::bootstrap::{ensure_model_present, ensure_models_present, Fetcher};
use prompt_fn::model::catalog::{ModelEntry, MODELS};
use prompt_fn::BootstrapError;
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::Path;

/// Writes a small placeholder file in place of a download.
#[derive(Default)]
struct WritingFetcher {
    fetched: RefCell<Vec<&'static str>>,
}

impl Fetcher for WritingFetcher {
    fn fetch(&self, entry: &ModelEntry, dir: &Path) -> Result<(), BootstrapError> {
        self.fetched.borrow_mut().push(entry.file_name);
        fs::write(entry.path_in(dir), b"GGUF").unwrap();
        Ok(())
    }
}

/// Fails the test if it is ever asked to fetch.
struct NeverFetch;

impl Fetcher for NeverFetch {
    fn fetch(&self, entry: &ModelEntry, _dir: &Path) -> Result<(), BootstrapError> {
        panic!("unexpected fetch of {}", entry.file_name);
    }
}

struct MissingTool;

impl Fetcher for MissingTool {
    fn fetch(&self, _entry: &ModelEntry, _dir: &Path) -> Result<(), BootstrapError> {
        Err(BootstrapError::ToolUnavailable {
            tool: "wget".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        })
    }
}

/// Reports success without producing a file.
struct SilentNoop;

impl Fetcher for SilentNoop {
    fn fetch(&self, _entry: &ModelEntry, _dir: &Path) -> Result<(), BootstrapError> {
        Ok(())
    }
}

fn listing(dir: &Path) -> Vec<(String, u64)> {
    let mut v: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            (e.file_name().to_string_lossy().into_owned(), e.metadata().unwrap().len())
        })
        .collect();
    v.sort();
    v
}

#[test]
fn fetches_every_missing_model() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = WritingFetcher::default();
    let report = ensure_models_present(dir.path(), &fetcher).unwrap();

    assert_eq!(report.fetched.len(), MODELS.len());
    assert!(report.present.is_empty());
    assert_eq!(fetcher.fetched.borrow().len(), MODELS.len());
    for m in MODELS {
        assert!(m.path_in(dir.path()).exists());
    }
}

#[test]
fn second_run_fetches_nothing_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    ensure_models_present(dir.path(), &WritingFetcher::default()).unwrap();
    let before = listing(dir.path());

    let report = ensure_models_present(dir.path(), &NeverFetch).unwrap();
    assert!(report.fetched.is_empty());
    assert_eq!(report.present.len(), MODELS.len());
    assert_eq!(listing(dir.path()), before);
}

#[test]
fn only_missing_models_are_fetched() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(MODELS[1].path_in(dir.path()), b"partial").unwrap();

    let fetcher = WritingFetcher::default();
    let report = ensure_models_present(dir.path(), &fetcher).unwrap();
    assert_eq!(report.present, vec![MODELS[1].path_in(dir.path())]);
    assert!(!fetcher.fetched.borrow().contains(&MODELS[1].file_name));
    // presence is by name only
    assert_eq!(fs::read(MODELS[1].path_in(dir.path())).unwrap(), b"partial");
}

#[test]
fn unavailable_tool_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = ensure_models_present(dir.path(), &MissingTool).unwrap_err();
    assert!(matches!(err, BootstrapError::ToolUnavailable { .. }));
    assert!(listing(dir.path()).is_empty());
}

#[test]
fn success_without_file_is_not_silent() {
    let dir = tempfile::tempdir().unwrap();
    let err = ensure_model_present(dir.path(), &MODELS[0], &SilentNoop).unwrap_err();
    assert!(matches!(err, BootstrapError::FetchFailed { .. }), "{err}");
}

#[test]
fn creates_missing_directory() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("models");
    let fetched = ensure_model_present(&dir, &MODELS[0], &WritingFetcher::default()).unwrap();
    assert!(fetched);
    assert!(MODELS[0].path_in(&dir).exists());
}

#[cfg(feature = "llama")]
#[test]
fn bootstrap_and_load_fetches_then_reports_unloadable_model() {
    use prompt_fn::{PromptConfig, PromptError, PromptFunction};

    let dir = tempfile::tempdir().unwrap();
    let config = PromptConfig { models_dir: dir.path().to_path_buf(), ..Default::default() };
    let fetcher = WritingFetcher::default();

    let err = PromptFunction::bootstrap_and_load("x", 0, &config, &fetcher).err().unwrap();

    assert_eq!(*fetcher.fetched.borrow(), [MODELS[0].file_name]);
    match err {
        PromptError::ModelLoad { path, .. } => assert_eq!(path, MODELS[0].path_in(dir.path())),
        other => panic!("expected a model load failure, got {other}"),
    }
}
