use std::io;
use std::path::PathBuf;

/// Failures while making sure model files are on disk.
///
/// Every variant is a fatal precondition failure: callers are expected to
/// stop rather than continue without the model.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("fetch tool `{tool}` is unavailable: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("fetching {name} from {url} failed: {reason}")]
    FetchFailed {
        name: String,
        url: String,
        reason: String,
    },

    #[error("cannot prepare model directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures of a prompt function, from construction or invocation.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("model selector {index} out of range, {available} models available")]
    UnknownModel { index: usize, available: usize },

    #[error("unknown model name {0:?}")]
    UnknownModelName(String),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("failed to load model {path:?}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("token budget must be positive, got {0}")]
    InvalidBudget(i32),

    #[error("template layout must contain exactly one {{input}} slot")]
    InvalidTemplate,

    #[error("generation failed: {0}")]
    Generation(#[source] anyhow::Error),
}

pub type Result<T, E = PromptError> = std::result::Result<T, E>;
