use crate::error::PromptError;
use std::path::{Path, PathBuf};

/// One selectable model variant: the local file name and where to get it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    pub file_name: &'static str,
    pub url: &'static str,
}

impl ModelEntry {
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name)
    }
}

pub const MODELS: &[ModelEntry] = &[
    ModelEntry {
        file_name: "qwen2.5-0.5b-instruct-q2_k.gguf",
        url: "https://huggingface.co/Qwen/Qwen2.5-0.5B-Instruct-GGUF/resolve/main/qwen2.5-0.5b-instruct-q2_k.gguf",
    },
    ModelEntry {
        file_name: "qwen2.5-1.5b-instruct-q2_k.gguf",
        url: "https://huggingface.co/Qwen/Qwen2.5-1.5B-Instruct-GGUF/resolve/main/qwen2.5-1.5b-instruct-q2_k.gguf",
    },
    ModelEntry {
        file_name: "qwen2.5-3b-instruct-q2_k.gguf",
        url: "https://huggingface.co/Qwen/Qwen2.5-3B-Instruct-GGUF/resolve/main/qwen2.5-3b-instruct-q2_k.gguf",
    },
    ModelEntry {
        file_name: "qwen2.5-7b-instruct-q2_k.gguf",
        url: "https://huggingface.co/Qwen/Qwen2.5-7B-Instruct-GGUF/resolve/main/qwen2.5-7b-instruct-q2_k.gguf",
    },
];

pub fn by_index(index: usize) -> Result<&'static ModelEntry, PromptError> {
    MODELS.get(index).ok_or(PromptError::UnknownModel {
        index,
        available: MODELS.len(),
    })
}

pub fn by_name(name: &str) -> Result<&'static ModelEntry, PromptError> {
    MODELS
        .iter()
        .find(|m| m.file_name == name)
        .ok_or_else(|| PromptError::UnknownModelName(name.to_string()))
}
