use std::collections::HashMap;
use std::path::PathBuf;

use super::domain::FormKind;

/// Where blank form templates come from. Each fetch returns a fresh copy of the bytes so
/// concurrent generations never share a document.
pub trait TemplateSource: Send + Sync {
    fn fetch(&self, kind: FormKind) -> Result<Vec<u8>, TemplateError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("{} template not found at {}", .kind.label(), .path.display())]
    NotFound { kind: FormKind, path: PathBuf },
    #[error("failed to read {} template at {}: {source}", .kind.label(), .path.display())]
    Io {
        kind: FormKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no {} template registered", .0.label())]
    Unregistered(FormKind),
}

/// Reads templates from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryTemplateSource {
    dir: PathBuf,
    files: HashMap<FormKind, String>,
}

impl DirectoryTemplateSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let files = [FormKind::I9, FormKind::W4]
            .into_iter()
            .map(|kind| (kind, kind.default_template_file().to_string()))
            .collect();
        Self {
            dir: dir.into(),
            files,
        }
    }

    pub fn with_file(mut self, kind: FormKind, file: impl Into<String>) -> Self {
        self.files.insert(kind, file.into());
        self
    }

    pub fn path_for(&self, kind: FormKind) -> PathBuf {
        let file = self
            .files
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_template_file());
        self.dir.join(file)
    }
}

impl TemplateSource for DirectoryTemplateSource {
    fn fetch(&self, kind: FormKind) -> Result<Vec<u8>, TemplateError> {
        let path = self.path_for(kind);
        std::fs::read(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => TemplateError::NotFound { kind, path },
            _ => TemplateError::Io { kind, path, source },
        })
    }
}

/// Serves templates already held in memory, e.g. embedded assets or test fixtures.
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateSource {
    templates: HashMap<FormKind, Vec<u8>>,
}

impl StaticTemplateSource {
    pub fn with_template(mut self, kind: FormKind, bytes: Vec<u8>) -> Self {
        self.templates.insert(kind, bytes);
        self
    }
}

impl TemplateSource for StaticTemplateSource {
    fn fetch(&self, kind: FormKind) -> Result<Vec<u8>, TemplateError> {
        self.templates
            .get(&kind)
            .cloned()
            .ok_or(TemplateError::Unregistered(kind))
    }
}
