use std::path::{Path, PathBuf};

use starling_diagnostic::sources::{self, Cached, Sources as _};
use starling_utils::declare_key_type;
use starling_utils::keyvec::KeyVec;

declare_key_type! {
    #[derive(serde::Serialize, PartialOrd, Ord)]
    pub struct SourceId;
}

/// All source files known to a session.
#[derive(Default, Debug, Clone)]
pub struct SourceMap {
    inner: KeyVec<SourceId, Cached<Source>>,
}

#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub path: Option<PathBuf>,
    pub text: String,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            text: text.into(),
        }
    }

    pub fn with_path(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
            text: text.into(),
        }
    }
}

impl SourceMap {
    pub fn insert(&mut self, source: Source) -> SourceId {
        self.inner.insert(Cached::new(source))
    }

    #[allow(clippy::missing_panics_doc)]
    pub fn insert_and_get(&mut self, source: Source) -> (SourceId, &Cached<Source>) {
        let id = self.insert(source);
        (id, &self.inner[id])
    }

    pub fn get(&self, id: SourceId) -> Option<&Cached<Source>> {
        self.get_source(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &Cached<Source>)> {
        self.inner.iter_keys()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl sources::Sources for SourceMap {
    type SourceId = SourceId;
    type Source = Source;

    fn get_source(&self, id: Self::SourceId) -> Option<&Cached<Self::Source>> {
        self.inner.get(id)
    }
}

impl sources::Source for Source {
    fn name_str(&self) -> &str {
        &self.name
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn source_str(&self) -> &str {
        &self.text
    }
}
