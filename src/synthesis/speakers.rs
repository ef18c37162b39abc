use log::debug;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use crate::app_config::SynthesisConfig;
use crate::errors::PipelineError;

/// Speaker id -> reference sample file, as configured
#[derive(Debug, Clone, Default)]
pub struct SpeakerRegistry {
    reference_dir: PathBuf,
    files: BTreeMap<String, String>,
}

impl SpeakerRegistry {
    pub fn new(reference_dir: impl Into<PathBuf>, files: BTreeMap<String, String>) -> Self {
        Self {
            reference_dir: reference_dir.into(),
            files,
        }
    }

    pub fn from_config(config: &SynthesisConfig) -> Self {
        Self::new(config.reference_dir.clone(), config.speakers.clone())
    }

    /// Registered path for a speaker, without touching the file system
    pub fn path_for(&self, speaker_id: &str) -> Option<PathBuf> {
        self.files.get(speaker_id).map(|file| self.reference_dir.join(file))
    }

    pub fn contains(&self, speaker_id: &str) -> bool {
        self.files.contains_key(speaker_id)
    }
}

/// Resolved reference paths for one run.
///
/// Append-only: once a speaker is resolved its path is reused without
/// re-checking the file.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    entries: RwLock<HashMap<String, PathBuf>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, speaker_id: &str) -> Option<PathBuf> {
        self.entries.read().get(speaker_id).cloned()
    }

    fn insert(&self, speaker_id: &str, path: PathBuf) -> PathBuf {
        self.entries
            .write()
            .entry(speaker_id.to_string())
            .or_insert(path)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Registry lookups memoized through a run-scoped cache
#[derive(Debug, Clone)]
pub struct SpeakerReferences {
    registry: SpeakerRegistry,
    cache: Arc<ReferenceCache>,
}

impl SpeakerReferences {
    pub fn new(registry: SpeakerRegistry) -> Self {
        Self::with_cache(registry, Arc::new(ReferenceCache::new()))
    }

    pub fn with_cache(registry: SpeakerRegistry, cache: Arc<ReferenceCache>) -> Self {
        Self { registry, cache }
    }

    pub fn cache(&self) -> &Arc<ReferenceCache> {
        &self.cache
    }

    /// Resolve the reference sample for a speaker
    pub fn resolve(&self, speaker_id: &str) -> Result<PathBuf, PipelineError> {
        if let Some(path) = self.cache.get(speaker_id) {
            return Ok(path);
        }

        let path = self.registry
            .path_for(speaker_id)
            .ok_or_else(|| PipelineError::UnknownSpeaker(speaker_id.to_string()))?;

        if !path.exists() {
            return Err(PipelineError::ReferenceMissing {
                speaker: speaker_id.to_string(),
                path,
            });
        }

        debug!("Resolved reference sample for {}: {:?}", speaker_id, path);
        Ok(self.cache.insert(speaker_id, path))
    }
}
