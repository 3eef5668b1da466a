use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::spool::format::{compact_json, JsonLayout};
use crate::utils::constants::{STAGE_COMFY, STAGE_META, STAGE_TMAX, STAGE_TMIN, STAGE_YEAR};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Meta,
    Tmax,
    Tmin,
    Year,
    Comfy,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Meta,
        Stage::Tmax,
        Stage::Tmin,
        Stage::Year,
        Stage::Comfy,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Stage::Meta => STAGE_META,
            Stage::Tmax => STAGE_TMAX,
            Stage::Tmin => STAGE_TMIN,
            Stage::Year => STAGE_YEAR,
            Stage::Comfy => STAGE_COMFY,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Filenames present in every stage at the moment the snapshot was taken
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    stages: HashMap<Stage, BTreeSet<String>>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, stage: Stage, filename: &str) -> bool {
        self.stages
            .get(&stage)
            .is_some_and(|names| names.contains(filename))
    }

    pub fn len(&self, stage: Stage) -> usize {
        self.stages.get(&stage).map_or(0, BTreeSet::len)
    }
}

/// Staged on-disk cache keyed by station filename.
///
/// Each stage is a directory holding one document per station, named exactly like
/// the source file. Membership tests go against a snapshot taken once when the
/// cache is opened, so concurrent workers must be given disjoint filenames.
pub struct SpoolCache {
    root: PathBuf,
    layout: JsonLayout,
    snapshot: Snapshot,
}

impl SpoolCache {
    /// Open the spool at `root`, creating the stage directories.
    ///
    /// With `overwrite` the snapshot is empty, so every station is reprocessed.
    pub fn open(root: &Path, layout: JsonLayout, overwrite: bool) -> Result<Self> {
        let mut cache = Self {
            root: root.to_path_buf(),
            layout,
            snapshot: Snapshot::empty(),
        };
        cache.init()?;
        cache.snapshot = cache.snapshot(overwrite)?;
        debug!(
            "Opened spool at {} (meta={}, year={})",
            root.display(),
            cache.snapshot.len(Stage::Meta),
            cache.snapshot.len(Stage::Year)
        );
        Ok(cache)
    }

    pub fn from_settings(settings: &Settings, overwrite: bool) -> Result<Self> {
        Self::open(
            &settings.spool_dir,
            JsonLayout::new(settings.json_width, settings.json_indent),
            overwrite,
        )
    }

    fn init(&self) -> Result<()> {
        for stage in Stage::ALL {
            fs::create_dir_all(self.stage_dir(stage))?;
        }
        Ok(())
    }

    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    pub fn path(&self, stage: Stage, filename: &str) -> PathBuf {
        self.stage_dir(stage).join(filename)
    }

    /// Membership in the snapshot taken when the cache was opened
    pub fn exists(&self, stage: Stage, filename: &str) -> bool {
        self.snapshot.contains(stage, filename)
    }

    /// List every stage directory, or return empty sets when `empty` is set
    pub fn snapshot(&self, empty: bool) -> Result<Snapshot> {
        if empty {
            return Ok(Snapshot::empty());
        }

        let mut stages = HashMap::new();
        for stage in Stage::ALL {
            let names: BTreeSet<String> = self.list(stage)?.into_iter().collect();
            stages.insert(stage, names);
        }
        Ok(Snapshot { stages })
    }

    /// Filenames currently in a stage, sorted. Hidden in-flight temp files are skipped.
    pub fn list(&self, stage: Stage) -> Result<Vec<String>> {
        let dir = self.stage_dir(stage);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Serialize `payload` as compact JSON and write it atomically
    pub fn write<T: Serialize>(&self, stage: Stage, filename: &str, payload: &T) -> Result<()> {
        let mut text = compact_json(payload, self.layout)?;
        text.push('\n');
        self.write_bytes(stage, filename, text.as_bytes())
    }

    /// Write raw bytes through a temp file in the stage directory, then rename into place
    pub fn write_bytes(&self, stage: Stage, filename: &str, bytes: &[u8]) -> Result<()> {
        let spool_error = |source: std::io::Error| ProcessingError::SpoolWrite {
            stage: stage.to_string(),
            filename: filename.to_string(),
            source,
        };

        let dir = self.stage_dir(stage);
        let mut temp = tempfile::Builder::new()
            .prefix(".tmp-")
            .tempfile_in(&dir)
            .map_err(spool_error)?;
        temp.write_all(bytes).map_err(spool_error)?;
        temp.as_file().sync_all().map_err(spool_error)?;
        persist(temp, &dir.join(filename)).map_err(spool_error)?;

        debug!("Spooled {}/{}", stage, filename);
        Ok(())
    }

    /// Delete one document; a document that is not there is not an error
    pub fn remove(&self, stage: Stage, filename: &str) -> Result<()> {
        match fs::remove_file(self.path(stage, filename)) {
            Ok(()) => {
                debug!("Removed {}/{}", stage, filename);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn read<T: DeserializeOwned>(&self, stage: Stage, filename: &str) -> Result<T> {
        let text = fs::read_to_string(self.path(stage, filename))?;
        Ok(serde_json::from_str(&text)?)
    }
}

fn persist(temp: NamedTempFile, dest: &Path) -> std::io::Result<()> {
    temp.persist(dest).map(|_| ()).map_err(|err| err.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_stage_dirs() -> Result<()> {
        let dir = TempDir::new()?;
        let spool = SpoolCache::open(dir.path(), JsonLayout::default(), false)?;

        for stage in Stage::ALL {
            assert!(spool.stage_dir(stage).is_dir(), "missing {stage}");
        }
        let snapshot = spool.snapshot(false)?;
        assert!(Stage::ALL.iter().all(|stage| snapshot.len(*stage) == 0));
        Ok(())
    }

    #[test]
    fn test_write_read_and_snapshot() -> Result<()> {
        let dir = TempDir::new()?;
        let spool = SpoolCache::open(dir.path(), JsonLayout::default(), false)?;

        spool.write(Stage::Meta, "USC00300023.csv", &json!({ "id": "USC00300023" }))?;
        let back: serde_json::Value = spool.read(Stage::Meta, "USC00300023.csv")?;
        assert_eq!(back["id"], "USC00300023");

        // The open-time snapshot does not see the new entry
        assert!(!spool.exists(Stage::Meta, "USC00300023.csv"));

        let reopened = SpoolCache::open(dir.path(), JsonLayout::default(), false)?;
        assert!(reopened.exists(Stage::Meta, "USC00300023.csv"));
        assert!(!reopened.exists(Stage::Year, "USC00300023.csv"));

        let forced = SpoolCache::open(dir.path(), JsonLayout::default(), true)?;
        assert!(!forced.exists(Stage::Meta, "USC00300023.csv"));
        Ok(())
    }

    #[test]
    fn test_list_skips_temp_files() -> Result<()> {
        let dir = TempDir::new()?;
        let spool = SpoolCache::open(dir.path(), JsonLayout::default(), false)?;

        fs::write(spool.stage_dir(Stage::Year).join(".tmp-abc123"), "partial")?;
        spool.write(Stage::Year, "B.csv", &json!(1))?;
        spool.write(Stage::Year, "A.csv", &json!(2))?;

        assert_eq!(spool.list(Stage::Year)?, vec!["A.csv", "B.csv"]);
        Ok(())
    }

    #[test]
    fn test_rewrite_replaces_whole_document() -> Result<()> {
        let dir = TempDir::new()?;
        let spool = SpoolCache::open(dir.path(), JsonLayout::default(), false)?;

        spool.write(Stage::Tmax, "X.csv", &json!({ "values": (0..100).collect::<Vec<u32>>() }))?;
        spool.write(Stage::Tmax, "X.csv", &json!({ "values": [1] }))?;

        let back: serde_json::Value = spool.read(Stage::Tmax, "X.csv")?;
        assert_eq!(back, json!({ "values": [1] }));
        assert_eq!(spool.list(Stage::Tmax)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_remove_is_idempotent() -> Result<()> {
        let dir = TempDir::new()?;
        let spool = SpoolCache::open(dir.path(), JsonLayout::default(), false)?;

        spool.write(Stage::Year, "X.csv", &json!(1))?;
        spool.remove(Stage::Year, "X.csv")?;
        spool.remove(Stage::Year, "X.csv")?;

        assert!(spool.list(Stage::Year)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_write_into_missing_stage_dir_fails() -> Result<()> {
        let dir = TempDir::new()?;
        let spool = SpoolCache::open(dir.path(), JsonLayout::default(), false)?;
        fs::remove_dir_all(spool.stage_dir(Stage::Tmin))?;

        let err = spool.write(Stage::Tmin, "X.csv", &json!(1)).unwrap_err();
        assert!(matches!(err, ProcessingError::SpoolWrite { .. }));
        Ok(())
    }
}
