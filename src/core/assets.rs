//=========================================================================
// Assets
//
// Image batches and the shared resource cache.
//
// An `AssetBatch` is every PNG in one directory, decoded to RGBA and
// keyed by file stem. The `ResourceCache` holds named batches that
// outlive any single scene: scene types load their groups once through
// it and every later instance reuses them.
//
// Loading and unloading are both expressed as `LoadingSequence`s so a
// loading screen can report progress file by file. A group only counts
// as loaded once its sequence has run to completion.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

//=== External Dependencies ===============================================

use image::RgbaImage;
use log::{debug, warn};
use rand::seq::IteratorRandom;
use rand::Rng;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;
use crate::core::scene::{LoadingSequence, Progress};

//=== AssetBatch ==========================================================

/// Decoded images from one directory, keyed by file stem.
#[derive(Debug, Clone, Default)]
pub struct AssetBatch {
    images: BTreeMap<String, RgbaImage>,
}

impl AssetBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists the PNG files directly inside `dir`, sorted by name.
    ///
    /// A missing directory is not an error: it yields no files and logs a
    /// warning, so games run without their art.
    pub fn scan(dir: &Path) -> Result<Vec<PathBuf>, SceneError> {
        if !dir.is_dir() {
            warn!(target: "assets", "asset directory {} not found", dir.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_png = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if path.is_file() && is_png {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Decodes one image file, returning its stem and pixels.
    pub fn decode(path: &Path) -> Result<(String, RgbaImage), SceneError> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| SceneError::config(format!("unusable asset name {}", path.display())))?
            .to_owned();
        let image = image::open(path)?.to_rgba8();
        Ok((stem, image))
    }

    /// Loads every PNG of `dir` in one go.
    pub fn load_dir(dir: &Path) -> Result<Self, SceneError> {
        let mut batch = Self::new();
        for path in Self::scan(dir)? {
            let (stem, image) = Self::decode(&path)?;
            batch.insert(stem, image);
        }
        Ok(batch)
    }

    pub fn insert(&mut self, name: impl Into<String>, image: RgbaImage) {
        self.images.insert(name.into(), image);
    }

    pub fn get(&self, name: &str) -> Option<&RgbaImage> {
        self.images.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Picks one image uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&RgbaImage> {
        self.images.values().choose(rng)
    }
}

//=== ResourceCache =======================================================

/// Shared handle to named asset batches.
///
/// Cloning the handle shares the same storage.
#[derive(Debug, Clone, Default)]
pub struct ResourceCache {
    groups: Rc<RefCell<HashMap<String, AssetBatch>>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the work that loads `dir` as group `name`.
    ///
    /// One progress message is reported per decoded file. The group is
    /// published when the final item runs. A group that is already
    /// loaded yields an empty sequence.
    pub fn load(&self, name: &str, dir: &Path) -> Result<LoadingSequence<()>, SceneError> {
        if self.is_loaded(name) {
            debug!(target: "assets", "group `{}` already loaded", name);
            return Ok(LoadingSequence::empty());
        }

        let staged = Rc::new(RefCell::new(AssetBatch::new()));
        let mut sequence = LoadingSequence::new();

        for path in AssetBatch::scan(dir)? {
            let staged = Rc::clone(&staged);
            let group = name.to_owned();
            sequence.push(move |_: &mut ()| {
                let (stem, image) = AssetBatch::decode(&path)?;
                let message = format!("Loaded {}/{}", group, stem);
                staged.borrow_mut().insert(stem, image);
                Ok(Progress::Message(message))
            });
        }

        let groups = Rc::clone(&self.groups);
        let group = name.to_owned();
        sequence.push(move |_: &mut ()| {
            let batch = staged.take();
            debug!(target: "assets", "group `{}` ready ({} images)", group, batch.len());
            groups.borrow_mut().insert(group, batch);
            Ok(Progress::Tick)
        });

        Ok(sequence)
    }

    /// Builds the work that releases group `name`.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotLoaded`] if the group is not loaded.
    pub fn unload(&self, name: &str) -> Result<LoadingSequence<()>, SceneError> {
        if !self.is_loaded(name) {
            return Err(SceneError::NotLoaded(name.to_owned()));
        }

        let groups = Rc::clone(&self.groups);
        let group = name.to_owned();
        Ok(LoadingSequence::new().step(move |_: &mut ()| {
            groups.borrow_mut().remove(&group);
            Ok(Progress::Message(format!("Unloaded {}", group)))
        }))
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.groups.borrow().contains_key(name)
    }

    /// Runs `f` against group `name`, if loaded.
    pub fn with_group<R>(&self, name: &str, f: impl FnOnce(&AssetBatch) -> R) -> Option<R> {
        self.groups.borrow().get(name).map(f)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, rgba: [u8; 4]) {
        RgbaImage::from_pixel(3, 2, image::Rgba(rgba))
            .save(dir.join(name))
            .unwrap();
    }

    fn asset_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "b_planet.png", [0, 0, 255, 255]);
        write_png(dir.path(), "a_planet.png", [255, 0, 0, 255]);
        fs::write(dir.path().join("notes.txt"), "not an image").unwrap();
        dir
    }

    //=====================================================================
    // AssetBatch
    //=====================================================================

    #[test]
    fn scan_lists_only_pngs_in_order() {
        let dir = asset_dir();
        let files = AssetBatch::scan(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, ["a_planet.png", "b_planet.png"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let batch = AssetBatch::load_dir(&dir.path().join("nowhere")).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn load_dir_keys_by_stem() {
        let dir = asset_dir();
        let batch = AssetBatch::load_dir(dir.path()).unwrap();
        assert_eq!(batch.names().collect::<Vec<_>>(), ["a_planet", "b_planet"]);
        assert_eq!(batch.get("a_planet").unwrap().get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn corrupt_image_is_an_asset_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.png"), b"definitely not png").unwrap();
        assert!(matches!(
            AssetBatch::load_dir(dir.path()),
            Err(SceneError::Asset(_))
        ));
    }

    #[test]
    fn choose_picks_a_member() {
        let dir = asset_dir();
        let batch = AssetBatch::load_dir(dir.path()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let picked = batch.choose(&mut rng).unwrap();
        assert_eq!(picked.dimensions(), (3, 2));
        assert!(AssetBatch::new().choose(&mut rng).is_none());
    }

    //=====================================================================
    // ResourceCache
    //=====================================================================

    #[test]
    fn load_reports_each_file_then_publishes() {
        let dir = asset_dir();
        let cache = ResourceCache::new();
        let mut seq = cache.load("planets", dir.path()).unwrap();
        assert_eq!(seq.total(), 3);

        assert_eq!(
            seq.advance(&mut ()).unwrap().unwrap(),
            Progress::Message("Loaded planets/a_planet".into())
        );
        seq.advance(&mut ()).unwrap().unwrap();
        assert!(!cache.is_loaded("planets"));

        seq.advance(&mut ()).unwrap().unwrap();
        assert!(cache.is_loaded("planets"));
        assert_eq!(cache.with_group("planets", AssetBatch::len), Some(2));
    }

    #[test]
    fn loading_twice_is_empty() {
        let dir = asset_dir();
        let cache = ResourceCache::new();
        cache.load("planets", dir.path()).unwrap().drain(&mut ()).unwrap();

        let again = cache.load("planets", dir.path()).unwrap();
        assert_eq!(again.total(), 0);
    }

    #[test]
    fn clones_share_storage() {
        let dir = asset_dir();
        let cache = ResourceCache::new();
        let shared = cache.clone();
        cache.load("planets", dir.path()).unwrap().drain(&mut ()).unwrap();
        assert!(shared.is_loaded("planets"));
    }

    #[test]
    fn unload_requires_loaded_group() {
        let cache = ResourceCache::new();
        assert!(matches!(
            cache.unload("planets"),
            Err(SceneError::NotLoaded(ref name)) if name == "planets"
        ));
    }

    #[test]
    fn unload_releases_group() {
        let dir = asset_dir();
        let cache = ResourceCache::new();
        cache.load("planets", dir.path()).unwrap().drain(&mut ()).unwrap();

        let reports = cache.unload("planets").unwrap().drain(&mut ()).unwrap();
        assert_eq!(reports, [Progress::Message("Unloaded planets".into())]);
        assert!(!cache.is_loaded("planets"));
    }
}
