//! The ConfigTree resolver
//!
//! A `ConfigTree` maps dotted paths such as `mcs.camera.exposure` onto a
//! directory of YAML files. Each dot is a directory level until a
//! `<name>.yaml` file is reached; the rest of the path indexes into that
//! file's content. Files are loaded on first use and cached per prefix.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::cache::{CacheEntry, NodeCache};
use crate::error::{Error, Result};
use crate::interpolation;
use crate::loader::{Loader, YamlLoader};
use crate::namespace::Namespace;
use crate::value::Value;

/// Options for constructing a [`ConfigTree`]
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Subdirectory of the root that every lookup starts from (e.g. an actor name)
    pub top_level: Option<String>,
    /// Persistent interpolation namespace
    pub namespace: Namespace,
}

/// A lazily-loaded tree of YAML configuration files
///
/// Loaded file content has placeholders substituted with the namespace in
/// effect when the file was read. A lookup that supplies an extra namespace
/// therefore flushes the cache before returning, so later lookups never see
/// content baked with that one-off namespace.
pub struct ConfigTree {
    root: PathBuf,
    options: TreeOptions,
    cache: NodeCache,
    loader: Box<dyn Loader>,
}

impl ConfigTree {
    /// Create a tree rooted at `root` with no top level and an empty namespace
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_options(root, TreeOptions::default())
    }

    pub fn with_options(root: impl Into<PathBuf>, options: TreeOptions) -> Self {
        Self {
            root: root.into(),
            options,
            cache: NodeCache::new(),
            loader: Box::new(YamlLoader),
        }
    }

    /// Replace the loader used to read files. Clears the cache.
    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Box::new(loader);
        self.flush();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn top_level(&self) -> Option<&str> {
        self.options.top_level.as_deref()
    }

    /// Directory that dotted paths are resolved against
    pub fn root_path(&self) -> PathBuf {
        match &self.options.top_level {
            Some(top) => self.root.join(top),
            None => self.root.clone(),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.options.namespace
    }

    /// Replace the persistent namespace. Clears the cache.
    pub fn set_namespace(&mut self, namespace: Namespace) {
        self.options.namespace = namespace;
        self.flush();
    }

    pub fn cache(&self) -> &NodeCache {
        &self.cache
    }

    /// Forget everything loaded so far; the next lookup reads from disk again.
    pub fn flush(&mut self) {
        if !self.cache.is_empty() {
            log::debug!("flushing {} cached config nodes", self.cache.len());
        }
        self.cache.clear();
    }

    /// Get the value at a dotted path using the persistent namespace.
    pub fn get(&mut self, path: &str) -> Result<Value> {
        let namespace = self.options.namespace.clone();
        self.lookup(path, &namespace)
    }

    /// Get the value at a dotted path with `extra` laid over the persistent
    /// namespace for this call only.
    ///
    /// Content cached under the persistent namespace is not reused when
    /// `extra` has entries, and the cache is flushed before returning whether
    /// or not the lookup succeeded.
    pub fn get_with(&mut self, path: &str, extra: &Namespace) -> Result<Value> {
        if !extra.is_empty() {
            self.flush();
        }
        let namespace = self.options.namespace.overlay(extra);
        let result = self.lookup(path, &namespace);
        self.flush();
        result
    }

    /// Get a string value
    pub fn get_string(&mut self, path: &str) -> Result<String> {
        match self.get(path)? {
            Value::String(s) => Ok(s),
            other => Err(Error::type_mismatch(path, "string", other.type_name())),
        }
    }

    /// Get an integer value
    pub fn get_i64(&mut self, path: &str) -> Result<i64> {
        let value = self.get(path)?;
        value
            .as_i64()
            .ok_or_else(|| Error::type_mismatch(path, "integer", value.type_name()))
    }

    /// Get a float value (integers are widened)
    pub fn get_f64(&mut self, path: &str) -> Result<f64> {
        let value = self.get(path)?;
        value
            .as_f64()
            .ok_or_else(|| Error::type_mismatch(path, "float", value.type_name()))
    }

    /// Get a boolean value
    pub fn get_bool(&mut self, path: &str) -> Result<bool> {
        let value = self.get(path)?;
        value
            .as_bool()
            .ok_or_else(|| Error::type_mismatch(path, "boolean", value.type_name()))
    }

    /// Find the file that owns a dotted path.
    ///
    /// Returns the parsed content of that file and the path segments that
    /// remain to be looked up inside it.
    pub fn resolve(&mut self, path: &str) -> Result<(&Value, Vec<String>)> {
        let namespace = self.options.namespace.clone();
        let mut parts = self.split_path(path, &namespace)?;
        let consumed = self.locate(&parts, &namespace).map_err(|e| e.or_path(path))?;
        let rest = parts.split_off(consumed);
        let content = self.file_content(&parts, path)?;
        Ok((content, rest))
    }

    /// Filesystem path of the YAML file that owns a dotted path.
    ///
    /// Only the file is located; the remaining segments are not checked.
    pub fn source(&mut self, path: &str) -> Result<PathBuf> {
        let namespace = self.options.namespace.clone();
        let parts = self.split_path(path, &namespace)?;
        let consumed = self.locate(&parts, &namespace).map_err(|e| e.or_path(path))?;
        let key = parts[..consumed].join(".");
        self.cache
            .source(&key)
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::not_found(format!("'{}' is not cached", key)).with_path(path))
    }

    /// Resolve one dotted prefix, given as its segments.
    ///
    /// Returns `None` when the prefix names a directory and the parsed
    /// content when it names a file. Results are cached per prefix.
    pub fn load_prefix(&mut self, parts: &[String], namespace: &Namespace) -> Result<Option<&Value>> {
        self.node(parts, namespace).map(CacheEntry::content)
    }

    /// Text of the YAML file that owns a dotted path, exactly as on disk.
    ///
    /// Neither the cache nor the loader is involved, and no placeholders in
    /// the file are substituted.
    pub fn raw_config(&self, path: &str) -> Result<String> {
        let parts = self.split_path(path, &self.options.namespace)?;
        let mut dir = self.root_path();

        for (i, part) in parts.iter().enumerate() {
            let prefix = parts[..=i].join(".");
            if !is_plain_name(part) {
                return Err(not_a_node(&dir.join(part)).with_path(path));
            }
            let candidate = dir.join(part);
            let yaml = yaml_path(&candidate);
            if yaml.is_file() {
                log::debug!("reading raw config for '{}' from {}", prefix, yaml.display());
                return std::fs::read_to_string(&yaml)
                    .map_err(|e| Error::io(&yaml, e).with_path(path));
            }
            if candidate.is_dir() {
                dir = candidate;
                continue;
            }
            if yaml.exists() {
                return Err(Error::invalid_path(&yaml).with_path(path));
            }
            return Err(not_a_node(&candidate).with_path(path));
        }

        Err(only_directories(&parts).with_path(path))
    }

    fn lookup(&mut self, path: &str, namespace: &Namespace) -> Result<Value> {
        let parts = self.split_path(path, namespace)?;
        let consumed = self.locate(&parts, namespace).map_err(|e| e.or_path(path))?;

        let mut current = self.file_content(&parts[..consumed], path)?;
        for segment in &parts[consumed..] {
            current = current.index_key(segment, path)?;
        }
        Ok(current.clone())
    }

    /// Split a dotted path into segments, substituting placeholders in each.
    ///
    /// Substituted text may not contain `.`; segments are never re-split.
    fn split_path(&self, path: &str, namespace: &Namespace) -> Result<Vec<String>> {
        if path.is_empty() {
            return Err(Error::malformed_path(path, "The path is empty"));
        }

        path.split('.')
            .map(|raw| {
                if raw.is_empty() {
                    return Err(Error::malformed_path(path, "The path has an empty segment"));
                }
                let segment = interpolation::substitute(raw, namespace).map_err(|e| e.or_path(path))?;
                if segment.is_empty() {
                    return Err(Error::malformed_path(
                        path,
                        format!("Segment '{}' substitutes to an empty string", raw),
                    ));
                }
                // a dot here would make this prefix's cache key collide with a deeper one
                if segment.contains('.') {
                    return Err(Error::malformed_path(
                        path,
                        format!("Segment '{}' substitutes to '{}', which contains '.'", raw, segment),
                    ));
                }
                Ok(segment)
            })
            .collect()
    }

    /// Walk prefixes of `parts` until one names a file; return how many
    /// segments that file consumed.
    fn locate(&mut self, parts: &[String], namespace: &Namespace) -> Result<usize> {
        for i in 1..=parts.len() {
            if self.node(&parts[..i], namespace)?.is_file() {
                return Ok(i);
            }
        }
        Err(only_directories(parts))
    }

    fn file_content(&self, prefix: &[String], path: &str) -> Result<&Value> {
        let key = prefix.join(".");
        self.cache
            .get(&key)
            .and_then(CacheEntry::content)
            .ok_or_else(|| Error::not_found(format!("'{}' is not a loaded file", key)).with_path(path))
    }

    fn node(&mut self, parts: &[String], namespace: &Namespace) -> Result<&CacheEntry> {
        let key = parts.join(".");
        let root = self.root_path();
        let loader: &dyn Loader = self.loader.as_ref();
        self.cache
            .get_or_try_insert_with(key, || read_node(&root, loader, parts, namespace))
    }
}

impl fmt::Debug for ConfigTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigTree")
            .field("root", &self.root)
            .field("top_level", &self.options.top_level)
            .field("namespace", &self.options.namespace)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Look at the disk for one prefix.
///
/// A `<prefix>.yaml` file shadows a directory of the same name.
fn read_node(
    root: &Path,
    loader: &dyn Loader,
    parts: &[String],
    namespace: &Namespace,
) -> Result<CacheEntry> {
    let key = parts.join(".");
    let mut path = root.to_path_buf();
    for part in parts {
        if !is_plain_name(part) {
            return Err(not_a_node(&path.join(part)));
        }
        path.push(part);
    }

    let yaml = yaml_path(&path);
    if yaml.is_file() || (yaml.exists() && !path.is_dir()) {
        let content = loader.load(&yaml, namespace)?;
        log::debug!("loaded config '{}' from {}", key, yaml.display());
        return Ok(CacheEntry::File { path: yaml, content });
    }

    if path.is_dir() {
        log::debug!("config '{}' is directory {}", key, path.display());
        return Ok(CacheEntry::Directory(path));
    }

    Err(not_a_node(&path))
}

/// `<path>.yaml`
fn yaml_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".yaml");
    PathBuf::from(os)
}

/// Segments name a single directory entry; anything that would climb out of
/// or skip through the tree never matches.
fn is_plain_name(segment: &str) -> bool {
    segment != "." && segment != ".." && !segment.contains(['/', '\\'])
}

fn not_a_node(path: &Path) -> Error {
    Error::not_found(format!(
        "'{}' is neither a directory nor a .yaml file",
        path.display()
    ))
}

fn only_directories(parts: &[String]) -> Error {
    Error::not_found(format!(
        "'{}' names a directory; the path is not contained in any configuration file",
        parts.join(".")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A config root under the system temp dir, removed on drop
    struct Fixture {
        dir: PathBuf,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("yamltree_tree_{}_{}", name, std::process::id()));
            std::fs::remove_dir_all(&dir).ok();
            std::fs::create_dir_all(&dir).unwrap();
            Self { dir }
        }

        fn file(&self, rel: &str, content: &str) -> &Self {
            let path = self.dir.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
            self
        }

        fn dir(&self, rel: &str) -> &Self {
            std::fs::create_dir_all(self.dir.join(rel)).unwrap();
            self
        }

        fn tree(&self) -> ConfigTree {
            ConfigTree::new(&self.dir)
        }

        fn counted_tree(&self, options: TreeOptions) -> (ConfigTree, Arc<AtomicUsize>) {
            let loader = CountingLoader::default();
            let loads = Arc::clone(&loader.loads);
            (ConfigTree::with_options(&self.dir, options).with_loader(loader), loads)
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.dir).ok();
        }
    }

    #[derive(Default)]
    struct CountingLoader {
        loads: Arc<AtomicUsize>,
    }

    impl Loader for CountingLoader {
        fn load(&self, path: &Path, namespace: &Namespace) -> Result<Value> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            YamlLoader.load(path, namespace)
        }
    }

    fn with_ns(namespace: Namespace) -> TreeOptions {
        TreeOptions {
            top_level: None,
            namespace,
        }
    }

    const CAMERA: &str = r#"
exposure:
  min: 0.5
  max: 900
shutter: open
cooled: true
"#;

    #[test]
    fn test_get_through_directories() {
        let fx = Fixture::new("dirs");
        fx.file("mcs/camera.yaml", CAMERA);
        let mut tree = fx.tree();

        assert_eq!(tree.get("mcs.camera.exposure.max").unwrap(), Value::Integer(900));
        assert_eq!(tree.get("mcs.camera.shutter").unwrap().as_str(), Some("open"));
        assert!(tree.get("mcs.camera").unwrap().is_mapping());
    }

    #[test]
    fn test_get_from_single_large_file() {
        let fx = Fixture::new("large");
        fx.file("mcs.yaml", "camera:\n  exposure:\n    max: 12\n");
        let mut tree = fx.tree();

        assert_eq!(tree.get("mcs.camera.exposure.max").unwrap(), Value::Integer(12));
    }

    #[test]
    fn test_top_level_prefixes_lookups() {
        let fx = Fixture::new("top");
        fx.file("enu/rexm.yaml", "speed: 3\n");
        fx.file("rexm.yaml", "speed: 99\n");
        let mut tree = ConfigTree::with_options(
            &fx.dir,
            TreeOptions {
                top_level: Some("enu".into()),
                ..Default::default()
            },
        );

        assert_eq!(tree.top_level(), Some("enu"));
        assert_eq!(tree.root_path(), fx.dir.join("enu"));
        assert_eq!(tree.get("rexm.speed").unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_one_load_per_file() {
        let fx = Fixture::new("one_load");
        fx.file("mcs/camera.yaml", CAMERA);
        let (mut tree, loads) = fx.counted_tree(TreeOptions::default());

        tree.get("mcs.camera.exposure.min").unwrap();
        tree.get("mcs.camera.exposure.max").unwrap();
        tree.get("mcs.camera.shutter").unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(tree.cache().prefixes(), vec!["mcs", "mcs.camera"]);
    }

    #[test]
    fn test_get_is_idempotent() {
        let fx = Fixture::new("idempotent");
        fx.file("mcs/camera.yaml", CAMERA);
        let (mut tree, loads) = fx.counted_tree(TreeOptions::default());

        let first = tree.get("mcs.camera.exposure").unwrap();
        let second = tree.get("mcs.camera.exposure").unwrap();

        assert_eq!(first, second);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_interpolation_round_trip() {
        let fx = Fixture::new("hello");
        fx.file("greet.yaml", "message: \"hello ${name}\"\n");
        let mut tree = ConfigTree::with_options(&fx.dir, with_ns(Namespace::new().with("name", "world")));

        assert_eq!(tree.get_string("greet.message").unwrap(), "hello world");
    }

    #[test]
    fn test_extra_namespace_is_isolated() {
        let fx = Fixture::new("isolation");
        fx.file("greet.yaml", "message: hello ${name}\n");
        let (mut tree, loads) = fx.counted_tree(with_ns(Namespace::new().with("name", "world")));

        let extra = Namespace::new().with("name", "moon");
        assert_eq!(tree.get_with("greet.message", &extra).unwrap().as_str(), Some("hello moon"));
        assert!(tree.cache().is_empty());

        assert_eq!(tree.get("greet.message").unwrap().as_str(), Some("hello world"));
        assert_eq!(loads.load(Ordering::SeqCst), 2);

        // the persistent namespace itself is untouched
        assert_eq!(tree.namespace().get("name"), Some("world"));
    }

    #[test]
    fn test_extra_namespace_ignores_cached_content() {
        let fx = Fixture::new("isolation_after");
        fx.file("greet.yaml", "message: hello ${name}\n");
        let mut tree = ConfigTree::with_options(&fx.dir, with_ns(Namespace::new().with("name", "world")));

        assert_eq!(tree.get_string("greet.message").unwrap(), "hello world");
        let extra = Namespace::new().with("name", "moon");
        assert_eq!(tree.get_with("greet.message", &extra).unwrap().as_str(), Some("hello moon"));
        assert_eq!(tree.get_string("greet.message").unwrap(), "hello world");
    }

    #[test]
    fn test_dotted_substitution_is_rejected() {
        let fx = Fixture::new("dotted_segment");
        fx.file("cams/b.1.yaml", "gain: 1\n");
        fx.file("cams/b/1.yaml", "gain: 2\n");
        let (mut tree, loads) = fx.counted_tree(with_ns(Namespace::new().with("arm", "b.1")));

        let err = tree.get("cams.${arm}.gain").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);
        assert_eq!(err.path.as_deref(), Some("cams.${arm}.gain"));
        assert!(err.to_string().contains("contains '.'"));
        assert!(tree.cache().is_empty());
        assert_eq!(loads.load(Ordering::SeqCst), 0);

        // the literal dotted path still reaches cams/b/1.yaml
        assert_eq!(tree.get("cams.b.1.gain").unwrap(), Value::Integer(2));
        assert_eq!(tree.source("cams.b.1.gain").unwrap(), fx.dir.join("cams/b/1.yaml"));

        let err = tree.raw_config("cams.${arm}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);
    }

    #[test]
    fn test_extra_namespace_alone() {
        let fx = Fixture::new("extra_only");
        fx.file("greet.yaml", "message: hi ${who}\n");
        let mut tree = fx.tree();

        let value = tree
            .get_with("greet.message", &Namespace::new().with("who", "there"))
            .unwrap();
        assert_eq!(value.as_str(), Some("hi there"));
    }

    #[test]
    fn test_extra_namespace_flushes_on_error() {
        let fx = Fixture::new("extra_err");
        fx.file("greet.yaml", "message: hi\n");
        let mut tree = fx.tree();

        let err = tree
            .get_with("greet.missing", &Namespace::new().with("who", "x"))
            .unwrap_err();
        assert!(err.is_key_not_found());
        assert!(tree.cache().is_empty());
    }

    #[test]
    fn test_shallower_file_wins() {
        let fx = Fixture::new("shadow");
        fx.file("a/b.yaml", "x: 1\n");
        fx.file("a/b/c.yaml", "y: 2\n");
        let mut tree = fx.tree();

        let err = tree.get("a.b.c").unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeyNotFound { segment: "c".into() });
        assert_eq!(tree.get("a.b.x").unwrap(), Value::Integer(1));
        assert_eq!(tree.source("a.b.c").unwrap(), fx.dir.join("a/b.yaml"));
    }

    #[test]
    fn test_unresolved_placeholder_in_file() {
        let fx = Fixture::new("unresolved");
        fx.file("mcs/camera.yaml", "name: \"${missing}\"\n");
        let mut tree = fx.tree();

        let err = tree.get("mcs.camera.name").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Interpolation);
        assert_eq!(err.path.as_deref(), Some("mcs.camera.name"));

        // the directory node found on the way is kept, the failed file is not
        assert!(tree.cache().contains("mcs"));
        assert!(!tree.cache().contains("mcs.camera"));
    }

    #[test]
    fn test_missing_path() {
        let fx = Fixture::new("missing");
        let mut tree = fx.tree();

        let err = tree.get("no.such.path").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.path.as_deref(), Some("no.such.path"));
        assert!(tree.cache().is_empty());
    }

    #[test]
    fn test_directory_only_path_is_not_found() {
        let fx = Fixture::new("dir_only");
        fx.dir("mcs/camera");
        let mut tree = fx.tree();

        let err = tree.get("mcs.camera").unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("not contained in any configuration file"));
    }

    #[test]
    fn test_segment_interpolation_in_file() {
        let fx = Fixture::new("segments");
        fx.file("cam.yaml", "b1:\n  exposure: 30\nr1:\n  exposure: 45\n");
        let mut tree = ConfigTree::with_options(&fx.dir, with_ns(Namespace::new().with("arm", "b1")));

        let templated = tree.get("cam.${arm}.exposure").unwrap();
        let literal = tree.get("cam.b1.exposure").unwrap();
        assert_eq!(templated, literal);
        assert_eq!(templated, Value::Integer(30));

        let extra = Namespace::new().with("arm", "r1");
        assert_eq!(tree.get_with("cam.$arm.exposure", &extra).unwrap(), Value::Integer(45));
    }

    #[test]
    fn test_segment_interpolation_selects_directory() {
        let fx = Fixture::new("segments_dir");
        fx.file("cams/b1.yaml", "gain: 1.5\n");
        let mut tree = ConfigTree::with_options(&fx.dir, with_ns(Namespace::new().with("cam", "b1")));

        assert_eq!(tree.get_f64("cams.${cam}.gain").unwrap(), 1.5);
        assert!(tree.cache().contains("cams.b1"));
    }

    #[test]
    fn test_unresolved_segment() {
        let fx = Fixture::new("segments_missing");
        fx.file("cam.yaml", "b1: 1\n");
        let mut tree = fx.tree();

        let err = tree.get("cam.${arm}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Interpolation);
        assert_eq!(err.path.as_deref(), Some("cam.${arm}"));
    }

    #[test]
    fn test_key_not_found_names_segment_and_path() {
        let fx = Fixture::new("key_missing");
        fx.file("mcs/camera.yaml", CAMERA);
        let mut tree = fx.tree();

        let err = tree.get("mcs.camera.exposure.median").unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeyNotFound { segment: "median".into() });
        assert_eq!(err.path.as_deref(), Some("mcs.camera.exposure.median"));

        let err = tree.get("mcs.camera.shutter.state").unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeyNotFound { segment: "state".into() });
    }

    #[test]
    fn test_malformed_paths() {
        let fx = Fixture::new("malformed");
        let mut tree = fx.tree();

        assert_eq!(tree.get("").unwrap_err().kind, ErrorKind::InvalidPath);
        assert_eq!(tree.get("a..b").unwrap_err().kind, ErrorKind::InvalidPath);
        assert_eq!(tree.get("a.").unwrap_err().kind, ErrorKind::InvalidPath);

        let empty = Namespace::new().with("arm", "");
        assert_eq!(tree.get_with("cam.${arm}", &empty).unwrap_err().kind, ErrorKind::InvalidPath);
    }

    #[test]
    fn test_segment_cannot_leave_root() {
        let fx = Fixture::new("escape");
        fx.file("inner/x.yaml", "a: 1\n");
        let mut tree = ConfigTree::with_options(
            fx.dir.join("inner"),
            with_ns(Namespace::new().with("up", "..").with("abs", "/etc")),
        );

        let err = tree.get("${up}.inner.x.a").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);

        let err = tree.get("${abs}.passwd").unwrap_err();
        assert!(err.is_not_found());

        let err = tree
            .load_prefix(&["..".to_string(), "inner".to_string()], &Namespace::new())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_yaml_directory_is_invalid_path() {
        let fx = Fixture::new("invalid");
        fx.dir("odd.yaml");
        let mut tree = fx.tree();

        let err = tree.get("odd.key").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);
        assert_eq!(err.path.as_deref(), Some("odd.key"));
    }

    #[test]
    fn test_resolve_returns_content_and_rest() {
        let fx = Fixture::new("resolve");
        fx.file("mcs/camera.yaml", CAMERA);
        let mut tree = fx.tree();

        let (content, rest) = tree.resolve("mcs.camera.exposure.max").unwrap();
        assert!(content.is_mapping());
        assert_eq!(rest, vec!["exposure", "max"]);

        let (_, rest) = tree.resolve("mcs.camera").unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn test_load_prefix() {
        let fx = Fixture::new("prefix");
        fx.file("mcs/camera.yaml", CAMERA);
        let mut tree = fx.tree();
        let ns = Namespace::new();

        assert_eq!(tree.load_prefix(&["mcs".to_string()], &ns).unwrap(), None);
        let content = tree
            .load_prefix(&["mcs".to_string(), "camera".to_string()], &ns)
            .unwrap()
            .unwrap();
        assert!(content.is_mapping());

        let err = tree.load_prefix(&["nope".to_string()], &ns).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_raw_config_bypasses_cache_and_loader() {
        let fx = Fixture::new("raw");
        let text = "message: hello ${name}\n";
        fx.file("mcs/greet.yaml", text);
        let (tree, loads) = fx.counted_tree(TreeOptions::default());

        assert_eq!(tree.raw_config("mcs.greet.message").unwrap(), text);
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert!(tree.cache().is_empty());

        assert!(tree.raw_config("mcs.nothing").unwrap_err().is_not_found());
        assert!(tree.raw_config("mcs").unwrap_err().is_not_found());
    }

    #[test]
    fn test_typed_getters() {
        let fx = Fixture::new("typed");
        fx.file("mcs/camera.yaml", CAMERA);
        let mut tree = fx.tree();

        assert_eq!(tree.get_i64("mcs.camera.exposure.max").unwrap(), 900);
        assert_eq!(tree.get_f64("mcs.camera.exposure.max").unwrap(), 900.0);
        assert_eq!(tree.get_f64("mcs.camera.exposure.min").unwrap(), 0.5);
        assert!(tree.get_bool("mcs.camera.cooled").unwrap());

        let err = tree.get_i64("mcs.camera.shutter").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert!(err.to_string().contains("Got: string"));

        let err = tree.get_string("mcs.camera.exposure").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_set_namespace_flushes() {
        let fx = Fixture::new("set_ns");
        fx.file("greet.yaml", "message: hello ${name}\n");
        let mut tree = ConfigTree::with_options(&fx.dir, with_ns(Namespace::new().with("name", "a")));

        assert_eq!(tree.get_string("greet.message").unwrap(), "hello a");
        tree.set_namespace(Namespace::new().with("name", "b"));
        assert!(tree.cache().is_empty());
        assert_eq!(tree.get_string("greet.message").unwrap(), "hello b");
    }

    #[test]
    fn test_flush_rereads_disk() {
        let fx = Fixture::new("flush");
        fx.file("mcs.yaml", "x: 1\n");
        let mut tree = fx.tree();

        assert_eq!(tree.get("mcs.x").unwrap(), Value::Integer(1));
        fx.file("mcs.yaml", "x: 2\n");
        assert_eq!(tree.get("mcs.x").unwrap(), Value::Integer(1));

        tree.flush();
        assert_eq!(tree.get("mcs.x").unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_debug_output() {
        let tree = ConfigTree::new("/cfg");
        let debug = format!("{:?}", tree);
        assert!(debug.contains("ConfigTree"));
        assert!(debug.contains("/cfg"));
    }
}
