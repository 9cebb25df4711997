//! yamltree-core: lazily-loaded configuration trees
//!
//! A [`ConfigTree`] resolves dotted paths against a directory of YAML files.
//! Directory levels and file contents share one address space, so
//! `mcs.camera.exposure` may live in `mcs/camera.yaml` under the key
//! `exposure`, or in `mcs.yaml` under `camera.exposure`. Files are read on
//! first use, placeholders such as `${cam}` in their strings are filled from
//! a [`Namespace`], and the result is cached per prefix.
//!
//! # Example
//!
//! ```no_run
//! use yamltree_core::{ConfigTree, Namespace, TreeOptions};
//!
//! let mut tree = ConfigTree::with_options(
//!     "/etc/instrument/config",
//!     TreeOptions {
//!         top_level: Some("mcs".into()),
//!         namespace: Namespace::new().with("cam", "b1"),
//!     },
//! );
//!
//! let exposure = tree.get_f64("camera.${cam}.exposure")?;
//! # Ok::<(), yamltree_core::Error>(())
//! ```

pub mod cache;
pub mod error;
pub mod interpolation;
pub mod loader;
pub mod namespace;
pub mod value;

mod tree;

pub use cache::{CacheEntry, NodeCache};
pub use error::{Error, ErrorKind, Result};
pub use loader::{Loader, YamlLoader};
pub use namespace::{Binding, BindingError, Namespace};
pub use tree::{ConfigTree, TreeOptions};
pub use value::Value;
