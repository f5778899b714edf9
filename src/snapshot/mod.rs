//! Loading an export tree back into an in-memory resource index.
//!
//! An export tree is the on-disk layout produced by a cluster dump:
//! `<namespace>/<kind>/<name>.yaml`, with the reserved namespace folder
//! `_cluster` holding cluster-scoped kinds. The loader is best-effort by
//! contract: export trees may be partial or contain garbage, so every
//! per-file problem is skipped and only a root-level failure is fatal.

pub mod access;

use crate::error::{Result, SnapcheckError};
use log::debug;
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Reserved folder name for generated reports. Files under it are never
/// ingested as resources, so a validation run cannot consume its own output.
pub const REPORTS_DIR: &str = "snapcheck-reports";

/// Namespace key under which cluster-scoped resources are exported.
pub const CLUSTER_SCOPE: &str = "_cluster";

type NameMap = HashMap<String, Value>;
type KindMap = HashMap<String, NameMap>;

/// Three-level lookup over an export tree: namespace -> kind -> name -> doc.
///
/// Built once per invocation and read-only afterwards. `_cluster` is an
/// ordinary namespace key for lookup purposes.
#[derive(Debug, Default)]
pub struct ResourceIndex {
    namespaces: HashMap<String, KindMap>,
}

impl ResourceIndex {
    /// Load every resource document under `root`.
    ///
    /// Skipped without error: directories, non-`.yaml` files, anything under
    /// a [`REPORTS_DIR`] folder, paths shallower than the
    /// `<namespace>/<kind>/<name>.yaml` layout, and files that fail to read
    /// or parse. Colliding `(namespace, kind, name)` entries overwrite
    /// earlier ones (last wins). The only fatal condition is an unreadable
    /// or non-directory root.
    pub fn load(root: &Path) -> Result<Self> {
        let meta = fs::metadata(root).map_err(|source| SnapcheckError::ExportRoot {
            path: root.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(SnapcheckError::NotADirectory(root.to_path_buf()));
        }

        let mut index = Self::default();

        for entry in walkdir::WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            if path.components().any(|c| c.as_os_str() == REPORTS_DIR) {
                continue;
            }

            let Ok(rel) = path.strip_prefix(root) else {
                continue;
            };
            let parts: Vec<&str> = rel.iter().filter_map(|s| s.to_str()).collect();
            if parts.len() < 3 {
                debug!(
                    "skipping {}: not in <namespace>/<kind>/<name>.yaml layout",
                    rel.display()
                );
                continue;
            }
            let (namespace, kind, filename) = (parts[0], parts[1], parts[2]);

            let Ok(content) = fs::read_to_string(path) else {
                debug!("skipping unreadable file {}", path.display());
                continue;
            };
            let Ok(doc) = serde_yaml::from_str::<Value>(&content) else {
                debug!("skipping unparseable file {}", path.display());
                continue;
            };

            let name = filename.strip_suffix(".yaml").unwrap_or(filename);
            index
                .namespaces
                .entry(namespace.to_string())
                .or_default()
                .entry(kind.to_string())
                .or_default()
                .insert(name.to_string(), doc);
        }

        Ok(index)
    }

    /// Look up a single resource document.
    pub fn get(&self, namespace: &str, kind: &str, name: &str) -> Option<&Value> {
        self.namespaces.get(namespace)?.get(kind)?.get(name)
    }

    /// Whether a resource exists in the index.
    pub fn contains(&self, namespace: &str, kind: &str, name: &str) -> bool {
        self.get(namespace, kind, name).is_some()
    }

    /// All documents of one kind in one namespace, keyed by name.
    pub fn by_kind(&self, namespace: &str, kind: &str) -> Option<&NameMap> {
        self.namespaces.get(namespace)?.get(kind)
    }

    /// Iterate every document of one kind across all namespaces as
    /// `(namespace, name, doc)` triples. Order is unspecified.
    pub fn iter_kind<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str, &'a Value)> + 'a {
        self.namespaces.iter().flat_map(move |(ns, kinds)| {
            kinds.get(kind).into_iter().flat_map(move |names| {
                names
                    .iter()
                    .map(move |(name, doc)| (ns.as_str(), name.as_str(), doc))
            })
        })
    }

    /// Namespace keys present in the tree (including `_cluster` if exported).
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Total number of indexed documents.
    pub fn len(&self) -> usize {
        self.namespaces
            .values()
            .flat_map(|kinds| kinds.values())
            .map(|names| names.len())
            .sum()
    }

    /// Whether the index holds no documents at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
