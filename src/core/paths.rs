//! core::paths
//!
//! Centralized path routing for workspace storage locations.
//!
//! # Storage Layout
//!
//! All workspace data lives under the workspace root directory:
//! - `model.xml` - canonical schema document
//! - `data/<Entity>.xml` - one canonical shard per entity
//! - `trellis.toml` - optional workspace configuration
//! - `.trellis.lock` - exclusive lock file held during save
//!
//! No code outside this module may assemble these paths by hand.

use std::path::{Path, PathBuf};

/// Name of the schema document inside a workspace root.
pub const MODEL_FILE: &str = "model.xml";

/// Name of the shard subdirectory inside a workspace root.
pub const DATA_DIR: &str = "data";

/// Name of the workspace configuration file.
pub const CONFIG_FILE: &str = "trellis.toml";

/// Name of the save lock file.
pub const LOCK_FILE: &str = ".trellis.lock";

/// Path routing for one workspace directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    root: PathBuf,
}

impl WorkspacePaths {
    /// Create path routing rooted at a workspace directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the schema document.
    pub fn model_path(&self) -> PathBuf {
        self.root.join(MODEL_FILE)
    }

    /// Path of the shard directory.
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    /// Path of the shard for one entity.
    pub fn shard_path(&self, entity: &str) -> PathBuf {
        self.data_dir().join(format!("{}.xml", entity))
    }

    /// Path of the workspace configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path of the save lock file.
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }
}
