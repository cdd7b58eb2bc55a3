//! store
//!
//! Workspace persistence: discovery, load, and save over the canonical
//! codec.
//!
//! # Layout
//!
//! A workspace directory holds `model.xml` plus one `data/<Entity>.xml`
//! shard per entity (see [`crate::core::paths`]).
//!
//! # Durability
//!
//! Save serializes every document *before* touching the filesystem, so
//! a workspace that cannot be canonically serialized never clobbers the
//! on-disk state. Each file is written to a temporary sibling and
//! renamed into place. An exclusive [`lock::WorkspaceLock`] is held for
//! the whole save; in-memory transactions need no lock because a
//! workspace is exclusively owned by one caller.

pub mod fingerprint;
pub mod lock;

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::codec::{parse_model, parse_shard, serialize_model, serialize_shard, CodecError};
use crate::core::instance::Instance;
use crate::core::naming::eq_ignore_case;
use crate::core::paths::WorkspacePaths;
use crate::core::workspace::Workspace;

pub use fingerprint::Fingerprint;
pub use lock::{LockError, WorkspaceLock};

/// Errors from workspace persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The directory does not contain a workspace.
    #[error("{0} is not a trellis workspace (no model.xml)")]
    NotAWorkspace(PathBuf),

    /// A workspace already exists where init was asked to create one.
    #[error("a workspace already exists at {0}")]
    AlreadyExists(PathBuf),

    /// The workspace is not bound to a directory.
    #[error("workspace has no root directory to save into")]
    Unbound,

    /// A shard file exists for an entity the model does not define.
    #[error("stray shard {path}: model has no entity '{entity}'")]
    StrayShard { path: PathBuf, entity: String },

    /// A shard's Entity attribute disagrees with its file name.
    #[error("shard {path} declares entity '{declared}', expected '{expected}'")]
    ShardMismatch {
        path: PathBuf,
        declared: String,
        expected: String,
    },

    /// Parse or serialization failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Could not acquire the save lock.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// I/O failure.
    #[error("store i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn io_err(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.into();
    move |source| StoreError::Io { path, source }
}

/// Create a new empty workspace at `root` and persist it.
pub fn init(root: &Path, model_name: &str) -> Result<Workspace, StoreError> {
    let paths = WorkspacePaths::new(root);
    if paths.model_path().exists() {
        return Err(StoreError::AlreadyExists(root.to_path_buf()));
    }
    fs::create_dir_all(root).map_err(io_err(root))?;

    let mut workspace = Workspace::new(model_name);
    workspace.root = Some(root.to_path_buf());
    workspace.dirty = true;
    save(&mut workspace)?;
    Ok(workspace)
}

/// Load a workspace from a directory of canonical files.
pub fn load(root: &Path) -> Result<Workspace, StoreError> {
    let paths = WorkspacePaths::new(root);
    let model_path = paths.model_path();
    if !model_path.exists() {
        return Err(StoreError::NotAWorkspace(root.to_path_buf()));
    }

    let model_text = fs::read_to_string(&model_path).map_err(io_err(&model_path))?;
    let model = parse_model(&model_text)?;

    let mut instance = Instance::new();
    for entity in &model.entities {
        let shard_path = paths.shard_path(&entity.name);
        if !shard_path.exists() {
            continue;
        }
        let shard_text = fs::read_to_string(&shard_path).map_err(io_err(&shard_path))?;
        let bucket = parse_shard(&shard_text)?;
        if !eq_ignore_case(&bucket.entity, &entity.name) {
            return Err(StoreError::ShardMismatch {
                path: shard_path,
                declared: bucket.entity,
                expected: entity.name.clone(),
            });
        }
        let target = instance.bucket_entry(&entity.name);
        target.records = bucket.records;
    }

    check_stray_shards(&paths, &model)?;

    Ok(Workspace {
        model,
        instance,
        diagnostics: crate::core::diagnostics::Diagnostics::new(),
        dirty: false,
        root: Some(root.to_path_buf()),
    })
}

fn check_stray_shards(
    paths: &WorkspacePaths,
    model: &crate::core::model::Model,
) -> Result<(), StoreError> {
    let data_dir = paths.data_dir();
    if !data_dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(&data_dir).map_err(io_err(&data_dir))? {
        let entry = entry.map_err(io_err(&data_dir))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("xml") {
            continue;
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        if model.entity(&stem).is_none() {
            return Err(StoreError::StrayShard { path, entity: stem });
        }
    }
    Ok(())
}

/// Persist a workspace to its root directory.
///
/// Serializes everything up front, holds the workspace lock for the
/// whole write, removes shards of entities no longer in the model, and
/// clears the dirty flag on success.
pub fn save(workspace: &mut Workspace) -> Result<(), StoreError> {
    let root = workspace.root.clone().ok_or(StoreError::Unbound)?;
    let paths = WorkspacePaths::new(&root);

    let model_doc = serialize_model(&workspace.model)?;
    let mut shards: Vec<(String, String)> = Vec::new();
    for entity in &workspace.model.entities {
        let records = workspace.instance.records(&entity.name);
        let doc = serialize_shard(&workspace.model, &entity.name, records)?;
        shards.push((entity.name.clone(), doc));
    }

    let _lock = WorkspaceLock::acquire(&paths)?;
    fs::create_dir_all(paths.data_dir()).map_err(io_err(paths.data_dir()))?;

    write_atomic(&paths.model_path(), &model_doc)?;
    for (entity, doc) in &shards {
        write_atomic(&paths.shard_path(entity), doc)?;
    }
    remove_dropped_shards(&paths, &shards)?;

    workspace.dirty = false;
    Ok(())
}

fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    let tmp = path.with_extension("xml.tmp");
    {
        let mut file = fs::File::create(&tmp).map_err(io_err(&tmp))?;
        file.write_all(content.as_bytes()).map_err(io_err(&tmp))?;
        file.sync_all().map_err(io_err(&tmp))?;
    }
    fs::rename(&tmp, path).map_err(io_err(path))?;
    Ok(())
}

fn remove_dropped_shards(
    paths: &WorkspacePaths,
    shards: &[(String, String)],
) -> Result<(), StoreError> {
    let data_dir = paths.data_dir();
    for entry in fs::read_dir(&data_dir).map_err(io_err(&data_dir))? {
        let entry = entry.map_err(io_err(&data_dir))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("xml") {
            continue;
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if !shards.iter().any(|(entity, _)| eq_ignore_case(entity, stem)) {
            fs::remove_file(&path).map_err(io_err(&path))?;
        }
    }
    Ok(())
}
