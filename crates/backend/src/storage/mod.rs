use mapblock_shared::models::BlockRecord;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

const BLOCKS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("blocks");

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] redb::Error),
    #[error("block record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to prepare {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

macro_rules! from_redb {
    ($($err:ty),*) => {
        $(impl From<$err> for StorageError {
            fn from(e: $err) -> Self {
                StorageError::Database(e.into())
            }
        })*
    };
}

from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError
);

pub struct Storage {
    db: Database,
    path: PathBuf,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Arc<Self>, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let db = Database::create(path)?;

        // Ensure table exists
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BLOCKS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Arc::new(Storage {
            db,
            path: path.to_path_buf(),
        }))
    }

    pub fn save_block(&self, block: &BlockRecord) -> Result<(), StorageError> {
        let json = serde_json::to_vec(block)?;
        let id_str = block.id.to_string();

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(BLOCKS_TABLE)?;
            table.insert(id_str.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        tracing::debug!(id = %block.id, "block saved");
        Ok(())
    }

    pub fn get_block(&self, id: &str) -> Result<Option<BlockRecord>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BLOCKS_TABLE)?;

        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Every stored block, most recently updated first. Unreadable records
    /// are skipped with a warning.
    pub fn list_blocks(&self) -> Result<Vec<BlockRecord>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BLOCKS_TABLE)?;

        let mut blocks = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            match serde_json::from_slice::<BlockRecord>(value.value()) {
                Ok(block) => blocks.push(block),
                Err(e) => tracing::warn!(id = key.value(), error = %e, "skipping unreadable block"),
            }
        }
        blocks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(blocks)
    }

    pub fn count_blocks(&self) -> Result<u64, StorageError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BLOCKS_TABLE)?;
        Ok(table.len()?)
    }

    pub fn db_size_bytes(&self) -> Result<u64, StorageError> {
        std::fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })
    }

    pub fn delete_block(&self, id: &str) -> Result<bool, StorageError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(BLOCKS_TABLE)?;
            let result = table.remove(id)?;
            result.is_some()
        };
        write_txn.commit()?;
        Ok(removed)
    }
}
