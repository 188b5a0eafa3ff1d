//! Farm and feed collection repository for JSON storage
//!
//! Manages loading and saving farms (with their ordered ponds) and feed
//! collections to directory.json.

use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Farm, FarmId, FeedCollection, FeedCollectionId, PondColumn, PondId};

use super::file_io::{read_json, write_json_atomic};
use super::PondDirectory;

/// Serializable directory data structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DirectoryData {
    #[serde(default)]
    farms: Vec<Farm>,
    #[serde(default)]
    collections: Vec<FeedCollection>,
}

impl DirectoryData {
    fn next_farm_id(&self) -> FarmId {
        FarmId::new(self.farms.iter().map(|f| f.id.get()).max().unwrap_or(0) + 1)
    }

    /// Pond ids are unique across all farms
    fn next_pond_id(&self) -> PondId {
        let max = self
            .farms
            .iter()
            .flat_map(|f| f.ponds.iter())
            .map(|p| p.pond_id.get())
            .max()
            .unwrap_or(0);
        PondId::new(max + 1)
    }

    fn next_collection_id(&self) -> FeedCollectionId {
        FeedCollectionId::new(self.collections.iter().map(|c| c.id.get()).max().unwrap_or(0) + 1)
    }
}

/// Repository for farms, ponds and feed collections
pub struct DirectoryRepository {
    path: PathBuf,
    data: RwLock<DirectoryData>,
}

impl DirectoryRepository {
    /// Create a new directory repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(DirectoryData::default()),
        }
    }

    /// Load the directory from disk
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: DirectoryData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *data = file_data;
        Ok(())
    }

    /// Save the directory to disk
    pub fn save(&self) -> LedgerResult<()> {
        let data = self.data.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        write_json_atomic(&self.path, &*data)
    }

    /// Create a farm with no ponds
    pub fn add_farm(&self, name: &str) -> LedgerResult<Farm> {
        let mut data = self.data.write().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let name = name.trim();
        if data.farms.iter().any(|f| f.name.eq_ignore_ascii_case(name)) {
            return Err(LedgerError::Duplicate {
                entity_type: "Farm",
                identifier: name.to_string(),
            });
        }

        let farm = Farm::new(data.next_farm_id(), name);
        farm.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;
        data.farms.push(farm.clone());
        Ok(farm)
    }

    /// Append a pond to a farm's column list
    ///
    /// Two ponds of a farm may not share a sheet header, which is the name
    /// with `pond_name_prefix` stripped.
    pub fn add_pond(
        &self,
        farm_id: FarmId,
        name: &str,
        pond_name_prefix: &str,
    ) -> LedgerResult<PondColumn> {
        let mut data = self.data.write().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let pond = PondColumn::new(data.next_pond_id(), name.trim());
        let farm = data
            .farms
            .iter_mut()
            .find(|f| f.id == farm_id)
            .ok_or_else(|| LedgerError::farm_not_found(farm_id.to_string()))?;

        let header = pond.header_label(pond_name_prefix);
        if farm
            .ponds
            .iter()
            .any(|p| p.header_label(pond_name_prefix) == header)
        {
            return Err(LedgerError::Duplicate {
                entity_type: "Pond",
                identifier: pond.display_name,
            });
        }

        farm.ponds.push(pond.clone());
        if let Err(e) = farm.validate() {
            farm.ponds.pop();
            return Err(LedgerError::Validation(e.to_string()));
        }
        Ok(pond)
    }

    /// Get a farm by ID
    pub fn get_farm(&self, id: FarmId) -> LedgerResult<Option<Farm>> {
        let data = self.data.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.farms.iter().find(|f| f.id == id).cloned())
    }

    /// Get all farms, ordered by ID
    pub fn list_farms(&self) -> LedgerResult<Vec<Farm>> {
        let data = self.data.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        let mut farms = data.farms.clone();
        farms.sort_by_key(|f| f.id);
        Ok(farms)
    }

    /// Create a feed collection
    pub fn add_collection(&self, name: &str) -> LedgerResult<FeedCollection> {
        let mut data = self.data.write().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let name = name.trim();
        if data.collections.iter().any(|c| c.name == name) {
            return Err(LedgerError::Duplicate {
                entity_type: "Feed collection",
                identifier: name.to_string(),
            });
        }

        let collection = FeedCollection::new(data.next_collection_id(), name);
        collection
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;
        data.collections.push(collection.clone());
        Ok(collection)
    }

    /// Get a feed collection by ID
    pub fn get_collection(&self, id: FeedCollectionId) -> LedgerResult<Option<FeedCollection>> {
        let data = self.data.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.collections.iter().find(|c| c.id == id).cloned())
    }

    /// Get all feed collections, ordered by ID
    pub fn list_collections(&self) -> LedgerResult<Vec<FeedCollection>> {
        let data = self.data.read().map_err(|e| {
            LedgerError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        let mut collections = data.collections.clone();
        collections.sort_by_key(|c| c.id);
        Ok(collections)
    }
}

impl PondDirectory for DirectoryRepository {
    fn list_pond_columns(&self, farm: FarmId) -> LedgerResult<Vec<PondColumn>> {
        self.get_farm(farm)?
            .map(|f| f.ponds)
            .ok_or_else(|| LedgerError::farm_not_found(farm.to_string()))
    }
}
