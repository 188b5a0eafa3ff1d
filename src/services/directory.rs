//! Directory service
//!
//! Adds farms, ponds and feed collections, persisting and auditing each
//! change, and resolves the names or ids typed on the command line.

use tracing::info;

use crate::audit::EntityType;
use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Farm, FarmId, FeedCollection, FeedCollectionId, PondColumn};
use crate::storage::Storage;

/// Service for farm, pond and collection management
pub struct DirectoryService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> DirectoryService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    fn actor<'b>(&'b self, actor: Option<&'b str>) -> &'b str {
        actor.unwrap_or(&self.settings.default_actor)
    }

    /// Create a new farm
    pub fn add_farm(&self, name: &str, actor: Option<&str>) -> LedgerResult<Farm> {
        let farm = self.storage.directory.add_farm(name)?;
        self.storage.directory.save()?;

        self.storage.log_create(
            EntityType::Farm,
            farm.id.to_string(),
            Some(farm.name.clone()),
            self.actor(actor),
            &farm,
        )?;
        info!(farm = %farm.id, name = %farm.name, "farm added");
        Ok(farm)
    }

    /// Append a pond to a farm
    ///
    /// Sheets exported before this call no longer import.
    pub fn add_pond(&self, farm_id: FarmId, name: &str, actor: Option<&str>) -> LedgerResult<PondColumn> {
        let pond = self
            .storage
            .directory
            .add_pond(farm_id, name, &self.settings.pond_name_prefix)?;
        self.storage.directory.save()?;

        self.storage.log_create(
            EntityType::Pond,
            pond.pond_id.to_string(),
            Some(pond.display_name.clone()),
            self.actor(actor),
            &pond,
        )?;
        info!(farm = %farm_id, pond = %pond.pond_id, "pond added");
        Ok(pond)
    }

    /// Create a new feed collection
    pub fn add_collection(&self, name: &str, actor: Option<&str>) -> LedgerResult<FeedCollection> {
        let collection = self.storage.directory.add_collection(name)?;
        self.storage.directory.save()?;

        self.storage.log_create(
            EntityType::FeedCollection,
            collection.id.to_string(),
            Some(collection.name.clone()),
            self.actor(actor),
            &collection,
        )?;
        info!(collection = %collection.id, name = %collection.name, "feed collection added");
        Ok(collection)
    }

    pub fn list_farms(&self) -> LedgerResult<Vec<Farm>> {
        self.storage.directory.list_farms()
    }

    pub fn list_collections(&self) -> LedgerResult<Vec<FeedCollection>> {
        self.storage.directory.list_collections()
    }

    /// Find a farm by name (case-insensitive) or ID string
    pub fn find_farm(&self, identifier: &str) -> LedgerResult<Option<Farm>> {
        let farms = self.storage.directory.list_farms()?;
        let identifier = identifier.trim();
        if let Some(farm) = farms.iter().find(|f| f.name.eq_ignore_ascii_case(identifier)) {
            return Ok(Some(farm.clone()));
        }

        if let Ok(id) = identifier.parse::<FarmId>() {
            return Ok(farms.into_iter().find(|f| f.id == id));
        }

        Ok(None)
    }

    /// Find a feed collection by name or ID string
    pub fn find_collection(&self, identifier: &str) -> LedgerResult<Option<FeedCollection>> {
        let collections = self.storage.directory.list_collections()?;
        let identifier = identifier.trim();
        if let Some(collection) = collections.iter().find(|c| c.name == identifier) {
            return Ok(Some(collection.clone()));
        }

        if let Ok(id) = identifier.parse::<FeedCollectionId>() {
            return Ok(collections.into_iter().find(|c| c.id == id));
        }

        Ok(None)
    }

    /// Like `find_farm`, but a miss is an error
    pub fn resolve_farm(&self, identifier: &str) -> LedgerResult<Farm> {
        self.find_farm(identifier)?
            .ok_or_else(|| LedgerError::farm_not_found(identifier))
    }

    /// Like `find_collection`, but a miss is an error
    pub fn resolve_collection(&self, identifier: &str) -> LedgerResult<FeedCollection> {
        self.find_collection(identifier)?
            .ok_or_else(|| LedgerError::collection_not_found(identifier))
    }
}
