//! Feed ledger export service
//!
//! Gathers a farm's ponds and recorded amounts for one collection and period
//! and writes them out as an XLSX grid.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::grid::{xlsx, DocumentBuilder, GridDocument, LedgerMetadata};
use crate::models::{FarmId, FeedCollectionId, FeedPeriod};
use crate::storage::{write_bytes_atomic, AmountSource, PondDirectory, Storage};

/// What was written by an export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub period: FeedPeriod,
    pub ponds: usize,
    pub amounts: usize,
    pub bytes: usize,
}

struct ExportCounts {
    ponds: usize,
    amounts: usize,
}

/// Service for exporting feed ledgers
pub struct ExportService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> ExportService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Build the grid document for a collection, farm and period
    pub fn build_document(
        &self,
        collection_id: FeedCollectionId,
        farm_id: FarmId,
        period: FeedPeriod,
    ) -> LedgerResult<GridDocument> {
        let (document, _) = self.build(collection_id, farm_id, period)?;
        Ok(document)
    }

    fn build(
        &self,
        collection_id: FeedCollectionId,
        farm_id: FarmId,
        period: FeedPeriod,
    ) -> LedgerResult<(GridDocument, ExportCounts)> {
        let collection = self
            .storage
            .directory
            .get_collection(collection_id)?
            .ok_or_else(|| LedgerError::collection_not_found(collection_id.to_string()))?;
        let farm = self
            .storage
            .directory
            .get_farm(farm_id)?
            .ok_or_else(|| LedgerError::farm_not_found(farm_id.to_string()))?;

        let ponds = self.storage.directory.list_pond_columns(farm_id)?;
        let amounts = self
            .storage
            .ledger
            .fetch_amounts(collection_id, farm_id, period)?;

        let metadata = LedgerMetadata {
            collection_id,
            collection_name: collection.name,
            farm_name: farm.name,
            period,
        };
        let document = DocumentBuilder::new(&ponds, &self.settings.pond_name_prefix)
            .build(&metadata, &amounts)?;
        let counts = ExportCounts {
            ponds: ponds.len(),
            amounts: amounts.len(),
        };
        Ok((document, counts))
    }

    /// Serialize the period's ledger as XLSX bytes
    pub fn export_bytes(
        &self,
        collection_id: FeedCollectionId,
        farm_id: FarmId,
        period: FeedPeriod,
    ) -> LedgerResult<Vec<u8>> {
        xlsx::to_xlsx_bytes(&self.build_document(collection_id, farm_id, period)?)
    }

    /// Write the period's ledger to an `.xlsx` file
    pub fn export_to_file(
        &self,
        collection_id: FeedCollectionId,
        farm_id: FarmId,
        period: FeedPeriod,
        path: &Path,
    ) -> LedgerResult<ExportSummary> {
        info!(
            collection = %collection_id,
            farm = %farm_id,
            period = %period,
            path = %path.display(),
            "exporting feed ledger"
        );

        let (document, counts) = self.build(collection_id, farm_id, period)?;
        let bytes = xlsx::to_xlsx_bytes(&document)?;
        write_bytes_atomic(path, &bytes)?;

        let summary = ExportSummary {
            path: path.to_path_buf(),
            period,
            ponds: counts.ponds,
            amounts: counts.amounts,
            bytes: bytes.len(),
        };
        info!(
            amounts = summary.amounts,
            bytes = summary.bytes,
            "feed ledger exported"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::grid::{CellValue, GridCoordinate};
    use crate::models::{FeedAmount, FeedRecord, LedgerEntry};
    use crate::services::BulkReconciler;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seed(storage: &Storage) -> (FeedCollectionId, FarmId) {
        let collection = storage.directory.add_collection("อาหารกุ้ง").unwrap();
        let farm = storage.directory.add_farm("ฟาร์มบางปะกง").unwrap();
        let a = storage.directory.add_pond(farm.id, "บ่อ A", "บ่อ").unwrap();
        let b = storage.directory.add_pond(farm.id, "บ่อ B", "บ่อ").unwrap();

        let jan_1 = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let entries = vec![
            LedgerEntry::unsaved(
                farm.id,
                FeedRecord::new(a.pond_id, collection.id, FeedAmount::from_units(10).unwrap(), jan_1),
            ),
            LedgerEntry::unsaved(
                farm.id,
                FeedRecord::new(b.pond_id, collection.id, FeedAmount::from_units(5).unwrap(), jan_1),
            ),
        ];
        BulkReconciler::new(&storage.ledger, None)
            .reconcile(entries, "system")
            .unwrap();
        (collection.id, farm.id)
    }

    #[test]
    fn test_build_document_places_amounts() {
        let (_temp, storage) = setup();
        let (collection, farm) = seed(&storage);
        let settings = Settings::default();

        let doc = ExportService::new(&storage, &settings)
            .build_document(collection, farm, FeedPeriod::monthly(2021, 1).unwrap())
            .unwrap();

        let c = GridCoordinate::new;
        assert_eq!(doc.text(c(1, 3)), Some("ฟาร์มบางปะกง"));
        assert_eq!(doc.text(c(2, 3)), Some("A"));
        assert_eq!(doc.value(c(3, 3)), &CellValue::Number(10.0));
        assert_eq!(doc.value(c(3, 5)).as_number(), Some(15.0));
        assert_eq!(doc.value(c(34, 5)).as_number(), Some(15.0));
    }

    #[test]
    fn test_export_to_file() {
        let (temp, storage) = setup();
        let (collection, farm) = seed(&storage);
        let settings = Settings::default();
        let path = temp.path().join("out").join("jan.xlsx");

        let summary = ExportService::new(&storage, &settings)
            .export_to_file(collection, farm, FeedPeriod::monthly(2021, 1).unwrap(), &path)
            .unwrap();

        assert!(path.exists());
        assert_eq!(summary.ponds, 2);
        assert_eq!(summary.amounts, 2);
        let back = xlsx::read_xlsx(&path).unwrap();
        assert_eq!(back.value(GridCoordinate::new(3, 4)).as_number(), Some(5.0));
    }

    #[test]
    fn test_unknown_farm_or_collection() {
        let (_temp, storage) = setup();
        let (collection, farm) = seed(&storage);
        let settings = Settings::default();
        let service = ExportService::new(&storage, &settings);
        let period = FeedPeriod::yearly(2021).unwrap();

        assert!(service
            .build_document(collection, FarmId::new(42), period)
            .unwrap_err()
            .is_not_found());
        assert!(service
            .build_document(FeedCollectionId::new(42), farm, period)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_repeated_export_builds_identical_documents() {
        let (_temp, storage) = setup();
        let (collection, farm) = seed(&storage);
        let settings = Settings::default();
        let service = ExportService::new(&storage, &settings);
        let period = FeedPeriod::yearly(2021).unwrap();

        let first = service.build_document(collection, farm, period).unwrap();
        let second = service.build_document(collection, farm, period).unwrap();
        assert_eq!(first.to_bytes().unwrap(), second.to_bytes().unwrap());
        let bytes = service.export_bytes(collection, farm, period).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(service.export_bytes(collection, farm, period).unwrap(), bytes);
    }
}
