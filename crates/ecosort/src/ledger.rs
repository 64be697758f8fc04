//! Scan history and engagement stats.

use chrono::{DateTime, NaiveDate, Utc};
use ecosort_identify::IdentificationResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::storage::Storage;

pub const MAX_SCAN_HISTORY: usize = 50;
pub const CO2_SAVED_PER_RECYCLABLE_KG: f64 = 0.5;
pub const ITEMS_PER_LEVEL: u64 = 10;

const HISTORY_KEY: &str = "scan_history";
const STATS_KEY: &str = "recycling_stats";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    Camera,
    Barcode,
    Search,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanRecord {
    pub id: Uuid,
    pub scanned_at: DateTime<Utc>,
    pub mode: ScanMode,
    pub result: IdentificationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RecyclingStats {
    pub items_scanned: u64,
    pub co2_saved_kg: f64,
    /// Consecutive UTC days with at least one scan.
    pub streak: u32,
    pub level: u64,
    pub last_scan_day: Option<NaiveDate>,
}

impl Default for RecyclingStats {
    fn default() -> Self {
        Self {
            items_scanned: 0,
            co2_saved_kg: 0.0,
            streak: 1,
            level: 1,
            last_scan_day: None,
        }
    }
}

impl RecyclingStats {
    fn count(&mut self, recyclable: bool, day: NaiveDate) {
        self.items_scanned += 1;
        if recyclable {
            self.co2_saved_kg += CO2_SAVED_PER_RECYCLABLE_KG;
        }
        self.level = self.items_scanned / ITEMS_PER_LEVEL + 1;
        self.streak = match self.last_scan_day {
            None => 1,
            Some(last) if last == day => self.streak,
            Some(last) if last.succ_opt() == Some(day) => self.streak + 1,
            Some(_) => 1,
        };
        self.last_scan_day = Some(day);
    }
}

/// Newest-first history capped at [`MAX_SCAN_HISTORY`], plus stats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanLedger {
    history: Vec<ScanRecord>,
    stats: RecyclingStats,
}

impl ScanLedger {
    pub fn history(&self) -> &[ScanRecord] {
        &self.history
    }

    pub fn stats(&self) -> &RecyclingStats {
        &self.stats
    }

    pub fn record(
        &mut self,
        result: IdentificationResult,
        mode: ScanMode,
        now: DateTime<Utc>,
    ) -> &ScanRecord {
        self.stats.count(result.recyclable, now.date_naive());
        self.history.insert(
            0,
            ScanRecord {
                id: Uuid::new_v4(),
                scanned_at: now,
                mode,
                result,
            },
        );
        self.history.truncate(MAX_SCAN_HISTORY);
        &self.history[0]
    }

    /// Missing documents load as an empty ledger.
    pub async fn load(storage: &dyn Storage) -> CoreResult<Self> {
        let mut history: Vec<ScanRecord> = match storage.read(&[HISTORY_KEY]).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|error| CoreError::Internal(format!("invalid scan history: {error}")))?,
            None => Vec::new(),
        };
        history.truncate(MAX_SCAN_HISTORY);
        let stats = match storage.read(&[STATS_KEY]).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|error| CoreError::Internal(format!("invalid recycling stats: {error}")))?,
            None => RecyclingStats::default(),
        };
        Ok(Self { history, stats })
    }

    pub async fn save(&self, storage: &dyn Storage) -> CoreResult<()> {
        let history = serde_json::to_value(&self.history)
            .map_err(|error| CoreError::Internal(format!("scan history serialize error: {error}")))?;
        let stats = serde_json::to_value(&self.stats)
            .map_err(|error| CoreError::Internal(format!("stats serialize error: {error}")))?;
        storage.write(&[HISTORY_KEY], &history).await?;
        storage.write(&[STATS_KEY], &stats).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use chrono::{Duration, TimeZone};
    use ecosort_identify::Category;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn can() -> IdentificationResult {
        IdentificationResult::classified("Aluminum Can", Category::Metal, true)
    }

    #[test]
    fn fresh_stats_start_at_level_one() {
        let stats = RecyclingStats::default();
        assert_eq!(stats.items_scanned, 0);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.level, 1);
    }

    #[test]
    fn recyclable_scans_add_co2() {
        let mut ledger = ScanLedger::default();
        ledger.record(can(), ScanMode::Camera, at(1, 9));
        ledger.record(IdentificationResult::unidentified(), ScanMode::Camera, at(1, 10));
        assert_eq!(ledger.stats().items_scanned, 2);
        assert_eq!(ledger.stats().co2_saved_kg, 0.5);
    }

    #[test]
    fn level_rises_every_ten_items() {
        let mut ledger = ScanLedger::default();
        for _ in 0..9 {
            ledger.record(can(), ScanMode::Camera, at(1, 9));
        }
        assert_eq!(ledger.stats().level, 1);
        ledger.record(can(), ScanMode::Camera, at(1, 9));
        assert_eq!(ledger.stats().level, 2);
    }

    #[test]
    fn history_is_newest_first_and_capped() {
        let mut ledger = ScanLedger::default();
        let start = at(1, 0);
        for i in 0..(MAX_SCAN_HISTORY + 5) {
            let result = IdentificationResult::unmatched_query(format!("item {i}"));
            ledger.record(result, ScanMode::Search, start + Duration::minutes(i as i64));
        }
        assert_eq!(ledger.history().len(), MAX_SCAN_HISTORY);
        assert_eq!(ledger.history()[0].result.item, "item 54");
        assert_eq!(ledger.stats().items_scanned, 55);
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let mut ledger = ScanLedger::default();
        ledger.record(can(), ScanMode::Camera, at(1, 9));
        ledger.record(can(), ScanMode::Camera, at(1, 20));
        assert_eq!(ledger.stats().streak, 1);
        ledger.record(can(), ScanMode::Barcode, at(2, 8));
        ledger.record(can(), ScanMode::Camera, at(3, 8));
        assert_eq!(ledger.stats().streak, 3);
        ledger.record(can(), ScanMode::Camera, at(6, 8));
        assert_eq!(ledger.stats().streak, 1);
    }

    #[tokio::test]
    async fn saves_and_loads_through_storage() {
        let storage = MemoryStorage::new();
        let empty = ScanLedger::load(&storage).await.unwrap();
        assert_eq!(empty, ScanLedger::default());

        let mut ledger = ScanLedger::default();
        ledger.record(can(), ScanMode::Camera, at(4, 12));
        ledger.save(&storage).await.unwrap();

        let loaded = ScanLedger::load(&storage).await.unwrap();
        assert_eq!(loaded, ledger);
    }
}
