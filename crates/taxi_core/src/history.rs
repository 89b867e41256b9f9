//! Versioned JSON ride-history store with atomic full-file rewrites.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::drivers::Driver;
use crate::ecs::RideStatus;
use crate::spatial::GeoPoint;
use crate::tariff::TariffTier;

pub const HISTORY_FILE_NAME: &str = "ride_history.json";
pub const HISTORY_FILE_VERSION: u32 = 1;

/// One finished ride as written to the history file. Timestamps are
/// unix epoch milliseconds. `status` is always terminal for records
/// produced by the booking operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRecord {
    pub id: Uuid,
    pub requester_id: String,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub tier: TariffTier,
    pub status: RideStatus,
    pub fare: f64,
    pub driver_id: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub driver_car_model: Option<String>,
    pub driver_car_plate: Option<String>,
    pub requested_at_ms: u64,
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
}

impl RideRecord {
    pub fn with_driver(mut self, driver: &Driver) -> Self {
        self.driver_id = Some(driver.id.clone());
        self.driver_name = Some(driver.name.clone());
        self.driver_phone = Some(driver.phone.clone());
        self.driver_car_model = Some(driver.car_model.clone());
        self.driver_car_plate = Some(driver.car_plate.clone());
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryFileV1 {
    version: u32,
    rides: Vec<RideRecord>,
}

#[derive(Debug)]
pub enum HistoryStoreError {
    Io(String),
    InvalidFormat(String),
}

impl fmt::Display for HistoryStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryStoreError::Io(message) => write!(f, "{message}"),
            HistoryStoreError::InvalidFormat(message) => write!(f, "{message}"),
        }
    }
}

/// Outcome of reading the history file. A missing file and a valid file
/// with no rides both read as `Empty`; `Corrupt` means the file exists
/// but cannot be trusted, so callers should start fresh rather than
/// overwrite blindly.
#[derive(Debug)]
pub enum HistoryLoad {
    Records(Vec<RideRecord>),
    Empty,
    Corrupt(HistoryStoreError),
}

pub fn history_file_path() -> Result<PathBuf, HistoryStoreError> {
    let cwd = std::env::current_dir().map_err(|error| {
        HistoryStoreError::Io(format!("failed to read current directory: {error}"))
    })?;
    Ok(cwd.join(HISTORY_FILE_NAME))
}

pub fn load_history(path: &Path) -> HistoryLoad {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return HistoryLoad::Empty,
        Err(error) => {
            return HistoryLoad::Corrupt(HistoryStoreError::Io(format!(
                "failed to read history file '{}': {error}",
                path.display()
            )))
        }
    };

    let file: HistoryFileV1 = match serde_json::from_str(&contents) {
        Ok(file) => file,
        Err(error) => {
            return HistoryLoad::Corrupt(HistoryStoreError::InvalidFormat(format!(
                "invalid history file '{}': {error}",
                path.display()
            )))
        }
    };

    if file.version != HISTORY_FILE_VERSION {
        return HistoryLoad::Corrupt(HistoryStoreError::InvalidFormat(format!(
            "unsupported history file version {} in '{}'",
            file.version,
            path.display()
        )));
    }

    if file.rides.is_empty() {
        HistoryLoad::Empty
    } else {
        HistoryLoad::Records(file.rides)
    }
}

/// Load variant for session startup: a corrupt file logs a warning and
/// yields an empty history instead of failing.
pub fn load_history_or_empty(path: &Path) -> Vec<RideRecord> {
    match load_history(path) {
        HistoryLoad::Records(records) => records,
        HistoryLoad::Empty => Vec::new(),
        HistoryLoad::Corrupt(error) => {
            warn!(error = %error, "history file unreadable, starting with empty history");
            Vec::new()
        }
    }
}

/// Rewrites the whole history file. Records are stored newest first,
/// in the order given.
pub fn save_history(path: &Path, records: &[RideRecord]) -> Result<(), HistoryStoreError> {
    let file = HistoryFileV1 {
        version: HISTORY_FILE_VERSION,
        rides: records.to_vec(),
    };
    save_history_atomic(path, &file)
}

fn save_history_atomic(path: &Path, file: &HistoryFileV1) -> Result<(), HistoryStoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            HistoryStoreError::Io(format!(
                "failed to create history directory '{}': {error}",
                parent.display()
            ))
        })?;
    }

    let serialized = serde_json::to_string_pretty(file).map_err(|error| {
        HistoryStoreError::Io(format!("failed to serialize history to json: {error}"))
    })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("json.tmp.{nanos}"));
    let mut temp_file = File::create(&temp_path).map_err(|error| {
        HistoryStoreError::Io(format!(
            "failed to create temp history file '{}': {error}",
            temp_path.display()
        ))
    })?;
    temp_file
        .write_all(serialized.as_bytes())
        .map_err(|error| {
            HistoryStoreError::Io(format!(
                "failed to write temp history file '{}': {error}",
                temp_path.display()
            ))
        })?;
    temp_file.sync_all().map_err(|error| {
        HistoryStoreError::Io(format!(
            "failed to flush temp history file '{}': {error}",
            temp_path.display()
        ))
    })?;

    replace_file(&temp_path, path)?;
    Ok(())
}

fn replace_file(temp_path: &Path, target_path: &Path) -> Result<(), HistoryStoreError> {
    match fs::rename(temp_path, target_path) {
        Ok(()) => Ok(()),
        Err(first_error) => {
            if target_path.exists() {
                fs::remove_file(target_path).map_err(|remove_error| {
                    let _ = fs::remove_file(temp_path);
                    HistoryStoreError::Io(format!(
                        "failed to replace history file '{}': {first_error}; remove failed: {remove_error}",
                        target_path.display()
                    ))
                })?;
                fs::rename(temp_path, target_path).map_err(|rename_error| {
                    let _ = fs::remove_file(temp_path);
                    HistoryStoreError::Io(format!(
                        "failed to move temp history file '{}' to '{}': {rename_error}",
                        temp_path.display(),
                        target_path.display()
                    ))
                })
            } else {
                let _ = fs::remove_file(temp_path);
                Err(HistoryStoreError::Io(format!(
                    "failed to move temp history file '{}' to '{}': {first_error}",
                    temp_path.display(),
                    target_path.display()
                )))
            }
        }
    }
}

/// In-memory ride history for the session, newest record first.
#[derive(Debug, Default, Resource)]
pub struct RideHistory {
    records: Vec<RideRecord>,
}

impl RideHistory {
    pub fn from_records(records: Vec<RideRecord>) -> Self {
        Self { records }
    }

    /// New records go to the front so the most recent ride is first.
    pub fn append(&mut self, record: RideRecord) {
        self.records.insert(0, record);
    }

    pub fn records(&self) -> &[RideRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Writes the history as a flat CSV table, newest record first.
pub fn export_history_csv(path: &Path, records: &[RideRecord]) -> Result<(), HistoryStoreError> {
    let file = File::create(path).map_err(|error| {
        HistoryStoreError::Io(format!(
            "failed to create csv file '{}': {error}",
            path.display()
        ))
    })?;
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "id",
        "requester_id",
        "pickup_address",
        "dropoff_address",
        "pickup_lat",
        "pickup_lon",
        "dropoff_lat",
        "dropoff_lon",
        "tier",
        "status",
        "fare",
        "driver_id",
        "driver_name",
        "driver_phone",
        "driver_car_model",
        "driver_car_plate",
        "requested_at_ms",
        "started_at_ms",
        "completed_at_ms",
    ])
    .map_err(|error| HistoryStoreError::Io(format!("failed to write csv header: {error}")))?;

    for record in records {
        wtr.write_record([
            &record.id.to_string(),
            &record.requester_id,
            &record.pickup_address,
            &record.dropoff_address,
            &record.pickup.latitude.to_string(),
            &record.pickup.longitude.to_string(),
            &record.dropoff.latitude.to_string(),
            &record.dropoff.longitude.to_string(),
            &record.tier.to_string(),
            &format!("{:?}", record.status),
            &record.fare.to_string(),
            &record.driver_id.clone().unwrap_or_default(),
            &record.driver_name.clone().unwrap_or_default(),
            &record.driver_phone.clone().unwrap_or_default(),
            &record.driver_car_model.clone().unwrap_or_default(),
            &record.driver_car_plate.clone().unwrap_or_default(),
            &record.requested_at_ms.to_string(),
            &record
                .started_at_ms
                .map(|ms| ms.to_string())
                .unwrap_or_default(),
            &record
                .completed_at_ms
                .map(|ms| ms.to_string())
                .unwrap_or_default(),
        ])
        .map_err(|error| HistoryStoreError::Io(format!("failed to write csv row: {error}")))?;
    }

    wtr.flush()
        .map_err(|error| HistoryStoreError::Io(format!("failed to flush csv file: {error}")))?;
    Ok(())
}
