//! # Reservoir - daily readings for monitored reservoirs
//!
//! Library behind the reservoir integration service: the static catalog of
//! monitored reservoirs and paginated access to their daily water level and
//! volume measurements.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use reservoir::{catalog, read_with_deadline, Page, ReadingFilter, SqlReadingStore, StorageConfig};
//!
//! let store = SqlReadingStore::connect(&StorageConfig::with_url("mysql://reader:secret@db/integration")).await?;
//!
//! let andijan = catalog::lookup(1).expect("known reservoir");
//! let filter = ReadingFilter::new(andijan.id, "2024-01-01", "2024-01-31");
//! let page = Page::new(1, 50).expect("positive page");
//!
//! let result = read_with_deadline(&store, &filter, page, Duration::from_secs(5)).await?;
//! println!("{} days in range, {} on this page", result.total, result.readings.len());
//! ```
//!
//! ## Storage Layout
//!
//! Measurements are stored one value per row:
//!
//! | Column | Description |
//! |--------|-------------|
//! | `reservoir_id` | Catalog id of the reservoir |
//! | `category` | `level` (m) or `volume` (million m³) |
//! | `date` | Measurement date or timestamp |
//! | `value` | Measured value |
//!
//! Queries pivot these rows into one [`DailyReading`] per day, taking the
//! maximum value of each category.

pub mod catalog;
pub mod config;
pub mod error;
pub mod reading;
pub mod store;

// Re-export main types at crate root for convenience
pub use catalog::{Description, Reservoir};
pub use config::StorageConfig;
pub use error::{ReadError, ReadStage, Result, StoreError};
pub use reading::{DailyReading, Page, ReadingFilter};
pub use store::{read_with_deadline, ReadingPage, ReadingStore, SqlReadingStore};
