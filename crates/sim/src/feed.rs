//! Arrival feeds and configuration files.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use u_asrs::core::RotationConstraint;
use u_asrs::{Item, ManagerConfig};

/// Errors that can occur when reading or writing feeds.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid arrival record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Manager(#[from] u_asrs::Error),
}

/// One arriving item as delivered by the external feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    /// Feed identifier
    pub id: String,
    /// Nominal width
    pub width: f64,
    /// Nominal height
    pub height: f64,
    /// Nominal depth
    pub depth: f64,
    /// Weight, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Whether the item may be reoriented
    #[serde(default)]
    pub can_rotate: bool,
}

impl ArrivalRecord {
    /// Builds the item this record describes.
    pub fn to_item(&self) -> Item {
        let item = Item::new(self.id.clone(), self.width, self.height, self.depth)
            .with_rotation(RotationConstraint::from_flag(self.can_rotate));
        match self.weight {
            Some(weight) => item.with_weight(weight),
            None => item,
        }
    }
}

/// Loads a manager configuration from a JSON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ManagerConfig, FeedError> {
    let content = fs::read_to_string(path)?;
    let config: ManagerConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Loads arrival records from a JSON array, validating each one.
pub fn load_arrivals(path: impl AsRef<Path>) -> Result<Vec<ArrivalRecord>, FeedError> {
    let content = fs::read_to_string(path)?;
    let records: Vec<ArrivalRecord> = serde_json::from_str(&content)?;
    for record in &records {
        record
            .to_item()
            .validate()
            .map_err(|e| FeedError::InvalidRecord(e.to_string()))?;
    }
    Ok(records)
}

/// Writes arrival records as a pretty-printed JSON array.
pub fn save_arrivals(records: &[ArrivalRecord], path: impl AsRef<Path>) -> Result<(), FeedError> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}

/// How generated items get their rotation flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    /// Every item may rotate.
    Always,
    /// No item may rotate.
    Never,
    /// Each item flips a coin.
    #[default]
    Random,
}

/// Ranges for random arrivals. Bounds are inclusive and whole-numbered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of records to generate
    pub count: usize,
    /// Width range
    pub min_width: u32,
    pub max_width: u32,
    /// Height range
    pub min_height: u32,
    pub max_height: u32,
    /// Depth range
    pub min_depth: u32,
    pub max_depth: u32,
    /// Rotation flag policy
    pub rotation: RotationMode,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 200,
            min_width: 30,
            max_width: 60,
            min_height: 20,
            max_height: 40,
            min_depth: 30,
            max_depth: 60,
            rotation: RotationMode::Random,
        }
    }
}

impl GeneratorConfig {
    /// Sets the number of records.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Sets the rotation policy.
    pub fn with_rotation(mut self, rotation: RotationMode) -> Self {
        self.rotation = rotation;
        self
    }

    fn validate(&self) -> Result<(), FeedError> {
        let ranges = [
            ("width", self.min_width, self.max_width),
            ("height", self.min_height, self.max_height),
            ("depth", self.min_depth, self.max_depth),
        ];
        for (axis, min, max) in ranges {
            if min == 0 || min > max {
                return Err(FeedError::InvalidRecord(format!(
                    "{} range {}..={} is empty or not positive",
                    axis, min, max
                )));
            }
        }
        Ok(())
    }
}

/// Generates `config.count` records with ids `"1"`, `"2"`, ... from a seed.
pub fn generate_arrivals(
    config: &GeneratorConfig,
    seed: u64,
) -> Result<Vec<ArrivalRecord>, FeedError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(seed);

    let records = (1..=config.count)
        .map(|i| {
            let width = rng.gen_range(config.min_width..=config.max_width);
            let height = rng.gen_range(config.min_height..=config.max_height);
            let depth = rng.gen_range(config.min_depth..=config.max_depth);
            let can_rotate = match config.rotation {
                RotationMode::Always => true,
                RotationMode::Never => false,
                RotationMode::Random => rng.gen_bool(0.5),
            };
            ArrivalRecord {
                id: i.to_string(),
                width: f64::from(width),
                height: f64::from(height),
                depth: f64::from(depth),
                weight: None,
                can_rotate,
            }
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_seeded() {
        let config = GeneratorConfig::default().with_count(50);
        let a = generate_arrivals(&config, 7).unwrap();
        let b = generate_arrivals(&config, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        assert_eq!(a[0].id, "1");
        for record in &a {
            assert!((30.0..=60.0).contains(&record.width));
            assert!((20.0..=40.0).contains(&record.height));
            assert!((30.0..=60.0).contains(&record.depth));
        }
    }

    #[test]
    fn test_rotation_modes() {
        let always = GeneratorConfig::default()
            .with_count(20)
            .with_rotation(RotationMode::Always);
        assert!(generate_arrivals(&always, 1)
            .unwrap()
            .iter()
            .all(|r| r.can_rotate));

        let never = always.with_rotation(RotationMode::Never);
        assert!(generate_arrivals(&never, 1)
            .unwrap()
            .iter()
            .all(|r| !r.can_rotate));
    }

    #[test]
    fn test_empty_range_is_rejected() {
        let config = GeneratorConfig {
            min_height: 50,
            max_height: 40,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            generate_arrivals(&config, 0),
            Err(FeedError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_record_defaults() {
        let json = r#"[{"id": "a", "width": 10, "height": 20, "depth": 30}]"#;
        let records: Vec<ArrivalRecord> = serde_json::from_str(json).unwrap();
        assert!(!records[0].can_rotate);
        assert_eq!(records[0].weight, None);

        let item = records[0].to_item();
        assert_eq!(item.rotation(), RotationConstraint::Fixed);
        assert_eq!(item.id(), "a");
    }

    #[test]
    fn test_config_json_layout() {
        let json = r#"{
            "bin_config": { "width": 100, "height": 100, "depth": 100, "min_adjust_length": 5 },
            "online_priority": [5, 4, 6],
            "offline_priority": [6, 4, 5],
            "pallet_bins": [1],
            "pallet_count": 10,
            "entrance": { "bin": 5, "height": 50 }
        }"#;
        let config: ManagerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.bin_config.weight_limit, None);
        assert_eq!(config.entrance.unwrap().bin, 5);
        assert!(config.validate().is_ok());
    }
}
