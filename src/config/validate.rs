// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PaddockError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PaddockError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

/// Run every semantic check on a raw config.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_layout(cfg)?;
    validate_playback(cfg)?;
    validate_allocation(cfg)?;
    Ok(())
}

fn validate_layout(cfg: &RawConfigFile) -> Result<()> {
    let layout = &cfg.layout;

    let lengths = [
        ("rank_spacing", layout.rank_spacing, true),
        ("node_spacing", layout.node_spacing, true),
        ("node_width", layout.node_width, false),
        ("node_height", layout.node_height, false),
    ];
    for (name, value, zero_ok) in lengths {
        let valid = value.is_finite() && (value > 0.0 || (zero_ok && value == 0.0));
        if !valid {
            return Err(PaddockError::ConfigError(format!(
                "[layout].{name} must be {} (got {value})",
                if zero_ok { ">= 0" } else { "> 0" }
            )));
        }
    }

    if layout.ordering_passes == 0 {
        return Err(PaddockError::ConfigError(
            "[layout].ordering_passes must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_playback(cfg: &RawConfigFile) -> Result<()> {
    // `speed` is strongly typed and validated during deserialization.
    if cfg.playback.base_interval_ms == 0 {
        return Err(PaddockError::ConfigError(
            "[playback].base_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_allocation(cfg: &RawConfigFile) -> Result<()> {
    if cfg.allocation.step == 0 {
        return Err(PaddockError::ConfigError(
            "[allocation].step must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
