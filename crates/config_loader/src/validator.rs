//! Configuration validation.
//!
//! Rules:
//! - at least one stream
//! - stream names unique and non-empty, paths non-empty
//! - time_offset_ms finite
//! - tolerance_ms (when given) finite and >= 0
//! - frame_interval_ms > 0, speed > 0
//! - sink names unique and non-empty

use std::collections::HashSet;

use contracts::{ContractError, ReplayBlueprint};

/// Validate a ReplayBlueprint.
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &ReplayBlueprint) -> Result<(), ContractError> {
    validate_streams(blueprint)?;
    validate_playback(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_streams(blueprint: &ReplayBlueprint) -> Result<(), ContractError> {
    if blueprint.streams.is_empty() {
        return Err(ContractError::config_validation(
            "streams",
            "at least one stream must be configured",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, stream) in blueprint.streams.iter().enumerate() {
        if stream.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("streams[{idx}].name"),
                "stream name cannot be empty",
            ));
        }
        if !seen.insert(stream.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("streams[name={}]", stream.name),
                "duplicate stream name",
            ));
        }
        if stream.path.as_os_str().is_empty() {
            return Err(ContractError::config_validation(
                format!("streams[{}].path", stream.name),
                "stream path cannot be empty",
            ));
        }
        if !stream.time_offset_ms.is_finite() {
            return Err(ContractError::config_validation(
                format!("streams[{}].time_offset_ms", stream.name),
                format!("time_offset_ms must be finite, got {}", stream.time_offset_ms),
            ));
        }
        if let Some(tolerance) = stream.tolerance_ms {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(ContractError::config_validation(
                    format!("streams[{}].tolerance_ms", stream.name),
                    format!("tolerance_ms must be finite and >= 0, got {tolerance}"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_playback(blueprint: &ReplayBlueprint) -> Result<(), ContractError> {
    let playback = &blueprint.playback;

    if !(playback.frame_interval_ms > 0.0) || !playback.frame_interval_ms.is_finite() {
        return Err(ContractError::config_validation(
            "playback.frame_interval_ms",
            format!(
                "frame_interval_ms must be > 0, got {}",
                playback.frame_interval_ms
            ),
        ));
    }

    if !(playback.speed > 0.0) || !playback.speed.is_finite() {
        return Err(ContractError::config_validation(
            "playback.speed",
            format!("speed must be > 0, got {}", playback.speed),
        ));
    }

    Ok(())
}

fn validate_sinks(blueprint: &ReplayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}
