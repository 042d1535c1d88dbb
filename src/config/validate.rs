// src/config/validate.rs

use globset::Glob;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DevloopError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DevloopError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let quiet_period = parse_duration(&raw.debounce.quiet_period)
            .map_err(|e| DevloopError::ConfigError(format!("[debounce].quiet_period: {e}")))?;
        Ok(ConfigFile::new_unchecked(
            raw.watch,
            raw.build,
            quiet_period,
            raw.run,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_extensions(cfg)?;
    validate_temp_patterns(cfg)?;
    validate_build(cfg)?;
    validate_quiet_period(cfg)?;
    Ok(())
}

fn validate_extensions(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.extensions.is_empty() {
        return Err(DevloopError::ConfigError(
            "[watch].extensions must list at least one extension".to_string(),
        ));
    }
    if let Some(bad) = cfg.watch.extensions.iter().find(|e| e.trim().trim_start_matches('.').is_empty()) {
        return Err(DevloopError::ConfigError(format!(
            "[watch].extensions contains an empty extension ({bad:?})"
        )));
    }
    Ok(())
}

fn validate_temp_patterns(cfg: &RawConfigFile) -> Result<()> {
    for pat in cfg.watch.temp_patterns.iter() {
        Glob::new(pat).map_err(|e| {
            DevloopError::ConfigError(format!("[watch].temp_patterns: invalid pattern {pat:?}: {e}"))
        })?;
    }
    Ok(())
}

fn validate_build(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.program.trim().is_empty() {
        return Err(DevloopError::ConfigError(
            "[build].program must not be empty".to_string(),
        ));
    }
    if cfg.build.vendor && cfg.build.vendor_command.is_empty() {
        return Err(DevloopError::ConfigError(
            "[build].vendor is enabled but [build].vendor_command is empty".to_string(),
        ));
    }
    if let Some(name) = &cfg.build.app_name {
        if name.trim().is_empty() {
            return Err(DevloopError::ConfigError(
                "[build].app_name must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_quiet_period(cfg: &RawConfigFile) -> Result<()> {
    let period = parse_duration(&cfg.debounce.quiet_period)
        .map_err(|e| DevloopError::ConfigError(format!("[debounce].quiet_period: {e}")))?;
    if period.is_zero() {
        return Err(DevloopError::ConfigError(
            "[debounce].quiet_period must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
