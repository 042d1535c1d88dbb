// src/config/duration.rs

use std::time::Duration;

/// Parse a duration such as `"250ms"`, `"1s"`, `"1.5s"` or `"1m30s"`.
///
/// Units: `ms`, `s`, `m`, `h`. Every number needs a unit.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let mut rest = input.trim();
    if rest.is_empty() {
        return Err("empty duration string".to_string());
    }

    let mut nanos = 0f64;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("duration {input:?} is missing a unit suffix"))?;
        if num_len == 0 {
            return Err(format!("expected a number in duration {input:?}"));
        }
        let (number, tail) = rest.split_at(num_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);

        let value: f64 = number
            .parse()
            .map_err(|e| format!("invalid number {number:?} in duration: {e}"))?;
        nanos += value * unit_nanos(unit.trim())?;
        rest = next.trim_start();
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(format!("duration {input:?} is out of range"));
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}

fn unit_nanos(unit: &str) -> Result<f64, String> {
    match unit.to_ascii_lowercase().as_str() {
        "ms" => Ok(1e6),
        "s" => Ok(1e9),
        "m" => Ok(60e9),
        "h" => Ok(3600e9),
        other => Err(format!(
            "unsupported duration unit {other:?}; expected ms, s, m or h"
        )),
    }
}
