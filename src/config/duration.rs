// src/config/duration.rs

use std::time::Duration;

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let too_large = || format!("duration '{s}' is too large");
    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => value
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(too_large),
        "h" => value
            .checked_mul(60 * 60)
            .map(Duration::from_secs)
            .ok_or_else(too_large),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
