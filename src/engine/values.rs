//! Scalar parsers for parameter values.

use chrono::NaiveDate;

/// Accepts `Y YES TRUE True true 1` and `N NO FALSE False false 0`.
pub fn parse_bool(s: &str) -> Result<bool, String> {
    match s {
        "Y" | "YES" | "TRUE" | "True" | "true" | "1" => Ok(true),
        "N" | "NO" | "FALSE" | "False" | "false" | "0" => Ok(false),
        _ => Err(format!("cannot convert \"{s}\" to bool")),
    }
}

pub fn parse_integer(s: &str) -> Result<i64, String> {
    s.trim()
        .parse::<i64>()
        .map_err(|e| format!("failed to parse integer \"{s}\": {e}"))
}

/// Dates in `yyyymmdd`, `yyyy-mm-dd` or `dd-mm-yyyy` form; `-`, `/` and `.`
/// are interchangeable separators.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let invalid = || format!("invalid date \"{s}\"");

    let tokens: Vec<&str> = s.split(['-', '/', '.']).collect();
    let (y, m, d) = match tokens.as_slice() {
        [compact] if compact.len() == 8 && compact.is_ascii() => {
            (&compact[0..4], &compact[4..6], &compact[6..8])
        }
        [y, m, d] if y.len() == 4 => (*y, *m, *d),
        [d, m, y] if y.len() == 4 && d.len() <= 2 => (*y, *m, *d),
        _ => return Err(invalid()),
    };

    let field = |t: &str| -> Result<u32, String> {
        if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        t.parse::<u32>().map_err(|_| invalid())
    };
    let year = i32::try_from(field(y)?).map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, field(m)?, field(d)?).ok_or_else(invalid)
}

/// Split a `,`/`;` separated file list, trimming entries and dropping empties.
pub fn split_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
