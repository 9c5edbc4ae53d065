use std::fmt::Write;

use crate::table::{Aggregate, AggregationTable};

/// Formats `table` as `key=min/avg/max` entries sorted by key and joined
/// with `", "`.
pub fn render(table: AggregationTable) -> String {
    let entries = table.into_sorted();
    let mut out = String::with_capacity(entries.len() * 32);
    for (count, (key, stats)) in entries.into_iter().enumerate() {
        if count != 0 {
            out.push_str(", ");
        }
        write_entry(&mut out, &key, &stats);
    }
    out
}

/// Same as [`render`], wrapped in braces like the challenge's reference output.
pub fn render_braced(table: AggregationTable) -> String {
    format!("{{{}}}", render(table))
}

fn write_entry(out: &mut String, key: &[u8], stats: &Aggregate) {
    // writing to a String can't fail
    let _ = write!(
        out,
        "{}={}/{}/{}",
        String::from_utf8_lossy(key),
        Tenths(stats.min as i64),
        Tenths(mean_tenths(stats.sum, stats.count)),
        Tenths(stats.max as i64),
    );
}

/// `sum / count` rounded half away from zero, computed exactly.
fn mean_tenths(sum: i64, count: u64) -> i64 {
    debug_assert!(count > 0);
    let (abs, count) = (sum.unsigned_abs() as u128, count as u128);
    let rounded = ((2 * abs + count) / (2 * count)) as i64;
    if sum < 0 {
        -rounded
    } else {
        rounded
    }
}

/// A scaled value printed with one decimal. Zero never carries a sign.
struct Tenths(i64);

impl std::fmt::Display for Tenths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}
