use crate::modules::time_tracking::core::time_block::TimeBlock;
use crate::shared::core::primitives::minutes_between;
use std::collections::HashMap;

/// Logged minutes per ticket id. Each block is rounded to whole minutes before summing;
/// blocks whose end is not after their start contribute nothing.
pub fn ticket_totals(blocks: &[TimeBlock]) -> HashMap<String, i64> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for block in blocks.iter().filter(|block| block.end > block.start) {
        *totals.entry(block.ticket_id.clone()).or_default() += minutes_between(block.start, block.end);
    }
    totals
}

/// `45m`, `2h`, `1h 30m`.
pub fn format_minutes(total_minutes: i64) -> String {
    let minutes = total_minutes.max(0);
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    match minutes % 60 {
        0 => format!("{hours}h"),
        remainder => format!("{hours}h {remainder}m"),
    }
}
