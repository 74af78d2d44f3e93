use crate::libs::block::{AlignmentBlock, GAP};
use crate::libs::config::StreamConfig;
use crate::libs::error::Result;

/// Rows with a larger share of gaps and `N` are dropped by [`trim`].
pub const MAX_EMPTY_FRACTION: f64 = 0.95;

/// Removes the columns where the target row has leading or trailing gaps, then
/// drops nearly empty species rows. The target and the first other species
/// are always kept.
pub fn trim(block: AlignmentBlock) -> Result<AlignmentBlock> {
    if block.is_empty() {
        return Ok(block);
    }

    let (lead, end) = {
        let text = block.rows()[0].text.as_bytes();
        let lead = text.iter().take_while(|b| **b == GAP as u8).count();
        let trail = text[lead..]
            .iter()
            .rev()
            .take_while(|b| **b == GAP as u8)
            .count();
        (lead, text.len() - trail)
    };

    let mut block = if lead == 0 && end == block.width() {
        block
    } else {
        block.slice_columns(lead, end)?
    };

    block.retain_rows(|i, row| i < 2 || row.empty_fraction() <= MAX_EMPTY_FRACTION);
    Ok(block)
}

/// Whether a trimmed block is worth emitting.
pub fn admit(block: &AlignmentBlock, config: &StreamConfig) -> bool {
    block.species_count() >= config.min_block_rows
        && block.ungapped_target_length() >= config.min_block_length
}
