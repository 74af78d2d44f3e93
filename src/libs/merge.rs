use crate::libs::block::{AlignmentBlock, Row, GAP, UNKNOWN};
use crate::libs::config::StreamConfig;
use crate::libs::continuity::analyze;
use crate::libs::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Success(AlignmentBlock),
    /// More species were discontinuous than allowed; carries their number
    Refused(usize),
    /// The target rows themselves are not continuous
    Blocked,
}

/// Joins `a` and the following block `b` into a new block.
///
/// Up to `max_deletions` discontinuous species are dropped from `b`; their rows
/// from `a` are kept and padded with gaps across `b`. Species found in only one
/// block get an all-gap row for the other one. Between the two halves each row
/// receives `N` for its own inter-block distance, padded with gaps up to the
/// largest distance of the group, so the result stays rectangular.
///
/// Neither operand is modified.
pub fn merge(
    a: &AlignmentBlock,
    b: &AlignmentBlock,
    max_deletions: usize,
    allowed_dist: u64,
) -> Result<MergeOutcome> {
    let continuity = analyze(a, b, allowed_dist)?;
    if continuity.target_discontinuous {
        return Ok(MergeOutcome::Blocked);
    }
    let deletions = continuity.discontinuous_species.len();
    if deletions > max_deletions {
        return Ok(MergeOutcome::Refused(deletions));
    }

    let mut b = b.clone();
    b.delete_species(&continuity.discontinuous_species);

    let max_gap = continuity.max_gap;
    let width_a = a.width();
    let width_b = b.width();
    let b_rows = b.rows();

    let mut rows = Vec::with_capacity(a.species_count() + b_rows.len());
    for (i, row_a) in a.rows().iter().enumerate() {
        let row_b = if i == 0 {
            b_rows[0].clone()
        } else {
            match b_rows[1..].iter().find(|r| r.name == row_a.name) {
                Some(row) => row.clone(),
                None => Row::gap_filled(row_a, row_a.end(), width_b),
            }
        };
        rows.push(join_rows(row_a, &row_b, max_gap));
    }

    for row_b in &b_rows[1..] {
        if a.has_species(&row_b.name) {
            continue;
        }
        let row_a = Row::gap_filled(row_b, row_b.start, width_a);
        rows.push(join_rows(&row_a, row_b, max_gap));
    }

    let mut provenance = a.provenance.clone();
    provenance.extend_from_slice(&b.provenance);
    provenance.sort_unstable();
    provenance.dedup();

    Ok(MergeOutcome::Success(AlignmentBlock::from_parts(
        a.meta.clone(),
        rows,
        provenance,
    )))
}

fn join_rows(left: &Row, right: &Row, max_gap: u64) -> Row {
    let dist = right.start.saturating_sub(left.end());
    let pad = max_gap.saturating_sub(dist);

    let mut text = String::with_capacity(left.width() + right.width() + (dist + pad) as usize);
    text.push_str(&left.text);
    text.extend(std::iter::repeat(UNKNOWN).take(dist as usize));
    text.extend(std::iter::repeat(GAP).take(pad as usize));
    text.push_str(&right.text);

    Row {
        name: left.name.clone(),
        start: left.start,
        size: left.size + right.size + dist,
        strand: left.strand,
        src_size: left.src_size,
        text,
    }
}

/// Decides how many species may be sacrificed to join two blocks that both
/// failed the trivial merge.
pub trait DeletionPolicy {
    /// `None` when the pair should not be force-merged at all.
    fn allowed_deletions(
        &self,
        held: &AlignmentBlock,
        next: &AlignmentBlock,
        config: &StreamConfig,
    ) -> Option<usize>;
}

/// Force-merges only blocks that are both shorter than
/// `min_length_before_deletion`, dropping at most
/// `max_species_deletions` species and less than `max_ratio` of the rows of the
/// smaller block. Rows are counted as MAF lines, the `a` line included.
#[derive(Debug, Clone, Copy)]
pub struct RatioPolicy {
    pub max_ratio: f64,
}

impl Default for RatioPolicy {
    fn default() -> Self {
        Self { max_ratio: 0.1 }
    }
}

impl DeletionPolicy for RatioPolicy {
    fn allowed_deletions(
        &self,
        held: &AlignmentBlock,
        next: &AlignmentBlock,
        config: &StreamConfig,
    ) -> Option<usize> {
        let limit = config.min_length_before_deletion;
        if held.ungapped_target_length() >= limit || next.ungapped_target_length() >= limit {
            return None;
        }

        let rows = held.row_count().min(next.row_count());
        if rows == 0 {
            return None;
        }
        let mut allowed = config.max_species_deletions.min(rows);
        while allowed > 0 && allowed as f64 / rows as f64 >= self.max_ratio {
            allowed -= 1;
        }

        (allowed > 0).then_some(allowed)
    }
}
