use crate::libs::block::{AlignmentBlock, Row};
use crate::libs::error::{MafError, Result};

/// How two neighbouring blocks line up, species by species.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Continuity {
    /// Largest inter-block distance among the continuous species
    pub max_gap: u64,
    pub target_discontinuous: bool,
    /// Non-target species that break continuity, in the order of the first block
    pub discontinuous_species: Vec<String>,
}

/// Distance from the end of `left` to the start of `right`, or `None` when the
/// strands differ, the rows overlap or the distance exceeds `allowed_dist`.
pub fn row_gap(left: &Row, right: &Row, allowed_dist: u64) -> Option<u64> {
    if left.strand != right.strand {
        return None;
    }
    let end = left.end();
    if right.start < end {
        return None;
    }
    let gap = right.start - end;
    (gap <= allowed_dist).then_some(gap)
}

/// Compares the rows of `a` with the rows of `b`, where `a` precedes `b` on the
/// target genome.
///
/// The target rows are matched by position and must name the same sequence,
/// all other rows are matched by species name.
/// Species present in only one of the blocks are not considered.
pub fn analyze(a: &AlignmentBlock, b: &AlignmentBlock, allowed_dist: u64) -> Result<Continuity> {
    let target_a = a.target()?;
    let target_b = b.target()?;
    if target_a.start > target_b.start {
        return Err(MafError::OrderingViolation {
            first: target_a.start,
            second: target_b.start,
        });
    }

    let mut result = Continuity::default();
    if target_a.name != target_b.name {
        // different reference sequences never join
        result.target_discontinuous = true;
        return Ok(result);
    }
    match row_gap(target_a, target_b, allowed_dist) {
        Some(gap) => result.max_gap = gap,
        None => result.target_discontinuous = true,
    }

    for row_a in &a.rows()[1..] {
        let Some(row_b) = b.rows()[1..].iter().find(|r| r.name == row_a.name) else {
            continue;
        };
        match row_gap(row_a, row_b, allowed_dist) {
            Some(gap) => result.max_gap = result.max_gap.max(gap),
            None => result.discontinuous_species.push(row_a.name.clone()),
        }
    }

    Ok(result)
}
