use crate::libs::block::AlignmentBlock;
use crate::libs::error::Result;

/// Column ranges of overlapping windows over an alignment of `width` columns.
///
/// Windows are `size` wide and advance by half of that. The last window is
/// clamped to `width` and ends the iteration.
///
/// ```
/// use mafstream::libs::split::Windows;
/// let ranges: Vec<_> = Windows::new(5000, 3000).collect();
/// assert_eq!(ranges, vec![(0, 3000), (1500, 4500), (3000, 5000)]);
/// ```
#[derive(Debug, Clone)]
pub struct Windows {
    width: usize,
    size: usize,
    step: usize,
    start: usize,
    done: bool,
}

impl Windows {
    pub fn new(width: usize, size: usize) -> Self {
        Self {
            width,
            size,
            step: (size / 2).max(1),
            start: 0,
            done: false,
        }
    }
}

impl Iterator for Windows {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = self.start;
        let mut end = start + self.size;
        if end >= self.width {
            end = self.width;
            self.done = true;
        }
        self.start += self.step;
        Some((start, end))
    }
}

/// Cuts `block` into overlapping windows of at most `max_width` columns.
///
/// Blocks that already fit are returned unchanged. Each window's target row is
/// labelled with `-split-<i>`.
pub fn split(block: AlignmentBlock, max_width: usize) -> Result<Vec<AlignmentBlock>> {
    let width = block.width();
    if width <= max_width {
        return Ok(vec![block]);
    }

    Windows::new(width, max_width)
        .enumerate()
        .map(|(i, (start, end))| {
            let mut window = block.slice_columns(start, end)?;
            window.rename_target(&format!("-split-{}", i));
            Ok(window)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::block::{block_from_str, count_gaps};

    #[test]
    fn window_ranges() {
        let ranges: Vec<_> = Windows::new(10, 4).collect();
        assert_eq!(ranges, vec![(0, 4), (2, 6), (4, 8), (6, 10)]);

        let ranges: Vec<_> = Windows::new(11, 4).collect();
        assert_eq!(ranges.last(), Some(&(8, 11)));

        // coverage and overlap
        let ranges: Vec<_> = Windows::new(9001, 3000).collect();
        assert_eq!(ranges.first().unwrap().0, 0);
        assert_eq!(ranges.last().unwrap().1, 9001);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1 - pair[1].0, 1500);
        }
    }

    #[test]
    fn short_block_is_kept() {
        let block = block_from_str("a\ns hg38.chr1 0 4 + 100 ACGT\n");
        let parts = split(block.clone(), 4).unwrap();
        assert_eq!(parts, vec![block]);
    }

    #[test]
    fn split_long_block() {
        // 5000 columns, the second species has a gap in every 10 columns
        let target = "ACGTACGTAC".repeat(500);
        let other = "ACGTACGTA-".repeat(500);
        let text = format!(
            "a\ns hg38.chr1 1000 5000 + 100000 {}\ns mm10.chr4 2000 4500 - 200000 {}\n",
            target, other
        );
        let block = block_from_str(&text);
        assert_eq!(block.width(), 5000);

        let parts = split(block, 3000).unwrap();
        assert_eq!(parts.len(), 3);
        let widths: Vec<_> = parts.iter().map(|p| p.width()).collect();
        assert_eq!(widths, vec![3000, 3000, 2000]);

        let names: Vec<_> = parts
            .iter()
            .map(|p| p.target().unwrap().name.clone())
            .collect();
        assert_eq!(
            names,
            vec!["hg38.chr1-split-0", "hg38.chr1-split-1", "hg38.chr1-split-2"]
        );

        let starts: Vec<_> = parts.iter().map(|p| p.target().unwrap().start).collect();
        assert_eq!(starts, vec![1000, 2500, 4000]);

        // 150 gaps before column 1500, 300 before column 3000
        let mm10: Vec<_> = parts
            .iter()
            .map(|p| p.row_for_species("mm10.chr4").unwrap().clone())
            .collect();
        assert_eq!(mm10[0].start, 2000);
        assert_eq!(mm10[1].start, 2000 + 1500 - 150);
        assert_eq!(mm10[2].start, 2000 + 3000 - 300);
        assert_eq!(mm10[0].size, 2700);
        assert_eq!(mm10[2].size, 1800);

        for part in &parts {
            assert!(part.is_rectangular());
            for row in part.rows() {
                assert_eq!(row.size as usize, row.width() - count_gaps(&row.text));
            }
        }
    }
}
