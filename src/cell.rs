//! Extracting an 8x8 cell out of a row-major 2-D block, and the row/class
//! helpers the match searcher needs out of it.

/// Side length of a cell, in bytes.
pub(crate) const CELL_SHAPE: usize = 8;
/// Total bytes in a cell (`CELL_SHAPE * CELL_SHAPE`).
pub(crate) const CELL_SIZE: usize = CELL_SHAPE * CELL_SHAPE;

/// One 8x8 cell of the source block, copied out row by row so its rows are
/// contiguous regardless of the block's actual row stride.
pub(crate) struct Cell {
    bytes: [u8; CELL_SIZE],
}

impl Cell {
    /// Extracts the cell whose top-left corner is `(row0, col0)` in a block
    /// with `cols` columns. Rows/cols beyond the block's real extent must
    /// already be zero-padded into `input` by the caller.
    pub fn extract(input: &[u8], cols: usize, row0: usize, col0: usize) -> Cell {
        let mut bytes = [0u8; CELL_SIZE];
        for r in 0..CELL_SHAPE {
            let src = (row0 + r) * cols + col0;
            bytes[r * CELL_SHAPE..(r + 1) * CELL_SHAPE].copy_from_slice(&input[src..src + CELL_SHAPE]);
        }
        Cell { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; CELL_SIZE] {
        &self.bytes
    }

    pub fn row(&self, i: usize) -> &[u8] {
        &self.bytes[i * CELL_SHAPE..(i + 1) * CELL_SHAPE]
    }

    pub fn all_bytes_equal(&self) -> bool {
        let first = self.bytes[0];
        self.bytes.iter().all(|&b| b == first)
    }

    pub fn first_byte(&self) -> u8 {
        self.bytes[0]
    }
}

/// Concatenates two rows into a fixed-size buffer, in ascending row order.
pub(crate) fn two_rows(cell: &Cell, i: usize, j: usize) -> [u8; 2 * CELL_SHAPE] {
    let mut buf = [0u8; 2 * CELL_SHAPE];
    buf[..CELL_SHAPE].copy_from_slice(cell.row(i));
    buf[CELL_SHAPE..].copy_from_slice(cell.row(j));
    buf
}

/// Concatenates three rows into a fixed-size buffer, in ascending row order.
pub(crate) fn three_rows(cell: &Cell, i: usize, j: usize, k: usize) -> [u8; 3 * CELL_SHAPE] {
    let mut buf = [0u8; 3 * CELL_SHAPE];
    buf[..CELL_SHAPE].copy_from_slice(cell.row(i));
    buf[CELL_SHAPE..2 * CELL_SHAPE].copy_from_slice(cell.row(j));
    buf[2 * CELL_SHAPE..].copy_from_slice(cell.row(k));
    buf
}

/// Concatenates the six rows of `cell` that are *not* `i` or `j`, in
/// ascending row order. Used by the six-row match class, whose key is the
/// cell with one row pair removed.
pub(crate) fn six_excluding(cell: &Cell, i: usize, j: usize) -> [u8; 6 * CELL_SHAPE] {
    let mut buf = [0u8; 6 * CELL_SHAPE];
    let mut n = 0;
    for r in 0..CELL_SHAPE {
        if r != i && r != j {
            buf[n * CELL_SHAPE..(n + 1) * CELL_SHAPE].copy_from_slice(cell.row(r));
            n += 1;
        }
    }
    buf
}

/// The row indices in `0..8` that are not in `excluded`, in ascending order.
/// Returns the filled prefix of the buffer and how many rows it holds.
pub(crate) fn rows_excluding(excluded: &[u8]) -> ([u8; CELL_SHAPE], usize) {
    let mut buf = [0u8; CELL_SHAPE];
    let mut n = 0;
    for r in 0..CELL_SHAPE as u8 {
        if !excluded.contains(&r) {
            buf[n] = r;
            n += 1;
        }
    }
    (buf, n)
}

/// Fixed-size occupancy set over the 8 row indices of a cell, used to track
/// which rows a multi-match already accounted for instead of scanning a
/// decayed pointer the way the original C source's `valueinarray` did.
#[derive(Default, Clone, Copy)]
pub(crate) struct RowSet([bool; CELL_SHAPE]);

impl RowSet {
    pub fn contains(&self, row: usize) -> bool {
        self.0[row]
    }

    pub fn insert(&mut self, row: usize) {
        self.0[row] = true;
    }

    pub fn with(rows: &[usize]) -> RowSet {
        let mut set = RowSet::default();
        for &r in rows {
            set.insert(r);
        }
        set
    }

    pub fn is_disjoint(&self, other: &RowSet) -> bool {
        (0..CELL_SHAPE).all(|r| !(self.0[r] && other.0[r]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential_cell() -> Cell {
        let mut bytes = [0u8; CELL_SIZE];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        Cell { bytes }
    }

    #[test]
    fn six_excluding_skips_the_given_rows_in_order() {
        let cell = sequential_cell();
        let window = six_excluding(&cell, 2, 5);
        let expected_rows = [0u8, 1, 3, 4, 6, 7];
        for (n, &r) in expected_rows.iter().enumerate() {
            assert_eq!(&window[n * CELL_SHAPE..(n + 1) * CELL_SHAPE], cell.row(r as usize));
        }
    }

    #[test]
    fn rows_excluding_complements_the_given_set() {
        let (buf, n) = rows_excluding(&[0, 7]);
        assert_eq!(&buf[..n], &[1, 2, 3, 4, 5, 6]);

        let (buf, n) = rows_excluding(&[]);
        assert_eq!(&buf[..n], &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn rowset_disjointness() {
        let a = RowSet::with(&[0, 1, 2]);
        let b = RowSet::with(&[3, 4]);
        let c = RowSet::with(&[2, 5]);
        assert!(a.is_disjoint(&b));
        assert!(!a.is_disjoint(&c));
    }
}
