//! The NDLZ-8 encoder: the row-major cell driver, the match searcher, and
//! the token emitter.
//!
//! The match searcher tries, in order, a whole-cell match, an all-bytes-equal
//! run, a six-row match, one or two row-triple matches, and one to three
//! row-pair matches, falling back to a literal cell when none apply. Only a
//! literal cell feeds its rows back into the fingerprint index: speculative
//! matches are never inserted, so a match that's discarded for want of
//! output space can't poison the tables with references to bytes that were
//! never written (see `SPEC_FULL.md` §9 "Deferred inserts").

use crate::cell::{rows_excluding, six_excluding, three_rows, two_rows, Cell, RowSet, CELL_SHAPE, CELL_SIZE};
use crate::cursor::OutCursor;
use crate::error::CompressError;
use crate::hash::{fingerprint, FingerprintIndex, MAX_DISTANCE};
use crate::token::{
    pack_pair, pack_quad, pack_sextuple, pack_triple, Header, HEADER_LEN, TAG_CELL_MATCH, TAG_LITERAL,
    TAG_ONE_PAIR, TAG_ONE_TRIPLE, TAG_RLE, TAG_SIX_ROW, TAG_THREE_PAIRS, TAG_TWO_PAIRS, TAG_TWO_TRIPLES,
};
use crate::Block2D;
use fehler::{throw, throws};

/// One decided match for the cell currently being encoded. Carries
/// everything the emitter needs; no further table lookups happen once this
/// is built.
enum Match {
    Literal,
    CellRle(u8),
    Cell { offset: u16 },
    SixRow { i: u8, j: u8, offset: u16 },
    OneTriple { rows: [u8; 3], offset: u16 },
    TwoTriples { rows: [u8; 6], offset1: u16, offset2: u16 },
    OnePair { rows: [u8; 2], offset: u16 },
    TwoPairs { rows: [u8; 4], offset1: u16, offset2: u16 },
    ThreePairs { rows: [u8; 6], offset1: u16, offset2: u16, offset3: u16 },
}

/// Verifies a candidate window against the bytes already written at
/// `ref_pos`, and turns it into a back-offset from `anchor` if it's both a
/// real match and within `MAX_DISTANCE`.
fn verified_offset(written: &[u8], ref_pos: u32, window: &[u8], anchor: usize) -> Option<u16> {
    let ref_pos = ref_pos as usize;
    if ref_pos >= anchor || ref_pos + window.len() > written.len() {
        return None;
    }
    if &written[ref_pos..ref_pos + window.len()] != window {
        return None;
    }
    let distance = anchor - ref_pos;
    if distance == 0 || distance as u32 >= MAX_DISTANCE {
        return None;
    }
    Some(distance as u16)
}

/// Scans triples in lexicographic `(i, j, k)` order, skipping any triple
/// that overlaps `exclude`, and returns the first verified match.
fn find_triple(
    cell: &Cell,
    idx: &FingerprintIndex,
    anchor: usize,
    written: &[u8],
    exclude: Option<&RowSet>,
) -> Option<([u8; 3], u16)> {
    for i in 0..6usize {
        for j in (i + 1)..7usize {
            for k in (j + 1)..8usize {
                if let Some(ex) = exclude {
                    if ex.contains(i) || ex.contains(j) || ex.contains(k) {
                        continue;
                    }
                }
                let window = three_rows(cell, i, j, k);
                let h = fingerprint(&window);
                if let Some(ref_pos) = idx.triple.lookup(h) {
                    if let Some(offset) = verified_offset(written, ref_pos, &window, anchor) {
                        return Some(([i as u8, j as u8, k as u8], offset));
                    }
                }
            }
        }
    }
    None
}

/// Scans pairs in lexicographic `(i, j)` order, skipping any pair that
/// overlaps `exclude`, and returns the first verified match.
fn find_pair(
    cell: &Cell,
    idx: &FingerprintIndex,
    anchor: usize,
    written: &[u8],
    exclude: Option<&RowSet>,
) -> Option<([u8; 2], u16)> {
    for i in 0..7usize {
        for j in (i + 1)..8usize {
            if let Some(ex) = exclude {
                if ex.contains(i) || ex.contains(j) {
                    continue;
                }
            }
            let window = two_rows(cell, i, j);
            let h = fingerprint(&window);
            if let Some(ref_pos) = idx.pair.lookup(h) {
                if let Some(offset) = verified_offset(written, ref_pos, &window, anchor) {
                    return Some(([i as u8, j as u8], offset));
                }
            }
        }
    }
    None
}

/// Runs the whole class-priority search of `spec.md` §4.4 for a single
/// cell and decides what to emit. Does not write anything and does not
/// touch the fingerprint index.
fn find_match(cell: &Cell, idx: &FingerprintIndex, anchor: usize, written: &[u8]) -> Match {
    let cell_hash = fingerprint(cell.as_bytes());
    if let Some(ref_pos) = idx.cell.lookup(cell_hash) {
        if let Some(offset) = verified_offset(written, ref_pos, cell.as_bytes(), anchor) {
            return Match::Cell { offset };
        }
    }

    if cell.all_bytes_equal() {
        return Match::CellRle(cell.first_byte());
    }

    for i in 0..7usize {
        for j in (i + 1)..8usize {
            let window = six_excluding(cell, i, j);
            let h = fingerprint(&window);
            if let Some(ref_pos) = idx.six.lookup(h) {
                if let Some(offset) = verified_offset(written, ref_pos, &window, anchor) {
                    return Match::SixRow { i: i as u8, j: j as u8, offset };
                }
            }
        }
    }

    if let Some((rows, offset)) = find_triple(cell, idx, anchor, written, None) {
        let used = RowSet::with(&[rows[0] as usize, rows[1] as usize, rows[2] as usize]);
        if let Some((rows2, offset2)) = find_triple(cell, idx, anchor, written, Some(&used)) {
            return Match::TwoTriples {
                rows: [rows[0], rows[1], rows[2], rows2[0], rows2[1], rows2[2]],
                offset1: offset,
                offset2,
            };
        }
        return Match::OneTriple { rows, offset };
    }

    if let Some((rows, offset)) = find_pair(cell, idx, anchor, written, None) {
        let mut used = RowSet::with(&[rows[0] as usize, rows[1] as usize]);
        if let Some((rows2, offset2)) = find_pair(cell, idx, anchor, written, Some(&used)) {
            used.insert(rows2[0] as usize);
            used.insert(rows2[1] as usize);
            if let Some((rows3, offset3)) = find_pair(cell, idx, anchor, written, Some(&used)) {
                return Match::ThreePairs {
                    rows: [rows[0], rows[1], rows2[0], rows2[1], rows3[0], rows3[1]],
                    offset1: offset,
                    offset2,
                    offset3,
                };
            }
            return Match::TwoPairs {
                rows: [rows[0], rows[1], rows2[0], rows2[1]],
                offset1: offset,
                offset2,
            };
        }
        return Match::OnePair { rows, offset };
    }

    Match::Literal
}

fn emit_inline_rows(out: &mut OutCursor, cell: &Cell, matched: &[u8]) -> bool {
    let (rows, n) = rows_excluding(matched);
    for &r in &rows[..n] {
        if !out.put_bytes(cell.row(r as usize)) {
            return false;
        }
    }
    true
}

#[must_use]
fn emit(out: &mut OutCursor, cell: &Cell, m: &Match) -> bool {
    match m {
        Match::Literal => out.put_u8(TAG_LITERAL) && out.put_bytes(cell.as_bytes()),
        Match::CellRle(v) => out.put_u8(TAG_RLE) && out.put_u8(*v),
        Match::Cell { offset } => out.put_u8(TAG_CELL_MATCH) && out.put_u16_le(*offset),
        Match::SixRow { i, j, offset } => {
            out.put_u8(TAG_SIX_ROW)
                && out.put_u8(pack_pair(*i, *j))
                && out.put_u16_le(*offset)
                && out.put_bytes(cell.row(*i as usize))
                && out.put_bytes(cell.row(*j as usize))
        }
        Match::OneTriple { rows, offset } => {
            out.put_u8(TAG_ONE_TRIPLE)
                && out.put_u16_le(pack_triple(rows[0], rows[1], rows[2]))
                && out.put_u16_le(*offset)
                && emit_inline_rows(out, cell, rows)
        }
        Match::TwoTriples { rows, offset1, offset2 } => {
            out.put_u8(TAG_TWO_TRIPLES)
                && out.put_u24_le(pack_sextuple(*rows))
                && out.put_u16_le(*offset1)
                && out.put_u16_le(*offset2)
                && emit_inline_rows(out, cell, rows)
        }
        Match::OnePair { rows, offset } => {
            out.put_u8(TAG_ONE_PAIR)
                && out.put_u8(pack_pair(rows[0], rows[1]))
                && out.put_u16_le(*offset)
                && emit_inline_rows(out, cell, rows)
        }
        Match::TwoPairs { rows, offset1, offset2 } => {
            out.put_u8(TAG_TWO_PAIRS)
                && out.put_u16_le(pack_quad(rows[0], rows[1], rows[2], rows[3]))
                && out.put_u16_le(*offset1)
                && out.put_u16_le(*offset2)
                && emit_inline_rows(out, cell, rows)
        }
        Match::ThreePairs { rows, offset1, offset2, offset3 } => {
            out.put_u8(TAG_THREE_PAIRS)
                && out.put_u24_le(pack_sextuple(*rows))
                && out.put_u16_le(*offset1)
                && out.put_u16_le(*offset2)
                && out.put_u16_le(*offset3)
                && emit_inline_rows(out, cell, rows)
        }
    }
}

/// Feeds a just-emitted literal cell's rows into the four tables, restricted
/// to the adjacent row windows named in `spec.md` §4.4: the three fixed
/// six-row exclusion pairs, the six contiguous triples, and the seven
/// adjacent pairs. `literal_payload_start` is the output position of the
/// cell's first raw byte (its anchor plus the one token byte).
fn deferred_insert(idx: &mut FingerprintIndex, cell: &Cell, literal_payload_start: usize) {
    idx.cell.insert(fingerprint(cell.as_bytes()), literal_payload_start as u32);

    for &(i, j, start_row) in &[(0usize, 1usize, 2usize), (0, 7, 1), (6, 7, 0)] {
        let window = six_excluding(cell, i, j);
        let h = fingerprint(&window);
        idx.six.insert(h, (literal_payload_start + start_row * CELL_SHAPE) as u32);
    }

    for i in 0..=5usize {
        let window = three_rows(cell, i, i + 1, i + 2);
        let h = fingerprint(&window);
        idx.triple.insert(h, (literal_payload_start + i * CELL_SHAPE) as u32);
    }

    for i in 0..=6usize {
        let window = two_rows(cell, i, i + 1);
        let h = fingerprint(&window);
        idx.pair.insert(h, (literal_payload_start + i * CELL_SHAPE) as u32);
    }
}

fn pad_extent(size: usize, is_last: bool) -> usize {
    if !is_last {
        return CELL_SHAPE;
    }
    let r = size % CELL_SHAPE;
    if r == 0 {
        CELL_SHAPE
    } else {
        r
    }
}

/// Compresses a single `rows x cols` block.
///
/// `ndim` must be `2`; `is_leftover` mirrors the host framework's signal that
/// this block is a sub-block tail, which this codec does not support.
/// Returns `0` when the block could not be shrunk within `output`'s
/// capacity (not an error: a normal, expected outcome for incompressible or
/// tiny input). Returns `Err` only for caller mistakes: a bad `ndim`, a
/// length that doesn't match `block`, a leftover block, or an `output`
/// buffer smaller than the minimum capacity this block shape requires
/// (the header plus 17 bytes, plus 2 more per cell beyond the first).
#[throws(CompressError)]
pub fn compress(ndim: u8, block: Block2D, is_leftover: bool, input: &[u8], output: &mut [u8]) -> usize {
    if ndim != 2 {
        throw!(CompressError::InvalidNdim(ndim));
    }
    if is_leftover {
        throw!(CompressError::UnsupportedLeftover);
    }

    let rows = block.rows as usize;
    let cols = block.cols as usize;
    let expected = block.len();
    if expected != input.len() as u64 {
        throw!(CompressError::LengthMismatch { expected: expected as usize, got: input.len() });
    }

    if output.len() < HEADER_LEN {
        throw!(CompressError::OutputTooSmall { expected: HEADER_LEN, got: output.len() });
    }

    let grid_rows = (rows + CELL_SHAPE - 1) / CELL_SHAPE;
    let grid_cols = (cols + CELL_SHAPE - 1) / CELL_SHAPE;
    let num_cells = grid_rows * grid_cols;
    let overhead = 17 + 2 * num_cells.saturating_sub(1);

    if output.len() < overhead {
        throw!(CompressError::OutputTooSmall { expected: overhead, got: output.len() });
    }
    if input.len() < CELL_SIZE {
        return 0;
    }

    let mut out = OutCursor::new(output);
    let header = Header { ndim, rows: block.rows, cols: block.cols };
    if !header.encode(&mut out) {
        return 0;
    }

    let mut idx = FingerprintIndex::default();

    for gi in 0..grid_rows {
        for gj in 0..grid_cols {
            let row0 = gi * CELL_SHAPE;
            let col0 = gj * CELL_SHAPE;
            let is_last_row = gi == grid_rows - 1;
            let is_last_col = gj == grid_cols - 1;
            let padded = (is_last_row && rows % CELL_SHAPE != 0) || (is_last_col && cols % CELL_SHAPE != 0);

            if padded {
                let pad_rows = pad_extent(rows, is_last_row);
                let pad_cols = pad_extent(cols, is_last_col);

                if !out.put_u8(TAG_LITERAL) {
                    return 0;
                }
                for r in 0..pad_rows {
                    let src = (row0 + r) * cols + col0;
                    if !out.put_bytes(&input[src..src + pad_cols]) {
                        return 0;
                    }
                }
            } else {
                let cell = Cell::extract(input, cols, row0, col0);
                let anchor = out.position();
                let m = find_match(&cell, &idx, anchor, out.written());
                if !emit(&mut out, &cell, &m) {
                    return 0;
                }
                if matches!(m, Match::Literal) {
                    deferred_insert(&mut idx, &cell, anchor + 1);
                }
            }

            if out.position() > input.len() {
                return 0;
            }
        }
    }

    out.position()
}
