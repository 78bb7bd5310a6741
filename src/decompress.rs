//! The NDLZ-8 decoder: token dispatch, back-reference resolution, and row
//! scatter, mirroring `compress`'s match searcher and token emitter.
//!
//! Every back-reference in this format points into the *compressed* byte
//! stream itself (the bytes already read), not into the decompressed
//! destination: a literal cell's raw rows double as the dictionary that
//! later matches reference. `InCursor::produced_so_far` is that dictionary.

use crate::cell::{rows_excluding, CELL_SHAPE, CELL_SIZE};
use crate::cursor::InCursor;
use crate::error::DecompressError;
use crate::token::{
    unpack_pair, unpack_quad, unpack_sextuple, unpack_triple, Header, TAG_CELL_MATCH, TAG_LITERAL,
    TAG_ONE_PAIR, TAG_ONE_TRIPLE, TAG_RLE, TAG_SIX_ROW, TAG_THREE_PAIRS, TAG_TWO_PAIRS, TAG_TWO_TRIPLES,
};
use fehler::{throw, throws};

/// Resolves a back-offset read at `cell_start` into a slice of `len` bytes
/// already produced earlier in the compressed stream.
fn read_back<'a>(cur: &InCursor<'a>, cell_start: usize, offset: u16, len: usize) -> Result<&'a [u8], DecompressError> {
    let offset = offset as usize;
    if offset == 0 || offset > cell_start {
        return Err(DecompressError::InvalidBackReference);
    }
    let ref_pos = cell_start - offset;
    let produced = cur.produced_so_far();
    if ref_pos + len > produced.len() {
        return Err(DecompressError::InvalidBackReference);
    }
    Ok(&produced[ref_pos..ref_pos + len])
}

/// Copies consecutive 8-byte chunks of `window` into `scratch` at the row
/// indices named by `rows`, in the order given.
fn scatter_rows_from_window(scratch: &mut [u8; CELL_SIZE], window: &[u8], rows: &[u8]) {
    for (n, &r) in rows.iter().enumerate() {
        let src = &window[n * CELL_SHAPE..(n + 1) * CELL_SHAPE];
        scratch[r as usize * CELL_SHAPE..(r as usize + 1) * CELL_SHAPE].copy_from_slice(src);
    }
}

fn read_inline_rows(
    cur: &mut InCursor,
    scratch: &mut [u8; CELL_SIZE],
    referenced: &[u8],
) -> Result<(), DecompressError> {
    let (rows, n) = rows_excluding(referenced);
    for &r in &rows[..n] {
        let bytes = cur.read_exact(CELL_SHAPE).ok_or(DecompressError::Truncated)?;
        scratch[r as usize * CELL_SHAPE..(r as usize + 1) * CELL_SHAPE].copy_from_slice(bytes);
    }
    Ok(())
}

/// Reconstructs one non-padded cell's 64 bytes from its token and payload.
fn decode_cell(cur: &mut InCursor, tag: u8, cell_start: usize) -> Result<[u8; CELL_SIZE], DecompressError> {
    let mut scratch = [0u8; CELL_SIZE];

    match tag {
        TAG_LITERAL => {
            let bytes = cur.read_exact(CELL_SIZE).ok_or(DecompressError::Truncated)?;
            scratch.copy_from_slice(bytes);
        }
        TAG_RLE => {
            let v = cur.read_u8().ok_or(DecompressError::Truncated)?;
            scratch = [v; CELL_SIZE];
        }
        TAG_CELL_MATCH => {
            let offset = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let window = read_back(cur, cell_start, offset, CELL_SIZE)?;
            scratch.copy_from_slice(window);
        }
        TAG_SIX_ROW => {
            let packed = cur.read_u8().ok_or(DecompressError::Truncated)?;
            let (i, j) = unpack_pair(packed);
            let offset = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let window = read_back(cur, cell_start, offset, 6 * CELL_SHAPE)?;
            let (rows, n) = rows_excluding(&[i, j]);
            scatter_rows_from_window(&mut scratch, window, &rows[..n]);
            read_inline_rows(cur, &mut scratch, &rows[..n])?;
        }
        TAG_ONE_TRIPLE => {
            let packed = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let (i, j, k) = unpack_triple(packed);
            let offset = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let window = read_back(cur, cell_start, offset, 3 * CELL_SHAPE)?;
            scatter_rows_from_window(&mut scratch, window, &[i, j, k]);
            read_inline_rows(cur, &mut scratch, &[i, j, k])?;
        }
        TAG_TWO_TRIPLES => {
            let packed = cur.read_u24_le().ok_or(DecompressError::Truncated)?;
            let rows = unpack_sextuple(packed);
            let offset1 = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let offset2 = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let w1 = read_back(cur, cell_start, offset1, 3 * CELL_SHAPE)?;
            scatter_rows_from_window(&mut scratch, w1, &rows[..3]);
            let w2 = read_back(cur, cell_start, offset2, 3 * CELL_SHAPE)?;
            scatter_rows_from_window(&mut scratch, w2, &rows[3..6]);
            read_inline_rows(cur, &mut scratch, &rows)?;
        }
        TAG_ONE_PAIR => {
            let packed = cur.read_u8().ok_or(DecompressError::Truncated)?;
            let (i, j) = unpack_pair(packed);
            let offset = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let window = read_back(cur, cell_start, offset, 2 * CELL_SHAPE)?;
            scatter_rows_from_window(&mut scratch, window, &[i, j]);
            read_inline_rows(cur, &mut scratch, &[i, j])?;
        }
        TAG_TWO_PAIRS => {
            let packed = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let (i, j, i2, j2) = unpack_quad(packed);
            let offset1 = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let offset2 = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let w1 = read_back(cur, cell_start, offset1, 2 * CELL_SHAPE)?;
            scatter_rows_from_window(&mut scratch, w1, &[i, j]);
            let w2 = read_back(cur, cell_start, offset2, 2 * CELL_SHAPE)?;
            scatter_rows_from_window(&mut scratch, w2, &[i2, j2]);
            read_inline_rows(cur, &mut scratch, &[i, j, i2, j2])?;
        }
        TAG_THREE_PAIRS => {
            let packed = cur.read_u24_le().ok_or(DecompressError::Truncated)?;
            let rows = unpack_sextuple(packed);
            let offset1 = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let offset2 = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let offset3 = cur.read_u16_le().ok_or(DecompressError::Truncated)?;
            let w1 = read_back(cur, cell_start, offset1, 2 * CELL_SHAPE)?;
            scatter_rows_from_window(&mut scratch, w1, &rows[0..2]);
            let w2 = read_back(cur, cell_start, offset2, 2 * CELL_SHAPE)?;
            scatter_rows_from_window(&mut scratch, w2, &rows[2..4]);
            let w3 = read_back(cur, cell_start, offset3, 2 * CELL_SHAPE)?;
            scatter_rows_from_window(&mut scratch, w3, &rows[4..6]);
            read_inline_rows(cur, &mut scratch, &rows)?;
        }
        other => return Err(DecompressError::BadToken(other)),
    }

    Ok(scratch)
}

fn scatter(scratch: &[u8; CELL_SIZE], output: &mut [u8], cols: usize, row0: usize, col0: usize) {
    for r in 0..CELL_SHAPE {
        let dst = (row0 + r) * cols + col0;
        output[dst..dst + CELL_SHAPE].copy_from_slice(&scratch[r * CELL_SHAPE..(r + 1) * CELL_SHAPE]);
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

/// Decompresses a single NDLZ-8 block written by `compress::compress`.
///
/// Returns the number of bytes written to `output` (always `rows * cols` of
/// the shape encoded in the block's header) on success. Any malformed
/// token, truncated input, or an `output` buffer too small for the encoded
/// shape is an error; this decoder is only meant to be fed streams produced
/// by the matching encoder.
#[throws(DecompressError)]
pub fn decompress(input: &[u8], output: &mut [u8]) -> usize {
    let mut cur = InCursor::new(input);
    let header = Header::decode(&mut cur).ok_or(DecompressError::Truncated)?;

    if header.ndim != 2 {
        throw!(DecompressError::InvalidNdim(header.ndim));
    }

    let rows = header.rows as usize;
    let cols = header.cols as usize;
    let total = rows * cols;

    if output.len() < total {
        throw!(DecompressError::OutputTooSmall { expected: total, got: output.len() });
    }
    for b in output[..total].iter_mut() {
        *b = 0;
    }

    let grid_rows = (rows + CELL_SHAPE - 1) / CELL_SHAPE;
    let grid_cols = (cols + CELL_SHAPE - 1) / CELL_SHAPE;

    for gi in 0..grid_rows {
        for gj in 0..grid_cols {
            let row0 = gi * CELL_SHAPE;
            let col0 = gj * CELL_SHAPE;
            let is_last_row = gi == grid_rows - 1;
            let is_last_col = gj == grid_cols - 1;
            let padded = (is_last_row && rows % CELL_SHAPE != 0) || (is_last_col && cols % CELL_SHAPE != 0);

            let cell_start = cur.position();
            let tag = cur.read_u8().ok_or(DecompressError::Truncated)?;

            if padded {
                if tag != TAG_LITERAL {
                    throw!(DecompressError::BadToken(tag));
                }
                let pad_rows = pad_extent(rows, is_last_row);
                let pad_cols = pad_extent(cols, is_last_col);
                for r in 0..pad_rows {
                    let bytes = cur.read_exact(pad_cols).ok_or(DecompressError::Truncated)?;
                    let dst = (row0 + r) * cols + col0;
                    output[dst..dst + pad_cols].copy_from_slice(bytes);
                }
                continue;
            }

            let scratch = decode_cell(&mut cur, tag, cell_start)?;
            scatter(&scratch, output, cols, row0, col0);
        }
    }

    if cur.remaining() != 0 {
        throw!(DecompressError::SizeMismatch);
    }

    total
}
