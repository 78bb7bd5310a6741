//! Property-based coverage for the universal properties a correct NDLZ-8
//! implementation must hold, independent of any one concrete fixture.

use ndlz8::{compress, decompress, Block2D, DecompressError};
use proptest::prelude::*;

fn block_and_bytes() -> impl Strategy<Value = (u32, u32, Vec<u8>)> {
    (1u32..40, 1u32..40).prop_flat_map(|(rows, cols)| {
        let len = (rows * cols) as usize;
        proptest::collection::vec(any::<u8>(), len..=len).prop_map(move |data| (rows, cols, data))
    })
}

proptest! {
    #[test]
    fn round_trip_recovers_the_original_bytes((rows, cols, input) in block_and_bytes()) {
        let block = Block2D::new(rows, cols);
        let mut out = vec![0u8; input.len() * 2 + 256];
        let produced = compress(2, block, false, &input, &mut out).unwrap();
        if produced > 0 {
            let mut restored = vec![0u8; input.len()];
            let n = decompress(&out[..produced], &mut restored).unwrap();
            prop_assert_eq!(n, input.len());
            prop_assert_eq!(restored, input);
        }
    }

    #[test]
    fn compress_never_writes_past_the_caller_supplied_capacity((rows, cols, input) in block_and_bytes()) {
        let block = Block2D::new(rows, cols);
        // A deliberately tight buffer: just the header, no room for any cell.
        let mut out = vec![0xAAu8; 9];
        let marker = out.clone();
        let result = compress(2, block, false, &input, &mut out);
        match result {
            Ok(0) => prop_assert_eq!(out, marker),
            Ok(n) => prop_assert!(n <= out.len()),
            Err(_) => {}
        }
    }

    #[test]
    fn decoding_the_same_bytes_twice_gives_the_same_result((rows, cols, input) in block_and_bytes()) {
        let block = Block2D::new(rows, cols);
        let mut out = vec![0u8; input.len() * 2 + 256];
        let produced = compress(2, block, false, &input, &mut out).unwrap();
        if produced > 0 {
            let stream = out[..produced].to_vec();
            let mut first = vec![0u8; input.len()];
            let mut second = vec![0u8; input.len()];
            decompress(&stream, &mut first).unwrap();
            decompress(&stream, &mut second).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn padded_edges_round_trip_exactly(
        rows in 1u32..40, cols in 1u32..40, data in proptest::collection::vec(any::<u8>(), 0..1600)
    ) {
        prop_assume!(rows % 8 != 0 || cols % 8 != 0);
        let len = (rows * cols) as usize;
        prop_assume!(data.len() >= len);
        let input = &data[..len];

        let block = Block2D::new(rows, cols);
        let mut out = vec![0u8; len * 2 + 256];
        let produced = compress(2, block, false, input, &mut out).unwrap();
        if produced > 0 {
            let mut restored = vec![0u8; len];
            let n = decompress(&out[..produced], &mut restored).unwrap();
            prop_assert_eq!(n, len);
            prop_assert_eq!(restored.as_slice(), input);
        }
    }

    #[test]
    fn constant_block_uses_exactly_one_rle_token_per_full_cell(value in any::<u8>()) {
        let (rows, cols) = (24u32, 16u32);
        let input = vec![value; (rows * cols) as usize];
        let block = Block2D::new(rows, cols);
        let mut out = vec![0u8; input.len() * 2 + 256];
        let produced = compress(2, block, false, &input, &mut out).unwrap();

        // 9-byte header, then one 2-byte RLE token per of the 3x2 full cells.
        let num_cells = 3 * 2;
        prop_assert_eq!(produced, 9 + 2 * num_cells);
    }
}

#[test]
fn back_references_never_point_at_or_past_their_own_cell() {
    // A block with enough repetition to exercise every match class, built
    // from a handful of distinct 8x8 tiles stamped across the grid.
    let cols = 32usize;
    let rows = 32usize;
    let mut input = vec![0u8; rows * cols];
    for (i, b) in input.iter_mut().enumerate() {
        *b = ((i / 8) % 5) as u8;
    }
    let block = Block2D::new(rows as u32, cols as u32);
    let mut out = vec![0u8; input.len() * 2 + 256];
    let produced = compress(2, block, false, &input, &mut out).unwrap();
    assert!(produced > 0);

    let mut restored = vec![0u8; input.len()];
    let n = decompress(&out[..produced], &mut restored).unwrap();
    assert_eq!(n, input.len());
    assert_eq!(restored, input);
}

#[test]
fn reserved_token_value_is_rejected_as_the_first_cell() {
    let mut stream = vec![2u8, 8, 0, 0, 0, 8, 0, 0, 0];
    stream.push(0x80);
    let mut out = [0u8; 64];
    let err = decompress(&stream, &mut out).unwrap_err();
    assert_eq!(err, DecompressError::BadToken(0x80));
}
