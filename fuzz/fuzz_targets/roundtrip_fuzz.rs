#![no_main]
use libfuzzer_sys::fuzz_target;
use ndlz8::{compress, Block2D};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    let cols = 1 + (data[0] as usize % 40);
    let body = &data[1..];
    let rows = body.len() / cols;
    if rows == 0 {
        return;
    }
    let input = &body[..rows * cols];
    let block = Block2D::new(rows as u32, cols as u32);

    let mut compressed = vec![0u8; input.len() * 2 + 256];
    let produced = match compress(2, block, false, input, &mut compressed) {
        Ok(n) => n,
        Err(_) => return,
    };
    if produced == 0 {
        return;
    }

    let mut restored = vec![0u8; input.len()];
    let decoded_len = ndlz8::decompress(&compressed[..produced], &mut restored)
        .expect("decoding a stream this crate just produced must not fail");
    assert_eq!(decoded_len, input.len());
    assert_eq!(restored, input);
});
