#![no_main]
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes fed straight to the decoder, with no encoder involved:
// this is only meant to find panics/hangs on malformed streams, every
// rejection path should return `Err`, not unwind.
fuzz_target!(|data: &[u8]| {
    let mut output = vec![0u8; 1 << 20];
    let _ = ndlz8::decompress(data, &mut output);
});
