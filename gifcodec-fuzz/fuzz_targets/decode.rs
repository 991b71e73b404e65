// cargo fuzz run decode corpus/decode -- -timeout=30

#![no_main]

use libfuzzer_sys::fuzz_target;

use gifcodec::{Component, Decoder};

fuzz_target!(|data: &[u8]| {
    // reading from memory never fails; malformed data is only flagged
    let gif = Decoder::new(data)
        .max_image_sz(Some(1 << 20))
        .decode()
        .unwrap();
    let _ = gif.consolidated_messages();
    let mut out = vec![];
    gif.write_to_stream(&mut out).unwrap();
});
