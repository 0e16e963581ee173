#![no_main]
use libfuzzer_sys::fuzz_target;
use pdx_escape::Format;

fuzz_target!(|data: &[u8]| {
    for format in Format::ALL.iter() {
        let _ = format.from_slice(data);
    }
});
