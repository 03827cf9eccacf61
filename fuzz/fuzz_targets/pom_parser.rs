#![no_main]
use libfuzzer_sys::fuzz_target;
use pomtidy::xml;

fuzz_target!(|data: &[u8]| {
    let _ = xml::from_bytes(data);
});
