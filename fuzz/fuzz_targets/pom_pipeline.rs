#![no_main]
use libfuzzer_sys::fuzz_target;
use pomtidy::{tidy, PipelineConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let config = PipelineConfig {
            organize: true,
            ..PipelineConfig::default()
        };
        let _ = tidy(s, &config);
    }
});
