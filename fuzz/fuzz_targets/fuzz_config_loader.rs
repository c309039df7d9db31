#![no_main]

use std::path::Path;

use carousel::config::ConfigLoader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to string, ignoring invalid UTF-8
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        let loader = ConfigLoader::with_defaults();

        // We don't care about the result, just that it doesn't panic
        let _ = loader.load_from_str(yaml_str, Path::new("fuzz.yaml"));
    }
});
