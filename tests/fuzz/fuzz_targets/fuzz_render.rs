#![no_main]
use libfuzzer_sys::fuzz_target;

use hotspots::render::{build_groups, RenderOptions};

fuzz_target!(|data: &[u8]| {
    // Whatever parses must also render.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(parsed) = hotspots::parsers::parse(s, "/main.rs") {
            let _ = build_groups(&parsed, &RenderOptions::default());
        }
    }
});
