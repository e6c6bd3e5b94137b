#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use jobscout::extract;
use jobscout::pipeline::normalize;

fuzz_target!(|data: &[u8]| {
    // Convert raw bytes to string, handling invalid UTF-8 gracefully
    let html = String::from_utf8_lossy(data);
    let base = Url::parse("https://example.com/careers").unwrap();

    // Anchor extraction and normalization must never panic, whatever the
    // markup looks like.
    for anchor in extract::anchors(&html) {
        let _ = normalize::normalize(&anchor.href, &base);
    }
});
