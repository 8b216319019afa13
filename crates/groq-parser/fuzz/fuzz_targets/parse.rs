#![no_main]
use groq_parser::Node;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Nesting is bounded by the depth limit, long inputs only slow the fuzzer down.
        if s.len() < 500 {
            let _ = Node::parse(s);
        }
    }
});
