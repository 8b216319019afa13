#![no_main]
use groq_filter::{is_simple_type_query, query_to_list, validate_groq, validate_groq_filter};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Every input is accepted here, long ones must be rejected by the length limit.
        let strict = validate_groq_filter(Some(s));
        let permissive = validate_groq(Some(s));
        assert_eq!(strict.valid, strict.error.is_none());
        assert_eq!(permissive.valid, permissive.error.is_none());

        let _ = is_simple_type_query(Some(s));
        let _ = query_to_list(s);
    }
});
