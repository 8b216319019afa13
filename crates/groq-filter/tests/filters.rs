use groq_filter::{
    is_simple_type_query, list_to_query, query_to_list, toggle_type, validate_groq,
    validate_groq_filter, FilterState, FilterValidationPolicy, FilterValidator, Panel,
    ValidationResult,
};

#[test]
fn type_lists_survive_a_round_trip() {
    let lists: &[&[&str]] = &[
        &[],
        &["author"],
        &["post", "author", "category"],
        &["post", "post"],
        &["sanity.imageAsset", "blog-post", "post_2024"],
    ];

    for list in lists {
        let query = list_to_query(list);
        assert_eq!(query_to_list(&query), *list, "`{query}` lost some names");
        assert!(is_simple_type_query(Some(&query)), "`{query}` should be simple");
        assert!(validate_groq_filter(Some(&query)).valid, "`{query}` should be valid");
    }
}

#[test]
fn empty_lists() {
    assert_eq!(list_to_query::<&str>(&[]), "_type in []");
    assert!(query_to_list("_type in []").is_empty());
}

#[test]
fn tolerant_reading() {
    assert_eq!(query_to_list(r#"_type  in  ["author" , "book"]"#), ["author", "book"]);
    assert_eq!(query_to_list("_type in ['author']"), ["author"]);
    assert!(query_to_list(r#"_type == "author""#).is_empty());
}

#[test]
fn classification() {
    assert!(is_simple_type_query(None));
    assert!(is_simple_type_query(Some("")));
    assert!(!is_simple_type_query(Some(r#"_type in ["author"] && published"#)));
    assert!(!is_simple_type_query(Some(r#"*[_type in ["author"]]"#)));
}

#[test]
fn strict_validation() {
    assert_eq!(validate_groq_filter(None), ValidationResult::valid());
    assert_eq!(validate_groq_filter(Some("")), ValidationResult::valid());

    let result = validate_groq_filter(Some(r#"*[_type == "post"]"#));
    assert!(!result.valid);
    assert!(result.error.unwrap().contains(r#"Remove the leading "*[""#));

    assert!(validate_groq_filter(Some(r#"_type in ["author"]"#)).valid);
    assert!(!validate_groq_filter(Some(r#"_type in ["author""#)).valid);
    assert!(validate_groq_filter(Some(r#"!(_id in path("drafts.**"))"#)).valid);
    assert!(validate_groq_filter(Some(r#"_type in ["product"] && lang == "en-us""#)).valid);

    assert_eq!(
        validate_groq_filter(Some(r#"_type == "post"][0"#)),
        ValidationResult::invalid("Enter a filter expression, not a full query.")
    );
}

#[test]
fn permissive_validation() {
    assert_eq!(validate_groq(None), ValidationResult::valid());
    assert!(validate_groq(Some(r#"_type == "author" && published"#)).valid);
    assert!(!validate_groq(Some(r#"_type in ["author""#)).valid);
}

#[test]
fn invalid_results_always_carry_an_error() {
    let inputs = [
        "*[",
        "]",
        "a ==",
        "a == b == c",
        "count(",
        r#""unterminated"#,
        "foo()",
        "((((",
        "_type in [",
        "|",
        "$",
        "->",
        "…",
    ];

    for policy in [FilterValidationPolicy::Strict, FilterValidationPolicy::Permissive] {
        let validator = FilterValidator::new(policy);
        for input in inputs {
            let result = validator.validate(Some(input));
            assert!(!result.valid, "`{input}` should be invalid with the {policy} policy");
            let error = result.error.unwrap_or_default();
            assert!(!error.is_empty(), "`{input}` has no error with the {policy} policy");
        }
    }
}

/// Runs `f` on a thread with the stack size tests usually run with.
fn with_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn long_inputs_are_rejected() {
    let results = with_small_stack(|| {
        let inputs = [
            vec!["a == 1"; 100_000].join(" && "),
            vec!["a == 1"; 100_000].join(" || "),
            vec!["1"; 100_000].join(" + "),
            format!("defined(a{})", ".a".repeat(50_000)),
            format!("defined(a{})", "[0]".repeat(50_000)),
            format!("defined(a{})", "->".repeat(50_000)),
        ];

        let mut results = Vec::new();
        for input in &inputs {
            results.push(validate_groq_filter(Some(input)));
            results.push(validate_groq(Some(input)));
        }
        results
    });

    for result in results {
        assert!(!result.valid);
        let error = result.error.unwrap_or_default();
        assert!(error.contains("queries are limited to"), "unexpected error: {error}");
    }
}

#[test]
fn long_chains_below_the_limit_are_valid() {
    let results = with_small_stack(|| {
        let inputs = [
            vec!["a == 1"; 1_000].join(" && "),
            vec!["a == 1"; 1_000].join(" || "),
            vec!["1"; 2_400].join(" + "),
            format!("defined(a{})", ".a".repeat(4_900)),
            format!("defined(a{})", "[0]".repeat(3_000)),
            format!("defined(a{})", "->".repeat(4_900)),
        ];

        inputs.iter().map(|input| validate_groq_filter(Some(input))).collect::<Vec<_>>()
    });

    for result in results {
        assert_eq!(result, ValidationResult::valid());
    }
}

#[test]
fn editing_a_filter() {
    let validator = FilterValidator::new(FilterValidationPolicy::Strict);

    let value = toggle_type(None, "post");
    assert_eq!(value.as_deref(), Some(r#"_type in ["post"]"#));
    let value = toggle_type(value.as_deref(), "author");
    assert_eq!(value.as_deref(), Some(r#"_type in ["post", "author"]"#));

    let state = FilterState::inspect(value.as_deref(), &validator);
    assert_eq!(state.selected_types, ["post", "author"]);
    assert_eq!(state.effective_panel(Panel::Types), Panel::Types);

    let value = toggle_type(value.as_deref(), "post");
    let value = toggle_type(value.as_deref(), "author");
    assert_eq!(value, None);

    let complex = Some(r#"_type in ["post"] && defined(slug.current)"#);
    let state = FilterState::inspect(complex, &validator);
    assert!(state.validation.valid);
    assert_eq!(state.effective_panel(Panel::Types), Panel::Groq);

    let broken = Some(r#"_type in ["post""#);
    let state = FilterState::inspect(broken, &validator);
    assert!(!state.validation.valid);
    assert_eq!(state.effective_panel(Panel::Types), Panel::Groq);
}
