use ops_report::sanitize::{sanitize, sanitize_folded};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn output_is_ascii(s in any::<String>()) {
        prop_assert!(sanitize(&s).is_ascii());
        prop_assert!(sanitize_folded(&s).is_ascii());
    }

    #[test]
    fn sanitize_is_idempotent(s in any::<String>()) {
        let once = sanitize(&s);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn ascii_input_is_only_trimmed(s in "[ -~]{0,64}") {
        prop_assert_eq!(sanitize(&s), s.trim());
    }
}

#[test]
fn typographic_characters_get_ascii_stand_ins() {
    let s = "Price \u{2013} \u{201c}fair\u{201d} \u{2026} \u{2713} \u{2605}";
    assert_eq!(sanitize(s), "Price - \"fair\" ... v *");
    assert_eq!(sanitize("\u{2190}\u{2192}\u{2191}\u{2193}"), "<>^v");
    assert_eq!(sanitize("\u{26a0} alert \u{2717}"), "! alert x");
}

#[test]
fn emoji_are_dropped() {
    assert_eq!(sanitize("\u{1f680} Launch \u{1f4e6}"), "Launch");
    assert_eq!(sanitize("\u{1f525}\u{1f525}"), "");
}

#[test]
fn folding_recovers_full_width_letters() {
    assert_eq!(sanitize("\u{ff21}\u{ff22}\u{ff23}"), "");
    assert_eq!(sanitize_folded("\u{ff21}\u{ff22}\u{ff23}"), "ABC");
}
