//! Tests for keyword resolution

use super::*;
use crate::app::models::Keyword;
use crate::app::services::catalog::SampleRef;
use crate::app::services::instrument_parser::keyword_resolver::{KeywordResolver, Resolution};

fn sulfite_sample() -> SampleRef {
    SampleRef::new("W-001", analyses(&["SO2FREE", "SO2TOTAL"]))
}

#[test]
fn test_prefix_match_ambiguous() {
    let sample = sulfite_sample();
    let resolver = KeywordResolver::new(false);

    assert_eq!(
        resolver.resolve(&sample, &Keyword::normalize("SO2")),
        Resolution::Ambiguous(2)
    );
}

#[test]
fn test_exact_keyword_unique() {
    let sample = sulfite_sample();
    let resolver = KeywordResolver::new(false);

    match resolver.resolve(&sample, &Keyword::normalize("SO2FREE")) {
        Resolution::Unique(analysis) => assert_eq!(analysis.keyword(), "SO2FREE"),
        other => panic!("expected unique match, got {:?}", other),
    }
}

#[test]
fn test_unknown_keyword_not_found() {
    let sample = sulfite_sample();
    let resolver = KeywordResolver::new(false);

    assert_eq!(
        resolver.resolve(&sample, &Keyword::normalize("NOPE")),
        Resolution::NotFound
    );
}

#[test]
fn test_candidate_is_normalized() {
    let sample = sulfite_sample();
    let resolver = KeywordResolver::new(false);

    match resolver.resolve(&sample, &Keyword::normalize(" SO2-Total ".to_uppercase().as_str())) {
        Resolution::Unique(analysis) => assert_eq!(analysis.keyword(), "SO2TOTAL"),
        other => panic!("expected unique match, got {:?}", other),
    }

    // Matching is case-sensitive
    assert_eq!(
        resolver.resolve(&sample, &Keyword::normalize("so2free")),
        Resolution::NotFound
    );
}

#[test]
fn test_prefix_match_truncated_keyword() {
    let sample = SampleRef::new("S1", analyses(&["Pb208", "Cd111"]));
    let resolver = KeywordResolver::new(false);

    match resolver.resolve(&sample, &Keyword::normalize("Pb")) {
        Resolution::Unique(analysis) => assert_eq!(analysis.keyword(), "Pb208"),
        other => panic!("expected unique match, got {:?}", other),
    }
}

#[test]
fn test_empty_candidate_not_found() {
    let sample = sulfite_sample();
    let resolver = KeywordResolver::new(true);

    assert_eq!(
        resolver.resolve(&sample, &Keyword::normalize(" - ")),
        Resolution::NotFound
    );
    assert!(
        resolver
            .resolve_interim(&sample, &Keyword::normalize(""))
            .is_none()
    );
}

#[test]
fn test_interim_fallback_finds_owner() {
    let sample = SampleRef::new(
        "S1",
        vec![
            AnalysisRef::new("THC").with_interims(["THCarea", "ISarea"]),
            AnalysisRef::new("CBD").with_interims(["CBDarea", "ISarea"]),
        ],
    );
    let resolver = KeywordResolver::new(true);
    let keyword = Keyword::normalize("ISarea");

    assert_eq!(resolver.resolve(&sample, &keyword), Resolution::NotFound);
    let owner = resolver.resolve_interim(&sample, &keyword).unwrap();
    assert_eq!(owner.keyword(), "THC");
}

#[test]
fn test_interim_fallback_disabled() {
    let sample = SampleRef::new(
        "S1",
        vec![AnalysisRef::new("THC").with_interims(["THCarea"])],
    );
    let resolver = KeywordResolver::new(false);

    assert!(!resolver.interim_fallback());
    assert!(
        resolver
            .resolve_interim(&sample, &Keyword::normalize("THCarea"))
            .is_none()
    );
}

#[test]
fn test_interim_fallback_requires_exact_keyword() {
    let sample = SampleRef::new(
        "S1",
        vec![AnalysisRef::new("THC").with_interims(["THCarea"])],
    );
    let resolver = KeywordResolver::new(true);

    assert!(
        resolver
            .resolve_interim(&sample, &Keyword::normalize("THCa"))
            .is_none()
    );
}

#[test]
fn test_underscore_keywords_resolve() {
    let sample = SampleRef::new("S1", analyses(&["Pb_208", "Pb_206"]));
    let resolver = KeywordResolver::new(false);

    match resolver.resolve(&sample, &Keyword::normalize("Pb_208 ")) {
        Resolution::Unique(analysis) => assert_eq!(analysis.keyword(), "Pb_208"),
        other => panic!("expected unique match, got {:?}", other),
    }
    assert_eq!(
        resolver.resolve(&sample, &Keyword::normalize("Pb_")),
        Resolution::Ambiguous(2)
    );
}

#[test]
fn test_underscore_interim_keyword() {
    let sample = SampleRef::new(
        "S1",
        vec![AnalysisRef::new("SO2").with_interims(["F_SO2", "T_SO2"])],
    );
    let resolver = KeywordResolver::new(true);
    let keyword = Keyword::normalize("F_SO2");

    assert_eq!(resolver.resolve(&sample, &keyword), Resolution::NotFound);
    assert_eq!(
        resolver
            .resolve_interim(&sample, &keyword)
            .map(|analysis| analysis.keyword()),
        Some("SO2")
    );
}
