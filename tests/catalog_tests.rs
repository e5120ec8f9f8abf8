//! Catalog Tests
//!
//! Tests for catalog construction and identifier resolution: qualified keys,
//! deterministic ambiguity handling, boundary-safe prefix matching, and
//! copy-on-read accessors.
//!
//! Run: cargo nextest run --test catalog_tests

use pricebook::config::GroundingRecord;
use pricebook::{
    Catalog, CatalogBuilder, ConfigError, ImagePricing, MatchKind, ModelPricing, Namespace,
    ProviderRecord,
};
use rust_decimal_macros::dec;

fn openai() -> ProviderRecord {
    ProviderRecord::new("openai")
        .model("gpt-4", ModelPricing::new(dec!(30), dec!(60)))
        .model("gpt-4o", ModelPricing::new(dec!(2.5), dec!(10)))
        .model("gpt-4o-mini", ModelPricing::new(dec!(0.15), dec!(0.6)))
        .image_model("dall-e-3", ImagePricing::new(dec!(0.04)))
}

fn azure() -> ProviderRecord {
    ProviderRecord::new("azure")
        .model("gpt-4o", ModelPricing::new(dec!(2.75), dec!(11)))
        .model("gpt-4", ModelPricing::new(dec!(33), dec!(66)))
}

fn google() -> ProviderRecord {
    ProviderRecord::new("google")
        .model("gemini-1.5-pro", ModelPricing::new(dec!(1.25), dec!(5)))
        .model("gemini-1.5-flash", ModelPricing::new(dec!(0.075), dec!(0.3)))
        .grounding(
            "gemini-1.5",
            GroundingRecord {
                per_thousand_queries: dec!(35),
                billing_model: "PerPrompt".into(),
                batch_grounding_ok: false,
            },
        )
}

fn build(records: Vec<ProviderRecord>) -> Catalog {
    records
        .into_iter()
        .fold(CatalogBuilder::new(), |builder, record| {
            let name = format!("{}.json", record.provider_id);
            builder.record(name, record)
        })
        .build()
        .unwrap()
}

// =============================================================================
// Qualified keys and ambiguity
// =============================================================================

mod ambiguity_tests {
    use super::*;

    #[test]
    fn test_every_qualified_key_returns_own_rates() {
        let catalog = build(vec![openai(), azure(), google()]);

        for (key, rate) in [
            ("openai/gpt-4", dec!(30)),
            ("openai/gpt-4o", dec!(2.5)),
            ("azure/gpt-4", dec!(33)),
            ("azure/gpt-4o", dec!(2.75)),
            ("google/gemini-1.5-pro", dec!(1.25)),
        ] {
            let hit = catalog.resolve_model(key).unwrap();
            assert_eq!(hit.kind, MatchKind::Exact, "{}", key);
            assert_eq!(hit.pricing.input_rate, rate, "{}", key);
        }
    }

    #[test]
    fn test_resolution_ignores_record_order() {
        let forward = build(vec![openai(), azure(), google()]);
        let reversed = build(vec![google(), azure(), openai()]);

        for name in ["gpt-4", "gpt-4o", "gpt-4o-mini", "gemini-1.5-pro"] {
            let a = forward.resolve_model(name).unwrap();
            let b = reversed.resolve_model(name).unwrap();
            assert_eq!(a.provider, b.provider, "{}", name);
            assert_eq!(a.pricing, b.pricing, "{}", name);
        }
        assert_eq!(
            forward.ambiguous_names(Namespace::Models),
            reversed.ambiguous_names(Namespace::Models)
        );
    }

    #[test]
    fn test_ambiguous_names_report() {
        let catalog = build(vec![openai(), azure()]);
        let ambiguous = catalog.ambiguous_names(Namespace::Models);

        let names: Vec<&str> = ambiguous.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["gpt-4", "gpt-4o"]);
        for entry in &ambiguous {
            assert_eq!(entry.providers, vec!["azure", "openai"]);
            assert_eq!(entry.resolved_to, "azure");
        }
        assert!(catalog.ambiguous_names(Namespace::ImageModels).is_empty());
    }

    #[test]
    fn test_unique_bare_name_resolves() {
        let catalog = build(vec![openai(), azure()]);
        let hit = catalog.resolve_model("gpt-4o-mini").unwrap();
        assert_eq!(hit.provider, "openai");
        assert_eq!(hit.matched_key, "gpt-4o-mini");
    }
}

// =============================================================================
// Prefix matching
// =============================================================================

mod prefix_tests {
    use super::*;

    #[test]
    fn test_exact_key_is_exact_match() {
        let catalog = build(vec![openai()]);
        let hit = catalog.resolve_model("gpt-4").unwrap();
        assert_eq!(hit.kind, MatchKind::Exact);
        assert_eq!(hit.name, "gpt-4");
    }

    #[test]
    fn test_separator_boundary() {
        let catalog = build(vec![openai()]);

        let hit = catalog.resolve_model("gpt-4-turbo").unwrap();
        assert_eq!(hit.kind, MatchKind::Prefix);
        assert_eq!(hit.name, "gpt-4");

        assert!(catalog.resolve_model("gpt-45-turbo").is_none());
        assert!(catalog.resolve_model("gpt").is_none());
    }

    #[test]
    fn test_longest_valid_prefix_wins() {
        let catalog = build(vec![openai()]);

        let hit = catalog.resolve_model("gpt-4o-mini-2024-07-18").unwrap();
        assert_eq!(hit.name, "gpt-4o-mini");

        let hit = catalog.resolve_model("gpt-4o-2024-08-06").unwrap();
        assert_eq!(hit.name, "gpt-4o");
        assert_eq!(hit.pricing.input_rate, dec!(2.5));
    }

    #[test]
    fn test_qualified_prefix_keeps_provider() {
        let catalog = build(vec![openai(), azure()]);
        let hit = catalog.resolve_model("openai/gpt-4o-2024-08-06").unwrap();
        assert_eq!(hit.provider, "openai");
        assert_eq!(hit.matched_key, "openai/gpt-4o");
    }

    #[test]
    fn test_grounding_prefix() {
        let catalog = build(vec![google()]);
        let hit = catalog
            .lookup(Namespace::Grounding, "google/gemini-1.5-pro-002")
            .unwrap();
        assert_eq!(hit.matched_key, "google/gemini-1.5");
        assert_eq!(hit.kind, MatchKind::Prefix);
    }

    #[test]
    fn test_whitespace_trimmed_case_sensitive() {
        let catalog = build(vec![openai()]);
        assert!(catalog.resolve_model("  gpt-4o\n").is_some());
        assert!(catalog.resolve_model("GPT-4o").is_none());
    }
}

// =============================================================================
// Construction failures
// =============================================================================

mod construction_tests {
    use super::*;

    #[test]
    fn test_rejected_record_fails_everything() {
        let bad = ProviderRecord::new("broken").model("m", ModelPricing::new(dec!(-1), dec!(1)));
        let err = CatalogBuilder::new()
            .record("openai.json", openai())
            .record("broken.json", bad)
            .build()
            .unwrap_err();

        match err {
            ConfigError::InvalidValue {
                document,
                field,
                value,
                ..
            } => {
                assert_eq!(document, "broken.json");
                assert_eq!(field, "models.m.input_rate");
                assert_eq!(value, "-1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rate_ceiling_catches_per_token_prices() {
        let record =
            ProviderRecord::new("acme").model("m", ModelPricing::new(dec!(2500000), dec!(10)));
        let err = CatalogBuilder::new()
            .record("acme.json", record)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_error_names_document() {
        let err = CatalogBuilder::new()
            .document("broken.yaml", b"provider_id: [unclosed")
            .unwrap_err();
        assert_eq!(err.document(), Some("broken.yaml"));
    }
}

// =============================================================================
// Accessors
// =============================================================================

mod accessor_tests {
    use super::*;

    #[test]
    fn test_provider_copies_are_independent() {
        let catalog = build(vec![openai()]);

        let mut first = catalog.provider("openai").unwrap();
        first.models.insert("injected".into(), ModelPricing::new(dec!(0), dec!(0)));
        first.metadata.source_urls.push("https://example.com".into());

        let second = catalog.provider("openai").unwrap();
        assert!(!second.models.contains_key("injected"));
        assert!(second.metadata.source_urls.is_empty());
        assert!(catalog.resolve_model("injected").is_none());
    }

    #[test]
    fn test_resolution_pricing_is_a_copy() {
        let catalog = build(vec![openai()]);
        let mut hit = catalog.resolve_model("gpt-4o").unwrap();
        hit.pricing.input_rate = dec!(999);
        assert_eq!(catalog.resolve_model("gpt-4o").unwrap().pricing.input_rate, dec!(2.5));
    }

    #[test]
    fn test_stats_and_keys() {
        let catalog = build(vec![openai(), azure(), google()]);
        let stats = catalog.stats();
        assert_eq!(stats.providers, 3);
        assert_eq!(stats.models, 7);
        assert_eq!(stats.image_models, 1);
        assert_eq!(stats.grounding_prefixes, 1);
        assert_eq!(stats.ambiguous_names, 2);

        assert_eq!(catalog.provider_ids(), vec!["azure", "google", "openai"]);
        assert_eq!(
            catalog.qualified_keys(Namespace::ImageModels),
            vec!["openai/dall-e-3"]
        );
    }
}
