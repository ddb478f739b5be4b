//! Search Module Tests
//!
//! Validates the search pipeline, from tokenization to the HTTP endpoint.
//!
//! ## Test Scopes
//! - **Tokenizer**: Normalization, diacritic folding and forward prefixes.
//! - **Index**: Prefix matching, field resolution ordering and the stored projection.
//! - **Heuristic**: Slug, tag and category keyword rules.
//! - **Engine**: Tier ordering, URL de-duplication, result cap and determinism.
//! - **Formatter**: Placeholder image and description snippet.
//! - **Service / Handlers**: Full load-index-query pipeline, cache invalidation, error envelope.

#[cfg(test)]
mod tests {
    use crate::config::{AppConfig, IndexMode, SearchConfig};
    use crate::content::types::{Category, ContentRecord};
    use crate::create_router;
    use crate::search::engine::{execute_query, validate_query, QueryOptions};
    use crate::search::formatter::{format_record, snippet, DEFAULT_IMAGE};
    use crate::search::heuristic::{normalize_query, HeuristicRules};
    use crate::search::index::{build_index, field_specs, Field, SearchIndex};
    use crate::search::service::SearchService;
    use crate::search::tokenizer::{forward_prefixes, normalize, query_terms, tokenize};
    use crate::search::types::{ErrorResponse, ResponseItem, SearchParams};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn record(id: &str, title: &str, tags: &[&str], intro: Option<&str>) -> ContentRecord {
        ContentRecord {
            id: id.to_string(),
            collection: "test".to_string(),
            slug: None,
            title: title.to_string(),
            intro_text: intro.map(str::to_string),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: Category::HiddenGem,
            city_slug: None,
            url: format!("/test/{}", id),
            hero_image: None,
        }
    }

    fn city_record(slug: &str, item: &str, title: &str, tags: &[&str]) -> ContentRecord {
        ContentRecord {
            id: format!("search_by_city-{}-{}", slug, item),
            collection: "search_by_city".to_string(),
            slug: Some(slug.to_string()),
            title: title.to_string(),
            intro_text: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: Category::CityGuide,
            city_slug: Some(slug.to_string()),
            url: format!("/search_by_city/{}/{}", slug, item),
            hero_image: None,
        }
    }

    fn index_of(records: Vec<ContentRecord>) -> SearchIndex {
        build_index(records, &field_specs(&SearchConfig::default()))
    }

    fn options() -> QueryOptions {
        QueryOptions {
            result_cap: 20,
            field_limit: 10,
        }
    }

    fn ids(records: &[&ContentRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    fn write(root: &Path, relative: &str, body: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    const PENGHU: &str =
        r#"[{"id":"ph-01","title":"Seven Star Rock","tags":["beach","gem"],"heroImage":""}]"#;

    // ============================================================
    // TOKENIZER
    // ============================================================

    #[test]
    fn test_normalize_folds_diacritics() {
        assert_eq!(normalize("Tainán"), "tainan");
        assert_eq!(normalize("Lǜdǎo"), "ludao");
        assert_eq!(normalize("ŁÓDŹ"), "lodz");
        assert_eq!(normalize("Straße"), "strasse");
    }

    #[test]
    fn test_tokenize_splits_on_punctuation_and_keeps_order() {
        let tokens = tokenize("Taipei 101, the tallest-tower in Taipei!");
        assert_eq!(
            tokens,
            vec!["taipei", "101", "the", "tallest", "tower", "in", "taipei"]
        );
    }

    #[test]
    fn test_tokenize_keeps_other_scripts() {
        let tokens = tokenize("澎湖 penghu");
        assert_eq!(tokens, vec!["澎湖", "penghu"]);
    }

    #[test]
    fn test_query_terms_are_deduplicated() {
        assert_eq!(query_terms("Beach beach BEACH sunset"), vec!["beach", "sunset"]);
        assert!(query_terms("  ,,  ").is_empty());
    }

    #[test]
    fn test_forward_prefixes() {
        let prefixes: Vec<&str> = forward_prefixes("taip").collect();
        assert_eq!(prefixes, vec!["t", "ta", "tai", "taip"]);

        let wide: Vec<&str> = forward_prefixes("澎湖").collect();
        assert_eq!(wide, vec!["澎", "澎湖"]);

        assert_eq!(forward_prefixes("").count(), 0);
    }

    // ============================================================
    // INDEX
    // ============================================================

    #[test]
    fn test_prefix_query_matches_full_word() {
        let index = index_of(vec![record("a", "Taipei Night Markets", &[], None)]);

        let hits = index.search_field(Field::Title, "taip", 10);
        assert_eq!(ids(&hits), vec!["a"]);

        let none = index.search_field(Field::Title, "aipei", 10);
        assert!(none.is_empty(), "Only forward prefixes are indexed");
    }

    #[test]
    fn test_diacritic_query_matches_plain_text() {
        let index = index_of(vec![record("a", "Tainan Old Town", &[], None)]);
        assert_eq!(ids(&index.search_field(Field::Title, "Tainán", 10)), vec!["a"]);
    }

    #[test]
    fn test_all_terms_must_match_within_a_field() {
        let index = index_of(vec![
            record("a", "Sun Moon Lake", &[], None),
            record("b", "Sun Link Sea", &[], None),
        ]);

        assert_eq!(ids(&index.search_field(Field::Title, "sun lake", 10)), vec!["a"]);
        assert_eq!(index.search_field(Field::Title, "sun", 10).len(), 2);
    }

    #[test]
    fn test_title_resolution_prefers_early_positions() {
        let index = index_of(vec![
            record("late", "A quiet walk along the old harbour to the lighthouse", &[], None),
            record("early", "Lighthouse trail", &[], None),
        ]);

        let hits = index.search_field(Field::Title, "lighthouse", 10);
        assert_eq!(ids(&hits), vec!["early", "late"]);
    }

    #[test]
    fn test_intro_resolution_one_keeps_insertion_order() {
        let index = index_of(vec![
            record("first", "", &[], Some("many words before the temple appears")),
            record("second", "", &[], Some("temple first")),
        ]);

        let hits = index.search_field(Field::Intro, "temple", 10);
        assert_eq!(ids(&hits), vec!["first", "second"]);
    }

    #[test]
    fn test_record_without_title_is_indexed_by_tags() {
        let index = index_of(vec![record("a", "", &["waterfall"], None)]);

        assert_eq!(index.len(), 1);
        assert_eq!(ids(&index.search_field(Field::Tags, "water", 10)), vec!["a"]);
    }

    #[test]
    fn test_duplicate_id_keeps_first_record() {
        let mut index = SearchIndex::new(&field_specs(&SearchConfig::default()));

        assert!(index.add(record("a", "First", &[], None)));
        assert!(!index.add(record("a", "Second", &[], None)));

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("a").unwrap().title, "First");
    }

    #[test]
    fn test_search_groups_fields_in_priority_order() {
        let index = index_of(vec![
            record("intro", "Other", &[], Some("a lovely beach")),
            record("tags", "Another", &["beach"], None),
            record("title", "Beach Day", &[], None),
        ]);

        let groups = index.search("beach", 10);
        let fields: Vec<Field> = groups.iter().map(|g| g.field).collect();
        assert_eq!(fields, vec![Field::Title, Field::Tags, Field::Intro]);
        assert_eq!(groups[0].hits[0].id, "title");
    }

    #[test]
    fn test_field_limit_is_applied() {
        let records = (0..15)
            .map(|i| record(&format!("r{}", i), "Night market", &[], None))
            .collect();
        let index = index_of(records);

        assert_eq!(index.search_field(Field::Title, "night", 10).len(), 10);
    }

    // ============================================================
    // HEURISTIC
    // ============================================================

    #[test]
    fn test_slug_containment_works_both_ways() {
        let rules = HeuristicRules::default();
        let records = vec![city_record("penghu", "ph-01", "Seven Star Rock", &[])];

        assert_eq!(rules.heuristic_match("Penghu", &records).len(), 1);
        assert_eq!(rules.heuristic_match("pengh", &records).len(), 1);
        assert_eq!(rules.heuristic_match("penghu islands trip", &records).len(), 1);
        assert!(rules.heuristic_match("kinmen", &records).is_empty());
    }

    #[test]
    fn test_underscore_slug_matches_spaced_query() {
        let rules = HeuristicRules::default();
        let records = vec![city_record("new_taipei", "nt-01", "Jiufen", &[])];

        assert_eq!(rules.heuristic_match("new_taipei", &records).len(), 1);
        assert_eq!(rules.heuristic_match("New Taipei", &records).len(), 1);
    }

    #[test]
    fn test_tag_containment() {
        let rules = HeuristicRules::new();
        let records = vec![record("a", "Untitled", &["Night Market"], None)];

        assert_eq!(rules.heuristic_match("night mar", &records).len(), 1);
        assert!(rules.heuristic_match("day market", &records).is_empty());
    }

    #[test]
    fn test_category_keywords() {
        let rules = HeuristicRules::default();
        let mut bus = record("bus", "Intercity coaches", &[], None);
        bus.category = Category::Transport;
        let gem = record("gem", "Quiet valley", &[], None);
        let records = vec![bus, gem];

        let hits = rules.heuristic_match("traffic in taipei", &records);
        assert_eq!(ids(&hits), vec!["bus"]);

        let hits = rules.heuristic_match("secret spots", &records);
        assert_eq!(ids(&hits), vec!["gem"]);

        assert_eq!(rules.keywords_for(Category::Transport)[0], "transport");
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let rules = HeuristicRules::default();
        let records = vec![city_record("penghu", "ph-01", "Seven Star Rock", &["beach"])];

        assert_eq!(normalize_query("   "), "");
        assert!(rules.heuristic_match("   ", &records).is_empty());
    }

    // ============================================================
    // ENGINE
    // ============================================================

    #[test]
    fn test_empty_and_missing_queries_return_nothing() {
        let index = index_of(vec![city_record("penghu", "ph-01", "Seven Star Rock", &[])]);
        let rules = HeuristicRules::default();

        assert!(execute_query(&index, &rules, None, options()).is_empty());
        assert!(execute_query(&index, &rules, Some(""), options()).is_empty());
        assert!(execute_query(&index, &rules, Some(" \t "), options()).is_empty());
        assert_eq!(validate_query(Some("  taipei ")), Some("taipei"));
    }

    #[test]
    fn test_exact_slug_query_surfaces_record_without_token_match() {
        let index = index_of(vec![
            city_record("hualien", "hl-01", "Taroko Gorge", &["marble"]),
            record("other", "Hualien food guide", &[], None),
        ]);
        let rules = HeuristicRules::default();

        let hits = execute_query(&index, &rules, Some("hualien"), options());

        assert_eq!(hits[0].id, "search_by_city-hualien-hl-01");
        assert!(ids(&hits).contains(&"other".to_string()));
    }

    #[test]
    fn test_heuristic_hit_appears_once_and_first() {
        let index = index_of(vec![
            record("title-only", "Beach huts", &[], None),
            record("both", "Beach walk", &["beach"], None),
        ]);
        let rules = HeuristicRules::new();

        let hits = execute_query(&index, &rules, Some("beach"), options());

        assert_eq!(ids(&hits), vec!["both", "title-only"]);
    }

    #[test]
    fn test_tokenized_tiers_follow_field_priority() {
        let index = index_of(vec![
            record("intro", "Other", &[], Some("a sunset view from the hill")),
            record("tags", "Another", &["view", "sunset"], None),
            record("title", "Sunset View Pier", &[], None),
        ]);
        let rules = HeuristicRules::new();

        // No single tag contains the whole query, so only the tokenized tiers apply.
        let hits = execute_query(&index, &rules, Some("sunset view"), options());

        assert_eq!(ids(&hits), vec!["title", "tags", "intro"]);
    }

    #[test]
    fn test_records_sharing_url_collapse() {
        let mut a = record("a", "Lantern festival", &[], None);
        let mut b = record("b", "Lantern workshop", &[], None);
        a.url = "/festivals".to_string();
        b.url = "/festivals".to_string();
        let index = index_of(vec![a, b]);

        let hits = execute_query(&index, &HeuristicRules::new(), Some("lantern"), options());

        assert_eq!(ids(&hits), vec!["a"]);
    }

    #[test]
    fn test_result_cap_is_enforced() {
        let records = (0..40)
            .map(|i| record(&format!("r{}", i), "Temple", &["temple"], Some("temple")))
            .collect();
        let index = index_of(records);
        let capped = QueryOptions {
            result_cap: 12,
            field_limit: 10,
        };

        let hits = execute_query(&index, &HeuristicRules::new(), Some("temple"), capped);
        assert_eq!(hits.len(), 12);

        let heuristic_heavy = execute_query(&index, &HeuristicRules::new(), Some("temp"), capped);
        assert!(heuristic_heavy.len() <= 12);
    }

    #[test]
    fn test_query_results_are_deterministic() {
        let records: Vec<ContentRecord> = (0..25)
            .map(|i| record(&format!("r{}", i), "Night market snacks", &["food"], None))
            .collect();
        let rules = HeuristicRules::default();

        let first = ids(&execute_query(&index_of(records.clone()), &rules, Some("night"), options()));
        let second = ids(&execute_query(&index_of(records), &rules, Some("night"), options()));

        assert_eq!(first, second);
    }

    // ============================================================
    // FORMATTER
    // ============================================================

    #[test]
    fn test_missing_hero_image_uses_placeholder() {
        let mut item = record("a", "Alishan", &[], None);
        assert_eq!(format_record(&item).image, DEFAULT_IMAGE);

        item.hero_image = Some("   ".to_string());
        assert_eq!(format_record(&item).image, DEFAULT_IMAGE);

        item.hero_image = Some("/img/alishan.jpg".to_string());
        assert_eq!(format_record(&item).image, "/img/alishan.jpg");
    }

    #[test]
    fn test_description_snippet() {
        assert_eq!(snippet(""), "");
        assert_eq!(snippet("Short intro."), "Short intro.");

        let long = "a".repeat(80);
        let cut = snippet(&long);
        assert_eq!(cut, format!("{}...", "a".repeat(60)));

        let wide = "澎".repeat(61);
        assert_eq!(snippet(&wide).chars().count(), 63);
    }

    #[test]
    fn test_formatted_item_carries_category_and_tags() {
        let item = format_record(&city_record("penghu", "ph-01", "Seven Star Rock", &["beach"]));
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["category"], "City Guide");
        assert_eq!(json["tags"], serde_json::json!(["beach"]));
        assert_eq!(json["description"], "");
    }

    // ============================================================
    // SERVICE
    // ============================================================

    #[tokio::test]
    async fn test_penghu_scenario() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "search_by_city/penghu.json", PENGHU);
        let service = SearchService::new(dir.path(), SearchConfig::default());

        let by_slug = service.search(Some("penghu")).await.unwrap();
        assert_eq!(by_slug.len(), 1);
        assert!(by_slug[0].url.ends_with("/penghu/ph-01"));
        assert_eq!(by_slug[0].image, DEFAULT_IMAGE);

        let by_tag = service.search(Some("beach")).await.unwrap();
        assert_eq!(by_tag, by_slug);

        let nothing = service.search(Some("zzz_no_match")).await.unwrap();
        assert!(nothing.is_empty());
    }

    #[tokio::test]
    async fn test_missing_content_root_returns_empty_results() {
        let dir = TempDir::new().unwrap();
        let service = SearchService::new(dir.path().join("absent"), SearchConfig::default());

        assert!(service.search(Some("taipei")).await.unwrap().is_empty());
        assert!(service.search(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_rules_replace_default_keywords() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "search_by_city/penghu.json", PENGHU);
        let service = SearchService::new(dir.path(), SearchConfig::default())
            .with_rules(HeuristicRules::new().with_keywords(Category::CityGuide, &["island"]));

        let results = service.search(Some("island trip")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(service.search(Some("city guide")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cached_index_picks_up_content_edits() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "search_by_city/penghu.json", PENGHU);
        let service = SearchService::new(dir.path(), SearchConfig::default());

        let first = service.snapshot().await.unwrap();
        let reused = service.snapshot().await.unwrap();
        assert_eq!(first.build_id, reused.build_id, "Unchanged content reuses the snapshot");

        write(
            dir.path(),
            "hiddengems/wushe.json",
            r#"{"title":"Wushe Cherry Blossoms","tags":["sakura"]}"#,
        );
        let results = service.search(Some("sakura")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "/hidden_gems/wushe");

        write(
            dir.path(),
            "search_by_city/penghu.json",
            r#"[{"id":"ph-01","title":"Seven Star Rock","tags":["beach","gem"]},{"id":"ph-02","title":"Twin Hearts Stone Weir","tags":["weir"]}]"#,
        );
        let edited = service.search(Some("weir")).await.unwrap();
        assert_eq!(edited.len(), 1);
        assert!(edited[0].url.ends_with("/penghu/ph-02"));

        let rebuilt = service.snapshot().await.unwrap();
        assert_ne!(first.build_id, rebuilt.build_id);
        assert_eq!(rebuilt.index.len(), 3);
    }

    #[tokio::test]
    async fn test_cached_index_drops_deleted_content() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "search_by_city/penghu.json", PENGHU);
        let service = SearchService::new(dir.path(), SearchConfig::default());

        assert_eq!(service.search(Some("penghu")).await.unwrap().len(), 1);

        fs::remove_file(dir.path().join("search_by_city/penghu.json")).unwrap();
        assert!(service.search(Some("penghu")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_per_request_mode_builds_every_time() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "search_by_city/penghu.json", PENGHU);
        let config = SearchConfig {
            index_mode: IndexMode::PerRequest,
            ..SearchConfig::default()
        };
        let service = SearchService::new(dir.path(), config);

        let first = service.snapshot().await.unwrap();
        let second = service.snapshot().await.unwrap();

        assert_ne!(first.build_id, second.build_id);
        assert_eq!(service.search(Some("penghu")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_file_does_not_abort_search() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "search_by_city/penghu.json", PENGHU);
        write(dir.path(), "search_by_city/broken.json", "[{");
        let service = SearchService::new(dir.path(), SearchConfig::default());

        assert_eq!(service.search(Some("seven star")).await.unwrap().len(), 1);
        assert_eq!(service.snapshot().await.unwrap().skipped, 1);
    }

    // ============================================================
    // HANDLERS
    // ============================================================

    fn app_for(root: &Path) -> axum::Router {
        let mut config = AppConfig::default();
        config.content_root = root.to_path_buf();
        let service = SearchService::new(root, config.search.clone());
        create_router(Arc::new(config), Arc::new(service))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_search_endpoint_empty_query_returns_empty_list() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "search_by_city/penghu.json", PENGHU);

        for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20"] {
            let (status, body) = get(app_for(dir.path()), uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            let items: Vec<ResponseItem> = serde_json::from_slice(&body).unwrap();
            assert!(items.is_empty(), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_search_endpoint_repeated_query_returns_empty_list() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "search_by_city/penghu.json", PENGHU);

        for uri in ["/api/search?q=a&q=b", "/api/search?q=penghu&q=penghu"] {
            let (status, body) = get(app_for(dir.path()), uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            let items: Vec<ResponseItem> = serde_json::from_slice(&body).unwrap();
            assert!(items.is_empty(), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_search_endpoint_ignores_unrelated_parameters() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "search_by_city/penghu.json", PENGHU);

        let (status, body) = get(app_for(dir.path()), "/api/search?page=2&q=penghu&page=3").await;

        assert_eq!(status, StatusCode::OK);
        let items: Vec<ResponseItem> = serde_json::from_slice(&body).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_search_params_require_a_single_q() {
        let pair = |k: &str, v: &str| (k.to_string(), v.to_string());

        assert_eq!(
            SearchParams::from_pairs(vec![pair("q", "taipei"), pair("lang", "en")]).q.as_deref(),
            Some("taipei")
        );
        assert_eq!(SearchParams::from_pairs(vec![pair("q", "a"), pair("q", "b")]), SearchParams::default());
        assert_eq!(SearchParams::from_pairs(vec![]).q, None);
    }

    #[tokio::test]
    async fn test_search_endpoint_returns_items() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "search_by_city/penghu.json", PENGHU);

        let (status, body) = get(app_for(dir.path()), "/api/search?q=penghu").await;

        assert_eq!(status, StatusCode::OK);
        let items: Vec<ResponseItem> = serde_json::from_slice(&body).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Seven Star Rock");
        assert_eq!(items[0].url, "/search_by_city/penghu/ph-01");
        assert_eq!(items[0].category, Category::CityGuide);
    }

    #[tokio::test]
    async fn test_search_endpoint_internal_failure_uses_error_envelope() {
        let dir = TempDir::new().unwrap();
        // A file where the content root should be makes every collection listing fail.
        let root = dir.path().join("not-a-directory");
        fs::write(&root, "plain file").unwrap();

        let (status, body) = get(app_for(&root), "/api/search?q=taipei").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "Internal Server Error");
        assert!(!error.message.contains("not-a-directory"));
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_documents() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "search_by_city/penghu.json", PENGHU);

        let (status, body) = get(app_for(dir.path()), "/health").await;

        assert_eq!(status, StatusCode::OK);
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["documents"], 1);
        assert_eq!(health["index_mode"], "cached");
    }
}
