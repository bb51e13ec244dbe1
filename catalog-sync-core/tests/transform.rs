use catalog_sync_core::transform::{
    build_document, is_published, normalize, split_tags, truncate_description, FrequencyMap,
    UNKNOWN_LABEL,
};
use serde_json::{json, Value};

fn product(id: u64, status: &str, published_at: Value) -> Value {
    json!({
        "id": id,
        "title": format!("Product {id}"),
        "handle": format!("product-{id}"),
        "vendor": "ProtoNord",
        "product_type": "Print",
        "status": status,
        "created_at": "2024-05-01T10:00:00+02:00",
        "updated_at": "2024-06-01T10:00:00+02:00",
        "published_at": published_at,
        "tags": "3d, printed",
        "variants": [{"id": 1}, {"id": 2}],
        "images": [{"id": 9}],
        "body_html": "<p>Nice</p>"
    })
}

#[test]
fn test_only_active_and_published_records_are_kept() {
    struct TestCase {
        name: &'static str,
        record: Value,
        kept: bool,
    }

    let test_cases = vec![
        TestCase {
            name: "active and published",
            record: product(1, "active", json!("2024-06-01T10:00:00+02:00")),
            kept: true,
        },
        TestCase {
            name: "archived",
            record: product(2, "archived", json!("2024-06-01T10:00:00+02:00")),
            kept: false,
        },
        TestCase {
            name: "draft",
            record: product(3, "draft", json!("2024-06-01T10:00:00+02:00")),
            kept: false,
        },
        TestCase {
            name: "active but unpublished (null)",
            record: product(4, "active", Value::Null),
            kept: false,
        },
        TestCase {
            name: "active but unpublished (empty string)",
            record: product(5, "active", json!("")),
            kept: false,
        },
        TestCase {
            name: "active with published_at missing entirely",
            record: json!({"id": 6, "status": "active"}),
            kept: false,
        },
        TestCase {
            name: "active with published_at false",
            record: product(8, "active", json!(false)),
            kept: false,
        },
        TestCase {
            name: "active with numeric published_at",
            record: product(9, "active", json!(0)),
            kept: false,
        },
        TestCase {
            name: "active with object published_at",
            record: product(10, "active", json!({})),
            kept: false,
        },
        TestCase {
            name: "status with different case",
            record: product(7, "ACTIVE", json!("2024-06-01T10:00:00+02:00")),
            kept: false,
        },
    ];

    for tc in &test_cases {
        assert_eq!(is_published(&tc.record), tc.kept, "{}", tc.name);
    }

    let records: Vec<Value> = test_cases.iter().map(|tc| tc.record.clone()).collect();
    let doc = build_document(&records, "2024-07-01T00:00:00Z");
    let expected = test_cases.iter().filter(|tc| tc.kept).count();
    assert_eq!(doc.total_products, expected);
    assert_eq!(doc.products.len(), expected);
    assert!(doc
        .products
        .iter()
        .all(|p| p.status.as_deref() == Some("active") && p.published_at.is_some()));
}

#[test]
fn test_duplicate_tags_are_counted_as_split() {
    let mut record = product(1, "active", json!("2024-06-01T10:00:00Z"));
    record["tags"] = json!("a, b, a");

    let doc = build_document(&[record], "ts");

    assert_eq!(doc.products[0].tags, vec!["a", "b", "a"]);
    assert_eq!(doc.categories.get("a"), 2);
    assert_eq!(doc.categories.get("b"), 1);
    assert_eq!(doc.categories.len(), 2);
}

#[test]
fn test_split_tags() {
    struct TestCase {
        name: &'static str,
        input: Option<&'static str>,
        expected: Vec<&'static str>,
    }

    let test_cases = vec![
        TestCase {
            name: "absent",
            input: None,
            expected: vec![],
        },
        TestCase {
            name: "empty",
            input: Some(""),
            expected: vec![],
        },
        TestCase {
            name: "comma and space",
            input: Some("summer, sale"),
            expected: vec!["summer", "sale"],
        },
        TestCase {
            name: "irregular spacing",
            input: Some(" summer ,sale,  new "),
            expected: vec!["summer", "sale", "new"],
        },
        TestCase {
            name: "empty segments dropped",
            input: Some("a, , b,"),
            expected: vec!["a", "b"],
        },
        TestCase {
            name: "non-ascii kept",
            input: Some("bærekraft, håndlaget"),
            expected: vec!["bærekraft", "håndlaget"],
        },
    ];

    for tc in test_cases {
        assert_eq!(split_tags(tc.input), tc.expected, "{}", tc.name);
    }
}

#[test]
fn test_missing_grouping_fields_fall_back_to_unknown() {
    let records = vec![
        json!({"id": 1, "status": "active", "published_at": "2024-06-01T10:00:00Z"}),
        json!({"id": 2, "status": "active", "published_at": "2024-06-01T10:00:00Z", "vendor": "", "product_type": ""}),
        json!({"id": 3, "status": "active", "published_at": "2024-06-01T10:00:00Z", "vendor": "Acme", "product_type": "Tool"}),
    ];

    let doc = build_document(&records, "ts");

    assert_eq!(doc.vendors.get(UNKNOWN_LABEL), 2);
    assert_eq!(doc.product_types.get(UNKNOWN_LABEL), 2);
    assert_eq!(doc.vendors.get("Acme"), 1);
    assert_eq!(doc.product_types.get("Tool"), 1);
    assert!(doc.categories.is_empty(), "No tags means no categories");
}

#[test]
fn test_truncate_description() {
    let long: String = "x".repeat(250);
    let truncated = truncate_description(&long);
    assert_eq!(truncated.chars().count(), 203);
    assert_eq!(truncated, format!("{}...", "x".repeat(200)));

    let short: String = "y".repeat(150);
    assert_eq!(truncate_description(&short), short);

    let exact: String = "z".repeat(200);
    assert_eq!(truncate_description(&exact), exact, "200 chars is not truncated");

    // Character based, never splits a multi-byte character.
    let norwegian: String = "æøå".repeat(70);
    let truncated = truncate_description(&norwegian);
    assert!(truncated.ends_with("..."));
    assert_eq!(truncated.chars().count(), 203);
}

#[test]
fn test_normalize_projects_fields_and_counts() {
    let mut record = product(42, "active", json!("2024-06-01T10:00:00Z"));
    record["body_html"] = json!("d".repeat(250));
    record["extra_field"] = json!({"ignored": true});

    let entry = normalize(&record);

    assert_eq!(entry.id, json!(42));
    assert_eq!(entry.title.as_deref(), Some("Product 42"));
    assert_eq!(entry.handle.as_deref(), Some("product-42"));
    assert_eq!(entry.vendor.as_deref(), Some("ProtoNord"));
    assert_eq!(entry.product_type.as_deref(), Some("Print"));
    assert_eq!(entry.tags, vec!["3d", "printed"]);
    assert_eq!(entry.variants, 2);
    assert_eq!(entry.images, 1);
    assert_eq!(entry.description.chars().count(), 203);
}

#[test]
fn test_normalize_tolerates_unexpected_types() {
    let record = json!({
        "id": "gid://shopify/Product/1",
        "title": 17,
        "status": "active",
        "published_at": "2024-06-01T10:00:00Z",
        "tags": null,
        "variants": null,
        "images": "not-an-array",
        "body_html": null
    });

    let entry = normalize(&record);

    assert_eq!(entry.id, json!("gid://shopify/Product/1"));
    assert_eq!(entry.title, None);
    assert!(entry.tags.is_empty());
    assert_eq!(entry.variants, 0);
    assert_eq!(entry.images, 0);
    assert_eq!(entry.description, "");
}

#[test]
fn test_summary_omits_products() {
    let doc = build_document(
        &[product(1, "active", json!("2024-06-01T10:00:00Z"))],
        "2024-07-01T00:00:00Z",
    );

    let summary = serde_json::to_value(doc.summary()).unwrap();
    let full = serde_json::to_value(&doc).unwrap();

    assert!(summary.get("products").is_none());
    assert!(full.get("products").is_some());
    for key in [
        "sync_timestamp",
        "total_products",
        "categories",
        "vendors",
        "product_types",
    ] {
        assert_eq!(summary[key], full[key], "summary field {key} matches document");
    }
}

#[test]
fn test_frequency_map_increment() {
    let mut map = FrequencyMap::new();
    map.increment("b");
    map.increment("a");
    map.increment("b");
    map.increment_or_unknown(None);
    map.increment_or_unknown(Some(""));

    assert_eq!(map.get("a"), 1);
    assert_eq!(map.get("b"), 2);
    assert_eq!(map.get(UNKNOWN_LABEL), 2);
    assert_eq!(map.get("missing"), 0);

    let labels: Vec<&str> = map.iter().map(|(label, _)| label).collect();
    assert_eq!(labels, vec!["Unknown", "a", "b"], "keys are kept sorted");

    assert_eq!(
        serde_json::to_string(&map).unwrap(),
        r#"{"Unknown":2,"a":1,"b":2}"#
    );
}
