use glyphlens_core::feature::{FeatureId, KnownFeature, TypographyFeature};
use glyphlens_core::output::{write_json_pretty, write_ndjson};
use glyphlens_core::script::ScriptSegmentation;
use glyphlens_core::typography::features_by_script;
use glyphlens_core::typography::ScriptFeatures;

#[test]
fn writes_ndjson_one_object_per_line() {
    let reports = sample_reports();
    let mut buf = Vec::new();

    write_ndjson(&reports, &mut buf).expect("write");
    let text = String::from_utf8(buf).expect("utf8");
    let lines: Vec<&str> = text.trim_end().split('\n').collect();

    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json line");
    assert_eq!(first["script"], "Latn");
    assert_eq!(first["range"]["count"], 2);
    assert_eq!(first["features"][0]["tag"], "kern");
}

#[test]
fn writes_pretty_json_array() {
    let reports = sample_reports();
    let mut buf = Vec::new();

    write_json_pretty(&reports, &mut buf).expect("write");
    let text = String::from_utf8(buf).expect("utf8");

    let parsed: serde_json::Value = serde_json::from_str(&text).expect("json array");
    assert!(parsed.is_array());
    assert_eq!(parsed.as_array().unwrap().len(), 2);
    assert_eq!(parsed[1]["script"], "Arab");
}

fn sample_reports() -> Vec<ScriptFeatures> {
    struct Kerning;
    impl glyphlens_core::face::FeatureQuery for Kerning {
        fn supported_features(&self, _script: glyphlens_core::script::ScriptId) -> Vec<FeatureId> {
            vec![FeatureId::Named(KnownFeature::Kerning)]
        }
    }

    let segmentation = ScriptSegmentation::analyze("ab\u{0627}");
    let reports = features_by_script(&Kerning, &segmentation);
    assert!(reports
        .iter()
        .all(|r| r.features == vec![TypographyFeature::new(FeatureId::Named(KnownFeature::Kerning))]));
    reports
}
