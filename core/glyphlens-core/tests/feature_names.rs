use proptest::prelude::*;

use glyphlens_core::feature::{resolve, FeatureId, KnownFeature, TypographyFeature};
use glyphlens_core::tags::tag_from_u32;

#[test]
fn custom_tags_decode_byte_by_byte() {
    assert_eq!(resolve(FeatureId::Custom(0x6162_6364)), "Custom: abcd");
    assert_eq!(resolve(FeatureId::Custom(0x6376_3031)), "Custom: cv01");
}

#[test]
fn named_features_read_as_title_case() {
    assert_eq!(resolve(FeatureId::Named(KnownFeature::StylisticSet1)), "Stylistic Set 1");
    assert_eq!(resolve(FeatureId::Named(KnownFeature::Jis04Forms)), "Jis 04 Forms");
    assert_eq!(
        resolve(FeatureId::Named(KnownFeature::VerticalAlternatesAndRotation)),
        "Vertical Alternates And Rotation"
    );
    assert_eq!(TypographyFeature::none().display_name(), "None");
}

#[test]
fn every_known_feature_has_a_distinct_name() {
    let mut names: Vec<String> = KnownFeature::ALL
        .iter()
        .map(|k| resolve(FeatureId::Named(*k)))
        .collect();
    let total = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), total);
}

proptest! {
    #[test]
    fn from_tag_preserves_the_raw_value(raw in any::<u32>()) {
        let id = FeatureId::from_tag(tag_from_u32(raw));
        prop_assert_eq!(id.raw(), raw);
        match id {
            FeatureId::Named(known) => prop_assert_eq!(known.tag(), raw),
            FeatureId::Custom(_) => prop_assert!(KnownFeature::from_tag(raw).is_none()),
        }
    }

    #[test]
    fn custom_names_are_prefix_plus_four_chars(raw in any::<u32>()) {
        prop_assume!(KnownFeature::from_tag(raw).is_none());
        let name = resolve(FeatureId::Custom(raw));
        let suffix = name.strip_prefix("Custom: ").expect("prefix");
        prop_assert_eq!(suffix.chars().count(), 4);
        prop_assert_eq!(suffix.chars().next().map(|c| c as u32), Some(raw >> 24));
    }
}
