mod common;

use common::strategies::*;
use common::ORIGIN;
use proptest::prelude::*;
use spylt_core::cache::{classify_url, RequestClass, Strategy as CacheStrategy};

proptest! {
    /// Property: static markers win over every other marker
    #[test]
    fn static_markers_take_precedence(
        prefix in neutral_path_strategy(),
        marker in static_marker_strategy(),
        api in api_marker_strategy(),
        dynamic in dynamic_marker_strategy(),
    ) {
        let url = format!("{ORIGIN}{prefix}{api}{dynamic}{marker}");
        prop_assert_eq!(classify_url(&url), RequestClass::StaticAsset);
    }

    /// Property: API markers win over dynamic markers
    #[test]
    fn api_markers_beat_dynamic_markers(
        prefix in neutral_path_strategy(),
        api in api_marker_strategy(),
        dynamic in dynamic_marker_strategy(),
    ) {
        let url = format!("{ORIGIN}{prefix}{dynamic}{api}");
        prop_assert_eq!(classify_url(&url), RequestClass::ApiOrAnalytics);
        prop_assert_eq!(classify_url(&url).strategy(), CacheStrategy::NetworkFirst);
    }

    /// Property: dynamic markers alone select stale-while-revalidate
    #[test]
    fn dynamic_markers_select_swr(
        prefix in neutral_path_strategy(),
        dynamic in dynamic_marker_strategy(),
    ) {
        let url = format!("{ORIGIN}{prefix}{dynamic}");
        prop_assert_eq!(classify_url(&url), RequestClass::DynamicAsset);
        prop_assert_eq!(classify_url(&url).strategy(), CacheStrategy::StaleWhileRevalidate);
    }

    /// Property: URLs with no marker fall through to cache-first
    #[test]
    fn unmarked_urls_are_other(path in neutral_path_strategy()) {
        let url = format!("{ORIGIN}{path}");
        prop_assert_eq!(classify_url(&url), RequestClass::Other);
        prop_assert_eq!(classify_url(&url).strategy(), CacheStrategy::CacheFirst);
    }

    /// Property: classification is deterministic
    #[test]
    fn classification_is_deterministic(path in "[ -~]{0,64}") {
        prop_assert_eq!(classify_url(&path), classify_url(&path));
    }
}
