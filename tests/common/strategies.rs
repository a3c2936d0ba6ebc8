use proptest::prelude::*;
use proptest::strategy::Just;

/// Path segments free of every classification marker
pub fn neutral_segment_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,12}".prop_filter("No marker words", |segment| {
        !segment.contains("analytics")
            && !segment.contains("tracking")
            && !["api", "fonts", "images", "videos"].contains(&segment.as_str())
    })
}

/// Path made only of neutral segments, never ending in '/'
pub fn neutral_path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(neutral_segment_strategy(), 1..4)
        .prop_map(|segments| format!("/{}", segments.join("/")))
}

/// Marker that makes a URL a static asset
pub fn static_marker_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/images/nav-logo.svg".to_string()),
        Just("/images/hero-img.png".to_string()),
        "[a-z]{1,8}".prop_map(|name| format!("/fonts/{name}.otf")),
        "[a-z]{1,8}".prop_map(|name| format!("/{name}.css")),
        "[a-z]{1,8}".prop_map(|name| format!("/{name}.js")),
    ]
}

/// Marker that makes a URL an API or analytics request
pub fn api_marker_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(|name| format!("/api/{name}")),
        Just("/analytics".to_string()),
        Just("/tracking/pixel".to_string()),
    ]
}

/// Marker that makes a URL a dynamic asset
pub fn dynamic_marker_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|name| format!("/images/{name}.png")),
        "[a-z]{1,6}".prop_map(|name| format!("/videos/{name}.mov")),
        "[a-z]{1,6}".prop_map(|name| format!("/{name}.webp")),
        "[a-z]{1,6}".prop_map(|name| format!("/{name}.mp4")),
    ]
}
