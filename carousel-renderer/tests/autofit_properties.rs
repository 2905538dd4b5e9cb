//! Property tests for the auto-fit sizer.

use carousel_renderer::{fit, FitConfig, MetricsMeasurer, TextMeasurer, WrapStyle};
use proptest::prelude::*;

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z]{1,12}", 1..20).prop_map(|w| w.join(" "))
}

fn style() -> impl Strategy<Value = WrapStyle> {
    (
        prop::sample::select(vec![300u16, 400, 600, 700, 900]),
        1.0f32..2.0,
        0.0f32..4.0,
    )
        .prop_map(|(font_weight, line_height, letter_spacing)| WrapStyle {
            font_weight,
            line_height,
            letter_spacing,
            ..WrapStyle::default()
        })
}

proptest! {
    #[test]
    fn fit_is_deterministic(
        content in words(),
        width in 20.0f32..2000.0,
        height in 20.0f32..2000.0,
        style in style(),
    ) {
        let config = FitConfig::default();
        let first = fit(&MetricsMeasurer, &config, &content, width, height, &style);
        let second = fit(&MetricsMeasurer, &config, &content, width, height, &style);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn larger_box_never_shrinks_text(
        content in words(),
        width in 20.0f32..1500.0,
        height in 20.0f32..1500.0,
        grow_w in 0.0f32..500.0,
        grow_h in 0.0f32..500.0,
        style in style(),
    ) {
        let config = FitConfig::default();
        let small = fit(&MetricsMeasurer, &config, &content, width, height, &style);
        let large = fit(&MetricsMeasurer, &config, &content, width + grow_w, height + grow_h, &style);
        // A box where nothing fits gets the fallback, which can exceed the
        // 8-15px a slightly larger box fits, so only fitted results compare.
        let small_fits = fits(&content, small, width, height, &style);
        prop_assume!(small_fits);
        prop_assert!(large >= small, "{} < {}", large, small);
    }

    #[test]
    fn result_is_in_range_or_fallback(
        content in words(),
        width in 1.0f32..2000.0,
        height in 1.0f32..2000.0,
    ) {
        let config = FitConfig::default();
        let size = fit(&MetricsMeasurer, &config, &content, width, height, &WrapStyle::default());
        prop_assert!((config.min_size..=config.max_size).contains(&size));
    }
}

#[allow(clippy::cast_precision_loss)]
fn fits(content: &str, size: u32, width: f32, height: f32, style: &WrapStyle) -> bool {
    let extent = MetricsMeasurer.measure(content, size as f32, width, style);
    extent.width <= width && extent.height <= height
}

#[test]
fn test_fitted_size_is_maximal() {
    let style = WrapStyle::default();
    let content = "The quick brown fox jumps over the lazy dog";
    let size = fit(&MetricsMeasurer, &FitConfig::default(), content, 600.0, 300.0, &style);
    assert!(fits(content, size, 600.0, 300.0, &style));
    assert!(size == 300 || !fits(content, size + 1, 600.0, 300.0, &style));
}
