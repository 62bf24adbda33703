//! Quasar utility classes.
//!
//! Fixed classes live in a table built once; spacing, gutter, shadow and
//! palette classes are recognized by pattern.

use crate::palette::Palette;
use crate::style::*;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

/// Quasar spacing scale.
pub fn spacing_size(name: &str) -> Option<f64> {
    Some(match name {
        "none" => 0.0,
        "xs" => 4.0,
        "sm" => 8.0,
        "md" => 16.0,
        "lg" => 24.0,
        "xl" => 32.0,
        _ => return None,
    })
}

fn typography(size: f64, weight: u16, letter_spacing: f64) -> ResolvedStyle {
    ResolvedStyle {
        font_size: Some(size),
        font_weight: Some(weight),
        letter_spacing: Some(letter_spacing),
        ..Default::default()
    }
}

fn radius(r: f64) -> ResolvedStyle {
    ResolvedStyle {
        corner_radius: Some(r),
        ..Default::default()
    }
}

fn weight(w: u16) -> ResolvedStyle {
    ResolvedStyle {
        font_weight: Some(w),
        ..Default::default()
    }
}

fn text_align(a: TextAlign) -> ResolvedStyle {
    ResolvedStyle {
        text_align: Some(a),
        ..Default::default()
    }
}

fn text_case(c: TextCase) -> ResolvedStyle {
    ResolvedStyle {
        text_case: Some(c),
        ..Default::default()
    }
}

fn justify(a: AxisAlign) -> ResolvedStyle {
    ResolvedStyle {
        primary_align: Some(a),
        ..Default::default()
    }
}

fn items(a: CounterAlign) -> ResolvedStyle {
    ResolvedStyle {
        counter_align: Some(a),
        ..Default::default()
    }
}

fn align_self(a: CounterAlign) -> ResolvedStyle {
    ResolvedStyle {
        align_self: Some(a),
        ..Default::default()
    }
}

fn opacity(o: f64) -> ResolvedStyle {
    ResolvedStyle {
        opacity: Some(o),
        ..Default::default()
    }
}

fn fixed_classes() -> FxHashMap<&'static str, ResolvedStyle> {
    let mut table: FxHashMap<&'static str, ResolvedStyle> = FxHashMap::default();

    table.insert("text-h1", typography(48.0, 700, -1.5));
    table.insert("text-h2", typography(36.0, 700, -0.5));
    table.insert("text-h3", typography(30.0, 600, 0.0));
    table.insert("text-h4", typography(24.0, 600, 0.25));
    table.insert("text-h5", typography(20.0, 500, 0.0));
    table.insert("text-h6", typography(16.0, 500, 0.15));
    table.insert("text-subtitle1", typography(16.0, 400, 0.15));
    table.insert("text-subtitle2", typography(14.0, 500, 0.1));
    table.insert("text-body1", typography(16.0, 400, 0.5));
    table.insert("text-body2", typography(14.0, 400, 0.25));
    table.insert("text-caption", typography(12.0, 400, 0.4));
    table.insert(
        "text-overline",
        ResolvedStyle {
            text_case: Some(TextCase::Upper),
            ..typography(10.0, 500, 1.5)
        },
    );

    table.insert("text-left", text_align(TextAlign::Left));
    table.insert("text-center", text_align(TextAlign::Center));
    table.insert("text-right", text_align(TextAlign::Right));
    table.insert("text-justify", text_align(TextAlign::Justified));

    table.insert("text-weight-thin", weight(100));
    table.insert("text-weight-light", weight(300));
    table.insert("text-weight-regular", weight(400));
    table.insert("text-weight-medium", weight(500));
    table.insert("text-weight-bold", weight(700));
    table.insert("text-weight-bolder", weight(900));
    table.insert("text-bold", weight(700));

    table.insert("text-uppercase", text_case(TextCase::Upper));
    table.insert("text-lowercase", text_case(TextCase::Lower));
    table.insert("text-capitalize", text_case(TextCase::Title));
    table.insert(
        "text-italic",
        ResolvedStyle {
            italic: Some(true),
            ..Default::default()
        },
    );
    table.insert(
        "text-strike",
        ResolvedStyle {
            text_decoration: Some(TextDecoration::Strikethrough),
            ..Default::default()
        },
    );
    table.insert(
        "text-underline",
        ResolvedStyle {
            text_decoration: Some(TextDecoration::Underline),
            ..Default::default()
        },
    );

    table.insert(
        "row",
        ResolvedStyle {
            layout: Some(LayoutDirection::Horizontal),
            wrap: Some(true),
            ..Default::default()
        },
    );
    table.insert(
        "column",
        ResolvedStyle {
            layout: Some(LayoutDirection::Vertical),
            ..Default::default()
        },
    );
    table.insert(
        "wrap",
        ResolvedStyle {
            wrap: Some(true),
            ..Default::default()
        },
    );
    table.insert(
        "no-wrap",
        ResolvedStyle {
            wrap: Some(false),
            ..Default::default()
        },
    );

    table.insert("justify-start", justify(AxisAlign::Min));
    table.insert("justify-center", justify(AxisAlign::Center));
    table.insert("justify-end", justify(AxisAlign::Max));
    table.insert("justify-between", justify(AxisAlign::SpaceBetween));
    table.insert("justify-around", justify(AxisAlign::SpaceBetween));
    table.insert("justify-evenly", justify(AxisAlign::SpaceBetween));

    const ALIGNMENTS: [(CounterAlign, [&str; 3]); 5] = [
        (CounterAlign::Min, ["items-start", "content-start", "self-start"]),
        (CounterAlign::Center, ["items-center", "content-center", "self-center"]),
        (CounterAlign::Max, ["items-end", "content-end", "self-end"]),
        (CounterAlign::Stretch, ["items-stretch", "content-stretch", "self-stretch"]),
        (CounterAlign::Baseline, ["items-baseline", "content-baseline", "self-baseline"]),
    ];
    for (align, [item, content, own]) in ALIGNMENTS {
        table.insert(item, items(align));
        table.insert(content, items(align));
        table.insert(own, align_self(align));
    }
    table.insert("flex-center", {
        let mut s = justify(AxisAlign::Center);
        s.counter_align = Some(CounterAlign::Center);
        s
    });

    table.insert("rounded-borders", radius(4.0));
    table.insert("rounded-borders-sm", radius(2.0));
    table.insert("rounded-borders-md", radius(6.0));
    table.insert("rounded-borders-lg", radius(8.0));
    table.insert("rounded-borders-xl", radius(12.0));
    table.insert("round-borders", radius(9999.0));
    table.insert("no-border-radius", radius(0.0));
    table.insert(
        "no-border",
        ResolvedStyle {
            stroke_weight: Some(0.0),
            ..Default::default()
        },
    );

    table.insert(
        "hidden",
        ResolvedStyle {
            visible: Some(false),
            ..Default::default()
        },
    );
    table.insert(
        "visible",
        ResolvedStyle {
            visible: Some(true),
            ..Default::default()
        },
    );
    table.insert("invisible", opacity(0.0));
    table.insert("opacity-25", opacity(0.25));
    table.insert("opacity-50", opacity(0.5));
    table.insert("opacity-75", opacity(0.75));
    table.insert("opacity-100", opacity(1.0));

    for (name, clips) in [
        ("overflow-hidden", true),
        ("overflow-auto", true),
        ("scroll", true),
        ("overflow-visible", false),
    ] {
        table.insert(
            name,
            ResolvedStyle {
                clips_content: Some(clips),
                ..Default::default()
            },
        );
    }

    table.insert(
        "full-width",
        ResolvedStyle {
            width: Some(Dimension::Fill),
            ..Default::default()
        },
    );
    table.insert(
        "full-height",
        ResolvedStyle {
            height: Some(Dimension::Fill),
            ..Default::default()
        },
    );
    table.insert(
        "fit",
        ResolvedStyle {
            hug_contents: Some(true),
            ..Default::default()
        },
    );

    table
}

static FIXED_CLASSES: Lazy<FxHashMap<&'static str, ResolvedStyle>> = Lazy::new(fixed_classes);

static QUASAR_SPACING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^q-([pm])([atrblxy])-(none|xs|sm|md|lg|xl)$").expect("valid regex")
});

static WORD_SPACING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(pad|margin)(?:-(all|top|right|bottom|left|x-axis|y-axis))?-(none|xs|sm|md|lg|xl)$",
    )
    .expect("valid regex")
});

static QUASAR_GUTTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^q-(?:col-)?gutter-(?:([xy])-)?(none|xs|sm|md|lg|xl)$").expect("valid regex")
});

static WORD_GUTTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^gutter(?:-(all|x-axis|y-axis))?-(none|xs|sm|md|lg|xl)$").expect("valid regex")
});

static SHADOW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^shadow-(up-)?(\d{1,2})$").expect("valid regex"));

fn spacing(kind: &str, side: &str, size: f64) -> Option<ResolvedStyle> {
    let sides = match side {
        "a" | "all" => Sides::all(size),
        "t" | "top" => Sides {
            top: Some(size),
            ..Default::default()
        },
        "r" | "right" => Sides {
            right: Some(size),
            ..Default::default()
        },
        "b" | "bottom" => Sides {
            bottom: Some(size),
            ..Default::default()
        },
        "l" | "left" => Sides {
            left: Some(size),
            ..Default::default()
        },
        "x" | "x-axis" => Sides::horizontal(size),
        "y" | "y-axis" => Sides::vertical(size),
        _ => return None,
    };
    let mut style = ResolvedStyle::default();
    match kind {
        "p" | "pad" => style.padding = sides,
        _ => style.margin = sides,
    }
    Some(style)
}

fn gutter(axis: &str, size: f64) -> ResolvedStyle {
    let mut style = ResolvedStyle::default();
    match axis {
        "x" | "x-axis" => style.gutter_x = Some(size),
        "y" | "y-axis" => style.gutter_y = Some(size),
        _ => {
            style.gutter_x = Some(size);
            style.gutter_y = Some(size);
        }
    }
    style
}

fn pattern_class(name: &str) -> Option<ResolvedStyle> {
    if let Some(caps) = QUASAR_SPACING.captures(name) {
        return spacing(&caps[1], &caps[2], spacing_size(&caps[3])?);
    }
    if let Some(caps) = WORD_SPACING.captures(name) {
        let side = caps.get(2).map_or("all", |m| m.as_str());
        return spacing(&caps[1], side, spacing_size(&caps[3])?);
    }
    if let Some(caps) = QUASAR_GUTTER.captures(name) {
        let axis = caps.get(1).map_or("all", |m| m.as_str());
        return Some(gutter(axis, spacing_size(&caps[2])?));
    }
    if let Some(caps) = WORD_GUTTER.captures(name) {
        let axis = caps.get(1).map_or("all", |m| m.as_str());
        return Some(gutter(axis, spacing_size(&caps[2])?));
    }
    if let Some(caps) = SHADOW.captures(name) {
        let level: i32 = caps[2].parse().ok()?;
        let level = if caps.get(1).is_some() { -level } else { level };
        return Some(ResolvedStyle {
            shadow: Some(Shadow::elevation(level)),
            ..Default::default()
        });
    }
    if let Some(color) = name.strip_prefix("bg-") {
        return Palette::global().resolve(color).map(|(_, c)| ResolvedStyle {
            fill: Some(c),
            ..Default::default()
        });
    }
    if let Some(color) = name.strip_prefix("text-") {
        return Palette::global().resolve(color).map(|(_, c)| ResolvedStyle {
            text_color: Some(c),
            ..Default::default()
        });
    }
    None
}

/// Style fragment for one utility class, `None` when the class means nothing
/// to the renderer.
pub fn class_style(name: &str) -> Option<ResolvedStyle> {
    FIXED_CLASSES
        .get(name)
        .cloned()
        .or_else(|| pattern_class(name))
}

/// Fold a list of classes in order; later classes win per field.
pub fn classes_style<'a>(classes: impl IntoIterator<Item = &'a str>) -> ResolvedStyle {
    let mut style = ResolvedStyle::default();
    for class in classes {
        match class_style(class) {
            Some(fragment) => style.merge(&fragment),
            None => tracing::debug!(class, "ignoring unknown utility class"),
        }
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unknown_class_logged_at_debug() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let style = tracing::subscriber::with_default(subscriber, || {
            classes_style(["q-pa-md", "not-a-utility"])
        });
        assert_eq!(style.padding, Sides::all(16.0));

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|l| l.contains("ignoring unknown utility class"))
            .unwrap();
        assert!(line.contains("DEBUG"));
        assert!(line.contains("not-a-utility"));
    }
    use crate::palette::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_typography() {
        let h1 = class_style("text-h1").unwrap();
        assert_eq!(h1.font_size, Some(48.0));
        assert_eq!(h1.font_weight, Some(700));
        assert_eq!(h1.letter_spacing, Some(-1.5));

        let overline = class_style("text-overline").unwrap();
        assert_eq!(overline.font_size, Some(10.0));
        assert_eq!(overline.text_case, Some(TextCase::Upper));
    }

    #[test]
    fn test_spacing_spellings_agree() {
        assert_eq!(class_style("q-pa-md"), class_style("pad-md"));
        assert_eq!(class_style("q-px-sm"), class_style("pad-x-axis-sm"));
        assert_eq!(class_style("q-mt-lg"), class_style("margin-top-lg"));

        let pad = class_style("q-pa-md").unwrap();
        assert_eq!(pad.padding, Sides::all(16.0));
        let my = class_style("q-my-xs").unwrap();
        assert_eq!(my.margin, Sides::vertical(4.0));
        assert!(class_style("q-pa-huge").is_none());
    }

    #[test]
    fn test_gutters() {
        let both = class_style("q-gutter-md").unwrap();
        assert_eq!((both.gutter_x, both.gutter_y), (Some(16.0), Some(16.0)));
        let x = class_style("q-col-gutter-x-sm").unwrap();
        assert_eq!((x.gutter_x, x.gutter_y), (Some(8.0), None));
        let y = class_style("gutter-y-axis-lg").unwrap();
        assert_eq!((y.gutter_x, y.gutter_y), (None, Some(24.0)));
    }

    #[test]
    fn test_flex_classes() {
        let style = classes_style(["row", "justify-between", "items-center", "no-wrap"]);
        assert_eq!(style.layout, Some(LayoutDirection::Horizontal));
        assert_eq!(style.primary_align, Some(AxisAlign::SpaceBetween));
        assert_eq!(style.counter_align, Some(CounterAlign::Center));
        assert_eq!(style.wrap, Some(false));
        assert_eq!(class_style("justify-evenly").unwrap().primary_align, Some(AxisAlign::SpaceBetween));
        assert_eq!(class_style("self-end").unwrap().align_self, Some(CounterAlign::Max));
    }

    #[test]
    fn test_shadows_and_borders() {
        assert_eq!(class_style("shadow-2").unwrap().shadow, Some(Shadow::elevation(2)));
        assert_eq!(class_style("shadow-up-3").unwrap().shadow, Some(Shadow::elevation(-3)));
        assert_eq!(class_style("rounded-borders").unwrap().corner_radius, Some(4.0));
        assert_eq!(class_style("round-borders").unwrap().corner_radius, Some(9999.0));
        assert_eq!(class_style("no-border").unwrap().stroke_weight, Some(0.0));
    }

    #[test]
    fn test_palette_classes() {
        assert_eq!(class_style("bg-white").unwrap().fill, Some(Color::WHITE));
        assert_eq!(class_style("text-black").unwrap().text_color, Some(Color::BLACK));
        assert_eq!(
            class_style("bg-primary-99").unwrap().fill,
            Palette::global().get("primary")
        );
        assert!(class_style("bg-nothing").is_none());
        assert!(class_style("text-h7").is_none());
    }

    #[test]
    fn test_later_classes_win() {
        let style = classes_style(["text-h1", "text-weight-light", "unknown-class"]);
        assert_eq!(style.font_size, Some(48.0));
        assert_eq!(style.font_weight, Some(300));
    }

    #[test]
    fn test_visibility_classes() {
        assert_eq!(class_style("hidden").unwrap().visible, Some(false));
        assert_eq!(class_style("invisible").unwrap().opacity, Some(0.0));
        assert_eq!(class_style("overflow-hidden").unwrap().clips_content, Some(true));
        assert_eq!(class_style("full-width").unwrap().width, Some(Dimension::Fill));
    }
}
