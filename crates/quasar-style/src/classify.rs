//! Tag name to component type mapping.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;

/// Component family. Drives processor selection and category defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Category {
    Basic,
    Form,
    Layout,
    Navigation,
    Popup,
    Scrolling,
    Display,
    Other,
    /// `q-` prefixed but not in the table.
    Quasar,
    /// Anything without the `q-` prefix.
    Html,
}

impl Category {
    /// Categories a user can switch on and off.
    pub const CONFIGURABLE: [Category; 8] = [
        Category::Basic,
        Category::Form,
        Category::Layout,
        Category::Navigation,
        Category::Popup,
        Category::Scrolling,
        Category::Display,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Basic => "basic",
            Category::Form => "form",
            Category::Layout => "layout",
            Category::Navigation => "navigation",
            Category::Popup => "popup",
            Category::Scrolling => "scrolling",
            Category::Display => "display",
            Category::Other => "other",
            Category::Quasar => "quasar",
            Category::Html => "html",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::CONFIGURABLE
            .into_iter()
            .chain([Category::Quasar, Category::Html])
            .find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result: `(category, kind)`. `kind` is the tag without
/// its `q-` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentType {
    pub category: Category,
    pub kind: SmolStr,
}

impl ComponentType {
    pub fn new(category: Category, kind: impl Into<SmolStr>) -> Self {
        Self {
            category,
            kind: kind.into(),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.kind)
    }
}

const TABLE: &[(Category, &[&str])] = &[
    (
        Category::Basic,
        &[
            "btn",
            "btn-group",
            "btn-dropdown",
            "btn-toggle",
            "icon",
            "avatar",
            "badge",
            "chip",
            "separator",
            "space",
        ],
    ),
    (
        Category::Layout,
        &[
            "card",
            "card-section",
            "card-actions",
            "layout",
            "page",
            "page-container",
            "header",
            "footer",
            "drawer",
            "toolbar",
            "toolbar-title",
            "bar",
            "splitter",
        ],
    ),
    (
        Category::Form,
        &[
            "input",
            "select",
            "checkbox",
            "radio",
            "toggle",
            "option-group",
            "form",
            "field",
            "slider",
            "range",
            "file",
            "editor",
            "knob",
            "date",
            "time",
            "color",
            "rating",
        ],
    ),
    (
        Category::Navigation,
        &[
            "tabs",
            "tab",
            "route-tab",
            "tab-panels",
            "tab-panel",
            "breadcrumbs",
            "breadcrumbs-el",
            "pagination",
            "stepper",
            "step",
            "fab",
            "fab-action",
        ],
    ),
    (
        Category::Popup,
        &["dialog", "menu", "tooltip", "popup-proxy", "popup-edit"],
    ),
    (
        Category::Scrolling,
        &[
            "scroll-area",
            "infinite-scroll",
            "virtual-scroll",
            "pull-to-refresh",
            "scroll-observer",
        ],
    ),
    (
        Category::Display,
        &[
            "table",
            "list",
            "item",
            "item-section",
            "item-label",
            "carousel",
            "carousel-slide",
            "banner",
            "expansion-item",
            "timeline",
            "timeline-entry",
            "markup-table",
            "linear-progress",
            "circular-progress",
            "parallax",
            "video",
            "tree",
        ],
    ),
    (
        Category::Other,
        &[
            "spinner",
            "skeleton",
            "intersection",
            "no-ssr",
            "resize-observer",
            "uploader",
            "chat-message",
            "responsive",
        ],
    ),
];

static KIND_TO_CATEGORY: Lazy<FxHashMap<&'static str, Category>> = Lazy::new(|| {
    TABLE
        .iter()
        .flat_map(|(category, kinds)| kinds.iter().map(move |kind| (*kind, *category)))
        .collect()
});

/// Classify a tag. Total: every input yields a classification.
pub fn classify(tag: &str) -> ComponentType {
    let normalized = tag.trim().to_ascii_lowercase();
    match normalized.strip_prefix("q-") {
        Some(kind) => match KIND_TO_CATEGORY.get(kind) {
            Some(category) => ComponentType::new(*category, kind),
            None => ComponentType::new(Category::Quasar, kind),
        },
        None => ComponentType::new(Category::Html, normalized),
    }
}
