use super::{apply_frame_style, append, container, palette_attr, size_token};
use crate::error::ProcessorError;
use crate::fonts::{icon_font_chain, load_first};
use crate::registry::{ProcessContext, Processor};
use crate::target::{set_properties, NodeId, RenderProperty, VectorShape};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use quasar_style::{
    parse_length, AxisAlign, Color, CounterAlign, LayoutDirection, ResolvedStyle, TextAlign,
};
use quasar_template::SemanticNode;
use rustc_hash::FxHashMap;

pub(crate) const ICON_SIZES: [(&str, f64); 5] = [
    ("xs", 16.0),
    ("sm", 20.0),
    ("md", 24.0),
    ("lg", 32.0),
    ("xl", 40.0),
];

const DEFAULT_SIZE: f64 = 24.0;

/// Material glyph drawn for unknown names.
const FALLBACK_GLYPH: char = '\u{E5CD}';

static GLYPHS: Lazy<FxHashMap<&'static str, char>> = Lazy::new(|| {
    [
        ("send", '\u{E163}'),
        ("phone", '\u{E0CD}'),
        ("menu", '\u{E5D2}'),
        ("close", '\u{E5CD}'),
        ("add", '\u{E145}'),
        ("remove", '\u{E15B}'),
        ("search", '\u{E8B6}'),
        ("settings", '\u{E8B8}'),
        ("delete", '\u{E872}'),
        ("edit", '\u{E3C9}'),
        ("help", '\u{E887}'),
        ("info", '\u{E88E}'),
        ("warning", '\u{E002}'),
        ("error", '\u{E000}'),
        ("arrow_back", '\u{E5C4}'),
        ("arrow_forward", '\u{E5C8}'),
        ("check", '\u{E5CA}'),
        ("home", '\u{E88A}'),
        ("chevron_left", '\u{E5CB}'),
        ("chevron_right", '\u{E5CC}'),
        ("expand_less", '\u{E5CE}'),
        ("expand_more", '\u{E5CF}'),
        ("favorite", '\u{E87D}'),
        ("star", '\u{E838}'),
        ("person", '\u{E7FD}'),
        ("mail", '\u{E158}'),
        ("email", '\u{E0BE}'),
        ("notifications", '\u{E7F4}'),
        ("share", '\u{E80D}'),
        ("cloud", '\u{E2BD}'),
        ("folder", '\u{E2C7}'),
        ("keyboard_arrow_down", '\u{E313}'),
        ("play_arrow", '\u{E037}'),
        ("pause", '\u{E034}'),
        ("image", '\u{E3F4}'),
        ("shopping_cart", '\u{E8CC}'),
        ("save", '\u{E161}'),
        ("done", '\u{E876}'),
        ("clear", '\u{E14C}'),
        ("visibility", '\u{E8F4}'),
        ("map", '\u{E55B}'),
        ("account_circle", '\u{E853}'),
        ("logout", '\u{E9BA}'),
    ]
    .into_iter()
    .collect()
});

/// Icon font family implied by an icon name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconLibrary {
    Material,
    FontAwesome,
    Ionicons,
    Eva,
    Themify,
    LineAwesome,
    Mdi,
}

impl IconLibrary {
    pub fn detect(name: &str) -> Self {
        const PREFIXES: [(&str, IconLibrary); 9] = [
            ("fa-", IconLibrary::FontAwesome),
            ("fas ", IconLibrary::FontAwesome),
            ("far ", IconLibrary::FontAwesome),
            ("fab ", IconLibrary::FontAwesome),
            ("ion-", IconLibrary::Ionicons),
            ("eva-", IconLibrary::Eva),
            ("ti-", IconLibrary::Themify),
            ("la-", IconLibrary::LineAwesome),
            ("mdi-", IconLibrary::Mdi),
        ];
        PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, library)| *library)
            .unwrap_or(IconLibrary::Material)
    }

    /// The bare glyph name, e.g. `fas fa-home` -> `home`.
    pub fn strip<'a>(&self, name: &'a str) -> &'a str {
        let name = name.rsplit(' ').next().unwrap_or(name);
        let prefix = match self {
            IconLibrary::Material => return name,
            IconLibrary::FontAwesome => "fa-",
            IconLibrary::Ionicons => "ion-",
            IconLibrary::Eva => "eva-",
            IconLibrary::Themify => "ti-",
            IconLibrary::LineAwesome => "la-",
            IconLibrary::Mdi => "mdi-",
        };
        name.strip_prefix(prefix).unwrap_or(name)
    }
}

/// Material glyph for `name`. Names from other libraries are matched on
/// their bare name with `-` read as `_`.
pub fn glyph_for(name: &str) -> char {
    let library = IconLibrary::detect(name);
    let bare = library.strip(name).replace('-', "_");
    GLYPHS.get(bare.as_str()).copied().unwrap_or_else(|| {
        tracing::debug!(name, ?library, "no glyph for icon, using fallback");
        FALLBACK_GLYPH
    })
}

fn icon_name(node: &SemanticNode) -> String {
    if let Some(name) = node.attr("name") {
        return name.to_string();
    }
    for class in node.classes() {
        if class == "material-icons" {
            return node.text_content().trim().to_string();
        }
        if class.starts_with("fa-") || class.starts_with("mdi-") {
            return class.to_string();
        }
    }
    String::new()
}

fn icon_size(node: &SemanticNode) -> f64 {
    if let Some(size) = node.attr("size") {
        return size_token(size, &ICON_SIZES)
            .or_else(|| parse_length(size))
            .unwrap_or(DEFAULT_SIZE);
    }
    let in_dense_button = node
        .parent_context
        .as_ref()
        .is_some_and(|parent| parent.tag == "q-btn" && parent.attributes.contains_key("dense"));
    if in_dense_button {
        20.0
    } else {
        DEFAULT_SIZE
    }
}

/// `q-icon`: a square frame holding one glyph from an icon font.
pub struct IconProcessor;

#[async_trait]
impl Processor for IconProcessor {
    async fn process(
        &self,
        node: &SemanticNode,
        style: &ResolvedStyle,
        cx: &mut ProcessContext<'_>,
    ) -> Result<NodeId, ProcessorError> {
        let name = icon_name(node);
        let size = icon_size(node);
        let color = palette_attr(node, "color").or(style.text_color);

        let frame = container(cx, "q-icon", []);
        apply_frame_style(cx.target, frame, style);
        set_properties(
            cx.target,
            frame,
            [
                RenderProperty::Resize {
                    width: size,
                    height: size,
                },
                RenderProperty::Layout(LayoutDirection::Horizontal),
                RenderProperty::HugContents(false),
                RenderProperty::PrimaryAlign(AxisAlign::Center),
                RenderProperty::CounterAlign(CounterAlign::Center),
                RenderProperty::Fill(None),
            ],
        );

        let glyph = match load_first(cx.target, &icon_font_chain(), "icon font").await {
            Ok(font) => {
                let glyph = cx.target.create_text();
                let mut props = vec![
                    RenderProperty::Name(format!("icon-{}", name)),
                    RenderProperty::Font(font),
                    RenderProperty::Characters(glyph_for(&name).to_string()),
                    RenderProperty::FontSize(size),
                    RenderProperty::TextAlign(TextAlign::Center),
                ];
                props.extend(color.map(|c| RenderProperty::Fill(Some(c))));
                set_properties(cx.target, glyph, props);
                glyph
            }
            Err(err) => {
                tracing::warn!(%err, icon = %name, "using placeholder for icon");
                let placeholder = cx.target.create_vector(VectorShape::Rectangle);
                let side = size * 0.7;
                set_properties(
                    cx.target,
                    placeholder,
                    [
                        RenderProperty::Name("icon-placeholder".into()),
                        RenderProperty::Resize {
                            width: side,
                            height: side,
                        },
                        RenderProperty::CornerRadius(size * 0.2),
                        RenderProperty::Fill(Some(color.unwrap_or(Color::grey(0.5)))),
                    ],
                );
                placeholder
            }
        };
        append(cx, "q-icon", frame, glyph)?;
        Ok(frame)
    }
}
