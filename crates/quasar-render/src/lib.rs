//! Render Quasar components onto a design-tool surface.
//!
//! A conversion compiles the component template, wraps the result in a main
//! frame and hands every node to a component processor chosen by its
//! classification. Processors draw through the [`RenderTarget`] capability;
//! [`RecordingTarget`] keeps the result in memory.

pub mod error;
pub mod fonts;
pub mod host;
pub mod materialize;
pub mod processors;
pub mod recording;
pub mod registry;
pub mod settings;
pub mod structure;
pub mod target;

pub use error::{
    ConvertError, ProcessorError, ResourceUnavailableError, StyleApplicationError, TargetError,
};
pub use host::{handle_request, HostRequest, HostResponse};
pub use materialize::{Materializer, NodeState, ProcessedNodeMarker};
pub use recording::{NodeProps, RecordingTarget, RenderNode};
pub use registry::{ProcessContext, Processor, ProcessorRegistry};
pub use settings::{ConversionSettings, Density};
pub use structure::generate_structure;
pub use target::{FontName, NodeId, NodeKind, RenderProperty, RenderTarget, VectorShape};

use quasar_style::{Color, LayoutDirection};
use quasar_template::compile_component;
use target::set_properties;

/// Name of the frame every conversion is wrapped in.
pub const MAIN_FRAME_NAME: &str = "Componente Quasar";

/// Runs conversions with one registry and one set of settings.
pub struct Converter {
    registry: ProcessorRegistry,
    settings: ConversionSettings,
}

impl Converter {
    /// A converter with the built-in processors.
    pub fn new(settings: ConversionSettings) -> Self {
        Self::with_registry(ProcessorRegistry::with_defaults(), settings)
    }

    pub fn with_registry(registry: ProcessorRegistry, settings: ConversionSettings) -> Self {
        Self { registry, settings }
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    /// Register more processors before converting.
    pub fn registry_mut(&mut self) -> &mut ProcessorRegistry {
        &mut self.registry
    }

    /// Convert a single-file component into `target`, returning the main
    /// frame.
    pub async fn convert(
        &self,
        source: &str,
        target: &mut dyn RenderTarget,
    ) -> Result<NodeId, ConvertError> {
        let compiled = compile_component(source).inspect_err(|err| {
            tracing::debug!(code = %err.code, at = %err.position(source), "{}", err.message);
        })?;
        for warning in &compiled.warnings {
            tracing::warn!(%warning, "component source");
        }
        let mut root = compiled.root;
        materialize::push_layout_context(&mut root);

        let frame = target.create_container();
        set_properties(
            target,
            frame,
            [
                RenderProperty::Name(MAIN_FRAME_NAME.to_string()),
                RenderProperty::Layout(LayoutDirection::Vertical),
                RenderProperty::HugContents(true),
                RenderProperty::Fill(Some(Color::WHITE)),
                RenderProperty::Padding {
                    top: 20.0,
                    right: 20.0,
                    bottom: 20.0,
                    left: 20.0,
                },
                RenderProperty::ItemSpacing(16.0),
            ],
        );

        let mut materializer = Materializer::new(&self.registry, &self.settings);
        if materializer.materialize(target, &root, frame).await?.is_none() {
            tracing::debug!("template root rendered nothing");
        }
        Ok(frame)
    }
}

/// Convert component source to an in-memory render tree with the built-in
/// processors.
pub async fn convert_markup_to_render_tree(
    source: &str,
    settings: &ConversionSettings,
) -> Result<RenderNode, ConvertError> {
    let converter = Converter::new(settings.clone());
    let mut target = RecordingTarget::new();
    let frame = converter.convert(source, &mut target).await?;
    target
        .snapshot(frame)
        .ok_or_else(|| ConvertError::Render(format!("main frame {} missing", frame)))
}
