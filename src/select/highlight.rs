use crate::{
    core::{config::HighlightDefaults, error_handler::ErrorReporter},
    layers::style::{GeometryKind, HighlightStyle},
    prelude::HashMap,
    select::model::SelectionDiff,
    surface::{feature_key, Feature, FeatureKey, FeatureRef, OverlayId, RenderSurface},
    MapError, Result,
};
use serde_json::json;
use std::sync::Arc;

/// Style function evaluated per feature with the current view resolution
pub type StyleFn = Arc<dyn Fn(&dyn Feature, f64) -> Result<HighlightStyle> + Send + Sync>;

/// How selected features are painted
///
/// Dynamic styles are evaluated while the select handler holds its state
/// lock and must not call back into the handler.
#[derive(Clone)]
pub enum SelectStyle {
    Fixed(HighlightStyle),
    Dynamic(StyleFn),
}

impl SelectStyle {
    pub fn dynamic<F>(style_fn: F) -> Self
    where
        F: Fn(&dyn Feature, f64) -> Result<HighlightStyle> + Send + Sync + 'static,
    {
        SelectStyle::Dynamic(Arc::new(style_fn))
    }
}

impl From<HighlightStyle> for SelectStyle {
    fn from(style: HighlightStyle) -> Self {
        SelectStyle::Fixed(style)
    }
}

impl std::fmt::Debug for SelectStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectStyle::Fixed(style) => f.debug_tuple("Fixed").field(style).finish(),
            SelectStyle::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Inputs for resolving a highlight style
pub struct StyleContext<'a> {
    /// Handler-level select style
    pub style: Option<&'a SelectStyle>,
    pub resolution: f64,
    pub defaults: &'a HighlightDefaults,
    pub reporter: &'a dyn ErrorReporter,
}

impl StyleContext<'_> {
    fn resolve(&self, feature: &FeatureRef, override_style: Option<&SelectStyle>) -> HighlightStyle {
        let fallback = || {
            self.defaults
                .for_kind(GeometryKind::of(feature.geometry()))
        };

        match override_style.or(self.style) {
            Some(SelectStyle::Fixed(style)) => style.clone(),
            Some(SelectStyle::Dynamic(style_fn)) => {
                match style_fn(feature.as_ref(), self.resolution) {
                    Ok(style) => style,
                    Err(error) => {
                        self.reporter.report(
                            &MapError::component(format!("Error in select style: {}", error))
                                .with_context(json!({ "featureId": feature.id() })),
                        );
                        fallback()
                    }
                }
            }
            None => fallback(),
        }
    }
}

struct HighlightHandle {
    overlay: OverlayId,
    feature: FeatureRef,
    style: HighlightStyle,
    /// Per-feature style set by programmatic selection
    override_style: Option<SelectStyle>,
}

/// Owns the one highlight layer per selected feature
#[derive(Default)]
pub struct HighlightRenderer {
    handles: HashMap<FeatureKey, HighlightHandle>,
}

impl std::fmt::Debug for HighlightRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightRenderer")
            .field("layers", &self.handles.len())
            .finish()
    }
}

impl HighlightRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings highlight layers in line with a selection change
    pub fn reconcile(
        &mut self,
        surface: &dyn RenderSurface,
        diff: &SelectionDiff,
        ctx: &StyleContext<'_>,
    ) {
        for feature in &diff.removed {
            if let Some(handle) = self.handles.remove(&feature_key(feature)) {
                surface.remove_highlight_layer(handle.overlay);
            }
        }

        for feature in &diff.added {
            let key = feature_key(feature);
            if self.handles.contains_key(&key) {
                continue;
            }
            let style = ctx.resolve(feature, None);
            let overlay = surface.add_highlight_layer(feature, &style);
            self.handles.insert(
                key,
                HighlightHandle {
                    overlay,
                    feature: feature.clone(),
                    style,
                    override_style: None,
                },
            );
        }
    }

    /// Sets (or with `None` clears) the per-feature style of already
    /// highlighted features
    pub fn set_override(
        &mut self,
        surface: &dyn RenderSurface,
        features: &[FeatureRef],
        style: Option<&SelectStyle>,
        ctx: &StyleContext<'_>,
    ) {
        for feature in features {
            if let Some(handle) = self.handles.get_mut(&feature_key(feature)) {
                handle.override_style = style.cloned();
                Self::restyle(surface, handle, ctx);
            }
        }
    }

    /// Re-resolves every highlight in place
    pub fn restyle_all(
        &mut self,
        surface: &dyn RenderSurface,
        ctx: &StyleContext<'_>,
        clear_overrides: bool,
    ) {
        for handle in self.handles.values_mut() {
            if clear_overrides {
                handle.override_style = None;
            }
            Self::restyle(surface, handle, ctx);
        }
    }

    fn restyle(surface: &dyn RenderSurface, handle: &mut HighlightHandle, ctx: &StyleContext<'_>) {
        let style = ctx.resolve(&handle.feature, handle.override_style.as_ref());
        if style != handle.style {
            surface.update_highlight_layer(handle.overlay, &style);
            handle.style = style;
        }
    }

    /// Removes every highlight layer from the surface
    pub fn release_all(&mut self, surface: &dyn RenderSurface) {
        for (_, handle) in self.handles.drain() {
            surface.remove_highlight_layer(handle.overlay);
        }
    }

    /// Whether any highlight is resolved through a style function, given the
    /// handler-level `style`
    pub fn depends_on_resolution(&self, style: Option<&SelectStyle>) -> bool {
        self.handles.values().any(|handle| {
            matches!(
                handle.override_style.as_ref().or(style),
                Some(SelectStyle::Dynamic(_))
            )
        })
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Style currently painted for `feature`
    pub fn style_of(&self, feature: &FeatureRef) -> Option<HighlightStyle> {
        self.handles
            .get(&feature_key(feature))
            .map(|handle| handle.style.clone())
    }
}
