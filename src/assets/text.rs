use std::borrow::Cow;

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Metrics of a single shaped line, in pixels, relative to the layout origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct LineExtent {
    pub(crate) advance: f32,
    pub(crate) ascent: f32,
    pub(crate) descent: f32,
    /// Y of the alphabetic baseline inside the layout.
    pub(crate) baseline: f32,
}

/// Stateful helper for shaping single-line text against the system font collection.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape `text` on one line. `family` is a CSS font-family list such as `"Inter, sans-serif"`.
    ///
    /// Line breaks are folded into spaces, as a 2D canvas does for `fillText`.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let text: Cow<'_, str> = if text.contains(['\n', '\r']) {
            Cow::Owned(text.replace(['\n', '\r'], " "))
        } else {
            Cow::Borrowed(text)
        };
        let family = if family.trim().is_empty() {
            "sans-serif"
        } else {
            family
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family.to_owned())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(&text);
        layout.break_all_lines(None);
        layout
    }
}

/// Extent of the first line, or `None` for an empty layout.
pub(crate) fn first_line_extent(layout: &parley::Layout<TextBrushRgba8>) -> Option<LineExtent> {
    let line = layout.lines().next()?;
    let m = line.metrics();
    Some(LineExtent {
        advance: m.advance,
        ascent: m.ascent,
        descent: m.descent,
        baseline: m.baseline,
    })
}
