//! Resolved style values consumed by layout.
//!
//! The cascade and selector matching live in the styling subsystem; by the
//! time a box reaches this crate every property below is a used value.
//!
//! [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/)
//! [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)

use serde::Serialize;

/// Default font size when no ancestor flow context provides one.
///
/// [§ 15.3 The page](https://html.spec.whatwg.org/multipage/rendering.html)
/// User agents conventionally use a 16px medium font size.
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// Used value for `line-height: normal` as a ratio of the font size.
///
/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
///
/// "The initial value of 'line-height' is 'normal'. We recommend a used
/// value for 'normal' between 1.0 and 1.2."
pub const NORMAL_LINE_HEIGHT_RATIO: f32 = 1.2;

/// [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
///
/// Whether a box participates in normal flow or is taken out of it.
///
/// "An element is called out of flow if it is floated, absolutely
/// positioned, or is the root element."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionMode {
    /// The box participates in normal line/block flow.
    InFlow,
    /// [§ 9.6 Absolute positioning](https://www.w3.org/TR/CSS2/visuren.html#absolute-positioning)
    ///
    /// "In the absolute positioning model, a box is removed from the
    /// normal flow entirely."
    Absolute,
}

impl PositionMode {
    /// True for boxes laid out by normal line/block flow.
    #[must_use]
    pub const fn is_in_flow(self) -> bool {
        matches!(self, Self::InFlow)
    }
}

/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// "Values have the following meanings:
///
/// left
///   The element generates a block box that is floated to the left.
///
/// right
///   The element generates a block box that is floated to the right.
///
/// none
///   The box is not floated."
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FloatMode {
    /// "The box is not floated."
    #[default]
    None,
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

/// [CSS Writing Modes § 2 Inline Direction and Bidirectionality](https://www.w3.org/TR/css-writing-modes-4/#text-direction)
///
/// Inline progression direction of a flow context, from the `direction`
/// property. Vertical writing modes are not supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Left-to-right inline progression (`direction: ltr`).
    #[default]
    Ltr,
    /// Right-to-left inline progression (`direction: rtl`).
    Rtl,
}

impl Direction {
    /// True when the pen advances leftwards across the line.
    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Rtl)
    }
}

/// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
///
/// "The `<display-outside>` keywords specify the element's outer display
/// type, which is essentially its role in flow layout."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OuterDisplayType {
    /// "The element generates a block-level box when placed in flow layout."
    Block,
    /// "The element generates an inline-level box when placed in flow layout."
    Inline,
}

/// [§ 2.2 Inner Display Layout Models](https://www.w3.org/TR/css-display-3/#inner-model)
///
/// "The `<display-inside>` keywords specify the element's inner display type,
/// which defines the type of formatting context that lays out its contents."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InnerDisplayType {
    /// "The element lays out its contents using flow layout (block-and-inline layout)."
    Flow,
    /// Same as `Flow` but establishes a new flow context, isolating its
    /// internal line breaking and floats from the container.
    FlowRoot,
}

/// Combined display value.
///
/// [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayValue {
    /// "The outer display type, which dictates how the box participates in flow layout."
    pub outer: OuterDisplayType,
    /// "The inner display type, which dictates how its descendant boxes are laid out."
    pub inner: InnerDisplayType,
}

impl DisplayValue {
    /// `display: block` - block outer, flow inner.
    #[must_use]
    pub const fn block() -> Self {
        Self {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::Flow,
        }
    }

    /// `display: inline` - inline outer, flow inner.
    #[must_use]
    pub const fn inline() -> Self {
        Self {
            outer: OuterDisplayType::Inline,
            inner: InnerDisplayType::Flow,
        }
    }

    /// `display: inline-block` - inline outer, flow-root inner.
    ///
    /// [§ 2.4 Legacy Display Values](https://www.w3.org/TR/css-display-3/#legacy-display)
    ///
    /// "inline-block: behaves as inline flow-root."
    #[must_use]
    pub const fn inline_block() -> Self {
        Self {
            outer: OuterDisplayType::Inline,
            inner: InnerDisplayType::FlowRoot,
        }
    }

    /// `display: flow-root` - block outer, flow-root inner.
    #[must_use]
    pub const fn flow_root() -> Self {
        Self {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::FlowRoot,
        }
    }
}

/// Opaque handle to a shaped font face owned by the text subsystem.
///
/// Layout never inspects the face itself; it only threads the handle through
/// the cursor hierarchy so nested flow contexts resolve the same face their
/// enclosing flow root uses unless they override it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FontFaceId(pub usize);
