//! Positioned layout boxes and the arena that owns them.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! "Each box is associated with its generating element." One element may
//! generate several boxes: when its inline content wraps, each line-bound
//! piece is a separate box chained through [`LayoutBox::next_in_element`].
//!
//! # Design
//!
//! Boxes live in a [`BoxArena`] and refer to each other through
//! [`BoxId`] indices (the same arena-with-indices shape the DOM tree uses),
//! so a box can sit on a line list, a line-start list, and a fragment chain
//! at once without ownership ambiguity. Every link is an `Option<BoxId>`;
//! re-inserting a box into a line resets its line links to `None` first, so
//! a stale chain can never be walked.

use crate::box_model::{EdgeSizes, Rect};
use crate::style::{DisplayValue, FloatMode, InnerDisplayType, OuterDisplayType, PositionMode};

/// A type-safe index into the box arena.
///
/// `BoxId` provides O(1) access to any box without borrowing issues, which
/// matters here because line construction threads one box onto several
/// lists at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxId(pub usize);

/// One rectangular layout unit: an element, an inline-block, a run of text,
/// or an anonymous continuation created by a line break.
///
/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// Geometry fields come in three nested sizes, innermost first:
/// `content_*` (scrollable content), `inner_*` (the content area), and
/// `width`/`height` (the border box). The margin box is derived via
/// [`LayoutBox::total_width`] / [`LayoutBox::total_height`].
///
/// The styling subsystem creates these records with resolved style values
/// filled in; layout exclusively writes the geometry and link fields
/// during a pass.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    /// Border-box width (content + padding + border).
    pub width: f32,
    /// Border-box height (content + padding + border).
    pub height: f32,
    /// Content-area width, set from the pen extent when the box's inner
    /// flow completes.
    pub inner_width: f32,
    /// Content-area height, set from the line height when the box's inner
    /// flow completes.
    pub inner_height: f32,
    /// Width of the laid-out contents (equals `inner_width` unless the
    /// contents overflow).
    pub content_width: f32,
    /// Height of the laid-out contents (equals `inner_height` unless the
    /// contents overflow).
    pub content_height: f32,

    /// Resolved margin edges.
    pub margin: EdgeSizes,
    /// Resolved border widths.
    pub border: EdgeSizes,
    /// Resolved padding edges.
    pub padding: EdgeSizes,

    /// Horizontal offset of the margin-box corner relative to the
    /// containing box, written by pen advancement.
    pub parent_offset_left: f32,
    /// Vertical offset of the margin-box corner relative to the containing
    /// box, written when the line completes.
    pub parent_offset_top: f32,

    /// [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
    pub position: PositionMode,
    /// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
    pub float: FloatMode,
    /// [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)
    pub display: DisplayValue,

    /// Next box accumulated on the same line (null-terminated list owned by
    /// the cursor; reachable only until that line completes).
    pub next_on_line: Option<BoxId>,
    /// First box of the following line, linked for later alignment sweeps.
    pub next_line_start: Option<BoxId>,
    /// Next fragment generated by the same source element, when its content
    /// wraps across lines.
    pub next_in_element: Option<BoxId>,
    /// First structural child in the box tree, bridged from the cursor tree
    /// when a flow context accepts its first in-flow box.
    pub first_child: Option<BoxId>,
}

impl LayoutBox {
    /// A box with the given display value and everything else zeroed;
    /// in flow, not floated.
    #[must_use]
    pub fn new(display: DisplayValue) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            inner_width: 0.0,
            inner_height: 0.0,
            content_width: 0.0,
            content_height: 0.0,
            margin: EdgeSizes::default(),
            border: EdgeSizes::default(),
            padding: EdgeSizes::default(),
            parent_offset_left: 0.0,
            parent_offset_top: 0.0,
            position: PositionMode::InFlow,
            float: FloatMode::None,
            display,
            next_on_line: None,
            next_line_start: None,
            next_in_element: None,
            first_child: None,
        }
    }

    /// Margin-box width.
    ///
    /// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
    /// "The margin box is the outermost box, and contains all four areas."
    #[must_use]
    pub fn total_width(&self) -> f32 {
        self.width + self.margin.horizontal()
    }

    /// Margin-box height.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.height + self.margin.vertical()
    }

    /// True for inline-level boxes (`display: inline`, `inline-block`).
    ///
    /// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
    #[must_use]
    pub const fn is_inline_level(&self) -> bool {
        matches!(self.display.outer, OuterDisplayType::Inline)
    }

    /// True for block-level boxes.
    #[must_use]
    pub const fn is_block_level(&self) -> bool {
        matches!(self.display.outer, OuterDisplayType::Block)
    }

    /// True if this box establishes its own flow context
    /// (`display: inline-block`, `flow-root`).
    ///
    /// [§ 2.2 Inner Display Layout Models](https://www.w3.org/TR/css-display-3/#inner-model)
    #[must_use]
    pub const fn establishes_flow_root(&self) -> bool {
        matches!(self.display.inner, InnerDisplayType::FlowRoot)
    }

    /// Distance from this box's margin edge to its content edge on the
    /// inline start side; where an inline element's own pen begins.
    ///
    /// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    /// "Horizontal margins, borders, and padding are respected between
    /// these boxes."
    #[must_use]
    pub fn inline_start_offset(&self) -> f32 {
        self.margin.left + self.border.left + self.padding.left
    }

    /// Commit the border-box size from the inner (content) size.
    ///
    /// `fixed_width` / `fixed_height` skip the respective axis when the
    /// styling subsystem already resolved an explicit `width`/`height`.
    pub fn set_dimensions(&mut self, fixed_width: bool, fixed_height: bool) {
        if !fixed_width {
            self.width = self.inner_width + self.padding.horizontal() + self.border.horizontal();
        }
        if !fixed_height {
            self.height = self.inner_height + self.padding.vertical() + self.border.vertical();
        }
    }

    /// Reset the per-line links before (re-)inserting the box into a line.
    ///
    /// A box appears on at most one line list at a time; clearing here makes
    /// a stale chain from a previous line unreachable by construction.
    pub fn reset_line_links(&mut self) {
        self.next_on_line = None;
        self.next_line_start = None;
    }

    /// The border-box rectangle in the containing box's coordinate space.
    #[must_use]
    pub fn border_box(&self) -> Rect {
        Rect {
            x: self.parent_offset_left,
            y: self.parent_offset_top,
            width: self.width,
            height: self.height,
        }
    }

    /// True if every geometric input on this box is a finite number.
    #[must_use]
    pub fn has_finite_geometry(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.inner_width.is_finite()
            && self.inner_height.is_finite()
            && self.margin.is_finite()
            && self.border.is_finite()
            && self.padding.is_finite()
    }
}

/// Arena owning every box of a document, addressed by [`BoxId`].
///
/// The styling subsystem owns the arena across passes; a layout pass
/// borrows it exclusively, appends anonymous continuation boxes as lines
/// break, and fills in geometry.
#[derive(Debug, Default)]
pub struct BoxArena {
    boxes: Vec<LayoutBox>,
}

impl BoxArena {
    /// An empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    /// Append a box, returning its id.
    pub fn push(&mut self, layout_box: LayoutBox) -> BoxId {
        let id = BoxId(self.boxes.len());
        self.boxes.push(layout_box);
        id
    }

    /// Number of boxes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// True if the arena holds no boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Shared access to a box, if the id is in bounds.
    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        self.boxes.get(id.0)
    }

    /// Exclusive access to a box, if the id is in bounds.
    pub fn get_mut(&mut self, id: BoxId) -> Option<&mut LayoutBox> {
        self.boxes.get_mut(id.0)
    }

    /// Walk a `next_in_element` fragment chain from its first box,
    /// collecting the fragments in document order.
    #[must_use]
    pub fn fragment_chain(&self, first: BoxId) -> Vec<BoxId> {
        let mut chain = Vec::new();
        let mut current = Some(first);
        while let Some(id) = current {
            chain.push(id);
            current = self[id].next_in_element;
        }
        chain
    }
}

impl std::ops::Index<BoxId> for BoxArena {
    type Output = LayoutBox;

    fn index(&self, id: BoxId) -> &LayoutBox {
        &self.boxes[id.0]
    }
}

impl std::ops::IndexMut<BoxId> for BoxArena {
    fn index_mut(&mut self, id: BoxId) -> &mut LayoutBox {
        &mut self.boxes[id.0]
    }
}

/// Ordered chain of boxes generated by one source element, linked through
/// [`LayoutBox::next_in_element`].
///
/// [§ 9.2.1.1 Anonymous inline boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-inline)
///
/// "When an inline box exceeds the width of a line box, it is split into
/// several boxes and these boxes are distributed across several line boxes."
///
/// `last` always points at the chain's tail so appends are O(1). Chains are
/// rebuilt from scratch every layout pass.
#[derive(Debug, Clone, Copy)]
pub struct FragmentChain {
    /// First fragment, in document order.
    pub first: BoxId,
    /// Tail of the chain; appends link here.
    pub last: BoxId,
}

impl FragmentChain {
    /// A chain holding a single, unbroken fragment.
    #[must_use]
    pub const fn single(first: BoxId) -> Self {
        Self { first, last: first }
    }
}
