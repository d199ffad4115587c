//! A reflow: one layout pass over a flow context and its nested contexts.
//!
//! [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
//!
//! A [`Reflow`] exclusively borrows the box arena for its whole duration
//! and owns the cursor tree built while laying out. Layout is
//! single-threaded and runs to completion; a caller that needs to abort
//! discards the pass and reflows from scratch.
//!
//! The delegated accessors here implement the cursor hierarchy's one rule:
//! a geometric property is answered from the cursor's own storage iff the
//! cursor is currently a flow root, and from its host block otherwise.
//! That rule must hold for *every* accessor; delegating some fields but
//! not others corrupts geometry silently, which is why all reads and
//! writes go through this module.

use quokka_common::warning::warn_once;
use thiserror::Error;

use crate::cursor::{CursorId, CursorKind, LineCursor};
use crate::layout_box::{BoxArena, BoxId, FragmentChain};
use crate::style::{
    DEFAULT_FONT_SIZE_PX, Direction, FloatMode, FontFaceId, NORMAL_LINE_HEIGHT_RATIO,
};

/// Errors reported at the layout API boundary.
///
/// These cover invalid *inputs* only. Violated internal invariants (a
/// nested cursor with no host block, a box on two lines at once) are
/// programming errors and panic instead of returning a variant here,
/// since continuing would produce silently wrong geometry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// A geometric input was NaN or infinite.
    #[error("non-finite {0} passed to layout")]
    NonFiniteGeometry(&'static str),
}

/// Final measurements of a completed flow root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowMetrics {
    /// Total height of the laid-out content (the final pen y).
    pub content_height: f32,
    /// Width of the widest line, the shrink-to-fit width input.
    ///
    /// [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width)
    pub max_line_width: f32,
}

/// One layout pass: the cursor tree plus an exclusive borrow of the boxes
/// it positions.
///
/// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// Boxes arrive in document order through [`Reflow::place`]; flow contexts
/// open and close around them as elements begin and end. When the pass is
/// dropped, all cursors die with it and the finished geometry lives on the
/// boxes.
pub struct Reflow<'a> {
    pub(crate) boxes: &'a mut BoxArena,
    pub(crate) cursors: Vec<LineCursor>,
}

impl<'a> Reflow<'a> {
    /// Start a layout pass over the given arena.
    pub fn new(boxes: &'a mut BoxArena) -> Self {
        Self {
            boxes,
            cursors: Vec::new(),
        }
    }

    /// Shared access to the arena being laid out.
    #[must_use]
    pub fn boxes(&self) -> &BoxArena {
        self.boxes
    }

    /// Shared access to a cursor.
    ///
    /// # Panics
    /// Panics if the id does not belong to this pass.
    #[must_use]
    pub fn cursor(&self, id: CursorId) -> &LineCursor {
        &self.cursors[id.0]
    }

    /// Exclusive access to a cursor.
    ///
    /// # Panics
    /// Panics if the id does not belong to this pass.
    pub fn cursor_mut(&mut self, id: CursorId) -> &mut LineCursor {
        &mut self.cursors[id.0]
    }

    pub(crate) fn cur(&self, id: CursorId) -> &LineCursor {
        &self.cursors[id.0]
    }

    pub(crate) fn cur_mut(&mut self, id: CursorId) -> &mut LineCursor {
        &mut self.cursors[id.0]
    }

    /// True when the cursor currently owns flow-root state.
    #[must_use]
    pub fn is_flow_root(&self, id: CursorId) -> bool {
        self.cur(id).kind.is_flow_root()
    }

    /// The flow root this cursor delegates to.
    ///
    /// # Panics
    /// Panics if the cursor has no host block; every nested cursor must be
    /// created with one.
    #[must_use]
    pub fn host_block(&self, id: CursorId) -> CursorId {
        self.cur(id)
            .host_block
            .expect("cursor delegation requires a host block")
    }

    /// The cursor whose storage answers delegated accessors: the cursor
    /// itself while it is a flow root, its host block otherwise.
    fn storage(&self, id: CursorId) -> CursorId {
        if self.is_flow_root(id) {
            id
        } else {
            self.host_block(id)
        }
    }

    // ------------------------------------------------------------------
    // Delegated geometric accessors.
    // ------------------------------------------------------------------

    /// Current pen y of the owning flow root.
    #[must_use]
    pub fn pen_y(&self, id: CursorId) -> f32 {
        self.cur(self.storage(id)).pen_y
    }

    /// Set the pen y on the owning flow root.
    pub fn set_pen_y(&mut self, id: CursorId, value: f32) {
        let target = self.storage(id);
        self.cur_mut(target).pen_y = value;
    }

    /// The x value lines must not exceed, from the owning flow root.
    #[must_use]
    pub fn max_x(&self, id: CursorId) -> f32 {
        self.cur(self.storage(id)).max_x
    }

    /// Set the max extent on the owning flow root.
    pub fn set_max_x(&mut self, id: CursorId, value: f32) {
        let target = self.storage(id);
        self.cur_mut(target).max_x = value;
    }

    /// True when the pen advances leftwards, from the owning flow root.
    #[must_use]
    pub fn going_leftwards(&self, id: CursorId) -> bool {
        self.cur(self.storage(id)).going_leftwards
    }

    /// Widest completed line so far, from the owning flow root.
    #[must_use]
    pub fn largest_line_width(&self, id: CursorId) -> f32 {
        self.cur(self.storage(id)).largest_line_width
    }

    /// Record a completed line's width on the owning flow root.
    pub fn set_largest_line_width(&mut self, id: CursorId, value: f32) {
        let target = self.storage(id);
        self.cur_mut(target).largest_line_width = value;
    }

    // ------------------------------------------------------------------
    // Derived font properties: the cursor's own override if set, else the
    // host block's, else the user-agent default. These resolve by lookup,
    // never by copying, so a change at the flow root is visible to every
    // descendant that has not overridden it.
    // ------------------------------------------------------------------

    /// Resolved `font-size` for this flow context.
    #[must_use]
    pub fn font_size(&self, id: CursorId) -> f32 {
        if let Some(size) = self.cur(id).font_size {
            return size;
        }
        if let Some(host) = self.cur(id).host_block
            && let Some(size) = self.cur(host).font_size
        {
            return size;
        }
        DEFAULT_FONT_SIZE_PX
    }

    /// Override `font-size` locally for this cursor.
    pub fn set_font_size(&mut self, id: CursorId, value: f32) {
        self.cur_mut(id).font_size = Some(value);
    }

    /// Resolved used `line-height` for this flow context.
    ///
    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    #[must_use]
    pub fn css_line_height(&self, id: CursorId) -> f32 {
        if let Some(height) = self.cur(id).css_line_height {
            return height;
        }
        if let Some(host) = self.cur(id).host_block
            && let Some(height) = self.cur(host).css_line_height
        {
            return height;
        }
        self.font_size(id) * NORMAL_LINE_HEIGHT_RATIO
    }

    /// Override the used `line-height` locally for this cursor.
    pub fn set_css_line_height(&mut self, id: CursorId, value: f32) {
        self.cur_mut(id).css_line_height = Some(value);
    }

    /// Resolved font face for this flow context, if any ancestor set one.
    ///
    /// An inline-block that has returned to line-participant mode defers
    /// entirely to its host block; its own override only applies while it
    /// is laying out its children.
    #[must_use]
    pub fn font_face(&self, id: CursorId) -> Option<FontFaceId> {
        let cur = self.cur(id);
        if matches!(cur.kind, CursorKind::InlineBlock { block_mode: false }) {
            return cur.host_block.and_then(|host| self.cur(host).font_face);
        }
        if let Some(face) = cur.font_face {
            return Some(face);
        }
        cur.host_block.and_then(|host| self.cur(host).font_face)
    }

    /// Override the font face locally for this cursor.
    pub fn set_font_face(&mut self, id: CursorId, value: FontFaceId) {
        self.cur_mut(id).font_face = Some(value);
    }

    // ------------------------------------------------------------------
    // Opening and closing flow contexts.
    // ------------------------------------------------------------------

    /// Open the flow root for a block container.
    ///
    /// `box_id` is the container's box; `available_width` the width its
    /// lines may use. For `direction: rtl`, lines start at the right edge
    /// and extend leftwards.
    ///
    /// # Errors
    /// [`LayoutError::NonFiniteGeometry`] if the available width or any
    /// geometric field on the box is NaN or infinite.
    pub fn open_flow_root(
        &mut self,
        box_id: BoxId,
        available_width: f32,
        direction: Direction,
    ) -> Result<CursorId, LayoutError> {
        if !available_width.is_finite() {
            return Err(LayoutError::NonFiniteGeometry("available width"));
        }
        if !self.boxes[box_id].has_finite_geometry() {
            return Err(LayoutError::NonFiniteGeometry("box geometry"));
        }

        let mut cursor = LineCursor::new(CursorKind::FlowRoot, None, None, Some(box_id));
        cursor.going_leftwards = direction.is_rtl();
        cursor.max_x = available_width;
        // RTL lines begin at the right edge and run leftwards toward x=0.
        cursor.line_start = if direction.is_rtl() {
            available_width
        } else {
            0.0
        };
        cursor.pen_x = cursor.line_start;
        Ok(self.alloc(cursor))
    }

    /// Open a nested cursor for an inline element participating in its
    /// parent's lines.
    ///
    /// The element's box joins the parent's current line immediately; its
    /// own pen begins past its left margin, border, and padding.
    ///
    /// [§ 9.2.2](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    /// "An inline box is one that is both inline-level and whose contents
    /// participate in its containing inline formatting context."
    pub fn open_inline(&mut self, parent: CursorId, box_id: BoxId) -> CursorId {
        let host = self.storage(parent);
        let mut cursor = LineCursor::new(
            CursorKind::Inline,
            Some(parent),
            Some(host),
            Some(box_id),
        );
        cursor.pen_x = self.cur(parent).pen_x + self.boxes[box_id].inline_start_offset();
        cursor.line_start = cursor.pen_x;
        cursor.fragments = Some(FragmentChain::single(box_id));
        let id = self.alloc(cursor);
        self.add_to_line(parent, box_id);
        id
    }

    /// Open a nested cursor for an inline-block.
    ///
    /// The cursor starts in block mode: it owns its own pen and lays out
    /// its children as a flow root. [`Reflow::close_inline_block`] flips it
    /// back to a line participant.
    ///
    /// A fixed-width inline-block (non-zero `inner_width`) constrains its
    /// lines to that width; otherwise the lines may use the host block's
    /// remaining width and the final width shrinks to fit.
    pub fn open_inline_block(&mut self, parent: CursorId, box_id: BoxId) -> CursorId {
        let host = self.storage(parent);
        let mut cursor = LineCursor::new(
            CursorKind::InlineBlock { block_mode: true },
            Some(parent),
            Some(host),
            Some(box_id),
        );
        cursor.going_leftwards = self.cur(host).going_leftwards;
        let fixed_width = self.boxes[box_id].inner_width;
        cursor.max_x = if fixed_width > 0.0 {
            fixed_width
        } else {
            self.cur(host).max_x - self.cur(host).line_start
        };
        let id = self.alloc(cursor);
        self.add_to_line(parent, box_id);
        id
    }

    /// Close an inline element: finalize its partial line and commit the
    /// element's final fragment onto the parent's line.
    pub fn close_inline(&mut self, cursor: CursorId) {
        debug_assert_eq!(self.cur(cursor).kind, CursorKind::Inline);
        self.complete_line(cursor, false, true);
    }

    /// Close an inline-block: finish its inner flow, size its box from the
    /// inner content, then place it as an atomic participant on the
    /// parent's line.
    ///
    /// # Panics
    /// Panics if the cursor was not opened with
    /// [`Reflow::open_inline_block`] or carries no box.
    pub fn close_inline_block(&mut self, cursor: CursorId) {
        assert!(
            matches!(self.cur(cursor).kind, CursorKind::InlineBlock { .. }),
            "close_inline_block on a non-inline-block cursor"
        );

        // Block phase: finalize the last inner line and advance the inner
        // pen past it.
        self.complete_line(cursor, false, true);

        let box_id = self
            .cur(cursor)
            .current_box
            .expect("inline-block cursor has a box");
        let inner_height = self.cur(cursor).pen_y;
        let fixed_width = self.boxes[box_id].inner_width;
        let inner_width = if fixed_width > 0.0 {
            fixed_width
        } else {
            self.cur(cursor).largest_line_width
        };

        let bx = &mut self.boxes[box_id];
        bx.inner_height = inner_height;
        bx.inner_width = inner_width;
        bx.set_dimensions(false, false);
        bx.content_width = bx.inner_width;
        bx.content_height = bx.inner_height;

        // Line-participant phase: from here on every geometric read on
        // this cursor delegates to the host block.
        self.cur_mut(cursor).kind = CursorKind::InlineBlock { block_mode: false };

        let parent = self
            .cur(cursor)
            .parent
            .expect("inline-block cursor has a parent");
        self.advance_pen(parent, box_id);
    }

    /// Finish a flow root: finalize the last line and report the flow's
    /// measurements.
    pub fn finish_flow_root(&mut self, cursor: CursorId) -> FlowMetrics {
        self.complete_line(cursor, false, true);
        FlowMetrics {
            content_height: self.pen_y(cursor),
            max_line_width: self.largest_line_width(cursor),
        }
    }

    // ------------------------------------------------------------------
    // Placement.
    // ------------------------------------------------------------------

    /// Place one box on the cursor's current line, breaking the line first
    /// if the box does not fit.
    ///
    /// Out-of-flow boxes are queued beside the line without advancing the
    /// pen. Floats are committed at the current pen position and reserve
    /// horizontal space for the rest of the flow context. A box too wide
    /// for even a fresh line is placed anyway (predictable overflow) and
    /// reported through the warning system.
    pub fn place(&mut self, cursor: CursorId, box_id: BoxId) {
        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[LINE] place box={} on cursor={} pen_x={} line_start={} max_x={}",
            box_id.0,
            cursor.0,
            self.cur(cursor).pen_x,
            self.cur(cursor).line_start,
            self.max_x(cursor),
        );

        if !self.boxes[box_id].position.is_in_flow() {
            // Out of flow: position is precomputed from the pen; the line
            // neither breaks nor advances for it.
            self.add_to_line(cursor, box_id);
            return;
        }

        if self.boxes[box_id].float != FloatMode::None {
            // Floats take their block position at the current pen y; their
            // horizontal position and space reservation happen in pen
            // advancement.
            let pen_y = self.pen_y(cursor);
            let bx = &mut self.boxes[box_id];
            bx.parent_offset_top = pen_y + bx.margin.top;
            self.add_to_line(cursor, box_id);
            self.advance_pen(cursor, box_id);
            return;
        }

        let total_width = self.boxes[box_id].total_width();
        if self.cur(cursor).first_on_line.is_some() && !self.fits_on_line(cursor, total_width) {
            self.complete_line(cursor, true, false);
        }
        if !self.fits_on_line(cursor, total_width) {
            let available = self.max_x(cursor) - self.cur(cursor).line_start;
            warn_once(
                "layout",
                &format!(
                    "box of width {total_width}px exceeds the {available}px available to its flow context, overflowing"
                ),
            );
        }
        self.add_to_line(cursor, box_id);
        self.advance_pen(cursor, box_id);
    }

    /// Whether a box of the given margin-box width still fits on the
    /// cursor's current line.
    fn fits_on_line(&self, cursor: CursorId, total_width: f32) -> bool {
        let cur = self.cur(cursor);
        let consumed = cur.pen_x - cur.line_start + total_width;
        if self.going_leftwards(cursor) {
            // RTL lines extend leftwards from the line start toward x=0.
            consumed <= cur.line_start
        } else {
            cur.pen_x + total_width <= self.max_x(cursor)
        }
    }

    fn alloc(&mut self, cursor: LineCursor) -> CursorId {
        let id = CursorId(self.cursors.len());
        self.cursors.push(cursor);
        id
    }
}
