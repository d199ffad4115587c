//! Line construction: accumulating boxes onto lines, advancing the pen,
//! and completing lines.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "The rectangular area that contains the boxes that form a line is
//! called a line box."
//!
//! The three operations here are the engine's hot path. `add_to_line`
//! threads a box onto the cursor's per-line lists, `advance_pen` assigns
//! its horizontal offset and moves the pen, and `complete_line` finalizes
//! the accumulated line: vertical alignment, float clearing, and the
//! upward walk that closes the partial lines of every open inline
//! ancestor, leaving continuation fragments behind for the next line.
//!
//! # Design
//!
//! `complete_line` is written as an explicit iterative ascent rather than
//! recursion through the cursor tree. The ascent records which inline
//! levels it closed; the unwind then synthesizes their continuation
//! fragments root-first, so each fragment joins a parent line that has
//! already been reset. The observable order of box mutations matches the
//! recursive formulation exactly.

use crate::cursor::{CursorId, CursorKind};
use crate::layout_box::{BoxId, LayoutBox};
use crate::reflow::Reflow;
use crate::style::FloatMode;

impl Reflow<'_> {
    /// Accumulate a box onto the cursor's current line.
    ///
    /// Dispatches on the box's positioning scheme:
    ///
    /// - out-of-flow boxes join the out-of-flow queue and take their
    ///   offsets from the current pen without advancing it;
    /// - floats join the active float set (space reservation happens in
    ///   [`Reflow::advance_pen`]);
    /// - in-flow boxes join the on-line list; the first box of a fresh
    ///   line additionally becomes a line-start entry, and the very first
    ///   in-flow box of the whole flow context bridges the cursor tree
    ///   back into the box tree as the parent box's first child.
    ///
    /// The box's line links are cleared before insertion, so re-adding a
    /// box (an inline-block re-entering its parent's line, a continuation
    /// fragment) can never leave a stale chain walkable.
    ///
    /// # Panics
    /// Panics if the cursor's line lists are internally inconsistent (a
    /// head without a tail).
    pub fn add_to_line(&mut self, cursor: CursorId, box_id: BoxId) {
        self.boxes[box_id].reset_line_links();

        if !self.boxes[box_id].position.is_in_flow() {
            let pen_x = self.cur(cursor).pen_x;
            let pen_y = self.pen_y(cursor);
            {
                let bx = &mut self.boxes[box_id];
                bx.parent_offset_left = pen_x + bx.margin.left;
                bx.parent_offset_top = pen_y + bx.margin.top;
            }
            let tail = self.cur(cursor).last_out_of_flow;
            match tail {
                None => {
                    let cur = self.cur_mut(cursor);
                    cur.first_out_of_flow = Some(box_id);
                    cur.last_out_of_flow = Some(box_id);
                }
                Some(last) => {
                    self.boxes[last].next_on_line = Some(box_id);
                    self.cur_mut(cursor).last_out_of_flow = Some(box_id);
                }
            }
            return;
        }

        if self.boxes[box_id].float != FloatMode::None {
            self.cur_mut(cursor).active_floats.push(box_id);
            return;
        }

        if self.cur(cursor).first_on_line.is_none() {
            // First in-flow box of a fresh line.
            {
                let cur = self.cur_mut(cursor);
                cur.first_on_line = Some(box_id);
                cur.last_on_line = Some(box_id);
            }
            if self.cur(cursor).first_line_start.is_none() {
                // First in-flow box of the whole flow context: bridge the
                // cursor tree back into the box tree.
                let parent_box = self
                    .cur(cursor)
                    .parent
                    .and_then(|parent| self.cur(parent).current_box);
                if let Some(parent_box) = parent_box {
                    self.boxes[parent_box].first_child = Some(box_id);
                }
                let cur = self.cur_mut(cursor);
                cur.first_line_start = Some(box_id);
                cur.last_line_start = Some(box_id);
            } else {
                let last = self
                    .cur(cursor)
                    .last_line_start
                    .expect("line-start list has a tail");
                self.boxes[last].next_line_start = Some(box_id);
                self.cur_mut(cursor).last_line_start = Some(box_id);
            }
        } else {
            let last = self
                .cur(cursor)
                .last_on_line
                .expect("on-line list has a tail");
            self.boxes[last].next_on_line = Some(box_id);
            self.cur_mut(cursor).last_on_line = Some(box_id);
        }
    }

    /// Assign the box's horizontal offset and move the pen past it.
    ///
    /// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    /// "In an inline formatting context, boxes are laid out horizontally,
    /// one after the other."
    ///
    /// Floats do not advance the pen; instead they reserve space for the
    /// rest of the flow context, shrinking the usable line from whichever
    /// side they float to. With a leftwards pen the sides swap roles, so
    /// each float mode has a mirrored branch.
    pub fn advance_pen(&mut self, cursor: CursorId, box_id: BoxId) {
        let leftwards = self.going_leftwards(cursor);
        let (float_mode, width, total_width, margin_left, margin_right) = {
            let bx = &self.boxes[box_id];
            (
                bx.float,
                bx.width,
                bx.total_width(),
                bx.margin.left,
                bx.margin.right,
            )
        };

        match float_mode {
            FloatMode::Right => {
                if leftwards {
                    // The line-start side; the start moves inwards.
                    let line_start = self.cur(cursor).line_start;
                    self.boxes[box_id].parent_offset_left = line_start;
                    let cur = self.cur_mut(cursor);
                    cur.pen_x += total_width;
                    cur.line_start += width;
                } else {
                    // Sits against the max extent; the extent moves inwards.
                    let max_x = self.max_x(cursor);
                    self.boxes[box_id].parent_offset_left = max_x - total_width;
                    self.set_max_x(cursor, max_x - width);
                }
            }
            FloatMode::Left => {
                if leftwards {
                    let max_x = self.max_x(cursor);
                    self.boxes[box_id].parent_offset_left = max_x - total_width;
                    self.set_max_x(cursor, max_x - width);
                } else {
                    let line_start = self.cur(cursor).line_start;
                    self.boxes[box_id].parent_offset_left = line_start;
                    let cur = self.cur_mut(cursor);
                    cur.pen_x += total_width;
                    cur.line_start += width;
                }
                // In-flow content already accumulated shifts past the float.
                if self.cur(cursor).first_on_line != Some(box_id) {
                    let mut next = self.cur(cursor).first_on_line;
                    while let Some(b) = next {
                        if b == box_id {
                            break;
                        }
                        if self.boxes[b].float == FloatMode::None {
                            self.boxes[b].parent_offset_left += width;
                        }
                        next = self.boxes[b].next_on_line;
                    }
                }
            }
            FloatMode::None if leftwards => {
                // The offset is the pen position mirrored about the line
                // start, so content runs from right to left.
                let offset = {
                    let cur = self.cur_mut(cursor);
                    cur.pen_x += width + margin_right;
                    let offset = 2.0 * cur.line_start - cur.pen_x;
                    cur.pen_x += margin_left;
                    offset
                };
                self.boxes[box_id].parent_offset_left = offset;
                let effective_height = self.boxes[box_id].total_height();
                if effective_height > self.cur(cursor).line_height {
                    self.cur_mut(cursor).line_height = effective_height;
                }
            }
            FloatMode::None => {
                let offset = {
                    let cur = self.cur_mut(cursor);
                    cur.pen_x += margin_left;
                    let offset = cur.pen_x;
                    cur.pen_x += width + margin_right;
                    offset
                };
                self.boxes[box_id].parent_offset_left = offset;
                // Inline-level boxes contribute their content height to the
                // line; block-level participants contribute the margin box.
                let bx = &self.boxes[box_id];
                let effective_height = if bx.is_inline_level() {
                    bx.inner_height
                } else {
                    bx.total_height()
                };
                if effective_height > self.cur(cursor).line_height {
                    self.cur_mut(cursor).line_height = effective_height;
                }
            }
        }
    }

    /// Finalize the cursor's current line.
    ///
    /// `break_line` is true when the line ended because the next box did
    /// not fit (content continues on a fresh line), false when the flow
    /// context itself is ending. `top_of_stack` is true only on the
    /// outermost call of a close, where the partial line must be aligned
    /// even though no break occurred.
    ///
    /// On a break the walk ascends: each open inline ancestor's partial
    /// line is aligned and committed, its element box is sized and placed
    /// on *its* parent's line, and after the flow root has started the new
    /// line, a continuation fragment is synthesized for each closed level
    /// so the element resumes on the fresh line. The ascent stops at the
    /// flow root, at an out-of-flow level, or at an inline-block (whose
    /// inner lines never propagate outward).
    ///
    /// # Panics
    /// Panics if a nested cursor is missing its parent, current box, or
    /// fragment chain; all three are established when the cursor opens.
    pub fn complete_line(&mut self, cursor: CursorId, break_line: bool, top_of_stack: bool) {
        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[LINE] complete cursor={} break={break_line} top={top_of_stack} line_height={} pen_x={}",
            cursor.0,
            self.cur(cursor).line_height,
            self.cur(cursor).pen_x,
        );

        let mut closed: Vec<CursorId> = Vec::new();
        let mut current = cursor;
        let mut top = top_of_stack;

        loop {
            if break_line || top {
                self.align_line(current);
            }

            if self.is_flow_root(current) {
                if break_line || top {
                    self.finish_root_line(current);
                }
                if break_line {
                    self.reset_line(current);
                }
                break;
            }

            let ascend = self.commit_inline_level(current, break_line);
            if !ascend {
                if break_line {
                    self.reset_line(current);
                }
                break;
            }

            closed.push(current);
            current = self
                .cur(current)
                .parent
                .expect("nested cursor has a parent");
            top = false;
        }

        // Root-first unwind: each closed level gets a continuation fragment
        // on its parent's fresh line, then starts accumulating again.
        for &level in closed.iter().rev() {
            self.synthesize_fragment(level);
            self.reset_line(level);
        }
    }

    /// Vertical alignment pass over the completed line.
    ///
    /// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    ///
    /// Every in-flow box is pushed down so its bottom edge (margin edge for
    /// block-level participants, content edge for inline-level ones) sits
    /// on the line's bottom. Out-of-flow boxes queued alongside the line
    /// are pinned to the line's bottom directly, and block-level ones snap
    /// back to the line start horizontally. Both lists are detached as they
    /// are consumed.
    fn align_line(&mut self, cursor: CursorId) {
        let line_height = self.cur(cursor).line_height;
        let pen_y = self.pen_y(cursor);
        let line_start = self.cur(cursor).line_start;

        let mut next = self.cur_mut(cursor).first_on_line.take();
        self.cur_mut(cursor).last_on_line = None;
        while let Some(b) = next {
            next = self.boxes[b].next_on_line;
            let bx = &mut self.boxes[b];
            let mut used = bx.height + bx.margin.bottom;
            if bx.is_inline_level() {
                used -= bx.border.bottom + bx.padding.bottom;
            }
            bx.parent_offset_top = pen_y + (line_height - used);
        }

        let mut next = self.cur_mut(cursor).first_out_of_flow.take();
        self.cur_mut(cursor).last_out_of_flow = None;
        while let Some(b) = next {
            next = self.boxes[b].next_on_line;
            let bx = &mut self.boxes[b];
            if bx.is_block_level() {
                bx.parent_offset_left = line_start;
            }
            bx.parent_offset_top = pen_y + line_height;
        }
    }

    /// Flow-root finalization of a completed line: record its width, move
    /// the pen down past it, and release any floats it cleared.
    fn finish_root_line(&mut self, root: CursorId) {
        let line_height = self.cur(root).line_height;
        let line_width = self.cur(root).pen_x - self.cur(root).line_start;
        if line_width > self.largest_line_width(root) {
            self.set_largest_line_width(root, line_width);
        }

        let new_pen_y = self.pen_y(root) + line_height;
        self.set_pen_y(root, new_pen_y);

        // [§ 9.5.2 Controlling flow next to floats](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
        // A float stops affecting line geometry once the pen has moved past
        // its bottom edge. Releasing reverses the reservation made in pen
        // advancement, on the same side for the same direction.
        let leftwards = self.going_leftwards(root);
        let mut i = self.cur(root).active_floats.len();
        while i > 0 {
            i -= 1;
            let float_id = self.cur(root).active_floats[i];
            let fx = &self.boxes[float_id];
            if new_pen_y < fx.parent_offset_top + fx.height {
                continue;
            }
            let width = fx.width;
            let releases_line_start = match fx.float {
                FloatMode::Left => !leftwards,
                FloatMode::Right => leftwards,
                FloatMode::None => {
                    unreachable!("non-floated box in the active float set")
                }
            };
            if releases_line_start {
                self.cur_mut(root).line_start -= width;
            } else {
                let max_x = self.max_x(root);
                self.set_max_x(root, max_x + width);
            }
            let _ = self.cur_mut(root).active_floats.remove(i);
        }
    }

    /// Close an inline level's partial line: fold its line height into the
    /// parent's, size the element box from the pen extent, and place the
    /// box on the parent's line.
    ///
    /// Returns whether a line break should keep ascending past this level.
    /// It should not when the element is out of flow (its line geometry
    /// never reaches the parent) or establishes its own flow root (its
    /// inner lines are private).
    fn commit_inline_level(&mut self, cursor: CursorId, break_line: bool) -> bool {
        let box_id = self
            .cur(cursor)
            .current_box
            .expect("nested cursor has a current box");
        let parent = self
            .cur(cursor)
            .parent
            .expect("nested cursor has a parent");
        let line_height = self.cur(cursor).line_height;
        let in_flow = self.boxes[box_id].position.is_in_flow();

        if in_flow && line_height > self.cur(parent).line_height {
            self.cur_mut(parent).line_height = line_height;
        }

        let inner_width = self.cur(cursor).pen_x - self.cur(cursor).line_start;
        {
            let bx = &mut self.boxes[box_id];
            bx.inner_height = line_height;
            bx.inner_width = inner_width;
            bx.set_dimensions(false, false);
            bx.content_width = bx.inner_width;
            bx.content_height = bx.inner_height;
        }

        if in_flow {
            self.advance_pen(parent, box_id);
        }

        in_flow && break_line && !self.boxes[box_id].establishes_flow_root()
    }

    /// Create the continuation fragment for an inline level whose element
    /// wrapped: a fresh box carrying the element's style with no start
    /// margin, appended to the element's fragment chain and added to the
    /// parent's new line.
    ///
    /// [§ 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-inline)
    /// "When an inline box is split, margins, borders, and padding have no
    /// visual effect where the split occurs."
    fn synthesize_fragment(&mut self, cursor: CursorId) {
        let previous = self
            .cur(cursor)
            .current_box
            .expect("nested cursor has a current box");

        let mut fragment = LayoutBox::new(self.boxes[previous].display);
        fragment.margin = self.boxes[previous].margin;
        fragment.margin.left = 0.0;
        fragment.border = self.boxes[previous].border;
        fragment.padding = self.boxes[previous].padding;
        fragment.position = self.boxes[previous].position;
        let fragment_id = self.boxes.push(fragment);

        let (tail, parent) = {
            let cur = self.cur_mut(cursor);
            cur.current_box = Some(fragment_id);
            let chain = cur
                .fragments
                .as_mut()
                .expect("inline cursor has a fragment chain");
            let tail = chain.last;
            chain.last = fragment_id;
            (tail, cur.parent.expect("nested cursor has a parent"))
        };
        self.boxes[tail].next_in_element = Some(fragment_id);

        self.add_to_line(parent, fragment_id);
    }

    /// Begin a fresh line on this cursor.
    ///
    /// An inline cursor first refreshes its line start from its host block,
    /// picking up any float reservation or release that happened since the
    /// previous line.
    fn reset_line(&mut self, cursor: CursorId) {
        if self.cur(cursor).kind == CursorKind::Inline {
            let host = self.host_block(cursor);
            let host_line_start = self.cur(host).line_start;
            self.cur_mut(cursor).line_start = host_line_start;
        }
        let cur = self.cur_mut(cursor);
        cur.pen_x = cur.line_start;
        cur.line_height = 0.0;
        cur.baseline = 0.0;
    }
}
