//! Line cursors: the per-flow-context state used while constructing lines.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."
//!
//! A cursor exists for every active flow context during a single reflow:
//! the flow root (block container) that owns the authoritative pen, plus
//! one nested cursor per open inline element or inline-block. Nested
//! cursors do not copy the flow root's state; they delegate reads and
//! writes to it through their [`LineCursor::host_block`] reference, so a
//! change at the root is visible everywhere it has not been overridden.
//!
//! # Design
//!
//! A cursor's flavor is the tagged enum [`CursorKind`] rather than a
//! trait object, and the delegation rule lives in one place (the
//! accessor methods on [`crate::reflow::Reflow`]): a cursor answers from
//! its own storage iff it is currently a flow root, otherwise it answers
//! from its host block. Inline-block's runtime dual behavior is the
//! `block_mode` flag on its variant, not a separate type.

use crate::layout_box::{BoxId, FragmentChain};
use crate::style::FontFaceId;

/// A type-safe index into a reflow's cursor tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorId(pub usize);

/// The flavor of a line cursor.
///
/// The only state transition during a pass is inline-block toggling its
/// `block_mode`: true while laying out its own children (it is a flow
/// root), false while being positioned as a participant in its parent's
/// line (it delegates like any inline cursor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    /// Owns the authoritative pen/line-start/max-extent state for a
    /// block-level flow.
    ///
    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    FlowRoot,
    /// An open inline element participating in its host block's lines.
    ///
    /// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    Inline,
    /// An inline-block: a flow root while laying out its contents, a line
    /// participant while being placed.
    ///
    /// [§ 2.4 Legacy Display Values](https://www.w3.org/TR/css-display-3/#legacy-display)
    /// "inline-block: behaves as inline flow-root."
    InlineBlock {
        /// True while the inline-block is laying out its own children.
        block_mode: bool,
    },
}

impl CursorKind {
    /// True when this cursor currently owns flow-root state rather than
    /// delegating to its host block.
    #[must_use]
    pub const fn is_flow_root(self) -> bool {
        matches!(
            self,
            Self::FlowRoot | Self::InlineBlock { block_mode: true }
        )
    }
}

/// Mutable per-flow-context layout state, one per active flow context per
/// reflow. No cursor survives past a single layout pass.
///
/// The geometric fields fall into two groups:
///
/// - **per-line accumulation** (`pen_x`, `line_height`, `baseline`, the
///   line lists, `active_floats`) — always answered from this cursor;
/// - **flow-root state** (`pen_y`, `max_x`, `going_leftwards`,
///   `largest_line_width`) — authoritative only when
///   [`CursorKind::is_flow_root`] holds; otherwise the fields are unused
///   and reads/writes delegate to [`LineCursor::host_block`].
///
/// `line_start` sits between the groups: every cursor carries its own copy
/// (an inline element's lines start at its own inline edge), and on a line
/// break an inline cursor refreshes it from its host block so float
/// reservations propagate inward.
#[derive(Debug, Clone)]
pub struct LineCursor {
    /// The cursor's flavor and, for inline-block, its current phase.
    pub kind: CursorKind,
    /// Lexical parent cursor; `None` only for the pass's root.
    pub parent: Option<CursorId>,
    /// The enclosing flow root this cursor delegates to; `None` only for
    /// the pass's root.
    pub host_block: Option<CursorId>,
    /// The box currently being generated for this flow context's element;
    /// replaced by the continuation fragment after each line break.
    pub current_box: Option<BoxId>,
    /// Fragment chain of the element this cursor lays out, when it is an
    /// inline element that may split across lines.
    pub fragments: Option<FragmentChain>,

    /// Current x location of the pen, in pixels from the containing box's
    /// left edge.
    pub pen_x: f32,
    /// The x position lines begin at. Grows while floats reserve space on
    /// the line-start side and shrinks back as they clear.
    pub line_start: f32,
    /// Height of the line being accumulated: the tallest effective height
    /// seen since the last break.
    ///
    /// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    pub line_height: f32,
    /// Position of the text baseline within the current line, maintained by
    /// the text subsystem as it measures runs; reset on every break.
    pub baseline: f32,

    /// First box accumulated on the current line.
    pub first_on_line: Option<BoxId>,
    /// Last box accumulated on the current line (O(1) append).
    pub last_on_line: Option<BoxId>,
    /// First out-of-flow box queued alongside the current line.
    pub first_out_of_flow: Option<BoxId>,
    /// Last out-of-flow box queued alongside the current line.
    pub last_out_of_flow: Option<BoxId>,
    /// First line-start box of this flow context (one per completed line),
    /// kept for later alignment sweeps.
    pub first_line_start: Option<BoxId>,
    /// Most recent line-start box.
    pub last_line_start: Option<BoxId>,
    /// Floats whose reserved horizontal space is still in effect.
    ///
    /// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
    pub active_floats: Vec<BoxId>,

    /// Authoritative pen y (flow roots only).
    pub pen_y: f32,
    /// The x value lines must not exceed (flow roots only). Shrinks while
    /// floats reserve space on the max-extent side.
    pub max_x: f32,
    /// True when the pen advances leftwards (`direction: rtl`; flow roots
    /// only).
    pub going_leftwards: bool,
    /// Widest completed line so far, the shrink-to-fit width input (flow
    /// roots only).
    ///
    /// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
    /// "...the shrink-to-fit width is: min(max(preferred minimum width,
    /// available width), preferred width)."
    pub largest_line_width: f32,

    /// Local `font-size` override; unset means the host block's value
    /// applies.
    pub font_size: Option<f32>,
    /// Local used `line-height` override; unset means the host block's
    /// value applies.
    pub css_line_height: Option<f32>,
    /// Local font face override; unset means the host block's face applies.
    pub font_face: Option<FontFaceId>,
}

impl LineCursor {
    /// A zeroed cursor of the given kind; callers fill in the geometric
    /// seed state (pen, line start, max extent) for their flow context.
    #[must_use]
    pub fn new(
        kind: CursorKind,
        parent: Option<CursorId>,
        host_block: Option<CursorId>,
        current_box: Option<BoxId>,
    ) -> Self {
        Self {
            kind,
            parent,
            host_block,
            current_box,
            fragments: None,
            pen_x: 0.0,
            line_start: 0.0,
            line_height: 0.0,
            baseline: 0.0,
            first_on_line: None,
            last_on_line: None,
            first_out_of_flow: None,
            last_out_of_flow: None,
            first_line_start: None,
            last_line_start: None,
            active_floats: Vec::new(),
            pen_y: 0.0,
            max_x: 0.0,
            going_leftwards: false,
            largest_line_width: 0.0,
            font_size: None,
            css_line_height: None,
            font_face: None,
        }
    }
}
