//! Inline and block line-box construction for the Quokka renderer.
//!
//! This crate turns a stream of styled boxes into positioned lines:
//!
//! 1. the styling subsystem fills a [`BoxArena`] with [`LayoutBox`]
//!    records carrying resolved style and (for text and replaced content)
//!    pre-measured sizes;
//! 2. a [`Reflow`] pass walks the document, opening a flow context per
//!    block container, inline element, and inline-block, and feeds each
//!    box through [`Reflow::place`];
//! 3. boxes come out with their offsets relative to their containing box
//!    and, where an element wrapped, chained into per-element fragment
//!    lists.
//!
//! The model follows the CSS 2.1 visual formatting model
//! ([§ 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html))
//! with display semantics from
//! [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/).
//!
//! # Example
//!
//! ```
//! use quokka_layout::{BoxArena, Direction, DisplayValue, LayoutBox, Reflow};
//!
//! let mut arena = BoxArena::new();
//! let root = arena.push(LayoutBox::new(DisplayValue::block()));
//! let mut word = LayoutBox::new(DisplayValue::inline());
//! word.width = 80.0;
//! word.height = 16.0;
//! word.inner_height = 16.0;
//! let word = arena.push(word);
//!
//! let mut reflow = Reflow::new(&mut arena);
//! let flow = reflow.open_flow_root(root, 200.0, Direction::Ltr)?;
//! reflow.place(flow, word);
//! let metrics = reflow.finish_flow_root(flow);
//! assert!((metrics.max_line_width - 80.0).abs() < 0.01);
//! # Ok::<(), quokka_layout::LayoutError>(())
//! ```

pub mod box_model;
pub mod cursor;
pub mod layout_box;
pub mod line;
pub mod reflow;
pub mod style;

pub use box_model::{EdgeSizes, Rect};
pub use cursor::{CursorId, CursorKind, LineCursor};
pub use layout_box::{BoxArena, BoxId, FragmentChain, LayoutBox};
pub use reflow::{FlowMetrics, LayoutError, Reflow};
pub use style::{
    DEFAULT_FONT_SIZE_PX, Direction, DisplayValue, FloatMode, FontFaceId, InnerDisplayType,
    NORMAL_LINE_HEIGHT_RATIO, OuterDisplayType, PositionMode,
};
