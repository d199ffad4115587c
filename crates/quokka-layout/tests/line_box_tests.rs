//! End-to-end line construction tests: wrapping, alignment, floats, and
//! direction handling through the public `Reflow` API.

use quokka_layout::{
    BoxArena, BoxId, Direction, DisplayValue, FloatMode, LayoutBox, PositionMode, Reflow,
};

/// An inline-level box with pre-measured content, like a shaped word.
fn word(arena: &mut BoxArena, width: f32, height: f32) -> BoxId {
    let mut b = LayoutBox::new(DisplayValue::inline());
    b.width = width;
    b.height = height;
    b.inner_width = width;
    b.inner_height = height;
    arena.push(b)
}

fn float_box(arena: &mut BoxArena, mode: FloatMode, width: f32, height: f32) -> BoxId {
    let mut b = LayoutBox::new(DisplayValue::block());
    b.width = width;
    b.height = height;
    b.float = mode;
    arena.push(b)
}

fn assert_px(actual: f32, expected: f32, what: &str) {
    assert!(
        (actual - expected).abs() < 0.01,
        "{what}: expected {expected}px, got {actual}px"
    );
}

#[test]
fn words_accumulate_left_to_right() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let a = word(&mut arena, 80.0, 16.0);
    let b = word(&mut arena, 60.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 200.0, Direction::Ltr)
        .unwrap();
    reflow.place(flow, a);
    reflow.place(flow, b);
    let metrics = reflow.finish_flow_root(flow);
    drop(reflow);

    assert_px(arena[a].parent_offset_left, 0.0, "first word x");
    assert_px(arena[b].parent_offset_left, 80.0, "second word x");
    assert_px(arena[a].parent_offset_top, 0.0, "first word y");
    assert_px(metrics.content_height, 16.0, "flow height");
    assert_px(metrics.max_line_width, 140.0, "widest line");
    assert_eq!(arena[a].next_on_line, Some(b));
}

#[test]
fn line_breaks_when_a_word_does_not_fit() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let a = word(&mut arena, 80.0, 16.0);
    let b = word(&mut arena, 80.0, 16.0);
    let c = word(&mut arena, 80.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 200.0, Direction::Ltr)
        .unwrap();
    reflow.place(flow, a);
    reflow.place(flow, b);
    reflow.place(flow, c);
    let metrics = reflow.finish_flow_root(flow);
    drop(reflow);

    // Two words share the first line; the third starts a fresh one.
    assert_px(arena[a].parent_offset_left, 0.0, "first word x");
    assert_px(arena[b].parent_offset_left, 80.0, "second word x");
    assert_px(arena[c].parent_offset_left, 0.0, "wrapped word x");
    assert_px(arena[c].parent_offset_top, 16.0, "wrapped word y");
    assert_px(metrics.content_height, 32.0, "two lines of 16px");
    assert_px(metrics.max_line_width, 160.0, "widest line");

    // The line-start list records one entry per line, and the completed
    // line's chain was detached from the wrapped word.
    assert_eq!(arena[a].next_line_start, Some(c));
    assert_eq!(arena[c].next_on_line, None);
    assert_eq!(arena[b].next_on_line, None);
}

#[test]
fn shorter_boxes_sink_to_the_line_bottom() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let tall = word(&mut arena, 40.0, 30.0);
    let short = word(&mut arena, 20.0, 10.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 200.0, Direction::Ltr)
        .unwrap();
    reflow.place(flow, tall);
    reflow.place(flow, short);
    let _ = reflow.finish_flow_root(flow);
    drop(reflow);

    assert_px(arena[tall].parent_offset_top, 0.0, "tall box y");
    assert_px(arena[short].parent_offset_top, 20.0, "short box sinks");
}

#[test]
fn inline_alignment_ignores_bottom_border_and_padding() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let tall = word(&mut arena, 40.0, 30.0);
    let short = {
        let mut b = LayoutBox::new(DisplayValue::inline());
        b.width = 20.0;
        b.height = 10.0;
        b.inner_height = 6.0;
        b.margin.bottom = 2.0;
        b.border.bottom = 1.0;
        b.padding.bottom = 3.0;
        arena.push(b)
    };

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 200.0, Direction::Ltr)
        .unwrap();
    reflow.place(flow, tall);
    reflow.place(flow, short);
    let _ = reflow.finish_flow_root(flow);
    drop(reflow);

    // used extent = height + margin.bottom - border.bottom - padding.bottom
    //             = 10 + 2 - 1 - 3 = 8, so the box sits at 30 - 8 = 22.
    assert_px(arena[short].parent_offset_top, 22.0, "inline box y");
}

#[test]
fn block_participants_align_by_their_margin_box() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let block = {
        let mut b = LayoutBox::new(DisplayValue::block());
        b.width = 40.0;
        b.height = 20.0;
        b.margin.bottom = 5.0;
        arena.push(b)
    };

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 200.0, Direction::Ltr)
        .unwrap();
    reflow.place(flow, block);
    let metrics = reflow.finish_flow_root(flow);
    drop(reflow);

    // The margin box sets the line height, and the bottom margin rests on
    // the line's bottom edge.
    assert_px(metrics.content_height, 25.0, "line height");
    assert_px(arena[block].parent_offset_top, 0.0, "block y");
}

#[test]
fn left_float_reserves_space_and_shifts_earlier_content() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let a = word(&mut arena, 50.0, 16.0);
    let f = float_box(&mut arena, FloatMode::Left, 30.0, 40.0);
    let b = word(&mut arena, 50.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 200.0, Direction::Ltr)
        .unwrap();
    reflow.place(flow, a);
    reflow.place(flow, f);
    reflow.place(flow, b);

    // The float sits at the old line start and content already on the
    // line moved past it.
    assert_px(reflow.boxes()[f].parent_offset_left, 0.0, "float x");
    assert_px(reflow.boxes()[a].parent_offset_left, 30.0, "shifted word x");
    assert_px(reflow.cursor(flow).line_start, 30.0, "reserved line start");
    assert_eq!(reflow.cursor(flow).active_floats, vec![f]);

    // Later content starts after both the float and the first word.
    assert_px(reflow.boxes()[b].parent_offset_left, 80.0, "later word x");
}

#[test]
fn right_float_shrinks_the_line_from_the_far_edge() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let f = float_box(&mut arena, FloatMode::Right, 30.0, 40.0);
    let a = word(&mut arena, 50.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 200.0, Direction::Ltr)
        .unwrap();
    reflow.place(flow, f);
    reflow.place(flow, a);

    assert_px(reflow.boxes()[f].parent_offset_left, 170.0, "float x");
    assert_px(reflow.max_x(flow), 170.0, "shrunk max extent");
    assert_px(reflow.boxes()[a].parent_offset_left, 0.0, "word x");
}

#[test]
fn floats_release_their_space_once_the_pen_passes_them() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let f = float_box(&mut arena, FloatMode::Left, 30.0, 20.0);
    let a = word(&mut arena, 60.0, 16.0);
    let b = word(&mut arena, 60.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 100.0, Direction::Ltr)
        .unwrap();
    reflow.place(flow, f);
    reflow.place(flow, a);
    // Forces a break; the pen lands at y=16, still beside the 20px float.
    reflow.place(flow, b);
    assert_px(reflow.cursor(flow).line_start, 30.0, "float still active");
    assert_px(reflow.boxes()[b].parent_offset_left, 30.0, "second line x");

    // Finishing the second line moves the pen to y=32, past the float:
    // the reservation is undone exactly.
    let metrics = reflow.finish_flow_root(flow);
    assert_px(reflow.cursor(flow).line_start, 0.0, "line start restored");
    assert!(reflow.cursor(flow).active_floats.is_empty());
    assert_px(metrics.content_height, 32.0, "flow height");
    drop(reflow);

    assert_px(arena[b].parent_offset_top, 16.0, "second line y");
}

#[test]
fn rtl_offsets_mirror_about_the_line_start() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let a = word(&mut arena, 80.0, 16.0);
    let b = word(&mut arena, 60.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 200.0, Direction::Rtl)
        .unwrap();
    reflow.place(flow, a);
    reflow.place(flow, b);
    let metrics = reflow.finish_flow_root(flow);
    drop(reflow);

    // The first word hugs the right edge, the second continues leftwards.
    assert_px(arena[a].parent_offset_left, 120.0, "first word x");
    assert_px(arena[b].parent_offset_left, 60.0, "second word x");
    assert_px(metrics.max_line_width, 140.0, "widest line");
}

#[test]
fn ltr_and_rtl_lines_are_symmetric() {
    let widths = [70.0_f32, 40.0, 55.0];
    let available = 300.0;

    let mut run = |direction: Direction| -> Vec<(f32, f32)> {
        let mut arena = BoxArena::new();
        let root = arena.push(LayoutBox::new(DisplayValue::block()));
        let ids: Vec<BoxId> = widths.iter().map(|&w| word(&mut arena, w, 16.0)).collect();
        let mut reflow = Reflow::new(&mut arena);
        let flow = reflow.open_flow_root(root, available, direction).unwrap();
        for &id in &ids {
            reflow.place(flow, id);
        }
        let _ = reflow.finish_flow_root(flow);
        drop(reflow);
        ids.iter()
            .map(|&id| (arena[id].parent_offset_left, arena[id].width))
            .collect()
    };

    let ltr = run(Direction::Ltr);
    let rtl = run(Direction::Rtl);

    // Reflecting each RTL box about the midline reproduces the LTR box.
    for (&(ltr_x, w), &(rtl_x, _)) in ltr.iter().zip(rtl.iter()) {
        let mirrored = available - (rtl_x + w);
        assert_px(mirrored, ltr_x, "mirrored x");
    }
}

#[test]
fn rtl_lines_wrap_leftwards() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let a = word(&mut arena, 60.0, 16.0);
    let b = word(&mut arena, 60.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 100.0, Direction::Rtl)
        .unwrap();
    reflow.place(flow, a);
    reflow.place(flow, b);
    let metrics = reflow.finish_flow_root(flow);
    drop(reflow);

    assert_px(arena[a].parent_offset_left, 40.0, "first word x");
    assert_px(arena[a].parent_offset_top, 0.0, "first word y");
    assert_px(arena[b].parent_offset_left, 40.0, "wrapped word x");
    assert_px(arena[b].parent_offset_top, 16.0, "wrapped word y");
    assert_px(metrics.content_height, 32.0, "flow height");
}

#[test]
fn oversized_content_overflows_predictably() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let f = float_box(&mut arena, FloatMode::Left, 30.0, 40.0);
    let a = word(&mut arena, 90.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 100.0, Direction::Ltr)
        .unwrap();
    reflow.place(flow, f);
    // 90px never fits beside a 30px float in 100px; the word is placed at
    // the pen anyway rather than looping on empty lines.
    reflow.place(flow, a);

    assert_px(reflow.boxes()[a].parent_offset_left, 30.0, "overflowing x");
    assert_px(reflow.cursor(flow).pen_x, 120.0, "pen past the extent");
}

#[test]
fn out_of_flow_boxes_ride_along_without_advancing_the_pen() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let a = word(&mut arena, 80.0, 16.0);
    let abs_inline = {
        let mut b = LayoutBox::new(DisplayValue::inline());
        b.width = 50.0;
        b.height = 10.0;
        b.position = PositionMode::Absolute;
        arena.push(b)
    };
    let abs_block = {
        let mut b = LayoutBox::new(DisplayValue::block());
        b.width = 50.0;
        b.height = 10.0;
        b.position = PositionMode::Absolute;
        arena.push(b)
    };
    let b = word(&mut arena, 40.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 300.0, Direction::Ltr)
        .unwrap();
    reflow.place(flow, a);
    reflow.place(flow, abs_inline);
    reflow.place(flow, abs_block);
    reflow.place(flow, b);
    let metrics = reflow.finish_flow_root(flow);
    drop(reflow);

    // The in-flow word after the absolute boxes is unaffected by them.
    assert_px(arena[b].parent_offset_left, 80.0, "in-flow word x");
    assert_px(metrics.max_line_width, 120.0, "line width skips abs boxes");

    // Both absolute boxes rest on the line's bottom edge; the block-level
    // one additionally snaps back to the line start.
    assert_px(arena[abs_inline].parent_offset_top, 16.0, "abs inline y");
    assert_px(arena[abs_inline].parent_offset_left, 80.0, "abs inline x");
    assert_px(arena[abs_block].parent_offset_top, 16.0, "abs block y");
    assert_px(arena[abs_block].parent_offset_left, 0.0, "abs block x");
}

#[test]
fn wrapped_inline_elements_leave_a_fragment_chain() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let elem = {
        let mut b = LayoutBox::new(DisplayValue::inline());
        b.margin.left = 2.0;
        b.padding.left = 5.0;
        arena.push(b)
    };
    let a = word(&mut arena, 120.0, 16.0);
    let b = word(&mut arena, 120.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 200.0, Direction::Ltr)
        .unwrap();
    let span = reflow.open_inline(flow, elem);
    reflow.place(span, a);
    reflow.place(span, b);
    reflow.close_inline(span);
    let _ = reflow.finish_flow_root(flow);
    drop(reflow);

    // The element generated one continuation fragment for the second line.
    let chain = arena.fragment_chain(elem);
    assert_eq!(chain.len(), 2, "one break, two fragments");
    let frag = chain[1];

    // The first word bridged the flow back into the box tree, and the
    // first fragment sized itself from its pen extent plus its own left
    // padding.
    assert_eq!(arena[root].first_child, Some(a));
    assert_px(arena[elem].parent_offset_left, 2.0, "first fragment x");
    assert_px(arena[elem].width, 125.0, "first fragment width");

    // The continuation starts the new line with its start margin removed.
    assert_px(arena[frag].margin.left, 0.0, "no start margin on continuation");
    assert_px(arena[frag].parent_offset_left, 0.0, "continuation x");
    assert_px(arena[frag].parent_offset_top, 16.0, "continuation y");
    assert_px(arena[b].parent_offset_top, 16.0, "second word line");
}

#[test]
fn deeply_nested_inlines_fragment_together() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let outer = arena.push(LayoutBox::new(DisplayValue::inline()));
    let inner = arena.push(LayoutBox::new(DisplayValue::inline()));
    let a = word(&mut arena, 150.0, 16.0);
    let b = word(&mut arena, 150.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 200.0, Direction::Ltr)
        .unwrap();
    let outer_span = reflow.open_inline(flow, outer);
    let inner_span = reflow.open_inline(outer_span, inner);
    reflow.place(inner_span, a);
    reflow.place(inner_span, b);
    reflow.close_inline(inner_span);
    reflow.close_inline(outer_span);
    let _ = reflow.finish_flow_root(flow);
    drop(reflow);

    // Both open elements fragmented at the break, and the innermost flow
    // bridged its first word to the enclosing element's box.
    assert_eq!(arena.fragment_chain(outer).len(), 2);
    assert_eq!(arena.fragment_chain(inner).len(), 2);
    assert_eq!(arena[outer].first_child, Some(a));
    assert_px(arena[b].parent_offset_top, 16.0, "wrapped word line");
}

#[test]
fn inline_block_lays_out_privately_then_joins_the_line() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let before = word(&mut arena, 30.0, 16.0);
    let ib = arena.push(LayoutBox::new(DisplayValue::inline_block()));
    let a = word(&mut arena, 40.0, 16.0);
    let b = word(&mut arena, 50.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 300.0, Direction::Ltr)
        .unwrap();
    reflow.place(flow, before);
    let nested = reflow.open_inline_block(flow, ib);
    reflow.place(nested, a);
    reflow.place(nested, b);
    reflow.close_inline_block(nested);
    let metrics = reflow.finish_flow_root(flow);
    drop(reflow);

    // The inline-block shrank to fit its single inner line and joined the
    // outer line after the first word.
    assert_px(arena[ib].width, 90.0, "shrink-to-fit width");
    assert_px(arena[ib].height, 16.0, "inner content height");
    assert_px(arena[ib].parent_offset_left, 30.0, "inline-block x");

    // Its children are positioned in its own coordinate space.
    assert_px(arena[a].parent_offset_left, 0.0, "inner word x");
    assert_px(arena[b].parent_offset_left, 40.0, "inner word x");
    assert_px(metrics.content_height, 16.0, "one outer line");
}

#[test]
fn fixed_width_inline_block_wraps_its_own_content() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let ib = {
        let mut b = LayoutBox::new(DisplayValue::inline_block());
        b.inner_width = 60.0;
        arena.push(b)
    };
    let a = word(&mut arena, 40.0, 16.0);
    let b = word(&mut arena, 40.0, 16.0);

    let mut reflow = Reflow::new(&mut arena);
    let flow = reflow
        .open_flow_root(root, 300.0, Direction::Ltr)
        .unwrap();
    let nested = reflow.open_inline_block(flow, ib);
    reflow.place(nested, a);
    reflow.place(nested, b);
    reflow.close_inline_block(nested);
    let _ = reflow.finish_flow_root(flow);
    drop(reflow);

    // The inner flow wrapped at the fixed 60px width; the break stayed
    // private and never fragmented anything outside.
    assert_px(arena[ib].width, 60.0, "fixed width kept");
    assert_px(arena[ib].height, 32.0, "two inner lines");
    assert_px(arena[a].parent_offset_top, 0.0, "first inner line");
    assert_px(arena[b].parent_offset_top, 16.0, "second inner line");
    assert_px(arena[b].parent_offset_left, 0.0, "wrapped inner word x");
    assert_eq!(arena.fragment_chain(ib).len(), 1, "inline-block is atomic");
}

#[test]
fn non_finite_inputs_are_rejected_at_the_boundary() {
    let mut arena = BoxArena::new();
    let root = arena.push(LayoutBox::new(DisplayValue::block()));
    let broken = {
        let mut b = LayoutBox::new(DisplayValue::block());
        b.width = f32::NAN;
        arena.push(b)
    };

    let mut reflow = Reflow::new(&mut arena);
    assert!(
        reflow
            .open_flow_root(root, f32::INFINITY, Direction::Ltr)
            .is_err()
    );
    assert!(reflow.open_flow_root(broken, 200.0, Direction::Ltr).is_err());
    assert!(reflow.open_flow_root(root, 200.0, Direction::Ltr).is_ok());
}
