use web_sys::CanvasRenderingContext2d;

use pageboard_shared::{Composite, DrawCommand, Frame, Point, Rect};

use crate::images::ImageStore;
use crate::state::State;

const CURSOR_COLOR: &str = "rgba(26, 31, 42, 0.65)";
const GLYPH_COLOR: &str = "#fff";

pub fn redraw(state: &State) {
    let frame = state.controller.frame(&state.document);
    draw_frame(
        &state.ctx,
        &frame,
        &state.images,
        state.board_width,
        state.board_height,
    );
}

pub fn draw_frame(
    ctx: &CanvasRenderingContext2d,
    frame: &Frame,
    images: &ImageStore,
    width: f64,
    height: f64,
) {
    for command in &frame.commands {
        match command {
            DrawCommand::Clear => ctx.clear_rect(0.0, 0.0, width, height),
            DrawCommand::Image { source, rect } => {
                let Some(element) = images.element(*source) else {
                    log::debug!("no decoded pixels for source {source}");
                    continue;
                };
                let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    element,
                    rect.x as f64,
                    rect.y as f64,
                    rect.width as f64,
                    rect.height as f64,
                );
            }
            DrawCommand::LockBadge { rect, fill, glyph } => draw_lock_badge(ctx, rect, fill, glyph),
            DrawCommand::Path {
                points,
                color,
                width,
                composite,
            } => {
                let operation = match composite {
                    Composite::Paint => "source-over",
                    Composite::Subtract => "destination-out",
                };
                let _ = ctx.set_global_composite_operation(operation);
                draw_path(ctx, points, color, *width);
                let _ = ctx.set_global_composite_operation("source-over");
            }
            DrawCommand::EraserCursor { center, radius } => {
                ctx.set_stroke_style_str(CURSOR_COLOR);
                ctx.set_line_width(1.0);
                ctx.begin_path();
                let _ = ctx.arc(
                    center.x as f64,
                    center.y as f64,
                    *radius as f64,
                    0.0,
                    std::f64::consts::PI * 2.0,
                );
                ctx.stroke();
            }
        }
    }
}

fn draw_path(ctx: &CanvasRenderingContext2d, points: &[Point], color: &str, width: f32) {
    let Some(first) = points.first() else {
        return;
    };
    if points.len() == 1 {
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        let _ = ctx.arc(
            first.x as f64,
            first.y as f64,
            width as f64 / 2.0,
            0.0,
            std::f64::consts::PI * 2.0,
        );
        ctx.fill();
        return;
    }
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width as f64);
    ctx.begin_path();
    ctx.move_to(first.x as f64, first.y as f64);
    for point in &points[1..] {
        ctx.line_to(point.x as f64, point.y as f64);
    }
    ctx.stroke();
}

fn draw_lock_badge(ctx: &CanvasRenderingContext2d, rect: &Rect, fill: &str, glyph: &str) {
    let (x, y, size) = (rect.x as f64, rect.y as f64, rect.width as f64);
    ctx.set_fill_style_str(fill);
    ctx.fill_rect(x, y, size, rect.height as f64);
    ctx.set_fill_style_str(GLYPH_COLOR);
    ctx.set_font(&format!("{}px Arial", size - 4.0));
    let _ = ctx.fill_text(glyph, x + 2.0, y + size - 2.0);
}
