//! SourceDrop application icon generator.
//!
//! Produces a procedural icon: a rounded tray (the drop zone) with a
//! downward arrow falling into it. Rendered at any resolution as RGBA
//! pixels for the window icon.

/// Generate a SourceDrop icon as egui `IconData`.
pub fn generate_icon(size: u32) -> egui::IconData {
    let rgba = render_icon(size);
    egui::IconData {
        rgba,
        width: size,
        height: size,
    }
}

/// Render the icon into an RGBA pixel buffer (top-to-bottom row order).
pub fn render_icon(size: u32) -> Vec<u8> {
    let s = size as f32;
    let mut pixels = vec![0u8; (size * size * 4) as usize];

    // ── Layout ──────────────────────────────────────────────────
    let tray_left = s * 0.12;
    let tray_right = s * 0.88;
    let tray_top = s * 0.52;
    let tray_bottom = s * 0.90;
    let tray_radius = s * 0.10;
    let tray_wall = s * 0.06;

    let arrow_x = s * 0.5;
    let shaft_top = s * 0.08;
    let shaft_bottom = s * 0.50;
    let shaft_half_w = s * 0.065;
    let head_top = s * 0.38;
    let head_tip = s * 0.66;
    let head_half_w = s * 0.20;

    let tray_color = [0x89, 0xb4, 0xfa];
    let arrow_color = [0xf9, 0xe2, 0xaf];

    for y in 0..size {
        for x in 0..size {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;

            let mut cr: u8 = 0;
            let mut cg: u8 = 0;
            let mut cb: u8 = 0;
            let mut ca: f32 = 0.0;

            // 1. Tray: an open-topped rounded box outline. ────────
            let outer = rounded_rect_dist(px, py, tray_left, tray_top, tray_right, tray_bottom, tray_radius);
            let inner = rounded_rect_dist(
                px,
                py,
                tray_left + tray_wall,
                tray_top - s,
                tray_right - tray_wall,
                tray_bottom - tray_wall,
                (tray_radius - tray_wall).max(0.0),
            );
            let tray_alpha = smooth_edge(outer, 0.0) * smooth_edge_inv(inner, 0.0);
            if tray_alpha > 0.0 {
                // Darker toward the bottom.
                let shade = 1.0 - 0.25 * ((py - tray_top) / (tray_bottom - tray_top)).clamp(0.0, 1.0);
                cr = lerp_c(cr, (tray_color[0] as f32 * shade) as u8, tray_alpha);
                cg = lerp_c(cg, (tray_color[1] as f32 * shade) as u8, tray_alpha);
                cb = lerp_c(cb, (tray_color[2] as f32 * shade) as u8, tray_alpha);
                ca = ca + (1.0 - ca) * tray_alpha;
            }

            // 2. Arrow shaft. ──────────────────────────────────────
            let shaft_d = point_to_seg_dist(px, py, arrow_x, shaft_top, arrow_x, shaft_bottom);
            let mut arrow_alpha = smooth_edge(shaft_d, shaft_half_w);

            // 3. Arrow head: a downward triangle. ──────────────────
            if py >= head_top - 1.0 && py <= head_tip + 1.0 {
                let t = ((py - head_top) / (head_tip - head_top)).clamp(0.0, 1.0);
                let half = head_half_w * (1.0 - t);
                let head_alpha =
                    smooth_edge((px - arrow_x).abs(), half) * smooth_edge(py, head_tip) * smooth_edge_inv(py, head_top);
                arrow_alpha = arrow_alpha.max(head_alpha);
            }

            if arrow_alpha > 0.0 {
                cr = lerp_c(cr, arrow_color[0], arrow_alpha);
                cg = lerp_c(cg, arrow_color[1], arrow_alpha);
                cb = lerp_c(cb, arrow_color[2], arrow_alpha);
                ca = ca + (1.0 - ca) * arrow_alpha;
            }

            let idx = ((y * size + x) * 4) as usize;
            pixels[idx] = cr;
            pixels[idx + 1] = cg;
            pixels[idx + 2] = cb;
            pixels[idx + 3] = (ca * 255.0).clamp(0.0, 255.0) as u8;
        }
    }

    pixels
}

// ── Helpers ─────────────────────────────────────────────────────

/// Signed distance from a point to a rounded rectangle (negative inside).
fn rounded_rect_dist(px: f32, py: f32, left: f32, top: f32, right: f32, bottom: f32, r: f32) -> f32 {
    let cx = (left + right) * 0.5;
    let cy = (top + bottom) * 0.5;
    let hx = (right - left) * 0.5 - r;
    let hy = (bottom - top) * 0.5 - r;
    let qx = (px - cx).abs() - hx;
    let qy = (py - cy).abs() - hy;
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    outside + qx.max(qy).min(0.0) - r
}

/// Smooth anti-aliased edge (1 → 0 as `dist` crosses `edge`).
fn smooth_edge(dist: f32, edge: f32) -> f32 {
    (0.5 - (dist - edge) * 0.5).clamp(0.0, 1.0)
}

/// Inverted smooth edge (0 → 1 as `dist` crosses `edge` going up).
fn smooth_edge_inv(dist: f32, edge: f32) -> f32 {
    1.0 - smooth_edge(dist, edge)
}

/// Perpendicular distance from a point to a line segment.
fn point_to_seg_dist(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let abx = bx - ax;
    let aby = by - ay;
    let len_sq = abx * abx + aby * aby;
    if len_sq < 0.0001 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    let t = (((px - ax) * abx + (py - ay) * aby) / len_sq).clamp(0.0, 1.0);
    ((px - (ax + t * abx)).powi(2) + (py - (ay + t * aby)).powi(2)).sqrt()
}

/// Linear interpolation for a single colour channel.
fn lerp_c(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 * (1.0 - t) + b as f32 * t).clamp(0.0, 255.0) as u8
}
