use crate::drawing::{Color, LineCap, Stroke, StrokeStyle, with_alpha};
use crate::geometry::Mesh;

/// Emits one path: segments with round joins, caps only at the two ends.
///
/// A single point produces no geometry, the same as stroking a path that
/// only has a `moveTo`.
pub fn tessellate_stroke(
    mesh: &mut Mesh,
    points: &[[f32; 2]],
    style: StrokeStyle,
    color: Color,
    depth: f32,
) {
    if points.len() < 2 {
        return;
    }
    let color = with_alpha(color, style.opacity);
    let radius = style.width * 0.5;
    let last = points.len() - 2;

    for (i, pair) in points.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        match style.cap {
            LineCap::Square if i == 0 || i == last => {
                segment_with_square_ends(mesh, a, b, style.width, i == 0, i == last, depth, color);
            }
            _ => mesh.line(a, b, style.width, 0.0, depth, color),
        }
    }

    let joins = &points[1..points.len() - 1];
    for &p in joins {
        mesh.disc(p, radius, depth, color);
    }
    if style.cap == LineCap::Round {
        mesh.disc(points[0], radius, depth, color);
        mesh.disc(points[points.len() - 1], radius, depth, color);
    }
}

#[allow(clippy::too_many_arguments)]
fn segment_with_square_ends(
    mesh: &mut Mesh,
    a: [f32; 2],
    b: [f32; 2],
    width: f32,
    cap_start: bool,
    cap_end: bool,
    depth: f32,
    color: Color,
) {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let len = (dx * dx + dy * dy).sqrt();
    if len <= 0.0 {
        return;
    }
    let half = width * 0.5;
    let (ux, uy) = (dx / len, dy / len);
    let a = if cap_start { [a[0] - ux * half, a[1] - uy * half] } else { a };
    let b = if cap_end { [b[0] + ux * half, b[1] + uy * half] } else { b };
    mesh.line(a, b, width, 0.0, depth, color);
}

/// In-progress stroke, rendered one independently capped segment at a time
/// while the pointer moves.
#[derive(Debug, Clone)]
pub struct LiveStroke {
    pub stroke: Stroke,
    pub mesh: Mesh,
}

impl LiveStroke {
    pub fn begin(stroke: Stroke) -> Self {
        Self {
            stroke,
            mesh: Mesh::new(),
        }
    }

    pub fn push(&mut self, point: [f32; 2]) {
        if let Some(&prev) = self.stroke.points.last() {
            tessellate_stroke(
                &mut self.mesh,
                &[prev, point],
                self.stroke.stroke_style(),
                self.stroke.color,
                0.0,
            );
        }
        self.stroke.points.push(point);
    }

    pub fn finish(self) -> Stroke {
        self.stroke
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::PenStyle;

    const RED: Color = [1.0, 0.0, 0.0, 1.0];

    fn x_extent(mesh: &Mesh) -> (f32, f32) {
        mesh.vertices.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
            (lo.min(v.position[0]), hi.max(v.position[0]))
        })
    }

    #[test]
    fn test_single_point_draws_nothing() {
        let mut mesh = Mesh::new();
        let style = PenStyle::Pencil.stroke_style(4.0, 0.3);
        tessellate_stroke(&mut mesh, &[[5.0, 5.0]], style, RED, 0.5);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_square_cap_extends_by_half_width() {
        let mut mesh = Mesh::new();
        let style = PenStyle::Highlighter.stroke_style(4.0, 0.3);
        tessellate_stroke(&mut mesh, &[[10.0, 0.0], [50.0, 0.0]], style, RED, 0.5);
        let (lo, hi) = x_extent(&mesh);
        assert!((lo - 6.0).abs() < 0.001);
        assert!((hi - 54.0).abs() < 0.001);
        assert!(mesh.vertices.iter().all(|v| (v.color[3] - 0.3).abs() < 0.001));
    }

    #[test]
    fn test_round_cap_and_joins_are_discs() {
        let mut mesh = Mesh::new();
        let style = PenStyle::Pencil.stroke_style(4.0, 0.3);
        let points = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]];
        tessellate_stroke(&mut mesh, &points, style, RED, 0.25);
        // two segment quads plus three discs (two caps, one join)
        let quad_vertices = 2 * 4;
        let disc_vertices = 3 * 17;
        assert_eq!(mesh.vertices.len(), quad_vertices + disc_vertices);
        assert!(mesh.vertices.iter().all(|v| v.depth == 0.25));
        let (lo, _) = x_extent(&mesh);
        assert!((lo + 2.0).abs() < 0.001);
    }

    #[test]
    fn test_live_stroke_caps_every_segment() {
        let mut live = LiveStroke::begin(Stroke {
            points: vec![[0.0, 0.0]],
            style: PenStyle::Highlighter,
            color: RED,
            width: 2.0,
            opacity: 0.3,
        });
        assert!(live.mesh.is_empty());
        live.push([10.0, 0.0]);
        live.push([20.0, 0.0]);
        assert_eq!(live.stroke.points.len(), 3);
        // each segment is its own capped quad
        assert_eq!(live.mesh.indices.len(), 12);
        let (lo, hi) = x_extent(&live.mesh);
        assert!((lo + 2.0).abs() < 0.001);
        assert!((hi - 22.0).abs() < 0.001);
        assert_eq!(live.finish().points, vec![[0.0, 0.0], [10.0, 0.0], [20.0, 0.0]]);
    }
}
