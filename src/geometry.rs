use crate::drawing::Color;
use crate::vertex::Vertex;

const DISC_SEGMENTS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Rect {
    pub fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    pub fn from_origin_size(origin: [f32; 2], size: [f32; 2]) -> Self {
        Self::new(origin, [origin[0] + size[0], origin[1] + size[1]])
    }

    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }

    pub fn center(&self) -> [f32; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }

    pub fn contains(&self, p: [f32; 2]) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }

    pub fn inflate(&self, by: f32) -> Rect {
        Rect::new(
            [self.min[0] - by, self.min[1] - by],
            [self.max[0] + by, self.max[1] + by],
        )
    }
}

/// Indexed triangle list in surface pixels.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    fn push_vertex(&mut self, position: [f32; 2], depth: f32, color: Color) -> u32 {
        self.vertices.push(Vertex {
            position,
            depth,
            color,
        });
        self.vertices.len() as u32 - 1
    }

    pub fn quad(&mut self, corners: [[f32; 2]; 4], depth: f32, color: Color) {
        let base = self.vertices.len() as u32;
        for corner in corners {
            self.push_vertex(corner, depth, color);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn fill_rect(&mut self, rect: Rect, depth: f32, color: Color) {
        self.quad(
            [
                rect.min,
                [rect.max[0], rect.min[1]],
                rect.max,
                [rect.min[0], rect.max[1]],
            ],
            depth,
            color,
        );
    }

    /// Outline centred on the rectangle's edges.
    pub fn stroke_rect(&mut self, rect: Rect, width: f32, depth: f32, color: Color) {
        let h = width * 0.5;
        let outer = rect.inflate(h);
        let inner = rect.inflate(-h);
        self.fill_rect(Rect::new(outer.min, [outer.max[0], inner.min[1]]), depth, color);
        self.fill_rect(Rect::new([outer.min[0], inner.max[1]], outer.max), depth, color);
        self.fill_rect(
            Rect::new([outer.min[0], inner.min[1]], [inner.min[0], inner.max[1]]),
            depth,
            color,
        );
        self.fill_rect(
            Rect::new([inner.max[0], inner.min[1]], [outer.max[0], inner.max[1]]),
            depth,
            color,
        );
    }

    /// Butt-ended line of the given width; `extend` lengthens both ends.
    pub fn line(
        &mut self,
        start: [f32; 2],
        end: [f32; 2],
        width: f32,
        extend: f32,
        depth: f32,
        color: Color,
    ) {
        let dx = end[0] - start[0];
        let dy = end[1] - start[1];
        let len = (dx * dx + dy * dy).sqrt();
        if len <= 0.0 {
            return;
        }
        let (ux, uy) = (dx / len, dy / len);
        let nx = -uy * width * 0.5;
        let ny = ux * width * 0.5;
        let a = [start[0] - ux * extend, start[1] - uy * extend];
        let b = [end[0] + ux * extend, end[1] + uy * extend];
        self.quad(
            [
                [a[0] - nx, a[1] - ny],
                [a[0] + nx, a[1] + ny],
                [b[0] + nx, b[1] + ny],
                [b[0] - nx, b[1] - ny],
            ],
            depth,
            color,
        );
    }

    pub fn disc(&mut self, center: [f32; 2], radius: f32, depth: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let hub = self.push_vertex(center, depth, color);
        for i in 0..DISC_SEGMENTS {
            let angle = i as f32 * std::f32::consts::TAU / DISC_SEGMENTS as f32;
            self.push_vertex(
                [
                    center[0] + angle.cos() * radius,
                    center[1] + angle.sin() * radius,
                ],
                depth,
                color,
            );
        }
        for i in 0..DISC_SEGMENTS {
            self.indices
                .extend_from_slice(&[hub, hub + 1 + i, hub + 1 + (i + 1) % DISC_SEGMENTS]);
        }
    }

    /// Annulus fading from `color` at `inner` to transparent at `outer`.
    pub fn glow(&mut self, center: [f32; 2], inner: f32, outer: f32, depth: f32, color: Color) {
        let base = self.vertices.len() as u32;
        let clear = [color[0], color[1], color[2], 0.0];
        for i in 0..DISC_SEGMENTS {
            let angle = i as f32 * std::f32::consts::TAU / DISC_SEGMENTS as f32;
            let (s, c) = angle.sin_cos();
            self.push_vertex([center[0] + c * inner, center[1] + s * inner], depth, color);
            self.push_vertex([center[0] + c * outer, center[1] + s * outer], depth, clear);
        }
        for i in 0..DISC_SEGMENTS {
            let j = (i + 1) % DISC_SEGMENTS;
            let (i0, o0, i1, o1) = (base + 2 * i, base + 2 * i + 1, base + 2 * j, base + 2 * j + 1);
            self.indices.extend_from_slice(&[i0, o0, o1, i0, o1, i1]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Color = [0.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_rect_contains_is_inclusive() {
        let rect = Rect::from_origin_size([10.0, 10.0], [20.0, 5.0]);
        assert!(rect.contains([10.0, 10.0]));
        assert!(rect.contains([30.0, 15.0]));
        assert!(!rect.contains([30.1, 15.0]));
        assert_eq!(rect.center(), [20.0, 12.5]);
    }

    #[test]
    fn test_zero_length_line_emits_nothing() {
        let mut mesh = Mesh::new();
        mesh.line([1.0, 1.0], [1.0, 1.0], 4.0, 2.0, 0.0, BLACK);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_extended_line_reaches_past_endpoints() {
        let mut mesh = Mesh::new();
        mesh.line([0.0, 0.0], [10.0, 0.0], 4.0, 2.0, 0.0, BLACK);
        let xs: Vec<f32> = mesh.vertices.iter().map(|v| v.position[0]).collect();
        let min = xs.iter().cloned().fold(f32::MAX, f32::min);
        let max = xs.iter().cloned().fold(f32::MIN, f32::max);
        assert!((min + 2.0).abs() < 0.001);
        assert!((max - 12.0).abs() < 0.001);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut a = Mesh::new();
        a.fill_rect(Rect::new([0.0, 0.0], [1.0, 1.0]), 0.0, BLACK);
        let b = a.clone();
        a.append(&b);
        assert_eq!(a.vertices.len(), 8);
        assert_eq!(&a.indices[6..], &[4, 5, 6, 4, 6, 7]);
    }
}
