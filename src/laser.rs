use std::time::Duration;

use crate::Instant;
use crate::drawing::{Color, with_alpha};
use crate::geometry::Mesh;

const DOT_RADIUS: f32 = 4.0;
const GLOW_SPREAD: f32 = 2.0;
const GLOW_BLUR: f32 = 10.0;

/// Opacity of the pointer `elapsed` into its animation.
pub fn laser_opacity(elapsed: Duration) -> f32 {
    0.6 + (elapsed.as_secs_f32() * 1000.0 / 200.0).sin() * 0.4
}

/// Cursor-following dot shown under the laser tool. Never part of the history.
#[derive(Debug)]
pub struct LaserPointer {
    pub position: [f32; 2],
    pub visible: bool,
    pub color: Color,
    animation: Option<Instant>,
}

impl LaserPointer {
    pub fn new(color: Color) -> Self {
        Self {
            position: [0.0, 0.0],
            visible: false,
            color,
            animation: None,
        }
    }

    pub fn track(&mut self, position: [f32; 2]) {
        self.position = position;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Starts or cancels the animation to match whether the dot should be on screen.
    pub fn sync(&mut self, laser_active: bool) {
        match (laser_active && self.visible, self.animation.is_some()) {
            (true, false) => {
                log::debug!("laser animation started");
                self.animation = Some(Instant::now());
            }
            (false, true) => self.cancel(),
            _ => {}
        }
    }

    pub fn cancel(&mut self) {
        if self.animation.take().is_some() {
            log::debug!("laser animation cancelled");
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn opacity(&self) -> Option<f32> {
        self.animation.map(|start| laser_opacity(start.elapsed()))
    }

    pub fn draw(&self, mesh: &mut Mesh) {
        let Some(opacity) = self.opacity() else {
            return;
        };
        let color = with_alpha(self.color, opacity);
        let spread = DOT_RADIUS + GLOW_SPREAD;
        mesh.disc(self.position, spread, 0.0, with_alpha(color, 0.6));
        mesh.glow(self.position, spread, spread + GLOW_BLUR, 0.0, with_alpha(color, 0.6));
        mesh.disc(self.position, DOT_RADIUS, 0.0, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_stays_in_band() {
        for ms in (0..2000).step_by(7) {
            let o = laser_opacity(Duration::from_millis(ms));
            assert!((0.2 - 0.0001..=1.0 + 0.0001).contains(&o), "{o} at {ms}ms");
        }
        assert!((laser_opacity(Duration::ZERO) - 0.6).abs() < 0.0001);
        let peak = laser_opacity(Duration::from_secs_f32(std::f32::consts::FRAC_PI_2 * 0.2));
        assert!((peak - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_animation_runs_only_while_visible_under_laser() {
        let mut laser = LaserPointer::new([1.0, 0.0, 0.0, 1.0]);
        laser.sync(true);
        assert!(!laser.is_animating());

        laser.track([10.0, 20.0]);
        laser.sync(true);
        assert!(laser.is_animating());

        laser.sync(false);
        assert!(!laser.is_animating());

        laser.sync(true);
        laser.hide();
        laser.sync(true);
        assert!(!laser.is_animating());
    }

    #[test]
    fn test_draws_nothing_when_cancelled() {
        let mut laser = LaserPointer::new([1.0, 0.0, 0.0, 1.0]);
        laser.track([10.0, 20.0]);
        let mut mesh = Mesh::new();
        laser.draw(&mut mesh);
        assert!(mesh.is_empty());

        laser.sync(true);
        laser.draw(&mut mesh);
        assert!(!mesh.is_empty());
        laser.cancel();
        assert!(laser.opacity().is_none());
    }
}
