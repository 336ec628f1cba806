use eframe::egui::{Pos2, Rect, Vec2};

pub(in crate::app) const MIN_ZOOM: f32 = 0.1;
pub(in crate::app) const MAX_ZOOM: f32 = 4.0;
pub(in crate::app) const FLY_TO_ZOOM: f32 = 1.5;
pub(in crate::app) const FLY_TO_SECONDS: f32 = 0.75;

struct Flight {
    from_pan: Vec2,
    from_zoom: f32,
    to_pan: Vec2,
    to_zoom: f32,
    elapsed: f32,
    duration: f32,
}

/// Pan/zoom transform over the graph canvas. World coordinates are
/// centered on the canvas midpoint; the camera is the only writer of the
/// transform, via user gestures or an animated flight.
pub(in crate::app) struct Camera {
    pan: Vec2,
    zoom: f32,
    flight: Option<Flight>,
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

impl Camera {
    pub(in crate::app) fn new() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            flight: None,
        }
    }

    pub(in crate::app) fn zoom_level(&self) -> f32 {
        self.zoom
    }

    pub(in crate::app) fn pan(&self) -> Vec2 {
        self.pan
    }

    pub(in crate::app) fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub(in crate::app) fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }

    /// User pan. Takes effect immediately and abandons any flight.
    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        self.flight = None;
        self.pan += delta;
    }

    /// User zoom about a screen anchor: the world point under the pointer
    /// stays under the pointer. Zoom is clamped to [0.1, 4.0].
    pub(in crate::app) fn zoom_at(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        self.flight = None;
        let anchor = self.screen_to_world(rect, pointer);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - anchor * self.zoom;
    }

    /// Starts an eased flight to a transform that centers `world_target`
    /// at `target_zoom`.
    pub(in crate::app) fn fly_to(&mut self, world_target: Vec2, target_zoom: f32, duration: f32) {
        let to_zoom = target_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.flight = Some(Flight {
            from_pan: self.pan,
            from_zoom: self.zoom,
            to_pan: -world_target * to_zoom,
            to_zoom,
            elapsed: 0.0,
            duration: duration.max(f32::EPSILON),
        });
    }

    pub(in crate::app) fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Advances an active flight by `dt` seconds; lands exactly on the
    /// target transform. Returns true while the flight is animating.
    pub(in crate::app) fn tick(&mut self, dt: f32) -> bool {
        let Some(flight) = &mut self.flight else {
            return false;
        };

        flight.elapsed += dt.max(0.0);
        let t = (flight.elapsed / flight.duration).clamp(0.0, 1.0);
        let eased = ease_in_out_cubic(t);

        self.pan = flight.from_pan + (flight.to_pan - flight.from_pan) * eased;
        self.zoom = flight.from_zoom + (flight.to_zoom - flight.from_zoom) * eased;

        if t >= 1.0 {
            self.pan = flight.to_pan;
            self.zoom = flight.to_zoom;
            self.flight = None;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    fn canvas() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    #[test]
    fn zoom_is_clamped_under_extreme_gestures() {
        let rect = canvas();
        let mut camera = Camera::new();

        for _ in 0..50 {
            camera.zoom_at(rect, rect.center(), 10.0);
        }
        assert_eq!(camera.zoom_level(), MAX_ZOOM);

        for _ in 0..50 {
            camera.zoom_at(rect, rect.center(), 1.0e-6);
        }
        assert_eq!(camera.zoom_level(), MIN_ZOOM);
    }

    #[test]
    fn zoom_preserves_the_point_under_the_pointer() {
        let rect = canvas();
        let mut camera = Camera::new();
        camera.pan_by(vec2(37.0, -12.0));

        let pointer = pos2(250.0, 420.0);
        let before = camera.screen_to_world(rect, pointer);
        camera.zoom_at(rect, pointer, 1.4);
        let after = camera.screen_to_world(rect, pointer);

        assert!((before - after).length() < 1e-3);
    }

    #[test]
    fn projection_round_trips() {
        let rect = canvas();
        let mut camera = Camera::new();
        camera.pan_by(vec2(-80.0, 33.0));
        camera.zoom_at(rect, pos2(100.0, 100.0), 1.7);

        let world = vec2(123.0, -45.0);
        let roundtrip = camera.screen_to_world(rect, camera.world_to_screen(rect, world));
        assert!((world - roundtrip).length() < 1e-3);
    }

    #[test]
    fn flight_is_monotonic_and_lands_exactly_on_target() {
        let rect = canvas();
        let mut camera = Camera::new();
        let target = vec2(200.0, 150.0);
        camera.fly_to(target, FLY_TO_ZOOM, FLY_TO_SECONDS);

        let mut last_zoom = camera.zoom_level();
        let mut ticks = 0u32;
        while camera.tick(1.0 / 60.0) {
            assert!(camera.zoom_level() >= last_zoom - 1e-5, "zoom regressed mid-flight");
            last_zoom = camera.zoom_level();
            ticks += 1;
            assert!(ticks < 600, "flight never terminated");
        }

        assert!(!camera.is_flying());
        assert_eq!(camera.zoom_level(), FLY_TO_ZOOM);
        let centered = camera.world_to_screen(rect, target);
        assert!((centered - rect.center()).length() < 1e-3);
    }

    #[test]
    fn gestures_cancel_an_active_flight() {
        let rect = canvas();
        let mut camera = Camera::new();
        camera.fly_to(vec2(500.0, 500.0), 2.0, FLY_TO_SECONDS);
        assert!(camera.is_flying());

        camera.pan_by(vec2(5.0, 5.0));
        assert!(!camera.is_flying());

        camera.fly_to(vec2(500.0, 500.0), 2.0, FLY_TO_SECONDS);
        camera.zoom_at(rect, rect.center(), 1.1);
        assert!(!camera.is_flying());
    }

    #[test]
    fn zero_duration_flight_snaps_to_target() {
        let mut camera = Camera::new();
        camera.fly_to(vec2(10.0, 10.0), 0.5, 0.0);
        camera.tick(1.0 / 60.0);
        assert!(!camera.is_flying());
        assert_eq!(camera.zoom_level(), 0.5);
    }
}
