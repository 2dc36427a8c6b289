use bevy::math::{Rect, Vec2};

/// Shrinks `viewport` by `margin` on every side.
///
/// An axis narrower than twice the margin collapses to its center.
pub fn scatter_area(viewport: Rect, margin: f32) -> Rect {
    let center = viewport.center();
    let half = (viewport.half_size() - Vec2::splat(margin)).max(Vec2::ZERO);
    Rect::from_center_half_size(center, half)
}

/// Uniformly random point inside `area`.
pub fn scatter_point(area: Rect, rng: &mut fastrand::Rng) -> Vec2 {
    Vec2::new(
        area.width().mul_add(rng.f32(), area.min.x),
        area.height().mul_add(rng.f32(), area.min.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_is_inset_by_margin() {
        let viewport = Rect::new(-4.0, -3.0, 4.0, 3.0);
        let area = scatter_area(viewport, 0.5);
        assert_eq!(area, Rect::new(-3.5, -2.5, 3.5, 2.5));
    }

    #[test]
    fn narrow_axis_collapses_to_center() {
        let viewport = Rect::new(0.0, 0.0, 10.0, 1.0);
        let area = scatter_area(viewport, 2.0);
        assert_eq!(area.min, Vec2::new(2.0, 0.5));
        assert_eq!(area.max, Vec2::new(8.0, 0.5));
    }

    #[test]
    fn points_stay_inside_area() {
        let area = Rect::new(-1.5, -0.75, 2.0, 1.25);
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            let point = scatter_point(area, &mut rng);
            assert!(area.contains(point), "{point} escaped {area:?}");
        }
    }

    #[test]
    fn same_seed_same_points() {
        let area = Rect::new(0.0, 0.0, 1.0, 1.0);
        let mut a = fastrand::Rng::with_seed(42);
        let mut b = fastrand::Rng::with_seed(42);
        for _ in 0..16 {
            assert_eq!(scatter_point(area, &mut a), scatter_point(area, &mut b));
        }
    }
}
