use pattern_capture::{intersect_layer_with_mask, intersect_polygons, Layer, Point, Polygon};

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }

    fn layer_of(polygons: Vec<Polygon>) -> Layer {
        let mut layer = Layer::new(2, 0);
        layer.polygons = polygons;
        layer
    }

    fn near(points: &[Point], x: f64, y: f64) -> bool {
        points.iter().any(|p| (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9)
    }

    #[test]
    fn test_unit_square_mask() {
        let mask = rect(0.0, 0.0, 1.0, 1.0);
        let target = layer_of(vec![rect(0.5, 0.5, 1.5, 1.5)]);

        let result = intersect_layer_with_mask(&mask, &target);
        assert_eq!((result.number, result.datatype), (2, 0));
        assert_eq!(result.polygon_count(), 1);

        let clipped = &result.polygons[0];
        assert!((clipped.area() - 0.25).abs() < 1e-9);
        for (x, y) in [(0.5, 0.5), (1.0, 0.5), (1.0, 1.0), (0.5, 1.0)] {
            assert!(near(clipped.points(), x, y), "missing corner ({x}, {y})");
        }
    }

    #[test]
    fn test_disjoint_layers_give_empty_result() {
        let mask = rect(0.0, 0.0, 1.0, 1.0);
        let target = layer_of(vec![rect(2.0, 2.0, 3.0, 3.0), rect(-3.0, 0.0, -2.0, 1.0)]);
        assert!(intersect_layer_with_mask(&mask, &target).is_empty());
    }

    #[test]
    fn test_contained_target_is_unchanged() {
        let mask = rect(-10.0, -10.0, 10.0, 10.0);
        let inner = rect(1.0, 2.0, 3.0, 5.0);
        let result = intersect_layer_with_mask(&mask, &layer_of(vec![inner.clone()]));
        assert_eq!(result.polygon_count(), 1);
        assert!((result.polygons[0].area() - inner.area()).abs() < 1e-9);
        for p in inner.points() {
            assert!(near(result.polygons[0].points(), p.x, p.y));
        }
    }

    #[test]
    fn test_mask_inside_target_yields_mask() {
        let mask = rect(1.0, 1.0, 2.0, 2.0);
        let clipped = intersect_polygons(&mask, &rect(0.0, 0.0, 5.0, 5.0)).unwrap();
        assert!((clipped.area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersection_is_symmetric_in_area() {
        let a = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(2.0, 3.0)]);
        let b = rect(1.0, -1.0, 3.0, 1.0);
        let ab = intersect_polygons(&a, &b).unwrap();
        let ba = intersect_polygons(&b, &a).unwrap();
        assert!((ab.area() - ba.area()).abs() < 1e-9);
        assert!(ab.area() > 0.0 && ab.area() <= b.area());
    }

    #[test]
    fn test_mask_far_from_origin() {
        let base = 1e8;
        let mask = rect(base, base, base + 1.0, base + 1.0);
        let target = layer_of(vec![rect(base + 0.5, base + 0.5, base + 1.5, base + 1.5)]);
        let result = intersect_layer_with_mask(&mask, &target);
        assert_eq!(result.polygon_count(), 1);
        assert!((result.polygons[0].area() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_targets_are_skipped() {
        let mask = rect(0.0, 0.0, 4.0, 4.0);
        let degenerate = Polygon::new(vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0), Point::new(3.0, 3.0)]);
        let result = intersect_layer_with_mask(&mask, &layer_of(vec![degenerate, rect(1.0, 1.0, 2.0, 2.0)]));
        assert_eq!(result.polygon_count(), 1);
        assert!((result.polygons[0].area() - 1.0).abs() < 1e-9);
    }
}
