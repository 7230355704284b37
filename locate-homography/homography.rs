use nalgebra::{DMatrix, Matrix3, Point2, SMatrix, SVector, Vector3};

/// Projective denominators smaller than this map to infinity
const MIN_W: f64 = 1e-10;

/// Sine of the angle below which three points count as collinear
const COLLINEAR_SIN: f64 = 1e-6;

/// Plane-to-plane projective transform, `p_dst ~ H * p_src`.
///
/// Stored normalized so that `H[(2, 2)] == 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    h: Matrix3<f64>,
}

impl Homography {
    /// Normalize `m` by its bottom-right entry.
    ///
    /// `None` when that entry is (close to) zero, the matrix is singular or
    /// holds non-finite values.
    pub fn from_matrix(m: Matrix3<f64>) -> Option<Self> {
        let s = m[(2, 2)];
        if !s.is_finite() || s.abs() < 1e-12 {
            return None;
        }
        let h = m / s;
        if h.iter().any(|v| !v.is_finite()) || h.determinant().abs() < 1e-12 {
            return None;
        }
        Some(Self { h })
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.h
    }

    /// Map a point; `None` when it lands at infinity
    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Option<Point2<f64>> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        if !v[2].is_finite() || v[2].abs() < MIN_W {
            return None;
        }
        let out = Point2::new(v[0] / v[2], v[1] / v[2]);
        (out.x.is_finite() && out.y.is_finite()).then_some(out)
    }

    /// Euclidean distance between `H * src` and `dst`, infinite if `src` maps to infinity
    pub fn transfer_error(&self, src: Point2<f64>, dst: Point2<f64>) -> f64 {
        self.apply(src)
            .map_or(f64::INFINITY, |p| (p - dst).norm())
    }
}

/// Hartley normalization: translate to the centroid, scale so the mean
/// distance from it is sqrt(2).
pub fn normalize_points(pts: &[Point2<f64>]) -> (Vec<Point2<f64>>, Matrix3<f64>) {
    let n = pts.len().max(1) as f64;
    let (sx, sy) = pts.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let (cx, cy) = (sx / n, sy / n);

    let mean_dist = pts
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    let s = if mean_dist > 1e-12 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };

    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let out = pts
        .iter()
        .map(|p| Point2::new(s * (p.x - cx), s * (p.y - cy)))
        .collect();
    (out, t)
}

/// True when some three of `pts` are (nearly) collinear or coincide
pub fn has_collinear_triple(pts: &[Point2<f64>]) -> bool {
    let n = pts.len();
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                let ab = pts[j] - pts[i];
                let ac = pts[k] - pts[i];
                let cross = ab.x * ac.y - ab.y * ac.x;
                if cross.abs() <= COLLINEAR_SIN * ab.norm() * ac.norm() {
                    return true;
                }
            }
        }
    }
    false
}

/// Undo the normalizations: H = Tdst^-1 * Hn * Tsrc
fn denormalize(hn: Matrix3<f64>, t_src: &Matrix3<f64>, t_dst: &Matrix3<f64>) -> Option<Homography> {
    let t_dst_inv = t_dst.try_inverse()?;
    Homography::from_matrix(t_dst_inv * hn * t_src)
}

/// Exact homography from four correspondences.
///
/// Solves the 8x8 system obtained by fixing `h22 = 1` on normalized points.
pub fn estimate_four_point(src: &[Point2<f64>], dst: &[Point2<f64>]) -> Option<Homography> {
    if src.len() != 4 || dst.len() != 4 {
        return None;
    }
    if has_collinear_triple(src) || has_collinear_triple(dst) {
        return None;
    }
    let (s, ts) = normalize_points(src);
    let (d, td) = normalize_points(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for k in 0..4 {
        let (x, y) = (s[k].x, s[k].y);
        let (u, v) = (d[k].x, d[k].y);
        let r = 2 * k;
        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -u * x;
        a[(r, 7)] = -u * y;
        b[r] = u;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -v * x;
        a[(r + 1, 7)] = -v * y;
        b[r + 1] = v;
    }

    let h = a.lu().solve(&b)?;
    let hn = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
    denormalize(hn, &ts, &td)
}

/// Least-squares homography from `n >= 4` correspondences (normalized DLT).
pub fn estimate_dlt(src: &[Point2<f64>], dst: &[Point2<f64>]) -> Option<Homography> {
    if src.len() != dst.len() || src.len() < 4 {
        return None;
    }
    if src.len() == 4 {
        return estimate_four_point(src, dst);
    }

    let (s, ts) = normalize_points(src);
    let (d, td) = normalize_points(dst);

    let n = src.len();
    let mut a = DMatrix::<f64>::zeros(2 * n, 9);
    for k in 0..n {
        let (x, y) = (s[k].x, s[k].y);
        let (u, v) = (d[k].x, d[k].y);

        // [ -x -y -1   0  0  0   u*x u*y u ]
        a[(2 * k, 0)] = -x;
        a[(2 * k, 1)] = -y;
        a[(2 * k, 2)] = -1.0;
        a[(2 * k, 6)] = u * x;
        a[(2 * k, 7)] = u * y;
        a[(2 * k, 8)] = u;

        // [ 0  0  0  -x -y -1   v*x v*y v ]
        a[(2 * k + 1, 3)] = -x;
        a[(2 * k + 1, 4)] = -y;
        a[(2 * k + 1, 5)] = -1.0;
        a[(2 * k + 1, 6)] = v * x;
        a[(2 * k + 1, 7)] = v * y;
        a[(2 * k + 1, 8)] = v;
    }

    // h is the right singular vector of the smallest singular value
    let svd = a.svd(true, true);
    let vt = svd.v_t?;
    let h = vt.row(svd.singular_values.imin());
    let hn = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);
    denormalize(hn, &ts, &td)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> Homography {
        Homography::from_matrix(Matrix3::new(
            1.1, 0.2, 30.0, //
            -0.15, 0.9, 12.0, //
            0.0004, -0.0002, 1.0,
        ))
        .unwrap()
    }

    fn grid() -> Vec<Point2<f64>> {
        (0..4)
            .flat_map(|j| (0..3).map(move |i| Point2::new(i as f64 * 45.0 + 3.0, j as f64 * 31.0 + 7.0)))
            .collect()
    }

    fn assert_same(a: &Homography, b: &Homography) {
        for (x, y) in a.matrix().iter().zip(b.matrix().iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-7, max_relative = 1e-6);
        }
    }

    #[test]
    fn normalization_centers_and_scales() {
        let pts = grid();
        let (n, t) = normalize_points(&pts);
        let (cx, cy) = n.iter().fold((0.0, 0.0), |(a, b), p| (a + p.x, b + p.y));
        assert_relative_eq!(cx, 0.0, epsilon = 1e-9);
        assert_relative_eq!(cy, 0.0, epsilon = 1e-9);
        let mean = n.iter().map(|p| p.coords.norm()).sum::<f64>() / n.len() as f64;
        assert_relative_eq!(mean, std::f64::consts::SQRT_2, epsilon = 1e-9);
        let back = t * Vector3::new(pts[5].x, pts[5].y, 1.0);
        assert_relative_eq!(back[0], n[5].x, epsilon = 1e-9);
    }

    #[test]
    fn four_point_solver_is_exact() {
        let h = reference();
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 80.0),
            Point2::new(0.0, 80.0),
        ];
        let dst: Vec<_> = src.iter().map(|p| h.apply(*p).unwrap()).collect();
        let est = estimate_four_point(&src, &dst).unwrap();
        assert_same(&est, &h);
    }

    #[test]
    fn dlt_recovers_known_homography() {
        let h = reference();
        let src = grid();
        let dst: Vec<_> = src.iter().map(|p| h.apply(*p).unwrap()).collect();
        let est = estimate_dlt(&src, &dst).unwrap();
        assert_same(&est, &h);
        for (s, d) in src.iter().zip(&dst) {
            assert!(est.transfer_error(*s, *d) < 1e-6);
        }
    }

    #[test]
    fn dlt_rejects_bad_input() {
        let pts = grid();
        assert!(estimate_dlt(&pts[..3], &pts[..3]).is_none());
        assert!(estimate_dlt(&pts, &pts[..5]).is_none());

        // all points on one line: no unique homography
        let line: Vec<_> = (0..6).map(|i| Point2::new(i as f64, 2.0 * i as f64)).collect();
        let four = &line[..4];
        assert!(estimate_four_point(four, four).is_none());
    }

    #[test]
    fn collinear_triples_are_found() {
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert!(!has_collinear_triple(&square));
        let mut bent = square;
        bent[2] = Point2::new(20.0, 0.0);
        assert!(has_collinear_triple(&bent));
        let mut doubled = square;
        doubled[3] = doubled[0];
        assert!(has_collinear_triple(&doubled));
    }

    #[test]
    fn points_on_the_horizon_map_to_none() {
        let h = Homography::from_matrix(Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.01, 0.0, 1.0))
            .unwrap();
        assert!(h.apply(Point2::new(-100.0, 5.0)).is_none());
        assert!(h.apply(Point2::new(10.0, 5.0)).is_some());
        assert_eq!(h.transfer_error(Point2::new(-100.0, 5.0), Point2::origin()), f64::INFINITY);
    }

    #[test]
    fn singular_matrices_are_rejected() {
        assert!(Homography::from_matrix(Matrix3::zeros()).is_none());
        let rank_two = Matrix3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0);
        assert!(Homography::from_matrix(rank_two).is_none());
        let scaled = Homography::from_matrix(Matrix3::identity() * 4.0).unwrap();
        assert_eq!(scaled.matrix(), &Matrix3::identity());
    }
}
