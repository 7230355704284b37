use log::debug;
use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;

use crate::config::{LocalizerConfig, MIN_SAMPLE};
use crate::error::{LocalizeError, LocalizeResult};
use crate::homography::{estimate_dlt, estimate_four_point, Homography};

/// Result of a robust fit
#[derive(Debug, Clone)]
pub struct RansacOutcome {
    pub homography: Homography,
    /// Inlier flag per correspondence, in input order
    pub inliers: Vec<bool>,
    pub inlier_count: usize,
    /// Hypotheses drawn before stopping
    pub iterations: usize,
}

/// Iterations needed to draw one all-inlier sample with probability `confidence`
fn required_iterations(inliers: usize, total: usize, confidence: f64) -> usize {
    let w = inliers as f64 / total as f64;
    let p_good = w.powi(MIN_SAMPLE as i32);
    if p_good >= 1.0 - f64::EPSILON {
        return 1;
    }
    if p_good <= f64::EPSILON {
        return usize::MAX;
    }
    let k = (1.0 - confidence).ln() / (1.0 - p_good).ln();
    if k.is_finite() {
        k.ceil().max(1.0) as usize
    } else {
        usize::MAX
    }
}

fn inlier_mask(h: &Homography, src: &[Point2<f64>], dst: &[Point2<f64>], threshold: f64) -> Vec<bool> {
    src.iter()
        .zip(dst)
        .map(|(s, d)| h.transfer_error(*s, *d) <= threshold)
        .collect()
}

fn count_inliers(h: &Homography, src: &[Point2<f64>], dst: &[Point2<f64>], threshold: f64) -> usize {
    src.iter()
        .zip(dst)
        .filter(|(s, d)| h.transfer_error(**s, **d) <= threshold)
        .count()
}

/// Robust homography `dst ~ H * src`.
///
/// Draws minimal samples from a generator seeded with `cfg.seed`, so the
/// outcome is reproducible. Samples with three collinear points on either
/// side are skipped. The best hypothesis is refit on all its inliers with
/// the normalized DLT; the refit replaces it only if it keeps at least as
/// many inliers.
pub fn estimate_ransac(
    src: &[Point2<f64>],
    dst: &[Point2<f64>],
    cfg: &LocalizerConfig,
) -> LocalizeResult<RansacOutcome> {
    let n = src.len().min(dst.len());
    if n < MIN_SAMPLE {
        return Err(LocalizeError::TooFewMatches {
            found: n,
            required: MIN_SAMPLE,
        });
    }
    let (src, dst) = (&src[..n], &dst[..n]);
    let threshold = cfg.reproj_threshold;

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut budget = cfg.max_iterations;
    let mut iterations = 0;
    let mut skipped = 0;
    let mut best: Option<(Homography, usize)> = None;

    while iterations < budget {
        iterations += 1;
        let picked = sample(&mut rng, n, MIN_SAMPLE);
        let s: Vec<Point2<f64>> = picked.iter().map(|i| src[i]).collect();
        let d: Vec<Point2<f64>> = picked.iter().map(|i| dst[i]).collect();
        let Some(h) = estimate_four_point(&s, &d) else {
            skipped += 1;
            continue;
        };

        let count = count_inliers(&h, src, dst, threshold);
        if count > best.as_ref().map_or(0, |b| b.1) {
            best = Some((h, count));
            budget = budget.min(required_iterations(count, n, cfg.confidence));
        }
    }

    let (sample_model, sample_count) = match best {
        Some(b) if b.1 >= MIN_SAMPLE => b,
        _ => {
            return Err(LocalizeError::Degenerate(format!(
                "no hypothesis with at least {} inliers after {} iterations ({} degenerate samples)",
                MIN_SAMPLE, iterations, skipped
            )))
        }
    };

    let mask = inlier_mask(&sample_model, src, dst, threshold);
    let (in_src, in_dst): (Vec<_>, Vec<_>) = src
        .iter()
        .zip(dst)
        .zip(&mask)
        .filter(|(_, &keep)| keep)
        .map(|((s, d), _)| (*s, *d))
        .unzip();

    let refit = estimate_dlt(&in_src, &in_dst)
        .map(|h| (h, count_inliers(&h, src, dst, threshold)))
        .filter(|&(_, count)| count >= sample_count);
    let (homography, inlier_count, refined) = match refit {
        Some((h, count)) => (h, count, true),
        None => (sample_model, sample_count, false),
    };

    debug!(
        "RANSAC: {} correspondences, {} iterations ({} degenerate), {} inliers, refit {}",
        n,
        iterations,
        skipped,
        inlier_count,
        if refined { "kept" } else { "dropped" }
    );

    Ok(RansacOutcome {
        homography,
        inliers: inlier_mask(&homography, src, dst, threshold),
        inlier_count,
        iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;
    use rand::Rng;

    fn reference() -> Homography {
        Homography::from_matrix(Matrix3::new(
            0.95, -0.25, 140.0, //
            0.3, 1.05, 60.0, //
            0.0003, 0.0001, 1.0,
        ))
        .unwrap()
    }

    /// `n` correspondences of `reference()`; every index with `i % 10 < 3`
    /// is pushed at least 40 pixels off its true position
    fn correspondences(n: usize, seed: u64) -> (Vec<Point2<f64>>, Vec<Point2<f64>>) {
        let h = reference();
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                let s = Point2::new(rng.gen_range(0.0..200.0), rng.gen_range(0.0..150.0));
                let mut d = h.apply(s).unwrap();
                if i % 10 < 3 {
                    d.x += rng.gen_range(40.0..120.0);
                    d.y -= rng.gen_range(40.0..120.0);
                }
                (s, d)
            })
            .unzip()
    }

    #[test]
    fn recovers_homography_with_outliers() {
        let (src, dst) = correspondences(50, 7);
        let out = estimate_ransac(&src, &dst, &LocalizerConfig::default()).unwrap();
        assert_eq!(out.inlier_count, 35);
        for (i, &flag) in out.inliers.iter().enumerate() {
            assert_eq!(flag, i % 10 >= 3, "correspondence {i}");
        }
        let h = reference();
        for p in [Point2::new(0.0, 0.0), Point2::new(200.0, 150.0), Point2::new(37.0, 91.0)] {
            let expected = h.apply(p).unwrap();
            assert!(out.homography.transfer_error(p, expected) < 1e-6);
        }
    }

    #[test]
    fn clean_data_stops_early() {
        let h = reference();
        let src: Vec<_> = (0..30)
            .map(|i| Point2::new((i * 37 % 200) as f64, (i * 53 % 150) as f64))
            .collect();
        let dst: Vec<_> = src.iter().map(|p| h.apply(*p).unwrap()).collect();
        let out = estimate_ransac(&src, &dst, &LocalizerConfig::default()).unwrap();
        assert_eq!(out.inlier_count, 30);
        assert!(out.iterations < 10, "took {} iterations", out.iterations);
    }

    #[test]
    fn collinear_input_is_degenerate() {
        let src: Vec<_> = (0..12).map(|i| Point2::new(i as f64 * 5.0, 3.0 + i as f64)).collect();
        let dst: Vec<_> = src.iter().map(|p| Point2::new(p.x + 10.0, p.y - 4.0)).collect();
        let cfg = LocalizerConfig {
            max_iterations: 200,
            ..LocalizerConfig::default()
        };
        let err = estimate_ransac(&src, &dst, &cfg).unwrap_err();
        assert!(matches!(err, LocalizeError::Degenerate(_)));
    }

    #[test]
    fn needs_four_correspondences() {
        let pts = vec![Point2::new(0.0, 0.0); 3];
        assert_eq!(
            estimate_ransac(&pts, &pts, &LocalizerConfig::default()).unwrap_err(),
            LocalizeError::TooFewMatches {
                found: 3,
                required: 4
            }
        );
    }

    #[test]
    fn same_seed_same_result() {
        let (src, dst) = correspondences(40, 11);
        let cfg = LocalizerConfig::default();
        let a = estimate_ransac(&src, &dst, &cfg).unwrap();
        let b = estimate_ransac(&src, &dst, &cfg).unwrap();
        assert_eq!(a.homography, b.homography);
        assert_eq!(a.inliers, b.inliers);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn iteration_budget_follows_inlier_ratio() {
        assert_eq!(required_iterations(10, 10, 0.995), 1);
        assert_eq!(required_iterations(0, 10, 0.995), usize::MAX);
        // w = 0.5: ln(0.005) / ln(1 - 1/16) = 82.1
        assert_eq!(required_iterations(5, 10, 0.995), 83);
    }
}
