use pixel_warp::core_modules::blob_detector::blob_detector;
use pixel_warp::core_modules::distance_field;
use pixel_warp::pipeline::Resampling;
use pixel_warp::{Raster, Strategy, WarpConfig, WarpEngine};

/// Small deterministic generator so the fixtures are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_u8(&mut self) -> u8 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 56) as u8
    }
}

fn noise(width: u32, height: u32, channels: u8, seed: u64) -> Raster {
    let mut rng = Lcg(seed);
    let data = (0..width * height * channels as u32)
        .map(|_| rng.next_u8())
        .collect();
    Raster::new(width, height, channels, data).unwrap()
}

fn configs() -> Vec<WarpConfig> {
    let mut all = Vec::new();
    for strategy in [Strategy::Discrete, Strategy::Continuous] {
        for k in [0, 1, 3] {
            for d in [0, 2, 7] {
                all.push(WarpConfig {
                    strategy,
                    closing_iterations: k,
                    dilation_iterations: d,
                });
            }
        }
    }
    all
}

#[test]
fn repeated_warps_are_byte_identical() {
    let engine = WarpEngine::new();
    let source = noise(23, 17, 3, 7);
    for config in configs() {
        let first = engine.warp(&source, &config).unwrap();
        let second = engine.warp(&source, &config).unwrap();
        assert_eq!(first, second, "{config:?}");
    }
}

#[test]
fn uniform_images_are_fixed_points() {
    let engine = WarpEngine::new();
    for pixel in [&[0u8][..], &[77u8, 131, 13][..], &[255u8, 0, 255, 40][..]] {
        let source = Raster::from_pixel(9, 5, pixel).unwrap();
        for config in configs() {
            assert_eq!(engine.warp(&source, &config).unwrap(), source, "{config:?}");
        }
    }
}

#[test]
fn index_map_stays_in_bounds() {
    let engine = WarpEngine::new();
    for (seed, (w, h)) in [(1u64, (1u32, 9u32)), (2, (9, 1)), (3, (31, 12)), (4, (2, 2))] {
        let source = noise(w, h, 3, seed);
        for k in 0..5 {
            let mask = engine.build_mask(&source, k).unwrap();
            let features = distance_field::transform(&mask).unwrap();
            assert!(features.indices.iter().all(|i| i.x < w && i.y < h));
            assert!(features.distances.iter().all(|d| *d >= 0.0));

            let config = WarpConfig::default().with_closing_iterations(k);
            if let Resampling::Discrete(indices) = engine.plan(&source, &config).unwrap() {
                assert!(indices.iter().all(|i| i.x < w && i.y < h));
            }
        }
    }
}

#[test]
fn more_closing_never_shrinks_mean_blob_size() {
    let engine = WarpEngine::new();
    for seed in [11u64, 12, 13] {
        let source = noise(40, 30, 1, seed);
        let mut previous = 0.0f64;
        for k in 0..5 {
            let mask = engine.build_mask(&source, k).unwrap();
            let stats = blob_detector::mask_stats(&mask);
            assert!(
                stats.mean_blob_size >= previous,
                "seed {seed}: k={k} mean {} < {previous}",
                stats.mean_blob_size
            );
            previous = stats.mean_blob_size;
        }
    }
}

#[test]
fn zero_dilation_only_differs_by_interpolation() {
    let engine = WarpEngine::new();
    let source = noise(19, 11, 4, 99);
    let config = WarpConfig::default()
        .with_strategy(Strategy::Continuous)
        .with_dilation_iterations(0);
    for k in [0, 2] {
        let out = engine.warp(&source, &config.with_closing_iterations(k)).unwrap();
        for (a, b) in out.as_bytes().iter().zip(source.as_bytes()) {
            assert!(a.abs_diff(*b) <= 1);
        }
    }
}

#[test]
fn dimensions_and_channels_are_preserved() {
    let engine = WarpEngine::new();
    for channels in [1u8, 3, 4] {
        let source = noise(13, 8, channels, channels as u64);
        for config in configs() {
            let out = engine.warp(&source, &config).unwrap();
            assert_eq!(
                (out.width(), out.height(), out.channels()),
                (13, 8, channels),
                "{config:?}"
            );
        }
    }
}

#[test]
fn engine_is_shareable_across_threads() {
    let engine = std::sync::Arc::new(WarpEngine::new());
    let source = noise(16, 16, 3, 5);
    let config = WarpConfig::default();
    let expected = engine.warp(&source, &config).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = std::sync::Arc::clone(&engine);
            let source = source.clone();
            std::thread::spawn(move || engine.warp(&source, &config).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
