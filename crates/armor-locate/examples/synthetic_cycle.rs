//! Localize a rendered red plate in a few synthetic frames.
//!
//! The plate sits at a known position in front of a far wall; depth has
//! dropouts at the plate border. Run with `RUST_LOG`-style verbosity via the
//! first argument, e.g. `cargo run --example synthetic_cycle -- debug`.

use std::env;
use std::str::FromStr;

use armor_locate::core::{init_with_level, CameraIntrinsics, DepthMap, RgbImage};
use armor_locate::{
    ColorThresholdDetector, FramePair, FrameQueue, Localization, Localizer, LocalizerParams,
    TargetColor,
};
use log::{info, LevelFilter};
use nalgebra::Point3;

const WIDTH: usize = 640;
const HEIGHT: usize = 480;
const DEPTH_UNITS: f32 = 0.001;

/// Render a fronto-parallel plate of `half_size` meters centered at `center`.
fn render(k: &CameraIntrinsics, index: u64, center: Point3<f64>, half_size: f64) -> FramePair {
    let mut color = RgbImage::filled(WIDTH, HEIGHT, [15, 15, 20]);
    let mut depth = DepthMap::filled(WIDTH, HEIGHT, 4000, DEPTH_UNITS);

    let tl = k.project_point(center + nalgebra::Vector3::new(-half_size, -half_size, 0.0));
    let br = k.project_point(center + nalgebra::Vector3::new(half_size, half_size, 0.0));
    let (x0, y0) = (tl.x.round() as usize, tl.y.round() as usize);
    let (x1, y1) = (br.x.round() as usize, br.y.round() as usize);
    let raw = (center.z / DEPTH_UNITS as f64).round() as u16;

    for y in y0..=y1.min(HEIGHT - 1) {
        for x in x0..=x1.min(WIDTH - 1) {
            color.put_pixel(x, y, [235, 40, 35]);
            let border = x - x0 < 3 || x1 - x < 3 || y - y0 < 3 || y1 - y < 3;
            depth.set(x, y, if border { 0 } else { raw });
        }
    }

    FramePair::new(index, color, depth).expect("synthetic frames are aligned")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let level = env::args()
        .nth(1)
        .and_then(|s| LevelFilter::from_str(&s).ok())
        .unwrap_or(LevelFilter::Info);
    init_with_level(level)?;

    let k = CameraIntrinsics::pinhole(WIDTH as u32, HEIGHT as u32, 610.0, 610.0, 320.0, 240.0);
    let truth = [
        Point3::new(0.0, 0.0, 1.5),
        Point3::new(0.25, -0.1, 2.0),
        Point3::new(-0.3, 0.15, 2.6),
    ];
    let frames = truth
        .iter()
        .enumerate()
        .map(|(i, c)| render(&k, i as u64, *c, 0.07));
    let mut source = FrameQueue::new(k, frames);

    let params = LocalizerParams {
        target_color: TargetColor::Red,
        ..LocalizerParams::default()
    };
    let localizer = Localizer::from_source(&source, params)?;
    let mut detector = ColorThresholdDetector::default();

    for expected in truth {
        let cycle = localizer.run_one_cycle(&mut source, &mut detector)?;
        match &cycle.outcome {
            Localization::Detected(found) => {
                let err = (found.position - expected).norm();
                println!("frame {}:\n{found}", cycle.frames.index);
                info!("error vs ground truth: {:.1} mm", err * 1000.0);
            }
            Localization::Missed(reason) => println!("frame {}: {reason}", cycle.frames.index),
        }
    }
    Ok(())
}
