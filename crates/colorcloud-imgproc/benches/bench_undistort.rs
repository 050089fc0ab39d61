use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use std::hint::black_box;

use colorcloud_image::{Image, ImageSize};
use colorcloud_imgproc::calibration::{distortion::PolynomialDistortion, CameraIntrinsic};
use colorcloud_imgproc::undistort::RectifyMaps;

fn camera() -> (CameraIntrinsic, PolynomialDistortion) {
    let intrinsic = CameraIntrinsic {
        fx: 754.53892599834842,
        fy: 754.53892599834842,
        cx: 319.5,
        cy: 239.5,
    };
    let distortion = PolynomialDistortion {
        k1: 5.2038044809064208e-03,
        k2: 1.5288890999953295e-01,
        k3: -1.7854072082302619e+00,
        ..Default::default()
    };
    (intrinsic, distortion)
}

fn bench_undistort(c: &mut Criterion) {
    let mut group = c.benchmark_group("Undistort");
    let (intrinsic, distortion) = camera();

    for (width, height) in [(320, 240), (640, 480), (1280, 960)].iter() {
        let size = ImageSize {
            width: *width,
            height: *height,
        };
        let parameter_string = format!("{width}x{height}");

        group.bench_with_input(
            BenchmarkId::new("build_maps", &parameter_string),
            &size,
            |b, &size| {
                b.iter(|| {
                    black_box(RectifyMaps::new(&intrinsic, &distortion, size, 0.0))
                })
            },
        );

        let maps = RectifyMaps::new(&intrinsic, &distortion, size, 0.0)
            .expect("valid calibration");
        let mut rng = rand::rng();
        let data = (0..size.area() * 3).map(|_| rng.random::<u8>()).collect();
        let image = Image::<u8, 3>::new(size, data).expect("valid image");

        group.bench_with_input(
            BenchmarkId::new("rectify", &parameter_string),
            &image,
            |b, image| b.iter(|| black_box(maps.rectify(image))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_undistort);
criterion_main!(benches);
