use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use std::hint::black_box;

use colorcloud_3d::pointcloud::PointCloud;
use colorcloud_3d::projection::{colorize_pointcloud, ProjectionMatrix};
use colorcloud_image::{Image, ImageSize};

fn bench_colorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Colorize");

    let projection = ProjectionMatrix::from_rows(&[
        [754.53892599834842, 0.0, 319.5],
        [0.0, 754.53892599834842, 239.5],
        [0.0, 0.0, 1.0],
    ]);

    let mut rng = rand::rng();
    let size = ImageSize {
        width: 640,
        height: 480,
    };
    let data = (0..size.area() * 3).map(|_| rng.random::<u8>()).collect();
    let image = Image::<u8, 3>::new(size, data).expect("valid image");

    // a velodyne sweep holds roughly 30k points for 16 beams
    for num_points in [1_000, 30_000, 120_000].iter() {
        let points = (0..*num_points)
            .map(|_| {
                [
                    rng.random_range(-20.0..20.0),
                    rng.random_range(-20.0..20.0),
                    rng.random_range(-2.0..2.0),
                ]
            })
            .collect();
        let cloud = PointCloud::from_points(points);

        group.bench_with_input(
            BenchmarkId::new("colorize_pointcloud", num_points),
            &cloud,
            |b, cloud| b.iter(|| black_box(colorize_pointcloud(cloud, Some(&image), &projection))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_colorize);
criterion_main!(benches);
