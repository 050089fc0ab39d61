use colorcloud_3d::io::pcd::write_pcd_binary;
use colorcloud_3d::io::ply::read_ply_binary;
use colorcloud_3d::pointcloud::PointCloud;
use colorcloud_3d::projection::NO_COLOUR;
use colorcloud_image::ImageSize;
use colorcloud_node::file_io::{replay, topic_dir, DirectorySource, PlySink, PngSink};
use colorcloud_node::messages::{Header, PointCloudMessage, RawImage};
use colorcloud_node::node::{input_channels, ChannelPublisher};
use colorcloud_node::{FusionConfig, FusionNode, FusionState, NodeError};

fn uniform_image(seq: u32, width: u32, height: u32, rgb: [u8; 3]) -> RawImage {
    RawImage {
        header: Header::now(seq, "usb_cam"),
        width,
        height,
        encoding: "rgb8".to_string(),
        step: width * 3,
        data: rgb.repeat((width * height) as usize),
    }
}

fn cloud(seq: u32, points: Vec<[f64; 3]>) -> PointCloudMessage {
    PointCloudMessage {
        header: Header::now(seq, "sensor"),
        cloud: PointCloud::from_points(points),
    }
}

#[test]
fn map_is_built_from_the_first_image_only() -> Result<(), NodeError> {
    let mut state = FusionState::from_config(&FusionConfig::default())?;
    assert!(!state.undistortion().is_ready());

    state.handle_image(&uniform_image(0, 640, 480, [10, 20, 30]))?;
    let first = state.undistortion().get().expect("map built").clone();
    assert_eq!(first.size, ImageSize { width: 640, height: 480 });

    state.handle_image(&uniform_image(1, 640, 480, [10, 20, 30]))?;
    let map = state.undistortion().get().expect("map built");
    assert_eq!(map.map_x, first.map_x);
    assert_eq!(map.map_y, first.map_y);

    // a later image of another size is rectified with the first map
    let rect = state.handle_image(&uniform_image(2, 320, 240, [10, 20, 30]))?;
    assert_eq!((rect.width, rect.height), (640, 480));
    assert_eq!(state.undistortion().get().expect("map built").size, first.size);

    Ok(())
}

#[test]
fn latest_image_colours_the_cloud() -> Result<(), NodeError> {
    let mut state = FusionState::from_config(&FusionConfig::default())?;
    let points = vec![[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, -2.0, 0.0], [40.0, 1.0, 0.0]];

    state.handle_image(&uniform_image(0, 640, 480, [255, 0, 0]))?;
    state.handle_image(&uniform_image(1, 640, 480, [0, 0, 255]))?;

    let out = state.handle_cloud(&cloud(0, points.clone()));
    assert_eq!(out.cloud.points(), &points[..]);
    assert_eq!(
        out.cloud.colors(),
        Some(&[[0, 0, 255], NO_COLOUR, NO_COLOUR, NO_COLOUR][..])
    );
    Ok(())
}

#[test]
fn bgr_images_are_not_reordered() -> Result<(), NodeError> {
    let mut state = FusionState::from_config(&FusionConfig::default())?;
    let mut image = uniform_image(0, 640, 480, [1, 2, 3]);
    image.encoding = "bgr8".to_string();

    let rect = state.handle_image(&image)?;
    assert_eq!(rect.encoding, "rgb8");

    let out = state.handle_cloud(&cloud(0, vec![[0.0, 1.0, 0.0]]));
    assert_eq!(out.cloud.colors(), Some(&[[1, 2, 3]][..]));
    Ok(())
}

#[tokio::test]
async fn replay_from_directories() -> Result<(), NodeError> {
    let input = tempfile::tempdir()?;
    let output = tempfile::tempdir()?;
    let images_dir = input.path().join("images");
    let clouds_dir = input.path().join("clouds");
    std::fs::create_dir_all(&images_dir)?;
    std::fs::create_dir_all(&clouds_dir)?;

    image::RgbImage::from_pixel(640, 480, image::Rgb([12, 34, 56]))
        .save(images_dir.join("000000.png"))?;
    let points = vec![[0.0, 1.0, 0.0], [0.0, -1.0, 0.0]];
    write_pcd_binary(
        clouds_dir.join("000000.pcd"),
        &PointCloud::from_points(points.clone()),
    )?;

    let config = FusionConfig::default();
    let rect_dir = topic_dir(output.path(), &config.topics.rect_image);
    let cloud_dir = topic_dir(output.path(), &config.topics.colour_cloud);

    // the image is fully handled before the cloud is replayed
    let ((image_tx, image_rx), (cloud_tx, cloud_rx)) = input_channels();
    let shutdown_tx = tokio::sync::watch::Sender::new(());
    let (rect, mut rect_rx) = ChannelPublisher::<RawImage>::new("rect_image");
    let mut pngs = PngSink::new(&rect_dir)?;
    let node = FusionNode::new(&config, rect, PlySink::new(&cloud_dir)?)?;
    let handle = tokio::spawn(node.run(image_rx, cloud_rx, shutdown_tx.clone()));

    let sent = replay(
        DirectorySource::images(&images_dir, "usb_cam")?,
        image_tx,
        shutdown_tx.clone(),
    )
    .await;
    assert_eq!(sent, 1);
    let rectified = rect_rx.recv().await.expect("rectified image");
    colorcloud_node::Publisher::publish(&mut pngs, &rectified)?;

    let sent = replay(
        DirectorySource::clouds(&clouds_dir, "velodyne")?,
        cloud_tx,
        shutdown_tx.clone(),
    )
    .await;
    assert_eq!(sent, 1);

    handle.await.expect("node task")?;

    assert!(rect_dir.join("000000.png").is_file());
    let coloured = read_ply_binary(cloud_dir.join("000000.ply"))?;
    assert_eq!(coloured.points(), &points[..]);
    assert_eq!(coloured.colors(), Some(&[[12, 34, 56], NO_COLOUR][..]));

    Ok(())
}
