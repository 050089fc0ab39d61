use argh::FromArgs;
use std::path::PathBuf;

use colorcloud_node::file_io::{replay, topic_dir, DirectorySource, PlySink, PngSink};
use colorcloud_node::node::input_channels;
use colorcloud_node::{FusionConfig, FusionNode};

#[derive(FromArgs)]
/// Colour lidar point clouds with the pixels of a rectified camera image
struct Args {
    /// path to a JSON configuration file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// directory of camera images (png, jpg)
    #[argh(option, short = 'i')]
    images: PathBuf,

    /// directory of binary PCD clouds
    #[argh(option, short = 'p')]
    clouds: PathBuf,

    /// directory receiving the rectified images and coloured clouds
    #[argh(option, short = 'o')]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => FusionConfig::from_file(path)?,
        None => FusionConfig::default(),
    };
    config.validate()?;

    log::info!(
        "Image topic '{}', cloud topic '{}'",
        config.topics.image_raw,
        config.topics.points
    );

    // create the cancellation token
    let shutdown_tx = tokio::sync::watch::Sender::new(());

    ctrlc::set_handler({
        let shutdown_tx = shutdown_tx.clone();
        move || {
            log::info!("Received Ctrl+C, shutting down gracefully...");
            shutdown_tx.send(()).ok();
        }
    })?;

    let image_sink = PngSink::new(topic_dir(&args.output, &config.topics.rect_image))?;
    let cloud_sink = PlySink::new(topic_dir(&args.output, &config.topics.colour_cloud))?;
    let node = FusionNode::new(&config, image_sink, cloud_sink)?;

    let images = DirectorySource::images(&args.images, "usb_cam")?;
    let clouds = DirectorySource::clouds(&args.clouds, config.frame_id.as_str())?;
    log::info!(
        "Replaying {} images and {} clouds",
        images.remaining(),
        clouds.remaining()
    );

    let ((image_tx, image_rx), (cloud_tx, cloud_rx)) = input_channels();
    let sources = vec![
        tokio::spawn(replay(images, image_tx, shutdown_tx.clone())),
        tokio::spawn(replay(clouds, cloud_tx, shutdown_tx.clone())),
    ];

    let result = node.run(image_rx, cloud_rx, shutdown_tx.clone()).await;

    // release the sources if the node stopped early
    shutdown_tx.send(()).ok();
    for source in sources {
        source.await?;
    }

    result?;
    log::info!("Output written to {}", args.output.display());

    Ok(())
}
