use std::path::{Path, PathBuf};

use tokio::sync::{mpsc, watch};

use colorcloud_3d::io::{pcd::read_pcd_binary, ply::write_ply_binary};
use colorcloud_image::{ImageEncoding, ImageError};

use crate::error::NodeError;
use crate::messages::{Header, PointCloudMessage, RawImage};
use crate::node::Publisher;

/// File extensions picked up by an image source.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// File extensions picked up by a cloud source.
pub const CLOUD_EXTENSIONS: &[&str] = &["pcd"];

/// List the files of `dir` with one of `extensions`, in lexicographic order.
///
/// Extensions are compared case insensitively.
pub fn list_files(dir: impl AsRef<Path>, extensions: &[&str]) -> Result<Vec<PathBuf>, NodeError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Decode an image file to an `rgb8` message.
pub fn read_raw_image(path: impl AsRef<Path>, header: Header) -> Result<RawImage, NodeError> {
    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(RawImage {
        header,
        width,
        height,
        encoding: ImageEncoding::Rgb8.as_str().to_string(),
        step: width * 3,
        data: rgb.into_raw(),
    })
}

/// Read a binary PCD file to a cloud message.
pub fn read_cloud_message(
    path: impl AsRef<Path>,
    header: Header,
) -> Result<PointCloudMessage, NodeError> {
    let cloud = read_pcd_binary(path)?;
    Ok(PointCloudMessage { header, cloud })
}

type ReadFn<T> = fn(&Path, Header) -> Result<T, NodeError>;

/// Messages read from the files of a directory, one per file.
///
/// Files that cannot be read are logged and skipped. Sequence numbers count
/// the delivered messages.
pub struct DirectorySource<T> {
    files: std::vec::IntoIter<PathBuf>,
    frame_id: String,
    seq: u32,
    read: ReadFn<T>,
}

impl<T> DirectorySource<T> {
    fn new(
        dir: impl AsRef<Path>,
        extensions: &[&str],
        frame_id: impl Into<String>,
        read: ReadFn<T>,
    ) -> Result<Self, NodeError> {
        let files = list_files(dir, extensions)?;
        Ok(Self {
            files: files.into_iter(),
            frame_id: frame_id.into(),
            seq: 0,
            read,
        })
    }

    /// Number of files that are left.
    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl DirectorySource<RawImage> {
    /// Images from `png`, `jpg` and `jpeg` files.
    pub fn images(dir: impl AsRef<Path>, frame_id: impl Into<String>) -> Result<Self, NodeError> {
        Self::new(dir, IMAGE_EXTENSIONS, frame_id, |path, header| {
            read_raw_image(path, header)
        })
    }
}

impl DirectorySource<PointCloudMessage> {
    /// Clouds from binary `pcd` files.
    pub fn clouds(dir: impl AsRef<Path>, frame_id: impl Into<String>) -> Result<Self, NodeError> {
        Self::new(dir, CLOUD_EXTENSIONS, frame_id, |path, header| {
            read_cloud_message(path, header)
        })
    }
}

impl<T> Iterator for DirectorySource<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        for path in self.files.by_ref() {
            let header = Header::now(self.seq, self.frame_id.as_str());
            match (self.read)(&path, header) {
                Ok(msg) => {
                    self.seq += 1;
                    return Some(msg);
                }
                Err(e) => log::error!("Skipping {}: {}", path.display(), e),
            }
        }
        None
    }
}

/// Send every message of `source` to `tx`, until shutdown or until the
/// receiver is gone.
///
/// Returns the number of messages sent.
pub async fn replay<T, S>(source: S, tx: mpsc::Sender<T>, shutdown_tx: watch::Sender<()>) -> usize
where
    S: Iterator<Item = T>,
{
    let mut shutdown_rx = shutdown_tx.subscribe();
    let mut sent = 0;

    for msg in source {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => break,

            res = tx.send(msg) => {
                if res.is_err() {
                    break;
                }
                sent += 1;
            }
        }
    }

    sent
}

/// The directory of a topic below `output`.
pub fn topic_dir(output: impl AsRef<Path>, topic: &str) -> PathBuf {
    output.as_ref().join(topic.trim_start_matches('/'))
}

fn numbered(dir: &Path, count: usize, ext: &str) -> PathBuf {
    dir.join(format!("{count:06}.{ext}"))
}

/// Writes every published image as `NNNNNN.png`.
#[derive(Debug)]
pub struct PngSink {
    dir: PathBuf,
    count: usize,
}

impl PngSink {
    /// Create the sink, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, NodeError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, count: 0 })
    }
}

impl Publisher<RawImage> for PngSink {
    fn publish(&mut self, msg: &RawImage) -> Result<(), NodeError> {
        let image = msg.to_image()?;
        let expected = image.as_slice().len();
        let buffer = image::RgbImage::from_raw(msg.width, msg.height, image.into_vec())
            .ok_or(ImageError::InvalidChannelShape(expected, expected))?;

        let path = numbered(&self.dir, self.count, "png");
        buffer.save(&path)?;
        log::debug!("Wrote {}", path.display());
        self.count += 1;
        Ok(())
    }
}

/// Writes every published cloud as a binary `NNNNNN.ply`.
#[derive(Debug)]
pub struct PlySink {
    dir: PathBuf,
    count: usize,
}

impl PlySink {
    /// Create the sink, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, NodeError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, count: 0 })
    }
}

impl Publisher<PointCloudMessage> for PlySink {
    fn publish(&mut self, msg: &PointCloudMessage) -> Result<(), NodeError> {
        let path = numbered(&self.dir, self.count, "ply");
        write_ply_binary(&path, &msg.cloud)?;
        log::debug!("Wrote {} with {} points", path.display(), msg.cloud.len());
        self.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorcloud_3d::io::ply::read_ply_binary;
    use colorcloud_3d::pointcloud::PointCloud;

    #[test]
    fn lists_matching_files_in_order() -> Result<(), NodeError> {
        let dir = tempfile::tempdir()?;
        for name in ["b.png", "a.JPG", "c.txt", "10.png", "2.png"] {
            std::fs::write(dir.path().join(name), b"")?;
        }
        std::fs::create_dir(dir.path().join("sub.png"))?;

        let names: Vec<String> = list_files(dir.path(), IMAGE_EXTENSIONS)?
            .iter()
            .filter_map(|p| p.file_name()?.to_str().map(String::from))
            .collect();
        assert_eq!(names, ["10.png", "2.png", "a.JPG", "b.png"]);
        Ok(())
    }

    #[test]
    fn image_source_skips_unreadable_files() -> Result<(), NodeError> {
        let dir = tempfile::tempdir()?;
        let img = image::RgbImage::from_fn(4, 2, |x, y| image::Rgb([x as u8, y as u8, 7]));
        img.save(dir.path().join("000.png"))?;
        std::fs::write(dir.path().join("001.png"), b"not a png")?;
        img.save(dir.path().join("002.png"))?;

        let mut source = DirectorySource::images(dir.path(), "usb_cam")?;
        assert_eq!(source.remaining(), 3);

        let first = source.next().expect("first image");
        assert_eq!(first.header.seq, 0);
        assert_eq!(first.header.frame_id, "usb_cam");
        assert_eq!((first.width, first.height, first.step), (4, 2, 12));
        assert_eq!(first.encoding, "rgb8");
        assert_eq!(&first.data[..6], &[0, 0, 7, 1, 0, 7]);

        let second = source.next().expect("second image");
        assert_eq!(second.header.seq, 1);
        assert!(source.next().is_none());
        Ok(())
    }

    #[test]
    fn sinks_write_numbered_files() -> Result<(), NodeError> {
        let out = tempfile::tempdir()?;

        let mut pngs = PngSink::new(topic_dir(out.path(), "/rect_image"))?;
        let raw = RawImage {
            header: Header::default(),
            width: 2,
            height: 1,
            encoding: "rgb8".to_string(),
            step: 6,
            data: vec![1, 2, 3, 4, 5, 6],
        };
        pngs.publish(&raw)?;
        pngs.publish(&raw)?;

        let written = out.path().join("rect_image").join("000001.png");
        let decoded = image::open(&written)?.to_rgb8();
        assert_eq!(decoded.into_raw(), raw.data);

        let mut plys = PlySink::new(topic_dir(out.path(), "colour_cloud"))?;
        let cloud = PointCloud::new(vec![[1.0, 2.0, 3.0]], Some(vec![[4, 5, 6]]), None)?;
        plys.publish(&PointCloudMessage {
            header: Header::default(),
            cloud: cloud.clone(),
        })?;
        let read = read_ply_binary(out.path().join("colour_cloud").join("000000.ply"))?;
        assert_eq!(read, cloud);
        Ok(())
    }

    #[tokio::test]
    async fn replay_sends_everything() {
        let (tx, mut rx) = mpsc::channel(8);
        let sent = replay(0..5u32, tx, watch::Sender::new(())).await;
        assert_eq!(sent, 5);

        let mut received = Vec::new();
        while let Some(v) = rx.recv().await {
            received.push(v);
        }
        assert_eq!(received, [0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn replay_stops_when_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        assert_eq!(replay(0..5u32, tx, watch::Sender::new(())).await, 0);
    }
}
