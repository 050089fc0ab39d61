use tokio::sync::{mpsc, watch};

use crate::config::FusionConfig;
use crate::error::NodeError;
use crate::messages::{PointCloudMessage, RawImage};
use crate::state::FusionState;

/// Depth of the input queues, producers wait once it is reached.
pub const QUEUE_DEPTH: usize = 2;

/// Something that delivers messages of type `T` downstream.
pub trait Publisher<T> {
    /// Publish one message.
    fn publish(&mut self, msg: &T) -> Result<(), NodeError>;
}

/// A publisher forwarding clones of every message to a channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher<T> {
    topic: String,
    tx: mpsc::UnboundedSender<T>,
}

impl<T> ChannelPublisher<T> {
    /// Create the publisher and the receiving end of its channel.
    pub fn new(topic: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                topic: topic.into(),
                tx,
            },
            rx,
        )
    }
}

impl<T: Clone> Publisher<T> for ChannelPublisher<T> {
    fn publish(&mut self, msg: &T) -> Result<(), NodeError> {
        self.tx
            .send(msg.clone())
            .map_err(|_| NodeError::Publish(self.topic.clone()))
    }
}

/// Create the bounded input channels of a node.
pub fn input_channels() -> (
    (mpsc::Sender<RawImage>, mpsc::Receiver<RawImage>),
    (mpsc::Sender<PointCloudMessage>, mpsc::Receiver<PointCloudMessage>),
) {
    (mpsc::channel(QUEUE_DEPTH), mpsc::channel(QUEUE_DEPTH))
}

/// The fusion node: rectifies images and colours clouds, one message at a time.
pub struct FusionNode<I, C> {
    state: FusionState,
    image_publisher: I,
    cloud_publisher: C,
}

impl<I, C> FusionNode<I, C>
where
    I: Publisher<RawImage>,
    C: Publisher<PointCloudMessage>,
{
    /// Create the node from a configuration.
    pub fn new(
        config: &FusionConfig,
        image_publisher: I,
        cloud_publisher: C,
    ) -> Result<Self, NodeError> {
        Ok(Self::with_state(
            FusionState::from_config(config)?,
            image_publisher,
            cloud_publisher,
        ))
    }

    /// Create the node around an existing state.
    pub fn with_state(state: FusionState, image_publisher: I, cloud_publisher: C) -> Self {
        Self {
            state,
            image_publisher,
            cloud_publisher,
        }
    }

    /// The node state.
    pub fn state(&self) -> &FusionState {
        &self.state
    }

    /// Rectify an image and publish the result.
    ///
    /// A publish failure is logged and does not fail the call.
    pub fn on_image(&mut self, msg: &RawImage) -> Result<(), NodeError> {
        log::debug!(
            "Image {} received: {}x{} {}",
            msg.header.seq,
            msg.width,
            msg.height,
            msg.encoding
        );

        let rectified = self.state.handle_image(msg)?;
        if let Err(e) = self.image_publisher.publish(&rectified) {
            log::error!("Failed to publish rectified image: {}", e);
        }
        Ok(())
    }

    /// Colour a cloud and publish the result.
    pub fn on_cloud(&mut self, msg: &PointCloudMessage) {
        log::debug!(
            "Cloud {} received: {} points",
            msg.header.seq,
            msg.cloud.len()
        );

        let coloured = self.state.handle_cloud(msg);
        if let Err(e) = self.cloud_publisher.publish(&coloured) {
            log::error!("Failed to publish coloured cloud: {}", e);
        }
    }

    /// Dispatch messages until shutdown or until both inputs are closed.
    ///
    /// A malformed image stops the node with its error.
    pub async fn run(
        mut self,
        mut images: mpsc::Receiver<RawImage>,
        mut clouds: mpsc::Receiver<PointCloudMessage>,
        shutdown_tx: watch::Sender<()>,
    ) -> Result<Self, NodeError> {
        let mut shutdown_rx = shutdown_tx.subscribe();

        log::info!("Fusion node started");

        let (mut images_open, mut clouds_open) = (true, true);

        while images_open || clouds_open {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => break,

                msg = images.recv(), if images_open => match msg {
                    Some(msg) => {
                        if let Err(e) = self.on_image(&msg) {
                            log::error!("Failed to rectify image {}: {}", msg.header.seq, e);
                            return Err(e);
                        }
                    }
                    None => images_open = false,
                },

                msg = clouds.recv(), if clouds_open => match msg {
                    Some(msg) => self.on_cloud(&msg),
                    None => clouds_open = false,
                },
            }
        }

        log::info!("Fusion node stopped");
        Ok(self)
    }
}
