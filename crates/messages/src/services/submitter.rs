//! Image message submission: validate, encode, build, submit.

use imagechat_config::UploadConfig;
use std::io;
use tracing::{debug, info};

use crate::api::MessageChannel;
use crate::entities::{EncodedImage, ImageFile};
use crate::types::{
    ConversationTarget, ImageResult, OutgoingImageMessage, ValidationError,
};
use crate::utils::Validator;

/// Check a picked file against the upload limits. Pure; touches no I/O.
pub fn validate(file: &ImageFile, config: &UploadConfig) -> Result<(), ValidationError> {
    Validator::image(file, config.max_size_bytes)
}

/// Read the file once and encode it as a data URI under its declared content type.
pub async fn encode(file: &ImageFile) -> io::Result<EncodedImage> {
    let contents = file.read_contents().await?;
    Ok(encode_contents(file, &contents))
}

fn encode_contents(file: &ImageFile, contents: &[u8]) -> EncodedImage {
    debug!(
        name = file.name(),
        content_type = file.content_type(),
        bytes = contents.len(),
        "encoded image"
    );
    EncodedImage::from_bytes(file.content_type(), contents)
}

/// Wrap an encoded image in the envelope for `target`
pub fn build_envelope(
    target: ConversationTarget,
    caption: Option<&str>,
    image: &EncodedImage,
) -> OutgoingImageMessage {
    OutgoingImageMessage::new(target, caption, image)
}

/// Hand one frame to the channel. Nothing waits for the server's echo.
pub fn submit<C>(channel: &C, envelope: &OutgoingImageMessage) -> ImageResult<()>
where
    C: MessageChannel + ?Sized,
{
    let frame = envelope.to_frame()?;
    let frame_bytes = frame.len();
    channel.send_text(frame)?;
    info!(
        message_type = envelope.type_name(),
        frame_bytes, "submitted image message"
    );
    Ok(())
}

/// Image submission bound to an explicit upload configuration
#[derive(Debug, Clone, Default)]
pub struct ImageMessageSubmitter {
    upload: UploadConfig,
}

impl ImageMessageSubmitter {
    /// Create a new submitter instance
    pub fn new(upload: UploadConfig) -> Self {
        Self { upload }
    }

    pub fn upload_config(&self) -> &UploadConfig {
        &self.upload
    }

    pub fn validate(&self, file: &ImageFile) -> Result<(), ValidationError> {
        validate(file, &self.upload)
    }

    pub async fn encode(&self, file: &ImageFile) -> io::Result<EncodedImage> {
        encode(file).await
    }

    pub fn build_envelope(
        &self,
        target: ConversationTarget,
        caption: Option<&str>,
        image: &EncodedImage,
    ) -> OutgoingImageMessage {
        build_envelope(target, caption, image)
    }

    pub fn submit<C>(&self, channel: &C, envelope: &OutgoingImageMessage) -> ImageResult<()>
    where
        C: MessageChannel + ?Sized,
    {
        submit(channel, envelope)
    }

    /// Run the whole send path and return the envelope that went out.
    ///
    /// Validation and read failures surface before any frame is sent.
    pub async fn send_image<C>(
        &self,
        channel: &C,
        target: ConversationTarget,
        caption: Option<&str>,
        file: &ImageFile,
    ) -> ImageResult<OutgoingImageMessage>
    where
        C: MessageChannel + ?Sized,
    {
        self.validate(file)?;
        let contents = file.read_contents().await?;
        // The file may have grown since it was picked; the ceiling applies to what is read.
        Validator::file_size(contents.len() as u64, self.upload.max_size_bytes)?;
        let image = encode_contents(file, &contents);
        let envelope = self.build_envelope(target, caption, &image);
        self.submit(channel, &envelope)?;
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::channel::MockMessageChannel;
    use crate::types::{ChannelError, ImageError};
    use mockall::predicate::function;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-body";

    fn png_file() -> ImageFile {
        ImageFile::from_bytes("cat.png", PNG.to_vec())
    }

    #[tokio::test]
    async fn encode_produces_data_uri_that_round_trips() {
        let image = encode(&png_file()).await.unwrap();
        assert!(image.to_data_uri().starts_with("data:image/png;base64,"));
        assert_eq!(image.decode().unwrap(), PNG);
    }

    #[tokio::test]
    async fn encode_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.png");
        std::fs::write(&path, PNG).unwrap();
        let file = ImageFile::open(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let error = encode(&file).await.unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn submit_sends_exactly_one_frame() {
        let envelope = build_envelope(
            ConversationTarget::group("g1"),
            Some("look"),
            &EncodedImage::from_bytes("image/png", PNG),
        );
        let expected = envelope.to_frame().unwrap();

        let mut channel = MockMessageChannel::new();
        channel
            .expect_send_text()
            .with(function(move |frame: &String| *frame == expected))
            .times(1)
            .returning(|_| Ok(()));

        submit(&channel, &envelope).unwrap();
    }

    #[test]
    fn submit_surfaces_channel_failures() {
        let envelope = build_envelope(
            ConversationTarget::group("g1"),
            None,
            &EncodedImage::from_bytes("image/png", PNG),
        );

        let mut channel = MockMessageChannel::new();
        channel
            .expect_send_text()
            .times(1)
            .returning(|_| Err(ChannelError::Closed));

        let error = submit(&channel, &envelope).unwrap_err();
        assert!(matches!(error, ImageError::Channel(ChannelError::Closed)));
    }

    #[tokio::test]
    async fn send_image_rejects_before_sending() {
        let submitter = ImageMessageSubmitter::new(UploadConfig { max_size_bytes: 8 });
        let mut channel = MockMessageChannel::new();
        channel.expect_send_text().never();

        let error = submitter
            .send_image(&channel, ConversationTarget::group("g1"), None, &png_file())
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            ImageError::Validation(ValidationError::TooLarge { max: 8, .. })
        ));

        let pdf = ImageFile::from_bytes("doc.pdf", b"%PDF-1.4".to_vec());
        let error = submitter
            .send_image(&channel, ConversationTarget::group("g1"), None, &pdf)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            ImageError::Validation(ValidationError::NotAnImage { .. })
        ));
    }

    #[tokio::test]
    async fn send_image_checks_the_size_of_what_it_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        std::fs::write(&path, &PNG[..]).unwrap();
        let file = ImageFile::open(&path).await.unwrap();
        std::fs::write(&path, vec![0u8; 4096]).unwrap();

        let submitter = ImageMessageSubmitter::new(UploadConfig {
            max_size_bytes: 1024,
        });
        let mut channel = MockMessageChannel::new();
        channel.expect_send_text().never();

        let error = submitter
            .send_image(&channel, ConversationTarget::group("g1"), None, &file)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            ImageError::Validation(ValidationError::TooLarge {
                size: 4096,
                max: 1024
            })
        ));
    }

    #[tokio::test]
    async fn send_image_reports_read_failures_before_sending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.png");
        std::fs::write(&path, PNG).unwrap();
        let file = ImageFile::open(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let submitter = ImageMessageSubmitter::default();
        let mut channel = MockMessageChannel::new();
        channel.expect_send_text().never();

        let error = submitter
            .send_image(&channel, ConversationTarget::private("c1", "bob"), None, &file)
            .await
            .unwrap_err();
        match error {
            ImageError::Io(error) => assert_eq!(error.kind(), io::ErrorKind::NotFound),
            other => panic!("expected an io error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_image_returns_the_submitted_envelope() {
        let submitter = ImageMessageSubmitter::default();
        let mut channel = MockMessageChannel::new();
        channel.expect_send_text().times(1).returning(|_| Ok(()));

        let envelope = submitter
            .send_image(
                &channel,
                ConversationTarget::private("c1", "bob"),
                Some("hi"),
                &png_file(),
            )
            .await
            .unwrap();

        assert_eq!(envelope.chat_id(), Some("c1"));
        assert_eq!(envelope.caption(), "hi");
        assert!(envelope.image_data().starts_with("data:image/png;base64,"));
    }
}
