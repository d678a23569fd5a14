use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::{ImageError, ImageResult};
use crate::utils::{content_type_for_extension, sniff_image_type};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file chosen by the user, described the way a file picker reports it
#[derive(Debug, Clone)]
pub struct ImageFile {
    name: String,
    content_type: String,
    size: u64,
    source: ImageSource,
}

/// Where the contents of an [`ImageFile`] live until they are encoded
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Bytes),
}

impl ImageFile {
    /// Describe a file on disk without reading its contents.
    ///
    /// The declared content type comes from the extension; unknown extensions
    /// are declared as `application/octet-stream`.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            content_type: declared_type_for_name(&name).to_string(),
            name,
            size: metadata.len(),
            source: ImageSource::Path(path.to_path_buf()),
        })
    }

    /// Describe an in-memory file, e.g. a pasted clipboard image.
    ///
    /// The content type is sniffed from the leading bytes, then from the name.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let data = data.into();
        let content_type = sniff_image_type(&data).unwrap_or_else(|| declared_type_for_name(&name));

        Self {
            content_type: content_type.to_string(),
            size: data.len() as u64,
            name,
            source: ImageSource::Bytes(data),
        }
    }

    /// Override the declared content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Declared size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Read the full contents in a single pass
    pub async fn read_contents(&self) -> io::Result<Bytes> {
        match &self.source {
            ImageSource::Path(path) => tokio::fs::read(path).await.map(Bytes::from),
            ImageSource::Bytes(data) => Ok(data.clone()),
        }
    }
}

fn declared_type_for_name(name: &str) -> &'static str {
    Path::new(name)
        .extension()
        .and_then(|extension| extension.to_str())
        .and_then(content_type_for_extension)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// Base64 image payload with its MIME declaration, carried as a data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    mime_type: String,
    payload: String,
}

impl EncodedImage {
    /// Encode raw bytes under the given MIME type
    pub fn from_bytes(mime_type: impl Into<String>, data: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload: STANDARD.encode(data),
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` string.
    ///
    /// ```
    /// use imagechat_messages::EncodedImage;
    ///
    /// let image = EncodedImage::parse("data:image/png;base64,aGk=").unwrap();
    /// assert_eq!(image.mime_type(), "image/png");
    /// assert_eq!(image.decode().unwrap(), b"hi");
    /// ```
    pub fn parse(data_uri: &str) -> ImageResult<Self> {
        let rest = data_uri
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::invalid_data_uri("missing data: scheme"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::invalid_data_uri("missing payload separator"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| ImageError::invalid_data_uri("payload is not base64"))?;

        if mime_type.is_empty() {
            return Err(ImageError::invalid_data_uri("missing MIME type"));
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            payload: payload.to_string(),
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 text without the data URI prefix
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decode the payload back into raw bytes
    pub fn decode(&self) -> ImageResult<Vec<u8>> {
        Ok(STANDARD.decode(&self.payload)?)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.payload)
    }
}

impl std::fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}
