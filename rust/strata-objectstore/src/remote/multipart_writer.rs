use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use strata_io::{SealingWrite, StorageProfile};

use super::{PartReceipt, RemoteObjectClient, UploadId, WriteOptions};

/// A [`SealingWrite`] that streams data into a remote multipart upload.
///
/// Appended bytes are buffered until `part_size` is reached, then uploaded as
/// the next part. `seal()` uploads the remainder as the final part and
/// completes the upload; the object becomes visible only then. Part numbers
/// start at 1 and increase strictly, and each part is uploaded before
/// `write_all` returns.
///
/// A failed request poisons the writer: the upload is aborted and every
/// following call fails.
pub struct MultipartWriter {
    client: Arc<dyn RemoteObjectClient>,
    upload: UploadId,
    part_size: usize,
    buffer: BytesMut,
    parts: Vec<PartReceipt>,
    bytes_written: u64,
    state: WriterState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Open,
    Failed,
    Sealed,
}

impl MultipartWriter {
    pub(crate) fn start(
        client: Arc<dyn RemoteObjectClient>,
        bucket: &str,
        key: &str,
        options: WriteOptions,
    ) -> std::io::Result<MultipartWriter> {
        let upload =
            client.create_multipart_upload(bucket, key, options.content_type.as_deref())?;
        log::debug!(
            "started multipart upload {} for {bucket}/{key}, part size {}",
            upload.id,
            options.part_size
        );
        Ok(MultipartWriter {
            client,
            upload,
            part_size: options.part_size,
            buffer: BytesMut::with_capacity(options.part_size.min(16 * 1024 * 1024)),
            parts: Vec::new(),
            bytes_written: 0,
            state: WriterState::Open,
        })
    }

    pub fn upload_id(&self) -> &UploadId {
        &self.upload
    }

    /// Number of parts uploaded so far.
    pub fn parts_uploaded(&self) -> usize {
        self.parts.len()
    }

    /// Total number of bytes accepted by `write_all`.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn ensure_open(&self) -> std::io::Result<()> {
        match self.state {
            WriterState::Open => Ok(()),
            WriterState::Failed => Err(std::io::Error::other(format!(
                "multipart upload {} has failed",
                self.upload.id
            ))),
            WriterState::Sealed => Err(std::io::Error::other(format!(
                "multipart upload {} is already sealed",
                self.upload.id
            ))),
        }
    }

    fn upload_part(&mut self, data: Bytes) -> std::io::Result<()> {
        let part_number = self.parts.len() as u32 + 1;
        let len = data.len();
        let receipt = self
            .client
            .upload_part(&self.upload, part_number, data)
            .map_err(|e| self.fail(e))?;
        log::debug!(
            "uploaded part {part_number} ({len} bytes) of {}/{}",
            self.upload.bucket,
            self.upload.key
        );
        self.parts.push(receipt);
        Ok(())
    }

    /// Moves the writer to the failed state and aborts the upload, passing the
    /// original error through.
    fn fail(&mut self, e: std::io::Error) -> std::io::Error {
        self.state = WriterState::Failed;
        self.abort();
        e
    }

    fn abort(&mut self) {
        self.buffer.clear();
        if let Err(e) = self.client.abort_multipart_upload(&self.upload) {
            log::warn!("failed to abort multipart upload {}: {e}", self.upload.id);
        }
    }
}

impl SealingWrite for MultipartWriter {
    fn write_all(&mut self, mut buf: &[u8]) -> std::io::Result<()> {
        self.ensure_open()?;
        self.bytes_written += buf.len() as u64;
        while !buf.is_empty() {
            let take = (self.part_size - self.buffer.len()).min(buf.len());
            self.buffer.extend_from_slice(&buf[..take]);
            buf = &buf[take..];
            if self.buffer.len() == self.part_size {
                let part = self.buffer.split().freeze();
                self.upload_part(part)?;
            }
        }
        Ok(())
    }

    fn seal(&mut self) -> std::io::Result<()> {
        self.ensure_open()?;
        if !self.buffer.is_empty() || self.parts.is_empty() {
            let part = self.buffer.split().freeze();
            self.upload_part(part)?;
        }
        self.client
            .complete_multipart_upload(&self.upload, &self.parts)
            .map_err(|e| self.fail(e))?;
        self.state = WriterState::Sealed;
        log::debug!(
            "completed multipart upload of {}/{}: {} parts, {} bytes",
            self.upload.bucket,
            self.upload.key,
            self.parts.len(),
            self.bytes_written
        );
        Ok(())
    }

    fn storage_profile(&self) -> StorageProfile {
        StorageProfile {
            min_io_size: self.part_size,
            max_io_size: self.part_size.max(StorageProfile::default().max_io_size),
        }
    }
}

impl Drop for MultipartWriter {
    fn drop(&mut self) {
        if self.state == WriterState::Open {
            log::warn!(
                "multipart upload of {}/{} dropped without seal, aborting",
                self.upload.bucket,
                self.upload.key
            );
            self.abort();
        }
    }
}
