//! Concurrent archive-then-encrypt pipeline.

use crate::config::TgzxConfig;
use crate::error::{CoreError, CoreResult};
use crate::pipe::pipe;
use std::io::{self, Write};
use std::path::PathBuf;
use tgzx_archive::ArchiveError;
use tgzx_crypto::{CryptoError, Recipient};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Archives `paths` and encrypts the stream to `recipients` into `output`.
///
/// The archive producer and the encryption consumer run on two blocking
/// threads joined by a bounded pipe; neither side buffers the whole archive.
/// Both stages are always joined before this returns. If the returned
/// future is dropped early, the stages are cancelled at their next pipe
/// operation.
///
/// The first failure wins in this order: cancellation, then the consumer's
/// error, then the producer's. One exception to consumer-first: when the
/// consumer failed only because the producer's error came through the pipe,
/// the producer's error is returned instead, since it names the cause (the
/// offending path, for instance) while the consumer's is a generic read
/// failure.
pub async fn encrypt_paths<W>(
    paths: Vec<PathBuf>,
    recipients: Vec<Recipient>,
    output: W,
    config: &TgzxConfig,
    cancel: &CancellationToken,
) -> CoreResult<W>
where
    W: Write + Send + 'static,
{
    config.validate()?;

    let stages = cancel.child_token();
    let _abort_on_drop = stages.clone().drop_guard();
    let (mut writer, mut reader) = pipe(config.pipe_capacity, config.chunk_size, stages);

    let producer = tokio::task::spawn_blocking(move || -> CoreResult<()> {
        let created = tgzx_archive::create(&mut writer, &paths).map(|_| ());
        let signal = match &created {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::other(e.to_string())),
        };
        let closed = writer.close(signal);
        created?;
        closed.map_err(|e| CoreError::Archive(ArchiveError::Finish(e)))
    });

    let consumer = tokio::task::spawn_blocking(move || {
        let sealed = tgzx_crypto::encrypt(&mut reader, output, &recipients).and_then(|mut out| {
            out.flush()
                .map_err(|e| CryptoError::EncryptFailed(format!("flushing output: {e}")))?;
            Ok(out)
        });
        (sealed, reader.producer_failed())
    });

    let (produced, consumed) = tokio::join!(producer, consumer);
    let produced = produced.map_err(join_failed)?;
    let (sealed, producer_failed) = consumed.map_err(join_failed)?;

    if cancel.is_cancelled() && (produced.is_err() || sealed.is_err()) {
        return Err(CoreError::Cancelled);
    }
    match (sealed, produced) {
        (Err(_), Err(cause)) if producer_failed => Err(cause),
        (Err(e), _) => Err(e.into()),
        (Ok(_), Err(e)) => Err(e),
        (Ok(out), Ok(())) => {
            debug!("pipeline finished");
            Ok(out)
        }
    }
}

fn join_failed(err: JoinError) -> CoreError {
    CoreError::Task(err.to_string())
}
