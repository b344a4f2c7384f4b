use crate::server::store::UserStore;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::Status;
use users_tonic_core::{
    Error,
    proto::{GetUserRequest, GetUserResponse},
};

/// Answers each inbound lookup as soon as it arrives.
///
/// Hits are sent on `resp_tx` in arrival order; unknown ids are skipped
/// without a response or an error. Returns the number of users sent once the
/// client closes its side, which ends the outbound stream normally. An
/// inbound error is logged and likewise just ends the call.
///
/// The loop stops early if the client stops listening (`resp_tx` closes) or
/// `cancel` fires during shutdown.
pub async fn relay_lookups<S>(
    store: Arc<UserStore>,
    inbound: S,
    resp_tx: mpsc::Sender<Result<GetUserResponse, Status>>,
    cancel: CancellationToken,
) -> users_tonic_core::Result<usize>
where
    S: Stream<Item = Result<GetUserRequest, Status>>,
{
    let mut inbound = std::pin::pin!(inbound);
    let mut sent = 0;

    loop {
        let next = tokio::select! {
            () = cancel.cancelled() => {
                if let Err(e) = resp_tx.send(Err(Error::ServiceShutdown.into())).await {
                    tracing::debug!("Failed to forward shutdown: {e}");
                }
                return Err(Error::ServiceShutdown);
            }
            () = resp_tx.closed() => {
                return Err(Error::ChannelError {
                    context: "Client stopped reading lookups".to_string(),
                });
            }
            next = inbound.next() => next,
        };

        match next {
            Some(Ok(GetUserRequest { id })) => match store.get(id) {
                Some(user) => {
                    tracing::debug!(id, name = %user.name, "Sending user for chat");
                    if let Err(e) = resp_tx.send(Ok(GetUserResponse { user: Some(user) })).await {
                        return Err(Error::ChannelError {
                            context: format!("Failed to forward user: {e}"),
                        });
                    }
                    sent += 1;
                }
                None => tracing::debug!(id, "User not found for chat, skipping"),
            },
            Some(Err(status)) => {
                tracing::warn!("Client stream failed mid-chat: {}", status.message());
                return Ok(sent);
            }
            None => return Ok(sent),
        }
    }
}
