//! gRPC service implementation for the user directory.
//!
//! This module defines [`DirectoryService`], the concrete implementation of
//! the generated [`UserService`] trait. Each of its seven calls reads or
//! writes the shared [`UserStore`]:
//!
//! - Unary CRUD (`CreateUser`, `GetUser`, `UpdateUser`, `DeleteUser`) answers
//!   inline; the store operation is the commit point.
//! - `ListUsers` snapshots the store, selects a page and hands it to a feeder
//!   task that streams it back through a bounded channel.
//! - `CreateMultipleUsers` consumes the client stream inline and replies once.
//! - `ChatWithUsers` moves the inbound stream into a relay task so requests
//!   and responses progress independently.
//!
//! Every call is admitted through the service's [`Lifecycle`], which refuses
//! work during shutdown and tracks streams still in flight.

use crate::server::{
    config::ServerConfig,
    service::{
        call::Call,
        lifecycle::{CallGuard, Lifecycle},
    },
    store::UserStore,
    streaming::{batch::create_batch, chat::relay_lookups, listing},
    telemetry::{
        increment_errors, increment_users_created, increment_users_streamed,
        record_stream_duration,
    },
};
use core::pin::Pin;
use std::{sync::Arc, time::Instant};
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tonic::{Request, Response, Status, Streaming};
use tracing::Instrument;
use users_tonic_core::{
    Error,
    proto::{
        CreateUserRequest, CreateUserResponse, DeleteUserRequest, DeleteUserResponse,
        GetUserRequest, GetUserResponse, ListUsersRequest, UpdateUserRequest, UpdateUserResponse,
        User, user_service_server::UserService,
    },
};

/// gRPC front end over a shared, in-memory [`UserStore`].
///
/// Cloning is cheap: clones share the same store and lifecycle, which is how
/// `main` keeps a handle for shutdown while tonic owns another.
#[derive(Clone)]
pub struct DirectoryService {
    config: ServerConfig,
    store: Arc<UserStore>,
    lifecycle: Arc<Lifecycle>,
}

impl DirectoryService {
    pub fn new(config: ServerConfig, store: Arc<UserStore>) -> Self {
        let lifecycle = Arc::new(Lifecycle::new(config.shutdown_timeout));
        Self {
            config,
            store,
            lifecycle,
        }
    }

    /// Initiates a graceful shutdown.
    ///
    /// New calls are refused immediately; in-flight streams get the configured
    /// timeout to finish before their feeders are cancelled.
    pub async fn shutdown(&self) {
        self.lifecycle.shutdown().await;
    }

    fn admit(&self, call: Call) -> Result<CallGuard, Status> {
        self.lifecycle.admit(call).map_err(|e| fail(call, e))
    }
}

/// Counts and logs a failed call, then converts the error for the wire.
fn fail(call: Call, err: Error) -> Status {
    increment_errors(call);
    match err {
        Error::NotFound { .. } => tracing::info!(call = call.name(), "{err}"),
        _ => tracing::warn!(call = call.name(), "{err}"),
    }
    err.into()
}

#[tonic::async_trait]
impl UserService for DirectoryService {
    type ListUsersStream = Pin<Box<dyn Stream<Item = Result<User, Status>> + Send>>;
    type ChatWithUsersStream = Pin<Box<dyn Stream<Item = Result<GetUserResponse, Status>> + Send>>;

    #[tracing::instrument(skip_all, fields(name = %req.get_ref().name))]
    async fn create_user(
        &self,
        req: Request<CreateUserRequest>,
    ) -> Result<Response<CreateUserResponse>, Status> {
        let _guard = self.admit(Call::CreateUser)?;
        let user = self
            .store
            .create(req.into_inner())
            .map_err(|e| fail(Call::CreateUser, e))?;

        increment_users_created(1);
        tracing::info!(id = user.id, "Created user: {}", user.name);

        Ok(Response::new(CreateUserResponse {
            user: Some(user),
            message: "User created successfully".to_string(),
        }))
    }

    #[tracing::instrument(skip_all, fields(id = req.get_ref().id))]
    async fn get_user(
        &self,
        req: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        let _guard = self.admit(Call::GetUser)?;
        let id = req.get_ref().id;
        let user = self
            .store
            .get(id)
            .ok_or_else(|| fail(Call::GetUser, Error::NotFound { id }))?;

        tracing::info!("Retrieved user: {}", user.name);
        Ok(Response::new(GetUserResponse { user: Some(user) }))
    }

    #[tracing::instrument(skip_all, fields(id = req.get_ref().id))]
    async fn update_user(
        &self,
        req: Request<UpdateUserRequest>,
    ) -> Result<Response<UpdateUserResponse>, Status> {
        let _guard = self.admit(Call::UpdateUser)?;
        let id = req.get_ref().id;
        let user = self
            .store
            .update(req.into_inner())
            .ok_or_else(|| fail(Call::UpdateUser, Error::NotFound { id }))?;

        tracing::info!("Updated user: {}", user.name);
        Ok(Response::new(UpdateUserResponse {
            user: Some(user),
            message: "User updated successfully".to_string(),
        }))
    }

    #[tracing::instrument(skip_all, fields(id = req.get_ref().id))]
    async fn delete_user(
        &self,
        req: Request<DeleteUserRequest>,
    ) -> Result<Response<DeleteUserResponse>, Status> {
        let _guard = self.admit(Call::DeleteUser)?;
        let id = req.get_ref().id;
        let user = self
            .store
            .remove(id)
            .ok_or_else(|| fail(Call::DeleteUser, Error::NotFound { id }))?;

        tracing::info!("Deleted user: {}", user.name);
        Ok(Response::new(DeleteUserResponse {
            message: format!("User deleted successfully: {}", user.name),
        }))
    }

    /// Streams one page of users.
    ///
    /// The page is cut from a snapshot taken when the call arrives, so later
    /// writes are not reflected in a stream already under way. The feeder
    /// holds no store lock while it waits on a slow client.
    #[tracing::instrument(skip_all, fields(
        page = req.get_ref().page,
        page_size = req.get_ref().page_size,
        department = %req.get_ref().department,
    ))]
    async fn list_users(
        &self,
        req: Request<ListUsersRequest>,
    ) -> Result<Response<Self::ListUsersStream>, Status> {
        let start = Instant::now();
        let guard = self.admit(Call::ListUsers)?;

        let page = listing::select_page(self.store.values(), req.get_ref());
        let (resp_tx, resp_rx) = mpsc::channel(self.config.stream_buffer_size);
        let pacing = self.config.list_pacing;
        let cancel = self.lifecycle.cancellation();

        let fut = async move {
            let _guard = guard;
            match listing::feed_page(page, resp_tx, pacing, cancel).await {
                Ok(sent) => {
                    increment_users_streamed(sent as u64);
                    record_stream_duration(Call::ListUsers, start.elapsed().as_millis() as f64);
                    tracing::info!("Streamed {sent} users");
                }
                Err(e) => {
                    increment_errors(Call::ListUsers);
                    tracing::warn!("ListUsers stream ended early: {e}");
                }
            }
        };
        tokio::spawn(fut.instrument(tracing::info_span!("streaming")));

        Ok(Response::new(Box::pin(ReceiverStream::new(resp_rx))))
    }

    /// Creates every user the client streams, replying once at the end.
    #[tracing::instrument(skip_all)]
    async fn create_multiple_users(
        &self,
        req: Request<Streaming<CreateUserRequest>>,
    ) -> Result<Response<CreateUserResponse>, Status> {
        let start = Instant::now();
        let _guard = self.admit(Call::CreateMultipleUsers)?;

        let outcome = create_batch(&self.store, req.into_inner(), self.lifecycle.cancellation())
            .await
            .inspect_err(|_| increment_errors(Call::CreateMultipleUsers))?;

        increment_users_created(outcome.created_count() as u64);
        record_stream_duration(
            Call::CreateMultipleUsers,
            start.elapsed().as_millis() as f64,
        );
        tracing::info!(
            "Completed batch creation of {} users",
            outcome.created_count()
        );

        Ok(Response::new(outcome.summary()))
    }

    /// Answers a stream of id lookups with the users that exist.
    #[tracing::instrument(skip_all)]
    async fn chat_with_users(
        &self,
        req: Request<Streaming<GetUserRequest>>,
    ) -> Result<Response<Self::ChatWithUsersStream>, Status> {
        let start = Instant::now();
        let guard = self.admit(Call::ChatWithUsers)?;

        let inbound = req.into_inner();
        let (resp_tx, resp_rx) = mpsc::channel(self.config.stream_buffer_size);
        let store = Arc::clone(&self.store);
        let cancel = self.lifecycle.cancellation();

        let fut = async move {
            let _guard = guard;
            match relay_lookups(store, inbound, resp_tx, cancel).await {
                Ok(sent) => {
                    increment_users_streamed(sent as u64);
                    record_stream_duration(
                        Call::ChatWithUsers,
                        start.elapsed().as_millis() as f64,
                    );
                    tracing::info!("Chat session completed after {sent} replies");
                }
                Err(e) => {
                    increment_errors(Call::ChatWithUsers);
                    tracing::warn!("Chat session ended early: {e}");
                }
            }
        };
        tokio::spawn(fut.instrument(tracing::info_span!("streaming")));

        Ok(Response::new(Box::pin(ReceiverStream::new(resp_rx))))
    }
}
