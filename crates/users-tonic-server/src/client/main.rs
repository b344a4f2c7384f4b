//! Command-line walkthrough of every call shape exposed by the user service.
//!
//! Runs, in order: unary create/get/update, a server-streamed listing of the
//! Engineering department, a client-streamed batch create, and a
//! bidirectional chat that looks up ids 1 through 5.

use clap::Parser;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tonic::{codec::CompressionEncoding, transport::Channel};
use users_tonic_core::proto::{
    CreateUserRequest, GetUserRequest, ListUsersRequest, UpdateUserRequest, UserStatus,
    user_service_client::UserServiceClient,
};

type Client = UserServiceClient<Channel>;

#[derive(Parser, Debug)]
#[command(
    name = "users-tonic-client",
    version,
    about = "Exercises the users gRPC service"
)]
struct ClientArgs {
    /// URL of a running `users-tonic-server`.
    ///
    /// Environment variable: `SERVER_URL`
    #[arg(long, env = "SERVER_URL", default_value_t = String::from("http://127.0.0.1:9090"))]
    server_url: String,

    /// Delay between messages sent on client streams, in milliseconds.
    #[arg(long, env = "SEND_DELAY_MS", default_value_t = 300)]
    send_delay_ms: u64,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = ClientArgs::parse();
    let delay = Duration::from_millis(args.send_delay_ms);

    let channel = Channel::from_shared(args.server_url.clone())?
        .connect()
        .await?;
    let mut client = UserServiceClient::new(channel)
        .send_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Zstd);

    println!("Starting gRPC client walkthrough against {}", args.server_url);
    println!("{}", "=".repeat(45));

    unary(&mut client).await?;
    server_streaming(&mut client).await?;
    client_streaming(&mut client, delay).await?;
    bidirectional(&mut client, delay).await?;

    println!("\n{}", "=".repeat(45));
    println!("All calls completed successfully!");
    Ok(())
}

async fn unary(client: &mut Client) -> anyhow::Result<()> {
    println!("\n=== Unary calls ===");

    let created = client
        .create_user(CreateUserRequest {
            name: "Alice Johnson".to_string(),
            email: "alice.johnson@example.com".to_string(),
            age: 25,
            department: "Engineering".to_string(),
        })
        .await?
        .into_inner();
    let user = created
        .user
        .ok_or_else(|| anyhow::anyhow!("CreateUser returned no user"))?;
    println!("Created user: {} with ID: {}", user.name, user.id);

    let fetched = client
        .get_user(GetUserRequest { id: user.id })
        .await?
        .into_inner();
    if let Some(fetched) = fetched.user {
        println!("Retrieved user: {}", fetched.name);
    }

    let updated = client
        .update_user(UpdateUserRequest {
            id: user.id,
            name: "Alice Johnson-Smith".to_string(),
            email: "alice.smith@example.com".to_string(),
            age: 26,
            department: "Engineering".to_string(),
            status: UserStatus::Active.into(),
        })
        .await?
        .into_inner();
    if let Some(updated) = updated.user {
        println!("Updated user: {}", updated.name);
    }

    Ok(())
}

async fn server_streaming(client: &mut Client) -> anyhow::Result<()> {
    println!("\n=== Server streaming ===");
    println!("Streaming users from Engineering department:");

    let mut stream = client
        .list_users(ListUsersRequest {
            page: 1,
            page_size: 10,
            department: "Engineering".to_string(),
        })
        .await?
        .into_inner();

    while let Some(user) = stream.next().await {
        let user = user?;
        println!("  - {} ({})", user.name, user.email);
    }

    Ok(())
}

async fn client_streaming(client: &mut Client, delay: Duration) -> anyhow::Result<()> {
    println!("\n=== Client streaming ===");

    let batch = [
        ("Bob Wilson", "bob.wilson@example.com", "Marketing"),
        ("Carol Davis", "carol.davis@example.com", "Sales"),
        ("David Brown", "david.brown@example.com", "HR"),
    ];

    let (tx, rx) = mpsc::channel(batch.len());
    let sender = tokio::spawn(async move {
        for (i, (name, email, department)) in batch.into_iter().enumerate() {
            let req = CreateUserRequest {
                name: name.to_string(),
                email: email.to_string(),
                age: 30 + i as i32,
                department: department.to_string(),
            };
            if tx.send(req).await.is_err() {
                break;
            }
            println!("Sent user creation request: {name}");
            tokio::time::sleep(delay).await;
        }
    });

    let summary = client
        .create_multiple_users(ReceiverStream::new(rx))
        .await?
        .into_inner();
    sender.await?;
    println!("Batch creation result: {}", summary.message);

    Ok(())
}

async fn bidirectional(client: &mut Client, delay: Duration) -> anyhow::Result<()> {
    println!("\n=== Bidirectional streaming ===");

    let (tx, rx) = mpsc::channel(1);
    let sender = tokio::spawn(async move {
        // Some of these ids may not exist; the server skips those.
        for id in 1..=5 {
            if tx.send(GetUserRequest { id }).await.is_err() {
                break;
            }
            println!("Requested user info for ID: {id}");
            tokio::time::sleep(delay).await;
        }
    });

    let mut replies = client
        .chat_with_users(ReceiverStream::new(rx))
        .await?
        .into_inner();

    while let Some(reply) = replies.next().await {
        if let Some(user) = reply?.user {
            println!("Received user info: {} from {}", user.name, user.department);
        }
    }
    sender.await?;
    println!("Bidirectional streaming completed");

    Ok(())
}
