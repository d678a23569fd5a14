use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use imagechat_config::{load as load_config, AppConfig};
use imagechat_messages::{
    receive_events, CallbackHandler, ConversationTarget, ImageDelivered, ImageFile,
    ImageMessageSubmitter,
};
use imagechat_runtime::{shutdown_signal, telemetry, ClientSession, FrameStream};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "imagechat")]
#[command(about = "Send and receive chat images over an open WebSocket")]
struct Cli {
    /// Override the channel URL from configuration
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an image to a private chat
    SendPrivate {
        #[arg(long)]
        chat_id: String,
        /// Username of the receiver
        #[arg(long = "to")]
        receiver_username: String,
        #[command(flatten)]
        image: ImageArgs,
    },
    /// Send an image to a group
    SendGroup {
        #[arg(long)]
        group_id: String,
        #[command(flatten)]
        image: ImageArgs,
    },
    /// Print incoming image and error events until Ctrl+C
    Listen,
}

#[derive(Args)]
struct ImageArgs {
    /// Image file to send
    file: PathBuf,
    #[arg(long)]
    caption: Option<String>,
    /// Keep listening for the server's reply after sending
    #[arg(long)]
    follow: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let cli = Cli::parse();
    let mut config = load_config().context("failed to load configuration")?;
    if let Some(url) = cli.url {
        config.channel.url = url;
    }

    match cli.command {
        Commands::SendPrivate {
            chat_id,
            receiver_username,
            image,
        } => {
            let target = ConversationTarget::private(chat_id, receiver_username);
            send(&config, target, image).await
        }
        Commands::SendGroup { group_id, image } => {
            send(&config, ConversationTarget::group(group_id), image).await
        }
        Commands::Listen => {
            let session = ClientSession::connect(&config.channel)
                .await
                .context("failed to open chat channel")?;
            // Holding the channel keeps the writer, and so the socket, open.
            let (_channel, frames, _writer) = session.into_parts();
            listen(&config, frames).await;
            Ok(())
        }
    }
}

async fn send(config: &AppConfig, target: ConversationTarget, args: ImageArgs) -> anyhow::Result<()> {
    let file = ImageFile::open(&args.file)
        .await
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    let submitter = ImageMessageSubmitter::new(config.upload.clone());
    // Validate before connecting so a bad pick never opens a socket.
    submitter
        .validate(&file)
        .with_context(|| format!("cannot send {}", args.file.display()))?;

    let session = ClientSession::connect(&config.channel)
        .await
        .context("failed to open chat channel")?;
    let (channel, frames, writer) = session.into_parts();

    let envelope = submitter
        .send_image(&channel, target, args.caption.as_deref(), &file)
        .await
        .context("failed to send image")?;

    println!(
        "Sent {} ({} bytes) as {}",
        file.name(),
        file.size(),
        envelope.type_name()
    );

    if args.follow {
        listen(config, frames).await;
    }

    drop(channel);
    writer.await.context("websocket writer task failed")?;

    Ok(())
}

async fn listen(config: &AppConfig, frames: FrameStream) {
    let assets = config.assets.clone();
    let handler = CallbackHandler::new(
        move |delivered: &ImageDelivered| {
            if !delivered.is_served_from(&assets) {
                warn!(url = %delivered.image_url, "image served from unexpected host");
            }
            println!(
                "[{}] {}: {} {}",
                delivered.sent_at,
                delivered.sender.display_name(),
                delivered.image_url,
                delivered.caption.as_deref().unwrap_or_default()
            );
        },
        |message: &str| eprintln!("server error: {message}"),
    );

    info!("listening for image events");
    tokio::select! {
        dispatched = receive_events(frames, &handler) => {
            info!(dispatched, "chat channel closed");
        }
        _ = shutdown_signal() => {}
    }
}
