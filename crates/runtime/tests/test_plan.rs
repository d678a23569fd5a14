use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use imagechat_config::ChannelConfig;
use imagechat_messages::{
    receive_events, CallbackHandler, ConversationTarget, ImageDelivered, ImageFile,
    ImageMessageSubmitter, MessageChannel,
};
use imagechat_runtime::ClientSession;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

/// Accepts one client, records the first text frame it sends, then replies
/// with `replies` and closes.
async fn echo_server(replies: Vec<String>) -> Result<(String, oneshot::Receiver<String>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("ws://{}", listener.local_addr()?);
    let (received_tx, received_rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut socket) = tokio_tungstenite::accept_async(stream).await else {
            return;
        };

        while let Some(Ok(message)) = socket.next().await {
            if let Message::Text(text) = message {
                let _ = received_tx.send(text);
                break;
            }
        }

        for reply in replies {
            if socket.send(Message::Text(reply)).await.is_err() {
                return;
            }
        }
        let _ = socket.close(None).await;
    });

    Ok((url, received_rx))
}

#[tokio::test(flavor = "multi_thread")]
async fn session_submits_and_dispatches_replies() -> Result<()> {
    let delivered = json!({
        "type": "privateChat",
        "id": "c1",
        "slug": "c1",
        "sender": {"id": 5, "first_name": "Me", "last_name": "", "username": "me", "profile_url": null},
        "message_text": "hi",
        "image_url": "https://assets.example.com/chat-images/abc.webp",
        "sent_at": "2024-05-06 07:08:09"
    })
    .to_string();
    let error = json!({"type": "error", "message": "rate limited"}).to_string();

    let (url, received) = echo_server(vec![delivered, error]).await?;
    let session = ClientSession::connect(&ChannelConfig { url }).await?;
    let (channel, frames, _writer) = session.into_parts();

    let submitter = ImageMessageSubmitter::default();
    let file = ImageFile::from_bytes("cat.png", b"\x89PNG\r\n\x1a\nbody".to_vec());
    submitter
        .send_image(&channel, ConversationTarget::private("c1", "bob"), Some("hi"), &file)
        .await?;

    let frame = timeout(Duration::from_secs(5), received)
        .await
        .context("server never saw a frame")??;
    let value: Value = serde_json::from_str(&frame)?;
    assert_eq!(value["type"], "privateChat");
    assert_eq!(value["receiver_username"], "bob");

    let rendered = Arc::new(Mutex::new(Vec::new()));
    let errors = Arc::new(Mutex::new(Vec::new()));
    let render_sink = Arc::clone(&rendered);
    let error_sink = Arc::clone(&errors);
    let handler = CallbackHandler::new(
        move |delivered: &ImageDelivered| {
            render_sink.lock().unwrap().push(delivered.is_from("me"));
        },
        move |message: &str| error_sink.lock().unwrap().push(message.to_string()),
    );

    let dispatched = timeout(Duration::from_secs(5), receive_events(frames, &handler))
        .await
        .context("receive loop did not finish after close")?;

    assert_eq!(dispatched, 2);
    assert_eq!(*rendered.lock().unwrap(), vec![true]);
    assert_eq!(*errors.lock().unwrap(), vec!["rate limited".to_string()]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn connect_reports_unreachable_servers() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    drop(listener);

    let config = ChannelConfig {
        url: format!("ws://{address}"),
    };
    let error = match ClientSession::connect(&config).await {
        Ok(_) => panic!("expected connection to fail"),
        Err(error) => error,
    };
    assert!(error.to_string().contains("failed to connect"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn inbound_stream_ends_when_server_closes() -> Result<()> {
    let (url, _received) = echo_server(Vec::new()).await?;
    let session = ClientSession::connect(&ChannelConfig { url }).await?;
    let (channel, frames, _writer) = session.into_parts();

    channel.send_text("{}".to_string())?;
    // The server closes after the first frame; drain until the stream ends.
    let _: Vec<String> = timeout(Duration::from_secs(5), frames.collect())
        .await
        .context("inbound stream did not end")?;

    Ok(())
}
