//! Producer connection: fixed-delay reconnect loop around one engine.
//!
//! The session owns the engine, the sink and the command receiver. Inbound
//! frames and operator commands are handled on the same task, so every
//! engine mutation runs to completion before the next input is looked at.

use std::time::Duration;

use canvas::engine::{Action, EngineCore};
use frames::{Interaction, decode_event, encode_interaction};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::command::Command;
use crate::config::ClientConfig;
use crate::sink::{OverlaySink, RenderedMarker, SinkEvent};
use crate::status::ConnectionStatus;

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("websocket connect failed: {0}")]
    Connect(Box<tungstenite::Error>),
    #[error("websocket error: {0}")]
    Socket(Box<tungstenite::Error>),
    #[error("connection closed with code {code}: {reason}")]
    ClosedAbnormally { code: u16, reason: String },
}

impl ClientError {
    /// Status shown to the operator for this failure.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        match self {
            Self::Connect(error) | Self::Socket(error) => {
                ConnectionStatus::Error { code: "Unknown".to_owned(), reason: Some(error.to_string()) }
            }
            Self::ClosedAbnormally { code, reason } => ConnectionStatus::Error {
                code: code.to_string(),
                reason: (!reason.is_empty()).then(|| reason.clone()),
            },
        }
    }
}

pub struct Session<S> {
    engine: EngineCore,
    sink: S,
    commands: mpsc::Receiver<Command>,
    commands_open: bool,
    status: ConnectionStatus,
}

impl<S: OverlaySink> Session<S> {
    pub fn new(engine: EngineCore, sink: S, commands: mpsc::Receiver<Command>) -> Self {
        Self { engine, sink, commands, commands_open: true, status: ConnectionStatus::Closed }
    }

    #[cfg(test)]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[cfg(test)]
    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    /// Connect, drive, wait, repeat. Never returns.
    pub async fn run(&mut self, config: &ClientConfig) {
        tracing::info!(url = %config.url, delay_ms = config.reconnect_delay.as_millis(), "starting client");
        let transform = self.engine.viewport.transform();
        self.emit(SinkEvent::Viewport { transform });
        loop {
            if let Err(error) = self.connect_once(&config.url).await {
                tracing::warn!(%error, "connection ended");
            }
            self.idle_for(config.reconnect_delay).await;
        }
    }

    /// One connection attempt, driven until the socket closes.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the connect fails, the socket errors, or
    /// the producer closes with anything other than a normal close.
    pub async fn connect_once(&mut self, url: &str) -> Result<(), ClientError> {
        self.set_status(ConnectionStatus::Connecting);
        let connect = connect_async(url);
        tokio::pin!(connect);
        let connected = loop {
            tokio::select! {
                result = &mut connect => break result,
                command = self.commands.recv(), if self.commands_open => self.apply_offline(command),
            }
        };
        let result = match connected {
            Ok((mut socket, _)) => {
                tracing::info!(url, "connected");
                self.set_status(ConnectionStatus::Connected);
                self.run_connection(&mut socket).await
            }
            Err(error) => Err(ClientError::Connect(Box::new(error))),
        };
        if let Err(error) = &result {
            self.set_status(error.status());
        }
        self.set_status(ConnectionStatus::Closed);
        result
    }

    /// Handle frames and commands until the socket closes.
    ///
    /// # Errors
    ///
    /// See [`Session::connect_once`].
    pub async fn run_connection(&mut self, socket: &mut Socket) -> Result<(), ClientError> {
        loop {
            tokio::select! {
                message = socket.next() => {
                    let Some(message) = message else {
                        return Ok(());
                    };
                    match message.map_err(|error| ClientError::Socket(Box::new(error)))? {
                        Message::Binary(bytes) => self.on_frame(&bytes),
                        Message::Close(frame) => return close_result(frame),
                        _ => {}
                    }
                }
                command = self.commands.recv(), if self.commands_open => {
                    let Some(command) = command else {
                        self.commands_open = false;
                        continue;
                    };
                    let actions = command.apply(&mut self.engine);
                    for interaction in self.present(actions) {
                        tracing::debug!(?interaction, "sending");
                        socket
                            .send(Message::Binary(encode_interaction(&interaction).into()))
                            .await
                            .map_err(|error| ClientError::Socket(Box::new(error)))?;
                    }
                }
            }
        }
    }

    /// Keep handling commands for `delay` with no socket open.
    pub async fn idle_for(&mut self, delay: Duration) {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                () = &mut sleep => return,
                command = self.commands.recv(), if self.commands_open => self.apply_offline(command),
            }
        }
    }

    /// Apply a command while no socket is open. `None` means input has ended.
    fn apply_offline(&mut self, command: Option<Command>) {
        let Some(command) = command else {
            self.commands_open = false;
            return;
        };
        let actions = command.apply(&mut self.engine);
        let dropped = self.present(actions);
        if !dropped.is_empty() {
            tracing::debug!(count = dropped.len(), "not connected; dropping interactions");
        }
    }

    fn on_frame(&mut self, bytes: &[u8]) {
        match decode_event(bytes) {
            Ok(event) => {
                let actions = self.engine.apply_event(event);
                self.present(actions);
            }
            Err(error) => tracing::warn!(%error, len = bytes.len(), "dropping frame"),
        }
    }

    /// Push engine actions to the sink; returns the interactions to send.
    fn present(&mut self, actions: Vec<Action>) -> Vec<Interaction> {
        let mut outbound = Vec::new();
        let mut redraw_markers = false;
        let mut redraw_draft = false;

        for action in actions {
            match action {
                Action::Send(interaction) => outbound.push(interaction),
                Action::SetCursor(cursor) => self.emit(SinkEvent::Cursor { cursor }),
                Action::RedrawMarkers => redraw_markers = true,
                Action::RedrawDraft => redraw_draft = true,
                Action::ViewportChanged(transform) => {
                    self.emit(SinkEvent::Viewport { transform });
                    redraw_markers = true;
                    redraw_draft = true;
                }
            }
        }

        let release = self.engine.release;
        if redraw_markers {
            let markers = self.engine.annotations().into_iter().map(|a| RenderedMarker::new(a, release)).collect();
            self.emit(SinkEvent::Overlay { markers });
        }
        if redraw_draft {
            let marker = self.engine.draft_annotation().map(|a| RenderedMarker::new(a, release));
            self.emit(SinkEvent::Draft { marker });
        }
        outbound
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.status == status {
            return;
        }
        let text = status.text();
        self.status = status;
        self.emit(SinkEvent::Status { text });
    }

    fn emit(&mut self, event: SinkEvent) {
        if let Err(error) = self.sink.emit(event) {
            tracing::warn!(%error, "sink write failed");
        }
    }
}

fn close_result(frame: Option<CloseFrame>) -> Result<(), ClientError> {
    match frame {
        None => Ok(()),
        Some(frame) if frame.code == CloseCode::Normal => Ok(()),
        Some(frame) => Err(ClientError::ClosedAbnormally { code: frame.code.into(), reason: frame.reason.as_str().to_owned() }),
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
