// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io;

use futures::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_serde::formats::Json;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::error::ErrorMessage;

/// A protocol for receiving messages of type `R` and sending messages of type
/// `S` over a `TcpStream`.
///
/// Messages are JSON-encoded and prefixed with their length before transmission.
pub struct Proto<R, S>
where
    R: DeserializeOwned + Unpin,
    S: Serialize + Unpin,
{
    stream: tokio_serde::Framed<Framed<TcpStream, LengthDelimitedCodec>, R, S, Json<R, S>>,
}

impl<R, S> Proto<R, S>
where
    R: DeserializeOwned + Unpin,
    S: Serialize + Unpin,
{
    /// Wrap the stream for communicating via messages.
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream: tokio_serde::Framed::new(
                Framed::new(stream, LengthDelimitedCodec::new()),
                Json::default(),
            ),
        }
    }

    /// Send a message.
    pub async fn send(&mut self, msg: S) -> Result<(), ProtoError> {
        self.stream.send(msg).await.map_err(Into::into)
    }

    /// Receive a message.
    ///
    /// It is an error for the stream to close before a message arrives.
    pub async fn recv(&mut self) -> Result<R, ProtoError> {
        match self.stream.try_next().await {
            Ok(Some(msg)) => Ok(msg),
            Ok(None) => Err(ProtoError::EndOfStream),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => Err(ProtoError::Malformed(e)),
            Err(e) => Err(e.into()),
        }
    }
}

/// An error in the protocol.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// An IO error occurred.
    #[error("IO error: {}", .0)]
    Io(#[from] io::Error),

    /// A message could not be decoded.
    #[error("malformed message: {}", .0)]
    Malformed(#[source] io::Error),

    /// An error occurred on the remote side of the protocol.
    ///
    /// Due to the error being serialized across the protocol, the underlying
    /// error cannot have a cause.
    #[error("a remote error occurred: {}", .0)]
    Foreign(#[from] ErrorMessage<String>),

    /// The stream was closed unexpectedly.
    #[error("unexpected end of stream")]
    EndOfStream,
}
