// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::error::Error;
use std::fmt::{Debug, Display};

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// An error that consists only of a message and no state.
///
/// Remote failures arrive as one of these, since the original error and its
/// cause chain cannot be serialized.
#[derive(Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub struct ErrorMessage<D: Debug + Display + Send + Sync + 'static>(pub D);

impl<D: Debug + Display + Send + Sync + 'static> Error for ErrorMessage<D> {}

/// The result of an operation performed on the other side of a connection.
pub type ForeignResult<T> = Result<T, ErrorMessage<String>>;

/// An extension trait for flattening errors into messages that can cross the
/// network.
pub trait ErrorExt: Error {
    /// Convert the `Error` into an [`ErrorMessage`](struct.ErrorMessage.html).
    ///
    /// Sources are appended so the remote side sees the full chain.
    fn into_error_message(&self) -> ErrorMessage<String> {
        let mut message = self.to_string();
        let mut source = self.source();

        while let Some(e) = source {
            message.push_str(": ");
            message.push_str(&e.to_string());
            source = e.source();
        }

        ErrorMessage(message)
    }
}

impl<E: Error> ErrorExt for E {}
