// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message types exchanged between `restarter` and a mapping process.
//!
//! Every exchange is a single [`Call`][Call] naming a remote procedure,
//! answered by a single [`Reply`][Reply]. The restart procedure carries a
//! [`RestartRequest`][RestartRequest] and answers with a
//! [`RestartResponse`][RestartResponse].
//!
//! [Call]: struct.Call.html
//! [Reply]: struct.Reply.html
//! [RestartRequest]: struct.RestartRequest.html
//! [RestartResponse]: struct.RestartResponse.html

use std::convert::TryFrom;
use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ForeignResult;

/// The name of the restart procedure exposed by the mapping process.
pub const DEFAULT_RESTART_SERVICE: &str = "/husky/blam_slam/restart";

/// The path-like name of a remote procedure, e.g. `/husky/blam_slam/restart`.
#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceName(String);

impl ServiceName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ServiceName {
    fn default() -> Self {
        ServiceName(DEFAULT_RESTART_SERVICE.into())
    }
}

impl TryFrom<String> for ServiceName {
    type Error = ServiceNameError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        if name.is_empty() {
            return Err(ServiceNameError::Empty);
        }

        if !name.starts_with('/') {
            return Err(ServiceNameError::NotAbsolute(name));
        }

        for segment in name[1..].split('/') {
            if segment.is_empty() {
                return Err(ServiceNameError::EmptySegment(name.clone()));
            }

            if let Some(c) = segment
                .chars()
                .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
            {
                return Err(ServiceNameError::InvalidCharacter {
                    name: name.clone(),
                    c,
                });
            }
        }

        Ok(ServiceName(name))
    }
}

impl FromStr for ServiceName {
    type Err = ServiceNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(String::from(s))
    }
}

impl From<ServiceName> for String {
    fn from(name: ServiceName) -> String {
        name.0
    }
}

/// An error parsing a [`ServiceName`](struct.ServiceName.html).
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ServiceNameError {
    #[error("service name is empty")]
    Empty,

    #[error("service name `{}' does not begin with `/'", .0)]
    NotAbsolute(String),

    #[error("service name `{}' contains an empty segment", .0)]
    EmptySegment(String),

    #[error("service name `{}' contains invalid character `{}'", .name, .c)]
    InvalidCharacter { name: String, c: char },
}

/// A call to the remote procedure `service`.
#[derive(Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Call<Req> {
    pub service: ServiceName,
    pub request: Req,
}

/// The reply to a [`Call`](struct.Call.html).
///
/// An `Err` here means the call could not be serviced at all (e.g., the
/// procedure does not exist); procedure-level failures are part of the
/// response type.
#[derive(Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Reply<Resp> {
    pub result: ForeignResult<Resp>,
}

/// A request for the mapping process to restart from a checkpoint archive.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RestartRequest {
    /// The file name of the checkpoint archive.
    ///
    /// The archive is resolved by the mapping process, not the caller.
    pub archive_name: String,
}

/// The response to a [`RestartRequest`](struct.RestartRequest.html).
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RestartResponse {
    /// Whether the archive was found and loaded.
    pub success: bool,
}
