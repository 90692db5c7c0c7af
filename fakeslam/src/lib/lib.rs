// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A stand-in for a mapping process that serves the restart procedure.
//!
//! Restoring a checkpoint here only means extracting its archive into a state
//! directory. It exists so that `restarter` can be exercised end-to-end
//! without a real mapping engine.

pub mod config;
pub mod proto;
pub mod restore;
pub mod zip;
