// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::future;
use std::net::SocketAddr;

use libslamrestart::net::{Call, Proto, Reply, RestartRequest, RestartResponse};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Spawn a service that accepts a single call and never answers it.
///
/// The returned handle resolves to the call that was received, once the
/// connection has been accepted; the connection itself is kept open.
pub async fn spawn_silent_service() -> (SocketAddr, JoinHandle<Call<RestartRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut proto = Proto::<Call<RestartRequest>, Reply<RestartResponse>>::new(stream);
        let call = proto.recv().await.unwrap();

        // Keep the connection open after this task returns.
        tokio::spawn(async move {
            let _proto = proto;
            future::pending::<()>().await;
        });

        call
    });

    (addr, handle)
}
