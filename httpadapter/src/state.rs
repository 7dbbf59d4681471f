use common::proto::storage_service_client::StorageServiceClient;
use tonic::transport::{Channel, Endpoint};

#[derive(Clone)]
pub struct AppState {
    client: StorageServiceClient<Channel>,
}

impl AppState {
    pub fn new(channel: Channel) -> Self {
        Self {
            client: StorageServiceClient::new(channel),
        }
    }

    /// The connection is only established on the first call, so the gateway
    /// comes up even while the engine is unreachable.
    pub fn connect_lazy(endpoint: &Endpoint) -> Self {
        Self::new(endpoint.connect_lazy())
    }

    /// A client handle for one call. Handles share the underlying channel.
    pub fn client(&self) -> StorageServiceClient<Channel> {
        self.client.clone()
    }
}
