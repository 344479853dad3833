// chromaplay-api: Async Rust client for the Chroma REST API (v2)

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{ChromaClient, Namespace};
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{
    Collection, CreateCollectionRequest, DeleteRecordsRequest, GetRecordsRequest, GetResponse,
    Heartbeat, Include, Metadata, QueryRequest, QueryResponse, RecordsRequest,
    UpdateCollectionRequest,
};
