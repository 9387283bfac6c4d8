use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use ragchat_stream::BoxError;

use crate::error::ClientError;
use crate::request::GenerateRequest;

/// Raw response body of a generate call, in transport-sized fragments
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// Anything that can start a streamed generation
///
/// Implementations resolve once the response head has been accepted; the
/// body is read lazily from the returned stream. Dropping the stream aborts
/// the request.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<FragmentStream, ClientError>;
}
