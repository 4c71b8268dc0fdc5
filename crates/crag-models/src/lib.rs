mod backend;
mod ndjson;
mod scripted;

pub use backend::{ByteStream, FakeBackend, HttpBackend, ProviderBackend, ProviderRequest, ProviderResponse};
pub use ndjson::ndjson_values;
pub use scripted::ScriptedChatModel;
