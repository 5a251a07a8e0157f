//! Host call dispatch.
//!
//! [`invoke`] encodes a request, performs the call, decodes the response
//! envelope and classifies its status. The outcome is either a complete
//! value, a partial value together with the error describing why it is
//! partial, or a composed [`HostCallError`].
//!
//! Capabilities without a response envelope (functions, metrics, logging)
//! use [`invoke_raw`], where any transport error is fatal.

use prost::Message;
use tracing::{debug, warn};

use crate::envelope::Envelope;
use crate::error::{Cause, ErrorComposer, HostCallError};
use crate::host::{CallAddress, HostCall, HostReply};
use crate::status::HostStatus;

/// How a transport error is weighed against a decodable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportPolicy {
    /// Any transport error fails the call, whatever the response says.
    #[default]
    FailFast,
    /// A decodable response with a success status wins over a transport
    /// error; a partial status is still delivered as partial.
    HonorStatus,
}

/// A value returned by the host.
#[derive(Debug)]
pub enum Reply<T> {
    /// The call fully succeeded.
    Complete(T),
    /// The host returned usable but incomplete data.
    Partial(T, HostCallError),
}

impl<T> Reply<T> {
    /// Transform the carried value, keeping the partial error.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Self::Complete(value) => Reply::Complete(f(value)),
            Self::Partial(value, error) => Reply::Partial(f(value), error),
        }
    }

    /// Split into the value and the partial error, if any.
    pub fn into_parts(self) -> (T, Option<HostCallError>) {
        match self {
            Self::Complete(value) => (value, None),
            Self::Partial(value, error) => (value, Some(error)),
        }
    }

    /// Whether the host reported a partial result.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial(..))
    }
}

/// Encode `request`, call the host at `address` and dispatch the reply.
pub fn invoke<Req, Resp>(
    host: &dyn HostCall,
    address: &CallAddress,
    request: &Req,
    policy: TransportPolicy,
) -> Result<Reply<Resp>, HostCallError>
where
    Req: Message,
    Resp: Envelope,
{
    let payload = request.encode_to_vec();
    debug!(address = %address, len = payload.len(), "Invoking host call");
    let reply = host.call(address, &payload);
    dispatch(address, reply, policy)
}

/// Call the host with a raw payload and return the raw response.
pub fn invoke_raw(
    host: &dyn HostCall,
    address: &CallAddress,
    payload: &[u8],
) -> Result<Vec<u8>, HostCallError> {
    debug!(address = %address, len = payload.len(), "Invoking raw host call");
    let reply = host.call(address, payload);
    match reply.error {
        Some(error) => {
            warn!(address = %address, error = %error, "Host call failed");
            Err(HostCallError::from_transport(error))
        }
        None => Ok(reply.payload),
    }
}

/// Decode and classify a raw host reply.
pub fn dispatch<Resp>(
    address: &CallAddress,
    reply: HostReply,
    policy: TransportPolicy,
) -> Result<Reply<Resp>, HostCallError>
where
    Resp: Envelope,
{
    let HostReply { payload, error } = reply;
    if let Some(error) = &error {
        warn!(address = %address, error = %error, "Host call reported a transport error");
    }
    let transport_failed = error.is_some();
    let composer = ErrorComposer::new(error);

    if transport_failed && payload.is_empty() {
        composer.clone().finish()?;
    }

    let response = match Resp::decode(payload.as_slice()) {
        Ok(response) => response,
        Err(e) => return Err(composer.fail(Cause::decode(e.to_string()))),
    };

    let Some(status) = response.status() else {
        return Err(composer.fail(Cause::response_invalid("response carries no status")));
    };
    let code = status.code;
    let text = status.status.clone();
    let class = HostStatus::classify(code);
    debug!(address = %address, code, status = %text, "Host call returned");

    match class {
        HostStatus::Success => {
            if policy == TransportPolicy::FailFast {
                composer.finish()?;
            }
            Ok(Reply::Complete(response))
        }
        HostStatus::Partial => {
            let error = composer.fail(Cause::partial(code, text));
            if transport_failed && policy == TransportPolicy::FailFast {
                Err(error)
            } else {
                Ok(Reply::Partial(response, error))
            }
        }
        HostStatus::BadInput | HostStatus::NotFound | HostStatus::ServerError => {
            Err(composer.fail(Cause::host_error(code, text)))
        }
        HostStatus::Unknown(code) => Err(composer.fail(Cause::response_invalid(format!(
            "unexpected host status code {code}"
        )))),
    }
}
