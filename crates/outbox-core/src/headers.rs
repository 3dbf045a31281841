//! Reserved header keys used while a message travels through the outbox.

/// Header carrying the intended recipient address while the message sits in
/// outbox storage. Set by the send interceptor, stripped by the processor
/// before the final forward.
pub const RECIPIENT: &str = "outbox-recipient";
