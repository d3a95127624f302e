use crate::bus::Bus;
use crate::outcome::Outcome;
use async_trait::async_trait;

/// The contract for a typed pipeline step.
///
/// `Transition` converts state `From` into `Outcome<To, Error>`. Resources
/// come from the `Bus`; a missing resource is a fault, not a panic.
#[async_trait]
pub trait Transition<From, To>: Send + Sync + 'static
where
    From: Send + 'static,
    To: Send + 'static,
{
    /// Domain-specific error type
    type Error: Send + Sync + 'static;

    async fn run(&self, state: From, bus: &mut Bus) -> Outcome<To, Self::Error>;
}
