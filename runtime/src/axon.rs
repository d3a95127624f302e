//! # Axon: Executable Pipeline
//!
//! The `Axon` chains typed transitions into one reusable pipeline and records
//! a [`Schematic`] of the chain while it is built.
//!
//! * **Axon flows, Schematic shows**: Axon executes; Schematic describes
//! * **Builder pattern**: `Axon::start(label).then(a).then(b)`

use flowparty_core::bus::Bus;
use flowparty_core::outcome::Outcome;
use flowparty_core::schematic::{Edge, Node, NodeKind, Schematic};
use flowparty_core::transition::Transition;
use std::any::type_name;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::Instrument;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executor type for Axon steps: takes the input state and the Bus, returns
/// an `Outcome`. Shared so the Axon stays cheap to clone.
pub type Executor<In, Out, E> =
    Arc<dyn for<'a> Fn(In, &'a mut Bus) -> BoxFuture<'a, Outcome<Out, E>> + Send + Sync>;

/// Extract the final path segment of a type name.
fn type_name_of<T: ?Sized>() -> String {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// The Axon builder and runtime.
///
/// ```rust,ignore
/// let axon = Axon::<FormPayload, FormPayload, RelayError>::start("Submission")
///     .then(DeliverToRelay)
///     .then(CheckAcceptance);
///
/// let outcome = axon.execute(payload, &mut bus).await;
/// ```
pub struct Axon<In, Out, E> {
    pub schematic: Schematic,
    executor: Executor<In, Out, E>,
}

impl<In, Out, E> Clone for Axon<In, Out, E> {
    fn clone(&self) -> Self {
        Self {
            schematic: self.schematic.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<In, E> Axon<In, In, E>
where
    In: Send + 'static,
    E: Send + 'static,
{
    /// Start an identity Axon (In -> In).
    pub fn start(label: &str) -> Self {
        let mut schematic = Schematic::new(label);
        schematic.nodes.push(Node {
            id: uuid::Uuid::new_v4().to_string(),
            kind: NodeKind::Ingress,
            label: label.to_string(),
            input_type: "void".to_string(),
            output_type: type_name_of::<In>(),
        });

        let executor: Executor<In, In, E> = Arc::new(
            move |input: In, _bus: &mut Bus| -> BoxFuture<'_, Outcome<In, E>> {
                Box::pin(std::future::ready(Outcome::Next(input)))
            },
        );

        Self {
            schematic,
            executor,
        }
    }
}

impl<In, Out, E> Axon<In, Out, E>
where
    In: Send + 'static,
    Out: Send + 'static,
    E: Send + 'static,
{
    /// Chain a transition. A `Fault` from an earlier step skips it.
    pub fn then<Next, Trans>(self, transition: Trans) -> Axon<In, Next, E>
    where
        Next: Send + 'static,
        Trans: Transition<Out, Next, Error = E>,
    {
        let label = type_name_of::<Trans>();

        let Axon {
            mut schematic,
            executor: prev_executor,
        } = self;

        let node_id = uuid::Uuid::new_v4().to_string();
        let from = schematic.last_node_id().unwrap_or_default().to_string();
        schematic.nodes.push(Node {
            id: node_id.clone(),
            kind: NodeKind::Atom,
            label: label.clone(),
            input_type: type_name_of::<Out>(),
            output_type: type_name_of::<Next>(),
        });
        schematic.edges.push(Edge {
            from,
            to: node_id,
            label: Some("Next".to_string()),
        });

        let transition = Arc::new(transition);
        let next_executor: Executor<In, Next, E> = Arc::new(
            move |input: In, bus: &mut Bus| -> BoxFuture<'_, Outcome<Next, E>> {
                let prev = prev_executor.clone();
                let trans = transition.clone();
                let span = tracing::debug_span!("Node", flowparty.node = %label);

                Box::pin(async move {
                    let state = match prev(input, bus).await {
                        Outcome::Next(t) => t,
                        Outcome::Fault(e) => return Outcome::Fault(e),
                    };

                    let outcome = trans.run(state, bus).instrument(span).await;
                    tracing::trace!(outcome = outcome.kind(), "node finished");
                    outcome
                })
            },
        );

        Axon {
            schematic,
            executor: next_executor,
        }
    }

    /// Execute the Axon with the given input.
    pub async fn execute(&self, input: In, bus: &mut Bus) -> Outcome<Out, E> {
        let span = tracing::info_span!("Pipeline", flowparty.pipeline = %self.schematic.name);
        (self.executor)(input, bus).instrument(span).await
    }

    pub fn schematic(&self) -> &Schematic {
        &self.schematic
    }

    pub fn into_schematic(self) -> Schematic {
        self.schematic
    }
}
