use serde::{Deserialize, Serialize};

/// The explicit result of a pipeline step.
///
/// `Outcome` represents "Control Flow as Data": steps never panic or throw,
/// they return `Next` or `Fault` and the Axon decides what runs next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome<T, E> {
    /// Proceed to the next step.
    Next(T),

    /// A structural fault. Later steps are skipped.
    Fault(E),
}

impl<T, E> Outcome<T, E> {
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Outcome::Next(t) => Ok(t),
            Outcome::Fault(e) => Err(e),
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Next(_) => "Next",
            Outcome::Fault(_) => "Fault",
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(t) => Outcome::Next(t),
            Err(e) => Outcome::Fault(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_round_trip_keeps_variant() {
        let ok: Outcome<u8, &str> = Ok(3).into();
        assert_eq!(ok.kind(), "Next");
        assert_eq!(ok.into_result(), Ok(3));
    }

    #[test]
    fn fault_converts_back_to_err() {
        let out: Outcome<u8, &str> = Err("boom").into();
        assert_eq!(out.kind(), "Fault");
        assert_eq!(out.into_result(), Err("boom"));
    }
}
