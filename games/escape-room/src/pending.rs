use escape_engine::RequestId;

/// State of a value produced by an asynchronous service call.
#[derive(Debug, Clone, PartialEq)]
pub enum Pending<T> {
    /// Nothing requested yet.
    Idle,
    /// Waiting for the reply tagged with this id.
    InFlight(RequestId),
    /// The reply arrived (or was replaced by its fallback).
    Ready(T),
}

impl<T> Pending<T> {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Pending::InFlight(_))
    }

    /// True if a reply tagged `id` is the one being waited for.
    pub fn awaits(&self, id: RequestId) -> bool {
        matches!(self, Pending::InFlight(current) if *current == id)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Pending::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for Pending<T> {
    fn default() -> Self {
        Pending::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn awaits_only_matching_id() {
        let p: Pending<bool> = Pending::InFlight(RequestId(3));
        assert!(p.is_in_flight());
        assert!(p.awaits(RequestId(3)));
        assert!(!p.awaits(RequestId(4)));
        assert!(p.ready().is_none());
    }

    #[test]
    fn ready_exposes_value() {
        let p = Pending::Ready("riddle");
        assert_eq!(p.ready(), Some(&"riddle"));
        assert!(!p.awaits(RequestId(1)));
        assert_eq!(Pending::<u8>::default(), Pending::Idle);
    }
}
