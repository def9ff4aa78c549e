use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LoanId, PayoffStrategy};

/// events emitted while simulating a payoff strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoffEvent {
    /// the shared extra budget starts flowing to a new loan
    TargetSelected {
        strategy: PayoffStrategy,
        month: u32,
        loan_id: LoanId,
        balance: Money,
    },
    LoanPaidOff {
        strategy: PayoffStrategy,
        month: u32,
        loan_id: LoanId,
        interest_paid: Money,
    },
    /// a paid-off loan's base payment joins the extra budget from the next month
    PaymentRolledOver {
        strategy: PayoffStrategy,
        month: u32,
        from_loan: LoanId,
        amount: Money,
        new_budget: Money,
    },
}

impl PayoffEvent {
    pub fn month(&self) -> u32 {
        match self {
            PayoffEvent::TargetSelected { month, .. }
            | PayoffEvent::LoanPaidOff { month, .. }
            | PayoffEvent::PaymentRolledOver { month, .. } => *month,
        }
    }
}

/// event store for collecting events during a simulation
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<PayoffEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: PayoffEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<PayoffEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[PayoffEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_event_store() {
        let mut store = EventStore::new();
        let loan_id = Uuid::from_u128(1);

        store.emit(PayoffEvent::TargetSelected {
            strategy: PayoffStrategy::Snowball,
            month: 1,
            loan_id,
            balance: Money::from_major(1_000),
        });
        store.emit(PayoffEvent::LoanPaidOff {
            strategy: PayoffStrategy::Snowball,
            month: 3,
            loan_id,
            interest_paid: Money::from_major(16),
        });

        assert_eq!(store.events().len(), 2);
        assert_eq!(store.events()[1].month(), 3);

        let taken = store.take_events();
        assert_eq!(taken.len(), 2);
        assert!(store.events().is_empty());
    }
}
