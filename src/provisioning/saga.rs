//! Bookkeeping for a single provisioning attempt.
//!
//! A [`Saga`] records which named steps have completed, the compensation each
//! step declared, and the state trail of the attempt. The caller performs the
//! side effects; the saga only decides what is legal and what must be undone.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaState {
    Validating,
    ReservingDomain,
    Persisting,
    Compensating,
    Committed,
    Rejected,
    Faulted,
}

impl SagaState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SagaState::Committed | SagaState::Rejected | SagaState::Faulted
        )
    }

    fn can_transition_to(self, next: SagaState) -> bool {
        use SagaState::*;
        matches!(
            (self, next),
            (Validating, ReservingDomain)
                | (Validating, Rejected)
                | (ReservingDomain, Persisting)
                | (ReservingDomain, Rejected)
                | (ReservingDomain, Faulted)
                | (Persisting, Committed)
                | (Persisting, Compensating)
                | (Compensating, Rejected)
                | (Compensating, Faulted)
        )
    }
}

/// Undo action declared by a completed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    ReleaseDomain { domain: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedStep {
    pub name: &'static str,
    pub compensation: Option<Compensation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: SagaState,
    pub to: SagaState,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "illegal saga transition {:?} -> {:?}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

#[derive(Debug)]
pub struct Saga {
    trail: Vec<SagaState>,
    completed: Vec<CompletedStep>,
}

impl Default for Saga {
    fn default() -> Self {
        Self::new()
    }
}

impl Saga {
    pub fn new() -> Self {
        Self {
            trail: vec![SagaState::Validating],
            completed: Vec::new(),
        }
    }

    pub fn state(&self) -> SagaState {
        // trail is never empty
        self.trail[self.trail.len() - 1]
    }

    pub fn trail(&self) -> &[SagaState] {
        &self.trail
    }

    pub fn completed_steps(&self) -> &[CompletedStep] {
        &self.completed
    }

    pub fn advance(&mut self, next: SagaState) -> Result<(), InvalidTransition> {
        let from = self.state();
        if !from.can_transition_to(next) {
            return Err(InvalidTransition { from, to: next });
        }
        self.trail.push(next);
        Ok(())
    }

    pub fn complete_step(&mut self, name: &'static str, compensation: Option<Compensation>) {
        self.completed.push(CompletedStep { name, compensation });
    }

    /// Compensations still owed, most recent step first. Each is handed out once.
    pub fn take_compensations(&mut self) -> Vec<(&'static str, Compensation)> {
        self.completed
            .iter_mut()
            .rev()
            .filter_map(|step| step.compensation.take().map(|c| (step.name, c)))
            .collect()
    }
}
