/// Identifies one issued request so its response can be matched against the
/// slice state it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    seq: u64,
}

impl Ticket {
    pub fn epoch(self) -> Epoch {
        Epoch(self.epoch)
    }
}

/// Reset generation a multi-step operation started in. Follow-up requests
/// are only issued while it is still the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch(u64);

/// Request generation bookkeeping for one slice.
///
/// Only the most recently issued request of the current epoch may apply its
/// response. Invalidating bumps the epoch so nothing issued before can land.
#[derive(Debug, Default, Clone)]
pub struct RequestTracker {
    epoch: u64,
    last_issued: u64,
}

impl RequestTracker {
    pub fn issue(&mut self) -> Ticket {
        self.last_issued += 1;
        Ticket {
            epoch: self.epoch,
            seq: self.last_issued,
        }
    }

    /// Issues a follow-up ticket unless a reset happened since `origin`.
    pub fn issue_in(&mut self, origin: Epoch) -> Option<Ticket> {
        (origin == self.epoch()).then(|| self.issue())
    }

    pub fn epoch(&self) -> Epoch {
        Epoch(self.epoch)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.epoch == self.epoch && ticket.seq == self.last_issued
    }

    /// True while no reset happened since `ticket` was issued, even if newer
    /// requests were issued after it.
    pub fn same_epoch(&self, ticket: Ticket) -> bool {
        ticket.epoch == self.epoch
    }

    pub fn invalidate(&mut self) {
        self.epoch += 1;
    }
}
