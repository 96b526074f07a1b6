use std::fmt;

/// Where a discovery flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Idle,
    ImageAcquired,
    Analyzing,
    Analyzed,
    Searching,
    Searched,
    Saving,
    Saved,
}

impl FlowPhase {
    pub fn name(&self) -> &'static str {
        match self {
            FlowPhase::Idle => "idle",
            FlowPhase::ImageAcquired => "image acquired",
            FlowPhase::Analyzing => "analyzing",
            FlowPhase::Analyzed => "analyzed",
            FlowPhase::Searching => "searching",
            FlowPhase::Searched => "searched",
            FlowPhase::Saving => "saving",
            FlowPhase::Saved => "saved",
        }
    }

    /// A collaborator request is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            FlowPhase::Analyzing | FlowPhase::Searching | FlowPhase::Saving
        )
    }

    /// `Analyzed` or any settled phase after it.
    pub fn has_analysis(&self) -> bool {
        matches!(
            self,
            FlowPhase::Analyzed | FlowPhase::Searched | FlowPhase::Saved
        )
    }
}

impl fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind of collaborator request a ticket was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Analyze,
    Search,
    Save,
}

impl RequestKind {
    pub fn name(&self) -> &'static str {
        match self {
            RequestKind::Analyze => "analyze",
            RequestKind::Search => "search",
            RequestKind::Save => "save",
        }
    }

    pub(crate) fn in_flight_phase(&self) -> FlowPhase {
        match self {
            RequestKind::Analyze => FlowPhase::Analyzing,
            RequestKind::Search => FlowPhase::Searching,
            RequestKind::Save => FlowPhase::Saving,
        }
    }
}

/// Issued when a request starts; its response must be handed back with it.
/// Responses carrying an outdated generation are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub(crate) generation: u64,
    pub(crate) kind: RequestKind,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// Reserved before an image is acquired. Only the most recent selection's
/// image is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket(pub(crate) u64);

/// What happened to a response handed back to the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer image was selected after the request started.
    Discarded,
}
