use tmcheck_common::filter::DeviceType;
use tmcheck_common::inventory::DeviceRecord;
use tmcheck_common::topology::{self, Endpoint, Role};

/// One step of a TM's probe pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Must answer, or the rest of the TM is skipped.
    Prerequisite(Endpoint),
    /// Probed on its own; the outcome gates nothing.
    Check(Endpoint),
    /// Probed in order until the first member fails.
    Chain(Vec<Endpoint>),
}

/// Ordered stages for one TM. Endpoints excluded by the device filter are
/// never submitted, which makes them count as passed for chain purposes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbePlan {
    pub stages: Vec<Stage>,
}

impl ProbePlan {
    pub fn for_record(record: &DeviceRecord, filter: Option<DeviceType>) -> Self {
        let wanted = |endpoint: &Endpoint| filter.is_none_or(|t| t.matches(&endpoint.role));
        let mut stages: Vec<Stage> = Vec::new();
        let mut chain: Vec<Endpoint> = Vec::new();

        for endpoint in topology::derive(record) {
            match endpoint.role {
                role if role.is_infrastructure() => stages.push(Stage::Prerequisite(endpoint)),
                Role::Switch(k) if k > 1 => {
                    if wanted(&endpoint) {
                        chain.push(endpoint);
                    }
                }
                _ => {
                    if !chain.is_empty() {
                        stages.push(Stage::Chain(std::mem::take(&mut chain)));
                    }
                    if wanted(&endpoint) {
                        stages.push(Stage::Check(endpoint));
                    }
                }
            }
        }
        if !chain.is_empty() {
            stages.push(Stage::Chain(chain));
        }

        Self { stages }
    }

    pub fn endpoint_count(&self) -> usize {
        self.stages
            .iter()
            .map(|s| match s {
                Stage::Prerequisite(_) | Stage::Check(_) => 1,
                Stage::Chain(members) => members.len(),
            })
            .sum()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
