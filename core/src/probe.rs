//! # Probe Engine
//!
//! Reachability and web-port checks for the endpoints of one TM.
//!
//! The engine walks a [`ProbePlan`] computed up front. Infrastructure endpoints
//! are prerequisites: the first one that does not answer ends the TM. The
//! primary switch and every relay are independent checks, while the secondary
//! switches form a daisy chain that stops at the first silent member.
//!
//! Probing itself sits behind the [`Prober`] trait. [`SystemProber`] shells out
//! to `ping` and opens TCP connections; tests drive the engine with fakes.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use tmcheck_common::filter::{DeviceType, RunConfig};
use tmcheck_common::inventory::DeviceRecord;
use tmcheck_common::topology::Endpoint;
use tracing::{debug, trace};

use crate::diagnostics::{self, Helper, VersionCheck};

mod plan;
mod system;

pub use plan::{ProbePlan, Stage};
pub use system::{SystemProber, parse_loss};

/// Outcome of one reachability check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PingReport {
    pub reachable: bool,
    /// Packet loss in percent, only when some replies went missing.
    pub loss: Option<u8>,
}

impl PingReport {
    pub fn unreachable() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortStatus {
    Open,
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeResult {
    pub endpoint: Endpoint,
    pub reachable: bool,
    /// Web port state. `None` for ping-only endpoints and unreachable ones.
    pub port: Option<PortStatus>,
    pub loss: Option<u8>,
    pub diagnostic: Option<VersionCheck>,
    /// Whether sinks should show this result at all.
    pub visible: bool,
}

impl ProbeResult {
    /// Value of the report's `Ping_Durumu` column.
    pub fn ping_status(&self) -> &'static str {
        if self.reachable { "SUCCESS" } else { "FAILED" }
    }

    /// Value of the report's `Web_Port_Durumu` column.
    pub fn web_status(&self) -> String {
        let protocol: &str = self.endpoint.protocol.name();
        match self.port {
            None => "N/A".to_string(),
            Some(PortStatus::Open) => format!("{protocol}_OPEN"),
            Some(PortStatus::Closed) => format!("{protocol}_KAPALI (Ping Var)"),
        }
    }
}

/// Ordered results for one TM. Sinks write a report as a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordReport {
    pub record: DeviceRecord,
    pub results: Vec<ProbeResult>,
}

impl RecordReport {
    pub fn visible(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| r.visible)
    }
}

#[async_trait]
pub trait Prober: Send + Sync {
    async fn ping(&self, address: Ipv4Addr, count: u8) -> PingReport;

    async fn port_open(&self, address: Ipv4Addr, port: u16) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeOptions {
    pub ping_count: u8,
    /// Run the firmware version check on reachable switches.
    pub deep: bool,
    pub device_filter: Option<DeviceType>,
}

impl From<&RunConfig> for ProbeOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            ping_count: config.ping_count,
            deep: config.deep(),
            device_filter: config.filter.device_filter(),
        }
    }
}

pub struct ProbeEngine {
    prober: Box<dyn Prober>,
    helper: Option<Box<dyn Helper>>,
    options: ProbeOptions,
}

impl ProbeEngine {
    /// A helper that is not installed is dropped here, which disables version
    /// checks for the whole run.
    pub fn new(
        prober: Box<dyn Prober>,
        helper: Option<Box<dyn Helper>>,
        options: ProbeOptions,
    ) -> Self {
        let helper: Option<Box<dyn Helper>> = helper.filter(|h| h.is_available());
        if options.deep && helper.is_none() {
            debug!("helper not installed, version checks disabled");
        }
        Self {
            prober,
            helper,
            options,
        }
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    pub async fn probe_record(&self, record: &DeviceRecord) -> RecordReport {
        let plan: ProbePlan = ProbePlan::for_record(record, self.options.device_filter);
        let mut results: Vec<ProbeResult> = Vec::with_capacity(plan.endpoint_count());

        for stage in plan.stages {
            match stage {
                Stage::Prerequisite(endpoint) => {
                    let result: ProbeResult = self.probe_endpoint(endpoint).await;
                    let up: bool = result.reachable;
                    results.push(result);
                    if !up {
                        debug!("{}: infrastructure down, skipping devices", record.name);
                        break;
                    }
                }
                Stage::Check(endpoint) => results.push(self.probe_endpoint(endpoint).await),
                Stage::Chain(members) => {
                    for endpoint in members {
                        let result: ProbeResult = self.probe_endpoint(endpoint).await;
                        let up: bool = result.reachable;
                        results.push(result);
                        if !up {
                            break;
                        }
                    }
                }
            }
        }

        RecordReport {
            record: record.clone(),
            results,
        }
    }

    /// Probes records with at most `jobs` in flight. Reports come out in the
    /// order the records went in.
    pub fn run<'a>(
        &'a self,
        records: Vec<&'a DeviceRecord>,
        jobs: usize,
    ) -> impl Stream<Item = RecordReport> + 'a {
        stream::iter(records)
            .map(move |record| self.probe_record(record))
            .buffered(jobs.max(1))
    }

    async fn probe_endpoint(&self, endpoint: Endpoint) -> ProbeResult {
        let ping: PingReport = self
            .prober
            .ping(endpoint.address, self.options.ping_count)
            .await;
        trace!("{endpoint}: reachable={} loss={:?}", ping.reachable, ping.loss);

        let mut port: Option<PortStatus> = None;
        let mut diagnostic: Option<VersionCheck> = None;

        if ping.reachable {
            if let Some(number) = endpoint.protocol.port() {
                port = Some(if self.prober.port_open(endpoint.address, number).await {
                    PortStatus::Open
                } else {
                    PortStatus::Closed
                });
            }
            if self.options.deep && endpoint.role.is_switch() {
                if let Some(helper) = &self.helper {
                    diagnostic = Some(diagnostics::check_version(helper.as_ref(), endpoint.address).await);
                }
            }
        }

        let visible: bool = !endpoint.role.is_infrastructure()
            || !ping.reachable
            || self
                .options
                .device_filter
                .is_none_or(|t| t.matches(&endpoint.role));

        ProbeResult {
            endpoint,
            reachable: ping.reachable,
            port,
            loss: ping.loss,
            diagnostic,
            visible,
        }
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
