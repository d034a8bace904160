//! Stack registry and sweep list
//!
//! The ordered stack list is the correctness mechanism of a teardown:
//! later entries may structurally depend on earlier ones being gone (a
//! network stack cannot be removed while a compute stack still references
//! its security group). The order is an explicit, static list — not a
//! dependency graph.
//!
//! Sweep entries are name/prefix patterns for ancillary resources that
//! are matched at run time rather than tracked individually.

use downstack_core::{ResourceHandle, SweepKind};

/// One ordered stack to tear down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    /// Provider-visible stack name.
    pub name: String,

    /// Topology layer, for progress output ("network", "cluster", ...).
    pub layer: String,
}

impl StackEntry {
    pub fn new(name: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer: layer.into(),
        }
    }

    pub fn handle(&self) -> ResourceHandle {
        ResourceHandle::stack(&self.name)
    }
}

/// One sweep pattern: all resources of `kind` whose names start with
/// `prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepEntry {
    pub kind: SweepKind,
    pub prefix: String,
}

impl SweepEntry {
    pub fn new(kind: SweepKind, prefix: impl Into<String>) -> Self {
        Self {
            kind,
            prefix: prefix.into(),
        }
    }
}

/// Everything one run will touch: ordered stacks first, sweep patterns
/// after.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    stacks: Vec<StackEntry>,
    sweeps: Vec<SweepEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stack(&mut self, entry: StackEntry) -> &mut Self {
        self.stacks.push(entry);
        self
    }

    pub fn add_sweep(&mut self, entry: SweepEntry) -> &mut Self {
        self.sweeps.push(entry);
        self
    }

    /// Stacks in teardown order.
    pub fn stacks(&self) -> &[StackEntry] {
        &self.stacks
    }

    pub fn sweeps(&self) -> &[SweepEntry] {
        &self.sweeps
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty() && self.sweeps.is_empty()
    }

    /// Standard layered topology for an environment: per-service compute
    /// first, then cluster, security, cache, and the network last — the
    /// reverse of provisioning order, so nothing is removed while
    /// something later still references it. Sweep patterns cover the
    /// ancillary resources the stacks leave behind.
    pub fn layered(environment: &str, services: &[String]) -> Self {
        let mut registry = Registry::new();

        for service in services {
            registry.add_stack(StackEntry::new(
                format!("{environment}-svc-{service}"),
                "service",
            ));
        }
        registry.add_stack(StackEntry::new(format!("{environment}-cluster"), "cluster"));
        registry.add_stack(StackEntry::new(format!("{environment}-security"), "security"));
        registry.add_stack(StackEntry::new(format!("{environment}-cache"), "cache"));
        registry.add_stack(StackEntry::new(format!("{environment}-network"), "network"));

        registry.add_sweep(SweepEntry::new(
            SweepKind::LogGroup,
            format!("/ecs/{environment}-"),
        ));
        registry.add_sweep(SweepEntry::new(
            SweepKind::ImageRepository,
            format!("{environment}/"),
        ));
        registry.add_sweep(SweepEntry::new(
            SweepKind::Parameter,
            format!("/{environment}/"),
        ));
        registry.add_sweep(SweepEntry::new(SweepKind::Secret, format!("{environment}/")));
        registry.add_sweep(SweepEntry::new(
            SweepKind::BucketPrefix,
            format!("{environment}/"),
        ));

        registry
    }
}
