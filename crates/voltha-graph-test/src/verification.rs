//! Verification helpers for route tables
//!
//! Checks a [`RouteTable`] against the shape a [`PonTopology`] implies:
//! two hops per route, OLT first on the way down, ONU first on the way up.

use thiserror::Error;
use voltha_graph::{Hop, RouteLookup, RouteTable};

use crate::fixtures::{PonTopology, ONU_PON_PORT, ONU_UNI_PORT};

/// Verification error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Expected route {ingress} -> {egress}, got {actual:?}")]
    MissingRoute {
        ingress: String,
        egress: String,
        actual: RouteLookup,
    },

    #[error("Route {ingress} -> {egress} has hops [{actual}], expected [{expected}]")]
    HopMismatch {
        ingress: String,
        egress: String,
        expected: String,
        actual: String,
    },

    #[error("Unexpected route between two {kind} ports: {ingress} -> {egress}")]
    UnexpectedRoute {
        kind: &'static str,
        ingress: String,
        egress: String,
    },

    #[error("Expected {expected} routes, found {actual}")]
    RouteCountMismatch { expected: usize, actual: usize },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Route table verification helper
pub struct RouteVerifier<'a> {
    table: &'a RouteTable,
}

impl<'a> RouteVerifier<'a> {
    pub fn new(table: &'a RouteTable) -> Self {
        Self { table }
    }

    /// Verify the table holds exactly `expected` routes
    pub fn assert_route_count(&self, expected: usize) -> VerifyResult<()> {
        if self.table.len() != expected {
            return Err(VerificationError::RouteCountMismatch {
                expected,
                actual: self.table.len(),
            });
        }
        Ok(())
    }

    /// Verify the route `ingress -> egress` has exactly `expected` hops
    pub fn assert_route(&self, ingress: &str, egress: &str, expected: &[Hop]) -> VerifyResult<()> {
        let lookup = self.table.lookup(ingress, egress);
        let Some(route) = lookup.route() else {
            return Err(VerificationError::MissingRoute {
                ingress: ingress.to_string(),
                egress: egress.to_string(),
                actual: lookup.clone(),
            });
        };
        if route.hops() != expected {
            return Err(VerificationError::HopMismatch {
                ingress: ingress.to_string(),
                egress: egress.to_string(),
                expected: join_hops(expected),
                actual: join_hops(route.hops()),
            });
        }
        Ok(())
    }

    /// Verify no route connects two ports of the same kind
    pub fn assert_no_same_kind_routes(&self) -> VerifyResult<()> {
        for (key, _) in self.table.iter() {
            let ingress_root = self.table.port(&key.ingress).map(|p| p.root_port);
            let egress_root = self.table.port(&key.egress).map(|p| p.root_port);
            if ingress_root.is_some() && ingress_root == egress_root {
                return Err(VerificationError::UnexpectedRoute {
                    kind: if ingress_root == Some(true) { "root" } else { "leaf" },
                    ingress: key.ingress.clone(),
                    egress: key.egress.clone(),
                });
            }
        }
        Ok(())
    }

    /// Verify both directions of every (root, leaf) pair of `topology`,
    /// skipping leaves whose index is in `excluded_onus`
    pub fn assert_topology_routes(
        &self,
        topology: &PonTopology,
        excluded_onus: &[usize],
    ) -> VerifyResult<()> {
        for (root, &nni) in topology.root_ports().iter().zip(&topology.nni_ports) {
            for (index, leaf) in topology.leaf_ports().iter().enumerate() {
                if excluded_onus.contains(&index) {
                    continue;
                }
                let Some(pon) = topology.pon_port_of(index) else {
                    continue;
                };
                let onu = topology.onu_id(index);
                self.assert_route(
                    &root.id,
                    &leaf.id,
                    &[
                        Hop::new(topology.olt_id.clone(), nni, pon),
                        Hop::new(onu.clone(), ONU_PON_PORT, ONU_UNI_PORT),
                    ],
                )?;
                self.assert_route(
                    &leaf.id,
                    &root.id,
                    &[
                        Hop::new(onu, ONU_UNI_PORT, ONU_PON_PORT),
                        Hop::new(topology.olt_id.clone(), pon, nni),
                    ],
                )?;
            }
        }
        Ok(())
    }

    /// Verify every route has its mirror image in the opposite direction
    pub fn assert_symmetric(&self) -> VerifyResult<()> {
        for (key, route) in self.table.iter() {
            let reverse = route.reversed();
            self.assert_route(&key.egress, &key.ingress, reverse.hops())?;
        }
        Ok(())
    }
}

fn join_hops(hops: &[Hop]) -> String {
    hops.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
