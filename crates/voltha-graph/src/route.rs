//! Route types and the route table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use voltha_types::LogicalPort;

/// One device traversed by a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hop {
    pub device_id: String,
    /// Physical port the flow enters the device on.
    pub ingress_port: u32,
    /// Physical port the flow leaves the device on.
    pub egress_port: u32,
}

impl Hop {
    pub fn new(device_id: impl Into<String>, ingress_port: u32, egress_port: u32) -> Self {
        Self {
            device_id: device_id.into(),
            ingress_port,
            egress_port,
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}->{}]", self.device_id, self.ingress_port, self.egress_port)
    }
}

/// Ordered physical path between two logical ports. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    hops: Vec<Hop>,
}

impl Route {
    pub fn new(hops: Vec<Hop>) -> Self {
        Self { hops }
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// The same path walked in the opposite direction.
    pub fn reversed(&self) -> Self {
        let hops = self
            .hops
            .iter()
            .rev()
            .map(|h| Hop::new(h.device_id.clone(), h.egress_port, h.ingress_port))
            .collect();
        Self { hops }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hops.iter().join(" "))
    }
}

/// Ordered pair of logical port ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    pub ingress: String,
    pub egress: String,
}

impl RouteKey {
    pub fn new(ingress: impl Into<String>, egress: impl Into<String>) -> Self {
        Self {
            ingress: ingress.into(),
            egress: egress.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.ingress, self.egress)
    }
}

/// Answer to a route query.
///
/// `NoRoute` means both logical ports are known to the table and no path
/// was installed for them (same-kind pair, or an unresolved device).
/// `NotComputed` means at least one of the ports has not been added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLookup {
    Found(Arc<Route>),
    NoRoute,
    NotComputed,
}

impl RouteLookup {
    pub fn route(&self) -> Option<&Arc<Route>> {
        match self {
            RouteLookup::Found(route) => Some(route),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, RouteLookup::Found(_))
    }
}

/// Routes for one logical device, keyed by (ingress, egress) logical port id.
///
/// Also remembers the logical ports it was computed over, and indexes routes
/// by OpenFlow port numbers for the flow layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteTable {
    routes: HashMap<RouteKey, Arc<Route>>,
    ports: HashMap<String, LogicalPort>,
    by_ofp: HashMap<(u32, u32), RouteKey>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_ports<I>(ports: I) -> Self
    where
        I: IntoIterator<Item = LogicalPort>,
    {
        Self {
            ports: ports.into_iter().map(|p| (p.id.clone(), p)).collect(),
            ..Self::default()
        }
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, ingress: &str, egress: &str) -> Option<&Arc<Route>> {
        self.routes.get(&RouteKey::new(ingress, egress))
    }

    /// Route by OpenFlow port numbers.
    pub fn get_by_ofp(&self, ingress_ofp: u32, egress_ofp: u32) -> Option<&Arc<Route>> {
        self.by_ofp
            .get(&(ingress_ofp, egress_ofp))
            .and_then(|key| self.routes.get(key))
    }

    pub fn lookup(&self, ingress: &str, egress: &str) -> RouteLookup {
        match self.get(ingress, egress) {
            Some(route) => RouteLookup::Found(Arc::clone(route)),
            None if self.ports.contains_key(ingress) && self.ports.contains_key(egress) => {
                RouteLookup::NoRoute
            }
            None => RouteLookup::NotComputed,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RouteKey, &Arc<Route>)> {
        self.routes.iter()
    }

    pub fn contains_port(&self, port_id: &str) -> bool {
        self.ports.contains_key(port_id)
    }

    pub fn port(&self, port_id: &str) -> Option<&LogicalPort> {
        self.ports.get(port_id)
    }

    pub fn ports(&self) -> impl Iterator<Item = &LogicalPort> {
        self.ports.values()
    }

    /// Known logical port with OpenFlow number `ofp_port_no`.
    pub fn port_by_ofp(&self, ofp_port_no: u32) -> Option<&LogicalPort> {
        self.ports.values().find(|p| p.ofp_port_no == ofp_port_no)
    }

    /// Returns true if `ofp_port_no` belongs to a known root logical port.
    pub fn is_root_ofp_port(&self, ofp_port_no: u32) -> bool {
        self.ports
            .values()
            .any(|p| p.root_port && p.ofp_port_no == ofp_port_no)
    }

    pub(crate) fn insert_port(&mut self, port: LogicalPort) {
        self.ports.insert(port.id.clone(), port);
    }

    pub(crate) fn insert_route(&mut self, ingress: &LogicalPort, egress: &LogicalPort, route: Arc<Route>) {
        let key = RouteKey::new(ingress.id.clone(), egress.id.clone());
        self.by_ofp
            .insert((ingress.ofp_port_no, egress.ofp_port_no), key.clone());
        self.routes.insert(key, route);
    }

    /// Drops a logical port and every route touching it.
    pub(crate) fn remove_port(&mut self, port_id: &str) -> bool {
        if self.ports.remove(port_id).is_none() {
            return false;
        }
        self.routes
            .retain(|key, _| key.ingress != port_id && key.egress != port_id);
        self.by_ofp
            .retain(|_, key| key.ingress != port_id && key.egress != port_id);
        true
    }
}

impl fmt::Display for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "routes ({}):", self.routes.len())?;
        for (key, route) in self.routes.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            writeln!(f, "  {}: {}", key, route)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> (LogicalPort, LogicalPort, Route) {
        let nni = LogicalPort::root("nni-0", "olt", 2, 1);
        let uni = LogicalPort::new("uni-0", "onu0", 2, 3);
        let route = Route::new(vec![Hop::new("olt", 2, 4), Hop::new("onu0", 1, 2)]);
        (nni, uni, route)
    }

    #[test]
    fn test_reversed_route() {
        let (_, _, route) = sample();
        assert_eq!(route.to_string(), "olt[2->4] onu0[1->2]");
        assert_eq!(route.reversed().to_string(), "onu0[2->1] olt[4->2]");
        assert_eq!(route.reversed().reversed(), route);
    }

    #[test]
    fn test_lookup_distinguishes_absent_from_unknown() {
        let (nni, uni, route) = sample();
        let mut table = RouteTable::with_ports([nni.clone(), uni.clone()]);
        table.insert_route(&nni, &uni, Arc::new(route));

        assert!(table.lookup("nni-0", "uni-0").is_found());
        assert_eq!(table.lookup("uni-0", "uni-0"), RouteLookup::NoRoute);
        assert_eq!(table.lookup("uni-0", "nni-0"), RouteLookup::NoRoute);
        assert_eq!(table.lookup("nni-0", "uni-9"), RouteLookup::NotComputed);
    }

    #[test]
    fn test_ofp_index() {
        let (nni, uni, route) = sample();
        let mut table = RouteTable::with_ports([nni.clone(), uni.clone()]);
        table.insert_route(&nni, &uni, Arc::new(route.clone()));

        assert_eq!(table.get_by_ofp(1, 3).map(|r| r.as_ref()), Some(&route));
        assert!(table.get_by_ofp(3, 1).is_none());
        assert!(table.is_root_ofp_port(1));
        assert!(!table.is_root_ofp_port(3));
    }

    #[test]
    fn test_remove_port_drops_routes() {
        let (nni, uni, route) = sample();
        let mut table = RouteTable::with_ports([nni.clone(), uni.clone()]);
        table.insert_route(&nni, &uni, Arc::new(route.clone()));
        table.insert_route(&uni, &nni, Arc::new(route.reversed()));
        assert_eq!(table.len(), 2);

        assert!(table.remove_port("uni-0"));
        assert!(!table.remove_port("uni-0"));
        assert!(table.is_empty());
        assert!(table.get_by_ofp(1, 3).is_none());
        assert_eq!(table.lookup("nni-0", "uni-0"), RouteLookup::NotComputed);
    }
}
