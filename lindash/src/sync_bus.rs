//! Hover and viewport coordination between charts of the same group.
//!
//! The bus owns the only cross-chart mutable state. Publishing updates the
//! group state synchronously and returns the charts that must redraw, in
//! registration order; the caller schedules those redraws.

use std::collections::BTreeMap;
use std::fmt;

use crate::chart::viewport::Viewport;
use crate::model::Timestamp;

/// Identifier of a sync group.
pub type GroupId = String;

/// Identifier of a mounted chart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartId(pub String);

impl ChartId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hover time shared by a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverState {
    pub timestamp: Option<Timestamp>,
    pub origin: Option<ChartId>,
}

/// Registration handle. Holds no reference to the group itself.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    group: GroupId,
    chart: ChartId,
    key: u64,
}

impl Subscription {
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn chart(&self) -> &ChartId {
        &self.chart
    }
}

#[derive(Debug, Default)]
struct SyncGroup {
    members: Vec<(u64, ChartId)>,
    hover: HoverState,
    linked_zoom: bool,
    viewport: Option<Viewport>,
}

impl SyncGroup {
    fn others(&self, origin: &ChartId) -> Vec<ChartId> {
        self.members
            .iter()
            .filter(|(_, chart)| chart != origin)
            .map(|(_, chart)| chart.clone())
            .collect()
    }
}

/// Registry of sync groups.
#[derive(Debug, Default)]
pub struct SyncBus {
    groups: BTreeMap<GroupId, SyncGroup>,
    next_key: u64,
}

impl SyncBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn group_mut(&mut self, group: &str) -> &mut SyncGroup {
        self.groups.entry(group.to_string()).or_insert_with(|| {
            tracing::debug!(group = %group, "Created sync group");
            SyncGroup::default()
        })
    }

    /// Join `chart` to `group`, creating the group if needed.
    pub fn register(&mut self, group: &str, chart: ChartId) -> Subscription {
        self.next_key += 1;
        let key = self.next_key;
        let members = &mut self.group_mut(group).members;
        if members.iter().any(|(_, c)| *c == chart) {
            tracing::warn!(group = %group, chart = %chart, "Chart registered twice in group");
        }
        members.push((key, chart.clone()));
        tracing::debug!(group = %group, chart = %chart, members = members.len(), "Registered chart");

        Subscription {
            group: group.to_string(),
            chart,
            key,
        }
    }

    /// Leave the group; the group is dropped with its last member.
    pub fn unregister(&mut self, subscription: Subscription) {
        let Some(group) = self.groups.get_mut(&subscription.group) else {
            tracing::debug!(group = %subscription.group, "Unregister from unknown group");
            return;
        };

        let before = group.members.len();
        group.members.retain(|(key, _)| *key != subscription.key);
        if group.members.len() == before {
            tracing::debug!(chart = %subscription.chart, "Stale subscription ignored");
            return;
        }

        if group.hover.origin.as_ref() == Some(&subscription.chart) {
            group.hover = HoverState::default();
        }

        if group.members.is_empty() {
            self.groups.remove(&subscription.group);
            tracing::debug!(group = %subscription.group, "Dropped empty sync group");
        }
    }

    /// Set the group hover time; returns every member except `origin`.
    pub fn publish_hover(
        &mut self,
        group: &str,
        timestamp: Option<Timestamp>,
        origin: &ChartId,
    ) -> Vec<ChartId> {
        let group_state = self.group_mut(group);
        group_state.hover = HoverState {
            timestamp,
            origin: timestamp.map(|_| origin.clone()),
        };
        if group_state.members.len() <= 1 {
            return Vec::new();
        }
        group_state.others(origin)
    }

    /// Share a viewport change.
    ///
    /// With linked zoom every member (origin included) is returned; otherwise
    /// the change stays local and nobody is notified.
    pub fn publish_viewport(
        &mut self,
        group: &str,
        viewport: Viewport,
        origin: &ChartId,
    ) -> Vec<ChartId> {
        let group_state = self.group_mut(group);
        if !group_state.linked_zoom {
            return Vec::new();
        }
        group_state.viewport = Some(viewport);
        tracing::debug!(group = %group, chart = %origin, "Shared viewport");
        if group_state.members.len() <= 1 {
            return Vec::new();
        }
        group_state.members.iter().map(|(_, c)| c.clone()).collect()
    }

    /// Enable or disable viewport sharing for a group.
    pub fn set_linked_zoom(&mut self, group: &str, linked: bool) {
        let group_state = self.group_mut(group);
        group_state.linked_zoom = linked;
        if !linked {
            group_state.viewport = None;
        }
    }

    pub fn is_linked(&self, group: &str) -> bool {
        self.groups.get(group).is_some_and(|g| g.linked_zoom)
    }

    /// Current hover of a group (default when the group doesn't exist).
    pub fn hover(&self, group: &str) -> HoverState {
        self.groups
            .get(group)
            .map(|g| g.hover.clone())
            .unwrap_or_default()
    }

    /// Shared viewport of a linked group.
    pub fn viewport(&self, group: &str) -> Option<Viewport> {
        self.groups
            .get(group)
            .filter(|g| g.linked_zoom)
            .and_then(|g| g.viewport)
    }

    /// Members of a group in registration order.
    pub fn members(&self, group: &str) -> Vec<ChartId> {
        self.groups
            .get(group)
            .map(|g| g.members.iter().map(|(_, c)| c.clone()).collect())
            .unwrap_or_default()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeRange;

    fn ids(n: usize) -> Vec<ChartId> {
        (0..n).map(|i| ChartId::new(format!("chart-{i}"))).collect()
    }

    #[test]
    fn test_hover_fan_out_excludes_origin() {
        let mut bus = SyncBus::new();
        let charts = ids(4);
        let _subs: Vec<_> = charts
            .iter()
            .map(|c| bus.register("g", c.clone()))
            .collect();

        let notified = bus.publish_hover("g", Some(900), &charts[1]);

        assert_eq!(notified, vec![charts[0].clone(), charts[2].clone(), charts[3].clone()]);
        let hover = bus.hover("g");
        assert_eq!(hover.timestamp, Some(900));
        assert_eq!(hover.origin, Some(charts[1].clone()));
    }

    #[test]
    fn test_single_member_publish_updates_state_only() {
        let mut bus = SyncBus::new();
        let chart = ChartId::new("solo");
        let _sub = bus.register("g", chart.clone());

        assert!(bus.publish_hover("g", Some(5), &chart).is_empty());
        assert_eq!(bus.hover("g").timestamp, Some(5));
    }

    #[test]
    fn test_clear_hover() {
        let mut bus = SyncBus::new();
        let charts = ids(2);
        let _a = bus.register("g", charts[0].clone());
        let _b = bus.register("g", charts[1].clone());

        bus.publish_hover("g", Some(5), &charts[0]);
        let notified = bus.publish_hover("g", None, &charts[0]);

        assert_eq!(notified, vec![charts[1].clone()]);
        assert_eq!(bus.hover("g"), HoverState::default());
    }

    #[test]
    fn test_unknown_group_created_on_publish() {
        let mut bus = SyncBus::new();
        assert!(bus.publish_hover("new", Some(1), &ChartId::new("x")).is_empty());
        assert_eq!(bus.group_count(), 1);
        assert_eq!(bus.hover("new").timestamp, Some(1));
    }

    #[test]
    fn test_group_dropped_with_last_member() {
        let mut bus = SyncBus::new();
        let charts = ids(2);
        let a = bus.register("g", charts[0].clone());
        let b = bus.register("g", charts[1].clone());

        bus.unregister(a);
        assert_eq!(bus.members("g"), vec![charts[1].clone()]);
        bus.unregister(b);
        assert_eq!(bus.group_count(), 0);
    }

    #[test]
    fn test_unregister_clears_hover_owned_by_chart() {
        let mut bus = SyncBus::new();
        let charts = ids(2);
        let a = bus.register("g", charts[0].clone());
        let _b = bus.register("g", charts[1].clone());

        bus.publish_hover("g", Some(42), &charts[0]);
        bus.unregister(a);
        assert_eq!(bus.hover("g").timestamp, None);
    }

    #[test]
    fn test_viewport_local_unless_linked() {
        let mut bus = SyncBus::new();
        let charts = ids(3);
        let _subs: Vec<_> = charts
            .iter()
            .map(|c| bus.register("g", c.clone()))
            .collect();
        let vp = Viewport::full(TimeRange::new(0, 10));

        assert!(bus.publish_viewport("g", vp, &charts[0]).is_empty());
        assert_eq!(bus.viewport("g"), None);

        bus.set_linked_zoom("g", true);
        let notified = bus.publish_viewport("g", vp, &charts[0]);
        assert_eq!(notified, charts);
        assert_eq!(bus.viewport("g"), Some(vp));

        bus.set_linked_zoom("g", false);
        assert_eq!(bus.viewport("g"), None);
    }
}
