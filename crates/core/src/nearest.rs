//! Nearest-entity lookup over agents and accounts.

use crate::entity::{Account, Agent, EntityRef};
use crate::geo::{distance_km, GeoPoint};

/// Find the entity closest to `point`, if it lies strictly within
/// `threshold_km`.
///
/// Agents are scanned before accounts, each in the order given. The running
/// minimum only moves on a strictly smaller distance, so on ties the earliest
/// candidate wins. A NaN distance never becomes the minimum.
pub fn find_nearest<'a>(
    point: GeoPoint,
    agents: impl IntoIterator<Item = &'a Agent>,
    accounts: impl IntoIterator<Item = &'a Account>,
    threshold_km: f64,
) -> Option<EntityRef> {
    let candidates = agents
        .into_iter()
        .map(|a| (EntityRef::agent(a.id.clone()), a.position()))
        .chain(
            accounts
                .into_iter()
                .map(|a| (EntityRef::account(a.id.clone()), a.position())),
        );

    let mut best: Option<(EntityRef, f64)> = None;
    for (candidate, position) in candidates {
        let d = distance_km(point, position);
        match &best {
            Some((_, min)) if !(d < *min) => {}
            None if d.is_nan() => {}
            _ => best = Some((candidate, d)),
        }
    }

    best.filter(|(_, d)| *d < threshold_km).map(|(r, _)| r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, EntityKind};
    use crate::schedule::Schedule;

    fn agent(id: &str, lat: f64, lng: f64) -> Agent {
        Agent {
            id: EntityId::from(id),
            name: id.to_string(),
            lat,
            lng,
            schedule: Schedule::default(),
        }
    }

    fn account(id: &str, lat: f64, lng: f64) -> Account {
        Account {
            id: EntityId::from(id),
            name: id.to_string(),
            lat,
            lng,
            estimated_service_minutes: 60.0,
            service_window_start_min: 480.0,
            service_window_duration_min: 300.0,
            pinned_agent_id: String::new(),
            agents_available_ratio: 0.0,
            schedule: Schedule::default(),
        }
    }

    const NO_AGENTS: &[Agent] = &[];
    const NO_ACCOUNTS: &[Account] = &[];

    #[test]
    fn test_empty_candidates() {
        let found = find_nearest(GeoPoint::new(0.0, 0.0), NO_AGENTS, NO_ACCOUNTS, 10.0);
        assert!(found.is_none());
    }

    #[test]
    fn test_picks_closest() {
        let agents = vec![agent("far", 1.0, 1.0)];
        let accounts = vec![account("near", 0.001, 0.0)];
        let found = find_nearest(GeoPoint::new(0.0, 0.0), &agents, &accounts, 0.5).unwrap();
        assert_eq!(found.kind, EntityKind::Account);
        assert_eq!(found.id.as_str(), "near");
    }

    #[test]
    fn test_tie_prefers_agents_then_store_order() {
        let agents = vec![agent("a1", 0.001, 0.0), agent("a2", 0.001, 0.0)];
        let accounts = vec![account("c1", 0.001, 0.0)];
        let found = find_nearest(GeoPoint::new(0.0, 0.0), &agents, &accounts, 0.5).unwrap();
        assert_eq!(found, EntityRef::agent(EntityId::from("a1")));

        let found = find_nearest(GeoPoint::new(0.0, 0.0), NO_AGENTS, &accounts, 0.5).unwrap();
        assert_eq!(found, EntityRef::account(EntityId::from("c1")));
    }

    #[test]
    fn test_threshold_is_strict() {
        let click = GeoPoint::new(37.8, -85.0);
        let accounts = vec![account("c1", 37.8045, -85.0)];
        let d = distance_km(click, accounts[0].position());

        assert!(find_nearest(click, NO_AGENTS, &accounts, d).is_none());
        assert!(find_nearest(click, NO_AGENTS, &accounts, d + 1e-9).is_some());
    }

    #[test]
    fn test_half_kilometre_boundary() {
        // Points due north of the click at just under and just over 0.5 km.
        let click = GeoPoint::new(0.0, 0.0);
        let deg_per_km = 180.0 / (std::f64::consts::PI * crate::geo::EARTH_RADIUS_KM);

        let inside = vec![agent("in", 0.499999 * deg_per_km, 0.0)];
        assert!(find_nearest(click, &inside, NO_ACCOUNTS, 0.5).is_some());

        let outside = vec![agent("out", 0.500001 * deg_per_km, 0.0)];
        assert!(find_nearest(click, &outside, NO_ACCOUNTS, 0.5).is_none());
    }

    #[test]
    fn test_nan_candidate_is_skipped() {
        let agents = vec![agent("bad", f64::NAN, 0.0), agent("ok", 0.001, 0.0)];
        let found = find_nearest(GeoPoint::new(0.0, 0.0), &agents, NO_ACCOUNTS, 0.5).unwrap();
        assert_eq!(found.id.as_str(), "ok");
    }
}
