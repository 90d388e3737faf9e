use spe_core::{Anchor, Schedule, ScheduleType};

/// Which schedules are shown. An entity is visible when both its anchor day
/// and its schedule type are switched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityFilter {
    days: [bool; 5],
    policies: Vec<ScheduleType>,
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self {
            days: [true; 5],
            policies: vec![ScheduleType::Weekly],
        }
    }
}

impl VisibilityFilter {
    pub fn day_enabled(&self, day: Anchor) -> bool {
        self.days[day.index() as usize]
    }

    pub fn policy_enabled(&self, policy: ScheduleType) -> bool {
        self.policies.contains(&policy)
    }

    /// Flip a day toggle and return its new state.
    pub fn toggle_day(&mut self, day: Anchor) -> bool {
        let slot = &mut self.days[day.index() as usize];
        *slot = !*slot;
        *slot
    }

    /// Flip a schedule-type toggle and return its new state.
    pub fn toggle_policy(&mut self, policy: ScheduleType) -> bool {
        if let Some(pos) = self.policies.iter().position(|p| *p == policy) {
            self.policies.remove(pos);
            false
        } else {
            self.policies.push(policy);
            true
        }
    }

    pub fn matches(&self, schedule: &Schedule) -> bool {
        self.day_enabled(schedule.anchor) && self.policy_enabled(schedule.kind)
    }

    pub fn enabled_days(&self) -> Vec<Anchor> {
        Anchor::all().iter().copied().filter(|d| self.day_enabled(*d)).collect()
    }

    pub fn enabled_policies(&self) -> Vec<ScheduleType> {
        ScheduleType::all()
            .iter()
            .copied()
            .filter(|p| self.policy_enabled(*p))
            .collect()
    }
}
