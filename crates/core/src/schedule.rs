//! Recurrence schedules for agents and accounts.

use serde::{Deserialize, Serialize};

/// Recurrence policy. Weeks are counted from the start of a cycle, so the
/// bi-weekly variants pick alternating weeks and the monthly variants pick a
/// single week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScheduleType {
    #[default]
    #[serde(rename = "WEEKLY")]
    Weekly,
    #[serde(rename = "BIWEEKLY_AC")]
    BiweeklyAc,
    #[serde(rename = "BIWEEKLY_BD")]
    BiweeklyBd,
    #[serde(rename = "MONTHLY_1")]
    Monthly1,
    #[serde(rename = "MONTHLY_2")]
    Monthly2,
    #[serde(rename = "MONTHLY_3")]
    Monthly3,
    #[serde(rename = "MONTHLY_4")]
    Monthly4,
}

impl ScheduleType {
    pub fn all() -> &'static [ScheduleType] {
        &[
            ScheduleType::Weekly,
            ScheduleType::BiweeklyAc,
            ScheduleType::BiweeklyBd,
            ScheduleType::Monthly1,
            ScheduleType::Monthly2,
            ScheduleType::Monthly3,
            ScheduleType::Monthly4,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Weekly => "WEEKLY",
            ScheduleType::BiweeklyAc => "BIWEEKLY_AC",
            ScheduleType::BiweeklyBd => "BIWEEKLY_BD",
            ScheduleType::Monthly1 => "MONTHLY_1",
            ScheduleType::Monthly2 => "MONTHLY_2",
            ScheduleType::Monthly3 => "MONTHLY_3",
            ScheduleType::Monthly4 => "MONTHLY_4",
        }
    }

    /// Whether the policy is active in the given week of a cycle.
    fn covers_week(&self, week: u32) -> bool {
        match self {
            ScheduleType::Weekly => true,
            ScheduleType::BiweeklyAc => week == 0 || week == 2,
            ScheduleType::BiweeklyBd => week == 1 || week == 3,
            ScheduleType::Monthly1 => week == 0,
            ScheduleType::Monthly2 => week == 1,
            ScheduleType::Monthly3 => week == 2,
            ScheduleType::Monthly4 => week == 3,
        }
    }
}

impl std::fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScheduleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        ScheduleType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("unknown schedule type '{}'", s))
    }
}

/// Weekday a schedule is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Anchor {
    #[default]
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Anchor {
    pub fn all() -> &'static [Anchor] {
        &[Anchor::Mon, Anchor::Tue, Anchor::Wed, Anchor::Thu, Anchor::Fri]
    }

    /// Day-of-week index, Monday = 0.
    pub fn index(&self) -> u32 {
        match self {
            Anchor::Mon => 0,
            Anchor::Tue => 1,
            Anchor::Wed => 2,
            Anchor::Thu => 3,
            Anchor::Fri => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::Mon => "MON",
            Anchor::Tue => "TUE",
            Anchor::Wed => "WED",
            Anchor::Thu => "THU",
            Anchor::Fri => "FRI",
        }
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Anchor::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| format!("unknown anchor day '{}'", s))
    }
}

/// A recurrence schedule. Defaults to weekly on Monday.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(rename = "type")]
    pub kind: ScheduleType,
    pub anchor: Anchor,
    /// Free-form RRULE the analysis service may expand instead of `kind`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rrule: Option<String>,
}

impl Schedule {
    pub fn new(kind: ScheduleType, anchor: Anchor) -> Self {
        Self { kind, anchor, rrule: None }
    }

    /// Day indexes in `[0, cycle_days)` on which this schedule is active.
    pub fn active_days(&self, cycle_days: u32) -> Vec<u32> {
        let anchor = self.anchor.index();
        (0..cycle_days)
            .filter(|day| day % 7 == anchor && self.kind.covers_week(day / 7))
            .collect()
    }

    pub fn is_active_on(&self, day: u32, cycle_days: u32) -> bool {
        day < cycle_days && day % 7 == self.anchor.index() && self.kind.covers_week(day / 7)
    }
}

/// Partial update for a [`Schedule`]; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulePatch {
    pub kind: Option<ScheduleType>,
    pub anchor: Option<Anchor>,
}

impl SchedulePatch {
    pub fn apply(&self, schedule: &mut Schedule) {
        if let Some(kind) = self.kind {
            schedule.kind = kind;
        }
        if let Some(anchor) = self.anchor {
            schedule.anchor = anchor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_weekly_monday() {
        let s = Schedule::default();
        assert_eq!(s.kind, ScheduleType::Weekly);
        assert_eq!(s.anchor, Anchor::Mon);
    }

    #[test]
    fn wire_names() {
        let s = Schedule::new(ScheduleType::Monthly3, Anchor::Thu);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json, serde_json::json!({"type": "MONTHLY_3", "anchor": "THU"}));

        let parsed: Schedule =
            serde_json::from_str(r#"{"type":"BIWEEKLY_AC","anchor":"FRI"}"#).unwrap();
        assert_eq!(parsed, Schedule::new(ScheduleType::BiweeklyAc, Anchor::Fri));
    }

    #[test]
    fn weekly_monday_over_four_weeks() {
        let s = Schedule::default();
        assert_eq!(s.active_days(28), vec![0, 7, 14, 21]);
    }

    #[test]
    fn biweekly_bd_wednesday() {
        let s = Schedule::new(ScheduleType::BiweeklyBd, Anchor::Wed);
        assert_eq!(s.active_days(28), vec![9, 23]);
    }

    #[test]
    fn monthly_third_friday() {
        let s = Schedule::new(ScheduleType::Monthly3, Anchor::Fri);
        assert_eq!(s.active_days(28), vec![18]);
        assert!(s.is_active_on(18, 28));
        assert!(!s.is_active_on(18, 14));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("biweekly-ac".parse::<ScheduleType>(), Ok(ScheduleType::BiweeklyAc));
        assert_eq!("tue".parse::<Anchor>(), Ok(Anchor::Tue));
        assert!("SAT".parse::<Anchor>().is_err());
    }

    #[test]
    fn patch_merges_fieldwise() {
        let mut s = Schedule::new(ScheduleType::Monthly1, Anchor::Wed);
        SchedulePatch { kind: None, anchor: Some(Anchor::Fri) }.apply(&mut s);
        assert_eq!(s, Schedule::new(ScheduleType::Monthly1, Anchor::Fri));
    }
}
