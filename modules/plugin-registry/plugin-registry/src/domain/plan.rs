//! Plan classification and billing arithmetic.
//!
//! The free/trial/paid decision is a closed tagged union so the lifecycle
//! manager handles every case exhaustively instead of re-checking boolean
//! flags at each call site.

use chrono::{DateTime, Duration, Months, Utc};
use plugin_registry_sdk::models::{BillingPeriod, Plan};

/// Fallback trial length in days when a trial plan does not specify one.
pub const DEFAULT_TRIAL_DAYS: i32 = 7;

/// Classification of a plan for lifecycle purposes.
///
/// Precedence: a free plan is free even if trial flags are set; a trial plan
/// is a trial even if a billing period is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    Free,
    Trial { days: i32 },
    Paid { period: BillingPeriod },
}

impl PlanKind {
    /// Classify a catalog plan. `default_trial_days` supplies the trial
    /// length when the plan carries none.
    #[must_use]
    pub fn of(plan: &Plan, default_trial_days: i32) -> Self {
        if plan.is_free {
            Self::Free
        } else if plan.has_trial {
            Self::Trial {
                days: plan.trial_days.unwrap_or(default_trial_days),
            }
        } else {
            Self::Paid {
                period: plan.billing_period,
            }
        }
    }
}

/// End of the billing period that starts at `start`.
///
/// One-time purchases get a 99-year horizon, effectively unbounded.
/// Usage-based plans settle monthly, which is also the fallback cadence.
#[must_use]
pub fn billing_period_end(start: DateTime<Utc>, period: BillingPeriod) -> DateTime<Utc> {
    match period {
        BillingPeriod::Daily => start + Duration::days(1),
        BillingPeriod::Weekly => start + Duration::days(7),
        BillingPeriod::Monthly | BillingPeriod::UsageBased => start + Months::new(1),
        BillingPeriod::Quarterly => start + Months::new(3),
        BillingPeriod::Yearly => start + Months::new(12),
        BillingPeriod::OneTime => start + Months::new(99 * 12),
    }
}

/// End of a trial that starts at `start`.
#[must_use]
pub fn trial_end(start: DateTime<Utc>, days: i32) -> DateTime<Utc> {
    start + Duration::days(i64::from(days.max(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn plan(is_free: bool, has_trial: bool, period: BillingPeriod) -> Plan {
        let now = Utc::now();
        Plan {
            id: Uuid::new_v4(),
            plugin_id: Uuid::new_v4(),
            name: "test".to_owned(),
            billing_period: period,
            is_free,
            has_trial,
            trial_days: None,
            has_limitations: false,
            limitations: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn free_flag_wins_over_trial_and_period() {
        let p = plan(true, true, BillingPeriod::Monthly);
        assert_eq!(PlanKind::of(&p, DEFAULT_TRIAL_DAYS), PlanKind::Free);
    }

    #[test]
    fn trial_wins_over_paid_and_defaults_days() {
        let mut p = plan(false, true, BillingPeriod::Yearly);
        assert_eq!(
            PlanKind::of(&p, DEFAULT_TRIAL_DAYS),
            PlanKind::Trial { days: 7 }
        );

        p.trial_days = Some(14);
        assert_eq!(
            PlanKind::of(&p, DEFAULT_TRIAL_DAYS),
            PlanKind::Trial { days: 14 }
        );
    }

    #[test]
    fn paid_carries_the_billing_period() {
        let p = plan(false, false, BillingPeriod::Quarterly);
        assert_eq!(
            PlanKind::of(&p, DEFAULT_TRIAL_DAYS),
            PlanKind::Paid {
                period: BillingPeriod::Quarterly
            }
        );
    }

    #[test]
    fn period_end_table() {
        let start = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();

        assert_eq!(
            billing_period_end(start, BillingPeriod::Daily),
            start + Duration::days(1)
        );
        assert_eq!(
            billing_period_end(start, BillingPeriod::Weekly),
            start + Duration::days(7)
        );
        assert_eq!(
            billing_period_end(start, BillingPeriod::Monthly),
            Utc.with_ymd_and_hms(2025, 2, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(
            billing_period_end(start, BillingPeriod::Quarterly),
            Utc.with_ymd_and_hms(2025, 4, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(
            billing_period_end(start, BillingPeriod::Yearly),
            Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(
            billing_period_end(start, BillingPeriod::OneTime),
            Utc.with_ymd_and_hms(2124, 1, 15, 12, 0, 0).unwrap()
        );
        // usage-based settles monthly
        assert_eq!(
            billing_period_end(start, BillingPeriod::UsageBased),
            Utc.with_ymd_and_hms(2025, 2, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn month_arithmetic_clamps_to_end_of_month() {
        let start = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(
            billing_period_end(start, BillingPeriod::Monthly),
            Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn trial_end_is_day_based() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(
            trial_end(start, 14),
            Utc.with_ymd_and_hms(2025, 3, 15, 9, 30, 0).unwrap()
        );
        // negative inputs never move the clock backwards
        assert_eq!(trial_end(start, -3), start);
    }
}
