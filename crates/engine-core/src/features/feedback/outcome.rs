//! `recordPackOutcome` (spec §4.I): bumps the counters a pack carries on
//! itself so later retrieval and ranking can weigh its track record.

use crate::shared::models::{ContextPack, LastOutcome};

pub fn record_pack_outcome(pack: &mut ContextPack, success: bool) {
    pack.access_count += 1;
    if success {
        pack.success_count += 1;
        pack.last_outcome = LastOutcome::Success;
    } else {
        pack.failure_count += 1;
        pack.last_outcome = LastOutcome::Failure;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::PackType;

    #[test]
    fn success_bumps_access_and_success_counters() {
        let mut pack = ContextPack::new(PackType::FunctionContext, "a.rs:f", "s", 0.5);
        record_pack_outcome(&mut pack, true);
        assert_eq!(pack.access_count, 1);
        assert_eq!(pack.success_count, 1);
        assert_eq!(pack.failure_count, 0);
        assert_eq!(pack.last_outcome, LastOutcome::Success);
    }

    #[test]
    fn failure_bumps_access_and_failure_counters() {
        let mut pack = ContextPack::new(PackType::FunctionContext, "a.rs:f", "s", 0.5);
        record_pack_outcome(&mut pack, false);
        assert_eq!(pack.access_count, 1);
        assert_eq!(pack.failure_count, 1);
        assert_eq!(pack.last_outcome, LastOutcome::Failure);
    }

    #[test]
    fn repeated_outcomes_accumulate() {
        let mut pack = ContextPack::new(PackType::FunctionContext, "a.rs:f", "s", 0.5);
        record_pack_outcome(&mut pack, true);
        record_pack_outcome(&mut pack, false);
        record_pack_outcome(&mut pack, true);
        assert_eq!(pack.access_count, 3);
        assert_eq!(pack.success_count, 2);
        assert_eq!(pack.failure_count, 1);
    }
}
