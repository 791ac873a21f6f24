//! Unit tests for tod-gradient.

use rand::RngCore;

use crate::FillSlot;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Replays a fixed list of unit draws, cycling when it runs out.
///
/// Each draw is packed into the top 52 bits of a `u64`, the bits `rand`
/// keeps when sampling a float, so a weighted draw lands at `draw × total`.
struct ScriptedRng {
    draws: Vec<f64>,
    next:  usize,
}

impl ScriptedRng {
    fn new(draws: &[f64]) -> Self {
        Self { draws: draws.to_vec(), next: 0 }
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let value = self.draws[self.next % self.draws.len()];
        self.next += 1;
        ((value * (1u64 << 52) as f64) as u64) << 12
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn sums(slots: &[FillSlot]) -> Vec<f64> {
    slots.iter().map(|s| s.sum).collect()
}

#[cfg(test)]
mod distribute {
    use super::*;
    use tod_core::{AllocError, AllocWarning, RegionId};
    use crate::GradientWeightedDistributor;

    #[test]
    fn equal_weights_split_evenly() {
        let mut slots = vec![FillSlot::new(1.0), FillSlot::new(1.0)];
        let out = GradientWeightedDistributor::default().distribute(100.0, &mut slots).unwrap();
        assert_eq!(sums(&slots), vec![50.0, 50.0]);
        assert_eq!(out.distributed, 100.0);
        assert_eq!(out.shortfall, 0.0);
    }

    #[test]
    fn saturated_slot_releases_remainder() {
        let mut slots = vec![FillSlot::new(2.0).with_ceiling(30.0), FillSlot::new(1.0)];
        let out = GradientWeightedDistributor::default().distribute(100.0, &mut slots).unwrap();
        assert_eq!(sums(&slots), vec![30.0, 70.0]);
        assert_eq!(slots[0].weight, 0.0);
        assert_eq!(out.saturated, 1);
        assert_eq!(out.iterations, 2);
    }

    #[test]
    fn shortfall_when_every_slot_saturates() {
        let mut slots = vec![
            FillSlot::new(1.0).with_ceiling(10.0),
            FillSlot::new(1.0).with_ceiling(20.0),
        ];
        let out = GradientWeightedDistributor::default().distribute(50.0, &mut slots).unwrap();
        assert_eq!(sums(&slots), vec![10.0, 20.0]);
        assert_eq!(out.distributed, 30.0);
        assert_eq!(out.shortfall, 20.0);
        assert_eq!(
            out.warning(&RegionId::new("s1"), "residential"),
            Some(AllocWarning::Exhaustion {
                region:      RegionId::new("s1"),
                activity:    Some("residential".into()),
                unallocated: 20.0,
            })
        );
    }

    #[test]
    fn slot_already_over_ceiling_takes_nothing() {
        let mut slots = vec![
            FillSlot::new(5.0).with_ceiling(30.0).with_sum(40.0),
            FillSlot::new(1.0),
        ];
        let out = GradientWeightedDistributor::default().distribute(60.0, &mut slots).unwrap();
        assert_eq!(sums(&slots), vec![40.0, 20.0]);
        assert_eq!(out.distributed, 20.0);
        assert_eq!(out.shortfall, 0.0);
    }

    #[test]
    fn shares_round_up_to_unit_and_clip_to_budget() {
        let mut slots = vec![FillSlot::new(1.0), FillSlot::new(1.0), FillSlot::new(1.0)];
        let fill = GradientWeightedDistributor::new(10.0).unwrap();
        fill.distribute(50.0, &mut slots).unwrap();
        assert_eq!(sums(&slots), vec![20.0, 20.0, 10.0]);
    }

    #[test]
    fn shares_below_min_unit_drop_out() {
        let mut slots = vec![FillSlot::new(1.0), FillSlot::new(1.0), FillSlot::new(98.0)];
        let fill = GradientWeightedDistributor::default().with_min_unit(5.0);
        let out = fill.distribute(100.0, &mut slots).unwrap();
        assert_eq!(sums(&slots), vec![0.0, 0.0, 100.0]);
        assert_eq!(out.saturated, 2);
    }

    #[test]
    fn zero_target_and_zero_weights_are_no_ops() {
        let mut slots = vec![FillSlot::new(1.0)];
        let out = GradientWeightedDistributor::default().distribute(0.0, &mut slots).unwrap();
        assert_eq!(out.iterations, 0);
        assert_eq!(slots[0].sum, 0.0);

        let mut idle = vec![FillSlot::new(0.0)];
        let out = GradientWeightedDistributor::default().distribute(8.0, &mut idle).unwrap();
        assert_eq!(out.shortfall, 8.0);
    }

    #[test]
    fn invalid_inputs_rejected() {
        assert!(matches!(GradientWeightedDistributor::new(0.0), Err(AllocError::Config(_))));
        let fill = GradientWeightedDistributor::default();
        assert!(fill.distribute(-1.0, &mut [FillSlot::new(1.0)]).is_err());
        assert!(fill.distribute(1.0, &mut [FillSlot::new(-1.0)]).is_err());
        assert!(fill.distribute(1.0, &mut [FillSlot::new(1.0).with_ceiling(f64::NAN)]).is_err());
    }

    #[test]
    fn distribute_by_writes_back_into_items() {
        struct Zone {
            pull:   f64,
            cap:    Option<f64>,
            placed: f64,
        }
        let mut zones = vec![
            Zone { pull: 3.0, cap: None, placed: 0.0 },
            Zone { pull: 1.0, cap: Some(5.0), placed: 0.0 },
        ];
        let out = GradientWeightedDistributor::default()
            .distribute_by(40.0, &mut zones, |z| z.pull, |z| z.cap, |z| &mut z.placed)
            .unwrap();
        assert_eq!(zones[0].placed, 35.0);
        assert_eq!(zones[1].placed, 5.0);
        assert_eq!(out.distributed, 40.0);
    }

    #[test]
    fn recipients_capped_by_capacity() {
        use tod_core::{ActivityType::Multifamily, RecipientId};
        use tod_ledger::Recipient;

        let region = RegionId::new("r");
        let recipients = vec![
            Recipient::new(RecipientId(1), region.clone(), 0.5).with_capacity(Multifamily, 10.0),
            Recipient::new(RecipientId(2), region.clone(), 0.5).with_capacity(Multifamily, 100.0),
        ];
        let (amounts, out) = GradientWeightedDistributor::default()
            .distribute_recipients(50.0, &recipients, Multifamily, false)
            .unwrap();
        assert_eq!(amounts, vec![10.0, 40.0]);
        assert_eq!(out.shortfall, 0.0);
    }
}

#[cfg(test)]
mod lottery {
    use super::*;
    use tod_core::SeededRng;
    use crate::{LotteryAllocator, LotteryEntry};

    #[test]
    fn entry_below_minimum_forfeits() {
        let mut entries = vec![LotteryEntry::new(1.0, 100.0), LotteryEntry::new(1.0, 100.0)];
        let mut rng = ScriptedRng::new(&[0.1, 0.1, 0.1, 0.9]);
        let out = LotteryAllocator::new(3.0).unwrap().allocate(4.0, &mut entries, &mut rng).unwrap();

        assert_eq!(entries[0].allocated, 3.0);
        assert_eq!(entries[1].allocated, 0.0);
        assert_eq!(entries[1].capacity, 100.0);
        assert_eq!(out.placed, 4.0);
        assert_eq!(out.forfeited, 1.0);
        assert_eq!(out.kept(), 3.0);
        assert_eq!(out.unplaced, 0.0);
    }

    #[test]
    fn stops_when_capacity_runs_out() {
        let mut entries = vec![LotteryEntry::new(1.0, 2.0), LotteryEntry::new(1.0, 0.0)];
        let mut rng = ScriptedRng::new(&[0.5]);
        let out = LotteryAllocator::new(0.0).unwrap().allocate(5.0, &mut entries, &mut rng).unwrap();

        assert_eq!(entries[0].allocated, 2.0);
        assert_eq!(entries[0].capacity, 0.0);
        assert_eq!(out.draws, 2);
        assert_eq!(out.unplaced, 3.0);
    }

    #[test]
    fn capacity_below_minimum_never_drawn() {
        let mut entries = vec![LotteryEntry::new(10.0, 2.0), LotteryEntry::new(1.0, 50.0)];
        let mut rng = ScriptedRng::new(&[0.0, 0.3, 0.6, 0.99]);
        let out = LotteryAllocator::new(5.0).unwrap().allocate(6.0, &mut entries, &mut rng).unwrap();

        assert_eq!(entries[0].allocated, 0.0);
        assert_eq!(entries[1].allocated, 6.0);
        assert_eq!(out.kept(), 6.0);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = |seed| {
            let mut entries: Vec<LotteryEntry> =
                (1..=5).map(|i| LotteryEntry::new(i as f64, 20.0)).collect();
            let mut rng = SeededRng::new(seed);
            let out = LotteryAllocator::new(4.0).unwrap().allocate(30.0, &mut entries, rng.inner()).unwrap();
            (entries, out)
        };
        let (a, out) = run(11);
        let (b, _) = run(11);
        assert_eq!(a, b);

        let kept: f64 = a.iter().map(|e| e.allocated).sum();
        assert_eq!(kept + out.forfeited, out.placed);
        assert!(a.iter().all(|e| e.allocated == 0.0 || e.allocated >= 4.0));
        assert!(a.iter().all(|e| e.allocated + e.capacity == 20.0));
    }

    #[test]
    fn fractional_total_places_whole_units() {
        let mut entries = vec![LotteryEntry::new(1.0, 10.0)];
        let mut rng = ScriptedRng::new(&[0.2]);
        let out = LotteryAllocator::new(0.0).unwrap().allocate(3.5, &mut entries, &mut rng).unwrap();
        assert_eq!(out.placed, 3.0);
        assert_eq!(out.unplaced, 0.5);
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(LotteryAllocator::new(-1.0).is_err());
        assert!(LotteryAllocator::with_unit(0.0, 1.0).is_err());
        let mut rng = ScriptedRng::new(&[0.5]);
        assert!(LotteryAllocator::new(1.0).unwrap().allocate(-2.0, &mut [], &mut rng).is_err());
    }
}

#[cfg(test)]
mod station {
    use super::*;
    use tod_core::{AllocError, AllocWarning, EngineConfig, RecipientId, RegionId};
    use tod_ledger::{DevArea, Gradient, StationPlan, StationTargets, StationTemplate};
    use crate::StationDistributor;

    fn area(id: u64, distance: f64) -> DevArea {
        DevArea {
            id:          RecipientId(id),
            distance,
            area:        1.0,
            suitability: None,
            existing:    StationTargets::default(),
        }
    }

    /// Two sub-areas whose density weights are 3 and 1.
    fn plan(targets: StationTargets, mix: Option<Gradient>, min_hotel_size: f64) -> StationPlan {
        StationPlan {
            region:    RegionId::new("st1"),
            template:  StationTemplate {
                targets,
                density_gradient: Gradient::from_ranges([(0.0, 500.0, 3.0), (500.0, 1000.0, 1.0)])
                    .unwrap(),
                mix_gradient: mix,
                min_hotel_size,
            },
            dev_areas: vec![area(1, 100.0), area(2, 700.0)],
        }
    }

    fn distributor() -> StationDistributor {
        StationDistributor::new(&EngineConfig::default()).unwrap()
    }

    #[test]
    fn total_then_residential_then_jobs() {
        let plan = plan(StationTargets::new(20.0, 60.0, 0.0), None, 50.0);
        let out = distributor().distribute(&plan, &mut ScriptedRng::new(&[0.5])).unwrap();

        let totals: Vec<f64> = out.areas.iter().map(|a| a.total).collect();
        assert_eq!(totals, vec![60.0, 20.0]);
        let residential: Vec<f64> = out.areas.iter().map(|a| a.residential).collect();
        assert_eq!(residential, vec![10.0, 10.0]);
        let jobs: Vec<f64> = out.areas.iter().map(|a| a.jobs).collect();
        assert_eq!(jobs, vec![50.0, 10.0]);
        assert_eq!(out.summary, StationTargets::new(20.0, 60.0, 0.0));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn mix_gradient_capped_by_area_total() {
        let mix = Gradient::from_ranges([(0.0, 500.0, 1.0), (500.0, 1000.0, 3.0)]).unwrap();
        let plan = plan(StationTargets::new(40.0, 40.0, 0.0), Some(mix), 50.0);
        let out = distributor().distribute(&plan, &mut ScriptedRng::new(&[0.5])).unwrap();

        let residential: Vec<f64> = out.areas.iter().map(|a| a.residential).collect();
        assert_eq!(residential, vec![20.0, 20.0]);
        assert_eq!(out.areas[1].jobs, 0.0);
        assert_eq!(out.summary, StationTargets::new(40.0, 40.0, 0.0));
    }

    #[test]
    fn hotel_lands_where_nonresidential_room_allows() {
        let plan = plan(StationTargets::new(20.0, 10.0, 50.0), None, 50.0);
        let out = distributor().distribute(&plan, &mut ScriptedRng::new(&[0.0])).unwrap();

        assert_eq!(out.areas[0].hotel, 50.0);
        assert_eq!(out.areas[0].jobs, 0.0);
        assert_eq!(out.areas[1].hotel, 0.0);
        assert_eq!(out.areas[1].jobs, 10.0);
        assert_eq!(out.summary, StationTargets::new(20.0, 10.0, 50.0));
    }

    #[test]
    fn unplaceable_hotel_becomes_jobs_and_warns() {
        let plan = plan(StationTargets::new(20.0, 10.0, 50.0), None, 60.0);
        let out = distributor().distribute(&plan, &mut ScriptedRng::new(&[0.0])).unwrap();

        assert_eq!(out.summary.hotel, 0.0);
        assert_eq!(out.summary.jobs, 60.0);
        assert_eq!(
            out.warnings,
            vec![AllocWarning::Exhaustion {
                region:      RegionId::new("st1"),
                activity:    Some("hotel".into()),
                unallocated: 50.0,
            }]
        );
    }

    #[test]
    fn forfeited_hotel_becomes_jobs_and_warns() {
        // Two wins for the first area, then one for the second.
        let plan = plan(StationTargets::new(0.0, 40.0, 40.0), None, 15.0);
        let out = distributor().distribute(&plan, &mut ScriptedRng::new(&[0.0, 0.0, 0.99])).unwrap();

        assert_eq!(out.areas[0].hotel, 27.0);
        assert_eq!(out.areas[0].jobs, 33.0);
        assert_eq!(out.areas[1].hotel, 0.0);
        assert_eq!(out.areas[1].jobs, 20.0);
        assert_eq!(out.summary, StationTargets::new(0.0, 53.0, 27.0));
        assert_eq!(
            out.warnings,
            vec![AllocWarning::Forfeited {
                region:    RegionId::new("st1"),
                activity:  Some("hotel".into()),
                forfeited: 13.0,
            }]
        );
    }

    #[test]
    fn station_without_areas_warns() {
        let mut plan = plan(StationTargets::new(10.0, 0.0, 0.0), None, 50.0);
        plan.dev_areas.clear();
        let out = distributor().distribute(&plan, &mut ScriptedRng::new(&[0.5])).unwrap();
        assert!(out.areas.is_empty());
        assert_eq!(out.warnings, vec![AllocWarning::EmptyGroup { region: RegionId::new("st1") }]);
    }

    #[test]
    fn suitability_required_when_enabled() {
        let config = EngineConfig { use_suitability: true, ..Default::default() };
        let plan = plan(StationTargets::new(10.0, 0.0, 0.0), None, 50.0);
        let err = StationDistributor::new(&config)
            .unwrap()
            .distribute(&plan, &mut ScriptedRng::new(&[0.5]))
            .unwrap_err();
        assert!(matches!(err, AllocError::Config(_)));
    }

    #[test]
    fn suitability_scales_density_weight() {
        let config = EngineConfig { use_suitability: true, ..Default::default() };
        let mut plan = plan(StationTargets::new(0.0, 80.0, 0.0), None, 50.0);
        plan.dev_areas[0].suitability = Some(1.0);
        plan.dev_areas[1].suitability = Some(3.0);
        let out = StationDistributor::new(&config)
            .unwrap()
            .distribute(&plan, &mut ScriptedRng::new(&[0.5]))
            .unwrap();
        assert_eq!(out.areas[0].total, 40.0);
        assert_eq!(out.areas[1].total, 40.0);
    }

    #[test]
    fn target_rows_cover_every_measure() {
        let mut plan = plan(StationTargets::new(20.0, 60.0, 0.0), None, 50.0);
        plan.dev_areas[0].existing = StationTargets::new(5.0, 0.0, 0.0);
        let out = distributor().distribute(&plan, &mut ScriptedRng::new(&[0.5])).unwrap();

        let rows: Vec<_> = out.target_rows().collect();
        assert_eq!(rows.len(), 6);
        let first = &rows[0];
        assert_eq!(first.recipient, RecipientId(1));
        assert_eq!(first.activity, "residential");
        assert_eq!(first.existing, 5.0);
        assert_eq!(first.target, 10.0);
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use rand::Rng;
    use tod_core::SeededRng;
    use crate::GradientWeightedDistributor;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    /// Random slots, units and minimum shares: no slot passes its ceiling or
    /// loses activity, the target is never overshot, and whatever is left
    /// unplaced comes back as shortfall.
    #[test]
    fn ceiling_bound_and_reported_shortfall() {
        let mut seeded = SeededRng::new(31);
        let rng = seeded.inner();
        for case in 0..300 {
            let n = rng.gen_range(1..=8usize);
            let before: Vec<FillSlot> = (0..n)
                .map(|_| {
                    let mut slot = FillSlot::new(rng.gen_range(0..10) as f64);
                    if rng.gen_bool(0.5) {
                        slot = slot.with_ceiling(rng.gen_range(0..60) as f64);
                    }
                    if rng.gen_bool(0.2) {
                        slot = slot.with_sum(rng.gen_range(0..20) as f64);
                    }
                    slot
                })
                .collect();
            let total = rng.gen_range(0..300) as f64;
            let unit = [1.0, 5.0][rng.gen_range(0..2usize)];
            let min_unit = rng.gen_bool(0.5).then(|| rng.gen_range(1..30) as f64);

            let mut fill = GradientWeightedDistributor::new(unit).unwrap();
            if let Some(m) = min_unit {
                fill = fill.with_min_unit(m);
            }
            let mut slots = before.clone();
            let out = fill.distribute(total, &mut slots).unwrap();

            let start: f64 = before.iter().map(|s| s.sum).sum();
            let end: f64 = slots.iter().map(|s| s.sum).sum();
            assert!(end <= total.max(start) + 1e-6, "case {case}: {end} overshoots {total}");
            assert!(close(out.distributed, end - start), "case {case}");
            assert!(
                close(out.shortfall, (total - end).max(0.0)),
                "case {case}: shortfall {} but {} left",
                out.shortfall,
                total - end
            );
            for (b, a) in before.iter().zip(&slots) {
                assert!(a.sum >= b.sum, "case {case}: slot lost activity");
                if let Some(c) = b.ceiling.filter(|&c| b.sum <= c) {
                    assert!(a.sum <= c + 1e-6, "case {case}: {} over ceiling {c}", a.sum);
                }
            }

            // An uncapped slot that clears the minimum on the first pass can
            // take any remainder.
            let live = |s: &&FillSlot| !s.ceiling.is_some_and(|c| s.sum >= c);
            let weight_total: f64 = before.iter().filter(live).map(|s| s.weight).sum();
            let remaining = total - start;
            let absorbs = before.iter().any(|s| {
                s.ceiling.is_none()
                    && s.weight > 0.0
                    && min_unit.is_none_or(|m| s.weight / weight_total * remaining >= m)
            });
            if absorbs {
                assert_eq!(out.shortfall, 0.0, "case {case}: uncapped slot left {}", out.shortfall);
            }
        }
    }
}
