//! Plain-text summary of final effective stresses and losses.

use std::fmt::Write as _;

use gl_engine::{EngineResult, LossesAggregate};
use gl_model::BridgeModel;

const PA_TO_MPA: f64 = 1.0e-6;

/// Render the last finalized interval of an aggregate as a fixed-width
/// text table, one block per POI plus a tendon summary.
pub fn final_losses_report(model: &BridgeModel, agg: &LossesAggregate) -> EngineResult<String> {
    let mut out = String::new();
    let _ = writeln!(out, "Prestress losses - {}", agg.girder);

    let Some(interval) = agg.computed_through else {
        out.push_str("  (no intervals computed)\n");
        return Ok(out);
    };
    let ivl = model.timeline().interval(interval)?;
    let _ = writeln!(
        out,
        "Through interval {} (day {:.0} to day {:.0})",
        interval, ivl.start_day, ivl.end_day
    );

    for &poi in model.girder_pois(agg.girder)? {
        let x = model.girder_offset_m(poi)?;
        let _ = writeln!(out, "\nPOI {poi} at x = {x:.2} m");
        let Some(details) = agg.details_at(poi, interval) else {
            continue;
        };
        if details.is_empty() {
            out.push_str("  segment not yet constructed\n");
            continue;
        }
        for (ty, s) in &details.strands {
            let _ = writeln!(
                out,
                "  {ty:<9} fpj {:7.1}  ES {:6.1}  ext {:6.1}  CR {:6.1}  SH {:6.1}  RE {:6.1}  fpe {:7.1} MPa",
                s.jacking_pa * PA_TO_MPA,
                s.elastic_shortening_pa * PA_TO_MPA,
                s.elastic_external_pa * PA_TO_MPA,
                s.creep_pa * PA_TO_MPA,
                s.shrinkage_pa * PA_TO_MPA,
                s.relaxation_pa * PA_TO_MPA,
                s.effective_pa * PA_TO_MPA,
            );
        }
        for (duct, d) in &details.ducts {
            let _ = writeln!(
                out,
                "  Duct {:<4} stress {:7.1} MPa  force {:8.1} kN",
                duct + 1,
                d.stress_pa * PA_TO_MPA,
                d.force_n * 1.0e-3,
            );
        }
    }

    if !agg.tendons.is_empty() {
        out.push_str("\nTendon stressing\n");
        for (key, t) in &agg.tendons {
            let _ = writeln!(
                out,
                "  {key}: avg friction {:.1} MPa, avg anchor set {:.1} MPa",
                t.avg_friction_pa * PA_TO_MPA,
                t.avg_anchor_set_pa * PA_TO_MPA,
            );
            for (end, seat) in &t.ends {
                let _ = writeln!(
                    out,
                    "    {end:?}: Xset {:.2} m, elongation {:.1} mm{}",
                    seat.xset_m,
                    seat.elongation_m * 1.0e3,
                    if seat.converged { "" } else { " (not converged)" },
                );
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LossStore;
    use gl_core::units::{m, mm2, mpa};
    use gl_core::{GirderKey, StrandType, INTERVAL_ALL};
    use gl_model::{
        Activity, BridgeBuilder, Concrete, Interval, SectionGeometry, StrandProfile, Timeline,
    };

    #[test]
    fn report_names_every_population() {
        let mut b = BridgeBuilder::new();
        let g = b.add_girder(0, 0);
        let seg = b.add_segment(
            g,
            m(30.0),
            Concrete::normal_weight(mpa(35_000.0)),
            SectionGeometry {
                area_m2: 0.5,
                inertia_m4: 0.1,
                centroid_from_top_m: 0.6,
            },
        );
        b.add_strands(
            seg,
            StrandType::Straight,
            30,
            mm2(140.0),
            mpa(1396.0),
            StrandProfile::Straight { ecc: m(0.5) },
        );
        b.add_poi(seg, m(15.0));
        let tl = Timeline::new(vec![
            Interval::new(1.0, 28.0, vec![Activity::ConstructSegments(vec![seg])]),
            Interval::new(28.0, 20_000.0, vec![]),
        ])
        .unwrap();
        let model = b.build(tl).unwrap();

        let mut store = LossStore::new(&model);
        let agg = store
            .girder_losses(GirderKey::new(0, 0), INTERVAL_ALL)
            .unwrap()
            .clone();
        let text = final_losses_report(&model, &agg).unwrap();
        assert!(text.contains("Group 1 Girder 1"));
        assert!(text.contains("Straight"));
        assert!(text.contains("fpe"));
        assert!(text.contains("Through interval 1"));
    }

    #[test]
    fn empty_aggregate_reports_gracefully() {
        let model = BridgeBuilder::new()
            .build(Timeline::new(vec![Interval::new(0.0, 1.0, vec![])]).unwrap())
            .unwrap();
        let agg = LossesAggregate::new(GirderKey::new(0, 0));
        let text = final_losses_report(&model, &agg).unwrap();
        assert!(text.contains("no intervals computed"));
    }
}
