//! Output formatting for CLI

use crate::simulation::{PlanningOutcome, SimulationSnapshot};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, String)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Grid with the agent (`A`) and the last observation (`o`) overlaid.
///
/// Items use [`CellKind::to_char`](crate::grid::CellKind::to_char); the belief
/// is drawn to the right with darker shades for more mass.
pub fn render_snapshot(snapshot: &SimulationSnapshot) -> String {
    let size = snapshot.environment.size();
    let peak = snapshot
        .belief
        .iter()
        .copied()
        .fold(0.0_f64, f64::max)
        .max(f64::MIN_POSITIVE);
    let mut out = String::new();

    for row in 0..size {
        for col in 0..size {
            let index = row * size + col;
            let glyph = if snapshot.true_location.index(size) == index {
                'A'
            } else if snapshot.last_observation.map(|obs| obs.index(size)) == Some(index) {
                'o'
            } else {
                snapshot.environment.cell_at_index(index).to_char()
            };
            out.push(glyph);
        }
        out.push_str("   ");
        for col in 0..size {
            let p = snapshot.belief[row * size + col] / peak;
            let shade = ((p * (SHADES.len() - 1) as f64).round() as usize).min(SHADES.len() - 1);
            out.push(SHADES[shade]);
        }
        out.push('\n');
    }
    out
}

/// Print the `top` most probable policies of a planning phase.
pub fn print_policy_table(plan: &PlanningOutcome, top: usize) {
    println!(
        "  {:>4}  {:<6} {:>10} {:>10} {:>10} {:>10} {:>8}",
        "#", "policy", "G", "risk", "epistemic", "futility", "p"
    );
    for evaluation in plan.ranked().into_iter().take(top) {
        let marker = if evaluation.index == plan.selected {
            '*'
        } else {
            ' '
        };
        println!(
            "{marker} {:>4}  {:<6} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>8.4}",
            evaluation.index,
            evaluation.label(),
            evaluation.efe.efe,
            evaluation.efe.instrumental,
            evaluation.efe.epistemic,
            evaluation.efe.futility,
            evaluation.probability,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{Simulation, SimulationConfig};

    #[test]
    fn snapshot_rendering_marks_agent_and_belief() {
        let sim = Simulation::from_config(SimulationConfig::default().with_seed(1)).unwrap();
        let rendered = render_snapshot(&sim.snapshot());
        let first = rendered.lines().next().unwrap();
        assert!(first.starts_with('A'));
        assert!(first.contains('█'));
        assert_eq!(rendered.lines().count(), 10);
    }
}
