//! Narrative prompt construction.
//!
//! Prompts carry the full scenario parameter block, a capacity context scale
//! so the model anchors numbers to human-relatable comparisons, and every
//! previously generated narrative. That last part is the temporal-consistency
//! requirement: later years must not contradict earlier ones, which is why
//! the orchestrator generates years strictly in order.

use std::fmt::Write;

use takeoff_types::{NarrativeSet, Scenario};

/// The accounts are written looking back from this year.
const PERSPECTIVE_YEAR: i32 = 2125;

/// Build the generation prompt for one year.
#[must_use]
pub fn build_narrative_prompt(
    scenario: &Scenario,
    year: i32,
    current_year: i32,
    previous: &NarrativeSet,
) -> String {
    let ev = &scenario.expected_value;
    let moral = &scenario.moral_consideration;

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are writing historical accounts of digital minds takeoff scenarios \
         from the perspective of the year {PERSPECTIVE_YEAR}."
    );

    prompt.push_str("\nCurrent scenario parameters:\n");
    let _ = writeln!(
        prompt,
        "- Speed: {} ({})",
        scenario.speed.kind.as_str(),
        scenario.speed.kind.tempo()
    );
    let _ = writeln!(
        prompt,
        "- Initial Capacity: {:e} human-equivalents (1 = one human's welfare capacity)",
        ev.initial_capacity
    );
    let _ = writeln!(prompt, "- Maximum Capacity: {:e} human-equivalents", ev.max_capacity);
    prompt.push_str("- Current Human Population Reference: 8 billion human-equivalents\n");
    let _ = writeln!(prompt, "- Credence Level: {}%", ev.credence);
    let _ = writeln!(
        prompt,
        "- Progression: {} ({})",
        scenario.progression.kind.as_str(),
        scenario.progression.kind.style()
    );
    let _ = writeln!(prompt, "- Start Year: {}", scenario.timing.start_year);
    let _ = writeln!(prompt, "- Current Year: {current_year}");
    let _ = writeln!(
        prompt,
        "- Existential Security: {}",
        if scenario.timing.existential_security_aligned {
            "Achieved"
        } else {
            "Not Yet Achieved"
        }
    );
    let _ = writeln!(
        prompt,
        "- Moral Consideration: {} (Level: {})",
        moral.kind.as_str(),
        moral.level
    );

    prompt.push_str(
        "\nWelfare Capacity Context:\n\
         - Numbers represent total welfare/experiential capacity relative to individual humans\n\
         - 1e6 (1 million) = welfare capacity equivalent to a small city\n\
         - 1e9 (1 billion) = welfare capacity equivalent to a large country\n\
         - 8e9 (8 billion) = approximate current human population welfare capacity\n\
         - 1e10 (10 billion) = slightly more than current human population\n\
         - 1e11 (100 billion) = order of magnitude more than current humanity\n",
    );

    prompt.push_str("\nPrevious historical accounts:\n");
    let mut first = true;
    for (previous_year, narrative) in previous.years_before(year) {
        if !first {
            prompt.push('\n');
        }
        let _ = writeln!(prompt, "{previous_year}: {narrative}");
        first = false;
    }

    let _ = writeln!(
        prompt,
        "\nGenerate a historical account for the year {year}, maintaining consistency \
         with previous years.\nFocus on:"
    );
    prompt.push_str(
        "1. The state of digital minds and their welfare capacity (matching the graph's current level)\n\
         \x20  - Express welfare capacity in both numerical terms and human-relatable comparisons\n",
    );
    let _ = writeln!(
        prompt,
        "2. The implications of the moral consideration level ({}% recognition)",
        moral.level * 100.0
    );
    prompt.push_str(
        "3. The societal and technological developments\n\
         4. How humanity was adapting to these changes\n",
    );

    prompt.push_str("\nWrite 2-3 paragraphs for this year.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_the_scenario_parameters() {
        let scenario = Scenario::default();
        let prompt = build_narrative_prompt(&scenario, 2040, 2025, &NarrativeSet::new());

        assert!(prompt.contains("perspective of the year 2125"));
        assert!(prompt.contains("- Speed: moderate (Months/Years)"));
        assert!(prompt.contains("- Initial Capacity: 1e6 human-equivalents"));
        assert!(prompt.contains("- Maximum Capacity: 1e10 human-equivalents"));
        assert!(prompt.contains("- Credence Level: 50%"));
        assert!(prompt.contains("- Progression: gradual (steady progress)"));
        assert!(prompt.contains("- Start Year: 2025"));
        assert!(prompt.contains("- Current Year: 2025"));
        assert!(prompt.contains("- Existential Security: Not Yet Achieved"));
        assert!(prompt.contains("- Moral Consideration: delayed (Level: 0.5)"));
    }

    #[test]
    fn prompt_names_the_target_year() {
        let prompt =
            build_narrative_prompt(&Scenario::default(), 2055, 2025, &NarrativeSet::new());

        assert!(prompt.contains("historical account for the year 2055"));
        assert!(prompt.contains("Write 2-3 paragraphs"));
    }

    #[test]
    fn prompt_includes_earlier_narratives_only() {
        let mut previous = NarrativeSet::new();
        previous.insert(2030, "The first uploads.");
        previous.insert(2040, "The recognition debates.");
        previous.insert(2050, "Should not appear.");

        let prompt = build_narrative_prompt(&Scenario::default(), 2050, 2025, &previous);

        assert!(prompt.contains("2030: The first uploads."));
        assert!(prompt.contains("2040: The recognition debates."));
        assert!(!prompt.contains("Should not appear."));
    }

    #[test]
    fn prompt_states_the_recognition_percentage() {
        let mut scenario = Scenario::default();
        scenario.moral_consideration.level = 0.25;

        let prompt = build_narrative_prompt(&scenario, 2040, 2025, &NarrativeSet::new());
        assert!(prompt.contains("moral consideration level (25% recognition)"));
    }

    #[test]
    fn fast_sudden_scenarios_render_their_descriptors() {
        let mut scenario = Scenario::default();
        scenario.speed.kind = takeoff_types::SpeedKind::Fast;
        scenario.progression.kind = takeoff_types::ProgressionKind::Sudden;
        scenario.timing.existential_security_aligned = true;

        let prompt = build_narrative_prompt(&scenario, 2040, 2025, &NarrativeSet::new());
        assert!(prompt.contains("- Speed: fast (Days/Weeks)"));
        assert!(prompt.contains("- Progression: sudden (sudden jumps)"));
        assert!(prompt.contains("- Existential Security: Achieved"));
    }
}
