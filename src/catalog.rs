//! Fixed problem and machine-part lists, plus the static defect to part mapping.

pub const UNMAPPED_PART: &str = "Unmapped/Other";
pub const DEFAULT_MACHINE_PART: &str = "N/A or Other";
pub const DEFAULT_MACHINE_NUMBER: &str = "N/A";

pub const PROBLEM_OPTIONS: &[&str] = &[
    "Uneven wall thickness",
    "Rough surface (internal/external)",
    "Cracks or longitudinal splits",
    "Pipe warping or bending (ovality)",
    "Color inconsistency / streaks",
    "Bubbles, voids, or blisters",
    "Underfilled / short pipe",
    "Burning / degradation marks",
    "Poor gelation / unmelted particles",
    "Contamination (black specks)",
    "Die lines / flow marks",
    "Excessive flash or burrs",
    "Low impact strength",
    "Dimensional instability",
    "Bell end deformation / defects",
];

pub const MACHINE_PARTS: &[&str] = &[
    "Hopper / Feeder",
    "Mixer / Compounder",
    "Extruder Screw",
    "Extruder Barrel / Heaters",
    "Die Head",
    "Vacuum Calibration Tank",
    "Cooling Tank",
    "Haul-off Unit",
    "Cutter",
    "Belling Machine",
    DEFAULT_MACHINE_PART,
];

const PART_MAPPING: &[(&str, &[&str])] = &[
    ("Uneven wall thickness", &["Die Head", "Haul-off Unit", "Vacuum Calibration Tank"]),
    ("Rough surface (internal/external)", &["Die Head", "Extruder Barrel / Heaters"]),
    ("Cracks or longitudinal splits", &["Cooling Tank", "Die Head", "Mixer / Compounder"]),
    ("Pipe warping or bending (ovality)", &["Vacuum Calibration Tank", "Cooling Tank", "Haul-off Unit"]),
    ("Color inconsistency / streaks", &["Mixer / Compounder", "Hopper / Feeder"]),
    ("Bubbles, voids, or blisters", &["Hopper / Feeder", "Extruder Barrel / Heaters"]),
    ("Underfilled / short pipe", &["Hopper / Feeder", "Extruder Screw"]),
    ("Burning / degradation marks", &["Extruder Barrel / Heaters", "Extruder Screw", "Die Head"]),
    ("Poor gelation / unmelted particles", &["Extruder Screw", "Extruder Barrel / Heaters"]),
    ("Contamination (black specks)", &["Hopper / Feeder", "Extruder Screw", "Die Head"]),
    ("Die lines / flow marks", &["Die Head"]),
    ("Excessive flash or burrs", &["Cutter"]),
    ("Low impact strength", &["Mixer / Compounder", "Extruder Barrel / Heaters"]),
    ("Dimensional instability", &["Vacuum Calibration Tank", "Haul-off Unit"]),
    ("Bell end deformation / defects", &["Belling Machine"]),
];

pub fn known_problem(label: &str) -> Option<&'static str> {
    PROBLEM_OPTIONS.iter().copied().find(|option| *option == label)
}

pub fn known_part(label: &str) -> Option<&'static str> {
    MACHINE_PARTS.iter().copied().find(|part| *part == label)
}

pub fn part_index(label: &str) -> usize {
    MACHINE_PARTS
        .iter()
        .position(|part| *part == label)
        .unwrap_or(MACHINE_PARTS.len())
}

/// Typical machine parts for a defect, in mapping order.
pub fn parts_for(problem: &str) -> Vec<&'static str> {
    PART_MAPPING
        .iter()
        .find(|(name, _)| *name == problem)
        .map(|(_, parts)| parts.to_vec())
        .unwrap_or_else(|| vec![UNMAPPED_PART])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_problem_returns_ordered_parts() {
        assert_eq!(
            parts_for("Burning / degradation marks"),
            vec!["Extruder Barrel / Heaters", "Extruder Screw", "Die Head"]
        );
    }

    #[test]
    fn unmapped_problem_falls_back_to_sentinel() {
        assert_eq!(parts_for("Label misprint"), vec![UNMAPPED_PART]);
        assert_eq!(parts_for("die lines / flow marks"), vec![UNMAPPED_PART]);
    }

    #[test]
    fn every_mapped_part_is_in_the_part_list() {
        for (problem, parts) in PART_MAPPING {
            assert!(known_problem(problem).is_some(), "{problem} not in options");
            for part in parts.iter() {
                assert!(known_part(part).is_some(), "{part} not in part list");
            }
        }
    }
}
