//! Room and action classification from filtered labels.

/// Room categories with the keywords that vote for them.
///
/// Declaration order is the tie-break: when two rooms score the same, the
/// earlier entry wins, so a sink alone reads as kitchen rather than bathroom.
const ROOM_TYPES: &[(&str, &[&str])] = &[
    (
        "kitchen",
        &["kitchen", "stove", "oven", "refrigerator", "sink", "countertop", "dishwasher", "microwave"],
    ),
    (
        "bathroom",
        &["bathroom", "toilet", "bathtub", "shower", "sink", "mirror", "tile"],
    ),
    (
        "bedroom",
        &["bedroom", "bed", "pillow", "mattress", "nightstand", "dresser", "closet"],
    ),
    (
        "living_room",
        &["living room", "sofa", "couch", "television", "tv", "coffee table", "fireplace"],
    ),
    (
        "dining_room",
        &["dining room", "dining table", "chair", "chandelier"],
    ),
    ("garage", &["garage", "car", "tool", "workbench"]),
    ("outdoor", &["outdoor", "garden", "patio", "lawn", "pool", "deck"]),
    (
        "office",
        &["office", "desk", "computer", "monitor", "keyboard", "chair"],
    ),
    ("laundry", &["laundry", "washing machine", "dryer", "iron"]),
];

/// Action categories; a single keyword hit tags the clip.
const ACTION_TYPES: &[(&str, &[&str])] = &[
    (
        "cleaning",
        &["cleaning", "wiping", "scrubbing", "mopping", "sweeping", "vacuuming", "dusting"],
    ),
    (
        "organizing",
        &["organizing", "arranging", "sorting", "folding", "stacking"],
    ),
    ("inspecting", &["inspecting", "checking", "examining", "looking"]),
    ("sanitizing", &["sanitizing", "disinfecting", "spraying"]),
];

/// Pick the single best room tag for a set of lowercased labels.
///
/// Each keyword that appears as a substring of at least one label scores one
/// point for its room; the highest-scoring room wins, `None` if nothing
/// scored.
pub fn classify_room_type(labels: &[String]) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for (room, keywords) in ROOM_TYPES {
        let score = keywords
            .iter()
            .filter(|keyword| labels.iter().any(|label| label.contains(*keyword)))
            .count();
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((room, score));
        }
    }

    best.map(|(room, _)| room.to_string())
}

/// Collect every action tag whose keywords appear in any label.
pub fn classify_action_types(labels: &[String]) -> Vec<String> {
    ACTION_TYPES
        .iter()
        .filter(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| labels.iter().any(|label| label.contains(*keyword)))
        })
        .map(|(action, _)| action.to_string())
        .collect()
}
