//! Label filtering against the cleaning/property vocabulary.
//!
//! The annotation service returns everything it sees; most of it is noise
//! for this domain (vehicles passing a window, pets, toys). The filter keeps
//! labels that plausibly describe rooms, household objects, or cleaning
//! work, and drops a fixed block list outright. These tables are a reviewed
//! design choice, not heuristics to tune in passing.

/// Household and cleaning objects kept on exact or substring match.
const ALLOWED_CATEGORIES: &[&str] = &[
    // Furniture
    "bed", "sofa", "couch", "chair", "table", "desk", "nightstand", "dresser",
    "cabinet", "shelf", "bookshelf", "coffee table", "dining table", "ottoman",
    "bench", "stool", "wardrobe", "closet", "drawer",
    // Kitchen items
    "refrigerator", "stove", "oven", "microwave", "dishwasher", "sink",
    "countertop", "plate", "bowl", "cup", "glass", "mug",
    "pot", "pan", "cookware", "tableware", "utensil", "knife", "fork", "spoon",
    "cutting board", "blender", "toaster", "coffee maker", "kettle",
    "food", "fruit", "vegetable", "bottle", "jar", "container",
    "packaged goods", "bagged packaged goods", "bottled and jarred packaged goods",
    "dish rack", "sponge", "dish soap",
    // Bathroom items
    "toilet", "bathtub", "shower", "mirror", "towel", "soap", "shampoo",
    "toothbrush", "faucet", "toilet paper", "bath mat", "shower curtain",
    // Bedroom items
    "pillow", "blanket", "mattress", "sheet", "comforter", "lamp",
    "alarm clock", "curtain", "blind",
    // Living room items
    "television", "tv", "remote control", "rug", "carpet", "fireplace",
    "plant", "vase", "picture frame", "artwork", "clock",
    // Cleaning supplies
    "vacuum", "mop", "broom", "bucket", "spray bottle", "cleaning product",
    "trash can", "garbage bag", "recycling bin", "dustpan",
    "paper towel", "cleaning cloth", "gloves",
    // Laundry
    "washing machine", "dryer", "iron", "ironing board", "laundry basket",
    "clothes", "clothing", "shirt", "pants",
    // General household
    "door", "window", "floor", "wall", "ceiling", "light", "switch",
    "outlet", "vent", "fan", "air conditioner", "heater",
    // Storage
    "box", "basket", "bin", "bag", "hanger",
    // Context
    "person", "hand", "arm",
];

/// Keywords that keep a label on substring containment alone.
const ALLOWED_KEYWORDS: &[&str] = &[
    "clean", "wash", "wipe", "scrub", "mop", "vacuum", "dust",
    "kitchen", "bathroom", "bedroom", "living", "dining", "laundry",
    "furniture", "appliance", "fixture", "floor", "counter", "surface",
];

/// Labels dropped unconditionally; block wins over allow.
const BLOCKED_LABELS: &[&str] = &[
    "wheel", "tire", "vehicle", "car", "truck", "motorcycle", "bicycle",
    "grooming trimmer", "trimmer", "razor",
    "weapon", "gun",
    "animal", "dog", "cat", "bird", "fish",
    "sports equipment", "ball", "bat", "racket",
    "musical instrument", "guitar", "piano", "drum",
    "toy", "game", "puzzle",
    "jewelry", "watch", "ring", "necklace",
    "makeup", "cosmetics",
    "medicine", "pill", "medication",
    "money", "cash", "credit card",
];

/// Keep only cleaning/property-relevant labels.
///
/// Matching is case-insensitive; substring overlap is checked both ways to
/// tolerate compound phrases ("kitchen sink" vs. "sink"). Deterministic, no
/// side effects; an empty input yields an empty output.
pub fn filter_relevant_labels(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .filter(|label| is_relevant(&label.to_lowercase()))
        .cloned()
        .collect()
}

fn is_relevant(label: &str) -> bool {
    for blocked in BLOCKED_LABELS {
        if label == *blocked || label.contains(blocked) || blocked.contains(label) {
            return false;
        }
    }

    for allowed in ALLOWED_CATEGORIES {
        if label == *allowed || label.contains(allowed) || allowed.contains(label) {
            return true;
        }
    }

    ALLOWED_KEYWORDS.iter().any(|keyword| label.contains(keyword))
}
