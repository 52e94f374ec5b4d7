//! Waste class taxonomy.
//!
//! The label order defines the network's output index. The list must stay in
//! lockstep with the class count the model was trained with; `Predictor::load`
//! refuses to start on a mismatch.

/// Total number of waste classes
pub const NUM_CLASSES: usize = 6;

/// Class names for the waste dataset, ordered by output index
pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "biological",
    "metal",
    "paper",
    "plastic",
    "trash",
    "white-glass",
];

/// Get the class name for a given label index
pub fn class_name(label: usize) -> Option<&'static str> {
    CLASS_NAMES.get(label).copied()
}

/// Get the label index for a given class name
pub fn class_index(name: &str) -> Option<usize> {
    CLASS_NAMES.iter().position(|&c| c == name)
}
