//! Domain Services
//!
//! Pure selection logic with no I/O.

pub mod candidate_selector;

pub use candidate_selector::CandidateSelector;
