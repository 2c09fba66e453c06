//! Architectural CPU state model primitives.

/// Architectural register file types and storage model.
pub mod registers;

pub use registers::{
    ArchitecturalState, Flags, GeneralRegister, FLAGS_WORD_TAG, GENERAL_REGISTER_COUNT,
    LINK_REGISTER,
};
