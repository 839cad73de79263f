//! Slot schemas, slot validation and slot change handlers.
//!
//! Validation problems are never fatal: the host logs them and dispatches a
//! `slot-validation` event.

pub mod schema;
pub mod validate;

pub use schema::{SlotConfig, SlotSchema, SlotValidator};
pub use validate::{
    create_slotchange_handler, slotted_elements, validate_all_slots, validate_slot,
    SlotChangeCallback, SlotChangeHandler, SlotError, SlotValidationResult, DEFAULT_SLOT,
};
