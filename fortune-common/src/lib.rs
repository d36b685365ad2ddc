//! Card identities, notation and deal layouts shared by the solver and its front ends.

pub mod card;
pub mod layout;
