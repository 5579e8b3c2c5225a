//! Built-in patches.
//!
//! | Slug | Patch |
//! |------|-------|
//! | `top-country` | [`country::TopCountryPatch`] |

pub mod country;
