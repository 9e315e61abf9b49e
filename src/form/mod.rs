//! Drafts, coercion and form controls.

pub mod coerce;
pub mod draft;
pub mod widget;

pub use coerce::{coerce, join_tags, split_tags};
pub use draft::Draft;
pub use widget::{FormControl, FormView, InputType, SELECT_PLACEHOLDER, Widget, render_control, render_form};
