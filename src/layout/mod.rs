//! Measurement-driven layout.
//!
//! Both resolvers are pure: the host measures the live document, the
//! resolver turns measurements into positions or label choices, and the
//! host writes them back.
//!
//! | Module     | Input                                | Output                 |
//! |------------|--------------------------------------|------------------------|
//! | `sidenote` | reference offsets, note heights      | rail note tops         |
//! | `label`    | container, menu and glyph widths     | subtitle variant, stack|
//! | `debounce` | resize events                        | one relayout per burst |

pub mod debounce;
pub mod label;
pub mod sidenote;

pub use debounce::Debouncer;
pub use label::{LabelLayout, LabelMetrics, resolve_label};
pub use sidenote::{
    RailProbe, ReferenceMetrics, SidenoteMeasurements, SidenotePlacement, resolve_sidenotes,
};
