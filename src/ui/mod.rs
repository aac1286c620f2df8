//! Terminal output for builds
//!
//! Uses `cliclack` spinners and `console` styling in interactive terminals,
//! with plain line output in CI and when piped.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    key_value_status, outro_error, outro_success, phase_header, phase_output, remark, step_ok,
    step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::TaskSpinner;
