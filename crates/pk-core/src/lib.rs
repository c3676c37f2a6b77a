pub mod config;
pub mod defaults;
pub mod id;
pub mod lint;
pub mod model;
pub mod patch;
pub mod propagate;
pub mod template;

pub use config::StoreConfig;
pub use defaults::{default_element, default_element_with_id};
pub use id::ElementId;
pub use lint::{LintDiagnostic, LintSeverity, lint_elements};
pub use model::*;
pub use patch::ElementPatch;
pub use propagate::{Transform, UpdateOrigin, apply_patch, transform_group, transform_patch};
pub use template::TemplateError;
