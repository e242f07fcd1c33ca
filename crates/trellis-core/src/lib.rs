//! Trellis: markup templates compiled into widget chains
//!
//! A template is plain markup with two additions: `${expr}` interpolations
//! and `@Directive` tokens that attach behaviour to the element after them.
//! [`TemplateCompiler`] checks every expression against a backing [`Shape`]
//! up front and produces an immutable [`Chain`] that renders concurrently.
//!
//! ```
//! use serde_json::json;
//! use trellis_core::{Shape, TemplateCompiler, WidgetRegistry};
//!
//! let registry = WidgetRegistry::new();
//! let data = json!({ "name": "Dhanji", "admin": false });
//! let chain = TemplateCompiler::new(&registry)
//!     .compile("<p>hi ${name} @ShowIf(admin)<b>(admin)</b></p>", &Shape::infer(&data))
//!     .unwrap();
//! assert_eq!(chain.render_to_string(&data).unwrap(), "<p>hi Dhanji </p>");
//! ```

// Core modules
pub mod compiler;
pub mod config;
pub mod directive;
pub mod error;
pub mod expr;
pub mod markup;
pub mod registry;
pub mod respond;
pub mod widget;

// Re-export commonly used types
pub use compiler::{TemplateCompileError, TemplateCompiler};
pub use config::{Config, EvaluationPolicy, RenderConfig, CONFIG_FILE_NAME};
pub use error::{Result, TrellisError};
pub use expr::{CompiledExpression, ExpressionCompiler, PropertyResolver, Scope, Shape};
pub use registry::{WidgetKind, WidgetRegistry};
pub use respond::{Respond, RetractError, StringRespond};
pub use widget::{Chain, RenderError};
