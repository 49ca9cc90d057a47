//! PromQL → Datadog query translation: selector rewriting, the function table, the
//! expression translator and the query flattener.

pub(crate) mod expr;
pub(crate) mod flatten;
pub(crate) mod functions;
pub(crate) mod selector;

pub use expr::{TranslatedNode, translate};
pub use flatten::{Flattener, NamingScheme, PushOutcome};
pub use functions::map_function;
pub use selector::{clean_value, translate_selector};
