use serde::{Deserialize, Serialize};

use crate::translate::flatten::NamingScheme;

/// Conversion options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOpts {
    /// Sub-query naming scheme.
    pub naming: NamingScheme,
    /// Drop targets that use a function without a Datadog mapping instead of emitting a
    /// formula with an empty function token.
    pub strict_functions: bool,
    /// Fold top-level panels that follow an expanded row into that row.
    pub adopt_row_siblings: bool,
    /// Convert top-level panels in parallel (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for ConvertOpts {
    fn default() -> Self {
        Self {
            naming: NamingScheme::Sequential,
            strict_functions: false,
            adopt_row_siblings: false,
            parallel: false,
            threads: None,
        }
    }
}
