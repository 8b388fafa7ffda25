//! Placement by entity name.
//!
//! Files refer to displays and screens by name (`"DP-1"`, `"Screen-0"`).
//! [`PositionSpec`] is that form; it is converted to a typed
//! [`Placement`] against a [`Layout`] once every entity exists.
//!
//! ```json
//! { "type": "right_of", "of": "DP-1" }
//! { "type": "absolute" }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use screenplan_core::{DisplayPlacement, Layout, Placement, Relation, ScreenPlacement};

/// A name that does not match any entity of the layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("unknown display: {0}")]
    Display(String),

    #[error("unknown screen: {0}")]
    Screen(String),
}

/// Absolute placement, or a relation to a named entity of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PositionSpec {
    #[default]
    Absolute,
    RightOf {
        of: String,
    },
    LeftOf {
        of: String,
    },
    Above {
        of: String,
    },
    Below {
        of: String,
    },
    Inside {
        of: String,
    },
}

impl PositionSpec {
    fn split(&self) -> Option<(Relation, &str)> {
        match self {
            PositionSpec::Absolute => None,
            PositionSpec::RightOf { of } => Some((Relation::RightOf, of.as_str())),
            PositionSpec::LeftOf { of } => Some((Relation::LeftOf, of.as_str())),
            PositionSpec::Above { of } => Some((Relation::Above, of.as_str())),
            PositionSpec::Below { of } => Some((Relation::Below, of.as_str())),
            PositionSpec::Inside { of } => Some((Relation::Inside, of.as_str())),
        }
    }

    /// Builds the position `relation` to the entity called `of`.
    pub fn relative(relation: Relation, of: impl Into<String>) -> Self {
        let of = of.into();
        match relation {
            Relation::RightOf => PositionSpec::RightOf { of },
            Relation::LeftOf => PositionSpec::LeftOf { of },
            Relation::Above => PositionSpec::Above { of },
            Relation::Below => PositionSpec::Below { of },
            Relation::Inside => PositionSpec::Inside { of },
        }
    }

    /// Resolves the referenced display name.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::Display`] if no display has that name.
    pub fn display_placement(&self, layout: &Layout) -> Result<DisplayPlacement, NameError> {
        match self.split() {
            None => Ok(Placement::Absolute),
            Some((relation, name)) => layout
                .find_display(name)
                .map(|to| Placement::Relative { relation, to })
                .ok_or_else(|| NameError::Display(name.to_string())),
        }
    }

    /// Resolves the referenced screen name.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::Screen`] if no screen has that name.
    pub fn screen_placement(&self, layout: &Layout) -> Result<ScreenPlacement, NameError> {
        match self.split() {
            None => Ok(Placement::Absolute),
            Some((relation, name)) => layout
                .find_screen(name)
                .map(|to| Placement::Relative { relation, to })
                .ok_or_else(|| NameError::Screen(name.to_string())),
        }
    }
}

/// Short text form of a relation: `right_of`, `below`, ...
pub fn relation_name(relation: Relation) -> &'static str {
    match relation {
        Relation::RightOf => "right_of",
        Relation::LeftOf => "left_of",
        Relation::Above => "above",
        Relation::Below => "below",
        Relation::Inside => "inside",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
