//! Application State
//!
//! The single state object owned by the [`Dashboard`](crate::Dashboard)
//! plus the unlock flags reported by the backend.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which full-screen view is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Startup,
    Banking,
}

/// Top-level views of the banking screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Transactions,
    Categories,
    Timeseries,
    Search,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Transactions, Tab::Categories, Tab::Timeseries, Tab::Search];

    pub fn key(self) -> &'static str {
        match self {
            Tab::Transactions => "transactions",
            Tab::Categories => "categories",
            Tab::Timeseries => "timeseries",
            Tab::Search => "search",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Transactions => "Transactions",
            Tab::Categories => "Spending Categories",
            Tab::Timeseries => "Track Spending",
            Tab::Search => "Search",
        }
    }

    /// The unlock flag gating this tab; search is never gated
    pub fn feature(self) -> Option<Feature> {
        match self {
            Tab::Transactions => Some(Feature::Transactions),
            Tab::Categories => Some(Feature::Categories),
            Tab::Timeseries => Some(Feature::Timeseries),
            Tab::Search => None,
        }
    }

    pub fn is_reachable(self, status: &UnlockStatus) -> bool {
        self.feature().map_or(true, |f| status.is_unlocked(f))
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown tab '{0}' (expected transactions, categories, timeseries or search)")]
pub struct ParseTabError(String);

impl FromStr for Tab {
    type Err = ParseTabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseTabError(s.to_string()))
    }
}

/// Backend feature modules that unlock tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Transactions,
    Categories,
    Timeseries,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Feature::Transactions, Feature::Categories, Feature::Timeseries];

    pub fn label(self) -> &'static str {
        match self {
            Feature::Transactions => "Transactions",
            Feature::Categories => "Spending Categories",
            Feature::Timeseries => "Track Spending",
        }
    }

    /// Tutorial module that has to be completed to unlock the feature
    pub fn module(self) -> &'static str {
        match self {
            Feature::Transactions => "List + JSON",
            Feature::Categories => "Sorted Set",
            Feature::Timeseries => "TimeSeries",
        }
    }
}

/// Unlock flags as reported by `/api/status`
///
/// Missing flags decode as `false`; extra fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockStatus {
    #[serde(default, deserialize_with = "flag")]
    pub transactions_unlocked: bool,
    #[serde(default, deserialize_with = "flag")]
    pub categories_unlocked: bool,
    #[serde(default, deserialize_with = "flag")]
    pub timeseries_unlocked: bool,
}

/// Flags come from key-existence checks, so the backend may report them as
/// booleans or as integer counts (0 is locked).
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Count(i64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Bool(b)) => b,
        Some(Raw::Count(n)) => n != 0,
        None => false,
    })
}

impl UnlockStatus {
    pub fn is_unlocked(&self, feature: Feature) -> bool {
        match feature {
            Feature::Transactions => self.transactions_unlocked,
            Feature::Categories => self.categories_unlocked,
            Feature::Timeseries => self.timeseries_unlocked,
        }
    }

    /// True when at least one flag differs
    pub fn differs_from(&self, other: &UnlockStatus) -> bool {
        Feature::ALL
            .into_iter()
            .any(|f| self.is_unlocked(f) != other.is_unlocked(f))
    }
}

/// Everything the render dispatcher needs to paint the page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub screen: Screen,
    pub active_tab: Tab,
    pub status: UnlockStatus,
    pub selected_transaction: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_from_bits(bits: u8) -> UnlockStatus {
        UnlockStatus {
            transactions_unlocked: bits & 0b001 != 0,
            categories_unlocked: bits & 0b010 != 0,
            timeseries_unlocked: bits & 0b100 != 0,
        }
    }

    #[test]
    fn test_initial_state() {
        let state = AppState::default();
        assert_eq!(state.screen, Screen::Startup);
        assert_eq!(state.active_tab, Tab::Transactions);
        assert_eq!(state.status, UnlockStatus::default());
        assert!(Feature::ALL.iter().all(|f| !state.status.is_unlocked(*f)));
        assert!(state.selected_transaction.is_none());
    }

    #[test]
    fn test_differs_from_matches_flag_comparison() {
        for old in 0..8u8 {
            for new in 0..8u8 {
                let (old, new) = (status_from_bits(old), status_from_bits(new));
                let expected = new.transactions_unlocked != old.transactions_unlocked
                    || new.categories_unlocked != old.categories_unlocked
                    || new.timeseries_unlocked != old.timeseries_unlocked;
                assert_eq!(new.differs_from(&old), expected, "{old:?} -> {new:?}");
            }
        }
    }

    #[test]
    fn test_status_decoding() {
        let status: UnlockStatus = serde_json::from_str(
            r#"{"transactions_unlocked": true, "categories_unlocked": false,
                "timeseries_unlocked": true, "search_unlocked": true}"#,
        )
        .unwrap();
        assert!(status.transactions_unlocked);
        assert!(!status.categories_unlocked);
        assert!(status.timeseries_unlocked);

        let partial: UnlockStatus = serde_json::from_str(r#"{"categories_unlocked": true}"#).unwrap();
        assert_eq!(
            partial,
            UnlockStatus {
                categories_unlocked: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_status_decodes_integer_flags() {
        let status: UnlockStatus = serde_json::from_str(
            r#"{"transactions_unlocked": 0, "categories_unlocked": true,
                "timeseries_unlocked": 1, "search_unlocked": false}"#,
        )
        .unwrap();
        assert_eq!(
            status,
            UnlockStatus {
                transactions_unlocked: false,
                categories_unlocked: true,
                timeseries_unlocked: true,
            }
        );

        let counted: UnlockStatus = serde_json::from_str(
            r#"{"transactions_unlocked": 2, "categories_unlocked": null}"#,
        )
        .unwrap();
        assert!(counted.transactions_unlocked);
        assert!(!counted.categories_unlocked);

        assert!(serde_json::from_str::<UnlockStatus>(r#"{"timeseries_unlocked": "yes"}"#).is_err());
    }

    #[test]
    fn test_tab_reachability() {
        let locked = UnlockStatus::default();
        assert!(Tab::Search.is_reachable(&locked));
        assert!(!Tab::Categories.is_reachable(&locked));

        let unlocked = UnlockStatus {
            categories_unlocked: true,
            ..Default::default()
        };
        assert!(Tab::Categories.is_reachable(&unlocked));
        assert!(!Tab::Timeseries.is_reachable(&unlocked));
    }

    #[test]
    fn test_tab_parsing() {
        assert_eq!("categories".parse::<Tab>().unwrap(), Tab::Categories);
        assert_eq!(" Search ".parse::<Tab>().unwrap(), Tab::Search);
        assert!("ledger".parse::<Tab>().is_err());
    }
}
