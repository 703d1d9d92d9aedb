//! Domain records decoded from leaderboard API responses.
//!
//! # Design
//! All records are immutable values created by the decoder. Field names
//! follow Rust conventions; wire names are pinned with `#[serde(rename)]`
//! where they differ, including the misspelled `hitbot` key.
//!
//! The upstream API is loose about missing data: keys may be absent and
//! plain fields may be `null`. Absent keys use `#[serde(default)]` and
//! `null` goes through `null_as_default`, so both decode to the zero value.
//! Fields that legitimately may be missing are `Option`.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Franchise prefix stripped by `abbrev_name` and `abbrev_cat`.
pub const ABBREV_PREFIX: &str = "Mega Man ";

/// Decode `null` as `T::default()` instead of failing.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn strip_abbrev_prefix(name: &str) -> &str {
    name.strip_prefix(ABBREV_PREFIX).unwrap_or(name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Series {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Category {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// A game on the leaderboard, with its categories in API order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Game {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub series_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub short_name: String,
    /// Non-zero when the leaderboard records game time for this game.
    #[serde(deserialize_with = "null_as_default")]
    pub has_gametime: i64,
    /// Non-zero when game time, not real time, ranks runs.
    #[serde(deserialize_with = "null_as_default")]
    pub uses_gametime: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub forum: String,
    #[serde(deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
}

impl Game {
    /// Full name without the franchise prefix: `"Mega Man 2"` becomes `"2"`.
    pub fn abbrev_name(&self) -> &str {
        strip_abbrev_prefix(&self.name)
    }

    pub fn tracks_game_time(&self) -> bool {
        self.has_gametime != 0
    }

    pub fn uses_game_time(&self) -> bool {
        self.uses_gametime != 0
    }
}

/// A registered leaderboard user. Social handles are free text and may be
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_level: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub twitter: String,
    #[serde(deserialize_with = "null_as_default")]
    pub twitch: String,
    #[serde(rename = "hitbot", deserialize_with = "null_as_default")]
    pub hitbox: String,
    #[serde(deserialize_with = "null_as_default")]
    pub youtube: String,
}

/// Who a run belongs to, as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOwner<'a> {
    /// A runner without an account, identified only by name.
    Guest(&'a str),
    /// A registered user.
    Registered(i64),
}

/// A submitted run. All times are in centiseconds.
///
/// `runner` and `user_id` are expected to be mutually exclusive, but the
/// API does not guarantee it and decoding does not check it. Use `owner`
/// to interpret them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Run {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    pub runner: Option<String>,
    pub user_id: Option<i64>,
    pub game_id: Option<i64>,
    /// Only present in expanded results.
    pub game: Option<Game>,
    /// Only present in expanded results.
    pub user: Option<User>,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    pub version_detail: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub time: i64,
    pub game_time: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub converted_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub video: String,
    #[serde(deserialize_with = "null_as_default")]
    pub verified: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub verified_by: String,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub submitted_by: String,
    #[serde(deserialize_with = "null_as_default")]
    pub rank: i64,
}

impl Run {
    /// Category without the franchise prefix.
    pub fn abbrev_cat(&self) -> &str {
        strip_abbrev_prefix(&self.category)
    }

    pub fn is_verified(&self) -> bool {
        self.verified != 0
    }

    /// Real time as a `Duration`. Negative values clamp to zero.
    pub fn duration(&self) -> Duration {
        centiseconds(self.time)
    }

    /// Game time as a `Duration`, if the run has one.
    pub fn game_duration(&self) -> Option<Duration> {
        self.game_time.map(centiseconds)
    }

    /// Real time as `MM:SS`, or `H:MM:SS` from one hour up. Sub-second
    /// precision is truncated.
    pub fn pretty_time(&self) -> String {
        format_clock(self.duration())
    }

    pub fn pretty_game_time(&self) -> Option<String> {
        self.game_duration().map(format_clock)
    }

    /// Guest runner name wins over the user id when both are set.
    pub fn owner(&self) -> Option<RunOwner<'_>> {
        match (&self.runner, self.user_id) {
            (Some(runner), _) => Some(RunOwner::Guest(runner)),
            (None, Some(id)) => Some(RunOwner::Registered(id)),
            (None, None) => None,
        }
    }

    /// Best available name for whoever did the run: the expanded user's
    /// name, else the guest runner name.
    pub fn display_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|u| u.name.as_str())
            .or(self.runner.as_deref())
    }
}

fn centiseconds(value: i64) -> Duration {
    Duration::from_millis(value.max(0).unsigned_abs().saturating_mul(10))
}

fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = total / 60 % 60;
    let seconds = total % 60;

    if hours == 0 {
        format!("{minutes:02}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with_time(time: i64) -> Run {
        Run {
            time,
            ..Default::default()
        }
    }

    #[test]
    fn abbrev_name_strips_franchise_prefix() {
        let game = Game {
            name: "Mega Man 2".to_string(),
            ..Default::default()
        };
        assert_eq!(game.abbrev_name(), "2");
    }

    #[test]
    fn abbrev_name_keeps_other_names() {
        let game = Game {
            name: "Street Fighter".to_string(),
            ..Default::default()
        };
        assert_eq!(game.abbrev_name(), "Street Fighter");

        // Only a leading prefix counts.
        let game = Game {
            name: "The Mega Man X Collection".to_string(),
            ..Default::default()
        };
        assert_eq!(game.abbrev_name(), "The Mega Man X Collection");
    }

    #[test]
    fn abbrev_cat_strips_franchise_prefix() {
        let run = Run {
            category: "Mega Man X Any%".to_string(),
            ..Default::default()
        };
        assert_eq!(run.abbrev_cat(), "X Any%");
    }

    #[test]
    fn pretty_time_under_an_hour() {
        assert_eq!(run_with_time(12345).pretty_time(), "02:03");
        assert_eq!(run_with_time(0).pretty_time(), "00:00");
        assert_eq!(run_with_time(359_999).pretty_time(), "59:59");
    }

    #[test]
    fn pretty_time_with_hours() {
        assert_eq!(run_with_time(366_000).pretty_time(), "1:01:00");
        assert_eq!(run_with_time(360_000).pretty_time(), "1:00:00");
        assert_eq!(run_with_time(4_000_000).pretty_time(), "11:06:40");
    }

    #[test]
    fn duration_is_in_centiseconds() {
        assert_eq!(run_with_time(12345).duration(), Duration::from_millis(123_450));
        assert_eq!(run_with_time(-5).duration(), Duration::ZERO);
    }

    #[test]
    fn game_time_helpers_follow_option() {
        let mut run = run_with_time(100);
        assert_eq!(run.game_duration(), None);
        assert_eq!(run.pretty_game_time(), None);

        run.game_time = Some(6000);
        assert_eq!(run.game_duration(), Some(Duration::from_secs(60)));
        assert_eq!(run.pretty_game_time().as_deref(), Some("01:00"));
    }

    #[test]
    fn owner_distinguishes_guest_and_registered() {
        let guest = Run {
            runner: Some("Bob".to_string()),
            ..Default::default()
        };
        assert_eq!(guest.owner(), Some(RunOwner::Guest("Bob")));

        let registered = Run {
            user_id: Some(7),
            ..Default::default()
        };
        assert_eq!(registered.owner(), Some(RunOwner::Registered(7)));

        assert_eq!(Run::default().owner(), None);
    }

    #[test]
    fn display_name_prefers_expanded_user() {
        let run = Run {
            runner: Some("Bob".to_string()),
            user: Some(User {
                name: "Alice".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(run.display_name(), Some("Alice"));

        let guest = Run {
            runner: Some("Bob".to_string()),
            ..Default::default()
        };
        assert_eq!(guest.display_name(), Some("Bob"));
        assert_eq!(Run::default().display_name(), None);
    }

    #[test]
    fn nulls_and_missing_keys_decode_to_zero_values() {
        let game: Game = serde_json::from_str(
            r#"{"id": 3, "name": null, "forum": null, "categories": null}"#,
        )
        .unwrap();
        assert_eq!(game.id, 3);
        assert_eq!(game.name, "");
        assert_eq!(game.series_id, 0);
        assert!(game.categories.is_empty());
    }

    #[test]
    fn user_reads_misspelled_hitbox_key() {
        let user: User =
            serde_json::from_str(r#"{"id": 1, "name": "Alice", "hitbot": "alice_hb"}"#).unwrap();
        assert_eq!(user.hitbox, "alice_hb");
    }

    #[test]
    fn run_optional_fields() {
        let run: Run = serde_json::from_str(
            r#"{"id": 9, "runner": null, "user_id": 4, "game_time": 1234, "version_detail": null}"#,
        )
        .unwrap();
        assert_eq!(run.runner, None);
        assert_eq!(run.user_id, Some(4));
        assert_eq!(run.game_time, Some(1234));
        assert_eq!(run.version_detail, None);
        assert!(run.game.is_none());
        assert!(run.user.is_none());
    }
}
