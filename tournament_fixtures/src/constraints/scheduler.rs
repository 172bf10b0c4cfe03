//! Dates and venues for generated rounds.

use crate::fixtures::models::{Match, ScheduleSettings, Team, VenueId};
use chrono::{DateTime, Days, NaiveDateTime, Utc};
use std::collections::HashMap;

/// Assigns kickoff times round by round and venues from home teams
#[derive(Debug, Clone)]
pub struct Scheduler<'a> {
    settings: &'a ScheduleSettings,
}

impl<'a> Scheduler<'a> {
    /// Create a new scheduler over a calendar
    pub fn new(settings: &'a ScheduleSettings) -> Self {
        Self { settings }
    }

    /// Kickoff for a round, None if the date overflows the calendar
    pub fn kickoff_for_round(&self, round_number: u32) -> Option<DateTime<Utc>> {
        let offset = u64::from(round_number.saturating_sub(1))
            * u64::from(self.settings.days_between_rounds);
        let date = self.settings.start_date.checked_add_days(Days::new(offset))?;
        Some(NaiveDateTime::new(date, self.settings.kickoff_time).and_utc())
    }

    /// Date every match that is not a bye and fill in missing venues
    ///
    /// Returns the number of matches dated.
    pub fn assign(&self, matches: &mut [Match], teams: &[Team]) -> usize {
        let mut dated = 0;
        for fixture in matches.iter_mut().filter(|m| !m.is_bye) {
            fixture.match_date = self.kickoff_for_round(fixture.round_number);
            if fixture.match_date.is_some() {
                dated += 1;
            }
        }
        fill_home_venues(matches, teams);
        log::debug!("Scheduled {dated} matches from {}", self.settings.start_date);
        dated
    }
}

/// Give venue-less matches the home team's venue
pub fn fill_home_venues(matches: &mut [Match], teams: &[Team]) {
    let venues: HashMap<&str, &VenueId> = teams
        .iter()
        .filter_map(|team| team.home_venue_id.as_ref().map(|v| (team.id.as_str(), v)))
        .collect();

    for fixture in matches
        .iter_mut()
        .filter(|m| !m.is_bye && m.venue_id.is_none())
    {
        fixture.venue_id = fixture
            .home_team_id
            .as_deref()
            .and_then(|home| venues.get(home))
            .map(|venue| (*venue).clone());
    }
}
