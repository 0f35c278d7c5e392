//! Forward commands.
//!
//! Every command checks its preconditions and returns `false` without touching
//! the aggregate when they are unmet. Otherwise it pushes exactly one undo
//! record (if it is undoable), mutates, and returns `true`. Uploaded games
//! accept no commands.

use tracing::{debug, info, instrument};

use crate::{CommandKind, Event, EventType, Game, Line, Player, PlayerName, Point};

impl Game {
    /// Chooses the puller, the first thrower, or whoever picked up the disc.
    ///
    /// Starts a new point when none is active, with the selected player's
    /// team on offense. Possession is never re-derived mid-point, so once a
    /// point is active only the possessing team's players are accepted.
    #[instrument(skip(self))]
    pub fn select_first_actor(&mut self, player: &str, is_home_team_player: bool) -> bool {
        if self.is_locked() || !self.lines_chosen() {
            debug!("Lines not chosen, ignoring first actor");
            return false;
        }
        if self.active_point().is_some() && is_home_team_player != *self.home_possession() {
            debug!("Player's team does not have the disc");
            return false;
        }
        self.record(CommandKind::SelectFirstActor);

        if self.active_point().is_none() {
            let home = self.home_players().clone().unwrap_or_default();
            let away = self.away_players().clone().unwrap_or_default();
            let point = if is_home_team_player {
                Point::new(home, away)
            } else {
                Point::new(away, home)
            };
            self.set_home_possession(is_home_team_player);
            self.set_active_point(Some(point));
            debug!(home_possession = is_home_team_player, "Started new point");
        }
        self.set_first_actor(Some(player.to_string()));
        self.mark_in_progress();
        true
    }

    /// Records the pull. The pulling team goes on defense.
    #[instrument(skip(self))]
    pub fn record_pull(&mut self) -> bool {
        let Some(puller) = self.ready_actor() else {
            return false;
        };
        self.record(CommandKind::RecordPull);

        self.flip_possession();
        if let Some(point) = self.active_point_mut() {
            point.swap_offense_and_defense();
            point.add_event(Event::new(EventType::Pull, puller, None));
        }
        self.set_first_actor(None);
        self.mark_in_progress();
        true
    }

    /// Records a completed pass; the receiver now holds the disc.
    #[instrument(skip(self))]
    pub fn record_pass(&mut self, receiver: &str) -> bool {
        let Some(thrower) = self.ready_actor() else {
            return false;
        };
        self.record(CommandKind::RecordPass);

        if let Some(point) = self.active_point_mut() {
            point.add_event(Event::new(
                EventType::Pass,
                thrower,
                Some(receiver.to_string()),
            ));
        }
        self.set_first_actor(Some(receiver.to_string()));
        self.mark_in_progress();
        true
    }

    /// Records a drop by the current holder. Possession changes.
    #[instrument(skip(self))]
    pub fn record_drop(&mut self) -> bool {
        self.record_turnover(CommandKind::RecordDrop, EventType::Drop)
    }

    /// Records a throwaway by the current holder. Possession changes.
    #[instrument(skip(self))]
    pub fn record_throw_away(&mut self) -> bool {
        self.record_turnover(CommandKind::RecordThrowAway, EventType::Throwaway)
    }

    /// Records a block that leaves the disc loose.
    #[instrument(skip(self))]
    pub fn record_defense(&mut self) -> bool {
        self.record_block(CommandKind::RecordDefense, false)
    }

    /// Records a block caught by the defender, who keeps the disc.
    #[instrument(skip(self))]
    pub fn record_catch_defense(&mut self) -> bool {
        self.record_block(CommandKind::RecordCatchDefense, true)
    }

    /// Records a score by the current holder and closes the point.
    #[instrument(skip(self))]
    pub fn record_point(&mut self) -> bool {
        let Some(scorer) = self.ready_actor() else {
            return false;
        };
        self.record(CommandKind::RecordPoint);

        let Some(mut point) = self.take_active_point() else {
            self.pop_command();
            return false;
        };
        point.add_event(Event::new(EventType::Point, scorer.clone(), None));
        self.push_point(point);

        if *self.home_possession() {
            *self.home_score_mut() += 1;
        } else {
            *self.away_score_mut() += 1;
        }
        self.set_last_played_line(self.current_line());
        self.set_lines(None, None);
        self.set_first_actor(None);
        self.flip_possession();
        self.mark_in_progress();

        info!(
            scorer = %scorer,
            home = self.home_score(),
            away = self.away_score(),
            "Point recorded"
        );
        true
    }

    /// Records halftime at the current point count.
    ///
    /// Only allowed once, between points, after at least one point. A point
    /// opened by line selection but not yet started is discarded.
    #[instrument(skip(self))]
    pub fn record_half(&mut self) -> bool {
        if !self.can_record_half() {
            debug!("Half not recordable now");
            return false;
        }
        self.record(CommandKind::RecordHalf);

        self.set_points_at_half(self.points().len());
        self.set_active_point(None);
        self.set_lines(None, None);
        self.set_first_actor(None);
        self.mark_in_progress();
        info!(points_at_half = self.points_at_half(), "Half recorded");
        true
    }

    /// Sets the lines for the next point and leaves line-editing mode.
    ///
    /// After a score (and outside the first point of a half) this also opens
    /// the next point with the team that just gained possession on offense,
    /// so the next actor must be one of theirs. No undo record is pushed for
    /// that; undoing the score discards the opened point.
    ///
    /// During an active point this is a substitution, which keeps the
    /// point's events and is undoable. Line size is not enforced; see
    /// [`crate::check_line`].
    #[instrument(skip(self, home_line, away_line), fields(home = home_line.len(), away = away_line.len()))]
    pub fn select_active_lines(
        &mut self,
        home_line: Vec<PlayerName>,
        away_line: Vec<PlayerName>,
    ) -> bool {
        if self.is_locked() {
            return false;
        }
        if self.active_point().is_some() {
            return self.substitute_during_point(home_line, away_line);
        }
        self.set_lines(Some(home_line), Some(away_line));
        self.set_editing_lines(false);
        if !self.is_first_point_of_half() {
            self.open_receiving_point();
        }
        self.mark_in_progress();
        true
    }

    /// Replaces the lines of the point in progress, keeping its events.
    #[instrument(skip(self, new_home, new_away), fields(home = new_home.len(), away = new_away.len()))]
    pub fn substitute_during_point(
        &mut self,
        new_home: Vec<PlayerName>,
        new_away: Vec<PlayerName>,
    ) -> bool {
        if self.is_locked() || self.active_point().is_none() {
            debug!("No active point, ignoring substitution");
            return false;
        }
        self.record(CommandKind::RecordSubstitution);

        // Offense is the possessing team's line at point start, swapped by the pull.
        let home_on_offense = self.home_on_offense();
        if let Some(point) = self.active_point_mut() {
            if home_on_offense {
                point.replace_players(new_home.clone(), new_away.clone());
            } else {
                point.replace_players(new_away.clone(), new_home.clone());
            }
        }
        self.set_lines(Some(new_home), Some(new_away));
        self.set_editing_lines(false);
        self.mark_in_progress();
        true
    }

    /// Enters line-editing mode.
    #[instrument(skip(self))]
    pub fn begin_line_edit(&mut self) -> bool {
        if self.is_locked() || *self.is_editing_lines() {
            return false;
        }
        self.set_editing_lines(true);
        self.touch();
        true
    }

    /// Leaves line-editing mode keeping the current selection.
    #[instrument(skip(self))]
    pub fn cancel_line_edit(&mut self) -> bool {
        if !*self.is_editing_lines() {
            return false;
        }
        self.set_editing_lines(false);
        self.touch();
        true
    }

    /// Enters roster-editing mode.
    #[instrument(skip(self))]
    pub fn begin_roster_edit(&mut self) -> bool {
        if self.is_locked() || *self.is_editing_rosters() {
            return false;
        }
        self.set_editing_rosters(true);
        self.touch();
        true
    }

    /// Leaves roster-editing mode without changes.
    #[instrument(skip(self))]
    pub fn cancel_roster_edit(&mut self) -> bool {
        if !*self.is_editing_rosters() {
            return false;
        }
        self.set_editing_rosters(false);
        self.touch();
        true
    }

    /// Replaces both rosters and leaves roster-editing mode.
    ///
    /// Removed players are dropped from the current lines and from the
    /// active point; if one of them held the disc, it is loose again.
    /// Completed points are left as recorded. Undoable.
    #[instrument(skip(self, home, away), fields(home = home.len(), away = away.len()))]
    pub fn update_rosters(&mut self, home: Vec<Player>, away: Vec<Player>) -> bool {
        if self.is_locked() {
            return false;
        }
        self.record(CommandKind::UpdateRosters);

        self.home_team_mut().set_roster(home);
        self.away_team_mut().set_roster(away);

        let home_team = self.home_team().clone();
        let away_team = self.away_team().clone();
        let keep_home = |p: &PlayerName| home_team.player(p).is_some();
        let keep_away = |p: &PlayerName| away_team.player(p).is_some();

        let home_line = self
            .home_players()
            .clone()
            .map(|l| l.into_iter().filter(|p| keep_home(p)).collect());
        let away_line = self
            .away_players()
            .clone()
            .map(|l| l.into_iter().filter(|p| keep_away(p)).collect());
        self.set_lines(home_line, away_line);

        if let Some(point) = self.active_point_mut() {
            point.retain_players(|p| keep_home(p) || keep_away(p));
        }
        let holder_removed = self
            .first_actor()
            .as_ref()
            .is_some_and(|p| !keep_home(p) && !keep_away(p));
        if holder_removed {
            debug!(first_actor = ?self.first_actor(), "Disc holder left the roster");
            self.set_first_actor(None);
        }
        self.set_editing_rosters(false);
        self.mark_in_progress();
        info!(
            home = self.home_team().roster().len(),
            away = self.away_team().roster().len(),
            "Rosters updated"
        );
        true
    }

    /// Suggested line for the next point.
    ///
    /// Returns the current selection when one exists. Otherwise players who
    /// sat out the last point come first, then the rest of the roster, capped
    /// at the league's line size.
    #[instrument(skip(self))]
    pub fn suggested_line(&self) -> Line {
        if let Some(line) = self.current_line() {
            return line;
        }
        let size = *self.league().line_size();
        let last = self.last_played_line().clone().unwrap_or_default();
        let pick = |roster: &[Player], played: &[PlayerName]| {
            if played.is_empty() {
                return Vec::new();
            }
            let (rested, played_last): (Vec<&Player>, Vec<&Player>) =
                roster.iter().partition(|p| !played.contains(p.name()));
            rested
                .into_iter()
                .chain(played_last)
                .take(size)
                .map(|p| p.name().clone())
                .collect()
        };
        Line::new(
            pick(self.home_team().roster(), &last.home),
            pick(self.away_team().roster(), &last.away),
        )
    }

    fn open_receiving_point(&mut self) {
        let home = self.home_players().clone().unwrap_or_default();
        let away = self.away_players().clone().unwrap_or_default();
        let point = if *self.home_possession() {
            Point::new(home, away)
        } else {
            Point::new(away, home)
        };
        debug!(home_possession = self.home_possession(), "Opened point for receiving team");
        self.set_active_point(Some(point));
    }

    fn ready_actor(&self) -> Option<PlayerName> {
        if self.is_locked() || self.active_point().is_none() {
            debug!("No active point");
            return None;
        }
        let actor = self.first_actor().clone();
        if actor.is_none() {
            debug!("No first actor");
        }
        actor
    }

    fn record_turnover(&mut self, kind: CommandKind, event_type: EventType) -> bool {
        let Some(actor) = self.ready_actor() else {
            return false;
        };
        self.record(kind);

        self.flip_possession();
        if let Some(point) = self.active_point_mut() {
            point.add_event(Event::new(event_type, actor, None));
        }
        self.set_first_actor(None);
        self.mark_in_progress();
        true
    }

    fn record_block(&mut self, kind: CommandKind, caught: bool) -> bool {
        let Some(defender) = self.ready_actor() else {
            return false;
        };
        self.record(kind);

        if let Some(point) = self.active_point_mut() {
            point.add_event(Event::new(EventType::Defense, defender, None));
        }
        if !caught {
            self.set_first_actor(None);
        }
        self.mark_in_progress();
        true
    }

    fn flip_possession(&mut self) {
        let home = *self.home_possession();
        self.set_home_possession(!home);
    }

    /// Whether the home line is the active point's offense list.
    fn home_on_offense(&self) -> bool {
        let Some(point) = self.active_point() else {
            return *self.home_possession();
        };
        match self.home_players() {
            Some(home) if !home.is_empty() => {
                home.iter().any(|p| point.offense_players().contains(p))
            }
            _ => self
                .away_players()
                .as_ref()
                .is_none_or(|away| !away.iter().any(|p| point.offense_players().contains(p))),
        }
    }
}
