//! Match state: score keeping and the rally rule machine.
//!
//! Pure data + transitions, no systems. Gameplay feeds it classified hits and bounces; rendering
//! and debug tools only read it.
//!
//! Rules (after a hit by side S, the other side R receives):
//! * The ball must first land on R's half. A first bounce on S's half is S's fault.
//! * A second bounce on R's half before R returns wins the point for S.
//! * R hitting before the ball bounced on its half is a volley (fault unless allowed).
//! * S hitting twice in a row is a double hit.
//! * Leaving play (floor / walls / ceiling) wins for S if the ball bounced on R's half,
//!   otherwise for R.
//! * Net contact never ends the rally.

use bevy::prelude::*;
use tt_config::RulesConfig;

use crate::Side;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub near: u32,
    pub far: u32,
}

impl Score {
    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Near => self.near,
            Side::Far => self.far,
        }
    }

    pub fn award(&mut self, side: Side) {
        match side {
            Side::Near => self.near += 1,
            Side::Far => self.far += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.near + self.far
    }

    /// Scoreboard text, near side first.
    pub fn display(&self) -> String {
        format!("{} - {}", self.near, self.far)
    }

    /// Side that has reached `points_to_win` with a lead of at least `win_by`.
    pub fn winner(&self, points_to_win: u32, win_by: u32) -> Option<Side> {
        let win_by = win_by.max(1);
        Side::BOTH.into_iter().find(|&side| {
            let mine = self.get(side);
            let theirs = self.get(side.opponent());
            mine >= points_to_win && mine >= theirs + win_by
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RallyRules {
    pub points_to_win: u32,
    pub win_by: u32,
    pub serves_per_turn: u32,
    pub allow_volley: bool,
    pub point_pause: f32,
}

impl From<&RulesConfig> for RallyRules {
    fn from(cfg: &RulesConfig) -> Self {
        Self {
            points_to_win: cfg.points_to_win,
            win_by: cfg.win_by,
            serves_per_turn: cfg.serves_per_turn,
            allow_volley: cfg.allow_volley,
            point_pause: cfg.point_pause.max(0.0),
        }
    }
}

impl Default for RallyRules {
    fn default() -> Self {
        Self::from(&RulesConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RallyPhase {
    /// Ball frozen at the server's serve spot.
    AwaitingServe,
    InPlay,
    /// Short pause after a point; `remaining` seconds until the next serve.
    PointOver { remaining: f32 },
    GameOver { winner: Side },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointReason {
    /// The receiver did not return a ball that landed on its half.
    Unreturned,
    /// The hitter sent the ball out without it landing on the receiver's half.
    OutOfPlay,
    /// The ball's first bounce after a hit was on the hitter's own half.
    OwnSideBounce,
    /// The receiver hit the ball before it bounced.
    Volley,
    /// The same side hit twice in a row.
    DoubleHit,
}

impl PointReason {
    pub fn label(self) -> &'static str {
        match self {
            PointReason::Unreturned => "unreturned",
            PointReason::OutOfPlay => "out",
            PointReason::OwnSideBounce => "own-side bounce",
            PointReason::Volley => "volley",
            PointReason::DoubleHit => "double hit",
        }
    }
}

/// A classified ball contact as seen by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounce {
    Table(Side),
    Net,
    Out,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Rally {
    pub phase: RallyPhase,
    pub server: Side,
    /// Points played with the current server.
    pub serves_taken: u32,
    pub last_hitter: Option<Side>,
    /// Bounces on the receiver's half since the last hit.
    pub receiver_bounces: u32,
    /// Paddle hits in the current rally.
    pub hits: u32,
}

impl Default for Rally {
    fn default() -> Self {
        Self::new(Side::Near)
    }
}

impl Rally {
    pub fn new(server: Side) -> Self {
        Self {
            phase: RallyPhase::AwaitingServe,
            server,
            serves_taken: 0,
            last_hitter: None,
            receiver_bounces: 0,
            hits: 0,
        }
    }

    pub fn in_play(&self) -> bool {
        self.phase == RallyPhase::InPlay
    }

    /// Whether a touch by `side` counts at all in the current phase.
    pub fn can_hit(&self, side: Side) -> bool {
        match self.phase {
            RallyPhase::AwaitingServe => side == self.server,
            RallyPhase::InPlay => true,
            RallyPhase::PointOver { .. } | RallyPhase::GameOver { .. } => false,
        }
    }

    /// Register a paddle hit. Returns the point outcome when the hit is a fault.
    pub fn on_hit(&mut self, side: Side, rules: &RallyRules) -> Option<(Side, PointReason)> {
        match self.phase {
            RallyPhase::AwaitingServe => {
                if side != self.server {
                    return None;
                }
                self.phase = RallyPhase::InPlay;
                self.start_exchange(side);
                self.hits = 1;
                None
            }
            RallyPhase::InPlay => {
                let Some(prev) = self.last_hitter else {
                    self.start_exchange(side);
                    self.hits += 1;
                    return None;
                };
                if prev == side {
                    return Some((side.opponent(), PointReason::DoubleHit));
                }
                if self.receiver_bounces == 0 && !rules.allow_volley {
                    return Some((prev, PointReason::Volley));
                }
                self.start_exchange(side);
                self.hits += 1;
                None
            }
            RallyPhase::PointOver { .. } | RallyPhase::GameOver { .. } => None,
        }
    }

    /// Register a ball contact. Returns the point outcome when it ends the rally.
    pub fn on_bounce(&mut self, bounce: Bounce) -> Option<(Side, PointReason)> {
        if !self.in_play() {
            return None;
        }
        let hitter = self.last_hitter?;
        let receiver = hitter.opponent();
        match bounce {
            Bounce::Net => None,
            Bounce::Table(half) if half == hitter => {
                if self.receiver_bounces == 0 {
                    Some((receiver, PointReason::OwnSideBounce))
                } else {
                    // Landed on the receiver's half, then came back untouched.
                    Some((hitter, PointReason::Unreturned))
                }
            }
            Bounce::Table(_) => {
                self.receiver_bounces += 1;
                (self.receiver_bounces >= 2).then_some((hitter, PointReason::Unreturned))
            }
            Bounce::Out => {
                if self.receiver_bounces > 0 {
                    Some((hitter, PointReason::Unreturned))
                } else {
                    Some((receiver, PointReason::OutOfPlay))
                }
            }
        }
    }

    /// Apply a point: update the score, rotate the serve, and enter `PointOver` or `GameOver`.
    pub fn award_point(&mut self, score: &mut Score, winner: Side, rules: &RallyRules) {
        score.award(winner);
        self.serves_taken += 1;
        let deuce = rules.points_to_win > 0
            && score.near >= rules.points_to_win - 1
            && score.far >= rules.points_to_win - 1;
        let per_turn = if deuce { 1 } else { rules.serves_per_turn.max(1) };
        if self.serves_taken >= per_turn {
            self.server = self.server.opponent();
            self.serves_taken = 0;
        }
        self.last_hitter = None;
        self.receiver_bounces = 0;
        self.phase = match score.winner(rules.points_to_win, rules.win_by) {
            Some(w) => RallyPhase::GameOver { winner: w },
            None => RallyPhase::PointOver {
                remaining: rules.point_pause,
            },
        };
    }

    /// Advance the post-point pause. Returns true on the frame the next serve becomes due.
    pub fn tick(&mut self, dt: f32) -> bool {
        if let RallyPhase::PointOver { remaining } = &mut self.phase {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.phase = RallyPhase::AwaitingServe;
                self.hits = 0;
                return true;
            }
        }
        false
    }

    /// One-line status for the scoreboard.
    pub fn status(&self) -> String {
        match self.phase {
            RallyPhase::AwaitingServe => format!("{} to serve", self.server.label()),
            RallyPhase::InPlay => format!("Rally: {} hits", self.hits),
            RallyPhase::PointOver { .. } => format!("Next serve: {}", self.server.label()),
            RallyPhase::GameOver { winner } => format!("{} wins! Press R", winner.label()),
        }
    }

    fn start_exchange(&mut self, hitter: Side) {
        self.last_hitter = Some(hitter);
        self.receiver_bounces = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn served(server: Side) -> (Rally, RallyRules) {
        let rules = RallyRules::default();
        let mut rally = Rally::new(server);
        assert_eq!(rally.on_hit(server, &rules), None);
        assert!(rally.in_play());
        (rally, rules)
    }

    #[test]
    fn only_server_can_start_rally() {
        let rules = RallyRules::default();
        let mut rally = Rally::new(Side::Near);
        assert!(!rally.can_hit(Side::Far));
        assert_eq!(rally.on_hit(Side::Far, &rules), None);
        assert_eq!(rally.phase, RallyPhase::AwaitingServe);
        assert_eq!(rally.on_hit(Side::Near, &rules), None);
        assert_eq!(rally.phase, RallyPhase::InPlay);
        assert_eq!(rally.last_hitter, Some(Side::Near));
    }

    #[test]
    fn clean_exchange_then_unreturned() {
        let (mut rally, rules) = served(Side::Near);
        assert_eq!(rally.on_bounce(Bounce::Table(Side::Far)), None);
        assert_eq!(rally.on_hit(Side::Far, &rules), None);
        assert_eq!(rally.on_bounce(Bounce::Net), None);
        assert_eq!(rally.on_bounce(Bounce::Table(Side::Near)), None);
        assert_eq!(
            rally.on_bounce(Bounce::Table(Side::Near)),
            Some((Side::Far, PointReason::Unreturned))
        );
        assert_eq!(rally.hits, 2);
    }

    #[test]
    fn own_side_bounce_is_a_fault() {
        let (mut rally, _) = served(Side::Far);
        assert_eq!(
            rally.on_bounce(Bounce::Table(Side::Far)),
            Some((Side::Near, PointReason::OwnSideBounce))
        );
    }

    #[test]
    fn out_without_landing_goes_to_receiver() {
        let (mut rally, _) = served(Side::Near);
        assert_eq!(rally.on_bounce(Bounce::Out), Some((Side::Far, PointReason::OutOfPlay)));
    }

    #[test]
    fn out_after_landing_goes_to_hitter() {
        let (mut rally, _) = served(Side::Near);
        rally.on_bounce(Bounce::Table(Side::Far));
        assert_eq!(rally.on_bounce(Bounce::Out), Some((Side::Near, PointReason::Unreturned)));
    }

    #[test]
    fn volley_and_double_hit() {
        let (mut rally, rules) = served(Side::Near);
        assert_eq!(rally.on_hit(Side::Far, &rules), Some((Side::Near, PointReason::Volley)));

        let (mut rally, rules) = served(Side::Near);
        assert_eq!(rally.on_hit(Side::Near, &rules), Some((Side::Far, PointReason::DoubleHit)));

        let permissive = RallyRules {
            allow_volley: true,
            ..rules
        };
        let (mut rally, _) = served(Side::Near);
        assert_eq!(rally.on_hit(Side::Far, &permissive), None);
        assert_eq!(rally.last_hitter, Some(Side::Far));
    }

    #[test]
    fn contacts_ignored_outside_play() {
        let mut rally = Rally::new(Side::Near);
        assert_eq!(rally.on_bounce(Bounce::Out), None);
        rally.phase = RallyPhase::PointOver { remaining: 1.0 };
        assert_eq!(rally.on_bounce(Bounce::Table(Side::Near)), None);
        assert!(!rally.can_hit(Side::Near));
    }

    #[test]
    fn serve_rotates_every_two_points() {
        let rules = RallyRules::default();
        let mut rally = Rally::new(Side::Near);
        let mut score = Score::default();
        rally.award_point(&mut score, Side::Far, &rules);
        assert_eq!(rally.server, Side::Near);
        rally.award_point(&mut score, Side::Far, &rules);
        assert_eq!(rally.server, Side::Far);
        assert_eq!(score, Score { near: 0, far: 2 });
        assert!(matches!(rally.phase, RallyPhase::PointOver { .. }));
    }

    #[test]
    fn serve_rotates_every_point_at_deuce() {
        let rules = RallyRules::default();
        let mut rally = Rally::new(Side::Near);
        let mut score = Score { near: 10, far: 9 };
        rally.award_point(&mut score, Side::Far, &rules);
        assert_eq!(score, Score { near: 10, far: 10 });
        assert_eq!(rally.server, Side::Far);
        rally.award_point(&mut score, Side::Near, &rules);
        assert_eq!(rally.server, Side::Near);
        assert!(matches!(rally.phase, RallyPhase::PointOver { .. }), "11-10 is not a win");
        rally.award_point(&mut score, Side::Near, &rules);
        assert_eq!(rally.phase, RallyPhase::GameOver { winner: Side::Near });
    }

    #[test]
    fn pause_elapses_into_next_serve() {
        let rules = RallyRules {
            point_pause: 0.5,
            ..RallyRules::default()
        };
        let (mut rally, _) = served(Side::Near);
        let mut score = Score::default();
        rally.award_point(&mut score, Side::Near, &rules);
        assert!(!rally.tick(0.3));
        assert!(rally.tick(0.3));
        assert_eq!(rally.phase, RallyPhase::AwaitingServe);
        assert_eq!(rally.hits, 0);
        assert!(rally.status().contains("to serve"));
    }

    #[test]
    fn winner_needs_margin() {
        assert_eq!(Score { near: 11, far: 10 }.winner(11, 2), None);
        assert_eq!(Score { near: 12, far: 10 }.winner(11, 2), Some(Side::Near));
        assert_eq!(Score { near: 3, far: 11 }.winner(11, 2), Some(Side::Far));
        assert_eq!(Score { near: 1, far: 0 }.winner(1, 0), Some(Side::Near));
        assert_eq!(Score { near: 4, far: 7 }.display(), "4 - 7");
    }
}
