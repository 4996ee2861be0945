use std::time::SystemTime;

use indexmap::IndexMap;
use thiserror::Error;

/// Number of characters in a shareable room code.
pub const ROOM_CODE_LENGTH: usize = 6;
/// Flat award applied to every correct answer. No time bonus is computed even
/// though submission timestamps are recorded.
pub const POINTS_PER_CORRECT: u32 = 1000;

/// One question served to a room, fixed at room creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Category the question was drawn from.
    pub category: String,
    /// Prompt text shown to every player.
    pub prompt: String,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_index: usize,
    /// Optional explanation revealed alongside the correct answer.
    pub explanation: Option<String>,
}

/// A single player's submission for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    /// Selected option index.
    pub answer: usize,
    /// Submission time. Informational only; scoring ignores it.
    pub timestamp: SystemTime,
}

/// Per-room player record, keyed by display name within the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Display name, duplicated from the map key for projection convenience.
    pub name: String,
    /// Accumulated score. Monotonically non-decreasing within a room.
    pub score: u32,
    /// Answers keyed by question index. Written at most once per question
    /// under correct client behaviour; a repeat write wins.
    pub answers: IndexMap<usize, AnswerRecord>,
}

impl Player {
    /// Fresh zero-score record, as inserted on create and on (re)join.
    pub fn new(name: String) -> Self {
        Self {
            name,
            score: 0,
            answers: IndexMap::new(),
        }
    }
}

/// Phases a room moves through, driven exclusively by host events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// Accepting joins; no question is open.
    Waiting,
    /// A question is open and players may submit answers.
    Playing,
    /// The current question's answer is revealed and scored.
    Results,
    /// Terminal phase; the room only renders final standings.
    Finished,
}

/// Host-driven events applied to the room state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Leave the lobby and open the first question.
    Start,
    /// Close the current question and reveal its answer.
    Reveal,
    /// Open the next question, or finish when none remain.
    Next,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the room was in when the invalid event was received.
    pub from: RoomPhase,
    /// The event that cannot be applied from this phase.
    pub event: HostEvent,
}

/// Points awarded to one player by a scoring pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionAward {
    /// Player the award applies to.
    pub player: String,
    /// Whether the submitted answer matched the correct option.
    pub correct: bool,
    /// Points granted by this pass (0 for a wrong answer).
    pub points: u32,
}

/// One multiplayer game session. The whole document is the unit of
/// replication: every committed mutation is delivered to subscribers as a
/// full snapshot, and clients re-derive their view from it alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    /// Shareable code identifying the room.
    pub code: String,
    /// Name of the creating player. Immutable after creation; the host role
    /// is never transferred, even if the host leaves.
    pub host: String,
    /// Current phase of the session state machine.
    pub phase: RoomPhase,
    /// Index of the open question. `None` until the host starts the game.
    pub current_question: Option<usize>,
    /// Question sequence fixed at creation.
    pub questions: Vec<Question>,
    /// Categories the questions were drawn from. Informational.
    pub categories: Vec<String>,
    /// Players keyed by display name, in join order.
    pub players: IndexMap<String, Player>,
    /// Per-question scoring locks guaranteeing at-most-once score mutation.
    pub scored_questions: IndexMap<usize, bool>,
    /// Creation timestamp, consulted by the expiry sweep.
    pub created_at: SystemTime,
}

impl Room {
    /// Build a waiting room containing only the host at score zero.
    pub fn new(code: String, host: String, categories: Vec<String>, questions: Vec<Question>) -> Self {
        let mut players = IndexMap::new();
        players.insert(host.clone(), Player::new(host.clone()));

        Self {
            code,
            host,
            phase: RoomPhase::Waiting,
            current_question: None,
            questions,
            categories,
            players,
            scored_questions: IndexMap::new(),
            created_at: SystemTime::now(),
        }
    }

    /// Apply a host event, returning the phase entered.
    ///
    /// Phase and question index always change together here, so a committed
    /// transition is observed as one combined write and subscribers never see
    /// `Playing` paired with a stale index.
    pub fn apply(&mut self, event: HostEvent) -> Result<RoomPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (RoomPhase::Waiting, HostEvent::Start) => {
                self.current_question = Some(0);
                RoomPhase::Playing
            }
            (RoomPhase::Playing, HostEvent::Reveal) => RoomPhase::Results,
            (RoomPhase::Results, HostEvent::Next) => match self.current_question {
                Some(index) if index + 1 < self.questions.len() => {
                    self.current_question = Some(index + 1);
                    RoomPhase::Playing
                }
                // Last question: the index stays put and the room finishes.
                _ => RoomPhase::Finished,
            },
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        self.phase = next;
        Ok(next)
    }

    /// The currently open question, when one is.
    pub fn current(&self) -> Option<(usize, &Question)> {
        let index = self.current_question?;
        Some((index, self.questions.get(index)?))
    }

    /// Claim the scoring lock for `index` and apply score deltas.
    ///
    /// Returns `None` when the question was already scored (or does not
    /// exist), so repeated reveal attempts never double-award points. Lock
    /// claim and deltas land in the same mutation; callers commit them as one
    /// atomic store write.
    pub fn score_question(&mut self, index: usize) -> Option<Vec<QuestionAward>> {
        let correct_index = self.questions.get(index)?.correct_index;
        if self.scored_questions.get(&index).copied().unwrap_or(false) {
            return None;
        }
        self.scored_questions.insert(index, true);

        let awards = self
            .players
            .values_mut()
            .filter_map(|player| {
                let record = player.answers.get(&index)?;
                let correct = record.answer == correct_index;
                let points = if correct { POINTS_PER_CORRECT } else { 0 };
                player.score += points;
                Some(QuestionAward {
                    player: player.name.clone(),
                    correct,
                    points,
                })
            })
            .collect();

        Some(awards)
    }

    /// Players ordered by descending score. The sort is stable, so equal
    /// scores keep join order.
    pub fn standings(&self) -> Vec<&Player> {
        let mut entries: Vec<&Player> = self.players.values().collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries
    }
}
