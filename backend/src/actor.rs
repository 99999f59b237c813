//! One task per match
//!
//! Every event for a match is funnelled through an unbounded mailbox into a
//! single task that owns the [`MatchSession`] and the outboxes of everyone in
//! the room. Events for one match are therefore handled one at a time in
//! arrival order, while different matches run in parallel.
//!
//! The task stops when
//! - the grace period after the match reaches `Over` elapses,
//! - a cancel is accepted,
//! - it receives [`Command::Shutdown`] or every handle is dropped.
//!
//! On the way out it runs the exit hook supplied by the registry.

use std::collections::HashMap;
use std::ops::ControlFlow;

use chess_engine::{Color, MatchResult};
use shared::protocol::{GameSnapshot, ServerMessage};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::clock::ClockMode;
use crate::config::MatchSettings;
use crate::error::{MatchError, ServerResult};
use crate::session::{Audience, ConnId, MatchSession, Outbound};

/// Where a connection receives server messages
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// Requests routed to a match task
#[derive(Debug)]
pub enum Command {
    Join {
        conn: ConnId,
        requested: Option<Color>,
        outbox: Outbox,
        reply: oneshot::Sender<ServerResult<Color>>,
    },
    JoinSpectator {
        conn: ConnId,
        outbox: Outbox,
    },
    BeginPlay {
        conn: ConnId,
    },
    SubmitMove {
        conn: ConnId,
        mv: String,
        fen: Option<String>,
    },
    IllegalMove {
        conn: ConnId,
        color: Color,
    },
    TimerUpdate {
        conn: ConnId,
        white_ms: i64,
        black_ms: i64,
    },
    Resign {
        conn: ConnId,
        color: Color,
    },
    OfferDraw {
        conn: ConnId,
        from: Color,
    },
    AcceptDraw {
        conn: ConnId,
    },
    DeclineDraw {
        conn: ConnId,
    },
    ReportGameOver {
        conn: ConnId,
        result: MatchResult,
        reason: String,
    },
    Disconnect {
        conn: ConnId,
    },
    Cancel {
        conn: ConnId,
    },
    Snapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
    Shutdown,
}

/// Cloneable address of a running match task
#[derive(Debug, Clone)]
pub struct MatchHandle {
    code: String,
    tx: mpsc::UnboundedSender<Command>,
}

impl MatchHandle {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn send(&self, command: Command) -> ServerResult<()> {
        self.tx
            .send(command)
            .map_err(|_| MatchError::ActorUnavailable(self.code.clone()))
    }

    pub async fn join(
        &self,
        conn: ConnId,
        requested: Option<Color>,
        outbox: Outbox,
    ) -> ServerResult<Color> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Join {
            conn,
            requested,
            outbox,
            reply,
        })?;
        rx.await
            .map_err(|_| MatchError::ActorUnavailable(self.code.clone()))?
    }

    pub async fn snapshot(&self) -> ServerResult<GameSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await
            .map_err(|_| MatchError::ActorUnavailable(self.code.clone()))
    }

    /// True if both handles address the same task
    pub fn same_match(&self, other: &MatchHandle) -> bool {
        self.tx.same_channel(&other.tx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

struct MatchActor {
    session: MatchSession,
    members: HashMap<ConnId, Outbox>,
    rx: mpsc::UnboundedReceiver<Command>,
    settings: MatchSettings,
    remove_at: Option<Instant>,
}

/// Start the task for `session` and return its handle
///
/// `on_exit` runs once, after the task has stopped processing commands.
pub fn spawn<F>(session: MatchSession, settings: MatchSettings, on_exit: F) -> MatchHandle
where
    F: FnOnce() + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = MatchHandle {
        code: session.code().to_string(),
        tx,
    };

    let actor = MatchActor {
        session,
        members: HashMap::new(),
        rx,
        settings,
        remove_at: None,
    };
    tokio::spawn(async move {
        actor.run().await;
        on_exit();
    });
    handle
}

impl MatchActor {
    async fn run(mut self) {
        let mut ticker = time::interval(self.settings.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let ticking = self.settings.clock_mode == ClockMode::Server;

        loop {
            let deadline = self.remove_at;
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(command) => {
                        if self.handle(command).is_break() {
                            break;
                        }
                    }
                    None => break,
                },
                _ = ticker.tick(), if ticking && !self.session.is_over() => {
                    let out = self.session.tick(Instant::now());
                    self.deliver(out);
                }
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    debug!(code = %self.session.code(), "Grace period elapsed");
                    break;
                }
            }

            if self.session.is_over() && self.remove_at.is_none() {
                self.remove_at = Some(Instant::now() + self.settings.game_over_grace);
            }
        }
        info!(code = %self.session.code(), "Match closed");
    }

    fn handle(&mut self, command: Command) -> ControlFlow<()> {
        let now = Instant::now();
        let out = match command {
            Command::Join {
                conn,
                requested,
                outbox,
                reply,
            } => match self.session.join(conn, requested) {
                Ok((color, out)) => {
                    self.members.insert(conn, outbox);
                    let _ = reply.send(Ok(color));
                    out
                }
                Err(err) => {
                    let _ = reply.send(Err(err));
                    Vec::new()
                }
            },
            Command::JoinSpectator { conn, outbox } => {
                self.members.insert(conn, outbox);
                self.session.join_spectator(conn)
            }
            Command::BeginPlay { conn } => self.session.begin_play(conn, now),
            Command::SubmitMove { conn, mv, fen } => {
                self.session.submit_move(conn, &mv, fen.as_deref(), now)
            }
            Command::IllegalMove { conn, color } => self.session.report_illegal_move(conn, color),
            Command::TimerUpdate {
                conn,
                white_ms,
                black_ms,
            } => self.session.timer_update(conn, white_ms, black_ms),
            Command::Resign { conn, color } => self.session.resign(conn, color),
            Command::OfferDraw { conn, from } => self.session.offer_draw(conn, from),
            Command::AcceptDraw { conn } => self.session.accept_draw(conn),
            Command::DeclineDraw { conn } => self.session.decline_draw(conn),
            Command::ReportGameOver {
                conn,
                result,
                reason,
            } => self.session.report_game_over(conn, result, &reason),
            Command::Disconnect { conn } => {
                self.members.remove(&conn);
                self.session.disconnect(conn)
            }
            Command::Cancel { conn } => match self.session.cancel(conn) {
                Ok(out) => {
                    self.deliver(out);
                    return ControlFlow::Break(());
                }
                Err(err) => {
                    debug!(code = %self.session.code(), %conn, %err, "Cancel rejected");
                    vec![Outbound::to(
                        conn,
                        ServerMessage::CancelGameError {
                            message: err.to_string(),
                        },
                    )]
                }
            },
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
                Vec::new()
            }
            Command::Shutdown => return ControlFlow::Break(()),
        };
        self.deliver(out);
        ControlFlow::Continue(())
    }

    /// Fan messages out to the room or to one member; closed outboxes are dropped
    fn deliver(&mut self, out: Vec<Outbound>) {
        for Outbound { audience, message } in out {
            match audience {
                Audience::Room => self
                    .members
                    .retain(|_, outbox| outbox.send(message.clone()).is_ok()),
                Audience::Conn(conn) => {
                    if let Some(outbox) = self.members.get(&conn) {
                        if outbox.send(message).is_err() {
                            self.members.remove(&conn);
                        }
                    }
                }
            }
        }
    }
}
