//! One hand of play, from the deal to a win or an exhausted wall.
//!
//! The board alternates between two phases. In [`Phase::Discard`] the
//! current player draws if they owe a draw, then discards. In
//! [`Phase::Interrupt`] the other three players may claim the discard; the
//! winning claim is executed, or the turn passes to the next player.
use super::result::RoundOutcome;
use super::wall::Wall;
use crate::agent::{Agent, Decision, PlayerView};
use crate::algo::fan::{self, Score, WinContext};
use crate::algo::payout;
use crate::claim::{self, Claim, ClaimKind};
use crate::config::RuleConfig;
use crate::event::{Event, KongKind};
use crate::hand::{Hand, Meld};
use crate::tile::{Tile, Wind};
use anyhow::{Context, Result, bail, ensure};
use serde::Serialize;
use tinyvec::ArrayVec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Discard,
    Interrupt,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    InGame,
    End,
}

/// Setup of a hand.
#[derive(Debug, Clone)]
pub struct Board {
    pub hand_no: u32,
    pub dealer: u8,
    pub prevailing_wind: Wind,
    pub wall: Wall,
    pub rules: RuleConfig,
}

#[derive(Debug, Clone)]
pub struct BoardState {
    hands: [Hand; 4],
    wall: Wall,
    phase: Phase,
    current: u8,
    dealer: u8,
    prevailing_wind: Wind,
    hand_no: u32,

    /// A drawn tile under consideration for a win or a kong, not yet in the
    /// hand.
    held: Option<Tile>,
    /// The current player's last draw, committed or not.
    drawn: Option<Tile>,
    latest_tile: Option<Tile>,
    discarder: Option<u8>,
    /// Player who must draw before the next discard.
    pending_draw: Option<u8>,

    events: Vec<Event>,
    outcome: Option<RoundOutcome>,
    rules: RuleConfig,
}

impl Board {
    /// Deals 13 tiles to each player, starting from the dealer. Bonus tiles
    /// are set aside and replaced as they come. The dealer then owes the
    /// first draw.
    pub fn deal(self) -> Result<BoardState> {
        ensure!(self.dealer < 4, "invalid dealer {}", self.dealer);
        let mut state = BoardState {
            hands: Default::default(),
            wall: self.wall,
            phase: Phase::Discard,
            current: self.dealer,
            dealer: self.dealer,
            prevailing_wind: self.prevailing_wind,
            hand_no: self.hand_no,
            held: None,
            drawn: None,
            latest_tile: None,
            discarder: None,
            pending_draw: Some(self.dealer),
            events: vec![],
            outcome: None,
            rules: self.rules,
        };

        for i in 0..4 {
            let player = (self.dealer + i) % 4;
            let hand = &mut state.hands[player as usize];
            while hand.concealed().len() < 13 {
                let tile = state.wall.draw().context("the wall ran out during the deal")?;
                if tile.is_bonus() {
                    hand.add_bonus(tile)?;
                } else {
                    hand.insert(tile)?;
                }
            }
        }

        state.events.push(Event::StartHand {
            hand_no: state.hand_no,
            prevailing_wind: state.prevailing_wind,
            dealer: state.dealer,
            tiles: state.hands.each_ref().map(|h| h.concealed().to_vec()),
            bonus: state.hands.each_ref().map(|h| h.bonus_tiles().to_vec()),
        });
        log::debug!(
            "hand {} dealt, dealer {}, {} prevailing",
            state.hand_no,
            state.dealer,
            state.prevailing_wind,
        );
        Ok(state)
    }
}

impl BoardState {
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub const fn current(&self) -> u8 {
        self.current
    }

    #[inline]
    #[must_use]
    pub const fn dealer(&self) -> u8 {
        self.dealer
    }

    #[inline]
    #[must_use]
    pub const fn prevailing_wind(&self) -> Wind {
        self.prevailing_wind
    }

    #[must_use]
    pub fn hand(&self, player: u8) -> &Hand {
        &self.hands[player as usize % 4]
    }

    #[inline]
    #[must_use]
    pub fn tiles_left(&self) -> usize {
        self.wall.len()
    }

    #[inline]
    #[must_use]
    pub const fn latest_tile(&self) -> Option<Tile> {
        self.latest_tile
    }

    #[inline]
    #[must_use]
    pub const fn discarder(&self) -> Option<u8> {
        self.discarder
    }

    #[inline]
    #[must_use]
    pub const fn pending_draw(&self) -> Option<u8> {
        self.pending_draw
    }

    #[inline]
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[inline]
    #[must_use]
    pub const fn outcome(&self) -> Option<&RoundOutcome> {
        self.outcome.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// 0 for the dealer, then counting in turn order.
    #[inline]
    #[must_use]
    pub const fn seat_of(&self, player: u8) -> u8 {
        claim::forward_distance(self.dealer, player)
    }

    #[must_use]
    pub const fn win_context(&self, player: u8) -> WinContext {
        WinContext {
            prevailing_wind: self.prevailing_wind,
            seat: self.seat_of(player),
        }
    }

    #[must_use]
    pub fn view(&self, player: u8) -> PlayerView<'_> {
        PlayerView {
            player,
            seat: self.seat_of(player),
            hand: self.hand(player),
            drawn: if player == self.current { self.drawn } else { None },
            latest_tile: self.latest_tile,
            discarder: self.discarder,
            prevailing_wind: self.prevailing_wind,
            tiles_left: self.wall.len(),
            rules: &self.rules,
        }
    }

    /// Everything `player` may do right now. Empty when it is not their
    /// decision.
    ///
    /// * While a drawn tile is held: a self-draw win, a kong with that tile,
    ///   or passing to keep it.
    /// * While discarding: one option per distinct concealed tile.
    /// * While a discard is open: each legal claim and passing.
    #[must_use]
    pub fn legal_options(&self, player: u8) -> Vec<Decision> {
        let mut ret = vec![];
        let hand = self.hand(player);
        match self.phase {
            Phase::GameOver => (),
            Phase::Discard if player != self.current || self.pending_draw.is_some() => (),
            Phase::Discard => {
                if let Some(tile) = self.held {
                    let score = fan::evaluate_with(hand, tile, self.win_context(player), &self.rules);
                    if score.is_some_and(|s| s.is_accepted(self.rules.min_fan)) {
                        ret.push(Decision::SelfDrawWin);
                    }
                    if self.rules.allow_self_kong
                        && !self.wall.is_empty()
                        && (hand.count(tile) == 3 || hand.has_pong(tile))
                    {
                        ret.push(Decision::SelfKong { tile });
                    }
                    ret.push(Decision::Pass);
                } else {
                    let mut tiles = hand.concealed().to_vec();
                    tiles.dedup();
                    ret.extend(tiles.into_iter().map(|tile| Decision::Discard { tile }));
                }
            }
            Phase::Interrupt => {
                if let (Some(tile), Some(discarder)) = (self.latest_tile, self.discarder)
                    && player != discarder
                {
                    let claims = claim::legal_claims(
                        hand,
                        tile,
                        self.win_context(player),
                        &self.rules,
                        player == (discarder + 1) % 4,
                        !self.wall.is_empty(),
                    );
                    ret.extend(claims.into_iter().map(|claim| Decision::Claim { claim }));
                    ret.push(Decision::Pass);
                }
            }
        }
        ret
    }

    fn ask(&self, player: u8, agent: &mut dyn Agent, options: &[Decision]) -> Result<Decision> {
        let decision = agent
            .decide(&self.view(player), options)
            .with_context(|| format!("agent {} failed to decide", agent.name()))?;
        if !options.contains(&decision) {
            log::warn!(
                "player {player} ({}) chose {decision}, legal options were {options:?}",
                agent.name(),
            );
            bail!("rule violation: player {player} chose {decision}, which is not legal now");
        }
        Ok(decision)
    }

    /// Draws for `player`, who must be the current player and owe a draw.
    ///
    /// Bonus tiles are set aside and redrawn. A drawn tile that completes the
    /// hand or makes a kong is offered to `agent` before it enters the hand;
    /// a declared win ends the hand with the tile left out, and a kong is
    /// followed by a replacement draw. An empty wall ends the hand in a draw.
    pub fn draw_for(&mut self, player: u8, agent: &mut dyn Agent) -> Result<()> {
        ensure!(
            self.phase == Phase::Discard && player == self.current && self.pending_draw == Some(player),
            "rule violation: player {player} cannot draw now",
        );
        let p = player as usize;
        self.pending_draw = None;

        loop {
            let Some(tile) = self.wall.draw() else {
                self.exhaust();
                return Ok(());
            };
            if tile.is_bonus() {
                log::debug!("player {player} sets aside {tile}");
                self.hands[p].add_bonus(tile)?;
                self.events.push(Event::Bonus { actor: player, tile });
                continue;
            }

            log::debug!("player {player} draws {tile}, {} left", self.wall.len());
            self.events.push(Event::Draw { actor: player, tile });
            self.held = Some(tile);
            self.drawn = Some(tile);

            let options = self.legal_options(player);
            let decision = if options.len() > 1 {
                self.ask(player, agent, &options)?
            } else {
                Decision::Pass
            };
            self.held = None;
            match decision {
                Decision::SelfDrawWin => {
                    let score = fan::evaluate_with(&self.hands[p], tile, self.win_context(player), &self.rules)
                        .context("self-draw win on an incomplete hand")?;
                    return self.finish_win(player, None, tile, score);
                }
                Decision::SelfKong { tile } => self.self_kong(player, tile)?,
                _ => {
                    self.hands[p].insert(tile)?;
                    return Ok(());
                }
            }
        }
    }

    fn self_kong(&mut self, player: u8, tile: Tile) -> Result<()> {
        let hand = &mut self.hands[player as usize];
        let kind = if hand.has_pong(tile) {
            hand.upgrade_pong(tile)?;
            KongKind::Upgrade
        } else {
            hand.remove_n(tile, 3)?;
            hand.expose(Meld::kong(tile, true)?)?;
            KongKind::Concealed
        };
        log::debug!("player {player} declares a {kind:?} kong of {tile}");
        self.events.push(Event::Kong {
            actor: player,
            target: None,
            tile,
            kind,
        });
        Ok(())
    }

    /// Discards `tile` from the current player's hand and opens it to
    /// claims.
    pub fn discard(&mut self, player: u8, tile: Tile) -> Result<()> {
        ensure!(
            self.phase == Phase::Discard
                && player == self.current
                && self.pending_draw.is_none()
                && self.held.is_none(),
            "rule violation: player {player} cannot discard now",
        );
        self.hands[player as usize]
            .discard(tile)
            .with_context(|| format!("player {player} cannot discard {tile}"))?;
        log::debug!("player {player} discards {tile}");
        self.events.push(Event::Discard { actor: player, tile });
        self.latest_tile = Some(tile);
        self.discarder = Some(player);
        self.drawn = None;
        self.phase = Phase::Interrupt;
        self.check_invariants()
    }

    /// Every player must hold exactly 13 slots between turns.
    pub fn check_invariants(&self) -> Result<()> {
        if self.phase == Phase::GameOver {
            return Ok(());
        }
        for (player, hand) in self.hands.iter().enumerate() {
            let slots = hand.slot_count();
            ensure!(
                slots == 13,
                "rule violation: player {player} holds {} concealed tiles and {} melds ({slots} slots, expected 13)",
                hand.concealed().len(),
                hand.melds().len(),
            );
        }
        Ok(())
    }

    /// Executes a claim on the open discard.
    pub fn apply_claim(&mut self, claim: Claim) -> Result<()> {
        ensure!(self.phase == Phase::Interrupt, "rule violation: no discard to claim");
        let tile = self.latest_tile.context("no latest tile")?;
        let discarder = self.discarder.context("no discarder")?;
        let Claim { player, kind } = claim;
        ensure!(
            player < 4 && player != discarder,
            "rule violation: player {player} cannot claim the discard of player {discarder}",
        );
        let p = player as usize;

        match kind {
            ClaimKind::Win => {
                let score = fan::evaluate_with(&self.hands[p], tile, self.win_context(player), &self.rules)
                    .filter(|s| s.is_accepted(self.rules.min_fan))
                    .with_context(|| format!("rule violation: player {player} cannot win on {tile}"))?;
                self.hands[discarder as usize].retract_discard(tile)?;
                return self.finish_win(player, Some(discarder), tile, score);
            }
            ClaimKind::Kong => {
                ensure!(!self.wall.is_empty(), "rule violation: no replacement tile for a kong");
                self.hands[p].remove_n(tile, 3)?;
                self.hands[p].expose(Meld::kong(tile, false)?)?;
                self.events.push(Event::Kong {
                    actor: player,
                    target: Some(discarder),
                    tile,
                    kind: KongKind::Exposed,
                });
            }
            ClaimKind::Pong => {
                self.hands[p].remove_n(tile, 2)?;
                self.hands[p].expose(Meld::pong(tile)?)?;
                self.events.push(Event::Pong {
                    actor: player,
                    target: discarder,
                    tile,
                });
            }
            ClaimKind::Chow { chow, support: (i, j) } => {
                ensure!(
                    player == (discarder + 1) % 4,
                    "rule violation: player {player} cannot chow the discard of player {discarder}",
                );
                let (a, b) = chow
                    .support_tiles(tile)
                    .with_context(|| format!("rule violation: {tile} cannot be chowed as {chow:?}"))?;
                let concealed = self.hands[p].concealed();
                ensure!(
                    i != j && concealed.get(i) == Some(&a) && concealed.get(j) == Some(&b),
                    "rule violation: positions {i} and {j} of player {player} do not hold {a} and {b}",
                );
                let run = chow.run_start(tile).context("run start")?;
                self.hands[p].remove_at(i.max(j))?;
                self.hands[p].remove_at(i.min(j))?;
                self.hands[p].expose(Meld::chow(run)?)?;
                self.events.push(Event::Chow {
                    actor: player,
                    target: discarder,
                    tile,
                    run,
                });
            }
        }

        self.hands[discarder as usize].retract_discard(tile)?;
        log::debug!("player {player} claims {tile} from player {discarder} for {kind}");
        self.latest_tile = None;
        self.current = player;
        self.phase = Phase::Discard;
        self.pending_draw = (kind == ClaimKind::Kong).then_some(player);
        Ok(())
    }

    /// Nobody claimed, so the player after the discarder owes a draw.
    pub fn advance_turn(&mut self) -> Result<()> {
        ensure!(self.phase == Phase::Interrupt, "rule violation: no open discard to pass on");
        let discarder = self.discarder.context("no discarder")?;
        self.latest_tile = None;
        self.current = (discarder + 1) % 4;
        self.pending_draw = Some(self.current);
        self.phase = Phase::Discard;
        Ok(())
    }

    fn finish_win(&mut self, winner: u8, discarder: Option<u8>, tile: Tile, score: Score) -> Result<()> {
        let deltas = payout::settle(score.fan, winner, discarder)?;
        match discarder {
            Some(d) => log::info!(
                "hand {}: player {winner} wins on {tile} from player {d} with {} fan",
                self.hand_no,
                score.fan,
            ),
            None => log::info!(
                "hand {}: player {winner} wins by self-draw on {tile} with {} fan",
                self.hand_no,
                score.fan,
            ),
        }
        self.events.push(Event::Win {
            actor: winner,
            target: discarder,
            tile,
            fan: score.fan,
            patterns: score.patterns.clone(),
            deltas,
        });
        self.outcome = Some(RoundOutcome::Win {
            winner,
            discarder,
            winning_tile: tile,
            score,
            deltas,
        });
        self.latest_tile = None;
        self.pending_draw = None;
        self.phase = Phase::GameOver;
        Ok(())
    }

    fn exhaust(&mut self) {
        log::info!("hand {}: the wall is exhausted", self.hand_no);
        self.events.push(Event::ExhaustiveDraw);
        self.outcome = Some(RoundOutcome::Draw);
        self.pending_draw = None;
        self.phase = Phase::GameOver;
    }

    /// Advances the hand by one decision round.
    ///
    /// `agents` is indexed by player.
    pub fn step(&mut self, agents: &mut [Box<dyn Agent>]) -> Result<Poll> {
        ensure!(agents.len() == 4, "expected 4 agents, got {}", agents.len());
        match self.phase {
            Phase::GameOver => return Ok(Poll::End),
            Phase::Discard => {
                let player = self.current;
                let agent = agents[player as usize].as_mut();
                if self.pending_draw == Some(player) {
                    self.draw_for(player, agent)
                        .with_context(|| format!("on draw for player {player}"))?;
                } else {
                    let options = self.legal_options(player);
                    let decision = self.ask(player, agent, &options)?;
                    let Decision::Discard { tile } = decision else {
                        bail!("rule violation: player {player} must discard, got {decision}");
                    };
                    self.discard(player, tile)
                        .with_context(|| format!("on discard for player {player}"))?;
                }
            }
            Phase::Interrupt => {
                let discarder = self.discarder.context("no discarder")?;
                let mut claims = ArrayVec::<[Claim; 3]>::new();
                for d in 1..4 {
                    let player = (discarder + d) % 4;
                    let options = self.legal_options(player);
                    if options.len() <= 1 {
                        continue;
                    }
                    let decision = self
                        .ask(player, agents[player as usize].as_mut(), &options)
                        .with_context(|| format!("on claim for player {player}"))?;
                    if let Decision::Claim { claim } = decision {
                        claims.push(Claim { player, kind: claim });
                    }
                }
                match claim::resolve_priority(&claims, discarder) {
                    Some(claim) => self
                        .apply_claim(claim)
                        .with_context(|| format!("on {} by player {}", claim.kind, claim.player))?,
                    None => self.advance_turn()?,
                }
            }
        }
        Ok(if self.is_over() { Poll::End } else { Poll::InGame })
    }

    /// Steps until the hand ends.
    pub fn run(&mut self, agents: &mut [Box<dyn Agent>]) -> Result<RoundOutcome> {
        while self.step(agents)? == Poll::InGame {}
        self.outcome.clone().context("hand ended without an outcome")
    }

    /// Consumes the finished board.
    pub fn end(self) -> Result<(RoundOutcome, Vec<Event>)> {
        let outcome = self.outcome.context("the hand is still in progress")?;
        Ok((outcome, self.events))
    }
}
